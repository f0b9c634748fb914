use serde::{Deserialize, Serialize};

/// Branding and numbering state used when issuing and rendering certificates.
///
/// There is exactly one template row. Its branding fields are edited by
/// administrators; `current_year` and `last_sequence` advance every time a
/// certificate number is allocated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub id: i64,
    /// Stored reference of the full-page background (uploads-relative path or URL).
    #[serde(rename = "backgroundUrl")]
    pub background_ref: Option<String>,
    /// Stored reference of the manager's signature image.
    #[serde(rename = "firmaUrl")]
    pub signature_ref: Option<String>,
    #[serde(rename = "gerenteNombre")]
    pub manager_name: String,
    #[serde(rename = "year")]
    pub current_year: i32,
    #[serde(rename = "lastSeq")]
    pub last_sequence: u32,
}

/// Partial branding edit. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrandingUpdate {
    pub manager_name: Option<String>,
    pub background_ref: Option<String>,
    pub signature_ref: Option<String>,
}

impl BrandingUpdate {
    pub fn is_empty(&self) -> bool {
        self.manager_name.is_none() && self.background_ref.is_none() && self.signature_ref.is_none()
    }
}
