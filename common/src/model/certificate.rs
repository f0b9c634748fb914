use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// An issued certificate.
///
/// Every field is fixed when the certificate is created. Rendering reads the
/// textual snapshot from here but takes images and the manager name from the
/// live template, so `background_ref`, `signature_ref` and `manager_name`
/// only record what was current at issuance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Certificate {
    pub id: String,
    pub user_id: String,
    pub course_id: String,
    pub template_id: i64,
    /// Zero-padded sequence number, e.g. `"007"`.
    pub number: String,
    pub emit_date: NaiveDate,
    pub student_name: String,
    pub course_title: String,
    pub hours: u32,
    /// `"Lima, 20 de agosto de 2025"`.
    pub date_text: String,
    pub manager_name: String,
    #[serde(rename = "backgroundUrlUsed")]
    pub background_ref: Option<String>,
    #[serde(rename = "firmaUrlUsed")]
    pub signature_ref: Option<String>,
    pub created_at: DateTime<Utc>,
}
