use serde::Deserialize;
use serde_json::Value;

/// Admin request to issue a certificate without checking eligibility.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmitCertificateRequest {
    pub user_id: Option<String>,
    pub course_id: Option<String>,
    /// Explicit number; when absent the next one for the emission year is allocated.
    pub number: Option<String>,
    /// `YYYY-MM-DD` or RFC 3339; defaults to now.
    pub emit_date: Option<String>,
}

/// Student request to obtain the certificate for a passed course.
/// Either `assignment_id` or both `user_id` and `course_id` must be present.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnsureCertificateRequest {
    pub assignment_id: Option<String>,
    pub user_id: Option<String>,
    pub course_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NextNumberQuery {
    pub year: Option<i32>,
}

/// Result of one exam attempt as reported by the exam page.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitExamRequest {
    pub exam_id: Option<String>,
    pub assignment_id: Option<String>,
    pub score: Option<f64>,
    pub total: Option<u32>,
    pub correct: Option<u32>,
    #[serde(default)]
    pub answers: Vec<Value>,
}
