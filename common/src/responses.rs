use crate::model::certificate::Certificate;
use crate::model::course::Course;
use crate::model::template::Template;
use crate::model::user::User;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct EmitCertificateResponse {
    pub mensaje: String,
    pub certificado: Certificate,
}

#[derive(Debug, Serialize)]
pub struct EnsureCertificateResponse {
    pub ok: bool,
    pub certificate: Certificate,
}

#[derive(Debug, Serialize)]
pub struct NextNumberResponse {
    pub number: String,
}

#[derive(Debug, Serialize)]
pub struct TemplateUpdatedResponse {
    pub mensaje: String,
    pub template: Template,
}

/// A certificate together with the records it was issued for.
/// Either side is `None` when the referenced record no longer exists.
#[derive(Debug, Serialize)]
pub struct CertificateDetail {
    #[serde(flatten)]
    pub certificate: Certificate,
    pub user: Option<User>,
    pub course: Option<Course>,
}

/// Pass/fail outcome of a recorded exam attempt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamOutcome {
    pub passed: bool,
    pub minimum_pass_score: u32,
    pub score: f64,
    pub correct: u32,
    pub total: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitExamResponse {
    pub ok: bool,
    pub message: String,
    pub exam_result: ExamOutcome,
}

/// Body of every 4xx/5xx answer.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub ok: bool,
    pub mensaje: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificado_id: Option<String>,
}
