use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Links one student to one course. Unique per `(user_id, course_id)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: String,
    pub user_id: String,
    pub course_id: String,
    pub status: AssignmentStatus,
    /// Number of exam submissions recorded so far.
    pub attempts: u32,
    /// Latest submission; earlier attempts are overwritten.
    pub exam_attempt: Option<ExamAttempt>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentStatus {
    Pending,
    Passed,
    Failed,
}

impl AssignmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentStatus::Pending => "pending",
            AssignmentStatus::Passed => "passed",
            AssignmentStatus::Failed => "failed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(AssignmentStatus::Pending),
            "passed" => Some(AssignmentStatus::Passed),
            "failed" => Some(AssignmentStatus::Failed),
            _ => None,
        }
    }
}

/// Recorded outcome of the latest exam submission.
///
/// `passed` is `None` for rows written before the flag existed; those are
/// re-evaluated from `correct` and `total`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamAttempt {
    pub exam_id: Option<String>,
    pub score: Option<f64>,
    pub total: Option<u32>,
    pub correct: Option<u32>,
    #[serde(default)]
    pub answers: Vec<Value>,
    pub passed: Option<bool>,
}
