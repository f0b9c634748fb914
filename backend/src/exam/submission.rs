use crate::certificate::eligibility::minimum_pass_score;
use crate::error::AppError;
use crate::storage::AssignmentRepository;
use common::model::assignment::{AssignmentStatus, ExamAttempt};
use common::responses::ExamOutcome;
use serde_json::Value;

/// One graded attempt as reported by the exam page.
#[derive(Debug, Clone)]
pub struct ExamSubmission {
    pub assignment_id: String,
    pub exam_id: Option<String>,
    /// Display score; defaults to `correct`.
    pub score: Option<f64>,
    pub total: u32,
    pub correct: u32,
    pub answers: Vec<Value>,
}

pub struct SubmissionRecorder<'a> {
    assignments: &'a dyn AssignmentRepository,
}

impl<'a> SubmissionRecorder<'a> {
    pub fn new(assignments: &'a dyn AssignmentRepository) -> Self {
        Self { assignments }
    }

    /// Stores the attempt on the caller's own assignment, replacing any
    /// earlier one, and returns the pass/fail outcome.
    pub fn submit(&self, submission: ExamSubmission, caller: &str) -> Result<ExamOutcome, AppError> {
        if submission.total == 0 {
            return Err(AppError::invalid("El examen debe tener al menos una pregunta"));
        }
        if submission.correct > submission.total {
            return Err(AppError::invalid(format!(
                "Respuestas correctas ({}) mayores que el total ({})",
                submission.correct, submission.total
            )));
        }

        let assignment = self
            .assignments
            .find_assignment(&submission.assignment_id)?
            .ok_or_else(|| AppError::not_found("Asignación"))?;
        if assignment.user_id != caller {
            log::warn!(
                "User {} tried to submit an exam for assignment {} owned by {}",
                caller,
                assignment.id,
                assignment.user_id
            );
            return Err(AppError::Forbidden);
        }

        let minimum = minimum_pass_score(submission.total);
        let passed = submission.correct >= minimum;
        let score = submission.score.unwrap_or(f64::from(submission.correct));
        let attempt = ExamAttempt {
            exam_id: submission.exam_id,
            score: Some(score),
            total: Some(submission.total),
            correct: Some(submission.correct),
            answers: submission.answers,
            passed: Some(passed),
        };
        let status = if passed {
            AssignmentStatus::Passed
        } else {
            AssignmentStatus::Failed
        };
        let saved = self.assignments.save_attempt(&assignment.id, &attempt, status)?;
        log::info!(
            "Recorded attempt {} for assignment {}: {}/{} ({})",
            saved.attempts,
            saved.id,
            submission.correct,
            submission.total,
            status.as_str()
        );

        Ok(ExamOutcome {
            passed,
            minimum_pass_score: minimum,
            score,
            correct: submission.correct,
            total: submission.total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::certificate::{CertificateIssuer, EnsureTarget};
    use crate::config::CertificatesConfig;
    use crate::storage::Database;
    use chrono::NaiveDate;
    use common::model::user::User;
    use serde_json::json;

    fn submission(total: u32, correct: u32) -> ExamSubmission {
        ExamSubmission {
            assignment_id: "a1".into(),
            exam_id: Some("e1".into()),
            score: None,
            total,
            correct,
            answers: vec![json!({"pregunta": 1, "respuesta": "b"})],
        }
    }

    fn db() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.insert_assignment("a1", "u1", "c1").unwrap();
        db
    }

    #[test]
    fn passing_attempt_is_recorded() {
        let db = db();
        let outcome = SubmissionRecorder::new(&db).submit(submission(20, 15), "u1").unwrap();
        assert!(outcome.passed);
        assert_eq!(outcome.minimum_pass_score, 14);
        assert_eq!(outcome.score, 15.0);

        let stored = db.find_assignment("a1").unwrap().unwrap();
        assert_eq!(stored.status, AssignmentStatus::Passed);
        assert_eq!(stored.attempts, 1);
        let attempt = stored.exam_attempt.unwrap();
        assert_eq!(attempt.passed, Some(true));
        assert_eq!(attempt.answers.len(), 1);
    }

    #[test]
    fn failing_attempt_overwrites_previous_pass() {
        let db = db();
        let recorder = SubmissionRecorder::new(&db);
        recorder.submit(submission(20, 18), "u1").unwrap();
        let outcome = recorder.submit(submission(20, 13), "u1").unwrap();
        assert!(!outcome.passed);

        let stored = db.find_assignment("a1").unwrap().unwrap();
        assert_eq!(stored.status, AssignmentStatus::Failed);
        assert_eq!(stored.attempts, 2);
        assert_eq!(stored.exam_attempt.unwrap().correct, Some(13));
    }

    #[test]
    fn foreign_caller_is_forbidden_and_nothing_changes() {
        let db = db();
        let before = db.find_assignment("a1").unwrap();
        let err = SubmissionRecorder::new(&db)
            .submit(submission(20, 20), "intruder")
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden));
        assert_eq!(db.find_assignment("a1").unwrap(), before);
    }

    #[test]
    fn unknown_assignment_is_not_found() {
        let db = db();
        let mut sub = submission(20, 20);
        sub.assignment_id = "missing".into();
        let err = SubmissionRecorder::new(&db).submit(sub, "u1").unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn impossible_counts_are_rejected() {
        let db = db();
        let recorder = SubmissionRecorder::new(&db);
        assert!(matches!(recorder.submit(submission(0, 0), "u1"), Err(AppError::InvalidInput(_))));
        assert!(matches!(recorder.submit(submission(10, 11), "u1"), Err(AppError::InvalidInput(_))));
        assert_eq!(db.find_assignment("a1").unwrap().unwrap().attempts, 0);
    }

    #[test]
    fn passed_exam_leads_to_first_number_of_the_year() {
        let db = db();
        db.insert_user(&User {
            id: "u1".into(),
            first_name: "María".into(),
            last_name: "Huamán".into(),
            email: "maria@example.pe".into(),
        })
        .unwrap();
        db.insert_course("c1", "Actualización en Seguridad").unwrap();

        let outcome = SubmissionRecorder::new(&db).submit(submission(20, 15), "u1").unwrap();
        assert!(outcome.passed);
        assert_eq!(outcome.minimum_pass_score, 14);

        let settings = CertificatesConfig::default();
        let cert = CertificateIssuer::new(&db, &db, &db, &db, &settings)
            .ensure_on(
                &EnsureTarget::Assignment("a1".into()),
                NaiveDate::from_ymd_opt(2030, 2, 1).unwrap(),
            )
            .unwrap();
        assert_eq!(cert.number, "001");
        assert_eq!(cert.hours, 5);
        assert_eq!(cert.student_name, "María Huamán");
    }
}
