use super::Database;
use crate::error::AppError;
use chrono::Utc;
use common::model::assignment::{Assignment, AssignmentStatus, ExamAttempt};
use rusqlite::{params, OptionalExtension, Row};
use serde_json::Value;

pub trait AssignmentRepository: Send + Sync {
    fn find_assignment(&self, id: &str) -> Result<Option<Assignment>, AppError>;

    fn find_assignment_for(
        &self,
        user_id: &str,
        course_id: &str,
    ) -> Result<Option<Assignment>, AppError>;

    /// Replaces the stored attempt, bumps the attempt counter and sets `status`.
    fn save_attempt(
        &self,
        assignment_id: &str,
        attempt: &ExamAttempt,
        status: AssignmentStatus,
    ) -> Result<Assignment, AppError>;
}

const COLUMNS: &str =
    "id, user_id, course_id, status, attempts, exam_id, score, total, correct, answers, passed";

fn assignment_from_row(row: &Row<'_>) -> Result<Assignment, rusqlite::Error> {
    let status: String = row.get(3)?;
    let exam_id: Option<String> = row.get(5)?;
    let score: Option<f64> = row.get(6)?;
    let total: Option<u32> = row.get(7)?;
    let correct: Option<u32> = row.get(8)?;
    let answers: Option<String> = row.get(9)?;
    let passed: Option<bool> = row.get(10)?;

    let has_attempt = exam_id.is_some()
        || score.is_some()
        || total.is_some()
        || correct.is_some()
        || passed.is_some();
    let exam_attempt = has_attempt.then(|| ExamAttempt {
        exam_id,
        score,
        total,
        correct,
        answers: answers
            .and_then(|text| serde_json::from_str::<Vec<Value>>(&text).ok())
            .unwrap_or_default(),
        passed,
    });

    Ok(Assignment {
        id: row.get(0)?,
        user_id: row.get(1)?,
        course_id: row.get(2)?,
        status: AssignmentStatus::parse(&status).unwrap_or(AssignmentStatus::Pending),
        attempts: row.get(4)?,
        exam_attempt,
    })
}

impl Database {
    /// Seeds an assignment with no attempt recorded yet.
    pub fn insert_assignment(
        &self,
        id: &str,
        user_id: &str,
        course_id: &str,
    ) -> Result<Assignment, AppError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO assignments (id, user_id, course_id, status, attempts, updated_at)
                 VALUES (?1, ?2, ?3, 'pending', 0, ?4)",
                params![id, user_id, course_id, Utc::now()],
            )?;
            Ok(())
        })?;
        Ok(Assignment {
            id: id.to_string(),
            user_id: user_id.to_string(),
            course_id: course_id.to_string(),
            status: AssignmentStatus::Pending,
            attempts: 0,
            exam_attempt: None,
        })
    }
}

impl AssignmentRepository for Database {
    fn find_assignment(&self, id: &str) -> Result<Option<Assignment>, AppError> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {} FROM assignments WHERE id = ?1", COLUMNS);
            Ok(conn
                .query_row(&sql, params![id], assignment_from_row)
                .optional()?)
        })
    }

    fn find_assignment_for(
        &self,
        user_id: &str,
        course_id: &str,
    ) -> Result<Option<Assignment>, AppError> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM assignments WHERE user_id = ?1 AND course_id = ?2",
                COLUMNS
            );
            Ok(conn
                .query_row(&sql, params![user_id, course_id], assignment_from_row)
                .optional()?)
        })
    }

    fn save_attempt(
        &self,
        assignment_id: &str,
        attempt: &ExamAttempt,
        status: AssignmentStatus,
    ) -> Result<Assignment, AppError> {
        let answers = serde_json::to_string(&attempt.answers)
            .map_err(|e| AppError::Internal(e.to_string()))?;
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE assignments SET
                     exam_id = ?1, score = ?2, total = ?3, correct = ?4, answers = ?5,
                     passed = ?6, status = ?7, attempts = attempts + 1, updated_at = ?8
                 WHERE id = ?9",
                params![
                    attempt.exam_id,
                    attempt.score,
                    attempt.total,
                    attempt.correct,
                    answers,
                    attempt.passed,
                    status.as_str(),
                    Utc::now(),
                    assignment_id,
                ],
            )?;
            if changed == 0 {
                return Err(AppError::not_found("Asignación"));
            }
            let sql = format!("SELECT {} FROM assignments WHERE id = ?1", COLUMNS);
            Ok(conn.query_row(&sql, params![assignment_id], assignment_from_row)?)
        })
    }
}
