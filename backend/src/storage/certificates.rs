use super::{is_unique_violation, Database};
use crate::error::AppError;
use common::model::certificate::Certificate;
use rusqlite::{params, OptionalExtension, Row};

/// Result of trying to store a new certificate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// A certificate for the same `(user_id, course_id)` already exists.
    Conflict,
}

pub trait CertificateRepository: Send + Sync {
    fn find_certificate(&self, id: &str) -> Result<Option<Certificate>, AppError>;

    fn find_certificate_for(
        &self,
        user_id: &str,
        course_id: &str,
    ) -> Result<Option<Certificate>, AppError>;

    /// Stores `certificate`; never overwrites an existing row.
    fn insert_certificate(&self, certificate: &Certificate) -> Result<InsertOutcome, AppError>;

    /// Certificates of one user, newest first.
    fn list_certificates_for_user(&self, user_id: &str) -> Result<Vec<Certificate>, AppError>;
}

const COLUMNS: &str = "id, user_id, course_id, template_id, number, emit_date, student_name,
     course_title, hours, date_text, manager_name, background_ref, signature_ref, created_at";

fn certificate_from_row(row: &Row<'_>) -> Result<Certificate, rusqlite::Error> {
    Ok(Certificate {
        id: row.get(0)?,
        user_id: row.get(1)?,
        course_id: row.get(2)?,
        template_id: row.get(3)?,
        number: row.get(4)?,
        emit_date: row.get(5)?,
        student_name: row.get(6)?,
        course_title: row.get(7)?,
        hours: row.get(8)?,
        date_text: row.get(9)?,
        manager_name: row.get(10)?,
        background_ref: row.get(11)?,
        signature_ref: row.get(12)?,
        created_at: row.get(13)?,
    })
}

impl CertificateRepository for Database {
    fn find_certificate(&self, id: &str) -> Result<Option<Certificate>, AppError> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {} FROM certificates WHERE id = ?1", COLUMNS);
            Ok(conn
                .query_row(&sql, params![id], certificate_from_row)
                .optional()?)
        })
    }

    fn find_certificate_for(
        &self,
        user_id: &str,
        course_id: &str,
    ) -> Result<Option<Certificate>, AppError> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM certificates WHERE user_id = ?1 AND course_id = ?2",
                COLUMNS
            );
            Ok(conn
                .query_row(&sql, params![user_id, course_id], certificate_from_row)
                .optional()?)
        })
    }

    fn insert_certificate(&self, certificate: &Certificate) -> Result<InsertOutcome, AppError> {
        self.with_conn(|conn| {
            let sql = format!(
                "INSERT INTO certificates ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
                COLUMNS
            );
            let result = conn.execute(
                &sql,
                params![
                    certificate.id,
                    certificate.user_id,
                    certificate.course_id,
                    certificate.template_id,
                    certificate.number,
                    certificate.emit_date,
                    certificate.student_name,
                    certificate.course_title,
                    certificate.hours,
                    certificate.date_text,
                    certificate.manager_name,
                    certificate.background_ref,
                    certificate.signature_ref,
                    certificate.created_at,
                ],
            );
            match result {
                Ok(_) => Ok(InsertOutcome::Inserted),
                Err(e) if is_unique_violation(&e) => Ok(InsertOutcome::Conflict),
                Err(e) => Err(e.into()),
            }
        })
    }

    fn list_certificates_for_user(&self, user_id: &str) -> Result<Vec<Certificate>, AppError> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM certificates WHERE user_id = ?1 ORDER BY created_at DESC, number DESC",
                COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params![user_id], certificate_from_row)?;
            Ok(rows.collect::<Result<Vec<_>, _>>()?)
        })
    }
}
