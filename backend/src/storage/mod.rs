//! # SQLite Storage
//!
//! All persistent state lives in one SQLite file opened through a single
//! connection guarded by a mutex. Every repository call takes the lock for
//! the duration of its statements, which is what serializes number
//! allocation and certificate creation.
//!
//! ## Sub-modules:
//! - `template`: the singleton branding/numbering row.
//! - `certificates`: issued certificates, unique per `(user_id, course_id)`.
//! - `assignments`: student/course links and their latest exam attempt.
//! - `directory`: read access to users and courses.

pub mod assignments;
pub mod certificates;
pub mod directory;
pub mod template;

pub use assignments::AssignmentRepository;
pub use certificates::{CertificateRepository, InsertOutcome};
pub use directory::Directory;
pub use template::TemplateRepository;

use crate::error::AppError;
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS users (
    id         TEXT PRIMARY KEY,
    first_name TEXT NOT NULL,
    last_name  TEXT NOT NULL DEFAULT '',
    email      TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS courses (
    id    TEXT PRIMARY KEY,
    title TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS assignments (
    id         TEXT PRIMARY KEY,
    user_id    TEXT NOT NULL,
    course_id  TEXT NOT NULL,
    status     TEXT NOT NULL DEFAULT 'pending',
    attempts   INTEGER NOT NULL DEFAULT 0,
    exam_id    TEXT,
    score      REAL,
    total      INTEGER,
    correct    INTEGER,
    answers    TEXT,
    passed     INTEGER,
    updated_at TEXT,
    UNIQUE (user_id, course_id)
);

CREATE TABLE IF NOT EXISTS certificate_template (
    id             INTEGER PRIMARY KEY CHECK (id = 1),
    background_ref TEXT,
    signature_ref  TEXT,
    manager_name   TEXT NOT NULL DEFAULT '',
    current_year   INTEGER NOT NULL,
    last_sequence  INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS certificates (
    id             TEXT PRIMARY KEY,
    user_id        TEXT NOT NULL,
    course_id      TEXT NOT NULL,
    template_id    INTEGER NOT NULL,
    number         TEXT NOT NULL,
    emit_date      TEXT NOT NULL,
    student_name   TEXT NOT NULL,
    course_title   TEXT NOT NULL,
    hours          INTEGER NOT NULL,
    date_text      TEXT NOT NULL,
    manager_name   TEXT NOT NULL,
    background_ref TEXT,
    signature_ref  TEXT,
    created_at     TEXT NOT NULL,
    UNIQUE (user_id, course_id)
);

CREATE INDEX IF NOT EXISTS certificates_by_number ON certificates (number);
";

/// Cloneable handle to the application database.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self, AppError> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        Self::with_schema(conn)
    }

    pub fn open_in_memory() -> Result<Self, AppError> {
        Self::with_schema(Connection::open_in_memory()?)
    }

    fn with_schema(conn: Connection) -> Result<Self, AppError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Runs `f` while holding the connection lock.
    pub(crate) fn with_conn<T, F>(&self, f: F) -> Result<T, AppError>
    where
        F: FnOnce(&mut Connection) -> Result<T, AppError>,
    {
        let mut guard = self
            .conn
            .lock()
            .map_err(|_| AppError::Internal("database lock poisoned".to_string()))?;
        f(&mut guard)
    }
}

/// True when `e` is a UNIQUE constraint violation.
pub(crate) fn is_unique_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _)
            if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                || err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_is_idempotent() {
        let db = Database::open_in_memory().unwrap();
        db.with_conn(|conn| {
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn file_database_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("campus.sqlite");
        {
            let db = Database::open(&path).unwrap();
            db.insert_course("c1", "Electrónica Básica").unwrap();
        }
        let db = Database::open(&path).unwrap();
        let course = db.find_course("c1").unwrap().unwrap();
        assert_eq!(course.title, "Electrónica Básica");
    }

    #[test]
    fn duplicate_key_is_detected() {
        let db = Database::open_in_memory().unwrap();
        db.insert_course("c1", "A").unwrap();
        let err = db
            .with_conn(|conn| {
                conn.execute("INSERT INTO courses (id, title) VALUES ('c1', 'B')", [])?;
                Ok(())
            })
            .unwrap_err();
        match err {
            AppError::Database(e) => assert!(is_unique_violation(&e)),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
