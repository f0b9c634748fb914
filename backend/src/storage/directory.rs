use super::Database;
use crate::error::AppError;
use common::model::course::Course;
use common::model::user::User;
use rusqlite::{params, OptionalExtension};

/// Read access to the user and course records owned by the admin screens.
pub trait Directory: Send + Sync {
    fn find_user(&self, id: &str) -> Result<Option<User>, AppError>;
    fn find_course(&self, id: &str) -> Result<Option<Course>, AppError>;
}

impl Database {
    pub fn insert_user(&self, user: &User) -> Result<(), AppError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, first_name, last_name, email) VALUES (?1, ?2, ?3, ?4)",
                params![user.id, user.first_name, user.last_name, user.email],
            )?;
            Ok(())
        })
    }

    pub fn insert_course(&self, id: &str, title: &str) -> Result<(), AppError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO courses (id, title) VALUES (?1, ?2)",
                params![id, title],
            )?;
            Ok(())
        })
    }
}

impl Directory for Database {
    fn find_user(&self, id: &str) -> Result<Option<User>, AppError> {
        self.with_conn(|conn| {
            Ok(conn
                .query_row(
                    "SELECT id, first_name, last_name, email FROM users WHERE id = ?1",
                    params![id],
                    |row| {
                        Ok(User {
                            id: row.get(0)?,
                            first_name: row.get(1)?,
                            last_name: row.get(2)?,
                            email: row.get(3)?,
                        })
                    },
                )
                .optional()?)
        })
    }

    fn find_course(&self, id: &str) -> Result<Option<Course>, AppError> {
        self.with_conn(|conn| {
            Ok(conn
                .query_row(
                    "SELECT id, title FROM courses WHERE id = ?1",
                    params![id],
                    |row| {
                        Ok(Course {
                            id: row.get(0)?,
                            title: row.get(1)?,
                        })
                    },
                )
                .optional()?)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn users_and_courses_resolve_by_id() {
        let db = Database::open_in_memory().unwrap();
        let user = User {
            id: "u1".into(),
            first_name: "Luis".into(),
            last_name: "Quispe".into(),
            email: "luis@example.pe".into(),
        };
        db.insert_user(&user).unwrap();
        db.insert_course("c1", "Electrónica Básica").unwrap();

        assert_eq!(db.find_user("u1").unwrap(), Some(user));
        assert_eq!(db.find_course("c1").unwrap().map(|c| c.title).as_deref(), Some("Electrónica Básica"));
        assert!(db.find_user("u2").unwrap().is_none());
        assert!(db.find_course("c2").unwrap().is_none());
    }
}
