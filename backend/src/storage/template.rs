use super::Database;
use crate::error::AppError;
use chrono::{Datelike, Local};
use common::model::template::{BrandingUpdate, Template};
use rusqlite::{params, Connection, Row};

const TEMPLATE_ID: i64 = 1;

/// Persistence for the singleton certificate template.
pub trait TemplateRepository: Send + Sync {
    /// Creates the template row if missing (upsert) and returns it.
    fn ensure_template(&self) -> Result<Template, AppError>;

    /// Returns the template, creating it on the fly through the same upsert.
    fn get_template(&self) -> Result<Template, AppError> {
        self.ensure_template()
    }

    /// Whole-row write (`save(Template)`) for callers that own the full
    /// template state, such as restores and fixtures. Request paths use the
    /// narrower `update_branding` and `allocate_sequence`, which cannot lose
    /// a concurrent counter increment.
    fn save_template(&self, template: &Template) -> Result<(), AppError>;

    /// Applies the present fields of `update` and returns the new state.
    fn update_branding(&self, update: &BrandingUpdate) -> Result<Template, AppError>;

    /// Atomically resets the counter when `year` differs from the stored year,
    /// increments it, and returns the post-increment value.
    fn allocate_sequence(&self, year: i32) -> Result<u32, AppError>;
}

fn upsert_default(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute(
        "INSERT OR IGNORE INTO certificate_template (id, manager_name, current_year, last_sequence)
         VALUES (?1, '', ?2, 0)",
        params![TEMPLATE_ID, Local::now().year()],
    )?;
    Ok(())
}

fn read_template(conn: &Connection) -> Result<Template, rusqlite::Error> {
    conn.query_row(
        "SELECT id, background_ref, signature_ref, manager_name, current_year, last_sequence
         FROM certificate_template WHERE id = ?1",
        params![TEMPLATE_ID],
        template_from_row,
    )
}

fn template_from_row(row: &Row<'_>) -> Result<Template, rusqlite::Error> {
    Ok(Template {
        id: row.get(0)?,
        background_ref: row.get(1)?,
        signature_ref: row.get(2)?,
        manager_name: row.get(3)?,
        current_year: row.get(4)?,
        last_sequence: row.get(5)?,
    })
}

impl TemplateRepository for Database {
    fn ensure_template(&self) -> Result<Template, AppError> {
        self.with_conn(|conn| {
            upsert_default(conn)?;
            Ok(read_template(conn)?)
        })
    }

    fn save_template(&self, template: &Template) -> Result<(), AppError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO certificate_template
                     (id, background_ref, signature_ref, manager_name, current_year, last_sequence)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT (id) DO UPDATE SET
                     background_ref = excluded.background_ref,
                     signature_ref  = excluded.signature_ref,
                     manager_name   = excluded.manager_name,
                     current_year   = excluded.current_year,
                     last_sequence  = excluded.last_sequence",
                params![
                    TEMPLATE_ID,
                    template.background_ref,
                    template.signature_ref,
                    template.manager_name,
                    template.current_year,
                    template.last_sequence,
                ],
            )?;
            Ok(())
        })
    }

    fn update_branding(&self, update: &BrandingUpdate) -> Result<Template, AppError> {
        self.with_conn(|conn| {
            upsert_default(conn)?;
            conn.execute(
                "UPDATE certificate_template SET
                     manager_name   = COALESCE(?1, manager_name),
                     background_ref = COALESCE(?2, background_ref),
                     signature_ref  = COALESCE(?3, signature_ref)
                 WHERE id = ?4",
                params![
                    update.manager_name,
                    update.background_ref,
                    update.signature_ref,
                    TEMPLATE_ID
                ],
            )?;
            Ok(read_template(conn)?)
        })
    }

    fn allocate_sequence(&self, year: i32) -> Result<u32, AppError> {
        self.with_conn(|conn| {
            upsert_default(conn)?;
            // SET expressions see the pre-update row, so the CASE compares
            // against the stored year before it is overwritten.
            let value: u32 = conn.query_row(
                "UPDATE certificate_template SET
                     last_sequence = CASE WHEN current_year = ?1 THEN last_sequence + 1 ELSE 1 END,
                     current_year  = ?1
                 WHERE id = ?2
                 RETURNING last_sequence",
                params![year, TEMPLATE_ID],
                |row| row.get(0),
            )?;
            Ok(value)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_is_created_once() {
        let db = Database::open_in_memory().unwrap();
        let first = db.ensure_template().unwrap();
        let second = db.get_template().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.id, TEMPLATE_ID);
        assert_eq!(first.last_sequence, 0);
        assert_eq!(first.current_year, Local::now().year());
        assert!(first.background_ref.is_none());
    }

    #[test]
    fn branding_update_is_partial() {
        let db = Database::open_in_memory().unwrap();
        db.update_branding(&BrandingUpdate {
            manager_name: Some("Ana Torres".into()),
            background_ref: Some("certificados/a.png".into()),
            signature_ref: None,
        })
        .unwrap();
        let updated = db
            .update_branding(&BrandingUpdate {
                signature_ref: Some("certificados/f.png".into()),
                ..BrandingUpdate::default()
            })
            .unwrap();
        assert_eq!(updated.manager_name, "Ana Torres");
        assert_eq!(updated.background_ref.as_deref(), Some("certificados/a.png"));
        assert_eq!(updated.signature_ref.as_deref(), Some("certificados/f.png"));
    }

    #[test]
    fn save_replaces_the_whole_row() {
        let db = Database::open_in_memory().unwrap();
        db.update_branding(&BrandingUpdate {
            manager_name: Some("Ana Torres".into()),
            background_ref: Some("certificados/a.png".into()),
            signature_ref: Some("certificados/f.png".into()),
        })
        .unwrap();
        let restored = Template {
            id: TEMPLATE_ID,
            background_ref: None,
            signature_ref: Some("certificados/g.png".into()),
            manager_name: "Rosa Díaz".into(),
            current_year: 2027,
            last_sequence: 9,
        };
        db.save_template(&restored).unwrap();
        assert_eq!(db.get_template().unwrap(), restored);
    }

    #[test]
    fn sequence_resets_on_year_change() {
        let db = Database::open_in_memory().unwrap();
        db.save_template(&Template {
            id: TEMPLATE_ID,
            background_ref: None,
            signature_ref: None,
            manager_name: String::new(),
            current_year: 2024,
            last_sequence: 41,
        })
        .unwrap();
        assert_eq!(db.allocate_sequence(2024).unwrap(), 42);
        assert_eq!(db.allocate_sequence(2025).unwrap(), 1);
        assert_eq!(db.allocate_sequence(2025).unwrap(), 2);
        let template = db.get_template().unwrap();
        assert_eq!(template.current_year, 2025);
        assert_eq!(template.last_sequence, 2);
    }

    #[test]
    fn concurrent_allocations_are_distinct() {
        let db = Database::open_in_memory().unwrap();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let db = db.clone();
                std::thread::spawn(move || {
                    (0..25)
                        .map(|_| db.allocate_sequence(2030).unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        let mut all: Vec<u32> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        all.sort_unstable();
        assert_eq!(all, (1..=200).collect::<Vec<_>>());
    }
}
