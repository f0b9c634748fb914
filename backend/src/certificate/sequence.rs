//! Single source of truth for branding and the per-year certificate counter.

use crate::error::AppError;
use crate::storage::TemplateRepository;
use common::model::template::{BrandingUpdate, Template};

/// Zero-padded to at least three digits; wider values are not truncated.
pub fn format_sequence(value: u32) -> String {
    format!("{:03}", value)
}

pub struct TemplateStore<'a> {
    repo: &'a dyn TemplateRepository,
}

impl<'a> TemplateStore<'a> {
    pub fn new(repo: &'a dyn TemplateRepository) -> Self {
        Self { repo }
    }

    pub fn get_template(&self) -> Result<Template, AppError> {
        self.repo.get_template()
    }

    /// Applies only the provided fields. Previously referenced asset files
    /// are left on disk.
    pub fn update_branding(&self, update: &BrandingUpdate) -> Result<Template, AppError> {
        if update.is_empty() {
            return self.repo.get_template();
        }
        let template = self.repo.update_branding(update)?;
        log::info!(
            "Certificate branding updated (manager: {}, background: {}, signature: {})",
            update.manager_name.is_some(),
            update.background_ref.is_some(),
            update.signature_ref.is_some()
        );
        Ok(template)
    }

    /// Counter for `year` as it stands, without incrementing: the last
    /// number handed out, or `"000"` when `year` would start a new sequence.
    /// Reads only; the stored year is not reset.
    pub fn peek_next_number(&self, year: i32) -> Result<String, AppError> {
        let template = self.repo.get_template()?;
        let current = if template.current_year == year {
            template.last_sequence
        } else {
            0
        };
        Ok(format_sequence(current))
    }

    /// Authoritative allocation. Resets the counter when the year changes.
    pub fn allocate_number(&self, year: i32) -> Result<String, AppError> {
        let value = self.repo.allocate_sequence(year)?;
        let number = format_sequence(value);
        log::info!("Allocated certificate number {} for {}", number, year);
        Ok(number)
    }
}
