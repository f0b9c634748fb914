//! Creation of the one certificate allowed per `(user_id, course_id)`.
//!
//! Two entry points share the same snapshot logic:
//! - `emit`: administrative override, no eligibility check, duplicates are an error.
//! - `ensure_for_assignment`: student path, gated on the exam result and idempotent.

use super::eligibility::is_eligible;
use super::sequence::TemplateStore;
use super::wording::{hours_for_title, long_date};
use crate::config::CertificatesConfig;
use crate::error::AppError;
use crate::storage::{
    AssignmentRepository, CertificateRepository, Directory, InsertOutcome, TemplateRepository,
};
use chrono::{Datelike, Local, NaiveDate, Utc};
use common::model::assignment::Assignment;
use common::model::certificate::Certificate;
use common::model::course::Course;
use common::model::user::User;
use uuid::Uuid;

const FALLBACK_STUDENT_NAME: &str = "Estudiante";
const FALLBACK_COURSE_TITLE: &str = "Curso";

/// Input of the administrative emit path.
#[derive(Debug, Clone)]
pub struct EmitCommand {
    pub user_id: String,
    pub course_id: String,
    /// Explicit number; allocated from the emission year when `None`.
    pub number: Option<String>,
    /// Defaults to today.
    pub emit_date: Option<NaiveDate>,
}

/// How the student path identifies the assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnsureTarget {
    Assignment(String),
    Pair { user_id: String, course_id: String },
}

pub struct CertificateIssuer<'a> {
    templates: &'a dyn TemplateRepository,
    certificates: &'a dyn CertificateRepository,
    assignments: &'a dyn AssignmentRepository,
    directory: &'a dyn Directory,
    settings: &'a CertificatesConfig,
}

impl<'a> CertificateIssuer<'a> {
    pub fn new(
        templates: &'a dyn TemplateRepository,
        certificates: &'a dyn CertificateRepository,
        assignments: &'a dyn AssignmentRepository,
        directory: &'a dyn Directory,
        settings: &'a CertificatesConfig,
    ) -> Self {
        Self {
            templates,
            certificates,
            assignments,
            directory,
            settings,
        }
    }

    pub fn emit(&self, command: EmitCommand) -> Result<Certificate, AppError> {
        if let Some(existing) = self
            .certificates
            .find_certificate_for(&command.user_id, &command.course_id)?
        {
            return Err(AppError::DuplicateCertificate {
                certificate_id: existing.id,
            });
        }

        let user = self
            .directory
            .find_user(&command.user_id)?
            .ok_or_else(|| AppError::not_found("Usuario"))?;
        let course = self
            .directory
            .find_course(&command.course_id)?
            .ok_or_else(|| AppError::not_found("Curso"))?;

        let emit_date = command.emit_date.unwrap_or_else(|| Local::now().date_naive());
        let number = match command.number.map(|n| n.trim().to_string()) {
            Some(number) if !number.is_empty() => number,
            _ => TemplateStore::new(self.templates).allocate_number(emit_date.year())?,
        };

        let certificate = self.snapshot(
            &command.user_id,
            &command.course_id,
            &user,
            &course,
            number,
            emit_date,
        )?;
        match self.certificates.insert_certificate(&certificate)? {
            InsertOutcome::Inserted => {
                log::info!(
                    "Issued certificate {} (number {}) for user {} in course {}",
                    certificate.id,
                    certificate.number,
                    certificate.user_id,
                    certificate.course_id
                );
                Ok(certificate)
            }
            InsertOutcome::Conflict => {
                let existing = self
                    .certificates
                    .find_certificate_for(&command.user_id, &command.course_id)?
                    .ok_or_else(|| AppError::Internal("certificate conflict without a row".to_string()))?;
                Err(AppError::DuplicateCertificate {
                    certificate_id: existing.id,
                })
            }
        }
    }

    /// Returns the certificate for the assignment, creating it with today's date if needed.
    pub fn ensure_for_assignment(&self, target: &EnsureTarget) -> Result<Certificate, AppError> {
        self.ensure_on(target, Local::now().date_naive())
    }

    pub fn ensure_on(&self, target: &EnsureTarget, today: NaiveDate) -> Result<Certificate, AppError> {
        let assignment = match self.resolve_assignment(target)? {
            Some(assignment) if is_eligible(Some(&assignment)) => assignment,
            _ => return Err(AppError::NotEligible),
        };

        if let Some(existing) = self
            .certificates
            .find_certificate_for(&assignment.user_id, &assignment.course_id)?
        {
            log::debug!("Certificate {} already exists for assignment {}", existing.id, assignment.id);
            return Ok(existing);
        }

        let user = self
            .directory
            .find_user(&assignment.user_id)?
            .ok_or_else(|| AppError::not_found("Usuario"))?;
        let course = self
            .directory
            .find_course(&assignment.course_id)?
            .ok_or_else(|| AppError::not_found("Curso"))?;
        let number = TemplateStore::new(self.templates).allocate_number(today.year())?;
        let certificate = self.snapshot(
            &assignment.user_id,
            &assignment.course_id,
            &user,
            &course,
            number,
            today,
        )?;

        match self.certificates.insert_certificate(&certificate)? {
            InsertOutcome::Inserted => {
                log::info!(
                    "Issued certificate {} (number {}) for assignment {}",
                    certificate.id,
                    certificate.number,
                    assignment.id
                );
                Ok(certificate)
            }
            // Lost a race with a concurrent request for the same pair.
            InsertOutcome::Conflict => self
                .certificates
                .find_certificate_for(&assignment.user_id, &assignment.course_id)?
                .ok_or_else(|| AppError::Internal("certificate conflict without a row".to_string())),
        }
    }

    fn resolve_assignment(&self, target: &EnsureTarget) -> Result<Option<Assignment>, AppError> {
        match target {
            EnsureTarget::Assignment(id) => match self.assignments.find_assignment(id)? {
                Some(assignment) => Ok(Some(assignment)),
                None => Err(AppError::not_found("Asignación")),
            },
            EnsureTarget::Pair { user_id, course_id } => {
                self.assignments.find_assignment_for(user_id, course_id)
            }
        }
    }

    fn snapshot(
        &self,
        user_id: &str,
        course_id: &str,
        user: &User,
        course: &Course,
        number: String,
        emit_date: NaiveDate,
    ) -> Result<Certificate, AppError> {
        let template = self.templates.get_template()?;

        let student_name = Some(user.full_name())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| FALLBACK_STUDENT_NAME.to_string());
        let course_title = Some(course.title.trim().to_string())
            .filter(|title| !title.is_empty())
            .unwrap_or_else(|| FALLBACK_COURSE_TITLE.to_string());
        let manager_name = if template.manager_name.trim().is_empty() {
            self.settings.default_manager.clone()
        } else {
            template.manager_name.clone()
        };

        Ok(Certificate {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            course_id: course_id.to_string(),
            template_id: template.id,
            number,
            emit_date,
            hours: hours_for_title(&course_title, self.settings),
            date_text: long_date(emit_date),
            student_name,
            course_title,
            manager_name,
            background_ref: template.background_ref,
            signature_ref: template.signature_ref,
            created_at: Utc::now(),
        })
    }
}
