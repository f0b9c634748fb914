//! Error type shared by the storage layer, the certificate core and the HTTP
//! handlers. Domain failures map to 4xx answers, infrastructure failures to 500.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use common::responses::ErrorBody;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0} no encontrado")]
    NotFound(String),

    #[error("No tienes permiso para actualizar esta asignación")]
    Forbidden,

    #[error("Se requiere identificación del usuario")]
    Unauthenticated,

    #[error("Usuario ya cuenta con certificado")]
    DuplicateCertificate { certificate_id: String },

    #[error("El estudiante no aprobó aún")]
    NotEligible,

    #[error("{0}")]
    InvalidInput(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF rendering failed: {0}")]
    Render(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn not_found(what: impl Into<String>) -> Self {
        AppError::NotFound(what.into())
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        AppError::InvalidInput(message.into())
    }
}

impl From<actix_web::error::BlockingError> for AppError {
    fn from(e: actix_web::error::BlockingError) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(e: tokio::task::JoinError) -> Self {
        AppError::Internal(format!("task join error: {}", e))
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::DuplicateCertificate { .. } => StatusCode::CONFLICT,
            AppError::NotEligible | AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_) | AppError::Io(_) | AppError::Render(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("{}", self);
        }
        let certificado_id = match self {
            AppError::DuplicateCertificate { certificate_id } => Some(certificate_id.clone()),
            _ => None,
        };
        HttpResponse::build(status).json(ErrorBody {
            ok: false,
            mensaje: self.to_string(),
            certificado_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_are_client_errors() {
        assert_eq!(AppError::not_found("Certificado").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::NotEligible.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::DuplicateCertificate {
                certificate_id: "c1".into()
            }
            .status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(AppError::invalid("Falta userId").status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn storage_errors_are_server_errors() {
        let err = AppError::from(rusqlite::Error::QueryReturnedNoRows);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn not_found_message_names_the_record() {
        assert_eq!(AppError::not_found("Certificado").to_string(), "Certificado no encontrado");
    }
}
