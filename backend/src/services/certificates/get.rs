use crate::error::AppError;
use crate::state::AppState;
use crate::storage::{CertificateRepository, Directory};
use actix_web::{web, HttpResponse};
use common::model::certificate::Certificate;
use common::responses::CertificateDetail;

/// Attaches the user and course records, either of which may have been removed since.
pub(super) fn detail(state: &AppState, certificate: Certificate) -> Result<CertificateDetail, AppError> {
    let user = state.db.find_user(&certificate.user_id)?;
    let course = state.db.find_course(&certificate.course_id)?;
    Ok(CertificateDetail {
        certificate,
        user,
        course,
    })
}

/// `GET /api/certificates/{id}`
pub async fn process(
    id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();
    let found = web::block(move || {
        let certificate = state
            .db
            .find_certificate(&id)?
            .ok_or_else(|| AppError::not_found("Certificado"))?;
        detail(&state, certificate)
    })
    .await??;
    Ok(HttpResponse::Ok().json(found))
}
