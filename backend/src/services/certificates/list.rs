use super::get::detail;
use crate::error::AppError;
use crate::identity::Caller;
use crate::state::AppState;
use crate::storage::CertificateRepository;
use actix_web::{web, HttpResponse};
use common::responses::CertificateDetail;

fn list_for(state: &AppState, user_id: &str) -> Result<Vec<CertificateDetail>, AppError> {
    state
        .db
        .list_certificates_for_user(user_id)?
        .into_iter()
        .map(|certificate| detail(state, certificate))
        .collect()
}

/// `GET /api/certificates/user/{user_id}`
pub async fn by_user(
    user_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let user_id = user_id.into_inner();
    let certificates = web::block(move || list_for(&state, &user_id)).await??;
    Ok(HttpResponse::Ok().json(certificates))
}

/// `GET /api/certificates/mine`
pub async fn mine(caller: Caller, state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let certificates = web::block(move || list_for(&state, caller.id())).await??;
    Ok(HttpResponse::Ok().json(certificates))
}
