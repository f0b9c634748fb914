use crate::certificate::EnsureTarget;
use crate::error::AppError;
use crate::identity::Caller;
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use common::requests::EnsureCertificateRequest;
use common::responses::EnsureCertificateResponse;

fn present(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// `assignmentId` wins; otherwise `courseId` with `userId`, which defaults to the caller.
fn target_from(request: EnsureCertificateRequest, caller: &Caller) -> Result<EnsureTarget, AppError> {
    if let Some(id) = present(request.assignment_id) {
        return Ok(EnsureTarget::Assignment(id));
    }
    match present(request.course_id) {
        Some(course_id) => Ok(EnsureTarget::Pair {
            user_id: present(request.user_id).unwrap_or_else(|| caller.id().to_string()),
            course_id,
        }),
        None => Err(AppError::invalid("Se requiere assignmentId o courseId")),
    }
}

/// `POST /api/certificates/ensure`
pub async fn process(
    caller: Caller,
    payload: web::Json<EnsureCertificateRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let target = target_from(payload.into_inner(), &caller)?;
    log::debug!("User {} requests certificate for {:?}", caller.id(), target);
    let certificate = web::block(move || state.issuer().ensure_for_assignment(&target)).await??;
    Ok(HttpResponse::Ok().json(EnsureCertificateResponse {
        ok: true,
        certificate,
    }))
}
