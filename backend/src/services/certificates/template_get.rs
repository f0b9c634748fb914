use crate::error::AppError;
use crate::state::AppState;
use actix_web::{web, HttpResponse};

pub async fn process(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let template = web::block(move || state.template_store().get_template()).await??;
    Ok(HttpResponse::Ok().json(template))
}
