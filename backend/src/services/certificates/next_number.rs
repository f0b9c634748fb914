use crate::error::AppError;
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use chrono::{Datelike, Local};
use common::requests::NextNumberQuery;
use common::responses::NextNumberResponse;

/// `GET /api/certificates/next-number?year=YYYY`; the year defaults to the current one.
pub async fn process(
    query: web::Query<NextNumberQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let year = query.year.unwrap_or_else(|| Local::now().year());
    let number = web::block(move || state.template_store().peek_next_number(year)).await??;
    Ok(HttpResponse::Ok().json(NextNumberResponse { number }))
}
