use crate::certificate::wording::parse_emit_date;
use crate::certificate::EmitCommand;
use crate::error::AppError;
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use common::requests::EmitCertificateRequest;
use common::responses::EmitCertificateResponse;

fn required(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Turns the request body into a command, rejecting missing ids and bad dates.
fn command_from(request: EmitCertificateRequest) -> Result<EmitCommand, AppError> {
    let (Some(user_id), Some(course_id)) = (required(request.user_id), required(request.course_id))
    else {
        return Err(AppError::invalid("userId y courseId son requeridos"));
    };
    let emit_date = match required(request.emit_date) {
        Some(text) => Some(parse_emit_date(&text)?),
        None => None,
    };
    Ok(EmitCommand {
        user_id,
        course_id,
        number: required(request.number),
        emit_date,
    })
}

/// `POST /api/certificates`: issues without checking the exam result.
pub async fn process(
    payload: web::Json<EmitCertificateRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let command = command_from(payload.into_inner())?;
    let certificate = web::block(move || state.issuer().emit(command)).await??;
    Ok(HttpResponse::Created().json(EmitCertificateResponse {
        mensaje: "Certificado emitido".to_string(),
        certificado: certificate,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn request(user: Option<&str>, course: Option<&str>, date: Option<&str>) -> EmitCertificateRequest {
        EmitCertificateRequest {
            user_id: user.map(String::from),
            course_id: course.map(String::from),
            number: Some("  ".into()),
            emit_date: date.map(String::from),
        }
    }

    #[test]
    fn blank_fields_count_as_missing() {
        let command = command_from(request(Some("u1"), Some("c1"), Some(" "))).unwrap();
        assert_eq!(command.number, None);
        assert_eq!(command.emit_date, None);
        assert!(command_from(request(Some(" "), Some("c1"), None)).is_err());
        assert!(command_from(request(Some("u1"), None, None)).is_err());
    }

    #[test]
    fn emit_date_is_parsed() {
        let command = command_from(request(Some("u1"), Some("c1"), Some("2025-08-20"))).unwrap();
        assert_eq!(command.emit_date, NaiveDate::from_ymd_opt(2025, 8, 20));
    }
}
