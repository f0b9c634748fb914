use crate::error::AppError;
use crate::exam::ExamSubmission;
use crate::identity::Caller;
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use common::requests::SubmitExamRequest;
use common::responses::SubmitExamResponse;

fn submission_from(request: SubmitExamRequest) -> Result<ExamSubmission, AppError> {
    let assignment_id = request
        .assignment_id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::invalid("assignmentId es requerido"))?;
    let (Some(total), Some(correct)) = (request.total, request.correct) else {
        return Err(AppError::invalid("total y correct son requeridos"));
    };
    Ok(ExamSubmission {
        assignment_id,
        exam_id: request.exam_id,
        score: request.score,
        total,
        correct,
        answers: request.answers,
    })
}

/// `POST /api/examenes/submit`
pub async fn process(
    caller: Caller,
    payload: web::Json<SubmitExamRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let submission = submission_from(payload.into_inner())?;
    let outcome = web::block(move || state.recorder().submit(submission, caller.id())).await??;
    let message = if outcome.passed {
        "Examen aprobado"
    } else {
        "No alcanzaste el puntaje mínimo"
    };
    Ok(HttpResponse::Ok().json(SubmitExamResponse {
        ok: true,
        message: message.to_string(),
        exam_result: outcome,
    }))
}
