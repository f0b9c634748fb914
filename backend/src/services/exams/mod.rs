//! # Exam Service Module
//!
//! Routes requests under `/api/examenes`. Only submission of a graded attempt
//! is handled here; exam content is managed elsewhere.

mod submit;

use actix_web::web::{post, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/examenes";

/// *   **`POST /submit`** (`submit::process`): records the attempt on the
///     caller's assignment and answers with the pass/fail outcome.
pub fn configure_routes() -> Scope {
    scope(API_PATH).route("/submit", post().to(submit::process))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::USER_HEADER;
    use crate::services::testing::seeded_state;
    use crate::storage::AssignmentRepository;
    use actix_web::http::StatusCode;
    use actix_web::{test, web, App};
    use serde_json::{json, Value};

    fn body(correct: u32) -> Value {
        json!({
            "examId": "e1",
            "assignmentId": "a1",
            "total": 20,
            "correct": correct,
            "answers": [{ "q": 1, "a": "b" }]
        })
    }

    #[actix_web::test]
    async fn owner_submission_reports_outcome() {
        let (state, _dir) = seeded_state();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state.clone()))
                .service(configure_routes()),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/examenes/submit")
            .insert_header((USER_HEADER, "u1"))
            .set_json(body(15))
            .to_request();
        let resp: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(resp["ok"], true);
        assert_eq!(resp["examResult"]["passed"], true);
        assert_eq!(resp["examResult"]["minimumPassScore"], 14);
        assert_eq!(resp["examResult"]["score"], 15.0);
    }

    #[actix_web::test]
    async fn other_students_are_forbidden() {
        let (state, _dir) = seeded_state();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state.clone()))
                .service(configure_routes()),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/examenes/submit")
            .insert_header((USER_HEADER, "u2"))
            .set_json(body(20))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);
        let assignment = state.db.find_assignment("a1").unwrap().unwrap();
        assert_eq!(assignment.attempts, 0);
        assert!(assignment.exam_attempt.is_none());
    }

    #[actix_web::test]
    async fn incomplete_requests_are_rejected() {
        let (state, _dir) = seeded_state();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state.clone()))
                .service(configure_routes()),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/examenes/submit")
            .set_json(body(20))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::post()
            .uri("/api/examenes/submit")
            .insert_header((USER_HEADER, "u1"))
            .set_json(json!({ "assignmentId": "a1", "correct": 3 }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri("/api/examenes/submit")
            .insert_header((USER_HEADER, "u1"))
            .set_json(json!({ "assignmentId": "nope", "total": 10, "correct": 3 }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }
}
