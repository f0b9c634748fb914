//! Identity of the calling user, as forwarded by the authentication layer in
//! front of this service.

use crate::error::AppError;
use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};
use std::future::{ready, Ready};

pub const USER_HEADER: &str = "x-user-id";

/// Id of the authenticated user making the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller(pub String);

impl Caller {
    pub fn id(&self) -> &str {
        &self.0
    }
}

fn extract_user_id(req: &HttpRequest) -> Option<String> {
    let value = req.headers().get(USER_HEADER)?.to_str().ok()?.trim();
    (!value.is_empty()).then(|| value.to_string())
}

impl FromRequest for Caller {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(extract_user_id(req).map(Caller).ok_or(AppError::Unauthenticated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[actix_web::test]
    async fn header_identifies_the_caller() {
        let req = TestRequest::default()
            .insert_header((USER_HEADER, " u1 "))
            .to_http_request();
        let caller = Caller::extract(&req).await.unwrap();
        assert_eq!(caller.id(), "u1");
    }

    #[actix_web::test]
    async fn missing_or_blank_header_is_unauthenticated() {
        let req = TestRequest::default().to_http_request();
        assert!(matches!(Caller::extract(&req).await, Err(AppError::Unauthenticated)));

        let req = TestRequest::default()
            .insert_header((USER_HEADER, ""))
            .to_http_request();
        assert!(matches!(Caller::extract(&req).await, Err(AppError::Unauthenticated)));
    }
}
