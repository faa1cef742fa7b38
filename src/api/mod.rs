use actix_web::{HttpResponse, error::InternalError, http::StatusCode};
use serde_json::json;

pub mod admin;
pub mod attendance;
pub mod employee;
pub mod upload;

/// An `actix_web::Error` whose response body is `{"message": ...}`.
pub fn json_error(status: StatusCode, message: &'static str) -> actix_web::Error {
    InternalError::from_response(
        message,
        HttpResponse::build(status).json(json!({ "message": message })),
    )
    .into()
}

pub fn internal_error() -> actix_web::Error {
    json_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
}
