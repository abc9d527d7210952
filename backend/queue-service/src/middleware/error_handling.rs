use crate::error::AppError;
use actix_web::{
    error::{JsonPayloadError, PathError},
    http::StatusCode,
    HttpRequest, HttpResponse,
};
use error_types::{error_codes, error_types as kinds, ErrorResponse};

/// Maps domain errors to HTTP error bodies
pub fn map_error(err: &AppError) -> (StatusCode, ErrorResponse) {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let (error_type, code) = match err {
        AppError::BadRequest(_) => (kinds::VALIDATION_ERROR, error_codes::INVALID_REQUEST),
        AppError::Unauthorized => (kinds::AUTHENTICATION_ERROR, error_codes::IDENTITY_MISSING),
        AppError::Forbidden(_) => (kinds::AUTHORIZATION_ERROR, error_codes::FORBIDDEN),
        AppError::NotFound(_) => (kinds::NOT_FOUND_ERROR, error_codes::NOT_FOUND),
        AppError::Config(_) | AppError::StartServer(_) | AppError::Internal(_) => {
            (kinds::SERVER_ERROR, error_codes::INTERNAL_SERVER_ERROR)
        }
    };

    let response = ErrorResponse::new(
        status.canonical_reason().unwrap_or("Error"),
        &err.to_string(),
        status.as_u16(),
        error_type,
        code,
    );

    (status, response)
}

pub fn into_response(err: &AppError) -> HttpResponse {
    if let AppError::Internal(msg) = err {
        tracing::error!(error = %msg, "internal error while handling request");
    }
    let (status, body) = map_error(err);
    HttpResponse::build(status).json(body)
}

/// Turns unparsable path segments (e.g. a non-integer queue id) into 400s.
pub fn path_error_handler(err: PathError, _req: &HttpRequest) -> actix_web::Error {
    AppError::BadRequest(format!("error parsing id to int: {err}")).into()
}

/// Turns undecodable JSON bodies into 400s.
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::BadRequest(format!("error decoding body: {err}")).into()
}
