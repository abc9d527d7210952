use crate::middleware::error_handling;
use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("server start failure: {0}")]
    StartServer(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn queue_not_found(queue_id: u64) -> Self {
        AppError::NotFound(format!("queue {queue_id} was not a part of the discussion"))
    }

    pub fn entry_not_found(queue_id: u64, entry_id: u64) -> Self {
        AppError::NotFound(format!("entry {entry_id} is not in queue {queue_id}"))
    }

    /// Returns HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::BadRequest(_) => 400,
            AppError::Unauthorized => 401,
            AppError::Forbidden(_) => 403,
            AppError::NotFound(_) => 404,
            AppError::Config(_) | AppError::StartServer(_) | AppError::Internal(_) => 500,
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(AppError::status_code(self)).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> HttpResponse {
        error_handling::into_response(self)
    }
}
