//! Shared JSON error body for the discussion services.
//!
//! Every service maps its own error enum onto [`ErrorResponse`] so that the
//! web client can branch on `error_type`/`code` without parsing messages.

use serde::{Deserialize, Serialize};

/// Uniform API error body returned by every handler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Reason phrase of the HTTP status ("Not Found", "Forbidden", ...)
    pub error: String,

    /// Human readable explanation
    pub message: String,

    /// HTTP status code
    pub status: u16,

    /// Coarse category, one of [`error_types`]
    pub error_type: String,

    /// Stable machine code, one of [`error_codes`]
    pub code: String,

    /// RFC 3339 timestamp
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error: &str, message: &str, status: u16, error_type: &str, code: &str) -> Self {
        Self {
            error: error.to_string(),
            message: message.to_string(),
            status,
            error_type: error_type.to_string(),
            code: code.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Stable error codes
pub mod error_codes {
    // Identity
    pub const IDENTITY_MISSING: &str = "IDENTITY_MISSING";
    pub const FORBIDDEN: &str = "FORBIDDEN";

    // Requests
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const INVALID_REQUEST: &str = "INVALID_REQUEST";

    // System
    pub const INTERNAL_SERVER_ERROR: &str = "INTERNAL_SERVER_ERROR";
}

/// Error categories
pub mod error_types {
    pub const VALIDATION_ERROR: &str = "validation_error";
    pub const AUTHENTICATION_ERROR: &str = "authentication_error";
    pub const AUTHORIZATION_ERROR: &str = "authorization_error";
    pub const NOT_FOUND_ERROR: &str = "not_found_error";
    pub const SERVER_ERROR: &str = "server_error";
}
