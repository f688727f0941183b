//! Error handling for RateGate
//!
//! This module defines the service-wide error type and its HTTP mapping.

use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

/// Result type alias for RateGate
pub type Result<T> = std::result::Result<T, RateGateError>;

/// Main error type for the service
#[derive(Error, Debug)]
pub enum RateGateError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Request referenced an API key that is not registered
    #[error("Invalid API key")]
    UnknownApiKey,

    /// Requested resource does not exist
    #[error("{0} not found")]
    NotFound(String),

    /// Invalid fields on an admin or load-test request
    #[error("Validation error: {0}")]
    Validation(String),

    /// Storage backend errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Redis errors
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON error body, `{"detail": "..."}` on the wire
#[derive(Debug, Serialize)]
struct ErrorBody {
    detail: String,
}

impl ResponseError for RateGateError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        use actix_web::http::StatusCode;

        match self {
            RateGateError::UnknownApiKey => StatusCode::UNAUTHORIZED,
            RateGateError::NotFound(_) => StatusCode::NOT_FOUND,
            RateGateError::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        // 5xx details stay out of responses; clients get a generic message.
        let detail = if status.is_server_error() {
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        HttpResponse::build(status).json(ErrorBody { detail })
    }
}
