//! # HTTP Errors
//!
//! Every per-request failure ends here and becomes a JSON error body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::engine::EngineError;
use crate::functions::FunctionError;
use crate::validation::{ValidationError, ValidationIssue};

/// Result type for route handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors surfaced by route handlers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Function(#[from] FunctionError),

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Engine(#[from] EngineError),

    /// Body is not JSON or not the expected shape
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("Not found")]
    NotFound,
}

impl ApiError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        let code = match self {
            ApiError::Function(e) => e.status_code(),
            ApiError::Validation(e) => e.status_code(),
            ApiError::Engine(e) => e.status_code(),
            ApiError::InvalidBody(_) => 400,
            ApiError::NotFound => 404,
        };
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<ValidationIssue>,
}

impl From<&ApiError> for ErrorResponse {
    fn from(err: &ApiError) -> Self {
        let details = match err {
            ApiError::Validation(e) => e.issues().to_vec(),
            _ => Vec::new(),
        };
        Self {
            error: err.to_string(),
            details,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorResponse::from(&self));
        (status, body).into_response()
    }
}
