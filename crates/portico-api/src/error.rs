//! Portico — API error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use portico_core::error::DomainError;
use serde::Serialize;
use thiserror::Error;

/// HTTP-layer errors. Response bodies carry fixed human-readable messages
/// only; internal failure detail is logged at the boundary, never surfaced.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed request input.
    #[error("{0}")]
    Validation(String),

    /// No verified principal attached to the request.
    #[error("Authentication required")]
    Unauthorized,

    /// The principal lacks the required role.
    #[error("Admin access required")]
    Forbidden,

    /// Unexpected processing failure, surfaced with a fixed message.
    #[error("{0}")]
    Internal(&'static str),
}

impl ApiError {
    /// Maps a domain error, logging unexpected failures and replacing them
    /// with the endpoint's fixed public message.
    #[must_use]
    pub fn from_domain(err: DomainError, public_message: &'static str) -> Self {
        match err {
            DomainError::Validation(msg) => Self::Validation(msg),
            other => {
                tracing::error!(error = %other, "analytics request failed");
                Self::Internal(public_message)
            }
        }
    }
}

/// JSON body returned for error responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Human-readable error message.
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = ErrorBody {
            error: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
