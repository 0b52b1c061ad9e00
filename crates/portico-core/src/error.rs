//! Domain error types.

use thiserror::Error;

/// Top-level domain error type.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A validation error in domain logic.
    #[error("validation error: {0}")]
    Validation(String),

    /// An unexpected internal failure.
    #[error("internal error: {0}")]
    Internal(String),
}
