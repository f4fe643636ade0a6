//! Domain-specific error types and error handling.

mod types;

// Re-export all error types
pub use types::{KeyError, SchedulerError, TokenError};

use thiserror::Error;

/// Core domain errors (general purpose)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    // Bridge to specific error types
    #[error(transparent)]
    Key(#[from] KeyError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
}

impl DomainError {
    /// Stable machine-readable code for the transport boundary
    pub fn error_code(&self) -> &'static str {
        match self {
            DomainError::Validation { .. } => "VALIDATION_ERROR",
            DomainError::NotFound { .. } => "NOT_FOUND",
            DomainError::Internal { .. } => "INTERNAL_ERROR",
            DomainError::Key(e) => e.error_code(),
            DomainError::Token(e) => e.error_code(),
            DomainError::Scheduler(e) => e.error_code(),
        }
    }

    /// Whether the caller should answer with an authentication failure
    ///
    /// Early renewal and expiry stay distinct variants for diagnostics but
    /// both land here.
    pub fn is_authentication_failure(&self) -> bool {
        match self {
            DomainError::Token(e) => !matches!(e, TokenError::TokenGenerationFailed),
            _ => false,
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests;
