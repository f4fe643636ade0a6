//! Infrastructure-specific error types

use sg_core::errors::DomainError;

#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Tracing subscriber could not be installed
    #[error("Telemetry error: {0}")]
    Telemetry(String),

    /// Error surfaced by a domain service
    #[error(transparent)]
    Domain(#[from] DomainError),
}
