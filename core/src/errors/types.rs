//! Error types for signing keys, tokens and scheduled tasks
//!
//! Messages are English only; the transport layer maps `error_code()` to
//! whatever presentation it needs.

use thiserror::Error;

/// Signing key pool and key material errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("Invalid key status for this operation: {status}")]
    InvalidKeyStatus { status: String },

    #[error("No usable signing key available")]
    NoUsableKey,

    #[error("Key generation failed: {message}")]
    KeyGenerationFailed { message: String },

    #[error("Invalid key material: {message}")]
    InvalidKeyMaterial { message: String },
}

impl KeyError {
    pub fn error_code(&self) -> &'static str {
        match self {
            KeyError::InvalidKeyStatus { .. } => "INVALID_KEY_STATUS",
            KeyError::NoUsableKey => "NO_USABLE_KEY",
            KeyError::KeyGenerationFailed { .. } => "KEY_GENERATION_FAILED",
            KeyError::InvalidKeyMaterial { .. } => "INVALID_KEY_MATERIAL",
        }
    }
}

/// Token encoding, verification and renewal errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Malformed token")]
    MalformedToken,

    #[error("Token signature verification failed")]
    SignatureInvalid,

    #[error("Token claim mismatch: {claim}")]
    ClaimMismatch { claim: String },

    #[error("Token expired")]
    TokenExpired,

    #[error("Too early request refresh token")]
    RenewalTooEarly,

    #[error("Invalid claim: {claim}")]
    InvalidClaim { claim: String },

    #[error("Token generation failed")]
    TokenGenerationFailed,

    #[error("Token revoked")]
    TokenRevoked,
}

impl TokenError {
    pub fn error_code(&self) -> &'static str {
        match self {
            TokenError::MalformedToken => "MALFORMED_TOKEN",
            TokenError::SignatureInvalid => "SIGNATURE_INVALID",
            TokenError::ClaimMismatch { .. } => "CLAIM_MISMATCH",
            TokenError::TokenExpired => "TOKEN_EXPIRED",
            TokenError::RenewalTooEarly => "RENEWAL_TOO_EARLY",
            TokenError::InvalidClaim { .. } => "INVALID_CLAIM",
            TokenError::TokenGenerationFailed => "TOKEN_GENERATION_FAILED",
            TokenError::TokenRevoked => "TOKEN_REVOKED",
        }
    }
}

/// Failures of the task execution context itself
///
/// Errors returned by a task's action are surfaced unchanged and never
/// wrapped in this type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("Task panicked: {name}")]
    TaskPanicked { name: String },
}

impl SchedulerError {
    pub fn error_code(&self) -> &'static str {
        match self {
            SchedulerError::TaskPanicked { .. } => "TASK_PANICKED",
        }
    }
}
