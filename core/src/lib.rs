//! # Sigil Core
//!
//! Core business logic and domain layer for the Sigil token service.
//! This crate contains domain entities, the signing key pool and its
//! rotation, the task scheduler, token issuance and renewal, repository
//! interfaces, and error types.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use repositories::*;
pub use services::*;
