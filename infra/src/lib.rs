//! # Infrastructure Layer
//!
//! This crate implements the infrastructure layer for Sigil, following
//! Clean Architecture principles. It provides:
//! - **Database**: repository implementations for signing keys and refresh
//!   token records
//! - **Telemetry**: tracing subscriber setup
//! - **Configuration**: `.env` and environment loading
//! - **Services**: the container wiring key rotation and token issuance

// Re-export core types for convenience
pub use sg_core::errors::*;

/// Database module - repository implementations
pub mod database;

/// Configuration loading
pub mod config;

pub mod error;

/// Service container
pub mod services;

/// Tracing setup
pub mod telemetry;

pub use config::load_config;
pub use error::InfrastructureError;
pub use services::Services;
