//! Shared configuration and common types for Sigil services
//!
//! This crate provides functionality used across all server modules:
//! - Configuration types loaded from the environment
//! - Cursor pagination types used by repository contracts

pub mod config;
pub mod types;

// Re-export commonly used items at crate root
pub use config::{AppConfig, Environment, JwtConfig, KeyRotationConfig, LogFormat, LoggingConfig};
pub use types::{CursorPage, CursorPagination, PaginationDirection};
