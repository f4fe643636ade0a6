//! Value objects representing immutable domain concepts.

pub mod jwks;

// Re-export commonly used types
pub use jwks::{Jwk, Jwks};
