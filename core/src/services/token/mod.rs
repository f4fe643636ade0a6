//! Token service module for JWT management
//!
//! This module handles all token-related operations including:
//! - ES256 signing and verification against the rotating key pool
//! - Refresh token records and single-use rotation
//! - The early-renewal guard on refresh

mod codec;
mod config;
mod service;

#[cfg(test)]
mod tests;

pub use codec::{DecodedToken, TokenCodec};
pub use config::{TokenConfig, TokenServiceConfig};
pub use service::TokenService;
