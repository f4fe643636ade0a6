//! Persistence collaborator contracts.
//!
//! Concrete storage lives outside the core crate; these traits are the only
//! surface the services depend on.

pub mod refresh_token;
pub mod signing_key;

pub use refresh_token::RefreshTokenRepository;
pub use signing_key::{KeySelector, SigningKeyRepository};

#[cfg(test)]
pub use refresh_token::MockRefreshTokenRepository;
#[cfg(test)]
pub use signing_key::MockSigningKeyRepository;
