//! Domain entities representing core business objects.

pub mod signing_key;
pub mod token;

// Re-export commonly used types
pub use signing_key::{KeyStatus, SigningKey, P256_PUBLIC_KEY_LEN};
pub use token::{
    ClaimSet, IssuedToken, JwtClaims, RefreshTokenRecord, TokenPair, TokenUse, USER_UID_CLAIM,
};
