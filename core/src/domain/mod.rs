//! Domain layer containing business entities and value objects.

pub mod entities;
pub mod value_objects;

// Re-export commonly used domain types
pub use entities::{
    ClaimSet, IssuedToken, JwtClaims, KeyStatus, RefreshTokenRecord, SigningKey, TokenPair,
    TokenUse, P256_PUBLIC_KEY_LEN, USER_UID_CLAIM,
};
pub use value_objects::{Jwk, Jwks};
