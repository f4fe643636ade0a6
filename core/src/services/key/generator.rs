//! P-256 key pair generation

use chrono::{DateTime, Utc};
use ring::rand::SystemRandom;
use ring::signature::{EcdsaKeyPair, KeyPair, ECDSA_P256_SHA256_FIXED_SIGNING};
use uuid::Uuid;

use crate::domain::entities::signing_key::SigningKey;
use crate::errors::KeyError;

/// Produces fresh signing keys
pub trait KeyGenerator: Send + Sync {
    /// A new active key created at `created_at`
    fn generate(&self, created_at: DateTime<Utc>) -> Result<SigningKey, KeyError>;
}

/// ES256 keys backed by `ring`
///
/// The private key is stored as PKCS#8 DER and the public key as an
/// uncompressed SEC1 point, which is what `jsonwebtoken` and JWKS expect.
pub struct EcdsaKeyGenerator {
    rng: SystemRandom,
}

impl EcdsaKeyGenerator {
    pub fn new() -> Self {
        Self {
            rng: SystemRandom::new(),
        }
    }
}

impl Default for EcdsaKeyGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyGenerator for EcdsaKeyGenerator {
    fn generate(&self, created_at: DateTime<Utc>) -> Result<SigningKey, KeyError> {
        let pkcs8 = EcdsaKeyPair::generate_pkcs8(&ECDSA_P256_SHA256_FIXED_SIGNING, &self.rng)
            .map_err(|_| KeyError::KeyGenerationFailed {
                message: "Failed to generate P-256 key pair".to_string(),
            })?;

        let pair = EcdsaKeyPair::from_pkcs8(&ECDSA_P256_SHA256_FIXED_SIGNING, pkcs8.as_ref(), &self.rng)
            .map_err(|e| KeyError::KeyGenerationFailed {
                message: format!("Generated key pair was rejected: {}", e),
            })?;

        Ok(SigningKey::new(
            Uuid::new_v4().simple().to_string(),
            pkcs8.as_ref().to_vec(),
            pair.public_key().as_ref().to_vec(),
            created_at,
        ))
    }
}
