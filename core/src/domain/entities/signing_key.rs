//! Signing key entity used to mint and verify JWTs.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::Jwk;
use crate::errors::KeyError;

/// Length of an uncompressed SEC1 P-256 point (`0x04 || x || y`)
pub const P256_PUBLIC_KEY_LEN: usize = 65;

const P256_COORDINATE_LEN: usize = 32;

/// Lifecycle state of a signing key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyStatus {
    /// May sign new tokens
    Active,
    /// Kept only to verify tokens it already signed
    Inactive,
    /// Retired; excluded from verification
    Discarded,
}

impl std::fmt::Display for KeyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyStatus::Active => write!(f, "active"),
            KeyStatus::Inactive => write!(f, "inactive"),
            KeyStatus::Discarded => write!(f, "discarded"),
        }
    }
}

/// ECDSA P-256 key pair identified by its `kid`
#[derive(Clone, PartialEq, Eq)]
pub struct SigningKey {
    /// Key id written to the `kid` header
    pub id: String,

    /// PKCS#8 DER private key
    pub private_key: Vec<u8>,

    /// Uncompressed SEC1 public point
    pub public_key: Vec<u8>,

    /// Current lifecycle state
    pub status: KeyStatus,

    /// Timestamp when the key was generated
    pub created_at: DateTime<Utc>,

    /// Soft-delete marker, set when the key is discarded
    pub deleted_at: Option<DateTime<Utc>>,
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKey")
            .field("id", &self.id)
            .field("private_key", &"<redacted>")
            .field("status", &self.status)
            .field("created_at", &self.created_at)
            .field("deleted_at", &self.deleted_at)
            .finish()
    }
}

impl SigningKey {
    /// Creates a new active key
    pub fn new(
        id: impl Into<String>,
        private_key: Vec<u8>,
        public_key: Vec<u8>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            private_key,
            public_key,
            status: KeyStatus::Active,
            created_at,
            deleted_at: None,
        }
    }

    /// Copy of this key in another state
    pub fn with_status(&self, status: KeyStatus) -> Self {
        Self {
            status,
            ..self.clone()
        }
    }

    /// Copy of this key marked discarded at `at`
    pub fn discarded_at(&self, at: DateTime<Utc>) -> Self {
        Self {
            status: KeyStatus::Discarded,
            deleted_at: Some(at),
            ..self.clone()
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == KeyStatus::Active
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Key used to sign ES256 tokens
    pub fn encoding_key(&self) -> EncodingKey {
        EncodingKey::from_ec_der(&self.private_key)
    }

    /// Key used to verify ES256 tokens
    pub fn decoding_key(&self) -> Result<DecodingKey, KeyError> {
        let (x, y) = self.public_coordinates()?;
        DecodingKey::from_ec_components(&x, &y).map_err(|e| KeyError::InvalidKeyMaterial {
            message: format!("Invalid public key for {}: {}", self.id, e),
        })
    }

    /// Base64url `x` and `y` coordinates of the public point
    pub fn public_coordinates(&self) -> Result<(String, String), KeyError> {
        if self.public_key.len() != P256_PUBLIC_KEY_LEN || self.public_key[0] != 0x04 {
            return Err(KeyError::InvalidKeyMaterial {
                message: format!(
                    "Expected uncompressed P-256 point for {}, got {} bytes",
                    self.id,
                    self.public_key.len()
                ),
            });
        }
        let (x, y) = self.public_key[1..].split_at(P256_COORDINATE_LEN);
        Ok((URL_SAFE_NO_PAD.encode(x), URL_SAFE_NO_PAD.encode(y)))
    }

    /// Public half as a JSON Web Key
    pub fn to_jwk(&self) -> Result<Jwk, KeyError> {
        let (x, y) = self.public_coordinates()?;
        Ok(Jwk::es256(self.id.clone(), x, y))
    }
}
