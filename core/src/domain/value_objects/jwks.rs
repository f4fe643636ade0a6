//! JSON Web Key Set published for token verifiers (RFC 7517).

use serde::{Deserialize, Serialize};

/// A single elliptic-curve public key entry
///
/// Only ES256 keys are issued, so the EC members are always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwk {
    pub kty: String,
    pub kid: String,
    #[serde(rename = "use")]
    pub key_use: String,
    pub alg: String,
    pub crv: String,
    /// Base64url affine x coordinate
    pub x: String,
    /// Base64url affine y coordinate
    pub y: String,
}

impl Jwk {
    /// EC P-256 signature key
    pub fn es256(kid: String, x: String, y: String) -> Self {
        Self {
            kty: "EC".to_string(),
            kid,
            key_use: "sig".to_string(),
            alg: "ES256".to_string(),
            crv: "P-256".to_string(),
            x,
            y,
        }
    }
}

/// The `{keys: [...]}` document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwks {
    pub keys: Vec<Jwk>,
}

impl Jwks {
    pub fn new(keys: Vec<Jwk>) -> Self {
        Self { keys }
    }

    pub fn find(&self, kid: &str) -> Option<&Jwk> {
        self.keys.iter().find(|key| key.kid == kid)
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
