//! JWT encoding, decoding and verification
//!
//! Tokens are ES256 JWTs carrying `iss`, `aud`, `iat`, `exp`, `jti`, an
//! optional `token_use`, and the application claims nested under `claim`.
//! The signing key id travels in the `kid` header.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, Header, Validation};
use std::sync::Arc;
use tracing::{debug, error};

use crate::domain::entities::signing_key::SigningKey;
use crate::domain::entities::token::{ClaimSet, IssuedToken, JwtClaims, TokenUse};
use crate::errors::{DomainError, DomainResult, TokenError};
use crate::services::clock::{Clock, SystemClock};

use super::config::TokenConfig;

/// Header and payload read without checking the signature
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedToken {
    pub key_id: Option<String>,
    pub algorithm: Algorithm,
    pub claims: JwtClaims,
}

pub struct TokenCodec {
    clock: Arc<dyn Clock>,
}

impl Default for TokenCodec {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl TokenCodec {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Sign a token with `key`
    ///
    /// `exp` is `iat + config.lifetime_seconds` and `jti` is `jwt_id`.
    pub fn issue(
        &self,
        jwt_id: &str,
        claims: &ClaimSet,
        token_use: TokenUse,
        key: &SigningKey,
        config: &TokenConfig,
    ) -> DomainResult<IssuedToken> {
        let iat = self.clock.now().timestamp();
        let payload = JwtClaims {
            iss: config.issuer.clone(),
            aud: config.audience.clone(),
            iat,
            exp: iat + config.lifetime_seconds,
            jti: jwt_id.to_string(),
            token_use: Some(token_use),
            claim: claims.clone(),
        };

        let mut header = Header::new(Algorithm::ES256);
        header.kid = Some(key.id.clone());

        let token = jsonwebtoken::encode(&header, &payload, &key.encoding_key()).map_err(|e| {
            error!(key_id = %key.id, error = %e, "Failed to sign token");
            TokenError::TokenGenerationFailed
        })?;

        Ok(IssuedToken::new(token, config.lifetime_seconds))
    }

    /// Parse a token without verifying it
    ///
    /// # Errors
    /// * `TokenError::MalformedToken` - Not three segments, or a segment is
    ///   not valid base64url JSON
    pub fn decode(&self, token: &str) -> DomainResult<DecodedToken> {
        let segments: Vec<&str> = token.split('.').collect();
        if segments.len() != 3 || segments.iter().any(|s| s.is_empty()) {
            return Err(TokenError::MalformedToken.into());
        }

        let header = jsonwebtoken::decode_header(token).map_err(|_| TokenError::MalformedToken)?;
        let payload = URL_SAFE_NO_PAD
            .decode(segments[1])
            .map_err(|_| TokenError::MalformedToken)?;
        let claims: JwtClaims =
            serde_json::from_slice(&payload).map_err(|_| TokenError::MalformedToken)?;
        URL_SAFE_NO_PAD
            .decode(segments[2])
            .map_err(|_| TokenError::MalformedToken)?;

        Ok(DecodedToken {
            key_id: header.kid,
            algorithm: header.alg,
            claims,
        })
    }

    /// Verify a token signed by `key`
    ///
    /// Checks run in order: signature, issuer and audience; expiry; then the
    /// renewal guard, which refuses a token while its remaining lifetime is
    /// still at least `config.renewal_window_seconds`. A window of 0 turns
    /// the guard off.
    pub fn verify(
        &self,
        token: &str,
        key: &SigningKey,
        algorithm: Algorithm,
        config: &TokenConfig,
    ) -> DomainResult<JwtClaims> {
        let header = jsonwebtoken::decode_header(token).map_err(|_| TokenError::MalformedToken)?;
        if header.kid.as_deref() != Some(key.id.as_str()) {
            debug!(expected = %key.id, found = ?header.kid, "Token signed by another key");
            return Err(TokenError::SignatureInvalid.into());
        }

        let mut validation = Validation::new(algorithm);
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_audience(&[config.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);
        // Expiry is checked below against the injected clock
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.leeway = 0;

        let claims = jsonwebtoken::decode::<JwtClaims>(token, &key.decoding_key()?, &validation)
            .map_err(classify)?
            .claims;

        let now = self.clock.now();
        if claims.is_expired_at(now) {
            return Err(TokenError::TokenExpired.into());
        }

        let window = config.renewal_window_seconds;
        if window > 0 && claims.remaining_seconds(now) >= window {
            return Err(TokenError::RenewalTooEarly.into());
        }

        Ok(claims)
    }
}

fn classify(e: jsonwebtoken::errors::Error) -> DomainError {
    let error = match e.kind() {
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm | ErrorKind::InvalidEcdsaKey => {
            TokenError::SignatureInvalid
        }
        ErrorKind::InvalidIssuer => TokenError::ClaimMismatch {
            claim: "iss".to_string(),
        },
        ErrorKind::InvalidAudience => TokenError::ClaimMismatch {
            claim: "aud".to_string(),
        },
        ErrorKind::MissingRequiredClaim(claim) => TokenError::ClaimMismatch {
            claim: claim.clone(),
        },
        ErrorKind::ExpiredSignature => TokenError::TokenExpired,
        _ => TokenError::MalformedToken,
    };
    debug!(error = %e, "Token rejected");
    error.into()
}
