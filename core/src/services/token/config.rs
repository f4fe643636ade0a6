//! Configuration for token issuance and verification

use jsonwebtoken::Algorithm;
use sg_shared::config::JwtConfig;
use std::str::FromStr;

use crate::errors::{DomainError, DomainResult};

/// Issuer, audience and timing for one kind of token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenConfig {
    pub issuer: String,
    pub audience: String,
    /// Seconds from issuance to `exp`
    pub lifetime_seconds: i64,
    /// Renewal is refused while at least this many seconds remain; 0 disables
    pub renewal_window_seconds: i64,
}

impl TokenConfig {
    pub fn new(issuer: impl Into<String>, audience: impl Into<String>, lifetime_seconds: i64) -> Self {
        Self {
            issuer: issuer.into(),
            audience: audience.into(),
            lifetime_seconds,
            renewal_window_seconds: 0,
        }
    }

    pub fn with_renewal_window(mut self, seconds: i64) -> Self {
        self.renewal_window_seconds = seconds;
        self
    }

    /// Same issuer, audience and lifetime with the renewal guard off
    pub fn without_renewal_window(&self) -> Self {
        self.clone().with_renewal_window(0)
    }
}

/// Configuration for the token service
#[derive(Debug, Clone)]
pub struct TokenServiceConfig {
    /// JWT signing algorithm
    pub algorithm: Algorithm,
    pub access: TokenConfig,
    pub refresh: TokenConfig,
}

impl TokenServiceConfig {
    /// Build from the shared JWT settings
    ///
    /// Only ES256 is supported since signing keys are P-256.
    pub fn from_jwt_config(config: &JwtConfig) -> DomainResult<Self> {
        config
            .validate()
            .map_err(|message| DomainError::Validation { message })?;

        let algorithm = Algorithm::from_str(&config.algorithm).map_err(|_| DomainError::Validation {
            message: format!("Unknown JWT algorithm {}", config.algorithm),
        })?;
        if algorithm != Algorithm::ES256 {
            return Err(DomainError::Validation {
                message: format!("Unsupported JWT algorithm {:?}, expected ES256", algorithm),
            });
        }

        Ok(Self {
            algorithm,
            access: TokenConfig::new(&config.issuer, &config.audience, config.access_token_expiry),
            refresh: TokenConfig::new(&config.issuer, &config.audience, config.refresh_token_expiry)
                .with_renewal_window(config.refresh_renewal_window),
        })
    }
}

impl Default for TokenServiceConfig {
    fn default() -> Self {
        let jwt = JwtConfig::default();
        Self {
            algorithm: Algorithm::ES256,
            access: TokenConfig::new(&jwt.issuer, &jwt.audience, jwt.access_token_expiry),
            refresh: TokenConfig::new(&jwt.issuer, &jwt.audience, jwt.refresh_token_expiry)
                .with_renewal_window(jwt.refresh_renewal_window),
        }
    }
}
