//! JWT issuance configuration

use serde::{Deserialize, Serialize};

/// JWT issuance and verification configuration
///
/// All durations are expressed in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct JwtConfig {
    /// `iss` claim written into and required from every token
    pub issuer: String,

    /// `aud` claim written into and required from every token
    pub audience: String,

    /// Signing algorithm (only ES256 is backed by the key pool)
    #[serde(default = "default_algorithm")]
    pub algorithm: String,

    /// Access token lifetime
    pub access_token_expiry: i64,

    /// Refresh token lifetime
    pub refresh_token_expiry: i64,

    /// A refresh token may only be renewed once its remaining lifetime
    /// drops below this window
    pub refresh_renewal_window: i64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            issuer: String::from("sigil"),
            audience: String::from("sigil-api"),
            algorithm: default_algorithm(),
            access_token_expiry: 900,       // 15 minutes
            refresh_token_expiry: 604_800,  // 7 days
            refresh_renewal_window: 86_400, // 1 day
        }
    }
}

impl JwtConfig {
    /// Load from `JWT_*` environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            issuer: std::env::var("JWT_ISSUER").unwrap_or(defaults.issuer),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or(defaults.audience),
            algorithm: std::env::var("JWT_ALGORITHM").unwrap_or(defaults.algorithm),
            access_token_expiry: env_or("JWT_ACCESS_TOKEN_EXPIRY", defaults.access_token_expiry),
            refresh_token_expiry: env_or("JWT_REFRESH_TOKEN_EXPIRY", defaults.refresh_token_expiry),
            refresh_renewal_window: env_or(
                "JWT_REFRESH_RENEWAL_WINDOW",
                defaults.refresh_renewal_window,
            ),
        }
    }

    /// Set access token expiry in minutes
    pub fn with_access_expiry_minutes(mut self, minutes: i64) -> Self {
        self.access_token_expiry = minutes * 60;
        self
    }

    /// Set refresh token expiry and renewal window in seconds
    pub fn with_refresh_expiry(mut self, expiry: i64, renewal_window: i64) -> Self {
        self.refresh_token_expiry = expiry;
        self.refresh_renewal_window = renewal_window;
        self
    }

    /// Check the lifetimes are usable together
    pub fn validate(&self) -> Result<(), String> {
        if self.access_token_expiry <= 0 {
            return Err("access_token_expiry must be positive".to_string());
        }
        if self.refresh_token_expiry <= 0 {
            return Err("refresh_token_expiry must be positive".to_string());
        }
        if self.refresh_renewal_window < 0 || self.refresh_renewal_window > self.refresh_token_expiry {
            return Err(format!(
                "refresh_renewal_window must be within 0..={} seconds",
                self.refresh_token_expiry
            ));
        }
        Ok(())
    }
}

fn default_algorithm() -> String {
    String::from("ES256")
}

pub(crate) fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}
