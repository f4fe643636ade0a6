//! Configuration module with business-specific sub-modules
//!
//! - `auth` - JWT issuance and renewal configuration
//! - `environment` - Environment detection and logging configuration
//! - `rotation` - Signing key pool bounds and rotation schedule

pub mod auth;
pub mod environment;
pub mod rotation;

use serde::{Deserialize, Serialize};

pub use auth::JwtConfig;
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use rotation::KeyRotationConfig;

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// JWT configuration
    #[serde(default)]
    pub jwt: JwtConfig,

    /// Signing key rotation configuration
    #[serde(default)]
    pub key_rotation: KeyRotationConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let env = Environment::default();
        Self {
            environment: env,
            jwt: JwtConfig::default(),
            key_rotation: KeyRotationConfig::default(),
            logging: LoggingConfig::for_environment(env),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let environment = Environment::from_env();
        Self {
            environment,
            jwt: JwtConfig::from_env(),
            key_rotation: KeyRotationConfig::from_env(),
            logging: LoggingConfig::from_env(environment),
        }
    }

    /// Validate every section, reporting the first problem found
    pub fn validate(&self) -> Result<(), String> {
        self.jwt.validate().map_err(|e| format!("jwt: {}", e))?;
        self.key_rotation
            .validate()
            .map_err(|e| format!("key_rotation: {}", e))
    }
}
