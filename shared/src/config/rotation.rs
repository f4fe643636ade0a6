//! Signing key rotation configuration

use serde::{Deserialize, Serialize};

use super::auth::env_or;

/// Configuration for the signing key pool and its rotation schedule
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct KeyRotationConfig {
    /// Whether the daily rotation task is registered on start
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Maximum number of keys allowed to sign new tokens at once
    pub max_capacity: usize,

    /// How long an inactive key stays verifiable before it is discarded
    pub inactive_retention_seconds: i64,

    /// Time of day (UTC) the rotation fires
    pub rotation_hour: u32,
    pub rotation_minute: u32,
    pub rotation_second: u32,

    /// Interval between rotations once the first one has fired
    pub rotation_period_seconds: u64,
}

impl Default for KeyRotationConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            max_capacity: 3,
            inactive_retention_seconds: 604_800, // 7 days
            rotation_hour: 3,
            rotation_minute: 0,
            rotation_second: 0,
            rotation_period_seconds: 86_400, // daily
        }
    }
}

impl KeyRotationConfig {
    /// Load from `KEY_ROTATION_*` environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            enabled: env_or("KEY_ROTATION_ENABLED", defaults.enabled),
            max_capacity: env_or("KEY_ROTATION_MAX_CAPACITY", defaults.max_capacity),
            inactive_retention_seconds: env_or(
                "KEY_ROTATION_INACTIVE_RETENTION",
                defaults.inactive_retention_seconds,
            ),
            rotation_hour: env_or("KEY_ROTATION_HOUR", defaults.rotation_hour),
            rotation_minute: env_or("KEY_ROTATION_MINUTE", defaults.rotation_minute),
            rotation_second: env_or("KEY_ROTATION_SECOND", defaults.rotation_second),
            rotation_period_seconds: env_or("KEY_ROTATION_PERIOD", defaults.rotation_period_seconds),
        }
    }

    /// Create a config with the given pool bounds and default schedule
    pub fn with_pool(max_capacity: usize, inactive_retention_seconds: i64) -> Self {
        Self {
            max_capacity,
            inactive_retention_seconds,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.max_capacity == 0 {
            return Err("max_capacity must be at least 1".to_string());
        }
        if self.inactive_retention_seconds < 0 {
            return Err("inactive_retention_seconds must not be negative".to_string());
        }
        if self.rotation_hour > 23 || self.rotation_minute > 59 || self.rotation_second > 59 {
            return Err(format!(
                "invalid rotation time {:02}:{:02}:{:02}",
                self.rotation_hour, self.rotation_minute, self.rotation_second
            ));
        }
        if self.rotation_period_seconds == 0 {
            return Err("rotation_period_seconds must be positive".to_string());
        }
        Ok(())
    }
}

fn default_enabled() -> bool {
    true
}
