//! Configuration loading for the infrastructure layer
//!
//! Reads the environment-specific `.env.<environment>` file first, then a
//! plain `.env`, then the process environment. Variables already set are
//! never overridden by either file.

use sg_shared::config::{AppConfig, Environment};
use tracing::debug;

use crate::error::InfrastructureError;

/// Load and validate the application configuration
pub fn load_config() -> Result<AppConfig, InfrastructureError> {
    let environment = Environment::from_env();
    let env_file = environment.env_file();
    if dotenvy::from_filename(&env_file).is_ok() {
        debug!(file = %env_file, "Loaded environment file");
    }
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env();
    config.validate().map_err(InfrastructureError::Config)?;
    Ok(config)
}
