//! `sg-keyd`: keeps the signing key pool rotating until interrupted

use anyhow::Context;
use std::sync::Arc;
use tracing::{error, info};

use sg_core::errors::DomainResult;
use sg_core::services::{ScheduledTask, ROTATION_TASK_NAME};
use sg_infra::{load_config, telemetry, Services};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config().context("Failed to load configuration")?;
    telemetry::init_tracing(&config.logging).context("Failed to initialize tracing")?;

    info!(environment = %config.environment, "Starting sg-keyd");

    let services = Services::initialize(config)?;
    services.start().await?;

    let jwks = services.keys.jwks()?;
    info!(
        keys = jwks.keys.len(),
        jwks = %serde_json::to_string(&jwks)?,
        "Publishing key set"
    );

    let rotation = services.registry.get(ROTATION_TASK_NAME);
    tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for shutdown signal")?;
            info!("Shutdown signal received");
        }
        result = watch(rotation) => {
            if let Err(e) = result {
                error!(error = %e, code = e.error_code(), "Key rotation task failed");
                services.shutdown();
                return Err(e.into());
            }
        }
    }

    services.shutdown();
    Ok(())
}

/// Resolves when the rotation task ends; never when there is none
async fn watch(task: Option<Arc<dyn ScheduledTask>>) -> DomainResult<()> {
    match task {
        Some(task) => task.wait().await,
        None => std::future::pending().await,
    }
}
