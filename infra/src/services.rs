//! Service container wiring repositories, key rotation and token issuance

use std::sync::Arc;
use tracing::info;

use sg_core::services::{
    Clock, KeyLifecycleService, KeyRotationStore, SystemClock, TaskRegistry, TokenService,
    TokenServiceConfig,
};
use sg_shared::config::AppConfig;

use crate::database::{InMemoryRefreshTokenRepository, InMemorySigningKeyRepository};
use crate::error::InfrastructureError;

pub type KeyService = KeyLifecycleService<InMemorySigningKeyRepository>;
pub type RefreshTokenService = TokenService<InMemoryRefreshTokenRepository, InMemorySigningKeyRepository>;

/// Everything a process needs to sign, verify and rotate
#[derive(Clone)]
pub struct Services {
    pub config: AppConfig,
    pub registry: Arc<TaskRegistry>,
    pub key_repository: Arc<InMemorySigningKeyRepository>,
    pub refresh_repository: Arc<InMemoryRefreshTokenRepository>,
    pub keys: Arc<KeyService>,
    pub tokens: Arc<RefreshTokenService>,
}

impl Services {
    /// Build the container; nothing runs until [`Services::start`]
    pub fn initialize(config: AppConfig) -> Result<Self, InfrastructureError> {
        Self::initialize_with_clock(config, Arc::new(SystemClock))
    }

    pub fn initialize_with_clock(config: AppConfig, clock: Arc<dyn Clock>) -> Result<Self, InfrastructureError> {
        config.validate().map_err(InfrastructureError::Config)?;
        let token_config = TokenServiceConfig::from_jwt_config(&config.jwt)?;

        let registry = Arc::new(TaskRegistry::new());
        let key_repository = Arc::new(InMemorySigningKeyRepository::new());
        let refresh_repository = Arc::new(InMemoryRefreshTokenRepository::new());
        let store = Arc::new(KeyRotationStore::with_clock(&config.key_rotation, clock.clone()));

        let keys = Arc::new(
            KeyLifecycleService::new(
                key_repository.clone(),
                store,
                registry.clone(),
                config.key_rotation.clone(),
            )
            .with_clock(clock.clone()),
        );
        let tokens = Arc::new(
            TokenService::new(refresh_repository.clone(), keys.clone(), token_config).with_clock(clock),
        );

        info!(
            environment = %config.environment,
            max_capacity = config.key_rotation.max_capacity,
            "Services initialized"
        );
        Ok(Self {
            config,
            registry,
            key_repository,
            refresh_repository,
            keys,
            tokens,
        })
    }

    /// Fill the key pool and schedule rotation
    pub async fn start(&self) -> Result<(), InfrastructureError> {
        self.keys.start().await?;
        self.registry.run_tasks();
        Ok(())
    }

    /// Stop every scheduled task
    pub fn shutdown(&self) {
        self.keys.stop();
        self.registry.stop_all();
        info!("Services shut down");
    }
}
