//! Daily signing key rotation
//!
//! The service ties the rotation store to key persistence and the scheduler:
//! each rotation persists a fresh key, makes it active, and discards inactive
//! keys that have outlived their retention.

use sg_shared::config::KeyRotationConfig;
use sg_shared::types::{CursorPagination, PaginationDirection};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tracing::{debug, info};

use crate::domain::entities::signing_key::{KeyStatus, SigningKey};
use crate::domain::value_objects::Jwks;
use crate::errors::{DomainError, DomainResult, KeyError};
use crate::repositories::SigningKeyRepository;
use crate::services::clock::{Clock, SystemClock};
use crate::services::scheduler::{task_action, DailySchedule, RecurringTask, ScheduledTask, TaskRegistry};

use super::generator::{EcdsaKeyGenerator, KeyGenerator};
use super::rotation_store::KeyRotationStore;

/// Registry name of the rotation task
pub const ROTATION_TASK_NAME: &str = "signing-key-rotation";

const RESTORE_PAGE_SIZE: u32 = 50;

/// Result of one rotation cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationOutcome {
    /// Id of the key that became active
    pub created: String,
    /// Ids of the keys discarded in this cycle
    pub retired: Vec<String>,
}

pub struct KeyLifecycleService<K: SigningKeyRepository + 'static> {
    repository: Arc<K>,
    store: Arc<KeyRotationStore>,
    registry: Arc<TaskRegistry>,
    generator: Arc<dyn KeyGenerator>,
    clock: Arc<dyn Clock>,
    config: KeyRotationConfig,
}

impl<K: SigningKeyRepository + 'static> KeyLifecycleService<K> {
    /// Creates a lifecycle service signing with fresh P-256 keys
    ///
    /// # Arguments
    ///
    /// * `repository` - Durable key storage
    /// * `store` - In-memory pool shared with token issuance
    /// * `registry` - Registry the rotation task is added to on [`Self::start`]
    /// * `config` - Pool bounds and the daily rotation time
    pub fn new(
        repository: Arc<K>,
        store: Arc<KeyRotationStore>,
        registry: Arc<TaskRegistry>,
        config: KeyRotationConfig,
    ) -> Self {
        Self {
            repository,
            store,
            registry,
            generator: Arc::new(EcdsaKeyGenerator::new()),
            clock: Arc::new(SystemClock),
            config,
        }
    }

    pub fn with_generator(mut self, generator: Arc<dyn KeyGenerator>) -> Self {
        self.generator = generator;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(&self) -> &Arc<KeyRotationStore> {
        &self.store
    }

    pub fn config(&self) -> &KeyRotationConfig {
        &self.config
    }

    /// Bring the pool up and schedule the daily rotation
    ///
    /// An empty pool is first restored from persistence; if that still
    /// leaves no active key, one rotation runs immediately so tokens can be
    /// signed before the first scheduled firing.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The pool has an active key and, when enabled, the
    ///   rotation task is registered under [`ROTATION_TASK_NAME`]
    /// * `Err(DomainError)` - Restoring or the bootstrap rotation failed
    pub async fn start(self: &Arc<Self>) -> DomainResult<()> {
        if self.store.is_empty() {
            let restored = self.restore().await?;
            info!(restored, "Restored signing key pool");
        }
        if self.store.active_len() == 0 {
            let outcome = self.rotate().await?;
            info!(key_id = %outcome.created, "Bootstrapped signing key");
        }

        if !self.config.enabled {
            info!("Signing key rotation is disabled");
            return Ok(());
        }

        let schedule = DailySchedule::new(
            self.config.rotation_hour,
            self.config.rotation_minute,
            self.config.rotation_second,
            Duration::from_secs(self.config.rotation_period_seconds),
        )?;

        // Weak: the registry owns the task and the service owns the registry
        let service: Weak<Self> = Arc::downgrade(self);
        let action = task_action(move || {
            let service = service.clone();
            async move {
                match service.upgrade() {
                    Some(service) => service.rotate().await.map(|_| ()),
                    None => Ok(()),
                }
            }
        });

        let task: Arc<dyn ScheduledTask> = Arc::new(
            RecurringTask::new(ROTATION_TASK_NAME, schedule, action).with_clock(self.clock.clone()),
        );
        self.registry.add_task(task.clone());
        task.start();
        Ok(())
    }

    /// Cancel the rotation task; calling it again does nothing
    pub fn stop(&self) {
        if self.registry.remove_task(ROTATION_TASK_NAME) {
            info!("Signing key rotation stopped");
        }
    }

    /// Run one rotation cycle
    ///
    /// Generates and persists a new key, makes it active, then soft-deletes
    /// and retires every inactive key older than the retention period.
    ///
    /// # Returns
    ///
    /// * `Ok(RotationOutcome)` - The new key id and the retired key ids
    /// * `Err(DomainError)` - Key generation or persistence failed; the pool
    ///   is unchanged when the new key could not be stored
    pub async fn rotate(&self) -> DomainResult<RotationOutcome> {
        let now = self.clock.now();

        let key = self.generator.generate(now)?;
        let key = self.repository.create(key).await?;
        let demoted = self.store.add_key(key.clone())?;
        info!(
            key_id = %key.id,
            demoted = ?demoted.map(|k| k.id),
            "Signing key activated"
        );

        let mut retired = Vec::new();
        for aged in self.store.aged_inactive_keys(now) {
            self.repository.soft_delete(&aged.id).await?;
            self.store.retire(std::slice::from_ref(&aged));
            retired.push(aged.id);
        }
        if !retired.is_empty() {
            info!(count = retired.len(), "Discarded aged signing keys");
        }

        Ok(RotationOutcome {
            created: key.id,
            retired,
        })
    }

    /// Reload usable keys from persistence into the pool
    ///
    /// Keys are replayed oldest first as active, so the newest
    /// `max_capacity` end up active and the rest inactive.
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - Number of keys loaded
    pub async fn restore(&self) -> DomainResult<usize> {
        let mut keys = Vec::new();
        let mut request = CursorPagination::first(RESTORE_PAGE_SIZE);
        loop {
            let page = self.repository.list_usable(&request).await?;
            let next = if page.has_more {
                page.next_cursor(|k| k.id.as_str()).map(str::to_string)
            } else {
                None
            };
            keys.extend(page.items);
            match next {
                Some(cursor) => {
                    request = CursorPagination::after(cursor, PaginationDirection::Forward, RESTORE_PAGE_SIZE)
                }
                None => break,
            }
        }

        keys.sort_by_key(|k| k.created_at);
        let count = keys.len();
        for key in keys {
            self.store.add_key(key.with_status(KeyStatus::Active))?;
        }
        debug!(count, "Replayed persisted signing keys");
        Ok(count)
    }

    /// A random active key for signing
    ///
    /// # Errors
    ///
    /// * `KeyError::NoUsableKey` - The pool has no active key
    pub fn find_random_signing_key(&self) -> DomainResult<SigningKey> {
        self.store
            .random_active_key()
            .ok_or_else(|| KeyError::NoUsableKey.into())
    }

    /// A usable key by id, read from persistence
    ///
    /// # Arguments
    ///
    /// * `id` - The `kid` taken from a token header
    ///
    /// # Errors
    ///
    /// * `DomainError::NotFound` - Unknown or soft-deleted key
    pub async fn find_signing_key(&self, id: &str) -> DomainResult<SigningKey> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::NotFound {
                resource: format!("signing key {}", id),
            })
    }

    /// Public keys of every active and inactive key
    pub fn jwks(&self) -> DomainResult<Jwks> {
        let snapshot = self.store.snapshot();
        let keys = snapshot
            .verification_keys()
            .map(SigningKey::to_jwk)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Jwks::new(keys))
    }
}
