//! Bounded pool of signing keys
//!
//! Active keys are kept newest first. When the pool is full, adding another
//! active key demotes the oldest one to inactive, so tokens signed most
//! recently stay verifiable the longest. Retired keys move to the discarded
//! list, which only grows until [`KeyRotationStore::clear`] is called.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use sg_shared::config::KeyRotationConfig;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

use crate::domain::entities::signing_key::{KeyStatus, SigningKey};
use crate::errors::KeyError;
use crate::services::clock::{Clock, SystemClock};

/// Point-in-time copy of the pool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPoolSnapshot {
    /// Newest first
    pub active: Vec<SigningKey>,
    pub inactive: Vec<SigningKey>,
    pub discarded: Vec<SigningKey>,
    pub max_capacity: usize,
    pub inactive_retention_seconds: i64,
}

impl KeyPoolSnapshot {
    /// Keys that may still verify tokens: active then inactive
    pub fn verification_keys(&self) -> impl Iterator<Item = &SigningKey> {
        self.active.iter().chain(self.inactive.iter())
    }

    pub fn active_ids(&self) -> Vec<&str> {
        self.active.iter().map(|k| k.id.as_str()).collect()
    }

    pub fn inactive_ids(&self) -> Vec<&str> {
        self.inactive.iter().map(|k| k.id.as_str()).collect()
    }
}

struct KeyPool {
    active: VecDeque<SigningKey>,
    inactive: Vec<SigningKey>,
    discarded: Vec<SigningKey>,
    max_capacity: usize,
    retention: Duration,
}

impl KeyPool {
    fn new(config: &KeyRotationConfig) -> Self {
        let mut pool = Self {
            active: VecDeque::new(),
            inactive: Vec::new(),
            discarded: Vec::new(),
            max_capacity: 1,
            retention: Duration::zero(),
        };
        pool.apply(config);
        pool
    }

    fn apply(&mut self, config: &KeyRotationConfig) {
        self.max_capacity = config.max_capacity.max(1);
        self.retention = Duration::seconds(config.inactive_retention_seconds.max(0));
    }

    /// Take a key out of the active or inactive set
    fn remove_live(&mut self, id: &str) -> Option<SigningKey> {
        if let Some(index) = self.active.iter().position(|k| k.id == id) {
            return self.active.remove(index);
        }
        self.inactive
            .iter()
            .position(|k| k.id == id)
            .map(|index| self.inactive.remove(index))
    }

    /// Demote the oldest active key to inactive
    fn evict_oldest(&mut self) -> Option<SigningKey> {
        let evicted = self.active.pop_back()?.with_status(KeyStatus::Inactive);
        self.inactive.push(evicted.clone());
        Some(evicted)
    }
}

/// Single source of truth for which keys may sign and verify
///
/// Every read and write goes through one mutex, so a reader never sees a key
/// that has left the active set without having reached the inactive one.
pub struct KeyRotationStore {
    pool: Mutex<KeyPool>,
    clock: Arc<dyn Clock>,
}

impl KeyRotationStore {
    /// Capacity below 1 is treated as 1
    pub fn new(config: &KeyRotationConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: &KeyRotationConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            pool: Mutex::new(KeyPool::new(config)),
            clock,
        }
    }

    fn pool(&self) -> MutexGuard<'_, KeyPool> {
        self.pool.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a key according to its status
    ///
    /// An active key goes to the head of the active sequence, demoting the
    /// oldest active key first when the pool is full; that demoted key is
    /// returned. An inactive key is appended to the inactive set. A key
    /// already in the pool under the same id is replaced.
    ///
    /// # Errors
    /// * `KeyError::InvalidKeyStatus` - The key is discarded, or its id was
    ///   already retired
    pub fn add_key(&self, key: SigningKey) -> Result<Option<SigningKey>, KeyError> {
        let mut pool = self.pool();
        if pool.discarded.iter().any(|k| k.id == key.id) {
            warn!(key_id = %key.id, "Refusing to re-add a retired key");
            return Err(KeyError::InvalidKeyStatus {
                status: KeyStatus::Discarded.to_string(),
            });
        }
        match key.status {
            KeyStatus::Active => {
                pool.remove_live(&key.id);
                let evicted = if pool.active.len() >= pool.max_capacity {
                    pool.evict_oldest()
                } else {
                    None
                };
                if let Some(evicted) = &evicted {
                    debug!(key_id = %evicted.id, "Demoted oldest active key");
                }
                pool.active.push_front(key);
                Ok(evicted)
            }
            KeyStatus::Inactive => {
                pool.remove_live(&key.id);
                pool.inactive.push(key);
                Ok(None)
            }
            status => Err(KeyError::InvalidKeyStatus {
                status: status.to_string(),
            }),
        }
    }

    /// A uniformly random active key
    pub fn random_active_key(&self) -> Option<SigningKey> {
        let pool = self.pool();
        if pool.active.is_empty() {
            return None;
        }
        let index = rand::thread_rng().gen_range(0..pool.active.len());
        pool.active.get(index).cloned()
    }

    /// Inactive keys created before `now - retention`
    pub fn aged_inactive_keys(&self, now: DateTime<Utc>) -> Vec<SigningKey> {
        let pool = self.pool();
        let cutoff = now - pool.retention;
        pool.inactive
            .iter()
            .filter(|k| k.created_at < cutoff)
            .cloned()
            .collect()
    }

    /// Move keys to the discarded list
    ///
    /// Keys are matched by id. A key not currently in the pool is still
    /// recorded as discarded, but each id is recorded at most once.
    /// Returns how many ids were newly discarded.
    pub fn retire(&self, keys: &[SigningKey]) -> usize {
        let now = self.clock.now();
        let mut pool = self.pool();
        let mut newly_discarded = 0;
        for key in keys {
            pool.remove_live(&key.id);
            if pool.discarded.iter().any(|k| k.id == key.id) {
                continue;
            }
            pool.discarded.push(key.discarded_at(now));
            newly_discarded += 1;
        }
        newly_discarded
    }

    pub fn snapshot(&self) -> KeyPoolSnapshot {
        let pool = self.pool();
        KeyPoolSnapshot {
            active: pool.active.iter().cloned().collect(),
            inactive: pool.inactive.clone(),
            discarded: pool.discarded.clone(),
            max_capacity: pool.max_capacity,
            inactive_retention_seconds: pool.retention.num_seconds(),
        }
    }

    /// Whether no key can sign or verify
    pub fn is_empty(&self) -> bool {
        let pool = self.pool();
        pool.active.is_empty() && pool.inactive.is_empty()
    }

    pub fn active_len(&self) -> usize {
        self.pool().active.len()
    }

    /// Drop every key, discarded ones included
    pub fn clear(&self) {
        let mut pool = self.pool();
        pool.active.clear();
        pool.inactive.clear();
        pool.discarded.clear();
    }

    /// Replace capacity and retention
    ///
    /// Surplus active keys, oldest first, are demoted right away and
    /// returned.
    pub fn reconfigure(&self, config: &KeyRotationConfig) -> Vec<SigningKey> {
        let mut pool = self.pool();
        pool.apply(config);
        let mut demoted = Vec::new();
        while pool.active.len() > pool.max_capacity {
            match pool.evict_oldest() {
                Some(key) => demoted.push(key),
                None => break,
            }
        }
        demoted
    }
}
