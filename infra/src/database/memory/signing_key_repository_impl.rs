//! In-memory implementation of the SigningKeyRepository trait.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

use sg_core::domain::entities::SigningKey;
use sg_core::errors::DomainError;
use sg_core::repositories::{KeySelector, SigningKeyRepository};
use sg_shared::types::{CursorPage, CursorPagination};

/// Signing keys held in process memory
#[derive(Default)]
pub struct InMemorySigningKeyRepository {
    keys: RwLock<HashMap<String, SigningKey>>,
}

impl InMemorySigningKeyRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys, deleted ones included
    pub async fn count(&self) -> usize {
        self.keys.read().await.len()
    }
}

#[async_trait]
impl SigningKeyRepository for InMemorySigningKeyRepository {
    async fn create(&self, key: SigningKey) -> Result<SigningKey, DomainError> {
        let mut keys = self.keys.write().await;
        if keys.contains_key(&key.id) {
            return Err(DomainError::Validation {
                message: format!("Signing key {} already exists", key.id),
            });
        }
        keys.insert(key.id.clone(), key.clone());
        debug!(key_id = %key.id, "Stored signing key");
        Ok(key)
    }

    async fn soft_delete(&self, id: &str) -> Result<bool, DomainError> {
        let mut keys = self.keys.write().await;
        Ok(match keys.get_mut(id) {
            Some(key) if !key.is_deleted() => {
                key.deleted_at = Some(Utc::now());
                true
            }
            _ => false,
        })
    }

    async fn find_usable_one(&self, selector: KeySelector) -> Result<Option<SigningKey>, DomainError> {
        let keys = self.keys.read().await;
        let found = match selector {
            KeySelector::Id(id) => keys.get(&id).filter(|k| !k.is_deleted()),
            KeySelector::Newest => keys
                .values()
                .filter(|k| !k.is_deleted())
                .max_by_key(|k| k.created_at),
        };
        Ok(found.cloned())
    }

    async fn list_usable(&self, page: &CursorPagination) -> Result<CursorPage<SigningKey>, DomainError> {
        let keys = self.keys.read().await;
        let items = keys
            .values()
            .filter(|k| page.include_deleted || !k.is_deleted())
            .cloned()
            .collect();
        Ok(page.apply(items, |k| k.id.as_str()))
    }
}
