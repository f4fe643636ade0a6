//! Mock implementation of SigningKeyRepository for testing

use async_trait::async_trait;
use chrono::Utc;
use sg_shared::types::{CursorPage, CursorPagination};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::entities::signing_key::SigningKey;
use crate::errors::DomainError;

use super::r#trait::{KeySelector, SigningKeyRepository};

/// Mock signing key repository for testing
pub struct MockSigningKeyRepository {
    keys: Arc<RwLock<HashMap<String, SigningKey>>>,
    fail_create: AtomicBool,
}

impl MockSigningKeyRepository {
    /// Create a new mock repository
    pub fn new() -> Self {
        Self {
            keys: Arc::new(RwLock::new(HashMap::new())),
            fail_create: AtomicBool::new(false),
        }
    }

    /// Make subsequent `create` calls fail
    pub fn fail_on_create(&self, fail: bool) {
        self.fail_create.store(fail, Ordering::SeqCst);
    }

    /// Raw stored copy, deleted or not
    pub async fn stored(&self, id: &str) -> Option<SigningKey> {
        self.keys.read().await.get(id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.keys.read().await.len()
    }
}

impl Default for MockSigningKeyRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SigningKeyRepository for MockSigningKeyRepository {
    async fn create(&self, key: SigningKey) -> Result<SigningKey, DomainError> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(DomainError::Internal {
                message: "Key store unavailable".to_string(),
            });
        }

        let mut keys = self.keys.write().await;

        // Check for duplicate
        if keys.contains_key(&key.id) {
            return Err(DomainError::Validation {
                message: "Key already exists".to_string(),
            });
        }

        keys.insert(key.id.clone(), key.clone());
        Ok(key)
    }

    async fn soft_delete(&self, id: &str) -> Result<bool, DomainError> {
        let mut keys = self.keys.write().await;
        match keys.get_mut(id) {
            Some(key) if key.deleted_at.is_none() => {
                key.deleted_at = Some(Utc::now());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn find_usable_one(&self, selector: KeySelector) -> Result<Option<SigningKey>, DomainError> {
        let keys = self.keys.read().await;
        let mut usable = keys.values().filter(|k| !k.is_deleted());
        Ok(match selector {
            KeySelector::Id(id) => usable.find(|k| k.id == id).cloned(),
            KeySelector::Newest => usable.max_by_key(|k| k.created_at).cloned(),
        })
    }

    async fn list_usable(&self, page: &CursorPagination) -> Result<CursorPage<SigningKey>, DomainError> {
        let keys = self.keys.read().await;
        let items: Vec<SigningKey> = keys
            .values()
            .filter(|k| page.include_deleted || !k.is_deleted())
            .cloned()
            .collect();
        Ok(page.apply(items, |k| k.id.as_str()))
    }
}
