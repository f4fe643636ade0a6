//! In-memory implementation of the RefreshTokenRepository trait.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use sg_core::domain::entities::RefreshTokenRecord;
use sg_core::errors::DomainError;
use sg_core::repositories::RefreshTokenRepository;

/// Refresh token records held in process memory
#[derive(Default)]
pub struct InMemoryRefreshTokenRepository {
    records: RwLock<HashMap<Uuid, RefreshTokenRecord>>,
}

impl InMemoryRefreshTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records of one user, oldest first
    pub async fn find_by_user(&self, user_uid: &str) -> Vec<RefreshTokenRecord> {
        let mut records: Vec<RefreshTokenRecord> = self
            .records
            .read()
            .await
            .values()
            .filter(|r| r.user_uid == user_uid)
            .cloned()
            .collect();
        records.sort_by_key(|r| r.created_at);
        records
    }
}

#[async_trait]
impl RefreshTokenRepository for InMemoryRefreshTokenRepository {
    async fn create(&self, record: RefreshTokenRecord) -> Result<RefreshTokenRecord, DomainError> {
        let mut records = self.records.write().await;
        if records.contains_key(&record.id) {
            return Err(DomainError::Validation {
                message: format!("Refresh token {} already exists", record.id),
            });
        }
        records.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update(&self, record: RefreshTokenRecord) -> Result<RefreshTokenRecord, DomainError> {
        let mut records = self.records.write().await;
        match records.get_mut(&record.id) {
            Some(existing) => {
                *existing = record.clone();
                Ok(record)
            }
            None => Err(DomainError::NotFound {
                resource: format!("refresh token {}", record.id),
            }),
        }
    }

    async fn read(&self, id: Uuid) -> Result<Option<RefreshTokenRecord>, DomainError> {
        Ok(self.records.read().await.get(&id).cloned())
    }

    async fn invalidate_if_valid(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut records = self.records.write().await;
        match records.get_mut(&id) {
            Some(record) if record.is_valid => {
                record.invalidate();
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
