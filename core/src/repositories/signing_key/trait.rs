//! Signing key repository trait defining the interface for key persistence.

use async_trait::async_trait;
use sg_shared::types::{CursorPage, CursorPagination};

use crate::domain::entities::signing_key::SigningKey;
use crate::errors::DomainError;

/// Which usable key `find_usable_one` should return
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySelector {
    /// The key with this id
    Id(String),
    /// The most recently created key
    Newest,
}

/// Repository trait for SigningKey persistence operations
///
/// "Usable" means not soft-deleted. Discarded keys are soft-deleted, so they
/// never come back from lookups that serve verification.
#[async_trait]
pub trait SigningKeyRepository: Send + Sync {
    /// Persist a newly generated key
    ///
    /// # Returns
    /// * `Ok(SigningKey)` - The stored key
    /// * `Err(DomainError)` - Save failed (e.g., duplicate id)
    async fn create(&self, key: SigningKey) -> Result<SigningKey, DomainError>;

    /// Mark a key as deleted without removing it
    ///
    /// # Returns
    /// * `Ok(true)` - Key was soft-deleted
    /// * `Ok(false)` - No usable key with that id
    async fn soft_delete(&self, id: &str) -> Result<bool, DomainError>;

    /// Find one usable key matching the selector
    async fn find_usable_one(&self, selector: KeySelector) -> Result<Option<SigningKey>, DomainError>;

    /// List keys in descending id order, starting after `page.cursor`
    ///
    /// Soft-deleted keys are excluded unless `page.include_deleted` is set.
    async fn list_usable(&self, page: &CursorPagination) -> Result<CursorPage<SigningKey>, DomainError>;

    /// Find a usable key by id
    async fn find_by_id(&self, id: &str) -> Result<Option<SigningKey>, DomainError> {
        self.find_usable_one(KeySelector::Id(id.to_string())).await
    }
}
