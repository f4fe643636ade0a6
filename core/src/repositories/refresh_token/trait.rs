//! Refresh token repository trait defining the interface for renewal state.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::token::RefreshTokenRecord;
use crate::errors::DomainError;

/// Repository trait for RefreshTokenRecord persistence operations
///
/// Records are never hard-deleted by the token flow; invalidation is an
/// `update` with `is_valid = false`.
#[async_trait]
pub trait RefreshTokenRepository: Send + Sync {
    /// Save a new refresh token record
    ///
    /// # Returns
    /// * `Ok(RefreshTokenRecord)` - The saved record
    /// * `Err(DomainError)` - Save failed (e.g., duplicate id)
    async fn create(&self, record: RefreshTokenRecord) -> Result<RefreshTokenRecord, DomainError>;

    /// Replace an existing record
    ///
    /// # Returns
    /// * `Ok(RefreshTokenRecord)` - The updated record
    /// * `Err(DomainError::NotFound)` - No record with that id
    async fn update(&self, record: RefreshTokenRecord) -> Result<RefreshTokenRecord, DomainError>;

    /// Read a record by id
    async fn read(&self, id: Uuid) -> Result<Option<RefreshTokenRecord>, DomainError>;

    /// Atomically flip a valid record to invalid
    ///
    /// Of several concurrent callers for the same id, at most one sees
    /// `true`. Implementations must check and write under one lock or one
    /// conditional statement.
    ///
    /// # Returns
    /// * `Ok(true)` - The record was valid and is now invalidated
    /// * `Ok(false)` - No such record, or it was already invalid
    async fn invalidate_if_valid(&self, id: Uuid) -> Result<bool, DomainError>;
}
