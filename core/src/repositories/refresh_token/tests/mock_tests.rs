//! Unit tests for mock refresh token repository implementation

use chrono::Utc;
use uuid::Uuid;

use crate::domain::entities::token::RefreshTokenRecord;
use crate::errors::DomainError;
use crate::repositories::refresh_token::{MockRefreshTokenRepository, RefreshTokenRepository};

#[tokio::test]
async fn test_create_and_read_record() {
    let repo = MockRefreshTokenRepository::new();
    let record = RefreshTokenRecord::new(Uuid::new_v4(), "user-1", Utc::now(), 3600);

    let saved = repo.create(record.clone()).await.unwrap();
    assert_eq!(saved, record);

    let found = repo.read(record.id).await.unwrap().unwrap();
    assert_eq!(found.user_uid, "user-1");
    assert!(found.is_valid);
}

#[tokio::test]
async fn test_duplicate_record_is_rejected() {
    let repo = MockRefreshTokenRepository::new();
    let record = RefreshTokenRecord::new(Uuid::new_v4(), "user-1", Utc::now(), 3600);

    repo.create(record.clone()).await.unwrap();
    let result = repo.create(record).await;
    assert!(matches!(result, Err(DomainError::Validation { .. })));
}

#[tokio::test]
async fn test_update_invalidates_record() {
    let repo = MockRefreshTokenRepository::new();
    let mut record = RefreshTokenRecord::new(Uuid::new_v4(), "user-1", Utc::now(), 3600);
    repo.create(record.clone()).await.unwrap();

    record.invalidate();
    repo.update(record.clone()).await.unwrap();

    let found = repo.read(record.id).await.unwrap().unwrap();
    assert!(!found.is_valid);
}

#[tokio::test]
async fn test_update_unknown_record_is_not_found() {
    let repo = MockRefreshTokenRepository::new();
    let record = RefreshTokenRecord::new(Uuid::new_v4(), "user-1", Utc::now(), 3600);

    let result = repo.update(record).await;
    assert!(matches!(result, Err(DomainError::NotFound { .. })));
}

#[tokio::test]
async fn test_read_missing_record() {
    let repo = MockRefreshTokenRepository::new();
    assert!(repo.read(Uuid::new_v4()).await.unwrap().is_none());
}
