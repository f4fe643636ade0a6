//! Unit tests for mock signing key repository implementation

use chrono::{Duration, Utc};
use sg_shared::types::{CursorPagination, PaginationDirection};

use crate::domain::entities::signing_key::SigningKey;
use crate::repositories::signing_key::{KeySelector, MockSigningKeyRepository, SigningKeyRepository};

fn key(id: &str, age_minutes: i64) -> SigningKey {
    SigningKey::new(id, vec![1], vec![4; 65], Utc::now() - Duration::minutes(age_minutes))
}

#[tokio::test]
async fn test_create_and_find_by_id() {
    let repo = MockSigningKeyRepository::new();
    repo.create(key("k1", 0)).await.unwrap();

    let found = repo.find_by_id("k1").await.unwrap();
    assert_eq!(found.map(|k| k.id), Some("k1".to_string()));
    assert!(repo.find_by_id("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn test_duplicate_key_is_rejected() {
    let repo = MockSigningKeyRepository::new();
    repo.create(key("k1", 0)).await.unwrap();
    assert!(repo.create(key("k1", 0)).await.is_err());
}

#[tokio::test]
async fn test_soft_deleted_key_is_not_usable() {
    let repo = MockSigningKeyRepository::new();
    repo.create(key("k1", 0)).await.unwrap();

    assert!(repo.soft_delete("k1").await.unwrap());
    assert!(!repo.soft_delete("k1").await.unwrap());
    assert!(repo.find_by_id("k1").await.unwrap().is_none());

    // Still stored, only hidden
    let stored = repo.stored("k1").await.unwrap();
    assert!(stored.deleted_at.is_some());
}

#[tokio::test]
async fn test_newest_selector() {
    let repo = MockSigningKeyRepository::new();
    repo.create(key("old", 30)).await.unwrap();
    repo.create(key("new", 1)).await.unwrap();

    let newest = repo.find_usable_one(KeySelector::Newest).await.unwrap().unwrap();
    assert_eq!(newest.id, "new");
}

#[tokio::test]
async fn test_list_usable_pages_by_descending_id() {
    let repo = MockSigningKeyRepository::new();
    for id in ["k1", "k2", "k3", "k4"] {
        repo.create(key(id, 0)).await.unwrap();
    }
    repo.soft_delete("k3").await.unwrap();

    let first = repo.list_usable(&CursorPagination::first(2)).await.unwrap();
    let ids: Vec<_> = first.items.iter().map(|k| k.id.as_str()).collect();
    assert_eq!(ids, vec!["k4", "k2"]);
    assert!(first.has_more);

    let next = repo
        .list_usable(&CursorPagination::after("k2", PaginationDirection::Forward, 2))
        .await
        .unwrap();
    let ids: Vec<_> = next.items.iter().map(|k| k.id.as_str()).collect();
    assert_eq!(ids, vec!["k1"]);
    assert!(!next.has_more);

    let with_deleted = repo
        .list_usable(&CursorPagination::first(10).including_deleted())
        .await
        .unwrap();
    assert_eq!(with_deleted.items.len(), 4);
}
