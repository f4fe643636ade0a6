//! Integration tests for key rotation driving token issuance and renewal

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::{Duration as ChronoDuration, TimeZone, Utc};
    use serde_json::json;
    use tokio::sync::RwLock;
    use uuid::Uuid;

    use sg_core::domain::entities::{ClaimSet, RefreshTokenRecord, SigningKey};
    use sg_core::errors::{DomainError, TokenError};
    use sg_core::repositories::{KeySelector, RefreshTokenRepository, SigningKeyRepository};
    use sg_core::services::{
        KeyLifecycleService, KeyRotationStore, ManualClock, TaskRegistry, TokenConfig, TokenService,
        TokenServiceConfig, ROTATION_TASK_NAME,
    };
    use sg_shared::config::KeyRotationConfig;
    use sg_shared::types::{CursorPage, CursorPagination};

    // Key store backed by a map
    #[derive(Default)]
    struct KeyTable {
        keys: RwLock<HashMap<String, SigningKey>>,
    }

    #[async_trait]
    impl SigningKeyRepository for KeyTable {
        async fn create(&self, key: SigningKey) -> Result<SigningKey, DomainError> {
            self.keys.write().await.insert(key.id.clone(), key.clone());
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
            let items = keys
                .values()
                .filter(|k| page.include_deleted || !k.is_deleted())
                .cloned()
                .collect();
            Ok(page.apply(items, |k| k.id.as_str()))
        }
    }

    #[derive(Default)]
    struct RecordTable {
        records: RwLock<HashMap<Uuid, RefreshTokenRecord>>,
    }

    #[async_trait]
    impl RefreshTokenRepository for RecordTable {
        async fn create(&self, record: RefreshTokenRecord) -> Result<RefreshTokenRecord, DomainError> {
            self.records.write().await.insert(record.id, record.clone());
            Ok(record)
        }

        async fn update(&self, record: RefreshTokenRecord) -> Result<RefreshTokenRecord, DomainError> {
            let mut records = self.records.write().await;
            if !records.contains_key(&record.id) {
                return Err(DomainError::NotFound {
                    resource: format!("refresh token {}", record.id),
                });
            }
            records.insert(record.id, record.clone());
            Ok(record)
        }

        async fn read(&self, id: Uuid) -> Result<Option<RefreshTokenRecord>, DomainError> {
            Ok(self.records.read().await.get(&id).cloned())
        }

        async fn invalidate_if_valid(&self, id: Uuid) -> Result<bool, DomainError> {
            let mut records = self.records.write().await;
            match records.get_mut(&id) {
                Some(record) if record.is_valid => {
                    record.is_valid = false;
                    Ok(true)
                }
                _ => Ok(false),
            }
        }
    }

    struct World {
        clock: Arc<ManualClock>,
        keys: Arc<KeyLifecycleService<KeyTable>>,
        tokens: TokenService<RecordTable, KeyTable>,
        registry: Arc<TaskRegistry>,
    }

    fn world(rotation: KeyRotationConfig) -> World {
        // 02:00, one hour before the nightly rotation
        let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2026, 7, 1, 2, 0, 0).unwrap()));
        let registry = Arc::new(TaskRegistry::new());
        let keys = Arc::new(
            KeyLifecycleService::new(
                Arc::new(KeyTable::default()),
                Arc::new(KeyRotationStore::with_clock(&rotation, clock.clone())),
                registry.clone(),
                rotation,
            )
            .with_clock(clock.clone()),
        );
        let config = TokenServiceConfig {
            algorithm: jsonwebtoken::Algorithm::ES256,
            access: TokenConfig::new("sigil", "sigil-api", 900),
            refresh: TokenConfig::new("sigil", "sigil-api", 3600).with_renewal_window(1800),
        };
        let tokens = TokenService::new(Arc::new(RecordTable::default()), keys.clone(), config)
            .with_clock(clock.clone());
        World {
            clock,
            keys,
            tokens,
            registry,
        }
    }

    fn claims(uid: &str) -> ClaimSet {
        let mut claims = ClaimSet::new();
        claims.insert("userUid".to_string(), json!(uid));
        claims
    }

    #[tokio::test(start_paused = true)]
    async fn test_scheduled_rotation_keeps_old_tokens_verifiable() {
        let w = world(KeyRotationConfig::with_pool(1, 7 * 86_400));
        w.keys.start().await.unwrap();
        assert!(w.registry.get(ROTATION_TASK_NAME).is_some());

        let pair = w.tokens.issue_token_pair(&claims("alice")).await.unwrap();
        let first_kid = w.tokens.codec().decode(&pair.access_token.token).unwrap().key_id.unwrap();

        // Nightly rotation at 03:00
        tokio::time::sleep(Duration::from_secs(3600 + 1)).await;

        let snapshot = w.keys.store().snapshot();
        assert_eq!(snapshot.active.len(), 1);
        assert_ne!(snapshot.active[0].id, first_kid);
        assert_eq!(snapshot.inactive_ids(), vec![first_kid.as_str()]);

        // Old key is inactive but still verifies what it signed
        assert!(w.tokens.verify_access_token(&pair.access_token.token).await.is_ok());
        let jwks = w.keys.jwks().unwrap();
        assert_eq!(jwks.keys.len(), 2);
        assert!(jwks.find(&first_kid).is_some());

        w.keys.stop();
    }

    #[tokio::test]
    async fn test_retention_discards_key_and_its_tokens() {
        let w = world(KeyRotationConfig::with_pool(1, 3600));
        w.keys.rotate().await.unwrap();

        let access = w.tokens.issue_access_token(&claims("bob")).unwrap();
        let kid = w.tokens.codec().decode(&access.token).unwrap().key_id.unwrap();

        w.clock.advance(ChronoDuration::minutes(5));
        w.keys.rotate().await.unwrap();
        w.clock.advance(ChronoDuration::hours(2));
        let outcome = w.keys.rotate().await.unwrap();

        assert!(outcome.retired.contains(&kid));
        assert!(w.keys.jwks().unwrap().find(&kid).is_none());

        match w.tokens.verify_access_token(&access.token).await {
            Err(DomainError::Token(TokenError::SignatureInvalid)) => {}
            Err(DomainError::Token(TokenError::TokenExpired)) => {}
            other => panic!("discarded key still verified: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_refresh_flow_end_to_end() {
        let w = world(KeyRotationConfig::with_pool(3, 86_400));
        w.keys.rotate().await.unwrap();

        let login = w.tokens.issue_token_pair(&claims("carol")).await.unwrap();

        w.clock.advance(ChronoDuration::minutes(1));
        let early = w.tokens.rotate(&login.refresh_token.token).await.unwrap_err();
        assert_eq!(early, DomainError::Token(TokenError::RenewalTooEarly));
        assert!(early.is_authentication_failure());

        w.clock.advance(ChronoDuration::minutes(40));
        let renewed = w.tokens.rotate(&login.refresh_token.token).await.unwrap();
        let claims = w.tokens.verify_access_token(&renewed.access_token.token).await.unwrap();
        assert_eq!(claims.user_uid(), Some("carol"));

        let replay = w.tokens.rotate(&login.refresh_token.token).await.unwrap_err();
        assert_eq!(replay, DomainError::Token(TokenError::TokenRevoked));

        assert!(w.tokens.logout(&renewed.refresh_token.token).await.unwrap());
    }
}
