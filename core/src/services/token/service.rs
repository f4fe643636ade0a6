//! Access and refresh token issuance and renewal

use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::entities::signing_key::SigningKey;
use crate::domain::entities::token::{
    ClaimSet, IssuedToken, JwtClaims, RefreshTokenRecord, TokenPair, TokenUse, USER_UID_CLAIM,
};
use crate::errors::{DomainError, DomainResult, TokenError};
use crate::repositories::{RefreshTokenRepository, SigningKeyRepository};
use crate::services::clock::{Clock, SystemClock};
use crate::services::key::KeyLifecycleService;

use super::codec::TokenCodec;
use super::config::{TokenConfig, TokenServiceConfig};

/// Service issuing token pairs and renewing them through refresh records
///
/// Every refresh token has a record keyed by its `jti`. A record starts
/// valid and is invalidated on rotation or logout; renewal always creates a
/// new record instead of reviving an old one.
pub struct TokenService<R: RefreshTokenRepository, K: SigningKeyRepository + 'static> {
    pub(crate) repository: Arc<R>,
    keys: Arc<KeyLifecycleService<K>>,
    codec: TokenCodec,
    clock: Arc<dyn Clock>,
    config: TokenServiceConfig,
}

impl<R: RefreshTokenRepository, K: SigningKeyRepository + 'static> TokenService<R, K> {
    /// Creates a token service
    ///
    /// # Arguments
    ///
    /// * `repository` - Refresh record persistence
    /// * `keys` - Key lifecycle providing signing and verification keys
    /// * `config` - Algorithm and per-kind token settings
    pub fn new(repository: Arc<R>, keys: Arc<KeyLifecycleService<K>>, config: TokenServiceConfig) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        Self {
            repository,
            keys,
            codec: TokenCodec::new(clock.clone()),
            clock,
            config,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.codec = TokenCodec::new(clock.clone());
        self.clock = clock;
        self
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    pub fn config(&self) -> &TokenServiceConfig {
        &self.config
    }

    /// Issue a refresh token and persist its record
    ///
    /// # Arguments
    ///
    /// * `claims` - Application claims, nested under `claim` in the token
    ///
    /// # Returns
    ///
    /// The signed token; its record id equals the token's `jti`
    ///
    /// # Errors
    ///
    /// * `TokenError::InvalidClaim` - `claims` has no non-empty `userUid`
    /// * `KeyError::NoUsableKey` - The pool has no active key
    pub async fn generate(&self, claims: &ClaimSet) -> DomainResult<IssuedToken> {
        let user_uid = user_uid_of(claims)?;
        let key = self.keys.find_random_signing_key()?;

        let id = Uuid::new_v4();
        let token = self.codec.issue(
            &id.to_string(),
            claims,
            TokenUse::Refresh,
            &key,
            &self.config.refresh,
        )?;

        let record = RefreshTokenRecord::new(
            id,
            user_uid.as_str(),
            self.clock.now(),
            self.config.refresh.lifetime_seconds,
        );
        self.repository.create(record).await?;

        debug!(user_uid = %user_uid, key_id = %key.id, "Issued refresh token");
        Ok(token)
    }

    /// Issue a short-lived access token
    pub fn issue_access_token(&self, claims: &ClaimSet) -> DomainResult<IssuedToken> {
        let key = self.keys.find_random_signing_key()?;
        self.codec.issue(
            &Uuid::new_v4().to_string(),
            claims,
            TokenUse::Access,
            &key,
            &self.config.access,
        )
    }

    /// Access and refresh token for a freshly authenticated user
    ///
    /// # Arguments
    ///
    /// * `claims` - Claims carried by both tokens; must include `userUid`
    ///
    /// # Returns
    ///
    /// * `Ok(TokenPair)` - Both tokens with their lifetimes in seconds
    /// * `Err(DomainError)` - As for [`Self::generate`]
    pub async fn issue_token_pair(&self, claims: &ClaimSet) -> DomainResult<TokenPair> {
        let access_token = self.issue_access_token(claims)?;
        let refresh_token = self.generate(claims).await?;
        Ok(TokenPair::new(access_token, refresh_token))
    }

    /// Exchange a refresh token for a new pair
    ///
    /// The token must be signed by a key that is still usable and must be
    /// inside its renewal window. The presented record is left as is; see
    /// [`Self::rotate`] for the single-use flow.
    ///
    /// # Arguments
    ///
    /// * `refresh_token` - Compact JWT previously returned by [`Self::generate`]
    ///
    /// # Returns
    ///
    /// * `Ok(TokenPair)` - A new access token and a new refresh token
    /// * `Err(DomainError)` - Verification errors come back unchanged
    pub async fn renewal(&self, refresh_token: &str) -> DomainResult<TokenPair> {
        let claims = self.verify_refresh(refresh_token).await?;
        self.reissue(&claims).await
    }

    /// Renew and invalidate the presented refresh record
    ///
    /// The token is verified first, then its record is claimed with
    /// [`RefreshTokenRepository::invalidate_if_valid`], so concurrent calls
    /// with one token produce at most one new pair. If issuing fails after
    /// the claim, the record is made valid again.
    ///
    /// # Arguments
    ///
    /// * `refresh_token` - Compact JWT whose record is still valid
    ///
    /// # Returns
    ///
    /// * `Ok(TokenPair)` - The replacement pair
    /// * `Err(TokenError::TokenRevoked)` - The record is unknown, already
    ///   used, expired or deleted
    /// * `Err(DomainError)` - Any verification error from [`Self::renewal`]
    pub async fn rotate(&self, refresh_token: &str) -> DomainResult<TokenPair> {
        let decoded = self.codec.decode(refresh_token)?;
        let id = decoded
            .claims
            .jwt_id()
            .map_err(|_| TokenError::MalformedToken)?;

        let record = self
            .repository
            .read(id)
            .await?
            .filter(|record| record.is_usable_at(self.clock.now()))
            .ok_or_else(|| revoked(id))?;

        let claims = self.verify_refresh(refresh_token).await?;

        if !self.repository.invalidate_if_valid(id).await? {
            return Err(revoked(id));
        }

        // TODO: claim and reissue in one transaction once the repository
        // contract exposes one. A crash between the two burns the presented
        // token without a replacement.
        match self.reissue(&claims).await {
            Ok(pair) => Ok(pair),
            Err(e) => {
                warn!(record_id = %id, error = %e, "Renewal failed after claiming record; restoring it");
                self.repository.update(record).await?;
                Err(e)
            }
        }
    }

    /// Invalidate the record behind a refresh token
    ///
    /// Returns whether a valid record was invalidated. An expired token is
    /// accepted since logging out of it is harmless.
    pub async fn logout(&self, refresh_token: &str) -> DomainResult<bool> {
        let check = self.config.refresh.without_renewal_window();
        let claims = match self.verify(refresh_token, &check).await {
            Ok(claims) => claims,
            Err(DomainError::Token(TokenError::TokenExpired)) => self.codec.decode(refresh_token)?.claims,
            Err(e) => return Err(e),
        };
        let id = claims.jwt_id().map_err(|_| TokenError::MalformedToken)?;

        match self.repository.read(id).await? {
            Some(record) if record.is_valid => {
                self.invalidate_token(record).await?;
                info!(record_id = %id, "Refresh token logged out");
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Verify an access token against the key named in its header
    ///
    /// # Returns
    ///
    /// * `Ok(JwtClaims)` - The verified claims
    /// * `Err(TokenError::InvalidClaim)` - A refresh token was presented
    /// * `Err(DomainError)` - Any other verification failure
    pub async fn verify_access_token(&self, token: &str) -> DomainResult<JwtClaims> {
        let claims = self.verify(token, &self.config.access).await?;
        if claims.token_use != Some(TokenUse::Access) {
            return Err(TokenError::InvalidClaim {
                claim: "token_use".to_string(),
            }
            .into());
        }
        Ok(claims)
    }

    pub async fn register_token(&self, record: RefreshTokenRecord) -> DomainResult<RefreshTokenRecord> {
        self.repository.create(record).await
    }

    pub async fn invalidate_token(&self, mut record: RefreshTokenRecord) -> DomainResult<RefreshTokenRecord> {
        record.invalidate();
        self.repository.update(record).await
    }

    async fn verify_refresh(&self, refresh_token: &str) -> DomainResult<JwtClaims> {
        let claims = self.verify(refresh_token, &self.config.refresh).await?;
        if claims.token_use != Some(TokenUse::Refresh) {
            return Err(TokenError::InvalidClaim {
                claim: "token_use".to_string(),
            }
            .into());
        }
        Ok(claims)
    }

    async fn reissue(&self, claims: &JwtClaims) -> DomainResult<TokenPair> {
        let access_token = self.issue_access_token(&claims.claim)?;
        let refresh_token = self.generate(&claims.claim).await?;
        info!(user_uid = ?claims.user_uid(), "Renewed token pair");
        Ok(TokenPair::new(access_token, refresh_token))
    }

    async fn verify(&self, token: &str, config: &TokenConfig) -> DomainResult<JwtClaims> {
        let decoded = self.codec.decode(token)?;
        let key_id = decoded.key_id.ok_or(TokenError::MalformedToken)?;
        let key = self.resolve_key(&key_id).await?;

        self.codec
            .verify(token, &key, self.config.algorithm, config)
            .map_err(|e| {
                match &e {
                    DomainError::Token(TokenError::RenewalTooEarly) => {
                        warn!(key_id = %key_id, "Refresh attempted too early")
                    }
                    other => debug!(key_id = %key_id, error = %other, "Token verification failed"),
                }
                e
            })
    }

    /// A key that is unknown or discarded cannot vouch for any signature
    async fn resolve_key(&self, key_id: &str) -> DomainResult<SigningKey> {
        match self.keys.find_signing_key(key_id).await {
            Err(DomainError::NotFound { .. }) => Err(TokenError::SignatureInvalid.into()),
            other => other,
        }
    }
}

fn revoked(id: Uuid) -> DomainError {
    warn!(record_id = %id, "Refresh token reused or revoked");
    TokenError::TokenRevoked.into()
}

fn user_uid_of(claims: &ClaimSet) -> DomainResult<String> {
    claims
        .get(USER_UID_CLAIM)
        .and_then(|value| value.as_str())
        .filter(|uid| !uid.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            TokenError::InvalidClaim {
                claim: USER_UID_CLAIM.to_string(),
            }
            .into()
        })
}
