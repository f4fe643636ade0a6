//! Token entities for JWT-based authentication.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claim key every refresh token must carry inside its `claim` object
pub const USER_UID_CLAIM: &str = "userUid";

/// Application claims nested under the `claim` object of a token
pub type ClaimSet = serde_json::Map<String, serde_json::Value>;

/// What a token may be used for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenUse {
    Access,
    Refresh,
}

impl std::fmt::Display for TokenUse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenUse::Access => write!(f, "access"),
            TokenUse::Refresh => write!(f, "refresh"),
        }
    }
}

/// Claims structure for JWT payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Issuer
    pub iss: String,

    /// Audience
    pub aud: String,

    /// Issued at timestamp
    pub iat: i64,

    /// Expiration timestamp
    pub exp: i64,

    /// JWT ID (unique identifier for the token)
    pub jti: String,

    /// Access or refresh; absent on tokens minted by older issuers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_use: Option<TokenUse>,

    /// Application claims
    #[serde(default)]
    pub claim: ClaimSet,
}

impl JwtClaims {
    /// Seconds of validity left at `now`, negative once expired
    pub fn remaining_seconds(&self, now: DateTime<Utc>) -> i64 {
        self.exp - now.timestamp()
    }

    /// Checks if the claims have expired at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.exp <= now.timestamp()
    }

    /// The user identifier from the `claim` object, if present as a string
    pub fn user_uid(&self) -> Option<&str> {
        self.claim.get(USER_UID_CLAIM).and_then(|value| value.as_str())
    }

    /// Parse the JWT ID as a refresh record id
    pub fn jwt_id(&self) -> Result<Uuid, uuid::Error> {
        Uuid::parse_str(&self.jti)
    }
}

/// Refresh token record tracked by the persistence collaborator
///
/// A record only ever moves from valid to invalid. Renewal creates a new
/// record instead of reviving an old one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshTokenRecord {
    /// Record id, equal to the `jti` of the refresh token it tracks
    pub id: Uuid,

    /// User this token belongs to
    pub user_uid: String,

    /// Whether the token may still be renewed
    pub is_valid: bool,

    /// Timestamp when the token expires
    pub expire_at: DateTime<Utc>,

    /// Timestamp when the record was created
    pub created_at: DateTime<Utc>,

    /// Soft-delete marker
    pub deleted_at: Option<DateTime<Utc>>,
}

impl RefreshTokenRecord {
    /// Creates a new valid record expiring `lifetime_seconds` after `now`
    pub fn new(id: Uuid, user_uid: impl Into<String>, now: DateTime<Utc>, lifetime_seconds: i64) -> Self {
        Self {
            id,
            user_uid: user_uid.into(),
            is_valid: true,
            expire_at: now + Duration::seconds(lifetime_seconds),
            created_at: now,
            deleted_at: None,
        }
    }

    /// Marks the record as no longer renewable
    pub fn invalidate(&mut self) {
        self.is_valid = false;
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expire_at
    }

    /// Valid, not expired and not soft-deleted
    pub fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        self.is_valid && self.deleted_at.is_none() && !self.is_expired_at(now)
    }
}

/// A signed token and its lifetime in seconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedToken {
    pub token: String,
    pub expires_in: i64,
}

impl IssuedToken {
    pub fn new(token: String, expires_in: i64) -> Self {
        Self { token, expires_in }
    }
}

/// Token pair returned to the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    /// JWT access token
    pub access_token: IssuedToken,

    /// JWT refresh token
    pub refresh_token: IssuedToken,
}

impl TokenPair {
    pub fn new(access_token: IssuedToken, refresh_token: IssuedToken) -> Self {
        Self {
            access_token,
            refresh_token,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_claims_user_uid() {
        let mut claim = ClaimSet::new();
        claim.insert(USER_UID_CLAIM.to_string(), serde_json::json!("user-1"));
        let claims = JwtClaims {
            iss: "iss".to_string(),
            aud: "aud".to_string(),
            iat: 0,
            exp: 10,
            jti: Uuid::new_v4().to_string(),
            token_use: Some(TokenUse::Refresh),
            claim,
        };

        assert_eq!(claims.user_uid(), Some("user-1"));
        assert!(claims.jwt_id().is_ok());
    }

    #[test]
    fn test_claims_expiration() {
        let now = fixed_now();
        let claims = JwtClaims {
            iss: String::new(),
            aud: String::new(),
            iat: now.timestamp(),
            exp: now.timestamp() + 30,
            jti: String::new(),
            token_use: None,
            claim: ClaimSet::new(),
        };

        assert_eq!(claims.remaining_seconds(now), 30);
        assert!(!claims.is_expired_at(now));
        assert!(claims.is_expired_at(now + Duration::seconds(30)));
    }

    #[test]
    fn test_claims_wire_names() {
        let json = serde_json::json!({
            "iss": "sigil",
            "aud": "sigil-api",
            "iat": 1,
            "exp": 2,
            "jti": "abc",
            "token_use": "refresh",
            "claim": { "userUid": "u-1" }
        });
        let claims: JwtClaims = serde_json::from_value(json).unwrap();
        assert_eq!(claims.token_use, Some(TokenUse::Refresh));
        assert_eq!(claims.user_uid(), Some("u-1"));
    }

    #[test]
    fn test_refresh_record_lifecycle() {
        let now = fixed_now();
        let mut record = RefreshTokenRecord::new(Uuid::new_v4(), "user-1", now, 3600);

        assert!(record.is_usable_at(now));
        assert_eq!(record.expire_at, now + Duration::seconds(3600));
        assert!(record.is_expired_at(now + Duration::seconds(3600)));

        record.invalidate();
        assert!(!record.is_valid);
        assert!(!record.is_usable_at(now));
    }

    #[test]
    fn test_token_pair_serializes_camel_case() {
        let pair = TokenPair::new(
            IssuedToken::new("a".to_string(), 900),
            IssuedToken::new("r".to_string(), 3600),
        );
        let value = serde_json::to_value(&pair).unwrap();
        assert_eq!(value["accessToken"]["expiresIn"], 900);
        assert_eq!(value["refreshToken"]["token"], "r");
    }
}
