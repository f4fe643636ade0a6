//! Unit tests for token service configuration

use jsonwebtoken::Algorithm;
use sg_shared::config::JwtConfig;

use crate::services::token::TokenServiceConfig;

#[test]
fn test_from_jwt_config_splits_access_and_refresh() {
    let jwt = JwtConfig::default().with_refresh_expiry(3600, 1800);
    let config = TokenServiceConfig::from_jwt_config(&jwt).unwrap();

    assert_eq!(config.algorithm, Algorithm::ES256);
    assert_eq!(config.access.lifetime_seconds, jwt.access_token_expiry);
    assert_eq!(config.access.renewal_window_seconds, 0);
    assert_eq!(config.refresh.lifetime_seconds, 3600);
    assert_eq!(config.refresh.renewal_window_seconds, 1800);
    assert_eq!(config.refresh.issuer, jwt.issuer);
}

#[test]
fn test_non_ecdsa_algorithm_is_rejected() {
    let jwt = JwtConfig {
        algorithm: "HS256".to_string(),
        ..Default::default()
    };
    assert!(TokenServiceConfig::from_jwt_config(&jwt).is_err());

    let jwt = JwtConfig {
        algorithm: "nope".to_string(),
        ..Default::default()
    };
    assert!(TokenServiceConfig::from_jwt_config(&jwt).is_err());
}

#[test]
fn test_default_matches_jwt_defaults() {
    let config = TokenServiceConfig::default();
    let jwt = JwtConfig::default();
    assert_eq!(config.refresh.renewal_window_seconds, jwt.refresh_renewal_window);
    assert_eq!(config.access.audience, jwt.audience);
}
