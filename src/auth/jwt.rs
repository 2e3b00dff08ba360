use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Config;

/// JWT claims carried by access tokens.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: user ID.
    pub sub: String,
    /// Expiration time (Unix timestamp).
    pub exp: i64,
    /// Issued-at time (Unix timestamp).
    pub iat: i64,
    /// Unique JWT identifier.
    pub jti: String,
}

impl Claims {
    /// The user id in `sub`, if it is one.
    #[must_use]
    pub fn user_id(&self) -> Option<i32> {
        self.sub.parse().ok()
    }
}

/// Generate an access token for the given user.
///
/// # Errors
///
/// Returns an error if JWT encoding fails.
pub fn generate_access_token(user_id: i32, config: &Config) -> anyhow::Result<String> {
    let now = Utc::now();

    #[allow(clippy::cast_possible_wrap)]
    let exp = now.timestamp() + config.jwt_expiration_secs as i64;

    let claims = Claims {
        sub: user_id.to_string(),
        exp,
        iat: now.timestamp(),
        jti: Uuid::new_v4().to_string(),
    };

    let key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
    encode(&Header::default(), &claims, &key)
        .map_err(|e| anyhow::anyhow!("Failed to encode access token: {e}"))
}

/// Validate an access token and return its claims.
///
/// # Errors
///
/// Returns an error if the token is invalid or expired.
pub fn validate_access_token(token: &str, secret: &str) -> anyhow::Result<Claims> {
    let key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::default();

    let token_data = decode::<Claims>(token, &key, &validation)
        .map_err(|e| anyhow::anyhow!("Invalid access token: {e}"))?;

    Ok(token_data.claims)
}

/// Generate a short-lived JWT for OAuth CSRF state (30 minutes).
///
/// # Errors
///
/// Returns an error if JWT encoding fails.
pub fn generate_oauth_state(secret: &str, redirect_uri: Option<&str>) -> anyhow::Result<String> {
    let now = Utc::now();

    let claims = OAuthStateClaims {
        csrf: Uuid::new_v4().to_string(),
        redirect_uri: redirect_uri.map(String::from),
        exp: now.timestamp() + 1800,
        iat: now.timestamp(),
    };

    let key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), &claims, &key)
        .map_err(|e| anyhow::anyhow!("Failed to encode OAuth state: {e}"))
}

/// Validate an OAuth CSRF state token.
///
/// # Errors
///
/// Returns an error if the state token is invalid or expired.
pub fn validate_oauth_state(state: &str, secret: &str) -> anyhow::Result<OAuthStateClaims> {
    let key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::default();

    let token_data = decode::<OAuthStateClaims>(state, &key, &validation)
        .map_err(|e| anyhow::anyhow!("Invalid OAuth state: {e}"))?;

    Ok(token_data.claims)
}

/// Claims for OAuth CSRF state tokens.
#[derive(Debug, Serialize, Deserialize)]
pub struct OAuthStateClaims {
    pub csrf: String,
    pub redirect_uri: Option<String>,
    pub exp: i64,
    pub iat: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-for-testing-only-32chars";

    #[test]
    fn access_token_round_trip_carries_user_id() {
        let token = jsonwebtoken::encode(
            &Header::default(),
            &Claims {
                sub: "7".to_string(),
                exp: Utc::now().timestamp() + 60,
                iat: Utc::now().timestamp(),
                jti: Uuid::new_v4().to_string(),
            },
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap_or_default();

        let claims = validate_access_token(&token, SECRET);
        assert_eq!(claims.ok().and_then(|c| c.user_id()), Some(7));
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let state = generate_oauth_state("another-secret", None).unwrap_or_default();
        assert!(validate_oauth_state(&state, SECRET).is_err());
    }

    #[test]
    fn oauth_state_keeps_redirect_uri() {
        let state = generate_oauth_state(SECRET, Some("http://localhost:3001/done"))
            .unwrap_or_default();
        let claims = validate_oauth_state(&state, SECRET);
        assert_eq!(
            claims.ok().and_then(|c| c.redirect_uri).as_deref(),
            Some("http://localhost:3001/done")
        );
    }
}
