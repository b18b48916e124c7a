//! JWT minting.
//!
//! # Responsibilities
//! - Sign the short-lived token that authorizes the users API lookup
//! - Sign the access token handed back to a successful login
//!
//! # Design Decisions
//! - HS256 with a secret injected at construction (no process-wide key)
//! - Minting failures are fatal to the attempt and never retried
//! - Error values never carry key material

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use crate::config::JwtConfig;
use crate::users_api::types::{Identity, TokenError};

/// Scope granted to the users API token.
pub const PROFILE_SCOPE: &str = "read";

/// Claims of the token sent to the users API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileClaims {
    pub username: String,
    pub scope: String,
    pub iat: u64,
    pub exp: u64,
}

/// Claims of the access token returned to the login caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    pub username: String,
    pub firstname: String,
    pub lastname: String,
    pub role: String,
    pub iat: u64,
    pub exp: u64,
}

/// Signs tokens with the service secret.
#[derive(Clone)]
pub struct TokenMinter {
    key: Option<EncodingKey>,
    profile_ttl: Duration,
    access_ttl: Duration,
}

impl TokenMinter {
    /// Create a minter. An empty secret yields a minter that always fails.
    pub fn new(secret: &str, profile_ttl: Duration, access_ttl: Duration) -> Self {
        let key = (!secret.is_empty()).then(|| EncodingKey::from_secret(secret.as_bytes()));
        Self {
            key,
            profile_ttl,
            access_ttl,
        }
    }

    pub fn from_config(config: &JwtConfig) -> Self {
        Self::new(
            &config.secret,
            Duration::from_secs(config.profile_token_ttl_secs),
            Duration::from_secs(config.access_token_ttl_secs),
        )
    }

    /// Token identifying `username` to the users API.
    pub fn mint(&self, username: &str) -> Result<String, TokenError> {
        let iat = unix_now();
        let claims = ProfileClaims {
            username: username.to_string(),
            scope: PROFILE_SCOPE.to_string(),
            iat,
            exp: iat.saturating_add(self.profile_ttl.as_secs()),
        };
        self.sign(&claims)
    }

    /// Access token carrying the authenticated profile.
    pub fn mint_access_token(&self, identity: &Identity) -> Result<String, TokenError> {
        let iat = unix_now();
        let claims = AccessClaims {
            username: identity.username.clone(),
            firstname: identity.first_name.clone(),
            lastname: identity.last_name.clone(),
            role: identity.role.clone(),
            iat,
            exp: iat.saturating_add(self.access_ttl.as_secs()),
        };
        self.sign(&claims)
    }

    fn sign<T: Serialize>(&self, claims: &T) -> Result<String, TokenError> {
        let key = self.key.as_ref().ok_or(TokenError::MissingSecret)?;
        Ok(encode(&Header::new(Algorithm::HS256), claims, key)?)
    }
}

impl std::fmt::Debug for TokenMinter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenMinter")
            .field("key", &self.key.as_ref().map(|_| "<redacted>"))
            .field("profile_ttl", &self.profile_ttl)
            .field("access_ttl", &self.access_ttl)
            .finish()
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
