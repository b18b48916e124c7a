//! Users API types and error definitions.

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Profile of an authenticated user, as returned by the users API.
///
/// Only `username` is required. Missing or null name and role fields decode
/// as empty strings, and the camel-case spellings are accepted too.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub username: String,
    #[serde(
        rename = "firstname",
        alias = "firstName",
        default,
        deserialize_with = "null_as_empty"
    )]
    pub first_name: String,
    #[serde(
        rename = "lastname",
        alias = "lastName",
        default,
        deserialize_with = "null_as_empty"
    )]
    pub last_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub role: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Errors while minting a token.
#[derive(Debug, Error)]
pub enum TokenError {
    /// No signing secret was configured.
    #[error("signing secret is not configured")]
    MissingSecret,

    /// Claims could not be encoded or signed.
    #[error("failed to sign token: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

/// Errors while fetching a profile. All of them count as breaker failures.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The outbound token could not be produced.
    #[error("users API token error: {0}")]
    Signing(#[from] TokenError),

    /// Transport failure, timeout or caller cancellation.
    #[error("users API connection error: {0}")]
    Connection(String),

    /// Non-2xx response. The body is kept for diagnostics only.
    #[error("users API responded with status {status}: {body}")]
    Upstream { status: u16, body: String },

    /// 2xx response whose body is not a profile.
    #[error("failed to parse users API response: {0}")]
    Decode(String),
}

/// Result type for users API operations.
pub type FetchResult<T> = Result<T, FetchError>;
