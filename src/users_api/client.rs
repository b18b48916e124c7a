//! Users API client.
//!
//! # Responsibilities
//! - Mint a token for the subject and attach it as a bearer credential
//! - Fetch `{base_url}/users/{username}` within the caller's context
//! - Map transport, status and decoding problems to typed errors

use std::time::{Duration, Instant};

use url::Url;

use crate::config::TimeoutConfig;
use crate::observability::metrics;
use crate::resilience::timeouts::RequestContext;
use crate::users_api::token::TokenMinter;
use crate::users_api::types::{FetchError, FetchResult, Identity};

/// Fetches user profiles from the users API.
#[derive(Debug, Clone)]
pub struct ProfileFetcher {
    client: reqwest::Client,
    base_url: Url,
    minter: TokenMinter,
}

impl ProfileFetcher {
    /// Create a fetcher with its own HTTP client.
    ///
    /// # Errors
    /// Returns the reqwest builder error if the client can not be created.
    pub fn new(
        base_url: Url,
        minter: TokenMinter,
        timeouts: &TimeoutConfig,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .no_proxy()
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .timeout(Duration::from_secs(timeouts.request_secs))
            .build()?;

        Ok(Self::with_client(client, base_url, minter))
    }

    /// Create a fetcher around an existing client.
    pub fn with_client(client: reqwest::Client, base_url: Url, minter: TokenMinter) -> Self {
        Self {
            client,
            base_url,
            minter,
        }
    }

    /// Fetch the profile of `username`.
    pub async fn fetch_profile(&self, ctx: &RequestContext, username: &str) -> FetchResult<Identity> {
        let token = self.minter.mint(username)?;
        let url = self.profile_url(username)?;
        let started = Instant::now();

        tracing::debug!(username, url = %url, "Requesting user profile");

        let response = ctx
            .run(self.client.get(url).bearer_auth(token).send())
            .await
            .map_err(|e| FetchError::Connection(e.to_string()))?
            .map_err(|e| FetchError::Connection(e.to_string()))?;

        let status = response.status();
        let body = ctx
            .run(response.text())
            .await
            .map_err(|e| FetchError::Connection(e.to_string()))?
            .map_err(|e| FetchError::Connection(format!("reading response body: {}", e)))?;

        metrics::record_users_api_request(status.as_u16(), started);

        if !status.is_success() {
            return Err(FetchError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| FetchError::Decode(e.to_string()))
    }

    /// `{base_url}/users/{username}` with the username as one encoded segment.
    pub fn profile_url(&self, username: &str) -> FetchResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| FetchError::Connection(format!("invalid users API base URL: {}", self.base_url)))?
            .pop_if_empty()
            .push("users")
            .push(username);
        Ok(url)
    }
}
