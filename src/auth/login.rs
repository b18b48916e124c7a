//! Login orchestration.
//!
//! # Responsibilities
//! - Fetch the user's profile through the circuit breaker
//! - Check the username/secret pair against the trusted credential set
//! - Collapse every dependency failure into one opaque error
//!
//! # Design Decisions
//! - The profile fetch runs before the credential check on every attempt, so
//!   an unreachable users API denies all logins (fail-secure)
//! - An identity is returned only after a fresh fetch AND a credential match
//! - Breaker rejections and fetch errors look identical to the caller

use thiserror::Error;

use crate::auth::credentials::CredentialSet;
use crate::observability::metrics;
use crate::resilience::circuit_breaker::CircuitBreaker;
use crate::resilience::timeouts::RequestContext;
use crate::users_api::client::ProfileFetcher;
use crate::users_api::types::Identity;

/// Externally visible login failure.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum LoginError {
    #[error("wrong credentials")]
    WrongCredentials,

    #[error("authentication service unavailable")]
    ServiceUnavailable,
}

impl LoginError {
    /// Label used for the login outcome metric.
    pub fn as_outcome(&self) -> &'static str {
        match self {
            LoginError::WrongCredentials => "wrong_credentials",
            LoginError::ServiceUnavailable => "unavailable",
        }
    }
}

/// Entry point for authenticating a user.
#[derive(Debug)]
pub struct LoginService {
    fetcher: ProfileFetcher,
    breaker: CircuitBreaker,
    credentials: CredentialSet,
}

impl LoginService {
    pub fn new(fetcher: ProfileFetcher, breaker: CircuitBreaker, credentials: CredentialSet) -> Self {
        Self {
            fetcher,
            breaker,
            credentials,
        }
    }

    /// Breaker guarding the users API, for health reporting.
    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    /// Authenticate `username` with `secret`.
    pub async fn login(
        &self,
        ctx: &RequestContext,
        username: &str,
        secret: &str,
    ) -> Result<Identity, LoginError> {
        let result = self.authenticate(ctx, username, secret).await;
        metrics::record_login(match &result {
            Ok(_) => "success",
            Err(e) => e.as_outcome(),
        });
        result
    }

    async fn authenticate(
        &self,
        ctx: &RequestContext,
        username: &str,
        secret: &str,
    ) -> Result<Identity, LoginError> {
        let identity = match self
            .breaker
            .call(|| self.fetcher.fetch_profile(ctx, username))
            .await
        {
            Ok(identity) => identity,
            Err(e) if e.is_rejection() => {
                tracing::warn!(
                    target: "security",
                    username,
                    breaker = self.breaker.name(),
                    reason = %e,
                    "Circuit breaker rejected users API call, denying login"
                );
                return Err(LoginError::ServiceUnavailable);
            }
            Err(e) => {
                tracing::warn!(username, error = %e, "Users API call failed, denying login");
                return Err(LoginError::ServiceUnavailable);
            }
        };

        if !self.credentials.contains(username, secret) {
            tracing::info!(username, "Wrong credentials");
            return Err(LoginError::WrongCredentials);
        }

        tracing::debug!(username, role = %identity.role, "Login succeeded");
        Ok(identity)
    }
}
