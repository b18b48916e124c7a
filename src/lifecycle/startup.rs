//! Startup orchestration.
//!
//! # Responsibilities
//! - Turn a validated configuration into a ready login service
//! - Wire the circuit breaker with its listeners
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Secrets and credentials are handed to their owners here and nowhere else

use std::sync::Arc;

use thiserror::Error;
use url::Url;

use crate::auth::{CredentialSet, LoginService};
use crate::config::ServiceConfig;
use crate::resilience::{BreakerSettings, CircuitBreaker, TracingListener};
use crate::users_api::{ProfileFetcher, TokenMinter};

/// Errors while assembling the service.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid users API base URL: {0}")]
    BaseUrl(#[from] url::ParseError),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Build the login service described by `config`.
pub fn build_login_service(config: &ServiceConfig) -> Result<LoginService, StartupError> {
    let base_url = Url::parse(&config.users_api.base_url)?;
    let minter = TokenMinter::from_config(&config.jwt);
    let fetcher = ProfileFetcher::new(base_url, minter, &config.timeouts)?;

    let breaker = CircuitBreaker::new(BreakerSettings::from(&config.circuit_breaker))
        .with_listener(Arc::new(TracingListener));

    let credentials = CredentialSet::new(config.credentials.allowed.iter().cloned());

    tracing::info!(
        users_api = %config.users_api.base_url,
        breaker = %config.circuit_breaker.name,
        credentials = credentials.len(),
        "Login service initialized"
    );

    Ok(LoginService::new(fetcher, breaker, credentials))
}
