//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (ratios, counts, timeouts)
//! - Reject unusable addresses and credential entries
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::auth::credentials::KEY_SEPARATOR;
use crate::config::schema::ServiceConfig;

/// Longest accepted duration setting: one year.
pub const MAX_DURATION_SECS: u64 = 365 * 24 * 60 * 60;

/// A single semantic problem in the configuration.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a socket address")]
    BindAddress(String),

    #[error("users_api.base_url '{0}' must be an absolute http(s) URL")]
    BaseUrl(String),

    #[error("jwt.secret must not be empty")]
    EmptySecret,

    #[error("jwt.{0} must be greater than zero")]
    ZeroTtl(&'static str),

    #[error("circuit_breaker.failure_ratio {0} must be in (0, 1]")]
    FailureRatio(f64),

    #[error("circuit_breaker.{0} must be at least 1")]
    ZeroCount(&'static str),

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroRequestTimeout,

    #[error("{0} must not exceed one year (31536000 seconds)")]
    DurationTooLong(&'static str),

    #[error("credentials.allowed entry #{0} is not of the form username_secret")]
    CredentialEntry(usize),
}

/// Check a parsed configuration.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    let base_url_ok = Url::parse(&config.users_api.base_url)
        .map(|url| matches!(url.scheme(), "http" | "https") && !url.cannot_be_a_base())
        .unwrap_or(false);
    if !base_url_ok {
        errors.push(ValidationError::BaseUrl(config.users_api.base_url.clone()));
    }

    if config.jwt.secret.is_empty() {
        errors.push(ValidationError::EmptySecret);
    }
    if config.jwt.profile_token_ttl_secs == 0 {
        errors.push(ValidationError::ZeroTtl("profile_token_ttl_secs"));
    }
    if config.jwt.access_token_ttl_secs == 0 {
        errors.push(ValidationError::ZeroTtl("access_token_ttl_secs"));
    }

    let breaker = &config.circuit_breaker;
    if !(breaker.failure_ratio > 0.0 && breaker.failure_ratio <= 1.0) {
        errors.push(ValidationError::FailureRatio(breaker.failure_ratio));
    }
    if breaker.min_requests == 0 {
        errors.push(ValidationError::ZeroCount("min_requests"));
    }
    if breaker.max_half_open_requests == 0 {
        errors.push(ValidationError::ZeroCount("max_half_open_requests"));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    for (field, secs) in [
        ("jwt.profile_token_ttl_secs", config.jwt.profile_token_ttl_secs),
        ("jwt.access_token_ttl_secs", config.jwt.access_token_ttl_secs),
        ("circuit_breaker.interval_secs", breaker.interval_secs),
        ("circuit_breaker.open_timeout_secs", breaker.open_timeout_secs),
        ("timeouts.connect_secs", config.timeouts.connect_secs),
        ("timeouts.request_secs", config.timeouts.request_secs),
    ] {
        if secs > MAX_DURATION_SECS {
            errors.push(ValidationError::DurationTooLong(field));
        }
    }

    for (i, entry) in config.credentials.allowed.iter().enumerate() {
        // Entry contents stay out of the error: they are credentials.
        match entry.split_once(KEY_SEPARATOR) {
            Some((user, _)) if !user.is_empty() => {}
            _ => errors.push(ValidationError::CredentialEntry(i)),
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
