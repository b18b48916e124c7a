//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the authentication service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Remote users API the profile is fetched from.
    pub users_api: UsersApiConfig,

    /// Token signing settings.
    pub jwt: JwtConfig,

    /// Trusted local credentials.
    pub credentials: CredentialsConfig,

    /// Circuit breaker guarding the users API.
    pub circuit_breaker: CircuitBreakerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
        }
    }
}

/// Users API location.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UsersApiConfig {
    /// Base URL; profiles are read from `{base_url}/users/{username}`.
    pub base_url: String,
}

impl Default for UsersApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8083".to_string(),
        }
    }
}

/// JWT signing configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct JwtConfig {
    /// HMAC secret shared with the users API.
    pub secret: String,

    /// Lifetime of the token sent to the users API, in seconds.
    pub profile_token_ttl_secs: u64,

    /// Lifetime of the access token returned to the login caller, in seconds.
    pub access_token_ttl_secs: u64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            // WARNING: This is a placeholder! Change this in production.
            secret: "myfancysecret".to_string(),
            profile_token_ttl_secs: 24 * 60 * 60,
            access_token_ttl_secs: 72 * 60 * 60,
        }
    }
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("profile_token_ttl_secs", &self.profile_token_ttl_secs)
            .field("access_token_ttl_secs", &self.access_token_ttl_secs)
            .finish()
    }
}

/// Trusted credential entries, each `"{username}_{secret}"`.
#[derive(Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct CredentialsConfig {
    pub allowed: Vec<String>,
}

impl std::fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsConfig")
            .field("allowed", &format_args!("[{} entries]", self.allowed.len()))
            .finish()
    }
}

/// Circuit breaker configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CircuitBreakerConfig {
    /// Breaker identity in logs and metrics.
    pub name: String,

    /// Probe calls admitted while half-open.
    pub max_half_open_requests: u32,

    /// Idle period after which closed-state counters reset, in seconds.
    pub interval_secs: u64,

    /// Cool-down before an open breaker starts probing, in seconds.
    pub open_timeout_secs: u64,

    /// Minimum requests before the failure ratio is evaluated.
    pub min_requests: u32,

    /// Failure ratio that trips the breaker.
    pub failure_ratio: f64,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            name: "users-api-breaker".to_string(),
            max_half_open_requests: 3,
            interval_secs: 60,
            open_timeout_secs: 30,
            min_requests: 5,
            failure_ratio: 0.5,
        }
    }
}

/// Timeout configuration for outbound and inbound requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Request timeout (total time for a login, including the users API call) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 10,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
