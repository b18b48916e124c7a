//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the `tracing` subscriber
//! - Configure log level from config, overridable with `RUST_LOG`
//!
//! # Design Decisions
//! - Security events (breaker opening, rejected logins) use the `security` target
//!   so they can be filtered and routed separately

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter directives for a configured level.
pub fn default_directives(log_level: &str) -> String {
    format!(
        "auth_service={level},security={level},tower_http={level}",
        level = log_level
    )
}

/// Install the global subscriber. Later calls are ignored.
pub fn init_logging(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_directives(log_level).into());

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
