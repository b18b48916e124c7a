//! Metrics collection and exposition.
//!
//! # Metrics
//! - `auth_login_attempts_total` (counter): login outcomes by `outcome`
//! - `circuit_breaker_state` (gauge): 0=closed, 1=half-open, 2=open
//! - `circuit_breaker_transitions_total` (counter): transitions by breaker and target state
//! - `users_api_request_duration_seconds` (histogram): users API latency by status
//!
//! # Design Decisions
//! - Recording is a no-op until an exporter is installed
//! - Prometheus exporter is optional and served on its own address

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::resilience::state::CircuitState;

/// Start the Prometheus scrape endpoint. Must run inside the Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint started"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to start metrics endpoint"),
    }
}

pub fn record_login(outcome: &'static str) {
    ::metrics::counter!("auth_login_attempts_total", "outcome" => outcome).increment(1);
}

pub fn record_breaker_state(breaker: &str, state: CircuitState) {
    ::metrics::gauge!("circuit_breaker_state", "breaker" => breaker.to_string()).set(state.as_gauge());
}

pub fn record_breaker_transition(breaker: &str, to: CircuitState) {
    ::metrics::counter!(
        "circuit_breaker_transitions_total",
        "breaker" => breaker.to_string(),
        "to" => to.as_str()
    )
    .increment(1);
    record_breaker_state(breaker, to);
}

pub fn record_users_api_request(status: u16, start_time: Instant) {
    ::metrics::histogram!(
        "users_api_request_duration_seconds",
        "status" => status.to_string()
    )
    .record(start_time.elapsed().as_secs_f64());
}
