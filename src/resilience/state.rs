//! Circuit breaker state and rolling counters.
//!
//! # States
//! - Closed: normal operation, calls pass through
//! - Open: dependency assumed down, calls fail fast
//! - HalfOpen: a bounded number of probes test whether it recovered
//!
//! # State Transitions
//! ```text
//! Closed → Open: requests >= min_requests && failures / requests >= failure_ratio
//! Open → HalfOpen: first call attempt after the cool-down
//! HalfOpen → Closed: consecutive probe successes reach the probe limit
//! HalfOpen → Open: any probe fails
//! ```

use serde::Serialize;
use std::fmt;

/// Breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

impl CircuitState {
    /// Numeric encoding used for the state gauge (0=closed, 1=half-open, 2=open).
    pub fn as_gauge(self) -> f64 {
        match self {
            CircuitState::Closed => 0.0,
            CircuitState::HalfOpen => 1.0,
            CircuitState::Open => 2.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CircuitState::Closed => "closed",
            CircuitState::Open => "open",
            CircuitState::HalfOpen => "half-open",
        }
    }
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome counters for the current breaker generation.
///
/// `requests` is bumped when a call is admitted, the other counters when its
/// outcome is recorded, so `total_successes + total_failures <= requests` holds
/// at all times.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counts {
    pub requests: u32,
    pub total_successes: u32,
    pub total_failures: u32,
    pub consecutive_successes: u32,
    pub consecutive_failures: u32,
}

impl Counts {
    pub(crate) fn on_request(&mut self) {
        self.requests = self.requests.saturating_add(1);
    }

    pub(crate) fn on_success(&mut self) {
        self.total_successes = self.total_successes.saturating_add(1);
        self.consecutive_successes = self.consecutive_successes.saturating_add(1);
        self.consecutive_failures = 0;
    }

    pub(crate) fn on_failure(&mut self) {
        self.total_failures = self.total_failures.saturating_add(1);
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.consecutive_successes = 0;
    }

    pub(crate) fn clear(&mut self) {
        *self = Counts::default();
    }

    /// Fraction of admitted requests that failed. Zero when nothing was admitted.
    pub fn failure_ratio(&self) -> f64 {
        if self.requests == 0 {
            return 0.0;
        }
        f64::from(self.total_failures) / f64::from(self.requests)
    }
}
