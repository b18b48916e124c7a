//! Circuit breaker guarding calls to the users API.
//!
//! # Design Decisions
//! - One breaker per dependency, shared by all concurrent logins
//! - Fail fast in Open state (the wrapped operation is never invoked)
//! - Bounded probes in HalfOpen, further callers are rejected
//! - The lock covers bookkeeping only, never the awaited operation
//! - Each transition or window reset starts a new generation; outcomes from an
//!   older generation are dropped
//! - A call abandoned mid-flight is recorded as a failure

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;

use crate::config::CircuitBreakerConfig;
use crate::observability::metrics;
use crate::resilience::listener::StateListener;
use crate::resilience::state::{CircuitState, Counts};

/// Tuning for a [`CircuitBreaker`].
#[derive(Debug, Clone)]
pub struct BreakerSettings {
    /// Breaker identity used in notifications and metrics.
    pub name: String,
    /// Probe calls admitted per HalfOpen period, and the success streak
    /// needed to close again.
    pub max_half_open_requests: u32,
    /// Closed-state counters are reset when no call was admitted for this
    /// long. Zero disables the reset.
    pub interval: Duration,
    /// Cool-down spent in Open before probing.
    pub open_timeout: Duration,
    /// Minimum admitted requests before the failure ratio is evaluated.
    pub min_requests: u32,
    /// Failure ratio at or above which the breaker trips.
    pub failure_ratio: f64,
}

impl BreakerSettings {
    fn ready_to_trip(&self, counts: &Counts) -> bool {
        counts.requests >= self.min_requests && counts.failure_ratio() >= self.failure_ratio
    }
}

impl Default for BreakerSettings {
    fn default() -> Self {
        Self::from(&CircuitBreakerConfig::default())
    }
}

impl From<&CircuitBreakerConfig> for BreakerSettings {
    fn from(config: &CircuitBreakerConfig) -> Self {
        Self {
            name: config.name.clone(),
            max_half_open_requests: config.max_half_open_requests.max(1),
            interval: Duration::from_secs(config.interval_secs),
            open_timeout: Duration::from_secs(config.open_timeout_secs),
            min_requests: config.min_requests,
            failure_ratio: config.failure_ratio,
        }
    }
}

/// Result of a guarded call.
#[derive(Debug, Error)]
pub enum BreakerError<E> {
    /// Rejected without invoking the operation.
    #[error("circuit breaker is open")]
    Open,

    /// Rejected because the HalfOpen probe limit is in use.
    #[error("too many requests while circuit breaker is half-open")]
    TooManyRequests,

    /// The operation ran and failed.
    #[error("{0}")]
    Inner(E),
}

impl<E> BreakerError<E> {
    /// True when the call was turned away by the breaker itself.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, BreakerError::Inner(_))
    }
}

#[derive(Debug, Clone, Copy)]
struct Transition {
    from: CircuitState,
    to: CircuitState,
}

#[derive(Debug)]
struct Inner {
    state: CircuitState,
    generation: u64,
    counts: Counts,
    /// Open: end of the cool-down. Closed: end of the idle window.
    expiry: Option<Instant>,
}

impl Inner {
    fn new() -> Self {
        Self {
            state: CircuitState::Closed,
            generation: 0,
            counts: Counts::default(),
            expiry: None,
        }
    }

    /// Apply time-driven changes before admitting a call.
    fn refresh(&mut self, settings: &BreakerSettings, now: Instant) -> Option<Transition> {
        let expired = self.expiry.is_some_and(|expiry| expiry <= now);
        match self.state {
            CircuitState::Closed if expired => {
                self.new_generation(settings, now);
                None
            }
            CircuitState::Open if expired => self.set_state(CircuitState::HalfOpen, settings, now),
            _ => None,
        }
    }

    fn set_state(
        &mut self,
        to: CircuitState,
        settings: &BreakerSettings,
        now: Instant,
    ) -> Option<Transition> {
        if self.state == to {
            return None;
        }
        let from = self.state;
        self.state = to;
        self.new_generation(settings, now);
        Some(Transition { from, to })
    }

    fn new_generation(&mut self, settings: &BreakerSettings, now: Instant) {
        self.generation = self.generation.wrapping_add(1);
        self.counts.clear();
        self.expiry = match self.state {
            CircuitState::Open => now.checked_add(settings.open_timeout),
            CircuitState::Closed | CircuitState::HalfOpen => None,
        };
    }

    fn on_success(&mut self, settings: &BreakerSettings, now: Instant) -> Option<Transition> {
        match self.state {
            CircuitState::Closed => {
                self.counts.on_success();
                None
            }
            CircuitState::HalfOpen => {
                self.counts.on_success();
                if self.counts.consecutive_successes >= settings.max_half_open_requests {
                    self.set_state(CircuitState::Closed, settings, now)
                } else {
                    None
                }
            }
            CircuitState::Open => None,
        }
    }

    fn on_failure(&mut self, settings: &BreakerSettings, now: Instant) -> Option<Transition> {
        match self.state {
            CircuitState::Closed => {
                self.counts.on_failure();
                if settings.ready_to_trip(&self.counts) {
                    self.set_state(CircuitState::Open, settings, now)
                } else {
                    None
                }
            }
            CircuitState::HalfOpen => self.set_state(CircuitState::Open, settings, now),
            CircuitState::Open => None,
        }
    }
}

enum Rejection {
    Open,
    TooManyRequests,
}

/// Circuit breaker state machine.
///
/// Concurrent callers share one state; updates are serialized by a mutex
/// that is never held across an `.await`.
pub struct CircuitBreaker {
    settings: BreakerSettings,
    inner: Mutex<Inner>,
    listeners: Vec<Arc<dyn StateListener>>,
}

impl CircuitBreaker {
    /// Create a breaker in the Closed state.
    pub fn new(settings: BreakerSettings) -> Self {
        metrics::record_breaker_state(&settings.name, CircuitState::Closed);
        Self {
            settings,
            inner: Mutex::new(Inner::new()),
            listeners: Vec::new(),
        }
    }

    /// Register a transition observer.
    pub fn with_listener(mut self, listener: Arc<dyn StateListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    pub fn name(&self) -> &str {
        &self.settings.name
    }

    pub fn settings(&self) -> &BreakerSettings {
        &self.settings
    }

    /// Last recorded state. Read-only: an elapsed cool-down is only acted on
    /// by the next call attempt.
    pub fn state(&self) -> CircuitState {
        self.lock().state
    }

    /// Snapshot of the current generation's counters.
    pub fn counts(&self) -> Counts {
        self.lock().counts
    }

    /// Run `op` through the breaker.
    ///
    /// Rejected calls return immediately without invoking `op`. Admitted calls
    /// are awaited to completion and their outcome is recorded.
    pub async fn call<T, E, F, Fut>(&self, op: F) -> Result<T, BreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let generation = match self.before_request() {
            Ok(generation) => generation,
            Err(Rejection::Open) => return Err(BreakerError::Open),
            Err(Rejection::TooManyRequests) => return Err(BreakerError::TooManyRequests),
        };

        let mut pending = PendingCall {
            breaker: self,
            generation,
            settled: false,
        };
        let result = op().await;
        pending.settle(result.is_ok());

        result.map_err(BreakerError::Inner)
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // No caller code runs under the lock, so a poisoned state is still consistent.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn before_request(&self) -> Result<u64, Rejection> {
        let now = Instant::now();
        let (admitted, transition) = {
            let mut inner = self.lock();
            let transition = inner.refresh(&self.settings, now);

            let admitted = match inner.state {
                CircuitState::Open => Err(Rejection::Open),
                CircuitState::HalfOpen
                    if inner.counts.requests >= self.settings.max_half_open_requests =>
                {
                    Err(Rejection::TooManyRequests)
                }
                CircuitState::HalfOpen => {
                    inner.counts.on_request();
                    Ok(inner.generation)
                }
                CircuitState::Closed => {
                    inner.counts.on_request();
                    if !self.settings.interval.is_zero() {
                        inner.expiry = now.checked_add(self.settings.interval);
                    }
                    Ok(inner.generation)
                }
            };
            (admitted, transition)
        };

        self.notify(transition);
        admitted
    }

    fn after_request(&self, generation: u64, success: bool) {
        let now = Instant::now();
        let transition = {
            let mut inner = self.lock();
            if inner.generation != generation {
                return;
            }
            if success {
                inner.on_success(&self.settings, now)
            } else {
                inner.on_failure(&self.settings, now)
            }
        };

        self.notify(transition);
    }

    fn notify(&self, transition: Option<Transition>) {
        let Some(Transition { from, to }) = transition else {
            return;
        };

        metrics::record_breaker_transition(&self.settings.name, to);
        for listener in &self.listeners {
            listener.on_state_change(&self.settings.name, from, to);
        }
    }
}

impl std::fmt::Debug for CircuitBreaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CircuitBreaker")
            .field("settings", &self.settings)
            .field("state", &self.state())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// Records the outcome of an admitted call, or a failure if it is dropped
/// before completing.
struct PendingCall<'a> {
    breaker: &'a CircuitBreaker,
    generation: u64,
    settled: bool,
}

impl PendingCall<'_> {
    fn settle(&mut self, success: bool) {
        self.settled = true;
        self.breaker.after_request(self.generation, success);
    }
}

impl Drop for PendingCall<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.breaker.after_request(self.generation, false);
        }
    }
}
