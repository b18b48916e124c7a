//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Login attempt:
//!     → timeouts.rs (caller deadline + cancellation travel with the request)
//!     → circuit_breaker.rs (admit or reject based on state)
//!         → guarded operation (profile fetch)
//!     → circuit_breaker.rs (record outcome, maybe transition)
//!     → listener.rs (state change notifications)
//! ```
//!
//! # Design Decisions
//! - Every outbound call has a deadline; cancellation surfaces as an error, never a hang
//! - No retries: one guarded attempt per login, retry policy belongs to the caller
//! - The breaker fails closed: a rejected call denies the login
//! - Breaker state is only reachable through the guarded-call contract

pub mod circuit_breaker;
pub mod listener;
pub mod state;
pub mod timeouts;

pub use circuit_breaker::{BreakerError, BreakerSettings, CircuitBreaker};
pub use listener::{StateListener, TracingListener};
pub use state::{CircuitState, Counts};
pub use timeouts::{Interrupted, RequestContext};
