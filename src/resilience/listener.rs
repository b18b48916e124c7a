//! Circuit breaker state change notifications.

use crate::resilience::state::CircuitState;

/// Observer of breaker transitions.
///
/// Called after the breaker lock is released, once per transition.
pub trait StateListener: Send + Sync {
    fn on_state_change(&self, breaker: &str, from: CircuitState, to: CircuitState);
}

/// Logs every transition through `tracing`.
///
/// Opening the breaker means every login is denied until the users API
/// recovers, so that transition is reported as a security event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingListener;

impl StateListener for TracingListener {
    fn on_state_change(&self, breaker: &str, from: CircuitState, to: CircuitState) {
        tracing::info!(breaker, %from, %to, "Circuit breaker state changed");

        match to {
            CircuitState::Open => {
                tracing::warn!(
                    target: "security",
                    breaker,
                    "Circuit breaker OPEN: all logins are denied until the users API recovers"
                );
            }
            CircuitState::Closed => {
                tracing::info!(
                    target: "security",
                    breaker,
                    "Circuit breaker CLOSED: normal logins restored"
                );
            }
            CircuitState::HalfOpen => {}
        }
    }
}
