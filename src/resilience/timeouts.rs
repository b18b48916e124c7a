//! Caller deadlines and cancellation.
//!
//! # Responsibilities
//! - Carry the caller's deadline and cancellation signal into outbound calls
//! - Stop waiting on the network as soon as either fires
//!
//! # Design Decisions
//! - Built on Tokio timers and `tokio_util` cancellation tokens
//! - An interrupted call returns an error, it never hangs

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Why an operation stopped before completing.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Interrupted {
    #[error("request cancelled by caller")]
    Cancelled,

    #[error("request deadline exceeded")]
    DeadlineExceeded,
}

/// Per-request context propagated from the login caller to the network call.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl RequestContext {
    /// A context with no deadline that is never cancelled unless asked to.
    pub fn new() -> Self {
        Self::default()
    }

    /// A context that expires `timeout` from now. A timeout past the clock's
    /// range leaves the context without a deadline.
    pub fn with_timeout(timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => Self::new().with_deadline(deadline),
            None => Self::new(),
        }
    }

    /// Replace the deadline, keeping the cancellation token.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Drive `fut` until it completes, the context is cancelled, or the
    /// deadline passes.
    pub async fn run<F: Future>(&self, fut: F) -> Result<F::Output, Interrupted> {
        let deadline = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(Interrupted::Cancelled),
            _ = deadline => Err(Interrupted::DeadlineExceeded),
            output = fut => Ok(output),
        }
    }
}
