//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events, `security` target for alerts)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging with `tracing`
//! - Request ID flows from the HTTP layer into every log line via spans
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;
