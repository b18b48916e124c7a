//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Validate → Build login service → Start listener
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Drain in-flight logins → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then core, then listener
//! - Listener starts last (traffic only when ready)

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{build_login_service, StartupError};
