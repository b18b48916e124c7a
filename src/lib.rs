//! Authentication service library.
//!
//! Authenticates users against a trusted local credential set and enriches
//! the identity with a profile fetched from the users API, behind a circuit
//! breaker that fails closed.

pub mod auth;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod users_api;

pub use auth::{LoginError, LoginService};
pub use config::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use users_api::Identity;
