//! Authentication subsystem.
//!
//! # Data Flow
//! ```text
//! login(ctx, username, secret)
//!     → circuit breaker → users API profile fetch
//!     → credentials.rs ("{username}_{secret}" membership)
//!     → Identity | WrongCredentials | ServiceUnavailable
//! ```

pub mod credentials;
pub mod login;

pub use credentials::CredentialSet;
pub use login::{LoginError, LoginService};
