//! Users API integration.
//!
//! # Data Flow
//! ```text
//! fetch_profile(ctx, username)
//!     → token.rs (mint HS256 token: username, scope=read, iat, exp)
//!     → client.rs (GET {base_url}/users/{username}, Authorization: Bearer)
//!     → types.rs (Identity or FetchError)
//! ```
//!
//! # Design Decisions
//! - The fetcher is always called through the circuit breaker
//! - Diagnostics (status, body) stay in FetchError and never reach the login caller

pub mod client;
pub mod token;
pub mod types;

pub use client::ProfileFetcher;
pub use token::TokenMinter;
pub use types::{FetchError, FetchResult, Identity, TokenError};
