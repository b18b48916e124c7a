//! HTTP host subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID, tracing span)
//!     → handlers.rs (POST /login, GET /health)
//!     → response.rs (LoginError → status code)
//!     → Send to client
//! ```

pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use handlers::{AppState, LoginRequest, LoginResponse};
pub use request::X_REQUEST_ID;
pub use server::HttpServer;
