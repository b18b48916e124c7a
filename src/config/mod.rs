//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize, environment overrides)
//!     → validation.rs (semantic checks)
//!     → ServiceConfig (validated, immutable)
//!     → lifecycle::startup builds the login service from it
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; secrets and credentials are injected
//!   at construction, never read from globals
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::ServiceConfig;
pub use schema::{
    CircuitBreakerConfig, CredentialsConfig, JwtConfig, ListenerConfig, ObservabilityConfig,
    TimeoutConfig, UsersApiConfig,
};
