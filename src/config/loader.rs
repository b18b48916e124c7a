//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use crate::config::schema::ServiceConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable overriding the listener port.
pub const ENV_PORT: &str = "AUTH_API_PORT";
/// Environment variable overriding the users API base URL.
pub const ENV_USERS_API_ADDRESS: &str = "USERS_API_ADDRESS";
/// Environment variable overriding the JWT secret.
pub const ENV_JWT_SECRET: &str = "JWT_SECRET";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load configuration from an optional TOML file, apply environment
/// overrides, then validate.
pub fn load_config(path: Option<&Path>) -> Result<ServiceConfig, ConfigError> {
    let mut config = match path {
        Some(path) => parse_config(&fs::read_to_string(path).map_err(ConfigError::Io)?)?,
        None => ServiceConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Parse a TOML document without validating it.
pub fn parse_config(content: &str) -> Result<ServiceConfig, ConfigError> {
    toml::from_str(content).map_err(ConfigError::Parse)
}

/// Overlay deployment-provided values on top of the file configuration.
pub fn apply_env_overrides<F>(config: &mut ServiceConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(port) = lookup(ENV_PORT) {
        let host = config
            .listener
            .bind_address
            .rsplit_once(':')
            .map(|(host, _)| host)
            .unwrap_or("0.0.0.0");
        config.listener.bind_address = format!("{}:{}", host, port);
    }

    if let Some(address) = lookup(ENV_USERS_API_ADDRESS) {
        config.users_api.base_url = address;
    }

    if let Some(secret) = lookup(ENV_JWT_SECRET) {
        config.jwt.secret = secret;
    }
}
