//! Configuration loading from disk and environment.

use std::fs;
use std::net::SocketAddr;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::BreakerConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration from a TOML file. Does not validate.
pub fn load_config(path: &Path) -> Result<BreakerConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    from_str(&content)
}

/// Parse configuration from TOML text. Does not validate.
pub fn from_str(content: &str) -> Result<BreakerConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Apply environment overrides, then validate.
///
/// The variable named by `listener.port_env` replaces the bind port when set.
pub fn finalize(mut config: BreakerConfig) -> Result<BreakerConfig, ConfigError> {
    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Apply overrides from an environment lookup.
pub fn apply_env_overrides<F>(config: &mut BreakerConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(port) = lookup(&config.listener.port_env) else {
        return Ok(());
    };
    let port: u16 = port.trim().parse().map_err(|_| {
        ConfigError::Validation(vec![ValidationError {
            field: "listener.port_env",
            message: format!("{} is not a valid port: '{}'", config.listener.port_env, port),
        }])
    })?;

    let mut addr: SocketAddr = config.listener.bind_address.parse().map_err(|_| {
        ConfigError::Validation(vec![ValidationError {
            field: "listener.bind_address",
            message: format!("'{}' is not a socket address", config.listener.bind_address),
        }])
    })?;
    addr.set_port(port);
    config.listener.bind_address = addr.to_string();
    Ok(())
}
