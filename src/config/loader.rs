//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ServerConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot parse JSON config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cannot parse TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a JSON or TOML file.
///
/// Files ending in `.toml` are parsed as TOML, everything else as JSON.
pub fn load_config(path: &Path) -> Result<ServerConfig, ConfigError> {
    let content = fs::read_to_string(path)?;

    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    let config: ServerConfig = if is_toml {
        toml::from_str(&content)?
    } else {
        serde_json::from_str(&content)?
    };

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}
