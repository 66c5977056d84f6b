//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (connection limits, ports, addresses)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::IpAddr;

use thiserror::Error;

use crate::config::schema::ServerConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("max_player_connections must be greater than zero")]
    NoPlayerConnections,

    #[error("admin_port and game_port must differ (both are {0})")]
    PortConflict(u16),

    #[error("admin_host is not an IP address: {0:?}")]
    InvalidAdminHost(String),

    #[error("log_path must not be empty")]
    EmptyLogPath,
}

/// Validate a parsed configuration, collecting every problem.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.max_player_connections == 0 {
        errors.push(ValidationError::NoPlayerConnections);
    }

    // Port 0 asks the OS for an ephemeral port, so two zeros never collide.
    if config.admin_port != 0 && config.admin_port == config.game_port {
        errors.push(ValidationError::PortConflict(config.admin_port));
    }

    if config.admin_host.parse::<IpAddr>().is_err() {
        errors.push(ValidationError::InvalidAdminHost(config.admin_host.clone()));
    }

    if let Some(path) = &config.log_path {
        if path.as_os_str().is_empty() {
            errors.push(ValidationError::EmptyLogPath);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
