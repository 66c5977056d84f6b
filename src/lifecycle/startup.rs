//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration
//! - Initialize logging before anything else logs
//! - Build the admin manager and hand control to it
//!
//! # Design Decisions
//! - Fail fast: any startup error is returned once to the caller
//! - The application is an owned value, not a process-wide singleton

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;

use crate::admin::{AdminError, AdminManager};
use crate::config::{load_config, ConfigError, ServerConfig};
use crate::lifecycle::{TerminationController, TerminationListener};
use crate::observability::{init_logging, LoggingError};

/// Anything that stops the process from starting or shutting down cleanly.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Logging(#[from] LoggingError),

    #[error(transparent)]
    Admin(#[from] AdminError),
}

/// The composed server process.
pub struct Application {
    config: ServerConfig,
    admin: AdminManager,
}

impl Application {
    /// Load the config at `path`, set up logging, and build the application.
    pub fn from_config_file(path: &Path) -> Result<Self, AppError> {
        let config = load_config(path)?;
        init_logging(config.log_path.as_deref())?;
        Self::new(config)
    }

    pub fn new(config: ServerConfig) -> Result<Self, AppError> {
        let admin = AdminManager::new(&config)?;
        Ok(Self { config, admin })
    }

    /// Run until an operator stops the server.
    pub async fn run(mut self) -> Result<(), AppError> {
        tracing::info!(
            game_port = self.config.game_port,
            admin_port = self.config.admin_port,
            max_player_connections = self.config.max_player_connections,
            "Configuration loaded"
        );

        self.admin.start().await?;
        self.admin.wait().await?;
        Ok(())
    }
}

impl TerminationController for Application {
    fn add_termination_listener(&mut self, listener: Arc<dyn TerminationListener>) {
        self.admin.add_termination_listener(listener);
    }
}
