//! Structured logging.
//!
//! # Responsibilities
//! - Initialize logging subsystem
//! - Route output to a log file or stdout
//! - Configure log level at runtime
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - Log level configurable via `RUST_LOG`, defaults to `admin_gate=info`
//! - File output disables ANSI colors

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "admin_gate=info";

/// Error type for logging initialization.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("cannot open log file {path:?}: {source}")]
    OpenLogFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("global subscriber already installed: {0}")]
    Install(#[from] tracing_subscriber::util::TryInitError),
}

/// Install the global tracing subscriber.
///
/// When `log_path` is set the file is created (or truncated) and every
/// event is appended to it; otherwise events go to stdout.
pub fn init_logging(log_path: Option<&Path>) -> Result<(), LoggingError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());

    match log_path {
        Some(path) => {
            let file = File::create(path).map_err(|source| LoggingError::OpenLogFile {
                path: path.to_path_buf(),
                source,
            })?;

            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .try_init()?;
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .try_init()?;
        }
    }

    Ok(())
}
