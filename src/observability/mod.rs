//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events (info/warn/error/debug with structured fields)
//!
//! Consumers:
//!     → logging.rs subscriber (stdout or the configured log file)
//! ```
//!
//! # Design Decisions
//! - Logging never blocks or fails the caller after initialization
//! - Peer addresses flow through admin events as structured fields

pub mod logging;

pub use logging::{init_logging, LoggingError};
