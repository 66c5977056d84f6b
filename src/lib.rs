//! Single-operator admin control channel for a long-running server.

pub mod admin;
pub mod config;
pub mod lifecycle;
pub mod net;
pub mod observability;

pub use admin::AdminManager;
pub use config::ServerConfig;
pub use lifecycle::{Application, TerminationListener};
