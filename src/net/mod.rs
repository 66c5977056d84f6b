//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (accept loop)
//!     → ConnectionFilter (admission, non-blocking)
//!     → ConnectionFactory builds a handler
//!     → handler runs on its own task
//! ```
//!
//! # Design Decisions
//! - Rejected sockets are closed before any handler exists
//! - The accept loop stops on a broadcast signal and drops the socket

pub mod listener;

pub use listener::{ConnectionFactory, ConnectionFilter, ConnectionHandler, Listener, ListenerError};
