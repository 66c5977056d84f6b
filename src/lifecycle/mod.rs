//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Init logging → Build admin manager → Start listener
//!
//! Termination (termination.rs):
//!     STOP on admin session → latch fired → main task wakes
//!
//! Shutdown (shutdown.rs):
//!     Stop accepting → Notify termination listeners → Exit
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then logging, then listeners
//! - Ordered shutdown: stop accept before any listener runs
//! - No shutdown deadline: listeners run to completion

pub mod shutdown;
pub mod startup;
pub mod termination;

pub use shutdown::Shutdown;
pub use startup::{AppError, Application};
pub use termination::{TerminationController, TerminationError, TerminationLatch, TerminationListener};
