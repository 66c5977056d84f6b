//! Admin control channel.
//!
//! # Data Flow
//! ```text
//! accept loop
//!     → filter.rs (AdmissionFilter: try the gate, reject if held)
//!     → session.rs (AdminSession on its own task)
//!         → peer close / error → gate released
//!         → STOP              → termination latch fired
//!     → manager.rs (wait wakes, stops accepting, notifies listeners)
//! ```
//!
//! # Design Decisions
//! - At most one operator; a second one gets an immediately closed socket
//! - Reads have no timeout: an idle operator holds the slot until it disconnects
//! - Only an explicit stop directive can terminate the process

pub mod filter;
pub mod gate;
pub mod manager;
pub mod session;

pub use filter::AdmissionFilter;
pub use gate::ConnectionGate;
pub use manager::{AdminError, AdminManager};
pub use session::{AdminSession, Command, SessionContext, SessionState};
