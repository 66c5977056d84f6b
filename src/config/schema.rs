//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration for the server process.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ServerConfig {
    /// Port reserved for the player-facing subsystem.
    pub game_port: u16,

    /// Port the admin control channel listens on (0 = ephemeral).
    pub admin_port: u16,

    /// Upper bound on concurrent player connections.
    pub max_player_connections: u16,

    /// Optional log file; stdout is used when absent.
    #[serde(default)]
    pub log_path: Option<PathBuf>,

    /// Interface the admin listener binds to.
    #[serde(default = "default_admin_host")]
    pub admin_host: String,
}

fn default_admin_host() -> String {
    "0.0.0.0".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            game_port: 7000,
            admin_port: 7001,
            max_player_connections: 64,
            log_path: None,
            admin_host: default_admin_host(),
        }
    }
}

impl ServerConfig {
    /// Address of the admin listener.
    ///
    /// Returns `None` when `admin_host` is not an IP address; validated configs
    /// always yield an address.
    pub fn admin_addr(&self) -> Option<SocketAddr> {
        self.admin_host
            .parse::<IpAddr>()
            .ok()
            .map(|ip| SocketAddr::new(ip, self.admin_port))
    }
}
