//! Pre-accept admission check backed by the connection gate.

use std::net::SocketAddr;
use std::sync::Arc;

use crate::admin::session::SessionContext;
use crate::net::ConnectionFilter;

/// Admits a socket only if it can take the connection gate.
pub struct AdmissionFilter {
    ctx: Arc<SessionContext>,
}

impl AdmissionFilter {
    pub fn new(ctx: Arc<SessionContext>) -> Self {
        Self { ctx }
    }
}

impl ConnectionFilter for AdmissionFilter {
    fn accept(&self, peer: &SocketAddr) -> bool {
        let admitted = self.ctx.gate.try_acquire();
        if admitted {
            tracing::debug!(peer_addr = %peer, "Admin connection admitted");
        } else {
            tracing::info!(peer_addr = %peer, "Admin connection rejected: another operator is connected");
        }
        admitted
    }
}
