//! Admin control-plane orchestration.
//!
//! # Lifecycle
//! ```text
//! new → add_termination_listener* → start (bind, spawn accept loop)
//!     → wait: park on latch → stop accepting → notify listeners in order → clear
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::task::JoinHandle;

use crate::admin::filter::AdmissionFilter;
use crate::admin::session::{SessionContext, SessionFactory};
use crate::config::ServerConfig;
use crate::lifecycle::{Shutdown, TerminationController, TerminationError, TerminationListener};
use crate::net::{Listener, ListenerError};

/// Errors surfaced by [`AdminManager`].
#[derive(Debug, Error)]
pub enum AdminError {
    #[error("admin_host is not an IP address: {0:?}")]
    InvalidAddress(String),

    #[error("admin listener: {0}")]
    Listener(#[from] ListenerError),

    #[error("admin manager already started")]
    AlreadyStarted,

    #[error("admin manager was not started")]
    NotStarted,

    #[error(transparent)]
    Termination(#[from] TerminationError),
}

/// Owns the admin listening endpoint and the termination handshake.
pub struct AdminManager {
    addr: SocketAddr,
    ctx: Arc<SessionContext>,
    shutdown: Shutdown,
    listeners: Vec<Arc<dyn TerminationListener>>,
    acceptor: Option<JoinHandle<()>>,
    local_addr: Option<SocketAddr>,
}

impl AdminManager {
    /// Create a manager for the admin endpoint described by `config`.
    pub fn new(config: &ServerConfig) -> Result<Self, AdminError> {
        let addr = config
            .admin_addr()
            .ok_or_else(|| AdminError::InvalidAddress(config.admin_host.clone()))?;
        Ok(Self::with_addr(addr))
    }

    /// Create a manager that will listen on `addr`.
    pub fn with_addr(addr: SocketAddr) -> Self {
        Self {
            addr,
            ctx: Arc::new(SessionContext::new()),
            shutdown: Shutdown::new(),
            listeners: Vec::new(),
            acceptor: None,
            local_addr: None,
        }
    }

    /// Address actually bound, once started.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// Bind and begin accepting. Returns as soon as the listener is up.
    pub async fn start(&mut self) -> Result<SocketAddr, AdminError> {
        if self.local_addr.is_some() {
            return Err(AdminError::AlreadyStarted);
        }

        let listener = Listener::bind(self.addr).await?;
        let local_addr = listener.local_addr();
        tracing::info!(address = %local_addr, "Admin server is listening for connections");

        let filter = AdmissionFilter::new(Arc::clone(&self.ctx));
        let factory = SessionFactory::new(Arc::clone(&self.ctx));
        let stop = self.shutdown.subscribe();
        self.acceptor = Some(tokio::spawn(listener.serve(filter, factory, stop)));
        self.local_addr = Some(local_addr);

        tracing::info!("Admin server started");
        Ok(local_addr)
    }

    /// Park until an operator sends the stop directive, then shut down.
    ///
    /// The accept loop is fully stopped before any listener runs. Listeners
    /// are called in registration order; the first failure is returned and
    /// the rest are skipped. The registry is empty afterwards either way.
    pub async fn wait(&mut self) -> Result<(), AdminError> {
        let acceptor = self.acceptor.take().ok_or(AdminError::NotStarted)?;

        tracing::info!("Admin server is waiting");
        self.ctx.latch.wait().await;

        self.shutdown.trigger();
        if let Err(e) = acceptor.await {
            tracing::error!(error = %e, "Admin accept loop ended abnormally");
        }

        let listeners = std::mem::take(&mut self.listeners);
        tracing::info!(count = listeners.len(), "Notifying termination listeners");
        for listener in listeners {
            listener.on_terminate()?;
        }

        tracing::info!("Admin server stopped");
        Ok(())
    }
}

impl TerminationController for AdminManager {
    /// Register before [`start`](AdminManager::start); listeners added after
    /// shutdown has begun are never called.
    fn add_termination_listener(&mut self, listener: Arc<dyn TerminationListener>) {
        self.listeners.push(listener);
    }
}

impl Drop for AdminManager {
    fn drop(&mut self) {
        if self.acceptor.take().is_some() {
            self.shutdown.trigger();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;
    use tokio::net::TcpStream;

    struct Flag(Arc<AtomicBool>);

    impl TerminationListener for Flag {
        fn on_terminate(&self) -> Result<(), TerminationError> {
            self.0.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    fn loopback() -> SocketAddr {
        "127.0.0.1:0".parse().unwrap()
    }

    #[test]
    fn rejects_hostname_admin_host() {
        let config = ServerConfig {
            admin_host: "admin.internal".into(),
            ..ServerConfig::default()
        };
        assert!(matches!(
            AdminManager::new(&config),
            Err(AdminError::InvalidAddress(_))
        ));
    }

    #[tokio::test]
    async fn wait_before_start_fails() {
        let mut manager = AdminManager::with_addr(loopback());
        assert!(matches!(manager.wait().await, Err(AdminError::NotStarted)));
    }

    #[tokio::test]
    async fn start_twice_fails() {
        let mut manager = AdminManager::with_addr(loopback());
        let addr = manager.start().await.unwrap();
        assert_ne!(addr.port(), 0);
        assert_eq!(manager.local_addr(), Some(addr));
        assert!(matches!(manager.start().await, Err(AdminError::AlreadyStarted)));
    }

    #[tokio::test]
    async fn dropping_started_manager_stops_accepting_silently() {
        let mut manager = AdminManager::with_addr(loopback());
        let notified = Arc::new(AtomicBool::new(false));
        manager.add_termination_listener(Arc::new(Flag(Arc::clone(&notified))));
        let addr = manager.start().await.unwrap();

        drop(manager);

        let mut closed = false;
        for _ in 0..50 {
            if TcpStream::connect(addr).await.is_err() {
                closed = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(closed, "accept loop still running after drop");
        assert!(!notified.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn bind_conflict_is_reported() {
        let mut first = AdminManager::with_addr(loopback());
        let addr = first.start().await.unwrap();

        let mut second = AdminManager::with_addr(addr);
        assert!(matches!(second.start().await, Err(AdminError::Listener(_))));
    }
}
