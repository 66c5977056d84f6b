//! TCP listener with a pre-accept admission check.
//!
//! # Responsibilities
//! - Bind to the configured address
//! - Accept incoming TCP connections
//! - Ask a [`ConnectionFilter`] before building any handler
//! - Spawn one task per admitted connection
//! - Stop accepting when told to

use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;

/// Pause after a failed accept so a persistent error (e.g. EMFILE) does not spin.
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(50);

/// Error type for listener operations.
#[derive(Debug)]
pub enum ListenerError {
    /// Failed to bind to address.
    Bind(std::io::Error),
}

impl std::fmt::Display for ListenerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListenerError::Bind(e) => write!(f, "Failed to bind: {}", e),
        }
    }
}

impl std::error::Error for ListenerError {}

/// Admission predicate run on the acceptor path.
///
/// Must not block: a slow filter stalls every pending connection attempt.
pub trait ConnectionFilter: Send + 'static {
    fn accept(&self, peer: &SocketAddr) -> bool;
}

/// Per-connection work, run on its own task.
pub trait ConnectionHandler: Send + 'static {
    fn run(self) -> impl Future<Output = ()> + Send;
}

/// Builds a handler for an admitted connection.
pub trait ConnectionFactory: Send + 'static {
    type Handler: ConnectionHandler;

    fn create(&self, stream: TcpStream, peer: SocketAddr) -> Self::Handler;
}

/// A bound TCP listener.
#[derive(Debug)]
pub struct Listener {
    inner: TcpListener,
    local_addr: SocketAddr,
}

impl Listener {
    /// Bind to `addr`.
    pub async fn bind(addr: SocketAddr) -> Result<Self, ListenerError> {
        let inner = TcpListener::bind(addr).await.map_err(ListenerError::Bind)?;
        let local_addr = inner.local_addr().map_err(ListenerError::Bind)?;

        tracing::info!(address = %local_addr, "Listener bound");

        Ok(Self { inner, local_addr })
    }

    /// Get the local address this listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Run the accept loop until `stop` fires.
    ///
    /// Rejected sockets are dropped straight away, so the peer sees a closed
    /// connection with no data. The listening socket is closed when this
    /// future completes.
    pub async fn serve<Fl, Fa>(self, filter: Fl, factory: Fa, mut stop: broadcast::Receiver<()>)
    where
        Fl: ConnectionFilter,
        Fa: ConnectionFactory,
    {
        loop {
            tokio::select! {
                biased;

                _ = stop.recv() => break,

                accepted = self.inner.accept() => match accepted {
                    Ok((stream, peer)) => {
                        if !filter.accept(&peer) {
                            drop(stream);
                            continue;
                        }

                        let handler = factory.create(stream, peer);
                        tokio::spawn(handler.run());
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to accept connection");
                        tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
                    }
                },
            }
        }

        tracing::info!(address = %self.local_addr, "Listener stopped accepting");
    }
}
