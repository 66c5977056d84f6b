//! Shared utilities for admin channel integration tests.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use admin_gate::admin::session::UNKNOWN_COMMAND_REPLY;
use admin_gate::lifecycle::{TerminationError, TerminationListener};
use admin_gate::AdminManager;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

pub const IO_TIMEOUT: Duration = Duration::from_secs(2);

/// Start a manager on an ephemeral loopback port.
pub async fn start_manager() -> (AdminManager, SocketAddr) {
    let mut manager = AdminManager::with_addr("127.0.0.1:0".parse().unwrap());
    let addr = manager.start().await.unwrap();
    (manager, addr)
}

/// Send `message` and read back exactly one unknown-command reply.
pub async fn expect_unknown(stream: &mut TcpStream, message: &[u8]) {
    stream.write_all(message).await.unwrap();
    let mut reply = [0u8; UNKNOWN_COMMAND_REPLY.len()];
    tokio::time::timeout(IO_TIMEOUT, stream.read_exact(&mut reply))
        .await
        .expect("no reply")
        .unwrap();
    assert_eq!(&reply[..], UNKNOWN_COMMAND_REPLY);
}

/// Try a single connection; returns it only if a session answered.
pub async fn try_admitted(addr: SocketAddr) -> Option<TcpStream> {
    let mut stream = TcpStream::connect(addr).await.ok()?;
    stream.write_all(b"PING").await.ok()?;

    let mut reply = [0u8; UNKNOWN_COMMAND_REPLY.len()];
    let answered = tokio::time::timeout(Duration::from_millis(500), stream.read_exact(&mut reply)).await;
    match answered {
        Ok(Ok(_)) if reply[..] == *UNKNOWN_COMMAND_REPLY => Some(stream),
        _ => None,
    }
}

/// Connect until a session is admitted; the gate may take a moment to free up.
pub async fn connect_admitted(addr: SocketAddr) -> TcpStream {
    for _ in 0..50 {
        if let Some(stream) = try_admitted(addr).await {
            return stream;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("admin connection never admitted");
}

/// Read until EOF; a reset also counts as closed. Returns the bytes seen.
pub async fn read_until_closed(stream: &mut TcpStream) -> Vec<u8> {
    let mut buf = Vec::new();
    let _ = tokio::time::timeout(IO_TIMEOUT, stream.read_to_end(&mut buf))
        .await
        .expect("connection was not closed");
    buf
}

/// Listener that appends its id to a shared log.
pub struct Recorder {
    pub id: usize,
    pub log: Arc<Mutex<Vec<usize>>>,
    pub fail: bool,
}

impl TerminationListener for Recorder {
    fn on_terminate(&self) -> Result<(), TerminationError> {
        self.log.lock().unwrap().push(self.id);
        if self.fail {
            Err(TerminationError::new(format!("recorder-{}", self.id), "refused to stop"))
        } else {
            Ok(())
        }
    }
}
