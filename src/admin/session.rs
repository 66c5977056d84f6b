//! Per-connection admin protocol.
//!
//! # Protocol
//! ```text
//! client → "STOP" (surrounding whitespace ignored) → no reply, connection closed,
//!                                                    termination latch fired
//! client → anything else                           → "Unknown command\n", stays open
//! peer close / transport error                     → connection closed, gate released
//! ```
//!
//! Only a well-formed stop directive can end the process; every transport
//! failure releases the gate so another operator can connect.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::admin::gate::ConnectionGate;
use crate::lifecycle::TerminationLatch;
use crate::net::{ConnectionFactory, ConnectionHandler};

/// Largest message read in one go; longer input is split across reads.
pub const RECEIVE_BUFFER_SIZE: usize = 1024;

/// The shutdown directive.
pub const STOP_COMMAND: &str = "STOP";

/// Reply to anything that is not a known command.
pub const UNKNOWN_COMMAND_REPLY: &[u8] = b"Unknown command\n";

/// Coordination state shared by every admin session.
#[derive(Debug, Default)]
pub struct SessionContext {
    pub gate: ConnectionGate,
    pub latch: TerminationLatch,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }
}

/// An interpreted admin message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Stop,
    Unknown,
}

/// Interpret one received chunk. Case-sensitive; non-UTF-8 input is never a command.
pub fn parse_command(bytes: &[u8]) -> Command {
    if strip(bytes) == STOP_COMMAND.as_bytes() {
        Command::Stop
    } else {
        Command::Unknown
    }
}

// C-locale whitespace, including vertical tab and form feed.
fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c)
}

fn strip(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|&b| !is_space(b)).unwrap_or(bytes.len());
    let end = bytes.iter().rposition(|&b| !is_space(b)).map_or(start, |i| i + 1);
    &bytes[start..end]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Open,
    Closed,
}

/// Handler for the single admitted admin connection.
///
/// Dropping the session ends it: the gate is released, or, if the peer
/// asked to stop, the termination latch is fired instead and the gate stays
/// held so no new operator can race the shutdown.
pub struct AdminSession {
    stream: TcpStream,
    peer: SocketAddr,
    ctx: Arc<SessionContext>,
    buffer: [u8; RECEIVE_BUFFER_SIZE],
    state: SessionState,
    shutdown_requested: bool,
}

impl AdminSession {
    pub fn new(stream: TcpStream, peer: SocketAddr, ctx: Arc<SessionContext>) -> Self {
        tracing::info!(peer_addr = %peer, "Admin connection open");
        Self {
            stream,
            peer,
            ctx,
            buffer: [0; RECEIVE_BUFFER_SIZE],
            state: SessionState::Open,
            shutdown_requested: false,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn shutdown_requested(&self) -> bool {
        self.shutdown_requested
    }

    /// Serve commands until the peer leaves, errors out, or sends the stop directive.
    pub async fn serve(&mut self) {
        tracing::info!(peer_addr = %self.peer, "New admin connection");

        while self.state == SessionState::Open {
            if let Err(e) = self.step().await {
                if e.kind() == io::ErrorKind::ConnectionReset {
                    tracing::warn!(peer_addr = %self.peer, "Admin connection was reset");
                } else {
                    tracing::error!(peer_addr = %self.peer, error = %e, "Admin connection closed due to error");
                }
                self.state = SessionState::Closed;
            }
        }
    }

    async fn step(&mut self) -> io::Result<()> {
        let received = self.stream.read(&mut self.buffer).await?;
        if received == 0 {
            tracing::debug!(peer_addr = %self.peer, "Admin peer disconnected");
            self.state = SessionState::Closed;
            return Ok(());
        }

        match parse_command(&self.buffer[..received]) {
            Command::Stop => {
                tracing::info!(peer_addr = %self.peer, "Stop command received");
                self.shutdown_requested = true;
                self.state = SessionState::Closed;
            }
            Command::Unknown => self.reply(UNKNOWN_COMMAND_REPLY).await?,
        }
        Ok(())
    }

    /// Best-effort write: a short write is logged, not retried.
    async fn reply(&mut self, answer: &[u8]) -> io::Result<()> {
        let sent = self.stream.write(answer).await?;
        if sent < answer.len() {
            tracing::error!(
                peer_addr = %self.peer,
                bytes = answer.len(),
                sent,
                "Short write on admin reply"
            );
        }
        Ok(())
    }
}

impl ConnectionHandler for AdminSession {
    async fn run(mut self) {
        self.serve().await;
    }
}

impl Drop for AdminSession {
    fn drop(&mut self) {
        tracing::info!(peer_addr = %self.peer, "Admin connection closed");
        if self.shutdown_requested {
            self.ctx.latch.signal();
        } else {
            self.ctx.gate.release();
        }
    }
}

/// Builds an [`AdminSession`] for each admitted connection.
pub struct SessionFactory {
    ctx: Arc<SessionContext>,
}

impl SessionFactory {
    pub fn new(ctx: Arc<SessionContext>) -> Self {
        Self { ctx }
    }
}

impl ConnectionFactory for SessionFactory {
    type Handler = AdminSession;

    fn create(&self, stream: TcpStream, peer: SocketAddr) -> AdminSession {
        AdminSession::new(stream, peer, Arc::clone(&self.ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    #[test]
    fn stop_is_trimmed_and_case_sensitive() {
        assert_eq!(parse_command(b"STOP"), Command::Stop);
        assert_eq!(parse_command(b"  STOP\n"), Command::Stop);
        assert_eq!(parse_command(b"\t\x0bSTOP\r\n\x0c"), Command::Stop);

        assert_eq!(parse_command(b"stop"), Command::Unknown);
        assert_eq!(parse_command(b"ST OP"), Command::Unknown);
        assert_eq!(parse_command(b"STOPPED"), Command::Unknown);
        assert_eq!(parse_command(b""), Command::Unknown);
        assert_eq!(parse_command(b" \n "), Command::Unknown);
        assert_eq!(parse_command(&[0xff, 0x00, 0xfe]), Command::Unknown);
    }

    /// Spawn a session over a real loopback socket; returns the client end.
    async fn open_session(ctx: &Arc<SessionContext>) -> (TcpStream, JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let client = TcpStream::connect(listener.local_addr().unwrap()).await.unwrap();
        let (stream, peer) = listener.accept().await.unwrap();

        assert!(ctx.gate.try_acquire());
        let session = AdminSession::new(stream, peer, Arc::clone(ctx));
        (client, tokio::spawn(session.run()))
    }

    async fn finish(task: JoinHandle<()>) {
        tokio::time::timeout(Duration::from_secs(2), task)
            .await
            .expect("session did not finish")
            .unwrap();
    }

    #[tokio::test]
    async fn unknown_command_gets_reply_and_stays_open() {
        let ctx = Arc::new(SessionContext::new());
        let (mut client, task) = open_session(&ctx).await;

        for message in [&b"HELP\n"[..], b"stop", b"\x00\x01\x02"] {
            client.write_all(message).await.unwrap();
            let mut reply = [0u8; UNKNOWN_COMMAND_REPLY.len()];
            client.read_exact(&mut reply).await.unwrap();
            assert_eq!(&reply[..], UNKNOWN_COMMAND_REPLY);
        }

        assert!(!task.is_finished());
        drop(client);
        finish(task).await;

        assert!(!ctx.gate.is_held());
        assert!(!ctx.latch.is_signaled());
    }

    #[tokio::test]
    async fn stop_fires_latch_and_keeps_gate() {
        let ctx = Arc::new(SessionContext::new());
        let (mut client, task) = open_session(&ctx).await;

        client.write_all(b"  STOP\n").await.unwrap();
        finish(task).await;

        let mut rest = Vec::new();
        client.read_to_end(&mut rest).await.unwrap();
        assert!(rest.is_empty());

        assert!(ctx.latch.is_signaled());
        assert!(ctx.gate.is_held());
    }

    #[tokio::test]
    async fn full_buffer_message_is_processed() {
        let ctx = Arc::new(SessionContext::new());
        let (mut client, task) = open_session(&ctx).await;

        let mut message = vec![b' '; RECEIVE_BUFFER_SIZE];
        message[..4].copy_from_slice(b"STOP");
        client.write_all(&message).await.unwrap();
        finish(task).await;

        assert!(ctx.latch.is_signaled());
    }

    #[tokio::test]
    async fn stop_closes_session_before_drop_signals() {
        let ctx = Arc::new(SessionContext::new());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let mut client = TcpStream::connect(listener.local_addr().unwrap()).await.unwrap();
        let (stream, peer) = listener.accept().await.unwrap();

        assert!(ctx.gate.try_acquire());
        let mut session = AdminSession::new(stream, peer, Arc::clone(&ctx));
        assert_eq!(session.state(), SessionState::Open);
        assert!(!session.shutdown_requested());

        client.write_all(b"STOP\r\n").await.unwrap();
        tokio::time::timeout(Duration::from_secs(2), session.serve())
            .await
            .expect("session did not finish");

        assert_eq!(session.state(), SessionState::Closed);
        assert!(session.shutdown_requested());
        // Nothing fires until the session is dropped.
        assert!(!ctx.latch.is_signaled());

        drop(session);
        assert!(ctx.latch.is_signaled());
        assert!(ctx.gate.is_held());
    }
}
