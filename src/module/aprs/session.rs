///! APRS-IS session
///!
///! Owns the single TCP connection to the APRS-IS server. Outbound
///! packets go through [`AprsSession::send`]; a background task drains
///! and logs whatever the server pushes back. There is no auto-reconnect
///! and no read timeout: once the socket breaks, the session stays down
///! until its owner restarts it.

use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::{Mutex, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

const RECV_BUFFER_SIZE: usize = 4096;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to connect to APRS-IS at {address}:{port}: {source}")]
    Connection {
        address: String,
        port: u16,
        #[source]
        source: std::io::Error,
    },

    #[error("not connected to APRS-IS")]
    NotConnected,

    #[error("failed to send to APRS-IS: {0}")]
    Send(#[source] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connecting,
    Connected { logged_in: bool },
}

struct SessionInner {
    state: SessionState,
    writer: Option<OwnedWriteHalf>,
    recv_task: Option<JoinHandle<()>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

/// One authenticated TCP session to an APRS-IS server.
///
/// All methods take `&self`; the session is meant to be shared behind
/// an `Arc` between the poll worker (send side) and the controller
/// (stop side).
pub struct AprsSession {
    inner: Mutex<SessionInner>,
}

impl AprsSession {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(SessionInner {
                state: SessionState::Disconnected,
                writer: None,
                recv_task: None,
                shutdown_tx: None,
            }),
        }
    }

    pub async fn state(&self) -> SessionState {
        self.inner.lock().await.state
    }

    /// Open the TCP connection and spawn the receive task.
    pub async fn connect(&self, address: &str, port: u16) -> Result<(), SessionError> {
        let mut inner = self.inner.lock().await;
        inner.state = SessionState::Connecting;

        info!("Connecting to APRS-IS server at {}:{}", address, port);
        let stream = match TcpStream::connect((address, port)).await {
            Ok(stream) => stream,
            Err(e) => {
                inner.state = SessionState::Disconnected;
                return Err(SessionError::Connection {
                    address: address.to_string(),
                    port,
                    source: e,
                });
            }
        };

        let (read_half, write_half) = stream.into_split();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        inner.writer = Some(write_half);
        inner.recv_task = Some(tokio::spawn(recv_loop(read_half, shutdown_rx)));
        inner.shutdown_tx = Some(shutdown_tx);
        inner.state = SessionState::Connected { logged_in: false };

        info!("Connected to APRS-IS server");
        Ok(())
    }

    /// Send the plaintext login line. Fire-and-forget: the server's
    /// acknowledgment is not read or validated, so a wrong passcode
    /// only shows up in the received-traffic log.
    pub async fn login(
        &self,
        callsign: &str,
        password: &str,
        filter: &str,
    ) -> Result<(), SessionError> {
        let line = format!(
            "USER {} PASS {} VERS 1.0 filter {}\r\n",
            callsign, password, filter
        );
        info!("Logging in to APRS-IS as {}", callsign);
        self.send(&line).await?;

        let mut inner = self.inner.lock().await;
        if let SessionState::Connected { logged_in } = &mut inner.state {
            *logged_in = true;
        }
        Ok(())
    }

    /// Write one line to the socket. An empty line is a no-op. A write
    /// failure leaves the session disconnected; it is not retried here.
    pub async fn send(&self, line: &str) -> Result<(), SessionError> {
        if line.is_empty() {
            return Ok(());
        }

        debug!("Sending to APRS-IS: {}", line.trim_end());

        let mut inner = self.inner.lock().await;
        let writer = inner.writer.as_mut().ok_or(SessionError::NotConnected)?;

        let mut result = writer.write_all(line.as_bytes()).await;
        if result.is_ok() {
            result = writer.flush().await;
        }

        if let Err(e) = result {
            inner.writer = None;
            inner.state = SessionState::Disconnected;
            return Err(SessionError::Send(e));
        }
        Ok(())
    }

    /// Close the socket and reap the receive task. Idempotent; safe to
    /// call in any state.
    pub async fn stop(&self) {
        let mut inner = self.inner.lock().await;
        inner.state = SessionState::Disconnected;

        if let Some(shutdown_tx) = inner.shutdown_tx.take() {
            let _ = shutdown_tx.send(());
        }
        if let Some(mut writer) = inner.writer.take() {
            let _ = writer.shutdown().await;
        }
        if let Some(recv_task) = inner.recv_task.take() {
            info!("Stopping APRS-IS connection");
            let _ = recv_task.await;
        }
    }
}

impl Default for AprsSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Passive receive path: log whatever the server sends until the
/// connection ends or shutdown is signalled. Inbound traffic is not
/// parsed, only surfaced for the operator.
async fn recv_loop(mut read_half: OwnedReadHalf, mut shutdown_rx: oneshot::Receiver<()>) {
    let mut buf = vec![0u8; RECV_BUFFER_SIZE];
    loop {
        tokio::select! {
            _ = &mut shutdown_rx => {
                debug!("APRS-IS receive task shutting down");
                break;
            }
            read = read_half.read(&mut buf) => match read {
                Ok(0) => {
                    warn!("APRS-IS server closed the connection");
                    break;
                }
                Ok(n) => {
                    let text = String::from_utf8_lossy(&buf[..n]);
                    info!("APRS-IS data received: {}", text.trim());
                }
                Err(e) => {
                    warn!("APRS-IS receive failed: {}", e);
                    break;
                }
            }
        }
    }
}
