//! In-process transport: two connected endpoints backed by channels.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::Mutex;

use crate::{ensure_single_line, Connection, ConnectionId, TransportError};

/// One end of an in-memory connection created by [`MemoryConnection::pair`].
///
/// Behaves like a TCP connection as far as [`Connection`] is concerned:
/// lines arrive in order, and closing one end makes the other end's
/// `recv_line` return `Ok(None)`.
pub struct MemoryConnection {
    id: ConnectionId,
    tx: Mutex<Option<UnboundedSender<String>>>,
    rx: Mutex<UnboundedReceiver<String>>,
    closed: AtomicBool,
}

impl MemoryConnection {
    /// Creates two endpoints wired to each other.
    pub fn pair() -> (Self, Self) {
        let (a_tx, b_rx) = mpsc::unbounded_channel();
        let (b_tx, a_rx) = mpsc::unbounded_channel();
        (Self::new(a_tx, a_rx), Self::new(b_tx, b_rx))
    }

    fn new(tx: UnboundedSender<String>, rx: UnboundedReceiver<String>) -> Self {
        Self {
            id: ConnectionId::next(),
            tx: Mutex::new(Some(tx)),
            rx: Mutex::new(rx),
            closed: AtomicBool::new(false),
        }
    }

    fn ensure_open(&self) -> Result<(), TransportError> {
        if self.is_closed() {
            return Err(TransportError::ConnectionClosed(self.id.to_string()));
        }
        Ok(())
    }
}

impl Connection for MemoryConnection {
    async fn send_line(&self, line: &str) -> Result<(), TransportError> {
        self.ensure_open()?;
        ensure_single_line(line)?;

        let tx = self.tx.lock().await;
        let Some(tx) = tx.as_ref() else {
            return Err(TransportError::ConnectionClosed(self.id.to_string()));
        };
        tx.send(line.to_string()).map_err(|_| {
            TransportError::SendFailed(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "peer closed the connection",
            ))
        })
    }

    async fn recv_line(&self) -> Result<Option<String>, TransportError> {
        self.ensure_open()?;
        Ok(self.rx.lock().await.recv().await)
    }

    async fn close(&self) -> Result<(), TransportError> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        tracing::debug!(id = %self.id, "closing in-memory connection");
        self.tx.lock().await.take();
        self.rx.lock().await.close();
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}
