//! Transport abstraction layer for CLChat.
//!
//! Provides the [`Connection`] trait: an ordered, reliable stream of
//! newline-delimited text lines in both directions. The protocol layer
//! above never sees bytes or sockets, only whole lines.
//!
//! # Feature Flags
//!
//! - `tcp` (default): TCP transport via `tokio::net`
//!
//! [`MemoryConnection`] is always available and is what the upper
//! layers use in their tests.

#![allow(async_fn_in_trait)]

mod error;
mod memory;
#[cfg(feature = "tcp")]
mod tcp;

pub use error::TransportError;
pub use memory::MemoryConnection;
#[cfg(feature = "tcp")]
pub use tcp::{TcpLineConnection, TcpLineListener};

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counter for generating unique connection IDs.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Allocates the next process-unique id.
    pub(crate) fn next() -> Self {
        Self(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// A single connection that carries text one line at a time.
///
/// Lines are passed without their terminator: `send_line("abc")` puts
/// `abc\n` on the wire and the peer's `recv_line()` yields `"abc"`.
pub trait Connection: Send + Sync + 'static {
    /// Writes one line and flushes it.
    ///
    /// Fails with [`TransportError::EmbeddedNewline`] if `line` contains
    /// a line break, since that would split it into two lines on the
    /// peer's side.
    async fn send_line(&self, line: &str) -> Result<(), TransportError>;

    /// Receives the next line from the remote peer.
    ///
    /// Returns `Ok(None)` when the peer has closed its side.
    async fn recv_line(&self) -> Result<Option<String>, TransportError>;

    /// Closes the connection. Closing an already closed connection is a
    /// no-op.
    async fn close(&self) -> Result<(), TransportError>;

    /// Returns `true` once [`close`](Self::close) has been called.
    fn is_closed(&self) -> bool;

    /// Returns the unique identifier for this connection.
    fn id(&self) -> ConnectionId;
}

/// Rejects text that would not survive as a single line.
pub(crate) fn ensure_single_line(line: &str) -> Result<(), TransportError> {
    if line.contains(['\n', '\r']) {
        return Err(TransportError::EmbeddedNewline);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_id_new_and_into_inner() {
        let id = ConnectionId::new(42);
        assert_eq!(id.into_inner(), 42);
    }

    #[test]
    fn test_connection_id_display() {
        let id = ConnectionId::new(7);
        assert_eq!(id.to_string(), "conn-7");
    }

    #[test]
    fn test_next_ids_are_unique() {
        let a = ConnectionId::next();
        let b = ConnectionId::next();
        assert_ne!(a, b);
        assert!(b.into_inner() > a.into_inner());
    }

    #[test]
    fn test_ensure_single_line() {
        assert!(ensure_single_line("0hello world").is_ok());
        assert!(ensure_single_line("").is_ok());
        assert!(matches!(
            ensure_single_line("two\nlines"),
            Err(TransportError::EmbeddedNewline)
        ));
        assert!(matches!(
            ensure_single_line("carriage\r"),
            Err(TransportError::EmbeddedNewline)
        ));
    }
}
