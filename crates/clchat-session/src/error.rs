//! Error types for the session layer.

use clchat_protocol::{FrameError, HandshakeError};
use clchat_transport::TransportError;

use crate::SessionState;

/// Errors that can occur while running a conversation.
///
/// The first group ends the session: the engine is already `Closed` by
/// the time the caller sees them. `NotYourTurn`, `MultiLineMessage` and
/// `NotActive` are caller mistakes and leave the state untouched.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The peer failed the handshake, or it broke off midway.
    #[error("handshake failed: {0}")]
    Handshake(#[from] HandshakeError),

    /// The peer sent a line that isn't a frame.
    #[error("malformed frame: {0}")]
    Frame(#[from] FrameError),

    /// Sending or receiving failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The peer hung up without sending a close frame.
    #[error("connection lost: peer hung up without closing")]
    UnexpectedEof,

    /// Reading the user's next line failed.
    #[error("console input failed: {0}")]
    Console(#[source] std::io::Error),

    /// `send` was called while waiting for the peer, or `receive` while
    /// it was our turn to speak.
    #[error("not this side's turn")]
    NotYourTurn,

    /// A message to send contained a line break, which would split it
    /// into two frames on the wire.
    #[error("message must be a single line")]
    MultiLineMessage,

    /// The session is not in the `Active` state.
    #[error("session is not active ({0})")]
    NotActive(SessionState),
}
