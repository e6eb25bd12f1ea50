//! Error types for the protocol layer.
//!
//! Decoding and handshake failures get their own enums so the session
//! layer can tell a malformed line apart from a peer that isn't a CLChat
//! peer at all.

use clchat_transport::TransportError;

/// A line from the peer that isn't a valid frame.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    /// The line had no characters, so there is no tag to read.
    #[error("empty frame")]
    Empty,

    /// The first character is neither the message nor the close tag.
    #[error("unknown frame tag {0:?}")]
    UnknownTag(char),
}

/// Errors from the handshake exchange.
#[derive(Debug, thiserror::Error)]
pub enum HandshakeError {
    /// The peer sent something other than the handshake token, or
    /// nothing at all (`received` is `None` when the stream ended).
    #[error("peer is not a CLChat peer (received {received:?})")]
    Mismatch { received: Option<String> },

    /// The connection failed while exchanging tokens.
    #[error(transparent)]
    Transport(#[from] TransportError),
}
