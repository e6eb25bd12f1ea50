//! Session types: who we are, whose turn it is, and how it ended.

use std::fmt;

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// Which side of the connection this peer is.
///
/// The two roles run the same engine. They differ only in which side of
/// the handshake they play and in who holds the first turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Connects out and speaks first.
    Initiator,

    /// Accepts the connection and waits for the first message.
    Responder,
}

impl Role {
    /// The turn this role holds right after the handshake.
    pub fn first_turn(self) -> Turn {
        match self {
            Self::Initiator => Turn::Mine,
            Self::Responder => Turn::Theirs,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initiator => write!(f, "initiator"),
            Self::Responder => write!(f, "responder"),
        }
    }
}

// ---------------------------------------------------------------------------
// Turn
// ---------------------------------------------------------------------------

/// The right to send the next frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    /// We send next.
    Mine,

    /// We wait for the peer.
    Theirs,
}

impl Turn {
    /// The other side's turn.
    pub fn flip(self) -> Self {
        match self {
            Self::Mine => Self::Theirs,
            Self::Theirs => Self::Mine,
        }
    }
}

// ---------------------------------------------------------------------------
// CloseReason
// ---------------------------------------------------------------------------

/// Why a session reached [`SessionState::Closed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// Our user quit and we sent the close frame.
    LocalClose,

    /// The peer sent a close frame.
    RemoteClose,

    /// The handshake failed, so the conversation never started.
    HandshakeFailed,

    /// The connection broke or the peer sent something unreadable.
    TransportFailure,
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LocalClose => write!(f, "closed locally"),
            Self::RemoteClose => write!(f, "closed by peer"),
            Self::HandshakeFailed => write!(f, "handshake failed"),
            Self::TransportFailure => write!(f, "transport failure"),
        }
    }
}

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// The lifecycle of one conversation.
///
/// ```text
///   AwaitingHandshake ──(handshake ok)──→ Active(Mine) ⇄ Active(Theirs)
///          │                                    │
///          └──────(failure)──→ Closed(reason) ←─┘
/// ```
///
/// `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Connected, but the handshake hasn't run yet.
    AwaitingHandshake,

    /// Handshake done; frames are flowing.
    Active(Turn),

    /// Finished, for the given reason.
    Closed(CloseReason),
}

impl SessionState {
    /// Returns `true` while frames may still be exchanged.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active(_))
    }

    /// Returns `true` once the session has ended.
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed(_))
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AwaitingHandshake => write!(f, "AwaitingHandshake"),
            Self::Active(Turn::Mine) => write!(f, "Active(Mine)"),
            Self::Active(Turn::Theirs) => write!(f, "Active(Theirs)"),
            Self::Closed(reason) => write!(f, "Closed({reason})"),
        }
    }
}
