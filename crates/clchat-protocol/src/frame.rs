//! The frame type: one logical unit of chat traffic.

use std::fmt;

/// Tag character that starts every message frame.
pub const MESSAGE_TAG: char = '0';

/// Tag character of a close frame.
pub const CLOSE_TAG: char = '1';

/// A single frame exchanged after the handshake.
///
/// On the wire a frame is exactly one line whose first character is the
/// tag. A message carries the rest of the line as its payload; a close
/// frame carries nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// A line of chat text.
    Message(String),

    /// The sender is ending the conversation.
    Close,
}

impl Frame {
    /// Convenience constructor for [`Frame::Message`].
    pub fn message(text: impl Into<String>) -> Self {
        Self::Message(text.into())
    }

    /// Returns the payload of a message frame.
    pub fn payload(&self) -> Option<&str> {
        match self {
            Self::Message(text) => Some(text),
            Self::Close => None,
        }
    }

    /// The tag this frame is sent with.
    pub fn tag(&self) -> char {
        match self {
            Self::Message(_) => MESSAGE_TAG,
            Self::Close => CLOSE_TAG,
        }
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Message(text) => write!(f, "Message({} chars)", text.chars().count()),
            Self::Close => write!(f, "Close"),
        }
    }
}
