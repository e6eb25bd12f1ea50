//! Unified error type for CLChat.

use clchat_session::SessionError;
use clchat_transport::TransportError;

/// A port or other setting that can't be used.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The port isn't an integer at all.
    #[error("illegal port number {0:?}: not a number")]
    NotANumber(String),

    /// The port is outside 1076..=65534.
    #[error("illegal port number {0}: must be between 1076 and 65534")]
    OutOfRange(i64),
}

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum ClChatError {
    /// Bad configuration, caught before any socket is opened.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Binding, accepting, or connecting failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The handshake or the conversation failed.
    #[error(transparent)]
    Session(#[from] SessionError),
}
