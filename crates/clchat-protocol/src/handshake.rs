//! Handshake: proving both ends speak CLChat.
//!
//! The first line on every connection is the handshake token. The
//! responder sends it as soon as the connection is accepted; the
//! initiator checks it and echoes it back; the responder checks the
//! echo. Only then may frames flow.
//!
//! ```text
//! Responder                 Initiator
//!     │ ──── CLCHAT ────────→ │  check
//!     │ ←─── CLCHAT ───────── │  echo
//!   check                     │
//! ```
//!
//! The token identifies the protocol, nothing more. It is not a secret
//! and not a session key.

use clchat_transport::Connection;

use crate::HandshakeError;

/// The token both peers exchange before chatting.
pub const HANDSHAKE_TOKEN: &str = "CLCHAT";

/// Runs the initiator's side: expect the token, then echo it.
///
/// On mismatch (or if the peer hangs up first) the connection is closed
/// before the error is returned, and nothing is written to it.
pub async fn verify_as_initiator<C: Connection>(
    conn: &C,
    token: &str,
) -> Result<(), HandshakeError> {
    let received = conn.recv_line().await?;
    expect_token(conn, token, received).await?;

    conn.send_line(token).await?;
    tracing::debug!(id = %conn.id(), "handshake echoed");
    Ok(())
}

/// Runs the responder's side: send the token, then expect it back.
///
/// On mismatch the connection is closed before the error is returned.
pub async fn verify_as_responder<C: Connection>(
    conn: &C,
    token: &str,
) -> Result<(), HandshakeError> {
    conn.send_line(token).await?;

    let received = conn.recv_line().await?;
    expect_token(conn, token, received).await?;
    tracing::debug!(id = %conn.id(), "handshake confirmed");
    Ok(())
}

async fn expect_token<C: Connection>(
    conn: &C,
    token: &str,
    received: Option<String>,
) -> Result<(), HandshakeError> {
    if received.as_deref() == Some(token) {
        return Ok(());
    }

    tracing::warn!(id = %conn.id(), ?received, "handshake token mismatch");
    if let Err(e) = conn.close().await {
        tracing::debug!(id = %conn.id(), error = %e, "close after mismatch failed");
    }
    Err(HandshakeError::Mismatch { received })
}
