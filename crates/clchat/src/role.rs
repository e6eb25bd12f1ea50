//! Role drivers: get a verified connection, then hand it to the engine.
//!
//! The two roles differ only in how the connection comes to exist (dial
//! out vs. accept one) and in which side of the handshake they play.
//! Everything after that is the same [`ConversationEngine`].

use std::net::SocketAddr;

use clchat_protocol::Codec;
use clchat_session::{CloseReason, Console, ConversationEngine, Role};
use clchat_transport::{Connection, TcpLineConnection, TcpLineListener};

use crate::{ChatConfig, ClChatError};

/// Connects out and speaks first.
pub struct Initiator {
    addr: String,
    token: String,
}

impl Initiator {
    /// Creates an initiator that will dial `addr` and expect `token`.
    pub fn new(addr: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            token: token.into(),
        }
    }

    /// Dials the configured host and port.
    pub fn from_config(config: &ChatConfig) -> Self {
        Self::new(config.connect_addr(), config.token.clone())
    }

    /// Connects and runs the handshake.
    ///
    /// The returned engine is `Active(Mine)`.
    pub async fn connect(self) -> Result<ConversationEngine<TcpLineConnection>, ClChatError> {
        let conn = TcpLineConnection::connect(&self.addr).await?;
        tracing::info!(addr = %self.addr, id = %conn.id(), "connected, verifying peer");

        let mut engine = ConversationEngine::new(conn, Role::Initiator);
        engine.handshake(&self.token).await?;
        Ok(engine)
    }
}

/// Listens, accepts one peer, and lets them speak first.
pub struct Responder {
    listener: TcpLineListener,
    token: String,
}

impl Responder {
    /// Binds the listening socket.
    pub async fn bind(addr: &str, token: impl Into<String>) -> Result<Self, ClChatError> {
        let listener = TcpLineListener::bind(addr).await?;
        Ok(Self {
            listener,
            token: token.into(),
        })
    }

    /// Binds on all interfaces at the configured port.
    pub async fn from_config(config: &ChatConfig) -> Result<Self, ClChatError> {
        Self::bind(&config.listen_addr(), config.token.clone()).await
    }

    /// Returns the address the listener is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts one connection, stops listening, and runs the handshake.
    ///
    /// The returned engine is `Active(Theirs)`.
    pub async fn accept(self) -> Result<ConversationEngine<TcpLineConnection>, ClChatError> {
        let conn = self.listener.accept_one().await?;
        tracing::info!(peer = %conn.peer_addr(), id = %conn.id(), "peer connected, verifying");

        let mut engine = ConversationEngine::new(conn, Role::Responder);
        engine.handshake(&self.token).await?;
        Ok(engine)
    }
}

/// Runs a verified conversation to the end, then closes the connection.
///
/// The connection is closed on every path out: quit, remote close, or
/// failure.
pub async fn converse<C, K, S>(
    mut engine: ConversationEngine<C, K>,
    console: &mut S,
) -> Result<CloseReason, ClChatError>
where
    C: Connection,
    K: Codec,
    S: Console,
{
    let result = engine.run(console).await;
    engine.shutdown().await;
    Ok(result?)
}
