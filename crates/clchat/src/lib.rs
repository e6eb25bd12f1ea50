//! # CLChat
//!
//! Two-peer, turn-taking text chat over a single TCP connection.
//!
//! One peer listens ([`Responder`]) and accepts exactly one connection;
//! the other connects ([`Initiator`]). After a handshake that proves both
//! ends speak CLChat, they take strict turns sending one line each until
//! either side types `quit`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use clchat::prelude::*;
//!
//! # async fn demo() -> Result<(), ClChatError> {
//! let config = ChatConfig::default();
//! let engine = Responder::from_config(&config).await?.accept().await?;
//! let reason = converse(engine, &mut StdConsole::new()).await?;
//! println!("{reason}");
//! # Ok(())
//! # }
//! ```

mod config;
mod console;
mod error;
mod role;

pub use config::{
    ChatConfig, Port, DEFAULT_HOST, DEFAULT_PORT, LISTEN_HOST, MAX_PORT, MIN_PORT,
};
pub use console::StdConsole;
pub use error::{ClChatError, ConfigError};
pub use role::{converse, Initiator, Responder};

pub use clchat_protocol as protocol;
pub use clchat_session as session;
pub use clchat_transport as transport;

/// The items most programs need.
pub mod prelude {
    pub use crate::{
        converse, ChatConfig, ClChatError, ConfigError, Initiator, Port, Responder,
        StdConsole,
    };
    pub use clchat_session::{CloseReason, Console, Role, SessionError, QUIT_COMMAND};
}
