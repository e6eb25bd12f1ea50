//! Conversation sessions for CLChat.
//!
//! This crate owns the part of CLChat with real rules in it:
//!
//! 1. **Handshake**: running the right side of the token exchange for
//!    this peer's [`Role`]
//! 2. **Turn-taking**: the [`ConversationEngine`] only sends on our
//!    [`Turn`] and only reads on theirs
//! 3. **Teardown**: every way out (quit, remote close, broken
//!    connection) lands in [`SessionState::Closed`] with a
//!    [`CloseReason`]
//!
//! # How it fits in the stack
//!
//! ```text
//! Role drivers (above)  ← connect or accept, then hand the connection over
//!     ↕
//! Session Layer (this crate)  ← turn order, close handling
//!     ↕
//! Protocol Layer (below)  ← handshake, Frame, Codec
//! ```

#![allow(async_fn_in_trait)]

mod console;
mod engine;
mod error;
mod state;

pub use console::{Console, Outgoing, QUIT_COMMAND};
pub use engine::{ConversationEngine, Event};
pub use error::SessionError;
pub use state::{CloseReason, Role, SessionState, Turn};
