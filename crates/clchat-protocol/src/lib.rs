//! Wire protocol for CLChat.
//!
//! This crate defines the "language" two chat peers speak:
//!
//! - **Frames** ([`Frame`]): the logical unit of traffic, a text
//!   message or a close signal.
//! - **Codec** ([`Codec`] trait, [`TagCodec`]): how a frame becomes one
//!   line of text and back.
//! - **Handshake** ([`verify_as_initiator`], [`verify_as_responder`]):
//!   the token exchange that proves both ends speak CLChat before any
//!   frame is sent.
//! - **Errors** ([`FrameError`], [`HandshakeError`]).
//!
//! # Architecture
//!
//! ```text
//! Transport (lines) → Protocol (Frame) → Session (turns)
//! ```
//!
//! The protocol layer doesn't know whose turn it is. It only knows how
//! to verify a peer and how to turn lines into frames.

mod codec;
mod error;
mod frame;
mod handshake;

pub use codec::{Codec, TagCodec};
pub use error::{FrameError, HandshakeError};
pub use frame::{Frame, CLOSE_TAG, MESSAGE_TAG};
pub use handshake::{verify_as_initiator, verify_as_responder, HANDSHAKE_TOKEN};
