//! Codec trait and implementations for turning frames into lines.
//!
//! A "codec" (coder/decoder) converts between [`Frame`]s and the single
//! line of text each one occupies on the wire. The session layer only
//! depends on the [`Codec`] trait, so the line format can change without
//! touching the turn-taking logic.
//!
//! Currently we provide [`TagCodec`]: a one-character tag followed by the
//! payload. It keeps raw traffic readable, which is handy when watching
//! a session with a packet sniffer or `nc`.

use crate::{Frame, FrameError, CLOSE_TAG, MESSAGE_TAG};

/// Converts frames to wire lines and back.
///
/// Lines handed to [`decode`](Codec::decode) have already been stripped
/// of their terminator by the transport, and lines returned by
/// [`encode`](Codec::encode) must not contain one.
pub trait Codec: Send + Sync + 'static {
    /// Renders a frame as one line.
    fn encode(&self, frame: &Frame) -> String;

    /// Parses one line into a frame.
    ///
    /// # Errors
    /// Returns a [`FrameError`] if the line is empty or carries an
    /// unknown tag.
    fn decode(&self, line: &str) -> Result<Frame, FrameError>;
}

// ---------------------------------------------------------------------------
// TagCodec
// ---------------------------------------------------------------------------

/// The CLChat line format: tag character, then payload, no separator.
///
/// | Frame              | Wire line |
/// |--------------------|-----------|
/// | `Message("hello")` | `0hello`  |
/// | `Message("")`      | `0`       |
/// | `Close`            | `1`       |
///
/// On decode, anything after a close tag is ignored.
///
/// ## Example
///
/// ```rust
/// use clchat_protocol::{Codec, Frame, TagCodec};
///
/// let codec = TagCodec;
///
/// let line = codec.encode(&Frame::message("hello"));
/// assert_eq!(line, "0hello");
///
/// assert_eq!(codec.decode(&line).unwrap(), Frame::message("hello"));
/// assert_eq!(codec.decode("1").unwrap(), Frame::Close);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TagCodec;

impl Codec for TagCodec {
    fn encode(&self, frame: &Frame) -> String {
        let payload = frame.payload().unwrap_or_default();
        let mut line = String::with_capacity(payload.len() + 1);
        line.push(frame.tag());
        line.push_str(payload);
        line
    }

    fn decode(&self, line: &str) -> Result<Frame, FrameError> {
        let mut chars = line.chars();
        match chars.next() {
            None => Err(FrameError::Empty),
            Some(CLOSE_TAG) => Ok(Frame::Close),
            Some(MESSAGE_TAG) => Ok(Frame::Message(chars.as_str().to_string())),
            Some(other) => Err(FrameError::UnknownTag(other)),
        }
    }
}
