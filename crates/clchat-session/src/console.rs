//! Console hook: where outgoing text comes from and incoming text goes.
//!
//! The engine doesn't read stdin or print anything itself. Instead it
//! talks to a [`Console`], so the same engine runs behind a terminal, a
//! scripted test double, or anything else that can produce lines.

/// Literal that ends the conversation when typed at the console.
pub const QUIT_COMMAND: &str = "quit";

/// What the user wants to do on their turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outgoing {
    /// Send this text to the peer.
    Message(String),

    /// Close the conversation.
    Quit,
}

impl Outgoing {
    /// Interprets one line of user input.
    ///
    /// `quit` in any letter case, with or without surrounding
    /// whitespace, becomes [`Outgoing::Quit`]. Anything else is sent as
    /// one line: trailing line breaks are dropped and embedded ones
    /// become spaces.
    pub fn from_input(line: &str) -> Self {
        if line.trim().eq_ignore_ascii_case(QUIT_COMMAND) {
            return Self::Quit;
        }
        let line = line.trim_end_matches(['\n', '\r']);
        Self::Message(line.replace(['\n', '\r'], " "))
    }
}

/// The user-facing side of a conversation.
///
/// Only [`read_line`](Console::read_line) and
/// [`display`](Console::display) are required. `prompt` and `waiting`
/// are status hooks called at the start of our turn and theirs.
pub trait Console {
    /// Reads the user's next line, without its terminator.
    ///
    /// Returns `Ok(None)` at end of input, which the engine treats as
    /// `quit`.
    async fn read_line(&mut self) -> std::io::Result<Option<String>>;

    /// Shows a message received from the peer.
    fn display(&mut self, text: &str);

    /// Called right before [`read_line`](Console::read_line).
    fn prompt(&mut self) {}

    /// Called right before the engine blocks on the peer.
    fn waiting(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quit_is_case_insensitive() {
        assert_eq!(Outgoing::from_input("quit"), Outgoing::Quit);
        assert_eq!(Outgoing::from_input("QUIT"), Outgoing::Quit);
        assert_eq!(Outgoing::from_input("QuIt"), Outgoing::Quit);
        assert_eq!(Outgoing::from_input("  quit \t"), Outgoing::Quit);
    }

    #[test]
    fn test_other_input_is_a_message() {
        assert_eq!(
            Outgoing::from_input("quite"),
            Outgoing::Message("quite".into())
        );
        assert_eq!(
            Outgoing::from_input("please quit"),
            Outgoing::Message("please quit".into())
        );
        assert_eq!(Outgoing::from_input(""), Outgoing::Message(String::new()));
    }

    #[test]
    fn test_line_breaks_flattened() {
        assert_eq!(
            Outgoing::from_input("pasted\rtext"),
            Outgoing::Message("pasted text".into())
        );
        assert_eq!(
            Outgoing::from_input("one\r\ntwo\r\n"),
            Outgoing::Message("one  two".into())
        );
        assert_eq!(Outgoing::from_input("quit\r"), Outgoing::Quit);
    }
}
