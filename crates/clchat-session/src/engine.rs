//! The conversation engine: the turn-taking state machine both roles run.
//!
//! One engine owns one connection. After the handshake it alternates
//! between sending (our turn) and receiving (their turn), flipping the
//! turn after every frame, until one side closes or the connection
//! breaks. Since a peer only ever writes on its own turn, the two ends
//! never talk over each other on the shared stream.

use clchat_protocol::{
    verify_as_initiator, verify_as_responder, Codec, Frame, TagCodec,
};
use clchat_transport::Connection;

use crate::{
    CloseReason, Console, Outgoing, Role, SessionError, SessionState, Turn,
};

/// What a single send or receive produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Our message went out; it is now the peer's turn.
    Sent,

    /// The peer's message arrived; it is now our turn.
    Received(String),

    /// The conversation ended cleanly.
    Closed(CloseReason),
}

/// Drives one conversation over one connection.
///
/// ## Example
///
/// ```rust
/// use clchat_session::{ConversationEngine, Event, Outgoing, Role};
/// use clchat_transport::MemoryConnection;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let (a, b) = MemoryConnection::pair();
/// let mut initiator = ConversationEngine::new(a, Role::Initiator);
/// let mut responder = ConversationEngine::new(b, Role::Responder);
///
/// let (i, r) = tokio::join!(
///     initiator.handshake("CLCHAT"),
///     responder.handshake("CLCHAT"),
/// );
/// i.unwrap();
/// r.unwrap();
///
/// initiator.send(Outgoing::Message("hello".into())).await.unwrap();
/// assert_eq!(
///     responder.receive().await.unwrap(),
///     Event::Received("hello".into())
/// );
/// # }
/// ```
pub struct ConversationEngine<C: Connection, K: Codec = TagCodec> {
    conn: C,
    codec: K,
    role: Role,
    state: SessionState,
}

impl<C: Connection> ConversationEngine<C, TagCodec> {
    /// Creates an engine using the standard tag codec.
    pub fn new(conn: C, role: Role) -> Self {
        Self::with_codec(conn, role, TagCodec)
    }
}

impl<C: Connection, K: Codec> ConversationEngine<C, K> {
    /// Creates an engine with a custom codec.
    pub fn with_codec(conn: C, role: Role, codec: K) -> Self {
        Self {
            conn,
            codec,
            role,
            state: SessionState::AwaitingHandshake,
        }
    }

    /// Which side of the conversation this engine plays.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The underlying connection.
    pub fn connection(&self) -> &C {
        &self.conn
    }

    /// Verifies the peer and enters `Active` with this role's first turn.
    ///
    /// On failure the engine is `Closed(HandshakeFailed)` and the
    /// connection has been closed.
    pub async fn handshake(&mut self, token: &str) -> Result<(), SessionError> {
        if self.state != SessionState::AwaitingHandshake {
            return Err(SessionError::NotActive(self.state));
        }

        let result = match self.role {
            Role::Initiator => verify_as_initiator(&self.conn, token).await,
            Role::Responder => verify_as_responder(&self.conn, token).await,
        };

        match result {
            Ok(()) => {
                tracing::info!(id = %self.conn.id(), role = %self.role, "handshake complete");
                self.transition(SessionState::Active(self.role.first_turn()));
                Ok(())
            }
            Err(e) => {
                tracing::warn!(id = %self.conn.id(), role = %self.role, error = %e, "handshake failed");
                self.transition(SessionState::Closed(CloseReason::HandshakeFailed));
                self.shutdown().await;
                Err(e.into())
            }
        }
    }

    /// Sends the user's choice on our turn.
    ///
    /// A message flips the turn to the peer. `Quit` sends the close frame
    /// and ends the session with [`CloseReason::LocalClose`]. A message
    /// containing a line break is refused with
    /// [`SessionError::MultiLineMessage`] and the turn stays ours.
    pub async fn send(&mut self, outgoing: Outgoing) -> Result<Event, SessionError> {
        self.expect_turn(Turn::Mine)?;

        match outgoing {
            Outgoing::Quit => {
                self.write_frame(&Frame::Close).await?;
                self.transition(SessionState::Closed(CloseReason::LocalClose));
                Ok(Event::Closed(CloseReason::LocalClose))
            }
            Outgoing::Message(text) if text.contains(['\n', '\r']) => {
                Err(SessionError::MultiLineMessage)
            }
            Outgoing::Message(text) => {
                self.write_frame(&Frame::Message(text)).await?;
                self.pass_turn();
                Ok(Event::Sent)
            }
        }
    }

    /// Waits for the peer's frame on their turn.
    ///
    /// A message flips the turn back to us. A close frame ends the
    /// session with [`CloseReason::RemoteClose`]. End of stream and
    /// malformed lines end it with [`CloseReason::TransportFailure`].
    pub async fn receive(&mut self) -> Result<Event, SessionError> {
        self.expect_turn(Turn::Theirs)?;

        let line = match self.conn.recv_line().await {
            Ok(Some(line)) => line,
            Ok(None) => return Err(self.fail(SessionError::UnexpectedEof)),
            Err(e) => return Err(self.fail(e.into())),
        };
        let frame = match self.codec.decode(&line) {
            Ok(frame) => frame,
            Err(e) => return Err(self.fail(e.into())),
        };
        tracing::debug!(id = %self.conn.id(), %frame, "received frame");

        match frame {
            Frame::Close => {
                self.transition(SessionState::Closed(CloseReason::RemoteClose));
                Ok(Event::Closed(CloseReason::RemoteClose))
            }
            Frame::Message(text) => {
                self.pass_turn();
                Ok(Event::Received(text))
            }
        }
    }

    /// Plays one turn: reads from the console and sends on ours, waits
    /// for the peer on theirs.
    pub async fn step<S: Console>(&mut self, console: &mut S) -> Result<Event, SessionError> {
        match self.state {
            SessionState::Active(Turn::Mine) => {
                console.prompt();
                let outgoing = match console.read_line().await {
                    Ok(Some(line)) => Outgoing::from_input(&line),
                    Ok(None) => Outgoing::Quit,
                    Err(e) => return Err(self.abandon(e).await),
                };
                self.send(outgoing).await
            }
            SessionState::Active(Turn::Theirs) => {
                console.waiting();
                self.receive().await
            }
            other => Err(SessionError::NotActive(other)),
        }
    }

    /// Plays turns until the session closes, showing every received
    /// message on the console.
    ///
    /// Returns the close reason on a clean end (`LocalClose` or
    /// `RemoteClose`); any failure comes back as the error that caused it.
    pub async fn run<S: Console>(&mut self, console: &mut S) -> Result<CloseReason, SessionError> {
        loop {
            match self.step(console).await? {
                Event::Sent => {}
                Event::Received(text) => console.display(&text),
                Event::Closed(reason) => {
                    tracing::info!(id = %self.conn.id(), %reason, "conversation over");
                    return Ok(reason);
                }
            }
        }
    }

    /// Closes the connection. Safe to call any number of times.
    ///
    /// A session that was still active is marked `Closed(LocalClose)`;
    /// no close frame is sent, so the peer sees the stream end.
    pub async fn shutdown(&mut self) {
        if !self.state.is_closed() {
            tracing::debug!(id = %self.conn.id(), state = %self.state, "shutting down open session");
            self.transition(SessionState::Closed(CloseReason::LocalClose));
        }
        if let Err(e) = self.conn.close().await {
            tracing::debug!(id = %self.conn.id(), error = %e, "close failed");
        }
    }

    async fn write_frame(&mut self, frame: &Frame) -> Result<(), SessionError> {
        let line = self.codec.encode(frame);
        if let Err(e) = self.conn.send_line(&line).await {
            return Err(self.fail(e.into()));
        }
        tracing::debug!(id = %self.conn.id(), %frame, "sent frame");
        Ok(())
    }

    /// Gives up on the conversation because the console failed. The
    /// peer still gets a close frame if the connection allows it.
    async fn abandon(&mut self, err: std::io::Error) -> SessionError {
        tracing::warn!(id = %self.conn.id(), error = %err, "console failed, closing conversation");
        let line = self.codec.encode(&Frame::Close);
        if let Err(e) = self.conn.send_line(&line).await {
            tracing::debug!(id = %self.conn.id(), error = %e, "could not send close frame");
        }
        self.transition(SessionState::Closed(CloseReason::LocalClose));
        SessionError::Console(err)
    }

    fn fail(&mut self, err: SessionError) -> SessionError {
        tracing::warn!(id = %self.conn.id(), error = %err, "conversation failed");
        self.transition(SessionState::Closed(CloseReason::TransportFailure));
        err
    }

    fn expect_turn(&self, turn: Turn) -> Result<(), SessionError> {
        match self.state {
            SessionState::Active(current) if current == turn => Ok(()),
            SessionState::Active(_) => Err(SessionError::NotYourTurn),
            other => Err(SessionError::NotActive(other)),
        }
    }

    fn pass_turn(&mut self) {
        if let SessionState::Active(turn) = self.state {
            self.transition(SessionState::Active(turn.flip()));
        }
    }

    fn transition(&mut self, next: SessionState) {
        // Closed is terminal.
        if self.state.is_closed() {
            return;
        }
        tracing::trace!(id = %self.conn.id(), from = %self.state, to = %next, "state change");
        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use clchat_protocol::FrameError;
    use clchat_transport::MemoryConnection;

    use super::*;

    /// Feeds canned input and records everything shown.
    #[derive(Default)]
    struct Script {
        input: VecDeque<String>,
        shown: Vec<String>,
        prompts: usize,
        waits: usize,
    }

    impl Script {
        fn new(lines: &[&str]) -> Self {
            Self {
                input: lines.iter().map(|l| l.to_string()).collect(),
                ..Self::default()
            }
        }
    }

    impl Console for Script {
        async fn read_line(&mut self) -> std::io::Result<Option<String>> {
            Ok(self.input.pop_front())
        }

        fn display(&mut self, text: &str) {
            self.shown.push(text.to_string());
        }

        fn prompt(&mut self) {
            self.prompts += 1;
        }

        fn waiting(&mut self) {
            self.waits += 1;
        }
    }

    struct BrokenConsole;

    impl Console for BrokenConsole {
        async fn read_line(&mut self) -> std::io::Result<Option<String>> {
            Err(std::io::Error::other("stdin went away"))
        }

        fn display(&mut self, _text: &str) {}
    }

    /// An engine already past the handshake, plus the raw peer end.
    async fn active(role: Role) -> (ConversationEngine<MemoryConnection>, MemoryConnection) {
        let (conn, peer) = MemoryConnection::pair();
        let mut engine = ConversationEngine::new(conn, role);
        // Same for both roles: the initiator reads the token before
        // echoing, the responder reads it after sending its own.
        peer.send_line("CLCHAT").await.unwrap();
        engine.handshake("CLCHAT").await.unwrap();
        assert_eq!(peer.recv_line().await.unwrap().as_deref(), Some("CLCHAT"));
        (engine, peer)
    }

    #[tokio::test]
    async fn test_starts_awaiting_handshake() {
        let (conn, _peer) = MemoryConnection::pair();
        let engine = ConversationEngine::new(conn, Role::Initiator);
        assert_eq!(engine.state(), SessionState::AwaitingHandshake);
        assert_eq!(engine.role(), Role::Initiator);
    }

    #[tokio::test]
    async fn test_initial_turn_follows_role() {
        let (engine, _peer) = active(Role::Initiator).await;
        assert_eq!(engine.state(), SessionState::Active(Turn::Mine));

        let (engine, _peer) = active(Role::Responder).await;
        assert_eq!(engine.state(), SessionState::Active(Turn::Theirs));
    }

    #[tokio::test]
    async fn test_handshake_mismatch_closes() {
        let (conn, peer) = MemoryConnection::pair();
        let mut engine = ConversationEngine::new(conn, Role::Initiator);
        peer.send_line("NOTCLCHAT").await.unwrap();

        let err = engine.handshake("CLCHAT").await.unwrap_err();
        assert!(matches!(err, SessionError::Handshake(_)));
        assert_eq!(
            engine.state(),
            SessionState::Closed(CloseReason::HandshakeFailed)
        );
        assert!(engine.connection().is_closed());
        assert!(peer.recv_line().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_handshake_twice_is_rejected() {
        let (mut engine, _peer) = active(Role::Initiator).await;
        let err = engine.handshake("CLCHAT").await.unwrap_err();
        assert!(matches!(err, SessionError::NotActive(_)));
        assert_eq!(engine.state(), SessionState::Active(Turn::Mine));
    }

    #[tokio::test]
    async fn test_send_message_flips_turn() {
        let (mut engine, peer) = active(Role::Initiator).await;

        let event = engine.send(Outgoing::Message("hello".into())).await.unwrap();
        assert_eq!(event, Event::Sent);
        assert_eq!(engine.state(), SessionState::Active(Turn::Theirs));
        assert_eq!(peer.recv_line().await.unwrap().as_deref(), Some("0hello"));
    }

    #[tokio::test]
    async fn test_quit_sends_bare_close_tag() {
        let (mut engine, peer) = active(Role::Initiator).await;

        let event = engine.send(Outgoing::Quit).await.unwrap();
        assert_eq!(event, Event::Closed(CloseReason::LocalClose));
        assert_eq!(engine.state(), SessionState::Closed(CloseReason::LocalClose));
        assert_eq!(peer.recv_line().await.unwrap().as_deref(), Some("1"));
    }

    #[tokio::test]
    async fn test_receive_message_flips_turn() {
        let (mut engine, peer) = active(Role::Responder).await;
        peer.send_line("0hi there").await.unwrap();

        let event = engine.receive().await.unwrap();
        assert_eq!(event, Event::Received("hi there".into()));
        assert_eq!(engine.state(), SessionState::Active(Turn::Mine));
    }

    #[tokio::test]
    async fn test_receive_close_is_remote_close() {
        let (mut engine, peer) = active(Role::Responder).await;
        peer.send_line("1").await.unwrap();

        let event = engine.receive().await.unwrap();
        assert_eq!(event, Event::Closed(CloseReason::RemoteClose));
        assert_eq!(engine.state(), SessionState::Closed(CloseReason::RemoteClose));
    }

    #[tokio::test]
    async fn test_empty_line_is_transport_failure() {
        let (mut engine, peer) = active(Role::Responder).await;
        peer.send_line("").await.unwrap();

        let err = engine.receive().await.unwrap_err();
        assert!(matches!(err, SessionError::Frame(FrameError::Empty)));
        assert_eq!(
            engine.state(),
            SessionState::Closed(CloseReason::TransportFailure)
        );
    }

    #[tokio::test]
    async fn test_unknown_tag_is_transport_failure() {
        let (mut engine, peer) = active(Role::Responder).await;
        peer.send_line("7what").await.unwrap();

        let err = engine.receive().await.unwrap_err();
        assert!(matches!(err, SessionError::Frame(FrameError::UnknownTag('7'))));
        assert_eq!(
            engine.state(),
            SessionState::Closed(CloseReason::TransportFailure)
        );
    }

    #[tokio::test]
    async fn test_peer_hangup_is_transport_failure() {
        let (mut engine, peer) = active(Role::Responder).await;
        peer.close().await.unwrap();

        let err = engine.receive().await.unwrap_err();
        assert!(matches!(err, SessionError::UnexpectedEof));
        assert_eq!(
            engine.state(),
            SessionState::Closed(CloseReason::TransportFailure)
        );
    }

    #[tokio::test]
    async fn test_send_failure_is_transport_failure() {
        let (mut engine, peer) = active(Role::Initiator).await;
        peer.close().await.unwrap();

        let err = engine.send(Outgoing::Message("into the void".into())).await.unwrap_err();
        assert!(matches!(err, SessionError::Transport(_)));
        assert_eq!(
            engine.state(),
            SessionState::Closed(CloseReason::TransportFailure)
        );
    }

    #[tokio::test]
    async fn test_out_of_turn_calls_leave_state_alone() {
        let (mut engine, peer) = active(Role::Responder).await;

        let err = engine.send(Outgoing::Message("me first".into())).await.unwrap_err();
        assert!(matches!(err, SessionError::NotYourTurn));
        assert_eq!(engine.state(), SessionState::Active(Turn::Theirs));

        peer.send_line("0ok").await.unwrap();
        engine.receive().await.unwrap();

        let err = engine.receive().await.unwrap_err();
        assert!(matches!(err, SessionError::NotYourTurn));
        assert_eq!(engine.state(), SessionState::Active(Turn::Mine));
    }

    #[tokio::test]
    async fn test_multi_line_message_keeps_turn() {
        let (mut engine, peer) = active(Role::Initiator).await;

        let err = engine
            .send(Outgoing::Message("pasted\rtext".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::MultiLineMessage));
        assert_eq!(engine.state(), SessionState::Active(Turn::Mine));

        engine.send(Outgoing::Message("fine".into())).await.unwrap();
        assert_eq!(peer.recv_line().await.unwrap().as_deref(), Some("0fine"));
    }

    #[tokio::test]
    async fn test_console_line_breaks_do_not_end_session() {
        let (mut engine, peer) = active(Role::Initiator).await;
        peer.send_line("0got it").await.unwrap();

        let mut console = Script::new(&["pasted\rtext", "quit"]);
        let reason = engine.run(&mut console).await.unwrap();
        assert_eq!(reason, CloseReason::LocalClose);

        assert_eq!(peer.recv_line().await.unwrap().as_deref(), Some("0pasted text"));
        assert_eq!(peer.recv_line().await.unwrap().as_deref(), Some("1"));
    }

    #[tokio::test]
    async fn test_closed_is_terminal() {
        let (mut engine, peer) = active(Role::Initiator).await;
        engine.send(Outgoing::Quit).await.unwrap();

        let err = engine.send(Outgoing::Message("too late".into())).await.unwrap_err();
        assert!(matches!(err, SessionError::NotActive(_)));
        let err = engine.step(&mut Script::new(&["hi"])).await.unwrap_err();
        assert!(matches!(err, SessionError::NotActive(_)));

        engine.shutdown().await;
        assert_eq!(engine.state(), SessionState::Closed(CloseReason::LocalClose));

        // Only the close frame ever reached the peer.
        assert_eq!(peer.recv_line().await.unwrap().as_deref(), Some("1"));
        assert!(peer.recv_line().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_run_alternates_and_displays() {
        let (mut engine, peer) = active(Role::Initiator).await;
        peer.send_line("0reply one").await.unwrap();
        peer.send_line("0reply two").await.unwrap();

        let mut console = Script::new(&["first", "second", "QUIT"]);
        let reason = engine.run(&mut console).await.unwrap();

        assert_eq!(reason, CloseReason::LocalClose);
        assert_eq!(console.shown, vec!["reply one", "reply two"]);
        assert_eq!(console.prompts, 3);
        assert_eq!(console.waits, 2);

        let mut wire = Vec::new();
        while let Some(line) = peer.recv_line().await.unwrap() {
            wire.push(line);
            if wire.len() == 3 {
                break;
            }
        }
        assert_eq!(wire, vec!["0first", "0second", "1"]);
    }

    #[tokio::test]
    async fn test_console_eof_quits() {
        let (mut engine, peer) = active(Role::Initiator).await;

        let reason = engine.run(&mut Script::new(&[])).await.unwrap();
        assert_eq!(reason, CloseReason::LocalClose);
        assert_eq!(peer.recv_line().await.unwrap().as_deref(), Some("1"));
    }

    #[tokio::test]
    async fn test_console_error_still_sends_close() {
        let (mut engine, peer) = active(Role::Initiator).await;

        let err = engine.run(&mut BrokenConsole).await.unwrap_err();
        assert!(matches!(err, SessionError::Console(_)));
        assert_eq!(engine.state(), SessionState::Closed(CloseReason::LocalClose));
        assert_eq!(peer.recv_line().await.unwrap().as_deref(), Some("1"));
    }

    #[tokio::test]
    async fn test_shutdown_is_idempotent() {
        let (mut engine, peer) = active(Role::Responder).await;

        engine.shutdown().await;
        engine.shutdown().await;
        assert!(engine.connection().is_closed());
        assert_eq!(engine.state(), SessionState::Closed(CloseReason::LocalClose));
        assert!(peer.recv_line().await.unwrap().is_none());
    }
}
