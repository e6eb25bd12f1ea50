//! Terminal console: stdin for outgoing lines, stdout for the transcript.

use std::io::Write;

use clchat_session::Console;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

/// A [`Console`] on the process's standard streams.
pub struct StdConsole {
    lines: Lines<BufReader<Stdin>>,
}

impl StdConsole {
    /// Reads from this process's stdin.
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }
}

impl Default for StdConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl Console for StdConsole {
    async fn read_line(&mut self) -> std::io::Result<Option<String>> {
        let line = self.lines.next_line().await?;
        // Lines::next_line strips '\n' but leaves a Windows '\r'.
        Ok(line.map(|mut l| {
            if l.ends_with('\r') {
                l.pop();
            }
            l
        }))
    }

    fn display(&mut self, text: &str) {
        println!("RECEIVED: {text}");
    }

    fn prompt(&mut self) {
        let mut out = std::io::stdout().lock();
        // The prompt has no newline, so push it out by hand.
        if let Err(e) = write!(out, "SEND:    ").and_then(|()| out.flush()) {
            tracing::debug!(error = %e, "could not write prompt");
        }
    }

    fn waiting(&mut self) {
        println!("Waiting...");
    }
}
