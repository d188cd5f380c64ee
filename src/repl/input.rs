//! Line input for the chat loop.
//!
//! On a terminal, `rustyline_async::Readline` owns the prompt and reports
//! Ctrl+D / Ctrl+C as events. Piped input is read line by line and decoded
//! lossily, so a stray non-UTF-8 byte never ends the session.

use async_trait::async_trait;
use rustyline_async::{Readline, ReadlineError, ReadlineEvent, SharedWriter};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Events produced by an input source.
#[derive(Debug, PartialEq)]
pub enum InputEvent {
    /// User submitted a line (already trimmed).
    Message(String),
    /// End of input (Ctrl+D or closed pipe).
    Eof,
    /// Interrupt (Ctrl+C).
    Interrupted,
}

/// Where the chat loop gets its lines from.
///
/// `read_line` must be cancel safe: the loop polls it while a request is in
/// flight and drops the future when the request finishes first.
#[async_trait(?Send)]
pub trait LineSource {
    /// Whether the loop has to print the prompt itself
    fn needs_prompt(&self) -> bool {
        false
    }

    async fn read_line(&mut self) -> InputEvent;

    /// Called once after the loop ends.
    fn finish(&mut self) {}
}

/// Terminal input wrapping rustyline_async.
pub struct ChatInput {
    rl: Readline,
}

impl ChatInput {
    /// Create the terminal input with the given prompt.
    ///
    /// Output must go through the returned `SharedWriter` so it does not
    /// clobber the prompt line.
    pub fn new(prompt: String) -> Result<(Self, SharedWriter), ReadlineError> {
        let (rl, stdout) = Readline::new(prompt)?;
        Ok((Self { rl }, stdout))
    }
}

#[async_trait(?Send)]
impl LineSource for ChatInput {
    async fn read_line(&mut self) -> InputEvent {
        match self.rl.readline().await {
            Ok(ReadlineEvent::Line(line)) => InputEvent::Message(line.trim().to_string()),
            Ok(ReadlineEvent::Eof) => InputEvent::Eof,
            Ok(ReadlineEvent::Interrupted) => InputEvent::Interrupted,
            Err(e) => {
                tracing::warn!(error = %e, "terminal input failed");
                InputEvent::Eof
            }
        }
    }

    fn finish(&mut self) {
        let _ = self.rl.flush();
    }
}

/// Line-by-line input from a pipe or file.
pub struct PipedInput<R> {
    reader: R,
    buf: Vec<u8>,
}

impl<R> PipedInput<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
        }
    }
}

#[async_trait(?Send)]
impl<R: AsyncBufRead + Unpin> LineSource for PipedInput<R> {
    fn needs_prompt(&self) -> bool {
        true
    }

    async fn read_line(&mut self) -> InputEvent {
        // Bytes from a cancelled read stay in `buf` and are completed here
        match self.reader.read_until(b'\n', &mut self.buf).await {
            Ok(0) if self.buf.is_empty() => InputEvent::Eof,
            Ok(_) => {
                let line = String::from_utf8_lossy(&self.buf).trim().to_string();
                self.buf.clear();
                InputEvent::Message(line)
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to read input");
                InputEvent::Eof
            }
        }
    }
}
