//! Interactive read-eval-print loop.
//!
//! Free text goes to the model; `:` lines are handled locally. EOF and
//! Ctrl+C at the prompt end the loop the same way `:quit` does. Ctrl+C while
//! a request is in flight abandons that request and returns to the prompt.

pub mod commands;
pub mod input;

use std::collections::VecDeque;
use std::io::{self, Write};

use console::style;

use crate::conversation::{default_transcript_path, save_transcript};
use crate::providers::{ChatBackend, CompletionError};
use crate::session::ChatSession;

use commands::ChatCommand;
use input::{InputEvent, LineSource};

pub const PROMPT: &str = "You: ";
const FAREWELL: &str = "Bye! 🧽";

/// Print the startup banner.
pub fn write_banner(out: &mut impl Write, model: &str, endpoint: &str) -> io::Result<()> {
    let rule = "=".repeat(72);
    writeln!(out, "{}", rule)?;
    writeln!(
        out,
        "  {}  -  OpenAI-compatible Chat Completions",
        style("SpongeBob CLI Chatbot").yellow().bold()
    )?;
    writeln!(out, "  Model: {} | Endpoint: {}", model, endpoint)?;
    writeln!(out, "  Commands: :help  :reset  :save [path]  :quit")?;
    writeln!(out, "{}", rule)?;
    Ok(())
}

/// Run the loop until the user quits or input ends.
pub async fn run<B, S, W>(
    session: &mut ChatSession<B>,
    input: &mut S,
    out: &mut W,
) -> io::Result<()>
where
    B: ChatBackend,
    S: LineSource,
    W: Write,
{
    // Lines typed while a request was in flight
    let mut backlog = VecDeque::new();

    loop {
        if input.needs_prompt() {
            write!(out, "{}", PROMPT)?;
        }
        out.flush()?;

        let event = match backlog.pop_front() {
            Some(event) => event,
            None => input.read_line().await,
        };

        let line = match event {
            InputEvent::Message(line) => line,
            InputEvent::Eof | InputEvent::Interrupted => {
                writeln!(out, "\n{}", FAREWELL)?;
                break;
            }
        };

        let text = line.trim();
        if text.is_empty() {
            continue;
        }

        if let Some(command) = commands::parse(text) {
            if !handle_command(session, command, out).await? {
                break;
            }
            continue;
        }

        match send_or_interrupt(session, text, input, &mut backlog).await {
            Some(Ok(reply)) => {
                writeln!(out, "{} {}", style("SpongeBob:").yellow().bold(), reply)?
            }
            Some(Err(e)) => {
                writeln!(out, "{} {}", style("SpongeBob (error):").red().bold(), e)?
            }
            None => writeln!(out, "{}", style("Request cancelled.").dim())?,
        }
    }

    input.finish();
    out.flush()?;
    Ok(())
}

/// Await the completion while still watching input.
///
/// Returns `None` when the user interrupts; the request is dropped and the
/// user turn stays in the history without a reply. Other input is queued in
/// `backlog` for the loop.
async fn send_or_interrupt<B, S>(
    session: &mut ChatSession<B>,
    text: &str,
    input: &mut S,
    backlog: &mut VecDeque<InputEvent>,
) -> Option<Result<String, CompletionError>>
where
    B: ChatBackend,
    S: LineSource,
{
    let send = session.send(text);
    tokio::pin!(send);
    let mut listening = !backlog.contains(&InputEvent::Eof);

    loop {
        tokio::select! {
            biased;
            result = &mut send => return Some(result),
            event = input.read_line(), if listening => match event {
                InputEvent::Interrupted => {
                    tracing::debug!("request interrupted");
                    return None;
                }
                InputEvent::Eof => {
                    listening = false;
                    backlog.push_back(InputEvent::Eof);
                }
                line => backlog.push_back(line),
            },
        }
    }
}

/// Returns `false` when the loop should stop.
async fn handle_command<B: ChatBackend, W: Write>(
    session: &mut ChatSession<B>,
    command: ChatCommand,
    out: &mut W,
) -> io::Result<bool> {
    match command {
        ChatCommand::Help => commands::write_help(out)?,
        ChatCommand::Reset => {
            session.conversation_mut().reset();
            writeln!(out, "History cleared (system prompt kept).")?;
        }
        ChatCommand::Save(path) => {
            let path = path.unwrap_or_else(default_transcript_path);
            match save_transcript(session.conversation(), &path).await {
                Ok(saved) => writeln!(out, "Saved transcript to: {}", saved.display())?,
                Err(e) => {
                    tracing::warn!(error = %e, "transcript save failed");
                    writeln!(out, "{} {}", style("Save failed:").red(), e)?;
                }
            }
        }
        ChatCommand::Quit => {
            writeln!(out, "{}", FAREWELL)?;
            return Ok(false);
        }
        ChatCommand::Unknown(cmd) => writeln!(out, "Unknown command: {}. Type :help", cmd)?,
    }
    Ok(true)
}
