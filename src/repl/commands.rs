//! Colon command parsing for the chat loop.
//!
//! Commands start with `:` and act on the local conversation only; they are
//! never sent to the model.

use std::io::{self, Write};
use std::path::PathBuf;

use console::style;

/// Available colon commands in the chat loop.
#[derive(Debug, PartialEq)]
pub enum ChatCommand {
    /// Show available commands.
    Help,
    /// Clear the history, keeping the persona prompt.
    Reset,
    /// Save a transcript, optionally to the given path.
    Save(Option<PathBuf>),
    /// Exit the chat loop.
    Quit,
    /// Unknown command.
    Unknown(String),
}

/// Parse user input as a colon command.
///
/// Returns `None` if the input doesn't start with `:`.
pub fn parse(input: &str) -> Option<ChatCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with(':') {
        return None;
    }

    let mut parts = trimmed.splitn(2, char::is_whitespace);
    let cmd = parts.next().unwrap_or_default().to_lowercase();
    let arg = parts.next().map(str::trim).filter(|s| !s.is_empty());

    match cmd.as_str() {
        ":help" | ":h" | ":?" => Some(ChatCommand::Help),
        ":reset" => Some(ChatCommand::Reset),
        ":save" => Some(ChatCommand::Save(arg.map(PathBuf::from))),
        ":quit" | ":q" | ":exit" => Some(ChatCommand::Quit),
        other => Some(ChatCommand::Unknown(other.to_string())),
    }
}

/// Write the help text listing all available commands.
pub fn write_help(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "{}", style("Commands:").bold())?;
    writeln!(out, "  {}                Show this help", style(":help").cyan())?;
    writeln!(
        out,
        "  {}               Clear history (keep system prompt)",
        style(":reset").cyan()
    )?;
    writeln!(
        out,
        "  {}         Save transcript to a file (txt)",
        style(":save [path]").cyan()
    )?;
    writeln!(out, "  {}   Exit the chatbot", style(":quit / :q / :exit").cyan())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_help() {
        assert_eq!(parse(":help"), Some(ChatCommand::Help));
        assert_eq!(parse(":HELP"), Some(ChatCommand::Help));
        assert_eq!(parse(":?"), Some(ChatCommand::Help));
    }

    #[test]
    fn test_parse_quit() {
        assert_eq!(parse(":quit"), Some(ChatCommand::Quit));
        assert_eq!(parse(":q"), Some(ChatCommand::Quit));
        assert_eq!(parse(":exit"), Some(ChatCommand::Quit));
    }

    #[test]
    fn test_parse_save() {
        assert_eq!(parse(":save"), Some(ChatCommand::Save(None)));
        assert_eq!(parse(":save   "), Some(ChatCommand::Save(None)));
        assert_eq!(
            parse(":save logs/my chat.txt"),
            Some(ChatCommand::Save(Some(PathBuf::from("logs/my chat.txt"))))
        );
    }

    #[test]
    fn test_parse_reset_and_unknown() {
        assert_eq!(parse("  :reset  "), Some(ChatCommand::Reset));
        assert_eq!(parse(":jellyfish"), Some(ChatCommand::Unknown(":jellyfish".into())));
    }

    #[test]
    fn test_parse_not_command() {
        assert_eq!(parse("hello world"), None);
        assert_eq!(parse("what is :reset?"), None);
    }

    #[test]
    fn test_help_lists_commands() {
        let mut buf = Vec::new();
        write_help(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        for cmd in [":help", ":reset", ":save", ":quit"] {
            assert!(text.contains(cmd), "missing {}", cmd);
        }
    }
}
