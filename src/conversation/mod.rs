//! Conversation types and bounded history management
//!
//! The [`Conversation`] owns the ordered list of chat turns. The persona
//! (system) turn is always first and is never evicted; every other turn is
//! subject to the retention limit.

mod transcript;

use serde::{Deserialize, Serialize};

pub use transcript::{default_transcript_path, save_transcript};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    /// Wire name used by chat completions APIs
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    /// Capitalized label used in transcripts
    pub fn label(&self) -> &'static str {
        match self {
            Role::System => "System",
            Role::User => "User",
            Role::Assistant => "Assistant",
        }
    }
}

/// Separator replacing newlines inside a transcript entry
const TRANSCRIPT_INDENT: &str = "\n    ";

/// An ordered, bounded conversation.
///
/// Invariant: `messages[0]` is the one and only system turn, and at most
/// `max_turns` other turns follow it. Only user and assistant turns can be
/// appended, so a second system turn cannot be introduced.
#[derive(Debug, Clone)]
pub struct Conversation {
    messages: Vec<Message>,
    max_turns: usize,
}

impl Conversation {
    /// Start a conversation seeded with the persona prompt.
    ///
    /// `max_turns` bounds the number of non-system turns kept.
    pub fn new(system_prompt: impl Into<String>, max_turns: usize) -> Self {
        Self {
            messages: vec![Message::new(Role::System, system_prompt)],
            max_turns,
        }
    }

    pub fn add_user(&mut self, content: &str) {
        self.push(Message::new(Role::User, content));
    }

    pub fn add_assistant(&mut self, content: &str) {
        self.push(Message::new(Role::Assistant, content));
    }

    /// Append a turn, evicting the oldest non-system turns past the limit.
    fn push(&mut self, message: Message) {
        self.messages.push(message);
        self.enforce_retention();
    }

    fn enforce_retention(&mut self) {
        let excess = self.non_system_len().saturating_sub(self.max_turns);
        if excess > 0 {
            self.messages.drain(1..=excess);
            tracing::debug!(evicted = excess, kept = self.max_turns, "trimmed history");
        }
    }

    /// Drop everything except the system turn.
    pub fn reset(&mut self) {
        self.messages.truncate(1);
    }

    /// Owned copy of the current turns, in conversation order.
    pub fn snapshot(&self) -> Vec<Message> {
        self.messages.clone()
    }

    pub fn system_prompt(&self) -> &str {
        &self.messages[0].content
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn non_system_len(&self) -> usize {
        self.messages.len() - 1
    }

    pub fn max_turns(&self) -> usize {
        self.max_turns
    }

    /// One `<Role>: <content>` entry per turn. Continuation lines of
    /// multi-line content are indented, so every unindented line starts a
    /// new turn.
    pub fn render_transcript(&self) -> String {
        self.messages
            .iter()
            .map(|m| {
                let body = m.content.lines().collect::<Vec<_>>().join(TRANSCRIPT_INDENT);
                format!("{}: {}\n", m.role.label(), body)
            })
            .collect()
    }
}
