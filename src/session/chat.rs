//! Chat session
//!
//! Ties the conversation history to a completion backend:
//! 1. Append the user turn
//! 2. Send the bounded history to the backend
//! 3. Append the assistant turn only if the backend answered

use crate::conversation::Conversation;
use crate::providers::{ChatBackend, CompletionError};

pub struct ChatSession<B> {
    conversation: Conversation,
    backend: B,
}

impl<B: ChatBackend> ChatSession<B> {
    pub fn new(conversation: Conversation, backend: B) -> Self {
        Self {
            conversation,
            backend,
        }
    }

    /// Run one exchange. On failure the user turn stays in the history and
    /// nothing else changes.
    pub async fn send(&mut self, text: &str) -> Result<String, CompletionError> {
        self.conversation.add_user(text);

        let reply = match self.backend.complete(&self.conversation.snapshot()).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(kind = ?e.kind(), error = %e, "completion failed");
                return Err(e);
            }
        };

        self.conversation.add_assistant(&reply);
        Ok(reply)
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn conversation_mut(&mut self) -> &mut Conversation {
        &mut self.conversation
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}
