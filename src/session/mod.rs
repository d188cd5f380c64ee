//! Chat session
//!
//! The session owns the conversation and drives one completion per user line.

mod chat;

pub use chat::ChatSession;

#[cfg(test)]
pub(crate) use chat::tests::ScriptedBackend;
