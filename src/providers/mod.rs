//! Chat completion backends

mod openai_compat;

use async_trait::async_trait;
use thiserror::Error;

use crate::conversation::Message;

pub use openai_compat::{OpenAICompatConfig, OpenAICompatProvider};

/// Broad category of a failed completion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionErrorKind {
    Network,
    Auth,
    Server,
    MalformedResponse,
}

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("network error: {0}")]
    Network(String),

    #[error("authentication failed (HTTP {status}): {detail}")]
    Auth { status: u16, detail: String },

    #[error("server error (HTTP {status}): {detail}")]
    Server { status: u16, detail: String },

    #[error("unexpected response format: {0}")]
    MalformedResponse(String),
}

impl CompletionError {
    pub fn kind(&self) -> CompletionErrorKind {
        match self {
            CompletionError::Network(_) => CompletionErrorKind::Network,
            CompletionError::Auth { .. } => CompletionErrorKind::Auth,
            CompletionError::Server { .. } => CompletionErrorKind::Server,
            CompletionError::MalformedResponse(_) => CompletionErrorKind::MalformedResponse,
        }
    }

    /// Classify a non-2xx status.
    pub(crate) fn from_status(status: u16, detail: String) -> Self {
        match status {
            401 | 403 => CompletionError::Auth { status, detail },
            _ => CompletionError::Server { status, detail },
        }
    }
}

impl From<reqwest::Error> for CompletionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            CompletionError::MalformedResponse(err.to_string())
        } else {
            CompletionError::Network(err.to_string())
        }
    }
}

/// Something that can turn a conversation snapshot into an assistant reply
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Model name sent with each request
    fn model(&self) -> &str;

    /// Full URL requests are sent to
    fn endpoint(&self) -> String;

    async fn complete(&self, messages: &[Message]) -> Result<String, CompletionError>;
}
