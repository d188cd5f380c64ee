//! Saving conversation transcripts to disk

use std::path::{Path, PathBuf};

use chrono::Local;
use tokio::fs;

use super::Conversation;

/// Errors from writing a transcript
#[derive(Debug, thiserror::Error)]
pub enum TranscriptError {
    #[error("could not write transcript to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// `spongebob_chat_<YYYYmmdd_HHMMSS>.txt` in the working directory
pub fn default_transcript_path() -> PathBuf {
    let ts = Local::now().format("%Y%m%d_%H%M%S");
    PathBuf::from(format!("spongebob_chat_{}.txt", ts))
}

/// Write the transcript and return the absolute path written.
pub async fn save_transcript(
    conversation: &Conversation,
    path: &Path,
) -> Result<PathBuf, TranscriptError> {
    let path = expand_home(path);
    let io_err = |source| TranscriptError::Io {
        path: path.clone(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await.map_err(io_err)?;
    }
    fs::write(&path, conversation.render_transcript())
        .await
        .map_err(io_err)?;

    let written = fs::canonicalize(&path).await.map_err(io_err)?;
    tracing::debug!(path = %written.display(), turns = conversation.len(), "saved transcript");
    Ok(written)
}

fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    }
}
