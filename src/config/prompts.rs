//! Persona templates
//!
//! The SpongeBob persona is built in. Another persona can be loaded from a
//! TOML file:
//!
//! ```toml
//! [persona]
//! name = "Patrick"
//! description = "Slow but loyal starfish"
//!
//! [system_prompt]
//! content = """
//! You are Patrick Star...
//! """
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tokio::fs;

/// A persona/prompt template
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptTemplate {
    /// Persona metadata
    pub persona: PersonaInfo,

    /// The system prompt
    pub system_prompt: SystemPrompt,
}

/// Persona metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaInfo {
    /// Display name of the persona
    pub name: String,

    /// Brief description
    #[serde(default)]
    pub description: String,
}

/// System prompt content
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemPrompt {
    pub content: String,
}

impl PromptTemplate {
    /// Load a template from a TOML file
    pub async fn load_from_file(path: &Path) -> Result<Self, PromptError> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| PromptError::IoError(format!("{}: {}", path.display(), e)))?;

        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, PromptError> {
        let template: PromptTemplate =
            toml::from_str(content).map_err(|e| PromptError::ParseError(e.to_string()))?;

        if template.system_prompt.content.trim().is_empty() {
            return Err(PromptError::EmptyPrompt(template.persona.name));
        }
        Ok(template)
    }
}

/// Pick the system prompt: explicit text > persona file > built-in.
pub async fn resolve_system_prompt(
    explicit: Option<&str>,
    persona_file: Option<&Path>,
) -> Result<String, PromptError> {
    if let Some(prompt) = explicit.filter(|p| !p.trim().is_empty()) {
        return Ok(prompt.to_string());
    }
    if let Some(path) = persona_file {
        let template = PromptTemplate::load_from_file(path).await?;
        tracing::debug!(
            persona = %template.persona.name,
            description = %template.persona.description,
            "loaded persona template"
        );
        return Ok(template.system_prompt.content.trim().to_string());
    }
    Ok(builtin::SPONGEBOB.to_string())
}

/// Errors from prompt loading
#[derive(Debug, thiserror::Error)]
pub enum PromptError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Persona '{0}' has an empty system prompt")]
    EmptyPrompt(String),
}

/// Built-in prompts that don't require files
pub mod builtin {
    /// Default persona
    pub const SPONGEBOB: &str = "You are SpongeBob SquarePants. \
Speak cheerfully with nautical puns, occasional 'barnacles!' and 'jellyfishing' references. \
Be upbeat, kind, and whimsical. Keep replies concise (1–5 sentences). Avoid harmful content.";
}
