//! Application configuration
//!
//! Credentials come from a dotenv-style file (default `~/.soonerai.env`):
//!
//! ```text
//! SOONERAI_API_KEY=sk-...
//! SOONERAI_BASE_URL=https://ai.sooners.us
//! SOONERAI_MODEL=gemma3:4b
//! ```
//!
//! Variables already present in the process environment win over the file.

pub mod prompts;

use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};

pub const API_KEY_VAR: &str = "SOONERAI_API_KEY";
pub const BASE_URL_VAR: &str = "SOONERAI_BASE_URL";
pub const MODEL_VAR: &str = "SOONERAI_MODEL";

pub const DEFAULT_BASE_URL: &str = "https://ai.sooners.us";
pub const DEFAULT_MODEL: &str = "gemma3:4b";
const ENV_FILE_NAME: &str = ".soonerai.env";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

impl Config {
    /// Load from the env file at `path` (or the default location) and the
    /// process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => default_env_file().ok_or(ConfigError::NoHomeDir)?,
        };

        let mut vars = read_env_file(&path)?;
        for key in [API_KEY_VAR, BASE_URL_VAR, MODEL_VAR] {
            if let Ok(value) = env::var(key) {
                vars.insert(key.to_string(), value);
            }
        }

        Self::from_vars(&vars)
    }

    /// Build from already-collected key/value pairs.
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let lookup = |key: &str| vars.get(key).map(|v| v.trim()).filter(|v| !v.is_empty());

        let api_key = lookup(API_KEY_VAR)
            .ok_or(ConfigError::Missing(API_KEY_VAR))?
            .to_string();
        let base_url = lookup(BASE_URL_VAR).unwrap_or(DEFAULT_BASE_URL);
        let model = lookup(MODEL_VAR).unwrap_or(DEFAULT_MODEL).to_string();

        Self {
            api_key,
            base_url: base_url.to_string(),
            model,
        }
        .with_overrides(None, None)
    }

    /// Apply command-line overrides and validate the result.
    pub fn with_overrides(
        mut self,
        base_url: Option<&str>,
        model: Option<&str>,
    ) -> Result<Self, ConfigError> {
        if let Some(url) = base_url {
            self.base_url = url.to_string();
        }
        if let Some(model) = model {
            self.model = model.to_string();
        }

        self.base_url = self.base_url.trim().trim_end_matches('/').to_string();
        if self.base_url.is_empty() {
            return Err(ConfigError::Missing(BASE_URL_VAR));
        }
        if self.model.trim().is_empty() {
            return Err(ConfigError::Missing(MODEL_VAR));
        }
        Ok(self)
    }
}

/// `~/.soonerai.env`
pub fn default_env_file() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(ENV_FILE_NAME))
}

/// A missing file yields no variables.
fn read_env_file(path: &Path) -> Result<HashMap<String, String>, ConfigError> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "env file not found, using environment only");
        return Ok(HashMap::new());
    }

    let iter = dotenvy::from_path_iter(path).map_err(|e| ConfigError::EnvFile {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    iter.map(|item| {
        item.map_err(|e| ConfigError::EnvFile {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    })
    .collect()
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing {0} (set it in ~/.soonerai.env or the environment)")]
    Missing(&'static str),

    #[error("Could not read {path}: {message}")]
    EnvFile { path: PathBuf, message: String },

    #[error("Could not determine the home directory")]
    NoHomeDir,
}
