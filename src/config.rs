// src/config.rs

//! Run-time settings: time budget, user agents and the technology vocabulary.

use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

use crate::core::knowledge_base::{Vocabulary, VocabularyEntry};

/// Per-probe time budget when none is given.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Browser identity sent by the firewall lookup; some filters only answer
/// what looks like a desktop browser.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/58.0.3029.110 Safari/537.3";

/// File looked up in the config directory when no vocabulary path is given.
pub const VOCABULARY_FILE: &str = "vocabulary.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read vocabulary file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid vocabulary file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("vocabulary file {0} defines no keywords")]
    Empty(PathBuf),
}

#[derive(Debug, Clone)]
pub struct ReconConfig {
    pub timeout: Duration,
    /// Identity for ordinary fetches.
    pub user_agent: String,
    pub browser_user_agent: String,
    pub vocabulary: Vocabulary,
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            browser_user_agent: BROWSER_USER_AGENT.to_string(),
            vocabulary: Vocabulary::builtin(),
        }
    }
}

impl ReconConfig {
    /// Builds the configuration from command-line overrides.
    ///
    /// The vocabulary comes from `vocabulary_path` if given, else from
    /// `vocabulary.json` in the config directory if it exists, else the
    /// built-in table.
    pub fn load(timeout_secs: u64, vocabulary_path: Option<&Path>) -> Result<Self, ConfigError> {
        let vocabulary = match vocabulary_path.map(Path::to_path_buf).or_else(default_vocabulary_path) {
            Some(path) => load_vocabulary(&path)?,
            None => {
                debug!("Using built-in vocabulary.");
                Vocabulary::builtin()
            }
        };

        Ok(Self {
            timeout: Duration::from_secs(timeout_secs),
            vocabulary,
            ..Self::default()
        })
    }
}

pub fn project_directory() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "site-recon", env!("CARGO_PKG_NAME"))
}

/// `vocabulary.json` in the config directory, if present.
fn default_vocabulary_path() -> Option<PathBuf> {
    let path = project_directory()?.config_dir().join(VOCABULARY_FILE);
    path.is_file().then_some(path)
}

/// Reads a JSON array of `{"keyword": ..., "category": ...}` rows.
pub fn load_vocabulary(path: &Path) -> Result<Vocabulary, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let entries: Vec<VocabularyEntry> = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let vocabulary = Vocabulary::from_entries(entries);
    if vocabulary.is_empty() {
        return Err(ConfigError::Empty(path.to_path_buf()));
    }
    info!(path = %path.display(), keywords = vocabulary.len(), "Loaded vocabulary file.");
    Ok(vocabulary)
}
