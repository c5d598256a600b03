//! doc-audio configuration management.

use crate::audio::OutputFormat;
use crate::pipeline::{FailurePolicy, RetryPolicy};
use crate::source::{DEFAULT_USER_AGENT, LETTERS_INDEX_URL};
use crate::text::DEFAULT_MAX_CHUNK_SIZE;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tts_client::Accent;

const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_INITIAL_BACKOFF_SECS: u64 = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocAudioConfig {
    /// Narrator accent
    #[serde(default)]
    pub accent: Accent,

    /// Maximum characters per synthesized chunk
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Where audiobooks are written. None means the current directory.
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// Output container
    #[serde(default)]
    pub format: OutputFormat,

    /// What to do when a chunk fails for a reason other than rate limiting
    #[serde(default)]
    pub on_error: FailurePolicy,

    /// Synthesis attempts per chunk while rate limited
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// First backoff wait; doubled after each rate-limited attempt
    #[serde(default = "default_initial_backoff_secs")]
    pub initial_backoff_secs: u64,

    /// FFmpeg binary. None means `ffmpeg` on PATH.
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,

    #[serde(default = "default_letters_index_url")]
    pub letters_index_url: String,

    /// User-Agent sent when fetching pages
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_chunk_size() -> usize {
    DEFAULT_MAX_CHUNK_SIZE
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

fn default_initial_backoff_secs() -> u64 {
    DEFAULT_INITIAL_BACKOFF_SECS
}

fn default_letters_index_url() -> String {
    LETTERS_INDEX_URL.to_string()
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

impl Default for DocAudioConfig {
    fn default() -> Self {
        Self {
            accent: Accent::default(),
            chunk_size: default_chunk_size(),
            output_dir: None,
            format: OutputFormat::default(),
            on_error: FailurePolicy::default(),
            max_attempts: default_max_attempts(),
            initial_backoff_secs: default_initial_backoff_secs(),
            ffmpeg_path: None,
            letters_index_url: default_letters_index_url(),
            user_agent: default_user_agent(),
        }
    }
}

impl DocAudioConfig {
    /// Get the config file path: ~/.config/cli-programs/doc-audio.toml
    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home
            .join(".config")
            .join("cli-programs")
            .join("doc-audio.toml"))
    }

    /// Load config from file, returning default if file doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: DocAudioConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;
        fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
    }

    /// Retry policy built from the backoff settings.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            initial_delay: Duration::from_secs(self.initial_backoff_secs),
            ..RetryPolicy::default()
        }
    }

    /// Output directory, falling back to the current directory.
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}
