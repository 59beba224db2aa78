//! Configuration management for IRSight.
//!
//! Settings are loaded from an optional TOML file and passed explicitly into
//! each component at construction; nothing reads configuration from module
//! globals at call time.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::llm::LlmConfig;
use crate::repository::DbContext;
use crate::transcribe::TranscriptionConfig;

/// Database filename inside the data directory.
pub const DEFAULT_DATABASE_FILENAME: &str = "irsight.db";

/// Subdirectory of the data directory for uploaded files.
const UPLOADS_SUBDIR: &str = "uploads";

/// Upload size limits in megabytes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadLimits {
    /// Maximum text document size (pdf/txt/doc/docx).
    #[serde(default = "default_max_document_mb")]
    pub max_document_mb: u64,
    /// Maximum audio file size.
    #[serde(default = "default_max_audio_mb")]
    pub max_audio_mb: u64,
}

fn default_max_document_mb() -> u64 {
    10
}
fn default_max_audio_mb() -> u64 {
    100
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_document_mb: default_max_document_mb(),
            max_audio_mb: default_max_audio_mb(),
        }
    }
}

impl UploadLimits {
    pub fn max_document_bytes(&self) -> u64 {
        self.max_document_mb * 1024 * 1024
    }

    pub fn max_audio_bytes(&self) -> u64 {
        self.max_audio_mb * 1024 * 1024
    }
}

/// Application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base data directory.
    pub data_dir: PathBuf,
    /// Database filename inside the data directory.
    pub database_filename: String,
    /// Database URL (overrides data_dir/database_filename if set).
    /// Supports sqlite: URLs. Set via DATABASE_URL env var or config.
    pub database_url: Option<String>,
    /// Directory for storing uploaded files.
    pub uploads_dir: PathBuf,
    /// LLM annotation backend configuration.
    pub llm: LlmConfig,
    /// Audio transcription configuration.
    pub transcription: TranscriptionConfig,
    /// Upload size limits.
    pub limits: UploadLimits,
}

impl Default for Settings {
    fn default() -> Self {
        // Per-user data dir, falling back to home then cwd
        let data_dir = dirs::data_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("irsight");

        Self {
            uploads_dir: data_dir.join(UPLOADS_SUBDIR),
            data_dir,
            database_filename: DEFAULT_DATABASE_FILENAME.to_string(),
            database_url: None,
            llm: LlmConfig::default(),
            transcription: TranscriptionConfig::default(),
            limits: UploadLimits::default(),
        }
    }
}

impl Settings {
    /// Create settings with a custom data directory.
    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self {
            uploads_dir: data_dir.join(UPLOADS_SUBDIR),
            data_dir,
            ..Default::default()
        }
    }

    /// Load settings from a TOML file, or defaults if no file is found.
    ///
    /// Lookup order: explicit path, `IRSIGHT_CONFIG` env var, `./irsight.toml`,
    /// `~/.config/irsight/config.toml`. Environment variables `DATABASE_URL`
    /// and `OLLAMA_URL` override the corresponding file values.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let candidate = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var("IRSIGHT_CONFIG").ok().map(PathBuf::from))
            .or_else(|| {
                let local = PathBuf::from("irsight.toml");
                local.exists().then_some(local)
            })
            .or_else(|| {
                dirs::config_dir()
                    .map(|d| d.join("irsight").join("config.toml"))
                    .filter(|p| p.exists())
            });

        let mut settings = match candidate {
            Some(p) => {
                let raw = fs::read_to_string(&p)
                    .map_err(|e| anyhow::anyhow!("failed to read config {}: {}", p.display(), e))?;
                let parsed: Settings = toml::from_str(&raw)
                    .map_err(|e| anyhow::anyhow!("invalid config {}: {}", p.display(), e))?;
                tracing::info!("Loaded config from {}", p.display());
                parsed
            }
            None => Settings::default(),
        };

        if let Ok(url) = std::env::var("DATABASE_URL") {
            settings.database_url = Some(url);
        }
        if let Ok(endpoint) = std::env::var("OLLAMA_URL") {
            settings.llm.endpoint = endpoint;
        }

        Ok(settings)
    }

    /// Point the data and uploads directories at a new base directory.
    pub fn set_data_dir(&mut self, data_dir: PathBuf) {
        self.uploads_dir = data_dir.join(UPLOADS_SUBDIR);
        self.data_dir = data_dir;
    }

    /// Get the database URL, constructing from path if not explicitly set.
    pub fn database_url(&self) -> String {
        match &self.database_url {
            Some(url) => url.clone(),
            None => self
                .data_dir
                .join(&self.database_filename)
                .display()
                .to_string(),
        }
    }

    /// Create a database context from these settings.
    pub fn create_db_context(&self) -> DbContext {
        DbContext::from_url(&self.database_url())
    }

    /// Create the data and uploads directories if missing.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.data_dir)?;
        fs::create_dir_all(&self.uploads_dir)?;
        Ok(())
    }
}
