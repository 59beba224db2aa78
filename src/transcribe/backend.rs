//! Transcription backend abstraction.
//!
//! Two backends are supported: the local `whisper` CLI and a remote
//! OpenAI-compatible Whisper API. Which ones are usable is decided once at
//! startup by a capability probe; call sites resolve a selection against
//! that probe instead of checking dependencies ad hoc.

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from transcription backends.
#[derive(Debug, Error)]
pub enum TranscriptionError {
    /// The selected backend's dependency is missing. This is a
    /// configuration error, fatal at the call boundary; there is no
    /// per-call recovery.
    #[error("Transcription backend not available: {0}")]
    BackendNotAvailable(String),

    #[error("Transcription failed: {0}")]
    TranscriptionFailed(String),

    #[error("Transcription API error: {0}")]
    Api(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Available transcription backend kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TranscriberKind {
    /// Local whisper CLI (openai-whisper package).
    WhisperLocal,
    /// Remote OpenAI Whisper API.
    WhisperApi,
}

impl TranscriberKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WhisperLocal => "whisper-local",
            Self::WhisperApi => "whisper-api",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "whisper-local" => Some(Self::WhisperLocal),
            "whisper-api" => Some(Self::WhisperApi),
            _ => None,
        }
    }
}

impl std::fmt::Display for TranscriberKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Backend selection: a specific backend, or `auto`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendSelection {
    /// Prefer local if available, fall back to remote.
    Auto,
    Explicit(TranscriberKind),
}

impl BackendSelection {
    /// Parse a selection string: "auto", "whisper-local", or "whisper-api".
    pub fn parse(s: &str) -> Option<Self> {
        if s == "auto" {
            return Some(Self::Auto);
        }
        TranscriberKind::from_str(s).map(Self::Explicit)
    }
}

/// A timestamped transcript segment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub start: f64,
    pub end: f64,
    pub text: String,
    /// Assigned by the silence-gap heuristic, not by the backend.
    #[serde(default)]
    pub speaker: Option<String>,
}

/// Raw transcription result from a backend.
#[derive(Debug, Clone, Serialize)]
pub struct Transcript {
    pub text: String,
    pub language: String,
    pub segments: Vec<TranscriptSegment>,
    pub backend: TranscriberKind,
    pub model: String,
}

impl Transcript {
    /// Audio duration implied by the last segment's end timestamp.
    pub fn duration_secs(&self) -> f64 {
        self.segments.last().map(|s| s.end).unwrap_or(0.0)
    }
}

/// Trait for transcription backends.
#[async_trait]
pub trait TranscriptionBackend: Send + Sync {
    /// Which backend this is.
    fn kind(&self) -> TranscriberKind;

    /// Check if this backend's dependency is present.
    fn is_available(&self) -> bool;

    /// What's needed to make this backend available.
    fn availability_hint(&self) -> String;

    /// Transcribe an audio file into timestamped segments.
    async fn transcribe(
        &self,
        path: &Path,
        language: &str,
        model: &str,
    ) -> Result<Transcript, TranscriptionError>;
}
