//! Audio transcription: pluggable whisper backends, capability probing,
//! presets, and heuristic speaker segmentation.

mod backend;
mod presets;
mod speakers;
mod whisper_api;
mod whisper_local;

pub use backend::{
    BackendSelection, TranscriberKind, Transcript, TranscriptSegment, TranscriptionBackend,
    TranscriptionError,
};
pub use presets::{TranscriptionPreset, PRESETS};
pub use speakers::{assign_speakers, format_with_speakers, SPEAKER_GAP_SECS};
pub use whisper_api::WhisperApiBackend;
pub use whisper_local::WhisperLocalBackend;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Transcription configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionConfig {
    /// Default for callers that don't choose: a preset name ("balanced") or
    /// a bare backend selection ("auto", "whisper-local", "whisper-api").
    pub default_preset: String,
    /// Default whisper model size when no preset picks one.
    pub model: String,
    /// Default language hint.
    pub language: String,
    /// Path to the whisper binary (if not in PATH).
    pub whisper_binary: Option<PathBuf>,
    /// OpenAI-compatible API base for remote transcription.
    pub api_endpoint: String,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            default_preset: "balanced".to_string(),
            model: "base".to_string(),
            language: "en".to_string(),
            whisper_binary: None,
            api_endpoint: "https://api.openai.com/v1".to_string(),
        }
    }
}

/// Which backends the startup probe found usable.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TranscriberCapabilities {
    pub local: bool,
    pub remote: bool,
}

impl TranscriberCapabilities {
    /// Resolve a selection against the probed capabilities.
    pub fn resolve(&self, selection: BackendSelection) -> Result<TranscriberKind, TranscriptionError> {
        match selection {
            BackendSelection::Auto => {
                if self.local {
                    Ok(TranscriberKind::WhisperLocal)
                } else if self.remote {
                    Ok(TranscriberKind::WhisperApi)
                } else {
                    Err(TranscriptionError::BackendNotAvailable(
                        "no transcription backend available: install whisper \
                         (pip install openai-whisper) or set OPENAI_API_KEY"
                            .to_string(),
                    ))
                }
            }
            BackendSelection::Explicit(kind) => {
                let available = match kind {
                    TranscriberKind::WhisperLocal => self.local,
                    TranscriberKind::WhisperApi => self.remote,
                };
                if available {
                    Ok(kind)
                } else {
                    Err(TranscriptionError::BackendNotAvailable(match kind {
                        TranscriberKind::WhisperLocal => {
                            "Install whisper: pip install openai-whisper".to_string()
                        }
                        TranscriberKind::WhisperApi => {
                            "Set OPENAI_API_KEY to use the remote Whisper API".to_string()
                        }
                    }))
                }
            }
        }
    }
}

/// A finished transcription with both raw and speaker-formatted text.
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptionOutput {
    pub text: String,
    pub formatted_text: String,
    pub language: String,
    pub duration_secs: f64,
    pub segments: Vec<TranscriptSegment>,
    pub backend: TranscriberKind,
    pub model: String,
}

/// Transcription service holding both backends and the capability probe.
pub struct Transcriber {
    config: TranscriptionConfig,
    local: WhisperLocalBackend,
    remote: WhisperApiBackend,
    capabilities: TranscriberCapabilities,
}

impl Transcriber {
    /// Construct the service and probe backend availability once.
    pub fn new(config: TranscriptionConfig) -> Self {
        let local = WhisperLocalBackend::new(config.whisper_binary.clone());
        let remote = WhisperApiBackend::new(&config.api_endpoint);
        let capabilities = TranscriberCapabilities {
            local: local.is_available(),
            remote: remote.is_available(),
        };
        Self {
            config,
            local,
            remote,
            capabilities,
        }
    }

    pub fn capabilities(&self) -> TranscriberCapabilities {
        self.capabilities
    }

    pub fn config(&self) -> &TranscriptionConfig {
        &self.config
    }

    fn backend_for(&self, kind: TranscriberKind) -> &dyn TranscriptionBackend {
        match kind {
            TranscriberKind::WhisperLocal => &self.local,
            TranscriberKind::WhisperApi => &self.remote,
        }
    }

    /// Transcribe using a named preset.
    ///
    /// Bare backend selections ("auto", "whisper-local", "whisper-api") are
    /// also accepted and use the configured default model; other unknown
    /// names fall back to `balanced`.
    pub async fn transcribe_preset(
        &self,
        path: &Path,
        preset_name: &str,
        language: &str,
        detect_speakers: bool,
    ) -> Result<TranscriptionOutput, TranscriptionError> {
        if let Some(selection) = BackendSelection::parse(preset_name) {
            return self
                .transcribe(path, selection, language, &self.config.model, detect_speakers)
                .await;
        }

        let preset = presets::get_or_balanced(preset_name);
        self.transcribe(
            path,
            BackendSelection::Explicit(preset.backend),
            language,
            preset.model,
            detect_speakers,
        )
        .await
    }

    /// Transcribe with an explicit or auto backend selection.
    pub async fn transcribe(
        &self,
        path: &Path,
        selection: BackendSelection,
        language: &str,
        model: &str,
        detect_speakers: bool,
    ) -> Result<TranscriptionOutput, TranscriptionError> {
        let kind = self.capabilities.resolve(selection)?;
        let language = if language.is_empty() {
            &self.config.language
        } else {
            language
        };

        let transcript = self.backend_for(kind).transcribe(path, language, model).await?;
        let duration_secs = transcript.duration_secs();

        let mut segments = transcript.segments;
        let formatted_text = if detect_speakers && !segments.is_empty() {
            speakers::assign_speakers(&mut segments);
            speakers::format_with_speakers(&segments)
        } else {
            transcript.text.clone()
        };

        Ok(TranscriptionOutput {
            text: transcript.text,
            formatted_text,
            language: transcript.language,
            duration_secs,
            segments,
            backend: transcript.backend,
            model: transcript.model,
        })
    }
}
