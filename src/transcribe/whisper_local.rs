//! Local whisper CLI transcription backend.
//!
//! Runs the whisper CLI (from the openai-whisper Python package) with JSON
//! output and parses the segment timestamps from the result file.

use std::path::{Path, PathBuf};
use std::process::Command;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::backend::{
    TranscriberKind, Transcript, TranscriptSegment, TranscriptionBackend, TranscriptionError,
};

/// Local whisper CLI backend.
pub struct WhisperLocalBackend {
    /// Path to the whisper binary (if not in PATH).
    binary_path: Option<PathBuf>,
}

impl WhisperLocalBackend {
    pub fn new(binary_path: Option<PathBuf>) -> Self {
        Self { binary_path }
    }

    fn binary(&self) -> &str {
        self.binary_path
            .as_ref()
            .and_then(|p| p.to_str())
            .unwrap_or("whisper")
    }
}

/// Whisper's JSON output file shape.
#[derive(Debug, Deserialize)]
struct WhisperOutput {
    text: String,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    segments: Vec<WhisperOutputSegment>,
}

#[derive(Debug, Deserialize)]
struct WhisperOutputSegment {
    start: f64,
    end: f64,
    text: String,
}

#[async_trait]
impl TranscriptionBackend for WhisperLocalBackend {
    fn kind(&self) -> TranscriberKind {
        TranscriberKind::WhisperLocal
    }

    fn is_available(&self) -> bool {
        which::which(self.binary()).is_ok()
    }

    fn availability_hint(&self) -> String {
        "Install whisper: pip install openai-whisper".to_string()
    }

    async fn transcribe(
        &self,
        path: &Path,
        language: &str,
        model: &str,
    ) -> Result<Transcript, TranscriptionError> {
        let binary = self.binary().to_string();
        let path = path.to_path_buf();
        let language = language.to_string();
        let model = model.to_string();

        // The whisper CLI blocks for the whole inference; run it off the
        // async runtime.
        let model_for_result = model.clone();
        let output = tokio::task::spawn_blocking(move || -> Result<WhisperOutput, TranscriptionError> {
            let temp_dir = tempfile::TempDir::new()?;

            debug!("Transcribing {} with whisper model {}", path.display(), model);
            let mut cmd = Command::new(&binary);
            cmd.arg(&path)
                .args(["--model", model.as_str()])
                .args(["--output_format", "json"])
                .arg("--output_dir")
                .arg(temp_dir.path());
            if !language.is_empty() {
                cmd.args(["--language", language.as_str()]);
            }

            let output = cmd.output().map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    TranscriptionError::BackendNotAvailable(
                        "whisper binary not found in PATH".to_string(),
                    )
                } else {
                    TranscriptionError::Io(e)
                }
            })?;

            if !output.status.success() {
                let stderr = String::from_utf8_lossy(&output.stderr);
                return Err(TranscriptionError::TranscriptionFailed(format!(
                    "whisper failed: {}",
                    stderr.lines().take(5).collect::<Vec<_>>().join("\n")
                )));
            }

            // Whisper names the output after the input file
            let stem = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("output");
            let result_file = temp_dir.path().join(format!("{}.json", stem));

            let raw = if result_file.exists() {
                std::fs::read_to_string(&result_file)?
            } else {
                // Fall back to any .json file in the output directory
                find_json_output(temp_dir.path()).ok_or_else(|| {
                    TranscriptionError::TranscriptionFailed(
                        "no transcript file found in output".to_string(),
                    )
                })?
            };

            serde_json::from_str(&raw).map_err(|e| {
                TranscriptionError::TranscriptionFailed(format!(
                    "unreadable whisper output: {}",
                    e
                ))
            })
        })
        .await
        .map_err(|e| TranscriptionError::TranscriptionFailed(e.to_string()))??;

        let segments = output
            .segments
            .into_iter()
            .map(|s| TranscriptSegment {
                start: s.start,
                end: s.end,
                text: s.text,
                speaker: None,
            })
            .collect();

        Ok(Transcript {
            text: output.text,
            language: output.language.unwrap_or_else(|| "en".to_string()),
            segments,
            backend: TranscriberKind::WhisperLocal,
            model: model_for_result,
        })
    }
}

fn find_json_output(dir: &Path) -> Option<String> {
    for entry in std::fs::read_dir(dir).ok()?.flatten() {
        if entry.path().extension().map(|e| e == "json").unwrap_or(false) {
            if let Ok(content) = std::fs::read_to_string(entry.path()) {
                return Some(content);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_whisper_output() {
        let raw = r#"{
            "text": " Good morning everyone. Thank you for joining.",
            "language": "en",
            "segments": [
                {"id": 0, "seek": 0, "start": 0.0, "end": 3.2, "text": " Good morning everyone.", "tokens": [], "temperature": 0.0},
                {"id": 1, "seek": 0, "start": 3.2, "end": 5.8, "text": " Thank you for joining.", "tokens": [], "temperature": 0.0}
            ]
        }"#;
        let parsed: WhisperOutput = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.segments.len(), 2);
        assert_eq!(parsed.segments[1].start, 3.2);
        assert_eq!(parsed.language.as_deref(), Some("en"));
    }

    #[test]
    fn test_default_binary_name() {
        let backend = WhisperLocalBackend::new(None);
        assert_eq!(backend.binary(), "whisper");

        let backend = WhisperLocalBackend::new(Some(PathBuf::from("/opt/whisper/bin/whisper")));
        assert_eq!(backend.binary(), "/opt/whisper/bin/whisper");
    }
}
