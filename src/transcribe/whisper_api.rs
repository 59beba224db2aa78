//! Remote Whisper transcription via the OpenAI audio API.
//!
//! Requires the OPENAI_API_KEY environment variable. The file is uploaded
//! as multipart form data and the verbose JSON response carries the same
//! logical shape as local whisper output.

use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::backend::{
    TranscriberKind, Transcript, TranscriptSegment, TranscriptionBackend, TranscriptionError,
};

const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Remote OpenAI Whisper API backend.
pub struct WhisperApiBackend {
    endpoint: String,
    client: reqwest::Client,
}

impl WhisperApiBackend {
    pub fn new(endpoint: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(600))
            .build()
            .expect("Failed to create HTTP client");
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            client,
        }
    }

    fn api_key(&self) -> Option<String> {
        std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty())
    }
}

/// Verbose JSON response from the transcription endpoint.
#[derive(Debug, Deserialize)]
struct VerboseTranscription {
    text: String,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    segments: Vec<VerboseSegment>,
}

#[derive(Debug, Deserialize)]
struct VerboseSegment {
    #[serde(default)]
    start: f64,
    #[serde(default)]
    end: f64,
    #[serde(default)]
    text: String,
}

#[async_trait]
impl TranscriptionBackend for WhisperApiBackend {
    fn kind(&self) -> TranscriberKind {
        TranscriberKind::WhisperApi
    }

    fn is_available(&self) -> bool {
        self.api_key().is_some()
    }

    fn availability_hint(&self) -> String {
        format!("Set {} to use the remote Whisper API", API_KEY_ENV)
    }

    async fn transcribe(
        &self,
        path: &Path,
        language: &str,
        model: &str,
    ) -> Result<Transcript, TranscriptionError> {
        let api_key = self.api_key().ok_or_else(|| {
            TranscriptionError::BackendNotAvailable(self.availability_hint())
        })?;

        let bytes = tokio::fs::read(path).await?;
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("audio")
            .to_string();
        let mime = mime_guess::from_path(path).first_or_octet_stream();

        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(filename)
            .mime_str(mime.as_ref())
            .map_err(|e| TranscriptionError::Api(e.to_string()))?;

        let form = reqwest::multipart::Form::new()
            .text("model", model.to_string())
            .text("language", language.to_string())
            .text("response_format", "verbose_json")
            .part("file", part);

        debug!("Uploading {} for remote transcription", path.display());
        let url = format!("{}/audio/transcriptions", self.endpoint);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| TranscriptionError::Api(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(TranscriptionError::Api(format!("HTTP {}: {}", status, body)));
        }

        let verbose: VerboseTranscription = resp
            .json()
            .await
            .map_err(|e| TranscriptionError::Api(format!("unreadable response: {}", e)))?;

        let segments = verbose
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
            text: verbose.text,
            language: verbose.language.unwrap_or_else(|| language.to_string()),
            segments,
            backend: TranscriberKind::WhisperApi,
            model: model.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_verbose_response() {
        let raw = r#"{
            "task": "transcribe",
            "language": "english",
            "duration": 8.47,
            "text": "Good morning everyone.",
            "segments": [
                {"id": 0, "start": 0.0, "end": 3.4, "text": "Good morning everyone.",
                 "avg_logprob": -0.28, "no_speech_prob": 0.01}
            ]
        }"#;
        let parsed: VerboseTranscription = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.text, "Good morning everyone.");
        assert_eq!(parsed.segments.len(), 1);
        assert_eq!(parsed.segments[0].end, 3.4);
    }

    #[test]
    fn test_endpoint_trailing_slash_trimmed() {
        let backend = WhisperApiBackend::new("https://api.openai.com/v1/");
        assert_eq!(backend.endpoint, "https://api.openai.com/v1");
    }
}
