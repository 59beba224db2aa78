//! Ollama API client for annotation calls.
//!
//! Connection-level failures surface as errors; a reachable backend that
//! produces unusable output degrades to fixed fallback payloads instead.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use super::prompts;
use super::types::{
    excerpt, AnnotationOutcome, DocumentAnnotation, SectionAnnotation, SectionsEnvelope,
};

/// Configuration for the LLM annotation client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Ollama API endpoint (default: http://localhost:11434)
    pub endpoint: String,
    /// Default model when the caller doesn't pick one.
    pub model: String,
    /// Sampling temperature; kept low for reproducible scoring.
    pub temperature: f32,
    /// Request timeout in seconds; generous to tolerate slow local inference.
    pub timeout_secs: u64,
    /// Maximum characters of document content sent per prompt.
    pub max_content_chars: usize,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:11434".to_string(),
            model: "llama3.2".to_string(),
            temperature: 0.3,
            timeout_secs: 120,
            max_content_chars: 8000,
        }
    }
}

impl LlmConfig {
    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }
}

/// Errors that can occur during annotation calls.
#[derive(Debug, Error)]
pub enum AnnotationError {
    /// The backend could not be reached at all.
    #[error("cannot connect to Ollama at {endpoint}: {message}")]
    Connection { endpoint: String, message: String },

    /// The backend answered with an error status.
    #[error("Ollama API error: {0}")]
    Api(String),

    /// The backend's response envelope could not be decoded.
    #[error("failed to decode Ollama response: {0}")]
    Parse(String),
}

/// Backend availability snapshot, as reported to clients.
#[derive(Debug, Clone, Serialize)]
pub struct BackendStatus {
    pub available: bool,
    pub models: Vec<String>,
    pub model_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Ollama API request format.
#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    stream: bool,
    options: OllamaOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<String>,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
}

/// Ollama API response format.
#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
    #[allow(dead_code)]
    #[serde(default)]
    done: bool,
}

/// LLM client for document annotation.
#[derive(Clone)]
pub struct LlmClient {
    config: LlmConfig,
    client: Client,
}

impl LlmClient {
    /// Create a new LLM client with the given configuration.
    pub fn new(config: LlmConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    /// Get the config.
    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    /// Check if the backend is reachable.
    pub async fn is_available(&self) -> bool {
        let url = format!("{}/api/tags", self.config.endpoint);
        match self.client.get(&url).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    /// Availability snapshot with the installed model list.
    pub async fn status(&self) -> BackendStatus {
        match self.list_models().await {
            Ok(models) => BackendStatus {
                available: true,
                model_count: models.len(),
                models,
                error: None,
            },
            Err(e) => BackendStatus {
                available: false,
                models: Vec::new(),
                model_count: 0,
                error: Some(e.to_string()),
            },
        }
    }

    /// List installed models.
    pub async fn list_models(&self) -> Result<Vec<String>, AnnotationError> {
        let url = format!("{}/api/tags", self.config.endpoint);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.connection_error(e))?;

        if !resp.status().is_success() {
            return Err(AnnotationError::Api(format!("HTTP {}", resp.status())));
        }

        #[derive(Deserialize)]
        struct TagsResponse {
            models: Vec<ModelInfo>,
        }

        #[derive(Deserialize)]
        struct ModelInfo {
            name: String,
        }

        let tags: TagsResponse = resp
            .json()
            .await
            .map_err(|e| AnnotationError::Parse(e.to_string()))?;

        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    /// Round-trip a trivial prompt and check the output parses as JSON.
    pub async fn test_model(&self, model: &str) -> Result<(), AnnotationError> {
        let response = self
            .generate(
                model,
                "Respond with a JSON object containing a single field 'status' with value 'ok'",
                None,
                0.1,
            )
            .await?;

        serde_json::from_str::<serde_json::Value>(&response)
            .map_err(|e| AnnotationError::Parse(format!("model output is not JSON: {}", e)))?;

        Ok(())
    }

    /// Analyze a whole document.
    ///
    /// Returns `Err` only when the backend is unreachable. A reachable
    /// backend that misbehaves yields `Degraded` with the fixed neutral
    /// payload and the reason.
    pub async fn analyze_document(
        &self,
        text: &str,
        model: Option<&str>,
    ) -> Result<AnnotationOutcome<DocumentAnnotation>, AnnotationError> {
        let model = model.unwrap_or(&self.config.model);
        let prompt = prompts::DOCUMENT_ANALYSIS_PROMPT
            .replace("{content}", excerpt(text, self.config.max_content_chars));

        debug!("Requesting document analysis from {}", model);
        let response = match self
            .generate(
                model,
                &prompt,
                Some(prompts::DOCUMENT_SYSTEM_PROMPT),
                self.config.temperature,
            )
            .await
        {
            Ok(response) => response,
            Err(e @ AnnotationError::Connection { .. }) => return Err(e),
            Err(e) => {
                warn!("Document analysis degraded: {}", e);
                return Ok(AnnotationOutcome::Degraded {
                    value: DocumentAnnotation::unavailable(),
                    reason: e.to_string(),
                });
            }
        };

        match serde_json::from_str::<DocumentAnnotation>(&response) {
            Ok(annotation) => Ok(AnnotationOutcome::Parsed(annotation)),
            Err(e) => {
                warn!(
                    "Document analysis returned unparseable output: {} (first 200 chars: {})",
                    e,
                    excerpt(&response, 200)
                );
                Ok(AnnotationOutcome::Degraded {
                    value: DocumentAnnotation::unavailable(),
                    reason: format!("invalid model output: {}", e),
                })
            }
        }
    }

    /// Analyze a document section by section.
    ///
    /// Same failure contract as [`analyze_document`](Self::analyze_document);
    /// the degraded payload is a single "Full Document" section carrying an
    /// explicit unavailable-analysis issue.
    pub async fn analyze_sections(
        &self,
        text: &str,
        model: Option<&str>,
    ) -> Result<AnnotationOutcome<Vec<SectionAnnotation>>, AnnotationError> {
        let model = model.unwrap_or(&self.config.model);
        let prompt = prompts::SECTION_ANALYSIS_PROMPT
            .replace("{content}", excerpt(text, self.config.max_content_chars));

        debug!("Requesting section analysis from {}", model);
        let response = match self
            .generate(
                model,
                &prompt,
                Some(prompts::SECTION_SYSTEM_PROMPT),
                self.config.temperature,
            )
            .await
        {
            Ok(response) => response,
            Err(e @ AnnotationError::Connection { .. }) => return Err(e),
            Err(e) => {
                warn!("Section analysis degraded: {}", e);
                return Ok(AnnotationOutcome::Degraded {
                    value: vec![SectionAnnotation::unavailable_document(text)],
                    reason: e.to_string(),
                });
            }
        };

        match serde_json::from_str::<SectionsEnvelope>(&response) {
            Ok(envelope) => Ok(AnnotationOutcome::Parsed(envelope.sections)),
            Err(e) => {
                warn!(
                    "Section analysis returned unparseable output: {} (first 200 chars: {})",
                    e,
                    excerpt(&response, 200)
                );
                Ok(AnnotationOutcome::Degraded {
                    value: vec![SectionAnnotation::unavailable_document(text)],
                    reason: format!("invalid model output: {}", e),
                })
            }
        }
    }

    /// Call the Ollama generate endpoint with JSON output format.
    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        system: Option<&str>,
        temperature: f32,
    ) -> Result<String, AnnotationError> {
        let request = OllamaRequest {
            model: model.to_string(),
            prompt: prompt.to_string(),
            system: system.map(String::from),
            stream: false,
            options: OllamaOptions { temperature },
            format: Some("json".to_string()),
        };

        let url = format!("{}/api/generate", self.config.endpoint);
        let resp = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.connection_error(e))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(AnnotationError::Api(format!("HTTP {}: {}", status, body)));
        }

        let ollama_resp: OllamaResponse = resp
            .json()
            .await
            .map_err(|e| AnnotationError::Parse(e.to_string()))?;

        Ok(ollama_resp.response)
    }

    fn connection_error(&self, e: reqwest::Error) -> AnnotationError {
        AnnotationError::Connection {
            endpoint: self.config.endpoint.clone(),
            message: e.to_string(),
        }
    }
}

/// A model suggestion shown in the models listing.
#[derive(Debug, Clone, Serialize)]
pub struct ModelRecommendation {
    pub name: &'static str,
    pub size: &'static str,
    pub description: &'static str,
    pub recommended: bool,
}

/// Models known to work well for IR analysis.
pub fn recommended_models() -> &'static [ModelRecommendation] {
    &[
        ModelRecommendation {
            name: "llama3.2",
            size: "3B",
            description: "Fast and efficient, good for quick analysis",
            recommended: true,
        },
        ModelRecommendation {
            name: "llama3.1",
            size: "8B",
            description: "Balanced performance and quality",
            recommended: true,
        },
        ModelRecommendation {
            name: "mistral",
            size: "7B",
            description: "Excellent for analytical tasks",
            recommended: true,
        },
        ModelRecommendation {
            name: "phi3",
            size: "3.8B",
            description: "Compact and fast",
            recommended: false,
        },
        ModelRecommendation {
            name: "gemma2",
            size: "9B",
            description: "High quality analysis",
            recommended: false,
        },
    ]
}
