//! Document processing pipeline.
//!
//! Drives one document from raw upload to a terminal status in a single
//! attempt: extract (or transcribe) -> annotate -> persist -> snapshot
//! metrics. Every step before the final status write is individually
//! committed; there is no rollback of already-persisted rows and no
//! resumption of a half-finished document.

use std::path::Path;

use thiserror::Error;
use tracing::{error, info};

use crate::extract::{ExtractionError, TextExtractor};
use crate::llm::{AnnotationError, DocumentAnnotation, LlmClient};
use crate::models::{DocumentStatus, DocumentType};
use crate::repository::documents::StatusUpdateError;
use crate::repository::{DbContext, DieselError};
use crate::transcribe::{Transcriber, TranscriberKind, TranscriptionError};

/// Errors that abort a document's processing.
///
/// Any of these marks the document `failed`; annotation degradation is NOT
/// among them (degraded annotations still persist, tagged with a reason).
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("text extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("transcription failed: {0}")]
    Transcription(#[from] TranscriptionError),

    #[error("annotation backend unavailable: {0}")]
    Annotation(#[from] AnnotationError),

    #[error("storage failed: {0}")]
    Storage(#[from] DieselError),

    #[error("status update failed: {0}")]
    Status(#[from] StatusUpdateError),

    #[error("transcript write failed: {0}")]
    TranscriptWrite(#[from] std::io::Error),
}

/// Summary of a completed audio pipeline run.
#[derive(Debug, Clone)]
pub struct ProcessedAudio {
    pub duration_secs: f64,
    pub language: String,
    pub segment_count: usize,
    pub backend: TranscriberKind,
    pub analysis_id: i32,
    pub sentiment_score: i32,
    pub confidence_score: i32,
    pub clarity_score: i32,
}

/// Pipeline orchestrator.
///
/// Uploads are processed synchronously within the calling request; there is
/// no queue, no retry, and no cancellation once a backend call is in
/// flight.
pub struct Pipeline {
    ctx: DbContext,
    llm: LlmClient,
    transcriber: Transcriber,
    extractor: TextExtractor,
}

impl Pipeline {
    pub fn new(ctx: DbContext, llm: LlmClient, transcriber: Transcriber) -> Self {
        Self {
            ctx,
            llm,
            transcriber,
            extractor: TextExtractor::new(),
        }
    }

    pub fn llm(&self) -> &LlmClient {
        &self.llm
    }

    pub fn transcriber(&self) -> &Transcriber {
        &self.transcriber
    }

    /// Process a text document upload to a terminal status.
    pub async fn process_text_document(
        &self,
        document_id: i32,
        file_path: &Path,
        document_type: DocumentType,
        model: Option<&str>,
    ) -> Result<(), PipelineError> {
        match self.run_text(document_id, file_path, document_type, model).await {
            Ok(()) => Ok(()),
            Err(e) => {
                self.mark_failed(document_id, &e).await;
                Err(e)
            }
        }
    }

    /// Process an audio document upload to a terminal status.
    #[allow(clippy::too_many_arguments)]
    pub async fn process_audio_document(
        &self,
        document_id: i32,
        file_path: &Path,
        document_type: DocumentType,
        model: Option<&str>,
        preset: &str,
        language: &str,
        detect_speakers: bool,
    ) -> Result<ProcessedAudio, PipelineError> {
        match self
            .run_audio(
                document_id,
                file_path,
                document_type,
                model,
                preset,
                language,
                detect_speakers,
            )
            .await
        {
            Ok(summary) => Ok(summary),
            Err(e) => {
                self.mark_failed(document_id, &e).await;
                Err(e)
            }
        }
    }

    async fn run_text(
        &self,
        document_id: i32,
        file_path: &Path,
        document_type: DocumentType,
        model: Option<&str>,
    ) -> Result<(), PipelineError> {
        let text = self.extractor.extract(file_path)?;

        self.ctx
            .documents()
            .update_status(document_id, DocumentStatus::Processing)
            .await?;

        let (analysis_id, _) = self
            .annotate_and_persist(document_id, document_type, &text, model)
            .await?;

        self.ctx
            .documents()
            .update_status(document_id, DocumentStatus::Completed)
            .await?;

        info!(
            "Document {} completed (analysis {})",
            document_id, analysis_id
        );
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    async fn run_audio(
        &self,
        document_id: i32,
        file_path: &Path,
        document_type: DocumentType,
        model: Option<&str>,
        preset: &str,
        language: &str,
        detect_speakers: bool,
    ) -> Result<ProcessedAudio, PipelineError> {
        self.ctx
            .documents()
            .update_status(document_id, DocumentStatus::Transcribing)
            .await?;

        let transcription = self
            .transcriber
            .transcribe_preset(file_path, preset, language, detect_speakers)
            .await?;

        let text = if transcription.formatted_text.is_empty() {
            transcription.text.clone()
        } else {
            transcription.formatted_text.clone()
        };

        // Keep the transcript next to the upload for later inspection
        let transcript_path = file_path.with_extension("transcript.txt");
        std::fs::write(&transcript_path, &text)?;

        self.ctx
            .documents()
            .update_status(document_id, DocumentStatus::Analyzing)
            .await?;

        let (analysis_id, annotation) = self
            .annotate_and_persist(document_id, document_type, &text, model)
            .await?;

        self.ctx
            .documents()
            .update_status(document_id, DocumentStatus::Completed)
            .await?;

        info!(
            "Audio document {} completed (analysis {}, {} segments)",
            document_id,
            analysis_id,
            transcription.segments.len()
        );

        Ok(ProcessedAudio {
            duration_secs: transcription.duration_secs,
            language: transcription.language,
            segment_count: transcription.segments.len(),
            backend: transcription.backend,
            analysis_id,
            sentiment_score: annotation.sentiment_score,
            confidence_score: annotation.confidence_score,
            clarity_score: annotation.clarity_score,
        })
    }

    /// Annotate the text at both levels and persist analysis, sections, and
    /// the metrics snapshot. Degraded annotations are persisted like any
    /// other, with their reason recorded.
    async fn annotate_and_persist(
        &self,
        document_id: i32,
        document_type: DocumentType,
        text: &str,
        model: Option<&str>,
    ) -> Result<(i32, DocumentAnnotation), PipelineError> {
        let document_outcome = self.llm.analyze_document(text, model).await?;
        let annotation = document_outcome.value().clone();

        let analysis_id = self
            .ctx
            .analyses()
            .create(document_id, &annotation, document_outcome.degraded_reason())
            .await?;

        let sections = self.llm.analyze_sections(text, model).await?.into_value();
        self.ctx
            .analyses()
            .create_sections(analysis_id, &sections)
            .await?;

        self.ctx
            .metrics()
            .record(
                document_id,
                analysis_id,
                document_type,
                annotation.sentiment_score,
                annotation.confidence_score,
                annotation.clarity_score,
                annotation.readability_score,
                annotation.specificity_score,
            )
            .await?;

        Ok((analysis_id, annotation))
    }

    /// Best-effort terminal failure mark; already-persisted rows stay.
    async fn mark_failed(&self, document_id: i32, cause: &PipelineError) {
        error!("Processing document {} failed: {}", document_id, cause);
        if let Err(e) = self
            .ctx
            .documents()
            .update_status(document_id, DocumentStatus::Failed)
            .await
        {
            error!("Could not mark document {} failed: {}", document_id, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmConfig;
    use crate::transcribe::TranscriptionConfig;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use tempfile::tempdir;

    /// Mock Ollama that answers document and section prompts differently.
    async fn spawn_backend() -> String {
        async fn generate(Json(body): Json<serde_json::Value>) -> Json<serde_json::Value> {
            let prompt = body["prompt"].as_str().unwrap_or_default();
            let response = if prompt.contains("section by section") {
                serde_json::json!({
                    "sections": [
                        {
                            "section_title": "Introduction",
                            "section_type": "introduction",
                            "speaker": null,
                            "original_text": "Test",
                            "sentiment_score": 68,
                            "confidence_score": 60,
                            "clarity_score": 70,
                            "readability_score": 66,
                            "specificity_score": 55,
                            "issues": [],
                            "suggested_revision": "None needed.",
                            "revision_rationale": "Reads clearly."
                        },
                        {
                            "section_title": "Outlook",
                            "section_type": "outlook",
                            "speaker": null,
                            "original_text": "Test",
                            "sentiment_score": 74,
                            "confidence_score": 63,
                            "clarity_score": 69,
                            "readability_score": 64,
                            "specificity_score": 51,
                            "issues": ["Vague guidance"],
                            "suggested_revision": "Add ranges.",
                            "revision_rationale": "Specificity builds trust."
                        }
                    ]
                })
                .to_string()
            } else {
                serde_json::json!({
                    "overall_sentiment": "positive",
                    "sentiment_score": 70,
                    "confidence_score": 65,
                    "clarity_score": 60,
                    "readability_score": 58,
                    "specificity_score": 61,
                    "key_themes": ["testing"],
                    "emotional_tone": {"positive": 55, "negative": 10, "neutral": 35, "confident": 60, "uncertain": 20},
                    "linguistic_metrics": {
                        "avgSentenceLength": 15.0,
                        "complexWordRatio": 0.2,
                        "passiveVoiceRatio": 0.1,
                        "jargonDensity": 0.15,
                        "hedgingLanguage": 0.05
                    }
                })
                .to_string()
            };
            Json(serde_json::json!({"response": response, "done": true}))
        }

        let app = Router::new()
            .route(
                "/api/tags",
                get(|| async { Json(serde_json::json!({"models": [{"name": "llama3.2"}]})) }),
            )
            .route("/api/generate", post(generate));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    async fn setup_pipeline(endpoint: &str) -> (Pipeline, DbContext, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let ctx = DbContext::from_sqlite_path(&dir.path().join("test.db"));
        ctx.init_schema().await.unwrap();

        let llm = LlmClient::new(LlmConfig::default().with_endpoint(endpoint));
        let transcriber = Transcriber::new(TranscriptionConfig::default());
        let pipeline = Pipeline::new(ctx.clone(), llm, transcriber);
        (pipeline, ctx, dir)
    }

    #[tokio::test]
    async fn test_text_document_reaches_completed() {
        let endpoint = spawn_backend().await;
        let (pipeline, ctx, dir) = setup_pipeline(&endpoint).await;

        // 50-character plaintext upload titled "Test"
        let file_path = dir.path().join("test.txt");
        std::fs::write(&file_path, "a".repeat(50)).unwrap();

        let doc_id = ctx
            .documents()
            .create("Test", DocumentType::Other, file_path.to_str())
            .await
            .unwrap();

        pipeline
            .process_text_document(doc_id, &file_path, DocumentType::Other, None)
            .await
            .unwrap();

        let doc = ctx.documents().get(doc_id).await.unwrap().unwrap();
        assert_eq!(doc.status, DocumentStatus::Completed);

        let analysis = ctx
            .analyses()
            .get_by_document(doc_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(analysis.sentiment_score, 70);
        assert!(analysis.degraded_reason.is_none());
        for score in [
            analysis.sentiment_score,
            analysis.confidence_score,
            analysis.clarity_score,
            analysis.readability_score,
            analysis.specificity_score,
        ] {
            assert!((0..=100).contains(&score));
        }

        // Sections persisted in emission order
        let sections = ctx.analyses().sections_for(analysis.id).await.unwrap();
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].section_order, 0);
        assert_eq!(sections[0].section_title, "Introduction");
        assert_eq!(sections[1].section_order, 1);

        // Metrics snapshot recorded
        let history = ctx.metrics().history(10).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].sentiment_score, 70);
        assert_eq!(history[0].analysis_id, analysis.id);
    }

    #[tokio::test]
    async fn test_unreachable_backend_fails_document_without_analysis() {
        // Closed port: backend unreachable
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let (pipeline, ctx, dir) = setup_pipeline(&format!("http://{}", addr)).await;

        let file_path = dir.path().join("test.txt");
        std::fs::write(&file_path, "a".repeat(50)).unwrap();

        let doc_id = ctx
            .documents()
            .create("Test", DocumentType::Other, file_path.to_str())
            .await
            .unwrap();

        let err = pipeline
            .process_text_document(doc_id, &file_path, DocumentType::Other, None)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Annotation(_)));

        let doc = ctx.documents().get(doc_id).await.unwrap().unwrap();
        assert_eq!(doc.status, DocumentStatus::Failed);
        assert!(ctx
            .analyses()
            .get_by_document(doc_id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_extraction_failure_fails_document() {
        let endpoint = spawn_backend().await;
        let (pipeline, ctx, dir) = setup_pipeline(&endpoint).await;

        let missing = dir.path().join("missing.txt");
        let doc_id = ctx
            .documents()
            .create("Test", DocumentType::Other, missing.to_str())
            .await
            .unwrap();

        let err = pipeline
            .process_text_document(doc_id, &missing, DocumentType::Other, None)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Extraction(_)));

        let doc = ctx.documents().get(doc_id).await.unwrap().unwrap();
        assert_eq!(doc.status, DocumentStatus::Failed);
    }

    #[tokio::test]
    async fn test_degraded_annotation_still_completes() {
        // Backend reachable but answers prose instead of JSON
        let app = Router::new()
            .route(
                "/api/generate",
                post(|| async {
                    Json(serde_json::json!({"response": "cannot comply", "done": true}))
                }),
            );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let (pipeline, ctx, dir) = setup_pipeline(&format!("http://{}", addr)).await;

        let file_path = dir.path().join("test.txt");
        std::fs::write(&file_path, "Quarterly update.").unwrap();

        let doc_id = ctx
            .documents()
            .create("Test", DocumentType::Other, file_path.to_str())
            .await
            .unwrap();

        pipeline
            .process_text_document(doc_id, &file_path, DocumentType::Other, None)
            .await
            .unwrap();

        let doc = ctx.documents().get(doc_id).await.unwrap().unwrap();
        assert_eq!(doc.status, DocumentStatus::Completed);

        // Placeholder analysis persisted with the reason recorded
        let analysis = ctx
            .analyses()
            .get_by_document(doc_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(analysis.sentiment_score, 50);
        assert_eq!(analysis.overall_sentiment.as_str(), "neutral");
        assert_eq!(analysis.key_themes, vec!["Analysis unavailable"]);
        assert!(analysis.degraded_reason.unwrap().contains("invalid model output"));

        // Single fallback section marks unavailability explicitly
        let sections = ctx.analyses().sections_for(analysis.id).await.unwrap();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].section_title, "Full Document");
        assert!(sections[0].issues[0].contains("Analysis unavailable"));
    }

    #[tokio::test]
    async fn test_audio_without_backend_is_config_failure() {
        let endpoint = spawn_backend().await;
        let (pipeline, ctx, dir) = setup_pipeline(&endpoint).await;

        // No whisper binary and no API key in the test environment for a
        // nonsense binary path, so the local preset resolves to unavailable.
        let file_path = dir.path().join("call.mp3");
        std::fs::write(&file_path, b"not really audio").unwrap();

        let doc_id = ctx
            .documents()
            .create("Call", DocumentType::EarningsCall, file_path.to_str())
            .await
            .unwrap();

        let transcriber = Transcriber::new(TranscriptionConfig {
            whisper_binary: Some(dir.path().join("no-such-whisper")),
            ..Default::default()
        });
        let pipeline = Pipeline::new(
            ctx.clone(),
            pipeline.llm.clone(),
            transcriber,
        );

        // The balanced preset demands the local backend, which the probe
        // found missing, so this fails as a configuration error.
        let err = pipeline
            .process_audio_document(
                doc_id,
                &file_path,
                DocumentType::EarningsCall,
                None,
                "balanced",
                "en",
                true,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Transcription(_)));

        let doc = ctx.documents().get(doc_id).await.unwrap().unwrap();
        assert_eq!(doc.status, DocumentStatus::Failed);
    }
}
