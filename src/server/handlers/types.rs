//! Response shapes and shared helpers for API handlers.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::models::{Analysis, Comparison, Document, MetricsSnapshot, Section};

/// JSON error body with the given status.
pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(serde_json::json!({ "error": message.into() })),
    )
        .into_response()
}

/// Shorthand for a 500 wrapping a storage error.
pub fn storage_error(e: impl std::fmt::Display) -> Response {
    error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

/// Document response format for the API.
#[derive(Debug, Serialize)]
pub struct DocumentResponse {
    pub id: i32,
    pub title: String,
    pub document_type: String,
    pub file_path: Option<String>,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Document> for DocumentResponse {
    fn from(doc: Document) -> Self {
        Self {
            id: doc.id,
            title: doc.title,
            document_type: doc.document_type.as_str().to_string(),
            file_path: doc.file_path.map(|p| p.display().to_string()),
            status: doc.status.as_str().to_string(),
            created_at: doc.created_at.to_rfc3339(),
            updated_at: doc.updated_at.to_rfc3339(),
        }
    }
}

/// Analysis response format for the API.
#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    pub id: i32,
    pub document_id: i32,
    pub overall_sentiment: String,
    pub sentiment_score: i32,
    pub confidence_score: i32,
    pub clarity_score: i32,
    pub readability_score: i32,
    pub specificity_score: i32,
    pub key_themes: Vec<String>,
    pub emotional_tone: crate::models::EmotionalTone,
    pub linguistic_metrics: crate::models::LinguisticMetrics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degraded_reason: Option<String>,
    pub created_at: String,
}

impl From<Analysis> for AnalysisResponse {
    fn from(analysis: Analysis) -> Self {
        Self {
            id: analysis.id,
            document_id: analysis.document_id,
            overall_sentiment: analysis.overall_sentiment.as_str().to_string(),
            sentiment_score: analysis.sentiment_score,
            confidence_score: analysis.confidence_score,
            clarity_score: analysis.clarity_score,
            readability_score: analysis.readability_score,
            specificity_score: analysis.specificity_score,
            key_themes: analysis.key_themes,
            emotional_tone: analysis.emotional_tone,
            linguistic_metrics: analysis.linguistic_metrics,
            degraded_reason: analysis.degraded_reason,
            created_at: analysis.created_at.to_rfc3339(),
        }
    }
}

/// Section response format for the API.
#[derive(Debug, Serialize)]
pub struct SectionResponse {
    pub id: i32,
    pub analysis_id: i32,
    pub section_title: String,
    pub section_type: Option<String>,
    pub speaker: Option<String>,
    pub original_text: String,
    pub sentiment_score: i32,
    pub confidence_score: i32,
    pub clarity_score: i32,
    pub readability_score: i32,
    pub specificity_score: i32,
    pub issues: Vec<String>,
    pub suggested_revision: String,
    pub revision_rationale: String,
    pub order: i32,
}

impl From<Section> for SectionResponse {
    fn from(section: Section) -> Self {
        Self {
            id: section.id,
            analysis_id: section.analysis_id,
            section_title: section.section_title,
            section_type: section.section_type,
            speaker: section.speaker,
            original_text: section.original_text,
            sentiment_score: section.sentiment_score,
            confidence_score: section.confidence_score,
            clarity_score: section.clarity_score,
            readability_score: section.readability_score,
            specificity_score: section.specificity_score,
            issues: section.issues,
            suggested_revision: section.suggested_revision,
            revision_rationale: section.revision_rationale,
            order: section.section_order,
        }
    }
}

/// Comparison response format for the API.
#[derive(Debug, Serialize)]
pub struct ComparisonResponse {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub document_ids: Vec<i32>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Comparison> for ComparisonResponse {
    fn from(comparison: Comparison) -> Self {
        Self {
            id: comparison.id,
            title: comparison.title,
            description: comparison.description,
            document_ids: comparison.document_ids,
            created_at: comparison.created_at.to_rfc3339(),
            updated_at: comparison.updated_at.to_rfc3339(),
        }
    }
}

/// Metrics snapshot response format for the API.
#[derive(Debug, Serialize)]
pub struct MetricsResponse {
    pub id: i32,
    pub document_id: i32,
    pub analysis_id: i32,
    pub document_type: String,
    pub sentiment_score: i32,
    pub confidence_score: i32,
    pub clarity_score: i32,
    pub readability_score: i32,
    pub specificity_score: i32,
    pub recorded_at: String,
}

impl From<MetricsSnapshot> for MetricsResponse {
    fn from(snapshot: MetricsSnapshot) -> Self {
        Self {
            id: snapshot.id,
            document_id: snapshot.document_id,
            analysis_id: snapshot.analysis_id,
            document_type: snapshot.document_type.as_str().to_string(),
            sentiment_score: snapshot.sentiment_score,
            confidence_score: snapshot.confidence_score,
            clarity_score: snapshot.clarity_score,
            readability_score: snapshot.readability_score,
            specificity_score: snapshot.specificity_score,
            recorded_at: snapshot.recorded_at.to_rfc3339(),
        }
    }
}
