//! Analysis, section, and metrics-history models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::DocumentType;

/// Overall sentiment label produced by the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
    Mixed,
}

impl SentimentLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
            Self::Mixed => "mixed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "positive" => Some(Self::Positive),
            "negative" => Some(Self::Negative),
            "neutral" => Some(Self::Neutral),
            "mixed" => Some(Self::Mixed),
            _ => None,
        }
    }
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Emotional tone distribution over five named buckets.
///
/// Percentages are not required to sum to 100; the model is only prompted
/// toward 0-100 per bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmotionalTone {
    pub positive: i32,
    pub negative: i32,
    pub neutral: i32,
    pub confident: i32,
    pub uncertain: i32,
}

/// Linguistic metrics reported by the model.
///
/// Field names serialize in camelCase to match the JSON shape requested
/// from the model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinguisticMetrics {
    pub avg_sentence_length: f64,
    pub complex_word_ratio: f64,
    pub passive_voice_ratio: f64,
    pub jargon_density: f64,
    pub hedging_language: f64,
}

/// A persisted document-level analysis.
///
/// Created once per successful annotation call; immutable thereafter.
/// Scores are 0-100 by prompt contract only; nothing clamps them here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Analysis {
    pub id: i32,
    pub document_id: i32,
    pub overall_sentiment: SentimentLabel,
    pub sentiment_score: i32,
    pub confidence_score: i32,
    pub clarity_score: i32,
    pub readability_score: i32,
    pub specificity_score: i32,
    pub key_themes: Vec<String>,
    pub emotional_tone: EmotionalTone,
    pub linguistic_metrics: LinguisticMetrics,
    /// Why this row holds placeholder values, if the annotation degraded.
    pub degraded_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A persisted section-level analysis, ordered within its parent Analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
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
    /// Contiguous from 0 within an analysis, assigned at insertion.
    pub section_order: i32,
}

/// Append-only snapshot of the five summary scores at analysis completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub id: i32,
    pub document_id: i32,
    pub analysis_id: i32,
    pub document_type: DocumentType,
    pub sentiment_score: i32,
    pub confidence_score: i32,
    pub clarity_score: i32,
    pub readability_score: i32,
    pub specificity_score: i32,
    pub recorded_at: DateTime<Utc>,
}
