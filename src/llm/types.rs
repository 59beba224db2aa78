//! Typed annotation payloads and the degraded-result wrapper.

use serde::{Deserialize, Serialize};

use crate::models::{EmotionalTone, LinguisticMetrics, SentimentLabel};

/// Outcome of an annotation call that can fall back to placeholder values.
///
/// `Degraded` carries the same payload shape as `Parsed` plus the reason the
/// real result was unavailable, so persistence can record why a row holds
/// placeholder values instead of conflating it with genuinely neutral output.
#[derive(Debug, Clone)]
pub enum AnnotationOutcome<T> {
    /// The backend returned output matching the requested shape.
    Parsed(T),
    /// The backend was reachable but its output was unusable; `value` holds
    /// the fixed fallback payload.
    Degraded { value: T, reason: String },
}

impl<T> AnnotationOutcome<T> {
    /// Borrow the payload regardless of outcome.
    pub fn value(&self) -> &T {
        match self {
            Self::Parsed(v) => v,
            Self::Degraded { value, .. } => value,
        }
    }

    /// Consume into the payload, discarding degradation info.
    pub fn into_value(self) -> T {
        match self {
            Self::Parsed(v) => v,
            Self::Degraded { value, .. } => value,
        }
    }

    /// The degradation reason, if any.
    pub fn degraded_reason(&self) -> Option<&str> {
        match self {
            Self::Parsed(_) => None,
            Self::Degraded { reason, .. } => Some(reason),
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }
}

/// Document-level annotation returned by the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentAnnotation {
    pub overall_sentiment: SentimentLabel,
    pub sentiment_score: i32,
    pub confidence_score: i32,
    pub clarity_score: i32,
    pub readability_score: i32,
    pub specificity_score: i32,
    pub key_themes: Vec<String>,
    pub emotional_tone: EmotionalTone,
    pub linguistic_metrics: LinguisticMetrics,
}

impl DocumentAnnotation {
    /// Fixed fallback payload used when annotation output is unusable.
    pub fn unavailable() -> Self {
        Self {
            overall_sentiment: SentimentLabel::Neutral,
            sentiment_score: 50,
            confidence_score: 50,
            clarity_score: 50,
            readability_score: 50,
            specificity_score: 50,
            key_themes: vec!["Analysis unavailable".to_string()],
            emotional_tone: EmotionalTone {
                positive: 33,
                negative: 33,
                neutral: 34,
                confident: 50,
                uncertain: 50,
            },
            linguistic_metrics: LinguisticMetrics {
                avg_sentence_length: 20.0,
                complex_word_ratio: 0.3,
                passive_voice_ratio: 0.2,
                jargon_density: 0.25,
                hedging_language: 0.15,
            },
        }
    }
}

/// Section-level annotation returned by the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionAnnotation {
    pub section_title: String,
    #[serde(default)]
    pub section_type: Option<String>,
    #[serde(default)]
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
}

impl SectionAnnotation {
    /// Fixed fallback: the whole document as one section with an explicit
    /// unavailable-analysis issue marker.
    pub fn unavailable_document(text: &str) -> Self {
        Self {
            section_title: "Full Document".to_string(),
            section_type: Some("other".to_string()),
            speaker: None,
            original_text: excerpt(text, 500).to_string(),
            sentiment_score: 50,
            confidence_score: 50,
            clarity_score: 50,
            readability_score: 50,
            specificity_score: 50,
            issues: vec!["Analysis unavailable - check Ollama connection".to_string()],
            suggested_revision: "Unable to generate suggestions. Please ensure Ollama is \
                                 running and a model is available."
                .to_string(),
            revision_rationale: "Analysis requires a working Ollama installation with \
                                 downloaded models."
                .to_string(),
        }
    }
}

/// Envelope the model is asked to wrap section arrays in.
#[derive(Debug, Deserialize)]
pub(super) struct SectionsEnvelope {
    pub sections: Vec<SectionAnnotation>,
}

/// Take a prefix of at most `max` bytes at a valid UTF-8 boundary.
pub(crate) fn excerpt(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
