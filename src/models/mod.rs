//! Domain models for documents, analyses, and comparisons.

mod analysis;
mod comparison;
mod document;

pub use analysis::{
    Analysis, EmotionalTone, LinguisticMetrics, MetricsSnapshot, Section, SentimentLabel,
};
pub use comparison::Comparison;
pub use document::{Document, DocumentStatus, DocumentType};
