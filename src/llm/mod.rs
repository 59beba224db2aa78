//! LLM annotation client for document scoring.
//!
//! Talks to an Ollama-compatible backend and parses its JSON output into
//! typed annotation payloads.

mod client;
mod prompts;
mod types;

pub use client::{
    recommended_models, AnnotationError, BackendStatus, LlmClient, LlmConfig, ModelRecommendation,
};
pub use types::{AnnotationOutcome, DocumentAnnotation, SectionAnnotation};
