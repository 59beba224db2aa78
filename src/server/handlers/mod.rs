//! API handlers.

mod audio_api;
mod comparisons_api;
mod documents_api;
mod metrics_api;
mod models_api;
mod types;

pub use audio_api::{audio_status, transcribe_audio, upload_audio_document};
pub use comparisons_api::{
    create_comparison, delete_comparison, get_comparison, list_comparisons,
};
pub use documents_api::{
    get_document, get_document_analysis, list_documents, upload_document,
};
pub use metrics_api::{metrics_by_type, metrics_history};
pub use models_api::{health, list_models, ollama_status, test_model};
