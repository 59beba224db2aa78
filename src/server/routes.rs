//! Router configuration for the API server.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use super::handlers;
use super::AppState;

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    // Audio uploads dominate the body size; cap slightly above the audio
    // limit to leave room for multipart framing.
    let body_limit = (state.settings.limits.max_audio_bytes() + 1024 * 1024) as usize;

    Router::new()
        .route("/health", get(handlers::health))
        // Model backend
        .route("/api/ollama/status", get(handlers::ollama_status))
        .route("/api/ollama/models", get(handlers::list_models))
        .route("/api/ollama/test-model", post(handlers::test_model))
        // Documents
        .route(
            "/api/documents",
            get(handlers::list_documents).post(handlers::upload_document),
        )
        .route("/api/documents/audio", post(handlers::upload_audio_document))
        .route("/api/documents/:doc_id", get(handlers::get_document))
        .route(
            "/api/documents/:doc_id/analysis",
            get(handlers::get_document_analysis),
        )
        // Audio transcription
        .route("/api/audio/status", get(handlers::audio_status))
        .route("/api/audio/transcribe", post(handlers::transcribe_audio))
        // Comparisons
        .route(
            "/api/comparisons",
            get(handlers::list_comparisons).post(handlers::create_comparison),
        )
        .route(
            "/api/comparisons/:comparison_id",
            get(handlers::get_comparison).delete(handlers::delete_comparison),
        )
        // Metrics
        .route("/api/metrics/history", get(handlers::metrics_history))
        .route(
            "/api/metrics/by-type/:document_type",
            get(handlers::metrics_by_type),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
