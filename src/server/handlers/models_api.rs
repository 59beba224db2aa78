//! Health and model-backend endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;

use super::super::AppState;
use super::types::error_response;
use crate::llm::recommended_models;

/// Health check with backend availability.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let backend = state.pipeline.llm().status().await;
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
        "ollama": backend,
    }))
}

/// Backend status and installed model list.
pub async fn ollama_status(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.pipeline.llm().status().await)
}

/// Installed and recommended models.
pub async fn list_models(State(state): State<AppState>) -> impl IntoResponse {
    let installed = state
        .pipeline
        .llm()
        .list_models()
        .await
        .unwrap_or_default();

    Json(serde_json::json!({
        "count": installed.len(),
        "installed": installed,
        "recommended": recommended_models(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct ModelTestRequest {
    pub model: String,
}

/// Round-trip a trivial prompt through a specific model.
pub async fn test_model(
    State(state): State<AppState>,
    Json(request): Json<ModelTestRequest>,
) -> Response {
    match state.pipeline.llm().test_model(&request.model).await {
        Ok(()) => Json(serde_json::json!({
            "success": true,
            "model": request.model,
            "message": "Model is working correctly",
        }))
        .into_response(),
        Err(e) => error_response(StatusCode::BAD_REQUEST, e.to_string()),
    }
}
