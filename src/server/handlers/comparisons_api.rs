//! Comparison endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use super::super::AppState;
use super::types::{
    error_response, storage_error, AnalysisResponse, ComparisonResponse, DocumentResponse,
};

#[derive(Debug, Deserialize)]
pub struct ComparisonCreate {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub document_ids: Vec<i32>,
}

/// Create a comparison of two or more documents.
pub async fn create_comparison(
    State(state): State<AppState>,
    Json(request): Json<ComparisonCreate>,
) -> Response {
    if request.document_ids.len() < 2 {
        return error_response(
            StatusCode::BAD_REQUEST,
            "At least 2 documents required for comparison",
        );
    }

    // All referenced documents must exist at creation time
    for doc_id in &request.document_ids {
        match state.ctx.documents().get(*doc_id).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                return error_response(
                    StatusCode::NOT_FOUND,
                    format!("Document {} not found", doc_id),
                )
            }
            Err(e) => return storage_error(e),
        }
    }

    let id = match state
        .ctx
        .comparisons()
        .create(
            &request.title,
            request.description.as_deref(),
            &request.document_ids,
        )
        .await
    {
        Ok(id) => id,
        Err(e) => return storage_error(e),
    };

    match state.ctx.comparisons().get(id).await {
        Ok(Some(comparison)) => Json(ComparisonResponse::from(comparison)).into_response(),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "Comparison not found"),
        Err(e) => storage_error(e),
    }
}

/// List all comparisons.
pub async fn list_comparisons(State(state): State<AppState>) -> Response {
    match state.ctx.comparisons().get_all().await {
        Ok(comparisons) => Json(
            comparisons
                .into_iter()
                .map(ComparisonResponse::from)
                .collect::<Vec<_>>(),
        )
        .into_response(),
        Err(e) => storage_error(e),
    }
}

/// Get a comparison expanded with its documents and their analyses.
///
/// Documents deleted since the comparison was created are skipped
/// silently; the expansion just returns fewer entries.
pub async fn get_comparison(State(state): State<AppState>, Path(id): Path<i32>) -> Response {
    let comparison = match state.ctx.comparisons().get(id).await {
        Ok(Some(comparison)) => comparison,
        Ok(None) => return error_response(StatusCode::NOT_FOUND, "Comparison not found"),
        Err(e) => return storage_error(e),
    };

    let mut documents = Vec::new();
    for doc_id in &comparison.document_ids {
        let doc = match state.ctx.documents().get(*doc_id).await {
            Ok(Some(doc)) => doc,
            Ok(None) => continue,
            Err(e) => return storage_error(e),
        };
        let analysis = match state.ctx.analyses().get_by_document(*doc_id).await {
            Ok(analysis) => analysis,
            Err(e) => return storage_error(e),
        };
        documents.push(serde_json::json!({
            "document": DocumentResponse::from(doc),
            "analysis": analysis.map(AnalysisResponse::from),
        }));
    }

    Json(serde_json::json!({
        "comparison": ComparisonResponse::from(comparison),
        "documents": documents,
    }))
    .into_response()
}

/// Delete a comparison.
pub async fn delete_comparison(State(state): State<AppState>, Path(id): Path<i32>) -> Response {
    match state.ctx.comparisons().delete(id).await {
        Ok(true) => Json(serde_json::json!({ "success": true })).into_response(),
        Ok(false) => error_response(StatusCode::NOT_FOUND, "Comparison not found"),
        Err(e) => storage_error(e),
    }
}
