//! Metrics history endpoints for trend views.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use super::super::AppState;
use super::types::{error_response, storage_error, MetricsResponse};
use crate::models::DocumentType;

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<u32>,
}

/// Recent metrics snapshots, newest first.
pub async fn metrics_history(
    State(state): State<AppState>,
    Query(params): Query<HistoryQuery>,
) -> Response {
    let limit = params.limit.unwrap_or(50);
    match state.ctx.metrics().history(limit).await {
        Ok(snapshots) => Json(
            snapshots
                .into_iter()
                .map(MetricsResponse::from)
                .collect::<Vec<_>>(),
        )
        .into_response(),
        Err(e) => storage_error(e),
    }
}

/// Metrics snapshots for a single document type.
pub async fn metrics_by_type(
    State(state): State<AppState>,
    Path(type_str): Path<String>,
) -> Response {
    let Some(document_type) = DocumentType::from_str(&type_str) else {
        return error_response(StatusCode::BAD_REQUEST, "Invalid document type");
    };

    match state.ctx.metrics().by_type(document_type).await {
        Ok(snapshots) => Json(
            snapshots
                .into_iter()
                .map(MetricsResponse::from)
                .collect::<Vec<_>>(),
        )
        .into_response(),
        Err(e) => storage_error(e),
    }
}
