//! Document upload and read endpoints.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use super::super::AppState;
use super::types::{
    error_response, storage_error, AnalysisResponse, DocumentResponse, SectionResponse,
};
use crate::extract::validate_document_upload;
use crate::models::DocumentType;
use crate::storage::save_upload;

/// Collected multipart fields for a document upload.
#[derive(Default)]
struct UploadForm {
    title: Option<String>,
    document_type: Option<String>,
    model: Option<String>,
    filename: Option<String>,
    content: Option<Vec<u8>>,
}

async fn read_upload_form(multipart: &mut Multipart) -> Result<UploadForm, Response> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        error_response(StatusCode::BAD_REQUEST, format!("invalid multipart body: {}", e))
    })? {
        let name = field.name().unwrap_or_default().to_string();
        if name == "file" {
            form.filename = field.file_name().map(String::from);
            form.content = Some(
                field
                    .bytes()
                    .await
                    .map_err(|e| {
                        error_response(
                            StatusCode::BAD_REQUEST,
                            format!("failed to read upload: {}", e),
                        )
                    })?
                    .to_vec(),
            );
            continue;
        }

        let value = field.text().await.map_err(|e| {
            error_response(StatusCode::BAD_REQUEST, format!("invalid form field: {}", e))
        })?;
        match name.as_str() {
            "title" => form.title = Some(value),
            "document_type" => form.document_type = Some(value),
            "model" => form.model = Some(value),
            _ => {}
        }
    }

    Ok(form)
}

/// Upload a text document and process it synchronously to a terminal
/// status. The connection stays open for the full pipeline run.
pub async fn upload_document(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let form = match read_upload_form(&mut multipart).await {
        Ok(form) => form,
        Err(response) => return response,
    };

    let Some(title) = form.title else {
        return error_response(StatusCode::BAD_REQUEST, "title is required");
    };
    let Some(type_str) = form.document_type else {
        return error_response(StatusCode::BAD_REQUEST, "document_type is required");
    };
    let Some(document_type) = DocumentType::from_str(&type_str) else {
        return error_response(StatusCode::BAD_REQUEST, "Invalid document type");
    };
    let (Some(filename), Some(content)) = (form.filename, form.content) else {
        return error_response(StatusCode::BAD_REQUEST, "file is required");
    };

    if let Err(e) = validate_document_upload(
        &filename,
        content.len() as u64,
        state.settings.limits.max_document_bytes(),
    ) {
        return error_response(StatusCode::BAD_REQUEST, e.to_string());
    }

    let model = form.model;
    // Reject unknown models when the backend can tell us; if the listing
    // itself fails the pipeline will surface the connection error as a
    // failed document instead.
    if let Some(ref model) = model {
        if let Ok(installed) = state.pipeline.llm().list_models().await {
            if !installed.iter().any(|m| m == model) {
                return error_response(
                    StatusCode::BAD_REQUEST,
                    format!(
                        "Model '{}' not found. Available models: {}",
                        model,
                        installed.join(", ")
                    ),
                );
            }
        }
    }

    let stored_path = match save_upload(&state.settings.uploads_dir, &filename, &content) {
        Ok(path) => path,
        Err(e) => return storage_error(format!("failed to store upload: {}", e)),
    };

    let doc_id = match state
        .ctx
        .documents()
        .create(&title, document_type, stored_path.to_str())
        .await
    {
        Ok(id) => id,
        Err(e) => return storage_error(e),
    };

    if let Err(e) = state
        .pipeline
        .process_text_document(doc_id, &stored_path, document_type, model.as_deref())
        .await
    {
        return error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Analysis failed: {}", e),
        );
    }

    match state.ctx.documents().get(doc_id).await {
        Ok(Some(doc)) => Json(DocumentResponse::from(doc)).into_response(),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "Document not found"),
        Err(e) => storage_error(e),
    }
}

/// List all documents.
pub async fn list_documents(State(state): State<AppState>) -> Response {
    match state.ctx.documents().get_all().await {
        Ok(docs) => Json(
            docs.into_iter()
                .map(DocumentResponse::from)
                .collect::<Vec<_>>(),
        )
        .into_response(),
        Err(e) => storage_error(e),
    }
}

/// Get a specific document.
pub async fn get_document(State(state): State<AppState>, Path(id): Path<i32>) -> Response {
    match state.ctx.documents().get(id).await {
        Ok(Some(doc)) => Json(DocumentResponse::from(doc)).into_response(),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "Document not found"),
        Err(e) => storage_error(e),
    }
}

/// Get the latest analysis and its sections for a document.
pub async fn get_document_analysis(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Response {
    match state.ctx.documents().get(id).await {
        Ok(Some(_)) => {}
        Ok(None) => return error_response(StatusCode::NOT_FOUND, "Document not found"),
        Err(e) => return storage_error(e),
    }

    let analysis = match state.ctx.analyses().get_by_document(id).await {
        Ok(Some(analysis)) => analysis,
        Ok(None) => return error_response(StatusCode::NOT_FOUND, "Analysis not found"),
        Err(e) => return storage_error(e),
    };

    let sections = match state.ctx.analyses().sections_for(analysis.id).await {
        Ok(sections) => sections,
        Err(e) => return storage_error(e),
    };

    Json(serde_json::json!({
        "analysis": AnalysisResponse::from(analysis),
        "sections": sections.into_iter().map(SectionResponse::from).collect::<Vec<_>>(),
    }))
    .into_response()
}
