//! Audio transcription and audio-document endpoints.

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use super::super::AppState;
use super::types::{error_response, storage_error};
use crate::extract::validate_audio_upload;
use crate::models::DocumentType;
use crate::services::PipelineError;
use crate::storage::save_upload;
use crate::transcribe::{TranscriptionError, PRESETS};

/// Transcription availability and presets.
pub async fn audio_status(State(state): State<AppState>) -> impl IntoResponse {
    let capabilities = state.pipeline.transcriber().capabilities();
    Json(serde_json::json!({
        "whisper_local_available": capabilities.local,
        "whisper_api_available": capabilities.remote,
        "presets": PRESETS,
    }))
}

/// Collected multipart fields for audio endpoints.
#[derive(Default)]
struct AudioForm {
    title: Option<String>,
    document_type: Option<String>,
    analysis_model: Option<String>,
    preset: Option<String>,
    language: Option<String>,
    detect_speakers: Option<bool>,
    filename: Option<String>,
    content: Option<Vec<u8>>,
}

async fn read_audio_form(multipart: &mut Multipart) -> Result<AudioForm, Response> {
    let mut form = AudioForm::default();

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
            "analysis_model" => form.analysis_model = Some(value),
            "preset" | "transcription_preset" => form.preset = Some(value),
            "language" => form.language = Some(value),
            "detect_speakers" => form.detect_speakers = Some(value == "true" || value == "1"),
            _ => {}
        }
    }

    Ok(form)
}

fn transcription_error_response(e: &TranscriptionError) -> Response {
    let status = match e {
        TranscriptionError::BackendNotAvailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error_response(status, format!("Transcription failed: {}", e))
}

/// Standalone transcription endpoint; no document row is created.
pub async fn transcribe_audio(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let form = match read_audio_form(&mut multipart).await {
        Ok(form) => form,
        Err(response) => return response,
    };

    let (Some(filename), Some(content)) = (form.filename, form.content) else {
        return error_response(StatusCode::BAD_REQUEST, "file is required");
    };
    if let Err(e) = validate_audio_upload(
        &filename,
        content.len() as u64,
        state.settings.limits.max_audio_bytes(),
    ) {
        return error_response(StatusCode::BAD_REQUEST, e.to_string());
    }

    let stored_path = match save_upload(&state.settings.uploads_dir, &filename, &content) {
        Ok(path) => path,
        Err(e) => return storage_error(format!("failed to store upload: {}", e)),
    };

    let preset = form
        .preset
        .unwrap_or_else(|| state.pipeline.transcriber().config().default_preset.clone());
    let language = form
        .language
        .unwrap_or_else(|| state.pipeline.transcriber().config().language.clone());
    let detect_speakers = form.detect_speakers.unwrap_or(true);

    let output = match state
        .pipeline
        .transcriber()
        .transcribe_preset(&stored_path, &preset, &language, detect_speakers)
        .await
    {
        Ok(output) => output,
        Err(e) => return transcription_error_response(&e),
    };

    Json(serde_json::json!({
        "success": true,
        "text": output.text,
        "formatted_text": output.formatted_text,
        "language": output.language,
        "duration": output.duration_secs,
        "segments": output.segments.len(),
        "backend": output.backend.as_str(),
        "model": output.model,
    }))
    .into_response()
}

/// Upload an audio document: transcribe, annotate, and persist in one
/// request.
pub async fn upload_audio_document(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Response {
    let form = match read_audio_form(&mut multipart).await {
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

    if let Err(e) = validate_audio_upload(
        &filename,
        content.len() as u64,
        state.settings.limits.max_audio_bytes(),
    ) {
        return error_response(StatusCode::BAD_REQUEST, e.to_string());
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

    let preset = form
        .preset
        .unwrap_or_else(|| state.pipeline.transcriber().config().default_preset.clone());
    let language = form
        .language
        .unwrap_or_else(|| state.pipeline.transcriber().config().language.clone());
    let detect_speakers = form.detect_speakers.unwrap_or(true);

    let summary = match state
        .pipeline
        .process_audio_document(
            doc_id,
            &stored_path,
            document_type,
            form.analysis_model.as_deref(),
            &preset,
            &language,
            detect_speakers,
        )
        .await
    {
        Ok(summary) => summary,
        Err(PipelineError::Transcription(e)) => return transcription_error_response(&e),
        Err(e) => {
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Processing failed: {}", e),
            )
        }
    };

    Json(serde_json::json!({
        "success": true,
        "document_id": doc_id,
        "transcription": {
            "duration": summary.duration_secs,
            "language": summary.language,
            "segments": summary.segment_count,
            "backend": summary.backend.as_str(),
        },
        "analysis": {
            "sentiment_score": summary.sentiment_score,
            "confidence_score": summary.confidence_score,
            "clarity_score": summary.clarity_score,
        },
    }))
    .into_response()
}
