//! JSON API server for document intake and analysis results.
//!
//! The dashboard UI consumes these endpoints; nothing here renders HTML.
//! Uploads are processed synchronously inside their request handler, so
//! the effective concurrency ceiling is the host's connection limits.

mod handlers;
mod routes;

pub use routes::create_router;

use std::net::SocketAddr;
use std::sync::Arc;

use crate::config::Settings;
use crate::llm::LlmClient;
use crate::repository::DbContext;
use crate::services::Pipeline;
use crate::transcribe::Transcriber;

/// Shared state for the API server.
#[derive(Clone)]
pub struct AppState {
    pub ctx: DbContext,
    pub pipeline: Arc<Pipeline>,
    pub settings: Settings,
}

impl AppState {
    pub fn new(settings: &Settings) -> Self {
        let ctx = settings.create_db_context();
        let llm = LlmClient::new(settings.llm.clone());
        let transcriber = Transcriber::new(settings.transcription.clone());
        let pipeline = Arc::new(Pipeline::new(ctx.clone(), llm, transcriber));

        Self {
            ctx,
            pipeline,
            settings: settings.clone(),
        }
    }
}

/// Start the API server.
pub async fn serve(settings: &Settings, host: &str, port: u16) -> anyhow::Result<()> {
    let state = AppState::new(settings);
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use tempfile::tempdir;
    use tower::ServiceExt;

    use crate::models::DocumentType;

    /// Mock Ollama answering document and section prompts.
    async fn spawn_mock_ollama() -> String {
        async fn generate(Json(body): Json<serde_json::Value>) -> Json<serde_json::Value> {
            let prompt = body["prompt"].as_str().unwrap_or_default();
            let response = if prompt.contains("section by section") {
                serde_json::json!({
                    "sections": [{
                        "section_title": "Full Release",
                        "section_type": "other",
                        "speaker": null,
                        "original_text": "Test",
                        "sentiment_score": 66,
                        "confidence_score": 61,
                        "clarity_score": 59,
                        "readability_score": 63,
                        "specificity_score": 57,
                        "issues": [],
                        "suggested_revision": "None.",
                        "revision_rationale": "Fine as is."
                    }]
                })
                .to_string()
            } else {
                serde_json::json!({
                    "overall_sentiment": "positive",
                    "sentiment_score": 70,
                    "confidence_score": 65,
                    "clarity_score": 60,
                    "readability_score": 58,
                    "specificity_score": 61,
                    "key_themes": ["results"],
                    "emotional_tone": {"positive": 55, "negative": 10, "neutral": 35, "confident": 60, "uncertain": 20},
                    "linguistic_metrics": {
                        "avgSentenceLength": 15.0,
                        "complexWordRatio": 0.2,
                        "passiveVoiceRatio": 0.1,
                        "jargonDensity": 0.15,
                        "hedgingLanguage": 0.05
                    }
                })
                .to_string()
            };
            Json(serde_json::json!({"response": response, "done": true}))
        }

        let app = Router::new()
            .route(
                "/api/tags",
                get(|| async { Json(serde_json::json!({"models": [{"name": "llama3.2"}]})) }),
            )
            .route("/api/generate", post(generate));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    async fn setup_test_app(ollama_endpoint: &str) -> (Router, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let mut settings = Settings::with_data_dir(dir.path().to_path_buf());
        settings.llm.endpoint = ollama_endpoint.to_string();
        settings.ensure_dirs().unwrap();

        let state = AppState::new(&settings);
        state.ctx.init_schema().await.unwrap();

        (create_router(state), dir)
    }

    fn multipart_request(
        uri: &str,
        fields: &[(&str, &str)],
        file: Option<(&str, &[u8])>,
    ) -> Request<Body> {
        let boundary = "test-boundary-7f3a";
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                    boundary, name, value
                )
                .as_bytes(),
            );
        }
        if let Some((filename, content)) = file {
            body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                    boundary, filename
                )
                .as_bytes(),
            );
            body.extend_from_slice(content);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());

        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                "content-type",
                format!("multipart/form-data; boundary={}", boundary),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let endpoint = spawn_mock_ollama().await;
        let (app, _dir) = setup_test_app(&endpoint).await;

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["ollama"]["available"], true);
    }

    #[tokio::test]
    async fn test_list_documents_empty() {
        let endpoint = spawn_mock_ollama().await;
        let (app, _dir) = setup_test_app(&endpoint).await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/documents")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json.as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_upload_document_end_to_end() {
        let endpoint = spawn_mock_ollama().await;
        let (app, _dir) = setup_test_app(&endpoint).await;

        let content = "a".repeat(50);
        let request = multipart_request(
            "/api/documents",
            &[("title", "Test"), ("document_type", "other")],
            Some(("test.txt", content.as_bytes())),
        );

        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["title"], "Test");
        assert_eq!(json["status"], "completed");
        let doc_id = json["id"].as_i64().unwrap();

        // Analysis readable through the API
        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!("/api/documents/{}/analysis", doc_id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["analysis"]["sentiment_score"], 70);
        assert_eq!(json["sections"][0]["order"], 0);
    }

    #[tokio::test]
    async fn test_upload_rejects_bad_extension() {
        let endpoint = spawn_mock_ollama().await;
        let (app, _dir) = setup_test_app(&endpoint).await;

        let request = multipart_request(
            "/api/documents",
            &[("title", "Test"), ("document_type", "other")],
            Some(("malware.exe", b"x")),
        );

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert!(json["error"].as_str().unwrap().contains("not supported"));
    }

    #[tokio::test]
    async fn test_upload_rejects_bad_document_type() {
        let endpoint = spawn_mock_ollama().await;
        let (app, _dir) = setup_test_app(&endpoint).await;

        let request = multipart_request(
            "/api/documents",
            &[("title", "Test"), ("document_type", "memo")],
            Some(("test.txt", b"hello")),
        );

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"], "Invalid document type");
    }

    #[tokio::test]
    async fn test_upload_rejects_unknown_model() {
        let endpoint = spawn_mock_ollama().await;
        let (app, _dir) = setup_test_app(&endpoint).await;

        let request = multipart_request(
            "/api/documents",
            &[
                ("title", "Test"),
                ("document_type", "other"),
                ("model", "not-installed"),
            ],
            Some(("test.txt", b"hello")),
        );

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert!(json["error"].as_str().unwrap().contains("not found"));
    }

    #[tokio::test]
    async fn test_document_not_found() {
        let endpoint = spawn_mock_ollama().await;
        let (app, _dir) = setup_test_app(&endpoint).await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/documents/999")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_comparison_requires_two_documents() {
        let endpoint = spawn_mock_ollama().await;
        let (app, _dir) = setup_test_app(&endpoint).await;

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/comparisons")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        serde_json::json!({"title": "Solo", "document_ids": [1]}).to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert!(json["error"].as_str().unwrap().contains("At least 2"));
    }

    #[tokio::test]
    async fn test_comparison_lifecycle() {
        let endpoint = spawn_mock_ollama().await;
        let (app, dir) = setup_test_app(&endpoint).await;

        // Seed two documents directly through the repository
        let ctx = DbContext::from_sqlite_path(&dir.path().join("irsight.db"));
        let a = ctx
            .documents()
            .create("A", DocumentType::PressRelease, None)
            .await
            .unwrap();
        let b = ctx
            .documents()
            .create("B", DocumentType::PressRelease, None)
            .await
            .unwrap();

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/comparisons")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        serde_json::json!({
                            "title": "A vs B",
                            "description": "pair",
                            "document_ids": [a, b]
                        })
                        .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let comparison_id = json["id"].as_i64().unwrap();
        assert_eq!(json["document_ids"], serde_json::json!([a, b]));

        // Expanded read returns both documents in order
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri(format!("/api/comparisons/{}", comparison_id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["documents"].as_array().unwrap().len(), 2);
        assert_eq!(json["documents"][0]["document"]["title"], "A");

        // Delete, then it's gone
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/api/comparisons/{}", comparison_id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!("/api/comparisons/{}", comparison_id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_comparison_rejects_missing_document() {
        let endpoint = spawn_mock_ollama().await;
        let (app, _dir) = setup_test_app(&endpoint).await;

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/comparisons")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        serde_json::json!({"title": "Ghosts", "document_ids": [41, 42]})
                            .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_metrics_endpoints() {
        let endpoint = spawn_mock_ollama().await;
        let (app, _dir) = setup_test_app(&endpoint).await;

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/metrics/history?limit=10")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_json(response).await.is_array());

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/metrics/by-type/press_release")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/metrics/by-type/memo")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_audio_status_lists_presets() {
        let endpoint = spawn_mock_ollama().await;
        let (app, _dir) = setup_test_app(&endpoint).await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/audio/status")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["presets"].as_array().unwrap().len(), 5);
        assert!(json["whisper_local_available"].is_boolean());
    }

    #[tokio::test]
    async fn test_ollama_models_endpoint() {
        let endpoint = spawn_mock_ollama().await;
        let (app, _dir) = setup_test_app(&endpoint).await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/ollama/models")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["count"], 1);
        assert_eq!(json["installed"][0], "llama3.2");
        assert!(json["recommended"].as_array().unwrap().len() >= 3);
    }
}
