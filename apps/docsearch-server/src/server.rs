//! HTTP Server implementation

use anyhow::{Context, Result};
use axum::{http::HeaderValue, response::Json, routing::get, Router};
use serde_json::json;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::app::AppState;
use crate::routes::api_routes;

pub struct Server {
    state: AppState,
}

impl Server {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    pub async fn run(self) -> Result<()> {
        let address = self.state.config.server.address();
        let app = build_router(self.state);

        let listener = tokio::net::TcpListener::bind(&address)
            .await
            .with_context(|| format!("Failed to bind HTTP server to {}", address))?;

        info!("HTTP server listening on {}", address);

        axum::serve(listener, app.into_make_service())
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("HTTP server error")?;

        Ok(())
    }
}

/// Build the full HTTP router for `state`
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.server.cors_origins);
    let max_file_size = state.config.processing.max_file_size;

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes(max_file_size))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::permissive().allow_origin(AllowOrigin::list(origins))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

// Route handlers

async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "message": "Welcome to the DocSearch API",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({ "status": "healthy" }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use docsearch_core::{
        AppConfig, CoreError, DocumentStore, InMemoryIdentityProvider, SearchHit, SimilarDocument,
        TextGenerator, VectorStore,
    };
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    const BOUNDARY: &str = "docsearch-test-boundary";

    struct EchoGenerator;

    #[async_trait]
    impl TextGenerator for EchoGenerator {
        async fn summarize(&self, text: &str) -> docsearch_core::Result<String> {
            Ok(format!("summary of {} chars", text.chars().count()))
        }

        async fn answer_question(&self, _text: &str, question: &str) -> docsearch_core::Result<String> {
            Ok(format!("answer to: {}", question))
        }

        async fn generate_key_points(&self, text: &str) -> docsearch_core::Result<Vec<String>> {
            Ok(text.split('.').map(str::trim).filter(|s| !s.is_empty()).map(String::from).collect())
        }
    }

    struct FailingVectorStore;

    #[async_trait]
    impl VectorStore for FailingVectorStore {
        async fn upsert(&self, _document_id: &str, _chunks: Vec<String>) -> docsearch_core::Result<()> {
            Err(CoreError::Storage("vector database offline".to_string()))
        }

        async fn query(&self, _text: &str, _k: usize) -> docsearch_core::Result<Vec<SearchHit>> {
            Ok(Vec::new())
        }

        async fn delete(&self, _document_id: &str) -> docsearch_core::Result<usize> {
            Ok(0)
        }

        async fn similar(&self, _document_id: &str, _limit: usize) -> docsearch_core::Result<Vec<SimilarDocument>> {
            Ok(Vec::new())
        }
    }

    async fn test_state(with_generator: bool) -> AppState {
        let config = AppConfig::default();
        let identity = InMemoryIdentityProvider::new(Duration::from_secs(3600));
        identity
            .register(&config.auth.admin_username, &config.auth.admin_password, true)
            .await
            .unwrap();
        identity.register("alice", "wonderland", false).await.unwrap();

        let mut state = AppState::new(config).await.unwrap();
        state.identity = Arc::new(identity);
        if with_generator {
            state = state.with_generator(Arc::new(EchoGenerator));
        }
        state
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if body.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&body).unwrap()
        };
        (status, value)
    }

    async fn login(app: &Router, username: &str, password: &str) -> String {
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/auth/token")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(format!("username={}&password={}", username, password)))
            .unwrap();

        let (status, body) = send(app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["token_type"], "bearer");
        body["access_token"].as_str().unwrap().to_string()
    }

    fn upload_request(token: &str, filename: &str, content: &[u8], title: Option<&str>) -> Request<Body> {
        let mut body = Vec::new();
        if let Some(title) = title {
            body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"title\"\r\n\r\n{}\r\n",
                    BOUNDARY, title
                )
                .as_bytes(),
            );
        }
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n",
                BOUNDARY, filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

        Request::builder()
            .method("POST")
            .uri("/api/v1/upload")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn authed(method: &str, uri: &str, token: &str, json_body: Option<serde_json::Value>) -> Request<Body> {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", token));

        match json_body {
            Some(value) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(value.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn upload_text(app: &Router, token: &str, filename: &str, text: &str) -> String {
        let (status, body) = send(app, upload_request(token, filename, text.as_bytes(), None)).await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body["document_id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_root_and_health() {
        let app = build_router(test_state(false).await);

        let (status, body) = send(&app, Request::get("/").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Welcome to the DocSearch API");

        let (status, body) = send(&app, Request::get("/health").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_api_requires_token() {
        let app = build_router(test_state(false).await);

        let (status, _) = send(&app, Request::get("/api/v1/documents").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(&app, authed("GET", "/api/v1/documents", "bogus", None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_bad_credentials_rejected() {
        let app = build_router(test_state(false).await);
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/auth/token")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("username=admin&password=wrong"))
            .unwrap();

        let (status, body) = send(&app, request).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["type"], "unauthorized");
    }

    #[tokio::test]
    async fn test_upload_and_search() {
        let app = build_router(test_state(false).await);
        let token = login(&app, "alice", "wonderland").await;

        let text = "Hello world. ".repeat(100);
        let (status, body) = send(
            &app,
            upload_request(&token, "greetings.TXT", text.as_bytes(), Some("Greetings")),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["title"], "Greetings");
        assert_eq!(body["chunk_count"], 2);
        assert_eq!(body["metadata"]["file_type"], "txt");
        assert_eq!(body["metadata"]["file_size"], 1300);

        let document_id = body["document_id"].as_str().unwrap();
        let (status, body) = send(
            &app,
            authed("POST", "/api/v1/search", &token, Some(serde_json::json!({ "query": "hello world", "limit": 1 }))),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let results = body["results"].as_array().unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0]["document_id"], document_id);
    }

    #[tokio::test]
    async fn test_upload_rejects_unsupported_extension() {
        let app = build_router(test_state(false).await);
        let token = login(&app, "alice", "wonderland").await;

        let (status, body) = send(&app, upload_request(&token, "archive.zip", b"PK", None)).await;
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(body["error"]["type"], "unsupported_type");

        let (status, _) = send(&app, upload_request(&token, "notes", b"text", None)).await;
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[tokio::test]
    async fn test_upload_corrupt_pdf_is_unprocessable() {
        let app = build_router(test_state(false).await);
        let token = login(&app, "alice", "wonderland").await;

        let (status, body) = send(&app, upload_request(&token, "scan.pdf", b"not really a pdf", None)).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["type"], "extraction_error");
    }

    #[tokio::test]
    async fn test_document_lifecycle() {
        let app = build_router(test_state(false).await);
        let alice = login(&app, "alice", "wonderland").await;
        let admin = login(&app, "admin", "password").await;

        let id = upload_text(&app, &alice, "minutes.txt", "The board met. Budgets were approved.").await;

        let (status, body) = send(&app, authed("GET", &format!("/api/v1/documents/{}", id), &alice, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["title"], "minutes");
        assert_eq!(body["owner"], "alice");
        assert!(body.get("text").is_none());

        let (status, body) = send(
            &app,
            authed(
                "PUT",
                &format!("/api/v1/documents/{}/tags", id),
                &alice,
                Some(serde_json::json!({ "tags": ["finance", "board", "finance"] })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["tags"], serde_json::json!(["board", "finance"]));

        let (_, body) = send(&app, authed("GET", "/api/v1/documents?tag=finance", &alice, None)).await;
        assert_eq!(body.as_array().unwrap().len(), 1);
        let (_, body) = send(&app, authed("GET", "/api/v1/documents?tag=legal", &alice, None)).await;
        assert!(body.as_array().unwrap().is_empty());

        let (status, _) = send(&app, authed("DELETE", &format!("/api/v1/documents/{}", id), &alice, None)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = send(&app, authed("DELETE", &format!("/api/v1/documents/{}", id), &admin, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["chunks_removed"], 1);

        let (status, _) = send(&app, authed("GET", &format!("/api/v1/documents/{}", id), &alice, None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_list_documents_by_owner_and_limit() {
        let app = build_router(test_state(false).await);
        let alice = login(&app, "alice", "wonderland").await;
        let admin = login(&app, "admin", "password").await;

        upload_text(&app, &alice, "a.txt", "Alpha.").await;
        upload_text(&app, &alice, "b.txt", "Beta.").await;
        upload_text(&app, &admin, "c.txt", "Gamma.").await;

        let (status, body) = send(&app, authed("GET", "/api/v1/documents", &alice, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 3);

        let (_, body) = send(&app, authed("GET", "/api/v1/documents?owner=alice", &alice, None)).await;
        let owned = body.as_array().unwrap();
        assert_eq!(owned.len(), 2);
        assert!(owned.iter().all(|doc| doc["owner"] == "alice"));

        let (_, body) = send(&app, authed("GET", "/api/v1/documents?owner=alice&limit=1", &alice, None)).await;
        assert_eq!(body.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_similar_documents() {
        let app = build_router(test_state(false).await);
        let token = login(&app, "alice", "wonderland").await;

        let source = upload_text(&app, &token, "source.txt", "Rust borrow checker lifetimes.").await;
        let related = upload_text(&app, &token, "related.txt", "The Rust borrow checker explained.").await;
        upload_text(&app, &token, "flowers.txt", "Spring flowers bloom.").await;

        let (status, body) = send(&app, authed("GET", &format!("/api/v1/documents/{}/similar", source), &token, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["document_id"], source.as_str());
        let similar = body["similar"].as_array().unwrap();
        assert_eq!(similar.len(), 1);
        assert_eq!(similar[0]["document_id"], related.as_str());

        let (status, _) = send(&app, authed("GET", "/api/v1/documents/missing/similar", &token, None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_upload_rolls_back_record_when_chunks_fail() {
        let mut state = test_state(false).await;
        state.vectors = Arc::new(FailingVectorStore);
        let documents = state.documents.clone();
        let app = build_router(state);
        let token = login(&app, "alice", "wonderland").await;

        let (status, body) = send(&app, upload_request(&token, "notes.txt", b"Some notes.", None)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["type"], "internal_error");
        assert!(documents.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_generation_routes_without_generator() {
        let app = build_router(test_state(false).await);
        let token = login(&app, "alice", "wonderland").await;
        let id = upload_text(&app, &token, "notes.txt", "Some notes.").await;

        let (status, body) = send(&app, authed("GET", &format!("/api/v1/documents/{}/summary", id), &token, None)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"]["type"], "generator_unavailable");

        let (status, _) = send(&app, authed("GET", &format!("/api/v1/documents/{}/key-points", id), &token, None)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_generation_routes_with_generator() {
        let app = build_router(test_state(true).await);
        let token = login(&app, "alice", "wonderland").await;
        let id = upload_text(&app, &token, "notes.txt", "First point. Second point.").await;

        let (status, body) = send(&app, authed("GET", &format!("/api/v1/documents/{}/summary", id), &token, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["summary"], "summary of 26 chars");

        let (status, body) = send(
            &app,
            authed(
                "POST",
                &format!("/api/v1/documents/{}/ask", id),
                &token,
                Some(serde_json::json!({ "question": "What is first?" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["answer"], "answer to: What is first?");

        let (status, body) = send(&app, authed("GET", &format!("/api/v1/documents/{}/key-points", id), &token, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["key_points"], serde_json::json!(["First point", "Second point"]));

        let (status, _) = send(&app, authed("GET", "/api/v1/documents/missing/summary", &token, None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_admin_stats() {
        let app = build_router(test_state(false).await);
        let alice = login(&app, "alice", "wonderland").await;
        let admin = login(&app, "admin", "password").await;

        upload_text(&app, &alice, "a.txt", "Alpha.").await;
        upload_text(&app, &alice, "b.txt", "Beta.").await;
        upload_text(&app, &admin, "c.txt", "Gamma.").await;

        let (status, _) = send(&app, authed("GET", "/api/v1/admin/stats", &alice, None)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = send(&app, authed("GET", "/api/v1/admin/stats", &admin, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_documents"], 3);
        assert_eq!(body["total_chunks"], 3);
        assert_eq!(body["documents_by_type"]["txt"], 3);
        assert_eq!(body["documents_by_user"]["alice"], 2);
        assert_eq!(body["documents_by_user"]["admin"], 1);
    }

    #[test]
    fn test_cors_layer_accepts_origin_list() {
        let _ = cors_layer(&["https://docs.example.com".to_string(), "bad\norigin".to_string()]);
        let _ = cors_layer(&["*".to_string()]);
    }
}
