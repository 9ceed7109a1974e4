//! API routes for the DocSearch server

pub mod admin;
pub mod auth;
pub mod documents;
pub mod search;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};

use crate::app::AppState;

/// Multipart framing on top of the file itself
const UPLOAD_OVERHEAD: usize = 64 * 1024;

/// Build all `/api/v1` routes
pub fn api_routes(max_file_size: usize) -> Router<AppState> {
    Router::new()
        .route("/auth/token", post(auth::login))
        // Ingestion, with a body limit sized for the largest accepted file
        .route(
            "/upload",
            post(documents::upload_document)
                .layer(DefaultBodyLimit::max(max_file_size.saturating_add(UPLOAD_OVERHEAD))),
        )
        .route("/search", post(search::search))
        // Document management
        .route("/documents", get(documents::list_documents))
        .route(
            "/documents/:id",
            get(documents::get_document).delete(documents::delete_document),
        )
        .route("/documents/:id/tags", put(documents::update_tags))
        .route("/documents/:id/similar", get(documents::similar_documents))
        // Generation
        .route("/documents/:id/summary", get(documents::summarize_document))
        .route("/documents/:id/ask", post(documents::ask_question))
        .route("/documents/:id/key-points", get(documents::key_points))
        // Administration
        .route("/admin/stats", get(admin::stats))
}
