//! Semantic search endpoint

use axum::{extract::State, Json};
use docsearch_core::SearchHit;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::app::AppState;
use crate::auth::CurrentUser;
use crate::error::{ApiError, ApiResult};

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    /// Maximum number of hits; the configured default when absent
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub results: Vec<SearchHit>,
}

/// POST /api/v1/search - Rank stored chunks against a query
pub async fn search(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<SearchRequest>,
) -> ApiResult<Json<SearchResponse>> {
    let query = request.query.trim();
    if query.is_empty() {
        return Err(ApiError::bad_request("Query must not be empty"));
    }

    let limit = request
        .limit
        .unwrap_or(state.config.search.default_limit)
        .max(1);
    let results = state.vectors.query(query, limit).await?;

    debug!(
        username = %user.username,
        limit = limit,
        hit_count = results.len(),
        "Search completed"
    );

    Ok(Json(SearchResponse { results }))
}
