//! Administrative endpoints

use axum::{extract::State, Json};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::app::AppState;
use crate::auth::AdminUser;
use crate::error::ApiResult;

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total_documents: usize,
    pub total_chunks: usize,
    pub documents_by_type: BTreeMap<String, usize>,
    pub documents_by_user: BTreeMap<String, usize>,
}

/// GET /api/v1/admin/stats - Document totals across all users
pub async fn stats(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> ApiResult<Json<StatsResponse>> {
    let documents = state.documents.list().await?;

    let mut documents_by_type = BTreeMap::new();
    let mut documents_by_user = BTreeMap::new();
    for document in &documents {
        *documents_by_type.entry(document.file_type.clone()).or_insert(0) += 1;
        *documents_by_user.entry(document.owner.clone()).or_insert(0) += 1;
    }

    Ok(Json(StatsResponse {
        total_documents: documents.len(),
        total_chunks: documents.iter().map(|d| d.chunk_count).sum(),
        documents_by_type,
        documents_by_user,
    }))
}
