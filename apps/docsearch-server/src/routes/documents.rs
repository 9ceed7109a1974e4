//! Document upload, management and generation endpoints

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use docsearch_core::{
    CoreError, DocumentQuery, DocumentRecord, SimilarDocument, TextGenerator, DEFAULT_LIST_LIMIT,
};
use docsearch_ingestion::RawDocument;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::app::AppState;
use crate::auth::{AdminUser, CurrentUser};
use crate::error::{ApiError, ApiResult};

/// Document as returned by the API, without its full text
#[derive(Debug, Serialize)]
pub struct DocumentView {
    pub id: String,
    pub title: String,
    pub filename: String,
    pub file_type: String,
    pub owner: String,
    pub tags: Vec<String>,
    pub chunk_count: usize,
    pub metadata: BTreeMap<String, serde_json::Value>,
    pub uploaded_at: DateTime<Utc>,
}

impl From<DocumentRecord> for DocumentView {
    fn from(record: DocumentRecord) -> Self {
        Self {
            id: record.id,
            title: record.title,
            filename: record.filename,
            file_type: record.file_type,
            owner: record.owner,
            tags: record.tags,
            chunk_count: record.chunk_count,
            metadata: record.metadata,
            uploaded_at: record.uploaded_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub document_id: String,
    pub title: String,
    pub chunk_count: usize,
    pub metadata: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub tag: Option<String>,
    pub owner: Option<String>,
    pub limit: Option<usize>,
}

impl From<ListQuery> for DocumentQuery {
    fn from(query: ListQuery) -> Self {
        DocumentQuery {
            owner: query.owner,
            tag: query.tag,
            limit: query.limit.unwrap_or(DEFAULT_LIST_LIMIT),
        }
    }
}

const DEFAULT_SIMILAR_LIMIT: usize = 3;

#[derive(Debug, Deserialize)]
pub struct SimilarQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SimilarResponse {
    pub document_id: String,
    pub similar: Vec<SimilarDocument>,
}

#[derive(Debug, Deserialize)]
pub struct TagsRequest {
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct QuestionRequest {
    pub question: String,
}

/// Lowercase extension of an accepted filename
fn file_extension(filename: &str) -> Option<String> {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
}

fn default_title(filename: &str) -> String {
    match filename.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => filename.to_string(),
    }
}

async fn find_document(state: &AppState, id: &str) -> ApiResult<DocumentRecord> {
    state
        .documents
        .get(id)
        .await?
        .ok_or_else(|| CoreError::NotFound(format!("Document {}", id)).into())
}

fn generator(state: &AppState) -> ApiResult<Arc<dyn TextGenerator>> {
    state.generator.clone().ok_or(ApiError::GeneratorUnavailable)
}

/// POST /api/v1/upload - Upload and process a single file
pub async fn upload_document(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<UploadResponse>)> {
    let mut file = None;
    let mut title = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let filename = field
                    .file_name()
                    .map(str::to_string)
                    .ok_or_else(|| ApiError::bad_request("Uploaded file has no filename"))?;
                let data = field.bytes().await?;
                file = Some((filename, data));
            }
            Some("title") => {
                title = Some(field.text().await?);
            }
            _ => {}
        }
    }

    let (filename, data) = file.ok_or_else(|| ApiError::bad_request("Missing 'file' field"))?;

    if !state.processor.validate_file_type(&filename) {
        warn!(filename = %filename, "Rejected upload with unsupported file type");
        return Err(ApiError::FileTypeNotAllowed(filename));
    }
    let file_type = file_extension(&filename)
        .ok_or_else(|| ApiError::FileTypeNotAllowed(filename.clone()))?;

    let title = title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| default_title(&filename));

    let document = RawDocument::from_bytes(title.clone(), file_type, data.to_vec());
    let result = state.processor.clone().process_async(document).await?;

    let document_id = Uuid::new_v4().to_string();
    let chunk_count = result.chunks.len();
    let metadata = result.metadata.to_map();

    let chunks = result.chunk_contents();
    let record = DocumentRecord::new(
        &document_id,
        &title,
        &filename,
        &result.metadata.file_type,
        &user.username,
    )
    .with_text(result.text)
    .with_chunk_count(chunk_count)
    .with_metadata(metadata.clone());
    state.documents.put(record).await?;

    // A record without chunks is never left behind
    if let Err(e) = state.vectors.upsert(&document_id, chunks).await {
        error!(document_id = %document_id, "Failed to store chunks: {}", e);
        if let Err(cleanup) = state.documents.delete(&document_id).await {
            warn!(document_id = %document_id, "Failed to roll back record: {}", cleanup);
        }
        return Err(e.into());
    }

    info!(
        document_id = %document_id,
        filename = %filename,
        owner = %user.username,
        chunk_count = chunk_count,
        "Document uploaded"
    );

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            document_id,
            title,
            chunk_count,
            metadata,
        }),
    ))
}

/// GET /api/v1/documents - List documents, filtered by tag or owner
pub async fn list_documents(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<DocumentView>>> {
    let documents = state.documents.find(&query.into()).await?;

    Ok(Json(documents.into_iter().map(DocumentView::from).collect()))
}

/// GET /api/v1/documents/:id
pub async fn get_document(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<DocumentView>> {
    let record = find_document(&state, &id).await?;
    Ok(Json(record.into()))
}

/// GET /api/v1/documents/:id/similar - Documents resembling this one
pub async fn similar_documents(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(id): Path<String>,
    Query(query): Query<SimilarQuery>,
) -> ApiResult<Json<SimilarResponse>> {
    let record = find_document(&state, &id).await?;
    let limit = query.limit.unwrap_or(DEFAULT_SIMILAR_LIMIT);

    let similar = state.vectors.similar(&record.id, limit).await?;

    Ok(Json(SimilarResponse {
        document_id: record.id,
        similar,
    }))
}

/// DELETE /api/v1/documents/:id - Remove a document and its chunks (admin only)
pub async fn delete_document(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    if !state.documents.delete(&id).await? {
        return Err(CoreError::NotFound(format!("Document {}", id)).into());
    }
    let chunks_removed = state.vectors.delete(&id).await?;

    info!(
        document_id = %id,
        admin = %admin.username,
        chunks_removed = chunks_removed,
        "Document deleted"
    );

    Ok(Json(serde_json::json!({
        "document_id": id,
        "chunks_removed": chunks_removed,
    })))
}

/// PUT /api/v1/documents/:id/tags - Replace a document's tags (owner or admin)
pub async fn update_tags(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Json(request): Json<TagsRequest>,
) -> ApiResult<Json<DocumentView>> {
    let record = find_document(&state, &id).await?;
    if record.owner != user.username && !user.is_admin {
        return Err(ApiError::Forbidden(
            "Only the owner or an admin can change tags".to_string(),
        ));
    }

    let tags = request
        .tags
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();
    let record = state.documents.set_tags(&id, tags).await?;

    Ok(Json(record.into()))
}

/// GET /api/v1/documents/:id/summary
pub async fn summarize_document(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    let generator = generator(&state)?;
    let record = find_document(&state, &id).await?;

    let summary = generator.summarize(&record.text).await?;

    Ok(Json(serde_json::json!({
        "document_id": record.id,
        "title": record.title,
        "summary": summary,
    })))
}

/// POST /api/v1/documents/:id/ask - Answer a question from one document
pub async fn ask_question(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(id): Path<String>,
    Json(request): Json<QuestionRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let question = request.question.trim();
    if question.is_empty() {
        return Err(ApiError::bad_request("Question must not be empty"));
    }

    let generator = generator(&state)?;
    let record = find_document(&state, &id).await?;

    let answer = generator.answer_question(&record.text, question).await?;

    Ok(Json(serde_json::json!({
        "document_id": record.id,
        "question": question,
        "answer": answer,
    })))
}

/// GET /api/v1/documents/:id/key-points
pub async fn key_points(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    let generator = generator(&state)?;
    let record = find_document(&state, &id).await?;

    let key_points = generator.generate_key_points(&record.text).await?;

    Ok(Json(serde_json::json!({
        "document_id": record.id,
        "key_points": key_points,
    })))
}
