//! API error type and its HTTP mapping

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use docsearch_core::CoreError;
use docsearch_ingestion::IngestionError;
use serde_json::json;
use tracing::warn;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Ingestion(#[from] IngestionError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Failed to read upload: {0}")]
    Multipart(#[from] MultipartError),

    #[error("File type not allowed: {0}")]
    FileTypeNotAllowed(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("Text generation is not configured")]
    GeneratorUnavailable,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    fn status_and_type(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Ingestion(err) => match err {
                IngestionError::UnsupportedFileType(_) => {
                    (StatusCode::UNSUPPORTED_MEDIA_TYPE, "unsupported_type")
                }
                IngestionError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
                IngestionError::DocumentTooLarge { .. } => {
                    (StatusCode::PAYLOAD_TOO_LARGE, "document_too_large")
                }
                IngestionError::Extraction { .. } => {
                    (StatusCode::UNPROCESSABLE_ENTITY, "extraction_error")
                }
                IngestionError::Metadata { .. } => {
                    (StatusCode::UNPROCESSABLE_ENTITY, "metadata_error")
                }
                IngestionError::Task(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
            },
            Self::Core(err) => match err {
                CoreError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
                CoreError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "unauthorized"),
                CoreError::Generation(_) => (StatusCode::BAD_GATEWAY, "generation_error"),
                CoreError::Storage(_) | CoreError::Credentials(_) | CoreError::Config(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
                }
            },
            Self::Multipart(err) => (err.status(), "invalid_upload"),
            Self::FileTypeNotAllowed(_) => (StatusCode::UNSUPPORTED_MEDIA_TYPE, "unsupported_type"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            Self::Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden"),
            Self::GeneratorUnavailable => (StatusCode::SERVICE_UNAVAILABLE, "generator_unavailable"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type) = self.status_and_type();

        if status.is_server_error() {
            warn!(status = %status, error = %self, "Request failed");
        }

        let body = Json(json!({
            "error": {
                "type": error_type,
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ingestion_error_status() {
        let cases = [
            (IngestionError::UnsupportedFileType("exe".into()), StatusCode::UNSUPPORTED_MEDIA_TYPE),
            (IngestionError::DocumentTooLarge { size: 2, max: 1 }, StatusCode::PAYLOAD_TOO_LARGE),
            (
                IngestionError::Extraction {
                    input: "a.pdf".into(),
                    reason: "bad xref".into(),
                },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (IngestionError::Validation("overlap".into()), StatusCode::BAD_REQUEST),
        ];

        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).into_response().status(), expected);
        }
    }

    #[test]
    fn test_core_error_status() {
        let not_found = ApiError::from(CoreError::NotFound("doc".into()));
        assert_eq!(not_found.into_response().status(), StatusCode::NOT_FOUND);

        let unauthorized = ApiError::from(CoreError::Unauthorized("expired".into()));
        assert_eq!(unauthorized.into_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_generator_unavailable_is_503() {
        let response = ApiError::GeneratorUnavailable.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
