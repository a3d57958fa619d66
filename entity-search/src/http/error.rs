//! Conversion of service errors into HTTP responses.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use entity_search_ingest::IngestError;
use entity_search_repository::SearchIndexError;

/// Error returned by every handler.
///
/// Rendered as `{"error": {"kind": ..., "message": ...}}` with a status that
/// depends on the underlying failure.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request could not be parsed.
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Search(#[from] SearchIndexError),

    #[error(transparent)]
    Ingest(#[from] IngestError),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    /// HTTP status and machine-readable kind.
    pub fn status_and_kind(&self) -> (StatusCode, &'static str) {
        match self {
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            Self::Search(e) => search_status(e),
            Self::Ingest(e) => match e {
                IngestError::InvalidPlan(_) => (StatusCode::BAD_REQUEST, "validation"),
                IngestError::BatchFailed { source, .. } => search_status(source),
                IngestError::Cancelled { .. } => (StatusCode::SERVICE_UNAVAILABLE, "cancelled"),
                IngestError::TimedOut { .. } => (StatusCode::GATEWAY_TIMEOUT, "timed_out"),
                IngestError::TaskFailed(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
            },
        }
    }
}

fn search_status(err: &SearchIndexError) -> (StatusCode, &'static str) {
    match err {
        SearchIndexError::ValidationError(_) => (StatusCode::BAD_REQUEST, "validation"),
        SearchIndexError::BatchSizeExceeded { .. } => {
            (StatusCode::BAD_REQUEST, "batch_size_exceeded")
        }
        SearchIndexError::DocumentNotFound(_) | SearchIndexError::IndexNotFound(_) => {
            (StatusCode::NOT_FOUND, "not_found")
        }
        SearchIndexError::ConnectionError(_) => {
            (StatusCode::SERVICE_UNAVAILABLE, "engine_unavailable")
        }
        SearchIndexError::IndexAlreadyExists { .. } => (StatusCode::CONFLICT, "already_exists"),
        SearchIndexError::EngineError { .. } => (StatusCode::BAD_GATEWAY, "engine"),
        SearchIndexError::BulkOperationError(_) => (StatusCode::BAD_GATEWAY, "bulk"),
        SearchIndexError::SerializationError(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "serialization")
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind) = self.status_and_kind();
        let message = self.to_string();

        if status.is_server_error() {
            error!(status = status.as_u16(), kind, error = %message, "Request failed");
        } else {
            warn!(status = status.as_u16(), kind, error = %message, "Request rejected");
        }

        let body = json!({ "error": { "kind": kind, "message": message } });
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_error_statuses() {
        let cases = [
            (SearchIndexError::validation("x"), StatusCode::BAD_REQUEST),
            (SearchIndexError::batch_size_exceeded(3, 2), StatusCode::BAD_REQUEST),
            (SearchIndexError::document_not_found("x"), StatusCode::NOT_FOUND),
            (SearchIndexError::index_not_found("x"), StatusCode::NOT_FOUND),
            (SearchIndexError::connection("x"), StatusCode::SERVICE_UNAVAILABLE),
            (SearchIndexError::engine(400, "x"), StatusCode::BAD_GATEWAY),
            (SearchIndexError::bulk_operation("x"), StatusCode::BAD_GATEWAY),
            (SearchIndexError::serialization("x"), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).status_and_kind().0, expected);
        }
    }

    #[test]
    fn test_ingest_error_statuses() {
        let failed = IngestError::BatchFailed {
            batch: 1,
            committed: 0,
            source: SearchIndexError::connection("refused"),
        };
        assert_eq!(
            ApiError::from(failed).status_and_kind(),
            (StatusCode::SERVICE_UNAVAILABLE, "engine_unavailable")
        );
        assert_eq!(
            ApiError::from(IngestError::Cancelled { committed: 10 }).status_and_kind().0,
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::from(IngestError::TimedOut { committed: 10 }).status_and_kind().0,
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            ApiError::from(IngestError::invalid_plan("zero")).status_and_kind().0,
            StatusCode::BAD_REQUEST
        );
    }
}
