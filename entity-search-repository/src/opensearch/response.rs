//! Mapping of engine replies onto `SearchIndexError`.

use opensearch::http::response::Response;
use serde_json::Value;
use tracing::debug;

use crate::errors::SearchIndexError;

/// Read a response body as JSON, turning non-2xx replies into typed errors.
///
/// `index` and, for single-document requests, `document_id` are carried into
/// not-found errors.
pub(crate) async fn read_json(
    response: Response,
    index: &str,
    document_id: Option<&str>,
) -> Result<Value, SearchIndexError> {
    let status = response.status_code();
    let text = response
        .text()
        .await
        .map_err(|e| SearchIndexError::connection(e.to_string()))?;
    let body = serde_json::from_str(&text).unwrap_or(Value::String(text));

    if status.is_success() {
        return Ok(body);
    }

    debug!(status = %status, index = %index, document_id, "Engine request failed");
    Err(classify_failure(status.as_u16(), body, index, document_id))
}

/// Classify a failed engine reply.
pub(crate) fn classify_failure(
    status: u16,
    body: Value,
    index: &str,
    document_id: Option<&str>,
) -> SearchIndexError {
    let error_type = body
        .pointer("/error/type")
        .and_then(Value::as_str)
        .unwrap_or_default();

    match (status, error_type) {
        (_, "resource_already_exists_exception") => SearchIndexError::IndexAlreadyExists {
            index: index.to_string(),
            body,
        },
        (_, "index_not_found_exception") => SearchIndexError::index_not_found(index),
        (404, _) => SearchIndexError::document_not_found(document_id.unwrap_or(index)),
        _ => {
            let reason = body
                .pointer("/error/reason")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| body.to_string());
            SearchIndexError::engine(status, reason)
        }
    }
}
