//! Bulk request encoding and response decoding.

use serde_json::{json, Value};

use crate::errors::SearchIndexError;
use crate::types::{BatchOperationResult, BatchOperationSummary};
use entity_search_shared::Entity;

/// Build the bulk body: one `index` action line followed by the document, per entity,
/// in input order.
pub(crate) fn build_bulk_body(
    index_name: &str,
    entities: &[Entity],
) -> Result<Vec<Value>, SearchIndexError> {
    let mut body = Vec::with_capacity(entities.len() * 2);

    for entity in entities {
        body.push(json!({
            "index": { "_index": index_name, "_id": entity.document_id() }
        }));
        body.push(serde_json::to_value(entity)?);
    }

    Ok(body)
}

/// Turn a bulk response into a per-item summary.
///
/// Items without an `error` object are successes. A response that lacks the
/// `items` array is a malformed reply.
pub(crate) fn parse_bulk_response(body: &Value) -> Result<BatchOperationSummary, SearchIndexError> {
    let items = body
        .get("items")
        .and_then(Value::as_array)
        .ok_or_else(|| SearchIndexError::serialization("Bulk response has no items array"))?;

    let results = items
        .iter()
        .map(|item| {
            let action = item.get("index").unwrap_or(item);
            let document_id = action
                .get("_id")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            let error = action.get("error").map(|e| {
                e.get("reason")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| e.to_string())
            });

            BatchOperationResult {
                document_id,
                success: error.is_none(),
                error,
            }
        })
        .collect();

    Ok(BatchOperationSummary::from_results(results))
}
