//! OpenSearch query builders.

use serde_json::{json, Value};

use entity_search_shared::SearchQuery;

/// Maximum number of documents returned by a listing.
pub const LIST_LIMIT: usize = 10;

/// Entity-level fields matched by a search.
const ENTITY_FIELDS: [&str; 3] = ["name", "description", "tags"];

/// Event fields, matched within a single nested event.
const EVENT_FIELDS: [&str; 2] = ["events.name", "events.description"];

/// Job post fields, matched within a single nested job post.
const JOB_POST_FIELDS: [&str; 3] = [
    "job_posts.title",
    "job_posts.description",
    "job_posts.tags",
];

/// Build the search body for a free-text query.
///
/// The query is a `bool` with three `should` clauses, one for the entity's own
/// fields and one `nested` clause each for events and job posts. A document
/// matches when at least one clause matches; hits come back as whole entities
/// ranked by score.
pub fn build_search_query(query: &SearchQuery) -> Value {
    json!({
        "query": {
            "bool": {
                "should": [
                    {
                        "multi_match": {
                            "query": query.query,
                            "fields": ENTITY_FIELDS
                        }
                    },
                    build_nested_match("events", &query.query, &EVENT_FIELDS),
                    build_nested_match("job_posts", &query.query, &JOB_POST_FIELDS)
                ],
                "minimum_should_match": 1
            }
        },
        "size": query.limit
    })
}

/// Build a `nested` clause running a `multi_match` inside `path`.
fn build_nested_match(path: &str, query_text: &str, fields: &[&str]) -> Value {
    json!({
        "nested": {
            "path": path,
            "query": {
                "multi_match": {
                    "query": query_text,
                    "fields": fields
                }
            }
        }
    })
}

/// Build the body used to list documents.
pub fn build_list_query(size: usize) -> Value {
    json!({
        "query": { "match_all": {} },
        "size": size
    })
}
