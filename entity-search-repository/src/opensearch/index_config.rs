//! OpenSearch index configuration and mappings.
//!
//! This module defines the mappings for the entity search index.

use serde_json::{json, Value};

/// Get the index body (mappings) for the entity search index.
///
/// `events` and `job_posts` are `nested` so that a multi-field match is
/// evaluated within one event or job post, never across two of them.
/// Identifier fields are `keyword` for exact lookups.
pub fn get_index_settings() -> Value {
    json!({
        "mappings": {
            "properties": {
                "entity_id": { "type": "keyword" },
                "name": { "type": "text" },
                "description": { "type": "text" },
                "tags": { "type": "keyword" },
                "events": {
                    "type": "nested",
                    "properties": {
                        "event_id": { "type": "keyword" },
                        "name": { "type": "text" },
                        "description": { "type": "text" },
                        "timestamp": { "type": "date" }
                    }
                },
                "job_posts": {
                    "type": "nested",
                    "properties": {
                        "id": { "type": "keyword" },
                        "entity_id": { "type": "keyword" },
                        "title": { "type": "text" },
                        "description": { "type": "text" },
                        "salary": { "type": "integer" },
                        "tags": { "type": "keyword" }
                    }
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_settings_structure() {
        let settings = get_index_settings();
        let properties = &settings["mappings"]["properties"];

        assert_eq!(properties["name"]["type"], "text");
        assert_eq!(properties["description"]["type"], "text");
        assert_eq!(properties["tags"]["type"], "keyword");
        assert_eq!(properties["entity_id"]["type"], "keyword");
    }

    #[test]
    fn test_nested_collections() {
        let settings = get_index_settings();
        let properties = &settings["mappings"]["properties"];

        assert_eq!(properties["events"]["type"], "nested");
        assert_eq!(properties["job_posts"]["type"], "nested");

        assert_eq!(properties["events"]["properties"]["timestamp"]["type"], "date");
        assert_eq!(properties["job_posts"]["properties"]["salary"]["type"], "integer");
        assert_eq!(properties["job_posts"]["properties"]["tags"]["type"], "keyword");
        assert_eq!(properties["job_posts"]["properties"]["title"]["type"], "text");
    }
}
