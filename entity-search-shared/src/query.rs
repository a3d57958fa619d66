//! Search query parameters.

use serde::{Deserialize, Serialize};

/// Upper bound on hits returned by a single search.
pub const MAX_SEARCH_RESULTS: usize = 1000;

/// A free-text query matched across entity, event and job post fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// The query text.
    pub query: String,
    /// Maximum number of hits, never above [`MAX_SEARCH_RESULTS`].
    pub limit: usize,
}

impl SearchQuery {
    /// Create a query returning up to [`MAX_SEARCH_RESULTS`] hits.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            limit: MAX_SEARCH_RESULTS,
        }
    }

    /// Whether the query text has no searchable content.
    pub fn is_blank(&self) -> bool {
        self.query.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_result_cap() {
        let query = SearchQuery::new("engineer");
        assert_eq!(query.limit, MAX_SEARCH_RESULTS);
    }

    #[test]
    fn test_is_blank() {
        assert!(SearchQuery::new("   ").is_blank());
        assert!(!SearchQuery::new(" rust ").is_blank());
    }
}
