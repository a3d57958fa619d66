//! Entity document model.
//!
//! An [`Entity`] is the unit stored in the search index. Its events and job
//! posts are embedded sub-records; they are indexed as `nested` objects and are
//! never addressable on their own.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A searchable entity with its embedded events and job posts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Unique identifier, also used as the engine document `_id`.
    pub entity_id: Uuid,
    /// Display name.
    pub name: String,
    /// Free text description.
    pub description: String,
    /// Exact-match tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Events owned by this entity.
    #[serde(default)]
    pub events: Vec<Event>,
    /// Job posts owned by this entity.
    #[serde(default)]
    pub job_posts: Vec<JobPost>,
}

impl Entity {
    /// Document identifier used when writing this entity to the index.
    pub fn document_id(&self) -> String {
        self.entity_id.to_string()
    }
}

/// An event embedded in an [`Entity`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub event_id: Uuid,
    pub name: String,
    pub description: String,
    /// Serialized as an RFC 3339 instant.
    pub timestamp: DateTime<Utc>,
}

/// A job post embedded in an [`Entity`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPost {
    pub id: Uuid,
    /// Back-reference to the owning entity.
    pub entity_id: Uuid,
    pub title: String,
    pub description: String,
    pub salary: u32,
    #[serde(default)]
    pub tags: Vec<String>,
}
