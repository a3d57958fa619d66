//! Request and response types for search index operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::errors::SearchIndexError;
use entity_search_shared::{Entity, Event, JobPost};

/// An event supplied by a caller. The identifier is generated when omitted.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventRequest {
    pub event_id: Option<Uuid>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub timestamp: DateTime<Utc>,
}

impl From<EventRequest> for Event {
    fn from(req: EventRequest) -> Self {
        Event {
            event_id: req.event_id.unwrap_or_else(Uuid::new_v4),
            name: req.name,
            description: req.description,
            timestamp: req.timestamp,
        }
    }
}

/// A job post supplied by a caller.
///
/// There is no `entity_id` field: the back-reference is always the owning entity.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobPostRequest {
    pub id: Option<Uuid>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub salary: u32,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl JobPostRequest {
    fn into_job_post(self, entity_id: Uuid) -> JobPost {
        JobPost {
            id: self.id.unwrap_or_else(Uuid::new_v4),
            entity_id,
            title: self.title,
            description: self.description,
            salary: self.salary,
            tags: self.tags,
        }
    }
}

/// Request to create a new entity document in the search index.
///
/// `name` is required. `entity_id` is generated when omitted; every other field
/// defaults to empty.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateEntityRequest {
    /// The entity's unique identifier.
    pub entity_id: Option<Uuid>,
    /// Entity display name.
    pub name: String,
    /// Description text.
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub events: Vec<EventRequest>,
    #[serde(default)]
    pub job_posts: Vec<JobPostRequest>,
}

impl CreateEntityRequest {
    /// Check required fields.
    pub fn validate(&self) -> Result<(), SearchIndexError> {
        if self.name.trim().is_empty() {
            return Err(SearchIndexError::validation("name is required"));
        }
        validate_events(&self.events)?;
        validate_job_posts(&self.job_posts)
    }
}

impl From<CreateEntityRequest> for Entity {
    fn from(req: CreateEntityRequest) -> Self {
        let entity_id = req.entity_id.unwrap_or_else(Uuid::new_v4);

        Entity {
            entity_id,
            name: req.name,
            description: req.description,
            tags: req.tags,
            events: req.events.into_iter().map(Into::into).collect(),
            job_posts: req
                .job_posts
                .into_iter()
                .map(|post| post.into_job_post(entity_id))
                .collect(),
        }
    }
}

/// Request to update an existing entity document in the search index.
///
/// Only fields that are `Some` will be updated; fields that are `None` remain
/// unchanged in the index. Nested lists replace the stored list as a whole.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateEntityRequest {
    /// The entity's display name.
    pub name: Option<String>,
    /// Description text.
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
    pub events: Option<Vec<EventRequest>>,
    pub job_posts: Option<Vec<JobPostRequest>>,
}

impl UpdateEntityRequest {
    /// Set the name to update.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the description to update.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the tags to update.
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = Some(tags);
        self
    }

    /// Check if any fields are set for update.
    pub fn has_updates(&self) -> bool {
        self.name.is_some()
            || self.description.is_some()
            || self.tags.is_some()
            || self.events.is_some()
            || self.job_posts.is_some()
    }

    /// Reject empty updates and blank names.
    pub fn validate(&self) -> Result<(), SearchIndexError> {
        if !self.has_updates() {
            return Err(SearchIndexError::validation(
                "update must set at least one field",
            ));
        }
        if matches!(&self.name, Some(name) if name.trim().is_empty()) {
            return Err(SearchIndexError::validation("name must not be blank"));
        }
        if let Some(events) = &self.events {
            validate_events(events)?;
        }
        if let Some(job_posts) = &self.job_posts {
            validate_job_posts(job_posts)?;
        }
        Ok(())
    }

    /// Build the partial document merged into the stored entity.
    pub fn into_partial_document(self, entity_id: Uuid) -> Result<Value, SearchIndexError> {
        let mut doc = Map::new();
        if let Some(name) = self.name {
            doc.insert("name".to_string(), Value::String(name));
        }
        if let Some(description) = self.description {
            doc.insert("description".to_string(), Value::String(description));
        }
        if let Some(tags) = self.tags {
            doc.insert("tags".to_string(), serde_json::to_value(tags)?);
        }
        if let Some(events) = self.events {
            let events: Vec<Event> = events.into_iter().map(Into::into).collect();
            doc.insert("events".to_string(), serde_json::to_value(events)?);
        }
        if let Some(job_posts) = self.job_posts {
            let job_posts: Vec<JobPost> = job_posts
                .into_iter()
                .map(|post| post.into_job_post(entity_id))
                .collect();
            doc.insert("job_posts".to_string(), serde_json::to_value(job_posts)?);
        }
        Ok(Value::Object(doc))
    }
}

fn validate_events(events: &[EventRequest]) -> Result<(), SearchIndexError> {
    if events.iter().any(|event| event.name.trim().is_empty()) {
        return Err(SearchIndexError::validation("event name must not be blank"));
    }
    Ok(())
}

fn validate_job_posts(job_posts: &[JobPostRequest]) -> Result<(), SearchIndexError> {
    if job_posts.iter().any(|post| post.title.trim().is_empty()) {
        return Err(SearchIndexError::validation(
            "job post title must not be blank",
        ));
    }
    Ok(())
}

/// Result of a batch operation for a single item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchOperationResult {
    /// Identifier of the document the item wrote.
    pub document_id: String,
    /// Whether the operation succeeded.
    pub success: bool,
    /// Engine error reason if the operation failed.
    pub error: Option<String>,
}

/// Summary of a batch operation containing aggregate statistics and individual results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchOperationSummary {
    /// Total number of items in the batch.
    pub total: usize,
    /// Number of successful operations.
    pub succeeded: usize,
    /// Number of failed operations.
    pub failed: usize,
    /// Individual results for each item.
    pub results: Vec<BatchOperationResult>,
}

impl BatchOperationSummary {
    /// Summary of a batch with no items.
    pub fn empty() -> Self {
        Self {
            total: 0,
            succeeded: 0,
            failed: 0,
            results: vec![],
        }
    }

    /// Build a summary from per-item results.
    pub fn from_results(results: Vec<BatchOperationResult>) -> Self {
        let succeeded = results.iter().filter(|r| r.success).count();
        Self {
            total: results.len(),
            succeeded,
            failed: results.len() - succeeded,
            results,
        }
    }

    /// The first failed item, if any.
    pub fn first_failure(&self) -> Option<&BatchOperationResult> {
        self.results.iter().find(|r| !r.success)
    }
}
