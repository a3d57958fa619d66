//! # Entity Search Shared
//!
//! Document types shared between the repository, the ingest pipeline and the
//! HTTP service.

mod entity;
mod query;

pub use entity::{Entity, Event, JobPost};
pub use query::{SearchQuery, MAX_SEARCH_RESULTS};
