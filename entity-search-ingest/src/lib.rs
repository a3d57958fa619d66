//! # Entity Search Ingest
//!
//! This crate provides the components that fill the entity index with
//! synthetic data.
//!
//! ## Architecture
//!
//! 1. **Generator**: builds random entities with nested events and job posts
//! 2. **Loader**: splits a run into fixed-size batches and bulk-indexes each
//!    one in turn, stopping on failure, shutdown, or deadline

pub mod errors;
pub mod generator;
pub mod loader;

pub use errors::IngestError;
pub use generator::{generate_batch, generate_entity, generate_entity_with};
pub use loader::{BulkLoader, GenerationPlan, LoadReport, LoaderConfig};
