//! Search orchestration module
//!
//! Builds per-platform queries, gathers candidate pages, runs the batch
//! scrape and turns the extracted records into the final result.

mod executor;
mod models;
mod query;

pub use executor::EventSearch;
pub use models::*;
pub use query::{event_schema, extraction_request, platform_query};
