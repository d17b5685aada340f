//! speaker-events: finds upcoming public events for a speaker
//!
//! Searches event-listing platforms through an external search provider,
//! batch-scrapes the candidate pages into structured records, and returns
//! the upcoming events sorted by date.

pub mod config;
pub mod error;
pub mod events;
pub mod network;
pub mod providers;
pub mod search;
pub mod web;

pub use config::Settings;
pub use error::EventSearchError;
pub use events::{Event, EventFilter};
pub use search::{EventSearch, SearchQuery, SearchResult};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
