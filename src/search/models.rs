//! Search request and response models

use crate::error::EventSearchError;
use crate::events::{Event, EventFilter};
use serde::Serialize;

/// A validated event search request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    /// Speaker name, trimmed and non-empty
    pub speaker_name: String,
    /// Optional modality filter
    pub filter: Option<EventFilter>,
}

impl SearchQuery {
    /// Validate raw request parameters.
    ///
    /// An empty `filter` string is treated as unset; filter values are
    /// matched case-insensitively.
    pub fn parse(speaker_name: Option<&str>, filter: Option<&str>) -> Result<Self, EventSearchError> {
        let speaker_name = match speaker_name.map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => {
                return Err(EventSearchError::invalid_request(
                    "missing 'name' query parameter",
                ))
            }
        };

        let filter = match filter.map(str::trim) {
            None | Some("") => None,
            Some(value) => Some(
                value
                    .parse::<EventFilter>()
                    .map_err(EventSearchError::invalid_request)?,
            ),
        };

        Ok(Self {
            speaker_name,
            filter,
        })
    }

    pub fn new(speaker_name: impl Into<String>) -> Self {
        Self {
            speaker_name: speaker_name.into(),
            filter: None,
        }
    }

    pub fn with_filter(mut self, filter: EventFilter) -> Self {
        self.filter = Some(filter);
        self
    }
}

/// Response payload of an event search
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub speaker_name: String,
    pub upcoming_events: Vec<Event>,
}

impl SearchResult {
    pub fn empty(speaker_name: impl Into<String>) -> Self {
        Self {
            speaker_name: speaker_name.into(),
            upcoming_events: Vec::new(),
        }
    }
}
