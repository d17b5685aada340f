//! Filtering, de-duplication and ordering of mapped events

use super::models::{Event, EventFilter};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use tracing::debug;

/// Reduce events to the final result list.
///
/// Keeps events with a known date strictly after `now`, applies the modality
/// filter, drops repeated URLs (first occurrence wins) and sorts by date.
/// The sort is stable, so events on the same date keep their input order.
pub fn process(events: Vec<Event>, filter: Option<EventFilter>, now: DateTime<Utc>) -> Vec<Event> {
    let total = events.len();

    let upcoming: Vec<Event> = events
        .into_iter()
        .filter(|event| match event.date {
            Some(date) => date.is_after(now),
            None => false,
        })
        .collect();
    debug!("{} of {} events are upcoming", upcoming.len(), total);

    let mut filtered: Vec<Event> = match filter {
        Some(filter) => {
            let kept: Vec<Event> = upcoming.into_iter().filter(|e| filter.matches(e)).collect();
            debug!("After filtering for '{}': {} events", filter, kept.len());
            kept
        }
        None => upcoming,
    };

    let mut seen = HashSet::new();
    filtered.retain(|event| seen.insert(event.url.clone()));

    filtered.sort_by_key(|event| event.date.map(|d| d.instant()));
    filtered
}
