//! Mapping of scraped records into normalized events

use super::dates::parse_event_date;
use super::models::{canonical_url, Event, RawEventRecord};
use chrono::NaiveDate;
use std::collections::HashSet;
use tracing::debug;

/// Location words that mark an event as virtual
const ONLINE_MARKERS: &[&str] = &[
    "online",
    "virtual",
    "remote",
    "livestream",
    "live stream",
    "webinar",
    "zoom",
    "google meet",
    "microsoft teams",
];

/// Locations that carry no venue information beyond "online"
const ONLINE_ONLY_LOCATIONS: &[&str] = &[
    "online",
    "virtual",
    "remote",
    "online event",
    "virtual event",
    "online only",
    "zoom",
    "webinar",
];

/// Why a scraped record was not turned into an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    MissingName,
    MissingUrl,
}

/// Outcome of mapping a single scraped record
#[derive(Debug, Clone, PartialEq)]
pub enum MappedRecord {
    Valid(Event),
    Skipped(SkipReason),
}

/// Convert a raw record into an event; `today` anchors relative dates
pub fn map_record(raw: RawEventRecord, today: NaiveDate) -> MappedRecord {
    let name = match non_blank(raw.event_name.as_deref()) {
        Some(name) => name.to_string(),
        None => return MappedRecord::Skipped(SkipReason::MissingName),
    };
    let url = match non_blank(raw.url.as_deref()) {
        Some(url) => canonical_url(url),
        None => return MappedRecord::Skipped(SkipReason::MissingUrl),
    };

    let date_text = raw.date.as_deref().map(str::trim).unwrap_or_default().to_string();
    let date = parse_event_date(&date_text, today);
    if date.is_none() {
        debug!("Unrecognized date '{}' for event '{}'", date_text, name);
    }

    let raw_location = raw.location.as_deref().map(str::trim).unwrap_or_default();
    let is_online = raw_location.is_empty()
        || has_online_marker(raw_location)
        || raw.is_online == Some(true);
    let location = if is_online_only(raw_location) {
        String::new()
    } else {
        raw_location.to_string()
    };

    let speakers = raw
        .speakers
        .as_ref()
        .map(|s| normalize_speakers(s.names()))
        .unwrap_or_default();

    MappedRecord::Valid(Event {
        name,
        date_text,
        date,
        location,
        url,
        speakers,
        is_online,
    })
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn has_online_marker(location: &str) -> bool {
    let lower = location.to_lowercase();
    ONLINE_MARKERS.iter().any(|marker| lower.contains(marker))
}

fn is_online_only(location: &str) -> bool {
    let lower = location.to_lowercase();
    let lower = lower.trim_matches(|c: char| !c.is_alphanumeric());
    ONLINE_ONLY_LOCATIONS.contains(&lower)
}

/// Trim names, drop empties and case-insensitive repeats
fn normalize_speakers(names: Vec<&str>) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .into_iter()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .filter(|name| seen.insert(name.to_lowercase()))
        .map(str::to_string)
        .collect()
}
