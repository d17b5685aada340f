//! Event data models

use super::dates::EventDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use tracing::debug;
use url::Url;

/// A normalized upcoming event
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    /// The official name of the event
    #[serde(rename = "event_name")]
    pub name: String,
    /// Date text as listed on the event page
    #[serde(rename = "date")]
    pub date_text: String,
    /// Parsed date, `None` when the text was not understood
    #[serde(skip)]
    pub date: Option<EventDate>,
    /// Venue or city, empty for online events
    pub location: String,
    /// Canonical event page URL
    pub url: String,
    /// Confirmed speaker names
    pub speakers: Vec<String>,
    /// True if the event is virtual
    pub is_online: bool,
}

impl Event {
    /// Case-insensitive substring match against the speaker list
    pub fn features_speaker(&self, name: &str) -> bool {
        let needle = name.trim().to_lowercase();
        if needle.is_empty() {
            return false;
        }
        self.speakers
            .iter()
            .any(|s| s.to_lowercase().contains(&needle))
    }
}

/// Event modality filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventFilter {
    InPerson,
    Online,
}

impl EventFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InPerson => "in-person",
            Self::Online => "online",
        }
    }

    /// Whether an event passes this filter
    pub fn matches(&self, event: &Event) -> bool {
        match self {
            Self::InPerson => !event.is_online,
            Self::Online => event.is_online,
        }
    }
}

impl FromStr for EventFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "in-person" => Ok(Self::InPerson),
            "online" => Ok(Self::Online),
            other => Err(format!(
                "unrecognized filter '{}', expected 'in-person' or 'online'",
                other
            )),
        }
    }
}

impl fmt::Display for EventFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for EventFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Speakers as scraped: a list, or a single comma-separated string
#[derive(Debug, Clone)]
pub enum RawSpeakers {
    List(Vec<String>),
    Text(String),
}

impl<'de> Deserialize<'de> for RawSpeakers {
    /// Lists may hold nulls or `{"name": ...}` objects; anything that is not
    /// a name is dropped
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let speakers = match Value::deserialize(deserializer)? {
            Value::String(text) => Self::Text(text),
            Value::Array(items) => Self::List(items.iter().filter_map(speaker_name).collect()),
            other => Self::List(speaker_name(&other).into_iter().collect()),
        };
        Ok(speakers)
    }
}

fn speaker_name(value: &Value) -> Option<String> {
    match value {
        Value::String(name) => Some(name.clone()),
        Value::Object(map) => map.get("name").and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
}

impl RawSpeakers {
    pub fn names(&self) -> Vec<&str> {
        match self {
            Self::List(names) => names.iter().map(|s| s.as_str()).collect(),
            Self::Text(text) => text.split([',', ';']).collect(),
        }
    }
}

/// Alternative keys seen in extracted records, by canonical field
const FIELD_ALIASES: &[(&str, &[&str])] = &[
    ("event_name", &["name", "title"]),
    ("date", &["start_date", "starts_at"]),
    ("url", &["event_url", "link"]),
];

/// One event record as returned by the scraper, before validation
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawEventRecord {
    #[serde(deserialize_with = "lenient_string")]
    pub event_name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub date: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub location: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub url: Option<String>,
    pub speakers: Option<RawSpeakers>,
    #[serde(deserialize_with = "lenient_bool")]
    pub is_online: Option<bool>,
}

/// Strings, with numbers stringified and other values treated as absent
fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Booleans, also accepting "true"/"yes"/"1" style strings and 0/1
fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<bool>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(b) => Some(b),
        Value::Number(n) => n.as_i64().map(|n| n != 0),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    })
}

impl RawEventRecord {
    /// Split a page's extracted JSON into event records.
    ///
    /// Accepts an object with an `upcoming_events` (or `events`) array, a bare
    /// array, or a single event object. Entries that are not objects are
    /// ignored.
    pub fn from_page(value: &Value) -> Vec<RawEventRecord> {
        let items = match value {
            Value::Array(items) => items.as_slice(),
            Value::Object(map) => {
                match map.get("upcoming_events").or_else(|| map.get("events")) {
                    Some(Value::Array(items)) => items.as_slice(),
                    Some(_) => &[],
                    None => std::slice::from_ref(value),
                }
            }
            _ => &[],
        };

        items
            .iter()
            .filter_map(|item| match Self::from_object(item)? {
                Ok(record) => Some(record),
                Err(e) => {
                    debug!("Dropping malformed event record: {}", e);
                    None
                }
            })
            .collect()
    }

    /// Deserialize one record; `None` for non-object values
    fn from_object(item: &Value) -> Option<Result<RawEventRecord, serde_json::Error>> {
        let mut map = item.as_object()?.clone();
        for (field, aliases) in FIELD_ALIASES {
            let present = map.get(*field).is_some_and(|v| !v.is_null());
            let mut from_alias = None;
            for alias in *aliases {
                match map.remove(*alias) {
                    Some(value) if !present && from_alias.is_none() && !value.is_null() => {
                        from_alias = Some(value)
                    }
                    _ => {}
                }
            }
            if let Some(value) = from_alias {
                map.insert(field.to_string(), value);
            }
        }
        Some(serde_json::from_value(Value::Object(map)))
    }
}

/// Normalize a URL for identity comparison.
///
/// Drops the fragment and a trailing slash on the path; URL parsing already
/// lowercases scheme and host. Unparseable input is returned trimmed.
pub fn canonical_url(raw: &str) -> String {
    let raw = raw.trim();
    match Url::parse(raw) {
        Ok(mut url) => {
            url.set_fragment(None);
            let path = url.path().to_string();
            if path.len() > 1 && path.ends_with('/') {
                url.set_path(path.trim_end_matches('/'));
            }
            let mut out = url.to_string();
            if url.path() == "/" && url.query().is_none() && out.ends_with('/') {
                out.pop();
            }
            out
        }
        Err(_) => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_filter_parse() {
        assert_eq!("in-person".parse::<EventFilter>(), Ok(EventFilter::InPerson));
        assert_eq!("ONLINE".parse::<EventFilter>(), Ok(EventFilter::Online));
        assert!("hybrid".parse::<EventFilter>().is_err());
    }

    #[test]
    fn test_canonical_url() {
        assert_eq!(
            canonical_url("https://Lu.ma/ai-summit/#tickets"),
            "https://lu.ma/ai-summit"
        );
        assert_eq!(
            canonical_url(" https://www.meetup.com/group/events/123/ "),
            "https://www.meetup.com/group/events/123"
        );
        assert_eq!(canonical_url("https://lu.ma/"), "https://lu.ma");
        assert_eq!(canonical_url("not a url"), "not a url");
    }

    #[test]
    fn test_records_from_page() {
        let page = json!({
            "speaker_name": "Andrew Ng",
            "upcoming_events": [
                {"event_name": "AI Summit", "date": "Sat, Feb 7, 2026", "url": "https://lu.ma/ai"},
                "garbage",
                {"name": "ML Night", "speakers": "Andrew Ng, Jane Doe"}
            ]
        });
        let records = RawEventRecord::from_page(&page);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].event_name.as_deref(), Some("AI Summit"));
        assert_eq!(records[1].event_name.as_deref(), Some("ML Night"));
        assert_eq!(
            records[1].speakers.as_ref().map(|s| s.names()),
            Some(vec!["Andrew Ng", " Jane Doe"])
        );

        let single = json!({"event_name": "Solo", "url": "https://lu.ma/solo"});
        assert_eq!(RawEventRecord::from_page(&single).len(), 1);
        assert!(RawEventRecord::from_page(&json!({"upcoming_events": null})).is_empty());
    }

    #[test]
    fn test_records_tolerate_loose_types() {
        let page = json!([
            {
                "event_name": "AI Summit",
                "name": "ai summit (alias)",
                "link": "https://lu.ma/ai",
                "is_online": "true",
                "speakers": [null, "Andrew Ng", {"name": "Fei-Fei Li"}, 42]
            },
            {"title": "ML Night", "url": "https://lu.ma/ml", "is_online": 0, "date": 2026},
            {"event_name": null, "name": "Fallback", "is_online": "maybe"}
        ]);
        let records = RawEventRecord::from_page(&page);
        assert_eq!(records.len(), 3);

        assert_eq!(records[0].event_name.as_deref(), Some("AI Summit"));
        assert_eq!(records[0].url.as_deref(), Some("https://lu.ma/ai"));
        assert_eq!(records[0].is_online, Some(true));
        assert_eq!(
            records[0].speakers.as_ref().map(|s| s.names()),
            Some(vec!["Andrew Ng", "Fei-Fei Li"])
        );

        assert_eq!(records[1].event_name.as_deref(), Some("ML Night"));
        assert_eq!(records[1].is_online, Some(false));
        assert_eq!(records[1].date.as_deref(), Some("2026"));

        assert_eq!(records[2].event_name.as_deref(), Some("Fallback"));
        assert_eq!(records[2].is_online, None);
    }

    #[test]
    fn test_speaker_match() {
        let event = Event {
            name: "AI Summit".to_string(),
            date_text: String::new(),
            date: None,
            location: String::new(),
            url: "https://lu.ma/ai".to_string(),
            speakers: vec!["Dr. Andrew Ng".to_string()],
            is_online: true,
        };
        assert!(event.features_speaker("andrew ng"));
        assert!(!event.features_speaker("Fei-Fei Li"));
    }
}
