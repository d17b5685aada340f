//! Provider query and extraction request construction

use crate::config::PlatformConfig;
use crate::providers::ExtractionRequest;
use chrono::NaiveDate;
use serde_json::json;

/// Search query restricting results to one platform's pages
pub fn platform_query(platform: &PlatformConfig, speaker_name: &str) -> String {
    let name = speaker_name.replace('"', "");
    format!("site:{} \"{}\"", platform.domain.trim(), name.trim())
}

/// JSON schema of the structured output requested for each page
pub fn event_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "speaker_name": {
                "type": "string",
                "description": "The name of the speaker being searched for"
            },
            "upcoming_events": {
                "type": "array",
                "description": "List of future events where this person is speaking",
                "items": {
                    "type": "object",
                    "properties": {
                        "event_name": {
                            "type": "string",
                            "description": "The official name of the event"
                        },
                        "date": {
                            "type": "string",
                            "description": "The event date in format 'Day, Mon DD, YYYY' (e.g., 'Sat, Feb 7, 2026')"
                        },
                        "location": {
                            "type": "string",
                            "description": "Physical location or 'Online'"
                        },
                        "url": {
                            "type": "string",
                            "description": "URL link to the event page"
                        },
                        "speakers": {
                            "type": "array",
                            "items": {"type": "string"},
                            "description": "List of confirmed speaker names"
                        },
                        "is_online": {
                            "type": "boolean",
                            "description": "True if the event is virtual"
                        }
                    },
                    "required": ["event_name", "date", "location", "url", "speakers", "is_online"]
                }
            }
        },
        "required": ["speaker_name", "upcoming_events"]
    })
}

/// Extraction schema and instruction for one speaker search
pub fn extraction_request(speaker_name: &str, today: NaiveDate) -> ExtractionRequest {
    let today = today.format("%B %d, %Y");
    let prompt = format!(
        "Today is {today}. Extract only upcoming events (on or after {today}) \
         that list {speaker} as a speaker. {speaker} must appear in the speakers \
         list of every returned event. Ignore past events.",
        today = today,
        speaker = speaker_name,
    );

    ExtractionRequest {
        schema: event_schema(),
        prompt,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_query() {
        let platform = PlatformConfig::new("luma", "lu.ma");
        assert_eq!(platform_query(&platform, "Andrew Ng"), "site:lu.ma \"Andrew Ng\"");
        assert_eq!(
            platform_query(&platform, "Andrew \"The\" Ng"),
            "site:lu.ma \"Andrew The Ng\""
        );
    }

    #[test]
    fn test_extraction_request() {
        let today = NaiveDate::from_ymd_opt(2026, 1, 14).unwrap();
        let request = extraction_request("Andrew Ng", today);
        assert!(request.prompt.starts_with("Today is January 14, 2026."));
        assert!(request.prompt.contains("Andrew Ng"));

        let fields = &request.schema["properties"]["upcoming_events"]["items"]["properties"];
        for field in ["event_name", "date", "location", "url", "speakers", "is_online"] {
            assert!(fields.get(field).is_some(), "missing {}", field);
        }
    }
}
