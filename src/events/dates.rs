//! Parsing of human-written event dates

use chrono::{
    DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc, Weekday,
};
use once_cell::sync::Lazy;
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;

/// When an event takes place.
///
/// Equality and ordering go through [`EventDate::instant`], so a bare day
/// equals a timestamp at midnight UTC of that day.
#[derive(Debug, Clone, Copy)]
pub enum EventDate {
    /// A specific moment
    At(DateTime<Utc>),
    /// A calendar day without a time of day
    Day(NaiveDate),
}

impl EventDate {
    /// Instant used for ordering; a bare day sorts at its start
    pub fn instant(&self) -> DateTime<Utc> {
        match self {
            Self::At(at) => *at,
            Self::Day(day) => Utc.from_utc_datetime(&day.and_time(NaiveTime::default())),
        }
    }

    /// Whether the event is strictly after `now`.
    ///
    /// Bare days compare at day granularity, so an event dated today is not
    /// after `now`.
    pub fn is_after(&self, now: DateTime<Utc>) -> bool {
        match self {
            Self::At(at) => *at > now,
            Self::Day(day) => *day > now.date_naive(),
        }
    }
}

impl PartialEq for EventDate {
    fn eq(&self, other: &Self) -> bool {
        self.instant() == other.instant()
    }
}

impl Eq for EventDate {}

impl PartialOrd for EventDate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for EventDate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.instant().cmp(&other.instant())
    }
}

impl fmt::Display for EventDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::At(at) => write!(f, "{}", at.to_rfc3339()),
            Self::Day(day) => write!(f, "{}", day.format("%Y-%m-%d")),
        }
    }
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%B %d, %Y %I:%M %p",
    "%B %d, %Y, %I:%M %p",
    "%B %d %Y %I:%M %p",
    "%B %d, %Y %H:%M",
    "%d %B %Y %I:%M %p",
    "%d %B %Y %H:%M",
    "%m/%d/%Y %I:%M %p",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%B %d, %Y",
    "%B %d %Y",
    "%d %B %Y",
    "%d %B, %Y",
    "%m/%d/%Y",
];

static LEADING_WEEKDAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(mon|tue|tues|wed|thu|thur|thurs|fri|sat|sun)(day|nesday|sday|urday|rsday)?\.?,?\s+")
        .expect("valid regex")
});
static ORDINAL_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(\d{1,2})(st|nd|rd|th)\b").expect("valid regex"));
static SEPARATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*(?:·|\||@|\s-\s|–|—|(?i:\bat\b))\s*").expect("valid regex"));
static SEPT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bsept\b").expect("valid regex"));
static TRAILING_TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)[,\s]+(?:\d{1,2}:\d{2}(?:\s*[ap]\.?m\.?)?|\d{1,2}\s*[ap]\.?m\.?)(?:\s+[a-z]{2,5})?$")
        .expect("valid regex")
});
static MONTH_DAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s+(\d{1,2}),?$")
        .expect("valid regex")
});
static DAY_MONTH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(\d{1,2})\s+(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?$")
        .expect("valid regex")
});
const MONTHS: &[&str] = &[
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];
static ISO_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{4}-\d{2}-\d{2}\b").expect("valid regex"));
static MONTH_DAY_YEAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(jan|feb|mar|apr|may|jun|jul|aug|sep|sept|oct|nov|dec)[a-z]*\.?\s+\d{1,2},?\s+\d{4}\b")
        .expect("valid regex")
});

/// Parse a scraped date string relative to `today`.
///
/// Returns `None` when no supported form is recognized.
pub fn parse_event_date(raw: &str, today: NaiveDate) -> Option<EventDate> {
    let text = raw.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(at) = DateTime::parse_from_rfc3339(text) {
        return Some(EventDate::At(at.with_timezone(&Utc)));
    }

    // Relative names keep their leading weekday, so match before cleaning
    let relative_head = strip_time(SEPARATORS.split(text).next().unwrap_or_default());
    if let Some(day) = parse_relative(&relative_head, today) {
        return Some(EventDate::Day(day));
    }

    let cleaned = clean(text);
    if let Some(date) = parse_absolute(&cleaned) {
        return Some(date);
    }

    // Decorated text such as "Feb 7, 2026 · 6:00 PM EST · Online"
    let head = strip_time(SEPARATORS.split(&cleaned).next().unwrap_or_default());
    if let Some(date) = parse_absolute(&head) {
        return Some(date);
    }

    find_embedded(&cleaned).or_else(|| parse_yearless(&head, today))
}

fn strip_time(text: &str) -> String {
    TRAILING_TIME.replace(text.trim(), "").trim().to_string()
}

fn clean(text: &str) -> String {
    let text = text.replace(['\u{a0}', '\u{202f}'], " ");
    let text = LEADING_WEEKDAY.replace(&text, "");
    let text = ORDINAL_SUFFIX.replace_all(&text, "$1");
    let text = SEPT.replace_all(&text, "Sep");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn parse_absolute(text: &str) -> Option<EventDate> {
    let text = text.trim().trim_end_matches(['.', ',']);
    if text.is_empty() {
        return None;
    }

    for format in DATETIME_FORMATS {
        if let Ok(at) = NaiveDateTime::parse_from_str(text, format) {
            return Some(EventDate::At(Utc.from_utc_datetime(&at)));
        }
    }

    for format in DATE_FORMATS {
        if let Ok(day) = NaiveDate::parse_from_str(text, format) {
            return Some(EventDate::Day(day));
        }
    }

    None
}

fn find_embedded(text: &str) -> Option<EventDate> {
    [&*MONTH_DAY_YEAR, &*ISO_DATE]
        .iter()
        .filter_map(|re| re.find(text))
        .find_map(|m| parse_absolute(m.as_str()))
}

/// Month and day without a year: the next occurrence on or after `today`
fn parse_yearless(text: &str, today: NaiveDate) -> Option<EventDate> {
    let text = text.trim().trim_end_matches(['.', ',']);
    let (month, day) = if let Some(caps) = MONTH_DAY.captures(text) {
        (month_number(&caps[1])?, caps[2].parse::<u32>().ok()?)
    } else if let Some(caps) = DAY_MONTH.captures(text) {
        (month_number(&caps[2])?, caps[1].parse::<u32>().ok()?)
    } else {
        return None;
    };

    // Leap days may be several years out
    (today.year()..=today.year() + 4)
        .filter_map(|year| NaiveDate::from_ymd_opt(year, month, day))
        .find(|date| *date >= today)
        .map(EventDate::Day)
}

fn month_number(name: &str) -> Option<u32> {
    let name = name.to_lowercase();
    MONTHS
        .iter()
        .position(|m| *m == name)
        .map(|index| index as u32 + 1)
}

fn parse_relative(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    let lower = text.to_lowercase();
    let lower = lower.trim_end_matches(['.', '!', ',']);

    match lower {
        "today" | "tonight" => return Some(today),
        "tomorrow" => return today.succ_opt(),
        _ => {}
    }

    let (strict, name) = match lower.strip_prefix("next ") {
        Some(rest) => (true, rest.trim()),
        None => (false, lower.strip_prefix("this ").unwrap_or(lower).trim()),
    };
    let weekday = parse_weekday(name)?;

    let mut offset = (7 + weekday.num_days_from_monday() as i64
        - today.weekday().num_days_from_monday() as i64)
        % 7;
    if strict && offset == 0 {
        offset = 7;
    }
    today.checked_add_signed(Duration::days(offset))
}

fn parse_weekday(name: &str) -> Option<Weekday> {
    let weekday = match name {
        "monday" | "mon" => Weekday::Mon,
        "tuesday" | "tue" | "tues" => Weekday::Tue,
        "wednesday" | "wed" => Weekday::Wed,
        "thursday" | "thu" | "thurs" => Weekday::Thu,
        "friday" | "fri" => Weekday::Fri,
        "saturday" | "sat" => Weekday::Sat,
        "sunday" | "sun" => Weekday::Sun,
        _ => return None,
    };
    Some(weekday)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        // A Wednesday
        NaiveDate::from_ymd_opt(2026, 1, 14).unwrap()
    }

    fn day(y: i32, m: u32, d: u32) -> Option<EventDate> {
        Some(EventDate::Day(NaiveDate::from_ymd_opt(y, m, d).unwrap()))
    }

    #[test]
    fn test_listing_formats() {
        assert_eq!(parse_event_date("Sat, Feb 7, 2026", today()), day(2026, 2, 7));
        assert_eq!(parse_event_date("Saturday, February 7, 2026", today()), day(2026, 2, 7));
        assert_eq!(parse_event_date("February 7th, 2026", today()), day(2026, 2, 7));
        assert_eq!(parse_event_date("7 Feb 2026", today()), day(2026, 2, 7));
        assert_eq!(parse_event_date("2026-02-07", today()), day(2026, 2, 7));
        assert_eq!(parse_event_date("02/07/2026", today()), day(2026, 2, 7));
        assert_eq!(parse_event_date("7 February 2026", today()), day(2026, 2, 7));
        assert_eq!(parse_event_date("Wednesday, March 4, 2026", today()), day(2026, 3, 4));
        assert_eq!(parse_event_date("Sept 12, 2026", today()), day(2026, 9, 12));
    }

    #[test]
    fn test_full_month_with_time() {
        let expected = Utc.with_ymd_and_hms(2026, 2, 7, 18, 0, 0).unwrap();
        assert_eq!(
            parse_event_date("February 7, 2026 6:00 PM", today()),
            Some(EventDate::At(expected))
        );
        assert_eq!(
            parse_event_date("Saturday, February 7, 2026 · 6:00 PM", today()),
            day(2026, 2, 7)
        );
    }

    #[test]
    fn test_timestamps() {
        let expected = Utc.with_ymd_and_hms(2026, 2, 7, 18, 0, 0).unwrap();
        assert_eq!(
            parse_event_date("2026-02-07T18:00:00Z", today()),
            Some(EventDate::At(expected))
        );
        assert_eq!(
            parse_event_date("2026-02-07T20:00:00+02:00", today()),
            Some(EventDate::At(expected))
        );
        assert_eq!(
            parse_event_date("2026-02-07 18:00", today()),
            Some(EventDate::At(expected))
        );
    }

    #[test]
    fn test_decorated_text() {
        assert_eq!(
            parse_event_date("Sat, Feb 7, 2026 · 6:00 PM EST", today()),
            day(2026, 2, 7)
        );
        assert_eq!(
            parse_event_date("Starts on Feb 7, 2026 in Berlin", today()),
            day(2026, 2, 7)
        );
    }

    #[test]
    fn test_relative_days() {
        assert_eq!(parse_event_date("today", today()), day(2026, 1, 14));
        assert_eq!(parse_event_date("Tomorrow", today()), day(2026, 1, 15));
        assert_eq!(parse_event_date("Saturday", today()), day(2026, 1, 17));
        assert_eq!(parse_event_date("Wednesday", today()), day(2026, 1, 14));
        assert_eq!(parse_event_date("next Wednesday", today()), day(2026, 1, 21));
        assert_eq!(parse_event_date("next mon", today()), day(2026, 1, 19));
    }

    #[test]
    fn test_relative_days_with_time() {
        assert_eq!(parse_event_date("Tomorrow · 7:00 PM", today()), day(2026, 1, 15));
        assert_eq!(parse_event_date("tomorrow at 6pm", today()), day(2026, 1, 15));
        assert_eq!(parse_event_date("Saturday, 6:00 PM", today()), day(2026, 1, 17));
        assert_eq!(parse_event_date("Next Friday @ 18:00", today()), day(2026, 1, 16));
        assert_eq!(parse_event_date("Tonight, 8 p.m. EST", today()), day(2026, 1, 14));
    }

    #[test]
    fn test_dates_without_year() {
        assert_eq!(parse_event_date("Sat, Feb 7", today()), day(2026, 2, 7));
        assert_eq!(parse_event_date("Feb 7 · 6:00 PM", today()), day(2026, 2, 7));
        assert_eq!(parse_event_date("February 7", today()), day(2026, 2, 7));
        assert_eq!(parse_event_date("14 Jan", today()), day(2026, 1, 14));
        // Already passed this year
        assert_eq!(parse_event_date("Jan 10, 7:00 PM", today()), day(2027, 1, 10));
        assert_eq!(parse_event_date("Feb 29", today()), day(2028, 2, 29));
        assert_eq!(parse_event_date("Feb 30", today()), None);
    }

    #[test]
    fn test_equality_follows_ordering() {
        let midnight = Utc.with_ymd_and_hms(2026, 2, 7, 0, 0, 0).unwrap();
        let bare = day(2026, 2, 7).unwrap();
        assert_eq!(bare, EventDate::At(midnight));
        assert_eq!(bare.cmp(&EventDate::At(midnight)), Ordering::Equal);
        assert!(bare < EventDate::At(midnight + Duration::hours(1)));
    }

    #[test]
    fn test_unparseable() {
        assert_eq!(parse_event_date("", today()), None);
        assert_eq!(parse_event_date("TBA", today()), None);
        assert_eq!(parse_event_date("sometime soon", today()), None);
    }

    #[test]
    fn test_is_after() {
        let now = Utc.with_ymd_and_hms(2026, 1, 14, 12, 0, 0).unwrap();
        assert!(!day(2026, 1, 14).unwrap().is_after(now));
        assert!(day(2026, 1, 15).unwrap().is_after(now));
        assert!(EventDate::At(now + Duration::minutes(1)).is_after(now));
        assert!(!EventDate::At(now).is_after(now));
    }
}
