// Date resolution - extracts a relative date phrase from free text and
// resolves it to an absolute calendar date.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use regex::Regex;
use tracing::debug;

// Pattern order is significant: earlier patterns take precedence over the
// later, more general ones. First match wins.
const PATTERNS: &[&str] = &[
    r"(?i)\b(?:today|tomorrow|yesterday)\b",
    r"(?i)\b(?:this|next|coming)\s+(?:monday|tuesday|wednesday|thursday|friday|saturday|sunday)\b",
    r"(?i)\bin\s+(\d+)\s+(?:day|days|week|weeks)\b",
];

/// Scan `text` for a relative date phrase and resolve it against `today`.
/// Absence of a match is not an error; this never panics on user input.
pub fn resolve_relative_dates(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    for pattern in PATTERNS {
        let re = Regex::new(pattern).unwrap();
        if let Some(m) = re.find(text) {
            let phrase = m.as_str();
            if let Some(date) = parse_phrase(phrase, today) {
                debug!(phrase = %phrase, resolved = %date, "resolved relative date");
                return Some(date);
            }
        }
    }
    None
}

fn parse_phrase(phrase: &str, today: NaiveDate) -> Option<NaiveDate> {
    let lower = phrase.to_lowercase();
    let lower = lower.trim();

    match lower {
        "today" => return Some(today),
        "tomorrow" => return Some(today + Duration::days(1)),
        "yesterday" => return Some(today - Duration::days(1)),
        _ => {}
    }

    // "in N day(s)/week(s)"
    if let Some(rest) = lower.strip_prefix("in ") {
        let mut parts = rest.split_whitespace();
        let n: i64 = parts.next()?.parse().ok()?;
        let unit = parts.next()?;
        let days = if unit.starts_with("week") { n * 7 } else { n };
        return Some(today + Duration::days(days));
    }

    // "this/next/coming <weekday>" - future-biased: a weekday name resolves
    // to the next occurrence strictly after today, never the past one.
    let day_word = lower.split_whitespace().last()?;
    let target = weekday_from_str(day_word)?;
    Some(next_occurrence(today, target))
}

fn weekday_from_str(s: &str) -> Option<Weekday> {
    match s {
        "monday" => Some(Weekday::Mon),
        "tuesday" => Some(Weekday::Tue),
        "wednesday" => Some(Weekday::Wed),
        "thursday" => Some(Weekday::Thu),
        "friday" => Some(Weekday::Fri),
        "saturday" => Some(Weekday::Sat),
        "sunday" => Some(Weekday::Sun),
        _ => None,
    }
}

fn next_occurrence(today: NaiveDate, target: Weekday) -> NaiveDate {
    let ahead = (target.num_days_from_monday() as i64
        - today.weekday().num_days_from_monday() as i64)
        .rem_euclid(7);
    let ahead = if ahead == 0 { 7 } else { ahead };
    today + Duration::days(ahead)
}
