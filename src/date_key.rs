//! Canonical `YYYY-MM-DD` keys for per-day records.
//!
//! Every component that turns a date into a map key goes through here, so the
//! calendar, the store and the chart always agree on which day a value belongs to.

use chrono::{DateTime, NaiveDate};

const KEY_FORMAT: &str = "%Y-%m-%d";

pub fn date_key(date: NaiveDate) -> String {
    date.format(KEY_FORMAT).to_string()
}

/// Parses exactly `YYYY-MM-DD`. chrono's `%Y` alone would also take signed
/// and five-digit years, which are not valid keys.
pub fn parse_date_key(key: &str) -> Option<NaiveDate> {
    let key = key.trim();
    if !has_key_shape(key) {
        return None;
    }
    NaiveDate::parse_from_str(key, KEY_FORMAT).ok()
}

fn has_key_shape(key: &str) -> bool {
    let bytes = key.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

/// Accepts a bare day (`2024-07-17`) or an RFC 3339 timestamp
/// (`2024-07-17T23:30:00-05:00`). A timestamp keeps the calendar day of its
/// own offset rather than shifting to UTC.
pub fn normalize_date_input(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    if let Some(date) = parse_date_key(input) {
        return Some(date);
    }

    DateTime::parse_from_rfc3339(input)
        .ok()
        .map(|value| value.date_naive())
}
