//! Timestamp extraction from backup keys
//!
//! Keys carry their backup time in the filename, e.g.
//! `db/dump_2024-11-29_14-35-02.sql.gz`. A configurable regex pulls the
//! datetime substring out of the key; the substring is then parsed against a
//! fixed, ordered list of accepted formats.

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;

/// Default extraction pattern: `YYYY-MM-DD_HH-MM-SS`.
pub const DEFAULT_DATETIME_PATTERN: &str = r"\d{4}-\d{2}-\d{2}_\d{2}-\d{2}-\d{2}";

/// Accepted formats carrying a time of day, tried first.
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d_%H-%M-%S", "%Y-%m-%d_%H-%M", "%Y%m%d_%H%M%S"];

/// Accepted date-only formats; parsed as midnight.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y%m%d"];

/// Extract and parse the timestamp embedded in `key`.
///
/// Returns `None` when the pattern does not match or the matched substring
/// parses under none of the accepted formats. Callers treat such keys as
/// non-backups and leave them alone.
pub fn extract_timestamp(key: &str, pattern: &Regex) -> Option<NaiveDateTime> {
    let matched = pattern.find(key)?.as_str();
    parse_datetime(matched)
}

/// Parse a datetime string against the accepted formats, first match wins.
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    for format in DATETIME_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(s, format) {
            return Some(ts);
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return date.and_hms_opt(0, 0, 0);
        }
    }

    None
}
