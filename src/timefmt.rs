//! Stateless date/time helpers shared by the sync core and its callers.
//!
//! The schedule endpoint is indexed by the canonical `YYYY-MM-DD` date-key;
//! tip-off times arrive as raw scoreboard strings ("7:00 pm ET",
//! "Final-9:30 pm EST") and are only cleaned up for display.

use chrono::NaiveDate;

const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// Canonical wire form of a calendar date, e.g. `2024-01-15`.
pub fn date_key(date: NaiveDate) -> String {
    date.format(DATE_KEY_FORMAT).to_string()
}

pub fn parse_date_key(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_KEY_FORMAT).ok()
}

/// Human-readable form, e.g. "Monday, January 15".
pub fn display_date(date: NaiveDate) -> String {
    date.format("%A, %B %-d").to_string()
}

/// Clean a raw scoreboard tip-off string for display.
///
/// Strings may carry a status prefix ("Final-9:30 pm EST") and a timezone
/// suffix; only the bare clock time is kept. Unknown/empty input maps to
/// the "--:--" placeholder.
pub fn clean_start_time(raw: &str) -> String {
    if raw.trim().is_empty() {
        return "--:--".to_string();
    }
    let tail = match raw.split_once('-') {
        Some((_, rest)) => rest,
        None => raw,
    };
    tail.replace("EST", "").replace("ET", "").trim().to_string()
}
