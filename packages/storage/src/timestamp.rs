// ABOUTME: Timestamp encoding for the tokens table
// ABOUTME: Fixed-width UTC text so lexical order matches chronological order

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::StorageError;

/// Column format, identical to SQLite's datetime('now')
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn encode(at: DateTime<Utc>) -> String {
    at.format(TIME_FORMAT).to_string()
}

pub fn decode(raw: &str) -> Result<DateTime<Utc>, StorageError> {
    NaiveDateTime::parse_from_str(raw, TIME_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|e| StorageError::InvalidTimestamp(format!("{}: {}", raw, e)))
}
