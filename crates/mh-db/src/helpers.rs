//! Row-to-entity parsing helpers.
//!
//! Dates are stored as `YYYY-MM-DD` TEXT, timestamps as RFC 3339 TEXT with
//! microsecond precision so they sort lexically.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

use crate::error::DatabaseError;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a required TEXT column as `DateTime<Utc>`.
///
/// Handles both RFC 3339 (`"2026-02-09T14:30:00+00:00"`) and `SQLite`'s default
/// format (`"2026-02-09 14:30:00"`).
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the string cannot be parsed as either format.
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, DatabaseError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|e| DatabaseError::Query(format!("Failed to parse datetime '{s}': {e}")))
}

#[must_use]
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// # Errors
///
/// Returns `DatabaseError::Query` if the string is not a `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> Result<NaiveDate, DatabaseError> {
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .map_err(|e| DatabaseError::Query(format!("Failed to parse date '{s}': {e}")))
}

/// # Errors
///
/// Returns `DatabaseError` if the column read fails or holds a malformed date.
pub fn get_opt_date(row: &libsql::Row, idx: i32) -> Result<Option<NaiveDate>, DatabaseError> {
    get_opt_string(row, idx)?
        .as_deref()
        .map(parse_date)
        .transpose()
}

#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse a TEXT column into a serde-deserializable enum.
///
/// Works with all mh-core enums that use `#[serde(rename_all = "snake_case")]`.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the string does not match any enum variant.
pub fn parse_enum<T: serde::de::DeserializeOwned>(s: &str) -> Result<T, DatabaseError> {
    serde_json::from_value(serde_json::Value::String(s.to_string()))
        .map_err(|e| DatabaseError::Query(format!("Failed to parse enum from '{s}': {e}")))
}

/// Read a nullable TEXT column. Returns `None` for both SQL NULL and empty string.
///
/// `row.get::<String>(idx)` on a NULL column returns an error, not `""`.
///
/// # Errors
///
/// Returns `DatabaseError` if the column read fails.
pub fn get_opt_string(row: &libsql::Row, idx: i32) -> Result<Option<String>, DatabaseError> {
    match row.get::<Option<String>>(idx)? {
        Some(s) if s.is_empty() => Ok(None),
        other => Ok(other),
    }
}

/// `?n, ?n+1, ...` placeholders for `count` parameters starting at `start`.
#[must_use]
pub fn placeholders(start: usize, count: usize) -> String {
    (start..start + count)
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ")
}
