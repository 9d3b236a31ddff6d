//! Timestamp-column detection for upstream tables whose schema is not fixed.

use std::cmp::Reverse;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

/// Column names tried, in order, when looking for a row's timestamp.
pub const TIMESTAMP_CANDIDATES: [&str; 5] = [
    "created_at",
    "fecha",
    "timestamp",
    "fecha_movimiento",
    "updated_at",
];

const FALLBACK_ORDER_COLUMN: &str = "id";

/// Picks the column to order a table by: the first timestamp candidate the
/// table has, else `id`, else nothing.
#[must_use]
pub fn pick_order_column<S: AsRef<str>>(columns: &[S]) -> Option<&'static str> {
    let has = |name: &str| columns.iter().any(|c| c.as_ref() == name);
    TIMESTAMP_CANDIDATES
        .into_iter()
        .find(|candidate| has(*candidate))
        .or_else(|| has(FALLBACK_ORDER_COLUMN).then_some(FALLBACK_ORDER_COLUMN))
}

/// Returns `true` when `column` is one of [`TIMESTAMP_CANDIDATES`].
#[must_use]
pub fn is_timestamp_column(column: &str) -> bool {
    TIMESTAMP_CANDIDATES.contains(&column)
}

/// Re-sorts JSON rows newest first by the first timestamp candidate present
/// in the result set. Rows whose value is missing or unparsable go last; the
/// sort is stable otherwise. Rows are left untouched when no candidate field
/// appears at all.
pub fn sort_newest_first(rows: &mut [Value]) {
    let Some(field) = TIMESTAMP_CANDIDATES
        .into_iter()
        .find(|field| rows.iter().any(|row| row.get(*field).is_some()))
    else {
        return;
    };
    rows.sort_by_key(|row| Reverse(row.get(field).and_then(parse_timestamp)));
}

/// Reads a JSON string field with [`parse_timestamp_str`].
#[must_use]
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    value.as_str().and_then(parse_timestamp_str)
}

/// Reads an upstream timestamp: RFC 3339, a naive date-time (taken as UTC),
/// or a bare date (midnight UTC).
#[must_use]
pub fn parse_timestamp_str(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    if let Ok(ts) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%#z") {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
