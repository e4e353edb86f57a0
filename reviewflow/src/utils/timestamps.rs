//! Timestamp formatting.

use chrono::{DateTime, Utc};

/// Timestamp type used throughout the crate.
pub type Timestamp = DateTime<Utc>;

/// Returns the current UTC timestamp.
#[must_use]
pub fn now_utc() -> Timestamp {
    Utc::now()
}

/// Returns the current UTC time as an ISO 8601 string.
///
/// # Examples
///
/// ```
/// use reviewflow::utils::iso_timestamp;
///
/// let ts = iso_timestamp();
/// assert!(ts.contains('T'));
/// assert!(ts.ends_with("+00:00"));
/// ```
#[must_use]
pub fn iso_timestamp() -> String {
    format_iso8601(&now_utc())
}

/// Formats a timestamp as ISO 8601 with microseconds.
#[must_use]
pub fn format_iso8601(dt: &Timestamp) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%.6f+00:00").to_string()
}

/// Formats a timestamp for display, e.g. `2025-01-31 14:05:09`.
#[must_use]
pub fn format_display(dt: &Timestamp) -> String {
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Formats a timestamp for use inside a file name (`:` becomes `-`).
#[must_use]
pub fn format_file_safe(dt: &Timestamp) -> String {
    format_display(dt).replace(':', "-")
}
