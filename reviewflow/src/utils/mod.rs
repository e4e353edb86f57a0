//! Timestamp and id helpers.

pub mod timestamps;

pub use timestamps::{
    format_display, format_file_safe, format_iso8601, iso_timestamp, now_utc, Timestamp,
};

use uuid::Uuid;

/// Generates a new time-ordered run id (UUID v7).
#[must_use]
pub fn generate_run_id() -> Uuid {
    Uuid::now_v7()
}
