//! Time helpers
//!
//! Repositories only ever see `i64` Unix millis; date formatting for the
//! reporting layer happens here.

use chrono::{DateTime, Utc};

/// Current time as Unix millis
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Unix millis -> "YYYY-MM-DD" (UTC)
///
/// Reporting groups rows by this key. Out-of-range values clamp to the
/// epoch rather than panic.
pub fn millis_to_date(millis: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .unwrap_or_else(|| DateTime::<Utc>::from_timestamp_millis(0).unwrap())
        .format("%Y-%m-%d")
        .to_string()
}
