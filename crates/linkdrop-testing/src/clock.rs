//! Time helpers for expiry tests.

use chrono::{DateTime, Duration, Utc};

/// Current UNIX time in seconds.
pub fn now_secs() -> u64 {
    Utc::now().timestamp().max(0) as u64
}

/// An instant `days` in the past.
pub fn days_ago(days: i64) -> DateTime<Utc> {
    Utc::now() - Duration::days(days)
}
