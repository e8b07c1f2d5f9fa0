//! Wall-clock helpers.

use chrono::Utc;

/// Milliseconds since the Unix epoch, the unit of every envelope timestamp.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
