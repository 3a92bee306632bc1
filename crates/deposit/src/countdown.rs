//! Countdown and timestamp formatting for deposit unlock times.

use chrono::{TimeZone, Utc};
use std::time::{SystemTime, UNIX_EPOCH};

/// Marker shown once a deposit can be withdrawn.
pub const UNLOCKED: &str = "Unlocked";

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;

/// Current wall clock time in unix seconds.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Time remaining until `unlock_time`, using the largest units that apply.
///
/// `"2d 3h 4m"`, `"3h 4m 5s"`, `"4m 5s"`, `"5s"`, or [`UNLOCKED`].
pub fn time_left(unlock_time: u64, now: u64) -> String {
    if unlock_time <= now {
        return UNLOCKED.to_string();
    }

    let diff = unlock_time - now;
    let days = diff / DAY;
    let hours = (diff % DAY) / HOUR;
    let minutes = (diff % HOUR) / MINUTE;
    let seconds = diff % MINUTE;

    if days > 0 {
        format!("{days}d {hours}h {minutes}m")
    } else if hours > 0 {
        format!("{hours}h {minutes}m {seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    }
}

/// Absolute unlock time as a UTC date, falling back to the raw timestamp.
pub fn format_unlock_time(unlock_time: u64) -> String {
    i64::try_from(unlock_time)
        .ok()
        .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| unlock_time.to_string())
}
