//! Disc capacity arithmetic.
//!
//! Everything here is derived from the playlist, the gap flag and the current
//! capacity source; nothing is stored.

use crate::playlist::Track;

/// Silence inserted between consecutive tracks when gaps are enabled (seconds).
pub const GAP_SECONDS: f64 = 2.0;

/// Capacity used when the server does not report a default (80 minutes).
pub const DEFAULT_CAPACITY_SECONDS: f64 = 80.0 * 60.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapacityState {
    pub used_seconds: f64,
    pub total_seconds: f64,
    pub percent: u32,
    pub overflow: bool,
}

/// Compute how much of `capacity_seconds` the given tracks occupy.
///
/// The gap term only applies between tracks, so `n` tracks get `n - 1` gaps.
/// `percent` is rounded and may exceed 100 when the playlist overflows.
pub fn capacity(tracks: &[Track], gaps: bool, capacity_seconds: f64) -> CapacityState {
    let durations: f64 = tracks.iter().map(|t| t.duration.max(0.0)).sum();
    let gap_term = if gaps && tracks.len() > 1 {
        (tracks.len() - 1) as f64 * GAP_SECONDS
    } else {
        0.0
    };
    let used_seconds = durations + gap_term;

    let percent = if capacity_seconds > 0.0 {
        (used_seconds / capacity_seconds * 100.0).round() as u32
    } else {
        0
    };

    CapacityState {
        used_seconds,
        total_seconds: capacity_seconds,
        percent,
        overflow: used_seconds > capacity_seconds,
    }
}

/// Format seconds as `m:ss` (minutes are not wrapped into hours).
pub fn format_mss(seconds: f64) -> String {
    let secs = seconds.max(0.0).floor() as u64;
    format!("{}:{:02}", secs / 60, secs % 60)
}
