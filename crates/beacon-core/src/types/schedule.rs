//! When a scheduled notification fires.

use serde::{Deserialize, Serialize};

/// Shortest repeat interval; shorter requests are raised to this.
pub const MIN_INTERVAL_MINUTES: u64 = 15;
/// Longest repeat interval (about ten years); longer requests are lowered.
pub const MAX_INTERVAL_MINUTES: u64 = 10 * 366 * 24 * 60;
/// Latest first fire (about a hundred years out); later timestamps are lowered.
pub const MAX_DELAY_SECS: u64 = 100 * 366 * 24 * 60 * 60;

/// Fire time and optional repeat.
///
/// Hosts send `-1` for "not set"; negative values are treated as absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSpec {
    /// Epoch milliseconds of the first display.
    #[serde(default)]
    pub timestamp: Option<i64>,
    /// Repeat interval in minutes.
    #[serde(default)]
    pub interval: Option<i64>,
}

impl ScheduleSpec {
    pub fn at(timestamp_ms: i64) -> Self {
        Self {
            timestamp: Some(timestamp_ms),
            interval: None,
        }
    }

    pub fn every(mut self, minutes: i64) -> Self {
        self.interval = Some(minutes);
        self
    }

    /// First fire time, if one was given.
    pub fn fire_at(&self) -> Option<i64> {
        self.timestamp.filter(|ts| *ts >= 0)
    }

    /// Repeat interval in minutes, kept within
    /// `MIN_INTERVAL_MINUTES..=MAX_INTERVAL_MINUTES`; `None` means one-shot.
    pub fn repeat_minutes(&self) -> Option<u64> {
        self.interval
            .filter(|m| *m > 0)
            .map(|m| (m as u64).clamp(MIN_INTERVAL_MINUTES, MAX_INTERVAL_MINUTES))
    }

    /// Seconds from `now_ms` until the first fire, rounded, never negative
    /// and never beyond `MAX_DELAY_SECS`.
    pub fn initial_delay_secs(&self, now_ms: i64) -> u64 {
        match self.fire_at() {
            Some(ts) => {
                let secs = (ts.saturating_sub(now_ms) as f64 / 1000.0).round();
                if secs > 0.0 {
                    (secs as u64).min(MAX_DELAY_SECS)
                } else {
                    0
                }
            }
            None => 0,
        }
    }
}
