//! Work item definitions — the data model for pending deferred work.

use beacon_core::BeaconError;
use beacon_core::error::Result;
use beacon_core::traits::{WorkData, WorkKind, WorkRequest};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// A registered request plus its run bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkItem {
    pub request: WorkRequest,
    /// When the request was enqueued.
    pub created_at: DateTime<Utc>,
    /// Next time the item is due.
    pub next_run: DateTime<Utc>,
    pub last_run: Option<DateTime<Utc>>,
    /// How many times this item has fired.
    pub run_count: u32,
}

/// An item that came due during a tick.
#[derive(Debug, Clone, PartialEq)]
pub struct DueWork {
    pub request: WorkRequest,
    pub run_count: u32,
}

impl DueWork {
    pub fn data(&self) -> &WorkData {
        &self.request.data
    }
}

impl WorkItem {
    /// Arm `request` relative to `now`. Fails when the delay does not fit
    /// in a timestamp.
    pub fn new(request: WorkRequest, now: DateTime<Utc>) -> Result<Self> {
        let next_run = i64::try_from(request.initial_delay_secs)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .and_then(|delay| now.checked_add_signed(delay))
            .ok_or_else(|| {
                BeaconError::Scheduler(format!(
                    "delay of {}s for '{}' is out of range",
                    request.initial_delay_secs, request.unique_key
                ))
            })?;
        Ok(Self {
            request,
            created_at: now,
            next_run,
            last_run: None,
            run_count: 0,
        })
    }

    pub fn key(&self) -> &str {
        &self.request.unique_key
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        now >= self.next_run
    }

    /// Record a run at `now`. Returns `false` when the item is finished and
    /// should be dropped (one-shot, or an interval that cannot be re-armed),
    /// `true` when it was re-armed.
    pub fn record_run(&mut self, now: DateTime<Utc>) -> bool {
        self.last_run = Some(now);
        self.run_count = self.run_count.saturating_add(1);
        match self.request.kind {
            WorkKind::OneShot => false,
            WorkKind::Periodic { interval_minutes } => {
                let next = i64::try_from(interval_minutes)
                    .ok()
                    .and_then(TimeDelta::try_minutes)
                    .and_then(|interval| now.checked_add_signed(interval));
                match next {
                    Some(next) => {
                        self.next_run = next;
                        true
                    }
                    None => {
                        tracing::warn!(
                            "⚠️ Interval of {interval_minutes}m for '{}' is out of range, dropping",
                            self.key()
                        );
                        false
                    }
                }
            }
        }
    }
}
