//! Deferred-work trait — persisted tasks that re-invoke display later.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::Result;

/// Tag carried by every scheduled-notification work item.
pub const WORK_TYPE_NOTIFICATION_SCHEDULE: &str = "beacon.notification.schedule";

/// Work data keys.
pub const KEY_WORK_TYPE: &str = "work_type";
pub const KEY_NOTIFICATION: &str = "notification";
pub const KEY_SCHEDULE: &str = "schedule";

/// String payload persisted with a work item.
pub type WorkData = BTreeMap<String, String>;

/// One-shot or repeating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WorkKind {
    OneShot,
    Periodic { interval_minutes: u64 },
}

/// Work registered under a unique key. Enqueueing a key that already
/// exists replaces the previous item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkRequest {
    pub unique_key: String,
    pub tag: String,
    pub kind: WorkKind,
    pub initial_delay_secs: u64,
    pub data: WorkData,
}

/// Outcome reported back to the deferred-work system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkResult {
    Success,
    Retry,
    Failure,
}

#[async_trait]
pub trait WorkScheduler: Send + Sync {
    /// Register work, replacing any item with the same unique key.
    async fn enqueue_unique(&self, request: WorkRequest) -> Result<()>;

    /// Drop the item with this key. Unknown keys are ignored.
    async fn cancel_unique(&self, unique_key: &str) -> Result<()>;

    /// Drop every item carrying `tag`.
    async fn cancel_all_by_tag(&self, tag: &str) -> Result<()>;

    /// Requests still waiting to run.
    async fn pending(&self) -> Result<Vec<WorkRequest>>;
}
