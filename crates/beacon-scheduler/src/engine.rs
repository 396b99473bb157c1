//! Work engine — keeps pending work in memory, mirrors it to SQLite, and
//! hands due items to a runner on a tokio interval.

use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use beacon_core::error::Result;
use beacon_core::traits::{WorkData, WorkKind, WorkRequest, WorkResult, WorkScheduler};
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::persistence::WorkDb;
use crate::work::{DueWork, WorkItem};

/// Delay before a one-shot item that asked for a retry runs again.
pub const RETRY_BACKOFF_SECS: u64 = 30;

/// Pending work, keyed by unique key.
pub struct WorkEngine {
    items: Vec<WorkItem>,
    db: WorkDb,
}

impl WorkEngine {
    /// Open the engine over `db`, loading whatever is already stored.
    pub fn new(db: WorkDb) -> Result<Self> {
        let items = db.load_all()?;
        if !items.is_empty() {
            tracing::info!("📅 Restored {} pending work item(s)", items.len());
        }
        Ok(Self { items, db })
    }

    pub fn open(path: &Path) -> Result<Self> {
        Self::new(WorkDb::open(path)?)
    }

    pub fn in_memory() -> Result<Self> {
        Self::new(WorkDb::open_in_memory()?)
    }

    /// Register `request`, replacing any item with the same key.
    /// Returns `true` when an earlier item was replaced.
    pub fn enqueue(&mut self, request: WorkRequest, now: DateTime<Utc>) -> Result<bool> {
        let item = WorkItem::new(request, now)?;
        self.db.save(&item)?;

        let replaced = match self.items.iter_mut().find(|i| i.key() == item.key()) {
            Some(existing) => {
                *existing = item;
                true
            }
            None => {
                self.items.push(item);
                false
            }
        };
        Ok(replaced)
    }

    /// Drop the item under `unique_key`. Returns whether one existed.
    pub fn cancel(&mut self, unique_key: &str) -> Result<bool> {
        self.db.delete(unique_key)?;
        let len = self.items.len();
        self.items.retain(|i| i.key() != unique_key);
        Ok(self.items.len() < len)
    }

    /// Drop every item tagged `tag`. Returns how many were removed.
    pub fn cancel_by_tag(&mut self, tag: &str) -> Result<usize> {
        self.db.delete_by_tag(tag)?;
        let len = self.items.len();
        self.items.retain(|i| i.request.tag != tag);
        Ok(len - self.items.len())
    }

    pub fn pending(&self) -> &[WorkItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Collect everything due at `now`. One-shot items are removed,
    /// periodic ones re-armed one interval after `now`.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Vec<DueWork> {
        let mut due = Vec::new();
        let mut finished = Vec::new();

        for item in self.items.iter_mut().filter(|i| i.is_due(now)) {
            let keep = item.record_run(now);
            due.push(DueWork {
                request: item.request.clone(),
                run_count: item.run_count,
            });
            if keep {
                if let Err(e) = self.db.save(item) {
                    tracing::warn!("⚠️ Failed to re-arm '{}': {e}", item.key());
                }
            } else {
                finished.push(item.key().to_string());
            }
        }

        for key in &finished {
            if let Err(e) = self.db.delete(key) {
                tracing::warn!("⚠️ Failed to drop finished work '{key}': {e}");
            }
        }
        self.items.retain(|i| !finished.iter().any(|k| k == i.key()));

        due
    }

    /// Re-arm a one-shot item that asked to be retried, unless its key was
    /// registered again in the meantime.
    pub fn retry(&mut self, mut request: WorkRequest, now: DateTime<Utc>) -> Result<bool> {
        if request.kind != WorkKind::OneShot
            || self.items.iter().any(|i| i.key() == request.unique_key)
        {
            return Ok(false);
        }
        request.initial_delay_secs = RETRY_BACKOFF_SECS;
        self.enqueue(request, now)?;
        Ok(true)
    }
}

/// Shared handle over a [`WorkEngine`]; the deferred-work system the
/// notification manager talks to.
#[derive(Clone)]
pub struct WorkQueue {
    engine: Arc<Mutex<WorkEngine>>,
}

impl WorkQueue {
    pub fn new(engine: WorkEngine) -> Self {
        Self {
            engine: Arc::new(Mutex::new(engine)),
        }
    }

    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self::new(WorkEngine::open(path)?))
    }

    pub fn in_memory() -> Result<Self> {
        Ok(Self::new(WorkEngine::in_memory()?))
    }

    /// Collect work due at `now`.
    pub async fn tick(&self, now: DateTime<Utc>) -> Vec<DueWork> {
        self.engine.lock().await.tick(now)
    }

    pub async fn retry(&self, request: WorkRequest) -> Result<bool> {
        self.engine.lock().await.retry(request, Utc::now())
    }

    pub async fn len(&self) -> usize {
        self.engine.lock().await.len()
    }
}

#[async_trait]
impl WorkScheduler for WorkQueue {
    async fn enqueue_unique(&self, request: WorkRequest) -> Result<()> {
        let key = request.unique_key.clone();
        let delay = request.initial_delay_secs;
        let replaced = self.engine.lock().await.enqueue(request, Utc::now())?;
        tracing::info!(
            "📅 Work '{key}' {} (runs in {delay}s)",
            if replaced { "replaced" } else { "registered" }
        );
        Ok(())
    }

    async fn cancel_unique(&self, unique_key: &str) -> Result<()> {
        if self.engine.lock().await.cancel(unique_key)? {
            tracing::info!("🗑️ Work '{unique_key}' cancelled");
        }
        Ok(())
    }

    async fn cancel_all_by_tag(&self, tag: &str) -> Result<()> {
        let n = self.engine.lock().await.cancel_by_tag(tag)?;
        tracing::info!("🗑️ Cancelled {n} work item(s) tagged '{tag}'");
        Ok(())
    }

    async fn pending(&self) -> Result<Vec<WorkRequest>> {
        Ok(self
            .engine
            .lock()
            .await
            .pending()
            .iter()
            .map(|i| i.request.clone())
            .collect())
    }
}

/// Worker loop: every `check_interval`, run whatever is due through
/// `runner`. The runner is a callback so this crate stays independent of
/// the notification manager that consumes the work.
pub async fn spawn_worker<F, Fut>(queue: WorkQueue, runner: F, check_interval: Duration)
where
    F: Fn(WorkData) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = WorkResult> + Send,
{
    tracing::info!("⏰ Work runner started (check every {check_interval:?})");

    let mut interval = tokio::time::interval(check_interval);

    loop {
        interval.tick().await;

        let due = queue.tick(Utc::now()).await;
        for work in due {
            let key = work.request.unique_key.clone();
            tracing::debug!("🔔 Work '{key}' due (run #{})", work.run_count);

            match runner(work.request.data.clone()).await {
                WorkResult::Success => {}
                WorkResult::Retry => match queue.retry(work.request).await {
                    Ok(true) => tracing::warn!("⚠️ Work '{key}' will retry in {RETRY_BACKOFF_SECS}s"),
                    Ok(false) => {}
                    Err(e) => tracing::warn!("⚠️ Could not re-arm '{key}': {e}"),
                },
                WorkResult::Failure => tracing::error!("❌ Work '{key}' failed"),
            }
        }
    }
}
