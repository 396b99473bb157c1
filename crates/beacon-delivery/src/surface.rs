//! In-process notification surface.

use async_trait::async_trait;
use beacon_core::error::Result;
use beacon_core::traits::{ForegroundService, NotificationSurface};
use beacon_core::types::{Notification, NotificationSpec};
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;

/// Keeps posted notifications in memory, keyed by tag. Serves as both the
/// tray and the foreground service for the CLI and tests.
#[derive(Default)]
pub struct MemorySurface {
    posted: RwLock<HashMap<i32, Notification>>,
    foreground: RwLock<HashSet<i32>>,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, tag: i32) -> Option<Notification> {
        self.posted.read().await.get(&tag).cloned()
    }

    pub async fn len(&self) -> usize {
        self.posted.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.posted.read().await.is_empty()
    }

    /// Whether `tag` is pinned by the foreground service.
    pub async fn is_foreground(&self, tag: i32) -> bool {
        self.foreground.read().await.contains(&tag)
    }
}

#[async_trait]
impl NotificationSurface for MemorySurface {
    async fn notify(&self, tag: i32, notification: &Notification) -> Result<()> {
        self.posted.write().await.insert(tag, notification.clone());
        Ok(())
    }

    async fn cancel(&self, tag: i32) -> Result<()> {
        self.posted.write().await.remove(&tag);
        self.foreground.write().await.remove(&tag);
        Ok(())
    }

    async fn cancel_all(&self) -> Result<()> {
        self.posted.write().await.clear();
        self.foreground.write().await.clear();
        Ok(())
    }
}

#[async_trait]
impl ForegroundService for MemorySurface {
    async fn start(
        &self,
        tag: i32,
        notification: &Notification,
        spec: &NotificationSpec,
    ) -> Result<()> {
        tracing::info!("📌 Foreground service started for '{}'", spec.id);
        self.foreground.write().await.insert(tag);
        self.notify(tag, notification).await
    }
}
