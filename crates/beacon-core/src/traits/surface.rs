//! OS notification surface traits.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Notification, NotificationSpec};

/// The system tray. Keyed by the numeric notification tag; posting an
/// existing tag replaces it.
#[async_trait]
pub trait NotificationSurface: Send + Sync {
    async fn notify(&self, tag: i32, notification: &Notification) -> Result<()>;

    /// Remove one notification. Unknown tags are ignored.
    async fn cancel(&self, tag: i32) -> Result<()>;

    async fn cancel_all(&self) -> Result<()>;
}

/// Keeps a notification pinned by a long-running foreground service.
#[async_trait]
pub trait ForegroundService: Send + Sync {
    async fn start(
        &self,
        tag: i32,
        notification: &Notification,
        spec: &NotificationSpec,
    ) -> Result<()>;
}
