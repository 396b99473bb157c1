//! Lifecycle events — broadcast to whoever is listening.

use beacon_core::types::NotificationSpec;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Handed to the surface (or foreground service).
    Delivered,
    /// Registered with the deferred-work store.
    Scheduled,
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Delivered => write!(f, "delivered"),
            Self::Scheduled => write!(f, "scheduled"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NotificationEvent {
    pub kind: EventKind,
    pub notification: Arc<NotificationSpec>,
}

/// Fan-out of notification events. Publishing with nobody subscribed is
/// not an error; slow subscribers miss events rather than block senders.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<NotificationEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publish an event. Returns how many subscribers received it.
    pub fn publish(&self, kind: EventKind, notification: Arc<NotificationSpec>) -> usize {
        tracing::debug!("📣 {kind}: '{}'", notification.id);
        self.tx
            .send(NotificationEvent { kind, notification })
            .unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<NotificationEvent> {
        self.tx.subscribe()
    }

    /// Subscribe as a stream. Lagged gaps are logged and skipped.
    pub fn stream(&self) -> impl Stream<Item = NotificationEvent> + Send + 'static {
        BroadcastStream::new(self.tx.subscribe()).filter_map(|item| match item {
            Ok(event) => Some(event),
            Err(e) => {
                tracing::warn!("⚠️ Event subscriber lagged: {e}");
                None
            }
        })
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}
