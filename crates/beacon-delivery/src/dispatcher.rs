//! Delivery dispatcher — posts finished notifications and removes them.

use beacon_builder::AssembledNotification;
use beacon_core::error::Result;
use beacon_core::traits::{
    ForegroundService, NotificationSurface, WORK_TYPE_NOTIFICATION_SCHEDULE, WorkScheduler,
};
use beacon_core::types::{notification_tag, schedule_key};
use std::sync::Arc;

use crate::events::{EventBus, EventKind};

/// Routes assembled notifications to the surface or foreground service
/// and clears them (plus any pending schedule) on cancel.
#[derive(Clone)]
pub struct Dispatcher {
    surface: Arc<dyn NotificationSurface>,
    foreground: Arc<dyn ForegroundService>,
    work: Arc<dyn WorkScheduler>,
    events: EventBus,
}

impl Dispatcher {
    pub fn new(
        surface: Arc<dyn NotificationSurface>,
        foreground: Arc<dyn ForegroundService>,
        work: Arc<dyn WorkScheduler>,
        events: EventBus,
    ) -> Self {
        Self {
            surface,
            foreground,
            work,
            events,
        }
    }

    pub fn work(&self) -> &Arc<dyn WorkScheduler> {
        &self.work
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Post `assembled`, then announce it. The `Delivered` event goes out
    /// even when posting failed; the post error is returned afterwards.
    pub async fn deliver(&self, assembled: &AssembledNotification) -> Result<()> {
        let AssembledNotification {
            spec,
            tag,
            notification,
        } = assembled;

        let posted = if spec.android.as_foreground_service {
            self.foreground.start(*tag, notification, spec).await
        } else {
            self.surface.notify(*tag, notification).await
        };

        match &posted {
            Ok(()) => tracing::info!("🔔 Notification '{}' posted (tag {tag})", spec.id),
            Err(e) => tracing::error!("❌ Posting '{}' failed: {e}", spec.id),
        }

        self.events.publish(EventKind::Delivered, spec.clone());
        posted
    }

    /// Remove `id` from the surface and drop its pending schedule.
    /// Unknown ids are fine; both steps always run.
    pub async fn cancel(&self, id: &str) -> Result<()> {
        let surface = self.surface.cancel(notification_tag(id)).await;
        let work = self.work.cancel_unique(&schedule_key(id)).await;
        tracing::info!("🗑️ Notification '{id}' cancelled");
        surface.and(work)
    }

    /// Remove everything from the surface and drop every pending schedule.
    pub async fn cancel_all(&self) -> Result<()> {
        let surface = self.surface.cancel_all().await;
        let work = self
            .work
            .cancel_all_by_tag(WORK_TYPE_NOTIFICATION_SCHEDULE)
            .await;
        tracing::info!("🗑️ All notifications cancelled");
        surface.and(work)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use beacon_core::BeaconError;
    use beacon_core::traits::{WorkKind, WorkRequest};
    use beacon_core::types::{Notification, NotificationSpec};
    use beacon_scheduler::WorkQueue;

    use crate::surface::MemorySurface;

    struct BrokenSurface;

    #[async_trait]
    impl NotificationSurface for BrokenSurface {
        async fn notify(&self, _tag: i32, _notification: &Notification) -> Result<()> {
            Err(BeaconError::Surface("tray unavailable".into()))
        }
        async fn cancel(&self, _tag: i32) -> Result<()> {
            Err(BeaconError::Surface("tray unavailable".into()))
        }
        async fn cancel_all(&self) -> Result<()> {
            Err(BeaconError::Surface("tray unavailable".into()))
        }
    }

    fn assembled(spec: NotificationSpec) -> AssembledNotification {
        let spec = Arc::new(spec);
        let notification = beacon_builder::assembler::base_stage(&spec).unwrap().build();
        AssembledNotification {
            tag: spec.tag(),
            spec,
            notification,
        }
    }

    fn pending_request(id: &str) -> WorkRequest {
        WorkRequest {
            unique_key: schedule_key(id),
            tag: WORK_TYPE_NOTIFICATION_SCHEDULE.into(),
            kind: WorkKind::OneShot,
            initial_delay_secs: 3600,
            data: Default::default(),
        }
    }

    fn setup() -> (Arc<MemorySurface>, WorkQueue, Dispatcher) {
        let surface = Arc::new(MemorySurface::new());
        let queue = WorkQueue::in_memory().unwrap();
        let dispatcher = Dispatcher::new(
            surface.clone(),
            surface.clone(),
            Arc::new(queue.clone()),
            EventBus::default(),
        );
        (surface, queue, dispatcher)
    }

    #[tokio::test]
    async fn test_deliver_posts_then_announces() {
        let (surface, _, dispatcher) = setup();
        let mut events = dispatcher.events().subscribe();

        dispatcher
            .deliver(&assembled(NotificationSpec::new("A", "general")))
            .await
            .unwrap();

        assert!(surface.get(65).await.is_some());
        assert!(!surface.is_foreground(65).await);
        let event = events.try_recv().unwrap();
        assert_eq!(event.kind, EventKind::Delivered);
        assert_eq!(event.notification.id, "A");
    }

    #[tokio::test]
    async fn test_foreground_service_path() {
        let (surface, _, dispatcher) = setup();
        let mut spec = NotificationSpec::new("svc", "general");
        spec.android.as_foreground_service = true;
        let a = assembled(spec);

        dispatcher.deliver(&a).await.unwrap();
        assert!(surface.is_foreground(a.tag).await);
    }

    #[tokio::test]
    async fn test_delivered_even_when_post_fails() {
        let surface = Arc::new(MemorySurface::new());
        let dispatcher = Dispatcher::new(
            Arc::new(BrokenSurface),
            surface,
            Arc::new(WorkQueue::in_memory().unwrap()),
            EventBus::default(),
        );
        let mut events = dispatcher.events().subscribe();

        let err = dispatcher
            .deliver(&assembled(NotificationSpec::new("x", "general")))
            .await;
        assert!(matches!(err, Err(BeaconError::Surface(_))));
        assert_eq!(events.try_recv().unwrap().kind, EventKind::Delivered);
    }

    #[tokio::test]
    async fn test_cancel_clears_surface_and_schedule() {
        let (surface, queue, dispatcher) = setup();
        dispatcher
            .deliver(&assembled(NotificationSpec::new("x", "general")))
            .await
            .unwrap();
        queue.enqueue_unique(pending_request("x")).await.unwrap();
        queue.enqueue_unique(pending_request("y")).await.unwrap();

        dispatcher.cancel("x").await.unwrap();
        dispatcher.cancel("x").await.unwrap();

        assert!(surface.is_empty().await);
        let pending = queue.pending().await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].unique_key, "schedule:y");
    }

    #[tokio::test]
    async fn test_cancel_all() {
        let (surface, queue, dispatcher) = setup();
        for id in ["a", "b"] {
            dispatcher
                .deliver(&assembled(NotificationSpec::new(id, "general")))
                .await
                .unwrap();
            queue.enqueue_unique(pending_request(id)).await.unwrap();
        }

        dispatcher.cancel_all().await.unwrap();
        assert!(surface.is_empty().await);
        assert!(queue.pending().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_still_drops_schedule_when_surface_fails() {
        let queue = WorkQueue::in_memory().unwrap();
        let dispatcher = Dispatcher::new(
            Arc::new(BrokenSurface),
            Arc::new(MemorySurface::new()),
            Arc::new(queue.clone()),
            EventBus::default(),
        );
        queue.enqueue_unique(pending_request("x")).await.unwrap();

        assert!(dispatcher.cancel("x").await.is_err());
        assert!(queue.pending().await.unwrap().is_empty());
    }
}
