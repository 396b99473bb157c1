//! Notification manager — the inbound API hosts call.
//!
//! `display` assembles and delivers right away. `schedule` stores the spec
//! as deferred work under `schedule:<id>`; when that work comes due,
//! `run_scheduled_work` decodes it and displays it.

use beacon_builder::{Assembler, BuildContext};
use beacon_core::error::Result;
use beacon_core::traits::{
    KEY_NOTIFICATION, KEY_SCHEDULE, KEY_WORK_TYPE, WORK_TYPE_NOTIFICATION_SCHEDULE, WorkData,
    WorkKind, WorkRequest, WorkResult,
};
use beacon_core::types::{NotificationSpec, ScheduleSpec};
use std::sync::Arc;

use crate::dispatcher::Dispatcher;
use crate::events::{EventBus, EventKind};

#[derive(Clone)]
pub struct NotificationManager {
    assembler: Assembler,
    dispatcher: Dispatcher,
}

impl NotificationManager {
    pub fn new(ctx: BuildContext, dispatcher: Dispatcher) -> Self {
        Self {
            assembler: Assembler::new(ctx),
            dispatcher,
        }
    }

    pub fn events(&self) -> &EventBus {
        self.dispatcher.events()
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Assemble `spec` and post it. Base-stage errors come back here and
    /// nothing is posted.
    pub async fn display_notification(&self, spec: NotificationSpec) -> Result<()> {
        self.display(Arc::new(spec)).await
    }

    async fn display(&self, spec: Arc<NotificationSpec>) -> Result<()> {
        let assembled = self.assembler.assemble(spec).await?;
        self.dispatcher.deliver(&assembled).await
    }

    /// Register `spec` to be displayed per `schedule`. Scheduling an id
    /// that is already pending replaces it.
    pub async fn schedule_notification(
        &self,
        spec: NotificationSpec,
        schedule: ScheduleSpec,
    ) -> Result<()> {
        let request = schedule_request(&spec, &schedule, chrono::Utc::now().timestamp_millis())?;
        tracing::info!(
            "📅 Scheduling '{}' in {}s{}",
            spec.id,
            request.initial_delay_secs,
            match request.kind {
                WorkKind::Periodic { interval_minutes } => format!(", every {interval_minutes}m"),
                WorkKind::OneShot => String::new(),
            }
        );

        self.dispatcher.work().enqueue_unique(request).await?;
        self.events().publish(EventKind::Scheduled, Arc::new(spec));
        Ok(())
    }

    pub async fn cancel_notification(&self, id: &str) -> Result<()> {
        self.dispatcher.cancel(id).await
    }

    pub async fn cancel_all_notifications(&self) -> Result<()> {
        self.dispatcher.cancel_all().await
    }

    /// Entry point for deferred work. Always reports `Success`: payload
    /// problems and display failures are logged, never retried.
    pub async fn run_scheduled_work(&self, data: &WorkData) -> WorkResult {
        let (Some(notification), Some(_schedule)) =
            (data.get(KEY_NOTIFICATION), data.get(KEY_SCHEDULE))
        else {
            tracing::warn!("⚠️ Scheduled work has no notification payload, skipping");
            return WorkResult::Success;
        };

        let spec: NotificationSpec = match serde_json::from_str(notification) {
            Ok(spec) => spec,
            Err(e) => {
                tracing::error!("❌ Undecodable scheduled notification: {e}");
                return WorkResult::Success;
            }
        };

        let id = spec.id.clone();
        if let Err(e) = self.display(Arc::new(spec)).await {
            tracing::error!("❌ Scheduled notification '{id}' failed to display: {e}");
        }
        WorkResult::Success
    }
}

/// Deferred-work request that re-displays `spec` per `schedule`, relative
/// to `now_ms`.
pub fn schedule_request(
    spec: &NotificationSpec,
    schedule: &ScheduleSpec,
    now_ms: i64,
) -> Result<WorkRequest> {
    let mut data = WorkData::new();
    data.insert(
        KEY_WORK_TYPE.into(),
        WORK_TYPE_NOTIFICATION_SCHEDULE.into(),
    );
    data.insert(KEY_NOTIFICATION.into(), serde_json::to_string(spec)?);
    data.insert(KEY_SCHEDULE.into(), serde_json::to_string(schedule)?);

    let kind = match schedule.repeat_minutes() {
        Some(interval_minutes) => WorkKind::Periodic { interval_minutes },
        None => WorkKind::OneShot,
    };

    Ok(WorkRequest {
        unique_key: spec.schedule_key(),
        tag: WORK_TYPE_NOTIFICATION_SCHEDULE.into(),
        kind,
        initial_delay_secs: schedule.initial_delay_secs(now_ms),
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use beacon_assets::AssetResolver;
    use beacon_core::BeaconError;
    use beacon_core::traits::{AssetFetcher, FetchError, WorkScheduler};
    use beacon_core::types::{
        Action, AssetRef, Image, ImageFormat, MAX_DELAY_SECS, MAX_INTERVAL_MINUTES,
        MIN_INTERVAL_MINUTES, Style,
    };
    use beacon_scheduler::WorkQueue;
    use std::time::Duration;

    use crate::surface::MemorySurface;

    /// Every asset resolves except `missing*`.
    struct StubFetcher;

    #[async_trait]
    impl AssetFetcher for StubFetcher {
        async fn fetch(&self, asset: &AssetRef) -> std::result::Result<Image, FetchError> {
            if asset.as_str().starts_with("missing") {
                return Err(FetchError::NotFound(asset.to_string()));
            }
            Ok(Image {
                source: asset.to_string(),
                format: ImageFormat::Png,
                bytes: vec![0x89],
            })
        }
    }

    struct Harness {
        surface: Arc<MemorySurface>,
        queue: WorkQueue,
        manager: NotificationManager,
    }

    fn harness() -> Harness {
        let surface = Arc::new(MemorySurface::new());
        let queue = WorkQueue::in_memory().unwrap();
        let assets = AssetResolver::new(Arc::new(StubFetcher), Duration::from_millis(200));
        let ctx = BuildContext::new(tokio::runtime::Handle::current(), assets);
        let dispatcher = Dispatcher::new(
            surface.clone(),
            surface.clone(),
            Arc::new(queue.clone()),
            EventBus::default(),
        );
        Harness {
            surface,
            queue,
            manager: NotificationManager::new(ctx, dispatcher),
        }
    }

    #[tokio::test]
    async fn test_display_minimal() {
        let h = harness();
        let mut events = h.manager.events().subscribe();

        h.manager
            .display_notification(NotificationSpec::new("A", "general").with_title("Hi"))
            .await
            .unwrap();

        let posted = h.surface.get(65).await.unwrap();
        assert_eq!(posted.title.unwrap().as_str(), "Hi");
        assert!(posted.large_icon.is_none());
        assert!(posted.actions.is_empty());
        assert!(posted.style.is_none());
        let event = events.try_recv().unwrap();
        assert_eq!(event.kind, EventKind::Delivered);
        assert_eq!(event.notification.id, "A");
    }

    #[tokio::test]
    async fn test_display_missing_channel_posts_nothing() {
        let h = harness();
        let mut events = h.manager.events().subscribe();
        let mut spec = NotificationSpec::new("A", "general");
        spec.android.channel_id = None;

        let err = h.manager.display_notification(spec).await;
        assert!(matches!(err, Err(BeaconError::InvalidNotification(_))));
        assert!(h.surface.is_empty().await);
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_display_degrades_enrichment() {
        let h = harness();
        let mut spec = NotificationSpec::new("rich", "general");
        spec.android.large_icon = Some("missing.png".into());
        let mut reply = Action::new("Reply", "reply");
        reply.icon = Some("missing-icon.png".into());
        spec.android.actions = vec![reply, Action::new("Open", "open")];
        spec.android.style = Some(Style::Unsupported);

        h.manager.display_notification(spec.clone()).await.unwrap();

        let posted = h.surface.get(spec.tag()).await.unwrap();
        assert!(posted.large_icon.is_none());
        assert_eq!(posted.actions.len(), 2);
        assert!(posted.actions[0].icon.is_none());
        assert_eq!(posted.actions[1].title.as_str(), "Open");
        assert!(posted.style.is_none());
    }

    #[test]
    fn test_schedule_request_one_shot() {
        let now = 1_700_000_000_000;
        let spec = NotificationSpec::new("x", "general");
        let schedule = ScheduleSpec {
            timestamp: Some(now + 60_000),
            interval: Some(-1),
        };

        let request = schedule_request(&spec, &schedule, now).unwrap();
        assert_eq!(request.unique_key, "schedule:x");
        assert_eq!(request.tag, WORK_TYPE_NOTIFICATION_SCHEDULE);
        assert_eq!(request.kind, WorkKind::OneShot);
        assert_eq!(request.initial_delay_secs, 60);
        assert_eq!(request.data[KEY_WORK_TYPE], WORK_TYPE_NOTIFICATION_SCHEDULE);

        let decoded: NotificationSpec =
            serde_json::from_str(&request.data[KEY_NOTIFICATION]).unwrap();
        assert_eq!(decoded, spec);
        let decoded: ScheduleSpec = serde_json::from_str(&request.data[KEY_SCHEDULE]).unwrap();
        assert_eq!(decoded, schedule);
    }

    #[test]
    fn test_schedule_request_periodic_and_past() {
        let now = 1_700_000_000_000;
        let spec = NotificationSpec::new("x", "general");

        let request = schedule_request(&spec, &ScheduleSpec::at(now + 1_499).every(15), now).unwrap();
        assert_eq!(
            request.kind,
            WorkKind::Periodic {
                interval_minutes: 15
            }
        );
        assert_eq!(request.initial_delay_secs, 1);

        let request = schedule_request(&spec, &ScheduleSpec::at(now - 5_000), now).unwrap();
        assert_eq!(request.initial_delay_secs, 0);
    }

    #[tokio::test]
    async fn test_schedule_registers_and_replaces() {
        let h = harness();
        let mut events = h.manager.events().subscribe();
        let now = chrono::Utc::now().timestamp_millis();
        let spec = NotificationSpec::new("x", "general");

        h.manager
            .schedule_notification(spec.clone(), ScheduleSpec::at(now + 60_000))
            .await
            .unwrap();
        let pending = h.queue.pending().await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].unique_key, "schedule:x");
        assert_eq!(pending[0].kind, WorkKind::OneShot);
        assert!((59..=60).contains(&pending[0].initial_delay_secs));
        assert_eq!(events.try_recv().unwrap().kind, EventKind::Scheduled);

        h.manager
            .schedule_notification(spec, ScheduleSpec::at(now + 600_000).every(30))
            .await
            .unwrap();
        let pending = h.queue.pending().await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(
            pending[0].kind,
            WorkKind::Periodic {
                interval_minutes: 30
            }
        );
        assert!(h.surface.is_empty().await);
    }

    #[tokio::test]
    async fn test_extreme_schedules_are_bounded() {
        let h = harness();
        let now = chrono::Utc::now().timestamp_millis();

        h.manager
            .schedule_notification(
                NotificationSpec::new("far", "general"),
                ScheduleSpec {
                    timestamp: Some(i64::MAX / 2),
                    interval: None,
                },
            )
            .await
            .unwrap();
        h.manager
            .schedule_notification(
                NotificationSpec::new("huge", "general"),
                ScheduleSpec {
                    timestamp: Some(now),
                    interval: Some(i64::MAX),
                },
            )
            .await
            .unwrap();

        let pending = h.queue.pending().await.unwrap();
        let far = pending.iter().find(|r| r.unique_key == "schedule:far").unwrap();
        assert_eq!(far.initial_delay_secs, MAX_DELAY_SECS);
        let huge = pending.iter().find(|r| r.unique_key == "schedule:huge").unwrap();
        assert_eq!(
            huge.kind,
            WorkKind::Periodic {
                interval_minutes: MAX_INTERVAL_MINUTES
            }
        );

        // The periodic item fires and re-arms without taking the queue down.
        let due = h.queue.tick(chrono::Utc::now()).await;
        assert_eq!(due.len(), 1);
        assert_eq!(h.queue.pending().await.unwrap().len(), 2);
    }

    #[test]
    fn test_short_interval_raised_to_minimum() {
        let spec = NotificationSpec::new("x", "general");
        let request = schedule_request(&spec, &ScheduleSpec::at(0).every(1), 0).unwrap();
        assert_eq!(
            request.kind,
            WorkKind::Periodic {
                interval_minutes: MIN_INTERVAL_MINUTES
            }
        );
    }

    #[tokio::test]
    async fn test_cancel_twice_leaves_nothing() {
        let h = harness();
        let now = chrono::Utc::now().timestamp_millis();
        h.manager
            .display_notification(NotificationSpec::new("x", "general"))
            .await
            .unwrap();
        h.manager
            .schedule_notification(
                NotificationSpec::new("x", "general"),
                ScheduleSpec::at(now + 60_000),
            )
            .await
            .unwrap();

        h.manager.cancel_notification("x").await.unwrap();
        h.manager.cancel_notification("x").await.unwrap();
        assert!(h.surface.is_empty().await);
        assert!(h.queue.pending().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_all() {
        let h = harness();
        let now = chrono::Utc::now().timestamp_millis();
        h.manager
            .display_notification(NotificationSpec::new("a", "general"))
            .await
            .unwrap();
        h.manager
            .schedule_notification(NotificationSpec::new("b", "general"), ScheduleSpec::at(now + 60_000))
            .await
            .unwrap();

        h.manager.cancel_all_notifications().await.unwrap();
        assert!(h.surface.is_empty().await);
        assert!(h.queue.pending().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_run_scheduled_work_displays() {
        let h = harness();
        let spec = NotificationSpec::new("later", "general").with_body("<b>ping</b>");
        let request = schedule_request(&spec, &ScheduleSpec::default(), 0).unwrap();

        assert_eq!(h.manager.run_scheduled_work(&request.data).await, WorkResult::Success);
        let posted = h.surface.get(spec.tag()).await.unwrap();
        assert_eq!(posted.body.unwrap().as_str(), "ping");
    }

    #[tokio::test]
    async fn test_run_scheduled_work_bad_payloads() {
        let h = harness();
        let mut events = h.manager.events().subscribe();

        assert_eq!(h.manager.run_scheduled_work(&WorkData::new()).await, WorkResult::Success);

        let mut garbage = WorkData::new();
        garbage.insert(KEY_NOTIFICATION.into(), "{not json".into());
        garbage.insert(KEY_SCHEDULE.into(), "{}".into());
        assert_eq!(h.manager.run_scheduled_work(&garbage).await, WorkResult::Success);

        let mut no_channel = NotificationSpec::new("x", "general");
        no_channel.android.channel_id = None;
        let request = schedule_request(&no_channel, &ScheduleSpec::default(), 0).unwrap();
        assert_eq!(h.manager.run_scheduled_work(&request.data).await, WorkResult::Success);

        assert!(h.surface.is_empty().await);
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_worker_end_to_end() {
        let h = harness();
        h.manager
            .schedule_notification(NotificationSpec::new("soon", "general"), ScheduleSpec::default())
            .await
            .unwrap();

        let manager = h.manager.clone();
        let worker = tokio::spawn(beacon_scheduler::spawn_worker(
            h.queue.clone(),
            move |data| {
                let manager = manager.clone();
                async move { manager.run_scheduled_work(&data).await }
            },
            Duration::from_millis(10),
        ));

        let tag = beacon_core::types::notification_tag("soon");
        let mut posted = None;
        for _ in 0..100 {
            posted = h.surface.get(tag).await;
            if posted.is_some() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        worker.abort();

        assert!(posted.is_some());
        assert!(h.queue.pending().await.unwrap().is_empty());
    }
}
