//! Notification assembler — runs the four stages for one spec.
//!
//! `base` is synchronous and the only stage allowed to fail. `large icon`,
//! `actions` and `style` each await the previous stage's builder, so stage
//! N is fully applied before stage N+1 starts. The whole chain runs as one
//! task on the context's worker pool; separate assemblies share nothing.

use beacon_core::error::{BeaconError, Result};
use beacon_core::types::{Lights, Notification, NotificationSpec, PressTarget};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::task::JoinHandle;

use crate::actions::build_actions;
use crate::builder::NotificationBuilder;
use crate::context::BuildContext;
use crate::style::build_style;
use crate::text;

/// A finalized notification plus the identity it will be posted under.
#[derive(Debug, Clone)]
pub struct AssembledNotification {
    pub spec: Arc<NotificationSpec>,
    pub tag: i32,
    pub notification: Notification,
}

/// Turns specs into notifications on the shared worker pool.
#[derive(Clone)]
pub struct Assembler {
    ctx: BuildContext,
}

impl Assembler {
    pub fn new(ctx: BuildContext) -> Self {
        Self { ctx }
    }

    /// Start assembling `spec`. The returned handle resolves once all four
    /// stages have run. Dropping it does not stop the pipeline.
    pub fn assemble(&self, spec: Arc<NotificationSpec>) -> AssemblyHandle {
        let ctx = self.ctx.clone();
        let task = self.ctx.pool().spawn(async move { run_stages(&ctx, spec).await });
        AssemblyHandle { task }
    }
}

/// Future for one in-flight assembly.
pub struct AssemblyHandle {
    task: JoinHandle<Result<AssembledNotification>>,
}

impl Future for AssemblyHandle {
    type Output = Result<AssembledNotification>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.task).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(e)) => Poll::Ready(Err(BeaconError::Task(format!("assembly: {e}")))),
            Poll::Pending => Poll::Pending,
        }
    }
}

/// Run every stage for `spec` on the current task.
pub async fn run_stages(
    ctx: &BuildContext,
    spec: Arc<NotificationSpec>,
) -> Result<AssembledNotification> {
    let builder = base_stage(&spec)?;
    let builder = large_icon_stage(ctx, &spec, builder).await;
    let builder = actions_stage(ctx, &spec, builder).await;
    let builder = style_stage(ctx, &spec, builder).await;

    let notification = builder.build();
    tracing::debug!(
        "🧩 Assembled '{}' ({} actions, style: {})",
        spec.id,
        notification.actions.len(),
        notification.style.is_some()
    );
    Ok(AssembledNotification {
        tag: spec.tag(),
        spec,
        notification,
    })
}

/// Stage 1: every synchronous field. Errors here abort the assembly.
pub fn base_stage(spec: &NotificationSpec) -> Result<NotificationBuilder> {
    let options = &spec.android;

    if spec.id.trim().is_empty() {
        return Err(BeaconError::InvalidNotification("'id' is required".into()));
    }
    let channel_id = match options.channel_id.as_deref().map(str::trim) {
        Some(channel) if !channel.is_empty() => channel.to_string(),
        _ => {
            return Err(BeaconError::InvalidNotification(format!(
                "'channelId' is required for notification '{}'",
                spec.id
            )));
        }
    };
    let lights = match options.lights.as_deref() {
        None => None,
        Some(&[argb, on_ms, off_ms]) => Some(Lights { argb, on_ms, off_ms }),
        Some(other) => {
            return Err(BeaconError::InvalidNotification(format!(
                "'lights' needs [color, onMs, offMs], got {} values",
                other.len()
            )));
        }
    };
    if options
        .small_icon
        .as_ref()
        .is_some_and(|icon| icon.resource.trim().is_empty())
    {
        return Err(BeaconError::InvalidNotification(
            "'smallIcon' resource must not be empty".into(),
        ));
    }

    let base = Notification {
        channel_id,
        extras: spec.data.clone(),
        delete_target: PressTarget::dismiss(&spec.id),
        content_target: PressTarget::press(&spec.id, options.press_action.clone()),
        title: spec.title.as_deref().map(text::render),
        subtitle: spec.subtitle.as_deref().map(text::render),
        body: spec.body.as_deref().map(text::render),
        badge_icon_type: options.badge_icon_type,
        category: options.category.clone(),
        color: options.color,
        colorized: options.colorized,
        chronometer_count_down: options.chronometer_count_down,
        defaults: options.defaults.clone(),
        group: options.group.clone(),
        group_alert_behavior: options.group_alert_behavior,
        group_summary: options.group_summary,
        input_history: options
            .input_history
            .iter()
            .flatten()
            .map(|line| text::render(line))
            .collect(),
        lights,
        local_only: options.local_only,
        number: options.number,
        ongoing: options.ongoing,
        only_alert_once: options.only_alert_once,
        priority: options.priority,
        shortcut_id: options.shortcut_id.clone(),
        show_timestamp: options.show_timestamp,
        small_icon: options.small_icon.clone(),
        sort_key: options.sort_key.clone(),
        ticker: options.ticker.clone(),
        timeout_after_ms: options.timeout_after,
        uses_chronometer: options.show_chronometer,
        vibration_pattern: options.vibration_pattern.clone(),
        visibility: options.visibility,
        when: options.timestamp.filter(|ts| *ts > -1),
        auto_cancel: options.auto_cancel,
        large_icon: None,
        actions: Vec::new(),
        style: None,
    };

    Ok(NotificationBuilder::new(base))
}

/// Stage 2: fetch and attach the large icon, if one was declared.
async fn large_icon_stage(
    ctx: &BuildContext,
    spec: &NotificationSpec,
    mut builder: NotificationBuilder,
) -> NotificationBuilder {
    let icon = ctx
        .assets()
        .resolve(spec.android.large_icon.as_ref(), "largeIcon")
        .await;
    if let Some(icon) = icon {
        builder.set_large_icon(icon);
    }
    builder
}

/// Stage 3: resolve actions and attach them in declared order.
async fn actions_stage(
    ctx: &BuildContext,
    spec: &NotificationSpec,
    mut builder: NotificationBuilder,
) -> NotificationBuilder {
    for action in build_actions(ctx.assets(), &spec.android.actions, &spec.id).await {
        builder.add_action(action);
    }
    builder
}

/// Stage 4: build the style as its own pool task and attach it.
async fn style_stage(
    ctx: &BuildContext,
    spec: &NotificationSpec,
    mut builder: NotificationBuilder,
) -> NotificationBuilder {
    let Some(style) = spec.android.style.clone() else {
        return builder;
    };

    let assets = ctx.assets().clone();
    let task = ctx
        .pool()
        .spawn(async move { build_style(&assets, &style).await });
    match task.await {
        Ok(Some(resolved)) => {
            builder.set_style(resolved);
        }
        Ok(None) => {}
        Err(e) => tracing::error!("❌ Style task for '{}' failed: {e}", spec.id),
    }
    builder
}
