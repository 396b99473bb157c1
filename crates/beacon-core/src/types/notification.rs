//! The declarative notification description.
//!
//! A `NotificationSpec` is what the host hands us. It is read-only once an
//! assembly starts; pipelines share it as `Arc<NotificationSpec>`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::action::{Action, PressAction};
use super::style::Style;

/// Opaque key/value payload carried through to events.
pub type Extras = BTreeMap<String, String>;

/// Reference to an image: an `http(s)://` or `file://` URI, an absolute
/// path, or the bare name of a bundled resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetRef(pub String);

impl AssetRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// An empty reference means no asset was requested.
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl std::fmt::Display for AssetRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AssetRef {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Immutable description of one notification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSpec {
    /// Stable notification id. Re-displaying the same id replaces it.
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub data: Extras,
    #[serde(default)]
    pub android: DisplayOptions,
}

impl NotificationSpec {
    /// Minimal spec with an id and a channel.
    pub fn new(id: impl Into<String>, channel_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            android: DisplayOptions {
                channel_id: Some(channel_id.into()),
                ..DisplayOptions::default()
            },
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Numeric tag the OS surface keys this notification by.
    pub fn tag(&self) -> i32 {
        notification_tag(&self.id)
    }

    /// Unique deferred-work key for scheduled re-delivery of this id.
    pub fn schedule_key(&self) -> String {
        schedule_key(&self.id)
    }
}

/// Derive the numeric surface tag for a notification id.
///
/// 31-polynomial over UTF-16 code units with wrapping `i32` arithmetic, so
/// the tag of an id is identical across processes and restarts.
pub fn notification_tag(id: &str) -> i32 {
    id.encode_utf16()
        .fold(0i32, |hash, unit| hash.wrapping_mul(31).wrapping_add(unit as i32))
}

/// Unique deferred-work key for an id: `schedule:<id>`.
pub fn schedule_key(id: &str) -> String {
    format!("schedule:{id}")
}

/// Notification priority (pre-channel platforms and heads-up ordering).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Min,
    Low,
    #[default]
    Default,
    High,
    Max,
}

/// Lock-screen visibility.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Secret,
    #[default]
    Private,
    Public,
}

/// Which members of a group make noise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupAlertBehavior {
    #[default]
    All,
    Summary,
    Children,
}

/// Icon shown on launcher badges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeIconType {
    None,
    #[default]
    Small,
    Large,
}

/// Platform default alert behaviours to inherit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertDefault {
    Sound,
    Vibrate,
    Lights,
}

/// Small (status bar) icon: a bundled resource and optional level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmallIcon {
    pub resource: String,
    #[serde(default)]
    pub level: Option<i32>,
}

/// Visual and behavioural options of a notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DisplayOptions {
    /// Required: the OS channel to post into.
    pub channel_id: Option<String>,
    /// Keep the notification alive inside a foreground service.
    pub as_foreground_service: bool,
    pub auto_cancel: bool,
    pub badge_icon_type: Option<BadgeIconType>,
    pub category: Option<String>,
    /// ARGB colour.
    pub color: Option<u32>,
    pub colorized: bool,
    pub chronometer_count_down: bool,
    pub defaults: Vec<AlertDefault>,
    pub group: Option<String>,
    pub group_alert_behavior: GroupAlertBehavior,
    pub group_summary: bool,
    pub input_history: Option<Vec<String>>,
    pub large_icon: Option<AssetRef>,
    /// `[argb, on_ms, off_ms]`.
    pub lights: Option<Vec<u32>>,
    pub local_only: bool,
    pub number: Option<u32>,
    pub ongoing: bool,
    pub only_alert_once: bool,
    pub press_action: Option<PressAction>,
    pub priority: Priority,
    pub shortcut_id: Option<String>,
    pub show_chronometer: bool,
    pub show_timestamp: bool,
    pub small_icon: Option<SmallIcon>,
    pub sort_key: Option<String>,
    pub style: Option<Style>,
    pub ticker: Option<String>,
    /// Auto-dismiss after this many milliseconds.
    pub timeout_after: Option<u64>,
    /// Epoch milliseconds shown as the notification time.
    pub timestamp: Option<i64>,
    pub vibration_pattern: Vec<u64>,
    pub visibility: Visibility,
    pub actions: Vec<Action>,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            channel_id: None,
            as_foreground_service: false,
            auto_cancel: true,
            badge_icon_type: None,
            category: None,
            color: None,
            colorized: false,
            chronometer_count_down: false,
            defaults: Vec::new(),
            group: None,
            group_alert_behavior: GroupAlertBehavior::All,
            group_summary: false,
            input_history: None,
            large_icon: None,
            lights: None,
            local_only: false,
            number: None,
            ongoing: false,
            only_alert_once: false,
            press_action: None,
            priority: Priority::Default,
            shortcut_id: None,
            show_chronometer: false,
            show_timestamp: false,
            small_icon: None,
            sort_key: None,
            style: None,
            ticker: None,
            timeout_after: None,
            timestamp: None,
            vibration_pattern: Vec::new(),
            visibility: Visibility::Private,
            actions: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_is_stable_polynomial() {
        assert_eq!(notification_tag(""), 0);
        assert_eq!(notification_tag("A"), 65);
        assert_eq!(notification_tag("ab"), 97 * 31 + 98);
        // Wraps rather than overflowing.
        assert_eq!(notification_tag("polygenelubricants"), i32::MIN);
    }

    #[test]
    fn test_schedule_key() {
        let spec = NotificationSpec::new("order-42", "default");
        assert_eq!(spec.schedule_key(), "schedule:order-42");
    }

    #[test]
    fn test_deserialize_minimal_json() {
        let spec: NotificationSpec = serde_json::from_str(
            r#"{"id":"A","title":"Hi","body":"there","android":{"channelId":"default"}}"#,
        )
        .unwrap();
        assert_eq!(spec.title.as_deref(), Some("Hi"));
        assert_eq!(spec.android.channel_id.as_deref(), Some("default"));
        assert!(spec.android.auto_cancel);
        assert!(spec.android.actions.is_empty());
        assert!(spec.android.style.is_none());
    }

    #[test]
    fn test_empty_asset_ref() {
        assert!(AssetRef::new("  ").is_empty());
        assert!(!AssetRef::new("https://x/y.png").is_empty());
    }
}
