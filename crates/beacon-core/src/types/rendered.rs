//! The finalized notification produced by assembly.
//!
//! Everything here is plain data: the OS surface (or a test double) decides
//! how to render it.

use serde::{Deserialize, Serialize};

use super::action::{PressAction, RemoteInput};
use super::image::Image;
use super::notification::{
    AlertDefault, BadgeIconType, Extras, GroupAlertBehavior, Priority, SmallIcon, Visibility,
};

/// Inline formatting applied to a range of `RichText::text`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextStyle {
    Bold,
    Italic,
    Underline,
    Strikethrough,
}

/// Formatting span over char indices `[start, end)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSpan {
    pub start: usize,
    pub end: usize,
    pub style: TextStyle,
}

/// Display text with markup resolved into spans.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RichText {
    pub text: String,
    pub spans: Vec<TextSpan>,
}

impl RichText {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            spans: Vec::new(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

/// Which receiver a press target is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    /// The notification body was pressed.
    Press,
    /// The notification was swiped away.
    Dismiss,
    /// One of the action buttons was pressed.
    ActionPress,
}

/// Deferred intent the host receives when the user interacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PressTarget {
    pub kind: TargetKind,
    pub notification_id: String,
    /// Position of the action on the notification.
    pub action_index: Option<usize>,
    pub press_action: Option<PressAction>,
}

impl PressTarget {
    pub fn press(notification_id: &str, press_action: Option<PressAction>) -> Self {
        Self {
            kind: TargetKind::Press,
            notification_id: notification_id.to_string(),
            action_index: None,
            press_action,
        }
    }

    pub fn dismiss(notification_id: &str) -> Self {
        Self {
            kind: TargetKind::Dismiss,
            notification_id: notification_id.to_string(),
            action_index: None,
            press_action: None,
        }
    }

    pub fn action(notification_id: &str, index: usize, press_action: PressAction) -> Self {
        Self {
            kind: TargetKind::ActionPress,
            notification_id: notification_id.to_string(),
            action_index: Some(index),
            press_action: Some(press_action),
        }
    }
}

/// Text capture attached to an action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputCapture {
    /// Key under which the typed text is delivered back to the host.
    pub result_key: String,
    pub label: Option<String>,
    pub choices: Vec<String>,
    pub allow_free_form_input: bool,
    pub allow_generated_replies: bool,
}

impl InputCapture {
    pub fn from_remote_input(result_key: String, input: &RemoteInput) -> Self {
        Self {
            result_key,
            label: input.placeholder.clone(),
            choices: input.choices.clone(),
            allow_free_form_input: input.allow_free_form_input,
            allow_generated_replies: input.allow_generated_replies,
        }
    }
}

/// An action button after icon resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedAction {
    pub title: RichText,
    pub icon: Option<Image>,
    pub target: PressTarget,
    pub input: Option<InputCapture>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPerson {
    pub name: String,
    pub id: Option<String>,
    pub avatar: Option<Image>,
    pub bot: bool,
    pub important: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedMessage {
    pub text: RichText,
    pub timestamp: i64,
    pub sender: Option<ResolvedPerson>,
}

/// A style ready to apply.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedStyle {
    BigText {
        text: RichText,
        title: Option<RichText>,
        summary: Option<RichText>,
    },
    BigPicture {
        /// `None` when the picture could not be fetched.
        picture: Option<Image>,
        large_icon: Option<Image>,
        title: Option<RichText>,
        summary: Option<RichText>,
    },
    Inbox {
        lines: Vec<RichText>,
        title: Option<RichText>,
        summary: Option<RichText>,
    },
    Messaging {
        user: ResolvedPerson,
        messages: Vec<ResolvedMessage>,
        title: Option<RichText>,
        group: bool,
    },
    Progress {
        current: u32,
        max: u32,
        indeterminate: bool,
    },
}

/// LED colour and blink timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lights {
    pub argb: u32,
    pub on_ms: u32,
    pub off_ms: u32,
}

/// A fully built, displayable notification.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub channel_id: String,
    pub extras: Extras,
    pub content_target: PressTarget,
    pub delete_target: PressTarget,
    pub title: Option<RichText>,
    pub subtitle: Option<RichText>,
    pub body: Option<RichText>,
    pub badge_icon_type: Option<BadgeIconType>,
    pub category: Option<String>,
    pub color: Option<u32>,
    pub colorized: bool,
    pub chronometer_count_down: bool,
    pub defaults: Vec<AlertDefault>,
    pub group: Option<String>,
    pub group_alert_behavior: GroupAlertBehavior,
    pub group_summary: bool,
    pub input_history: Vec<RichText>,
    pub lights: Option<Lights>,
    pub local_only: bool,
    pub number: Option<u32>,
    pub ongoing: bool,
    pub only_alert_once: bool,
    pub priority: Priority,
    pub shortcut_id: Option<String>,
    pub show_timestamp: bool,
    pub small_icon: Option<SmallIcon>,
    pub sort_key: Option<String>,
    pub ticker: Option<String>,
    pub timeout_after_ms: Option<u64>,
    pub uses_chronometer: bool,
    pub vibration_pattern: Vec<u64>,
    pub visibility: Visibility,
    pub when: Option<i64>,
    pub auto_cancel: bool,
    pub large_icon: Option<Image>,
    pub actions: Vec<ResolvedAction>,
    pub style: Option<ResolvedStyle>,
}
