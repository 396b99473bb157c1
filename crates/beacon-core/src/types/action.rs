//! Interactive actions declared on a notification.

use serde::{Deserialize, Serialize};

use super::notification::AssetRef;

/// What happens when the notification or an action is pressed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PressAction {
    /// Host-defined identifier reported back on press.
    pub id: String,
    /// Activity to bring to the foreground, if any.
    #[serde(default)]
    pub launch_activity: Option<String>,
}

impl PressAction {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            launch_activity: None,
        }
    }
}

/// A button shown on the notification, in declared order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    pub title: String,
    #[serde(default)]
    pub icon: Option<AssetRef>,
    pub press_action: PressAction,
    /// Free-text reply capture.
    #[serde(default)]
    pub input: Option<RemoteInput>,
}

impl Action {
    pub fn new(title: impl Into<String>, press_id: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            icon: None,
            press_action: PressAction::new(press_id),
            input: None,
        }
    }
}

/// Lets the user type a reply against an action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RemoteInput {
    pub allow_free_form_input: bool,
    pub allow_generated_replies: bool,
    /// Canned replies offered alongside free text.
    pub choices: Vec<String>,
    pub placeholder: Option<String>,
}

impl Default for RemoteInput {
    fn default() -> Self {
        Self {
            allow_free_form_input: true,
            allow_generated_replies: true,
            choices: Vec::new(),
            placeholder: None,
        }
    }
}
