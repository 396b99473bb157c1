//! Presentation styles.
//!
//! One variant per style kind, each carrying only its own fields. Unknown
//! `type` tags deserialize to `Unsupported` instead of failing the spec.

use serde::{Deserialize, Serialize};

use super::notification::AssetRef;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Style {
    #[default]
    None,
    BigText {
        text: String,
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        summary: Option<String>,
    },
    BigPicture {
        picture: AssetRef,
        /// Replaces the large icon while expanded.
        #[serde(default)]
        large_icon: Option<AssetRef>,
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        summary: Option<String>,
    },
    Inbox {
        lines: Vec<String>,
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        summary: Option<String>,
    },
    Messaging {
        /// The device user.
        person: Person,
        messages: Vec<Message>,
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        group: bool,
    },
    Progress {
        current: u32,
        max: u32,
        #[serde(default)]
        indeterminate: bool,
    },
    #[serde(other)]
    Unsupported,
}

impl Style {
    /// Short name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Style::None => "none",
            Style::BigText { .. } => "big_text",
            Style::BigPicture { .. } => "big_picture",
            Style::Inbox { .. } => "inbox",
            Style::Messaging { .. } => "messaging",
            Style::Progress { .. } => "progress",
            Style::Unsupported => "unsupported",
        }
    }
}

/// A conversation participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub name: String,
    #[serde(default)]
    pub id: Option<String>,
    /// Avatar image.
    #[serde(default)]
    pub icon: Option<AssetRef>,
    #[serde(default)]
    pub bot: bool,
    #[serde(default)]
    pub important: bool,
}

impl Person {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
            icon: None,
            bot: false,
            important: false,
        }
    }
}

/// One line of a messaging conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub text: String,
    /// Epoch milliseconds.
    pub timestamp: i64,
    /// Sender; `None` means the device user.
    #[serde(default)]
    pub person: Option<Person>,
}
