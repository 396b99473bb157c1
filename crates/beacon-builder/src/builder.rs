//! Builder state threaded through the assembly stages.

use beacon_core::types::{Image, Notification, ResolvedAction, ResolvedStyle};

/// Mutable notification under construction.
///
/// Owned by exactly one pipeline and moved from stage to stage; `build`
/// freezes it.
#[derive(Debug)]
pub struct NotificationBuilder {
    notification: Notification,
}

impl NotificationBuilder {
    /// Start from the base fields.
    pub fn new(base: Notification) -> Self {
        Self { notification: base }
    }

    pub fn set_large_icon(&mut self, icon: Image) -> &mut Self {
        self.notification.large_icon = Some(icon);
        self
    }

    pub fn add_action(&mut self, action: ResolvedAction) -> &mut Self {
        self.notification.actions.push(action);
        self
    }

    pub fn set_style(&mut self, style: ResolvedStyle) -> &mut Self {
        self.notification.style = Some(style);
        self
    }

    pub fn build(self) -> Notification {
        self.notification
    }
}
