//! Data model shared across the Beacon crates.

pub mod action;
pub mod image;
pub mod notification;
pub mod rendered;
pub mod schedule;
pub mod style;

pub use action::{Action, PressAction, RemoteInput};
pub use image::{Image, ImageFormat};
pub use notification::{
    AlertDefault, AssetRef, BadgeIconType, DisplayOptions, Extras, GroupAlertBehavior,
    NotificationSpec, Priority, SmallIcon, Visibility, notification_tag, schedule_key,
};
pub use rendered::{
    InputCapture, Lights, Notification, PressTarget, ResolvedAction, ResolvedMessage,
    ResolvedPerson, ResolvedStyle, RichText, TargetKind, TextSpan, TextStyle,
};
pub use schedule::{MAX_DELAY_SECS, MAX_INTERVAL_MINUTES, MIN_INTERVAL_MINUTES, ScheduleSpec};
pub use style::{Message, Person, Style};
