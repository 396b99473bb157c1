//! Collaborator seams — everything Beacon talks to but does not own.

pub mod assets;
pub mod surface;
pub mod work;

pub use assets::{AssetFetcher, FetchError};
pub use surface::{ForegroundService, NotificationSurface};
pub use work::{
    KEY_NOTIFICATION, KEY_SCHEDULE, KEY_WORK_TYPE, WORK_TYPE_NOTIFICATION_SCHEDULE, WorkData,
    WorkKind, WorkRequest, WorkResult, WorkScheduler,
};
