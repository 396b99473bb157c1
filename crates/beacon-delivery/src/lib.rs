//! # Beacon Delivery
//!
//! Everything after assembly: posting to the surface, lifecycle events,
//! cancellation, and the inbound `NotificationManager` API that ties the
//! pipeline to the deferred-work store.
//!
//! ```text
//! display ──► Assembler ──► Dispatcher ──► NotificationSurface / ForegroundService
//!                                 └──────► EventBus (Delivered)
//! schedule ─► WorkScheduler ("schedule:<id>") ──► EventBus (Scheduled)
//!                 └── later: run_scheduled_work ──► display
//! ```

pub mod dispatcher;
pub mod events;
pub mod manager;
pub mod surface;

pub use dispatcher::Dispatcher;
pub use events::{EventBus, EventKind, NotificationEvent};
pub use manager::NotificationManager;
pub use surface::MemorySurface;
