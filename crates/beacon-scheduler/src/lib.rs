//! # Beacon Scheduler
//!
//! Deferred work for scheduled notifications: unique-keyed, tagged, and
//! persisted in SQLite so pending schedules survive a restart.
//!
//! ## Architecture
//! ```text
//! NotificationManager::schedule_notification
//!   └── WorkQueue::enqueue_unique("schedule:<id>")   (replace on conflict)
//!         └── WorkEngine ── WorkDb (deferred_work table)
//!
//! spawn_worker (tokio interval)
//!   ├── WorkEngine::tick(now) → due items
//!   │     ├── one-shot  → removed
//!   │     └── periodic  → re-armed at now + interval
//!   └── runner(WorkData) → WorkResult   (e.g. run_scheduled_work)
//! ```

pub mod engine;
pub mod persistence;
pub mod work;

pub use engine::{WorkEngine, WorkQueue, spawn_worker};
pub use persistence::WorkDb;
pub use work::{DueWork, WorkItem};
