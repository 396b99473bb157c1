//! Error types for Beacon.

/// Errors surfaced by Beacon operations.
///
/// Only `InvalidNotification` is produced by the assembly pipeline itself;
/// asset and style problems are downgraded before they reach this type.
#[derive(Debug, thiserror::Error)]
pub enum BeaconError {
    #[error("Configuration error: {0}")]
    Config(String),

    /// The base fields of a notification could not be built.
    #[error("Invalid notification: {0}")]
    InvalidNotification(String),

    #[error("Notification surface error: {0}")]
    Surface(String),

    #[error("Scheduler error: {0}")]
    Scheduler(String),

    /// A spawned pipeline task panicked or was aborted.
    #[error("Task failed: {0}")]
    Task(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BeaconError>;
