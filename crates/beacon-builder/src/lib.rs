//! # Beacon Builder
//!
//! The notification assembly pipeline.
//!
//! ```text
//! NotificationSpec ─► base ─► large icon ─► actions ─► style ─► Notification
//!                      │          │             │          │
//!                   (fatal)   AssetResolver  AssetResolver  AssetResolver
//! ```
//!
//! Each stage takes the builder from the previous one and hands back an
//! augmented builder. Only the base stage can fail; later stages degrade to
//! "leave the builder unchanged for this concern".

pub mod actions;
pub mod assembler;
pub mod builder;
pub mod context;
pub mod style;
pub mod text;

pub use assembler::{AssembledNotification, Assembler, AssemblyHandle};
pub use builder::NotificationBuilder;
pub use context::BuildContext;
