//! # Beacon Core
//!
//! Shared vocabulary for the Beacon notification pipeline:
//! - `types` — the declarative notification description and the finalized
//!   notification it is assembled into
//! - `traits` — seams to the collaborators Beacon does not own (asset
//!   fetching, the OS notification surface, deferred work)
//! - `config` — `~/.beacon/config.toml`
//! - `error` — `BeaconError` + `Result`

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use config::BeaconConfig;
pub use error::{BeaconError, Result};
