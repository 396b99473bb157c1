//! Bounded asset resolution.
//!
//! Asset failures are never fatal to a notification: timeouts and fetch
//! errors are logged and resolve to `None`.

use beacon_core::traits::AssetFetcher;
use beacon_core::types::{AssetRef, Image};
use std::sync::Arc;
use std::time::Duration;

/// Wraps a fetcher with a per-call timeout. Cheap to clone.
#[derive(Clone)]
pub struct AssetResolver {
    fetcher: Arc<dyn AssetFetcher>,
    timeout: Duration,
}

impl AssetResolver {
    pub fn new(fetcher: Arc<dyn AssetFetcher>, timeout: Duration) -> Self {
        Self { fetcher, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Fetch `asset`, waiting at most `timeout`.
    ///
    /// `what` names the asset's role in log lines ("largeIcon", "action icon").
    pub async fn resolve(&self, asset: Option<&AssetRef>, what: &str) -> Option<Image> {
        let asset = asset.filter(|a| !a.is_empty())?;

        match tokio::time::timeout(self.timeout, self.fetcher.fetch(asset)).await {
            Ok(Ok(image)) => Some(image),
            Ok(Err(e)) => {
                tracing::error!("❌ Failed to retrieve {what} image {asset}: {e}");
                None
            }
            Err(_) => {
                tracing::error!(
                    "⏱️ Timeout after {:?} retrieving {what} image {asset}",
                    self.timeout
                );
                None
            }
        }
    }
}
