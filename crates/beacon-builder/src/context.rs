//! Explicit execution context threaded through the pipeline.

use beacon_assets::{AssetResolver, HttpAssetFetcher};
use beacon_core::config::AssetConfig;
use beacon_core::error::{BeaconError, Result};
use std::sync::Arc;
use tokio::runtime::Handle;

/// Worker pool + asset access for assemblies.
///
/// Built once at startup and cloned into every component that fetches
/// assets or spawns pipeline work.
#[derive(Clone)]
pub struct BuildContext {
    pool: Handle,
    assets: AssetResolver,
}

impl BuildContext {
    pub fn new(pool: Handle, assets: AssetResolver) -> Self {
        Self { pool, assets }
    }

    /// Context backed by the default HTTP/file fetcher.
    pub fn from_config(config: &AssetConfig, pool: Handle) -> Result<Self> {
        let fetcher = HttpAssetFetcher::new(config)
            .map_err(|e| BeaconError::Config(format!("Asset fetcher: {e}")))?;
        let assets = AssetResolver::new(Arc::new(fetcher), config.fetch_timeout());
        Ok(Self::new(pool, assets))
    }

    pub fn pool(&self) -> &Handle {
        &self.pool
    }

    pub fn assets(&self) -> &AssetResolver {
        &self.assets
    }
}
