//! Asset fetcher trait — resolves image references to image data.

use async_trait::async_trait;

use crate::types::{AssetRef, Image};

/// Why a fetch produced no image.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("asset not found: {0}")]
    NotFound(String),

    #[error("HTTP {status} fetching {url}")]
    Http { status: u16, url: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unrecognised image data from {0}")]
    Decode(String),

    #[error("asset {source_ref} exceeds {limit} bytes")]
    TooLarge { source_ref: String, limit: u64 },

    #[error("unsupported asset reference: {0}")]
    Unsupported(String),
}

/// Fetches and decodes one image.
///
/// Called concurrently for different assets of the same notification, so
/// implementations must not keep per-call mutable state on `self`.
#[async_trait]
pub trait AssetFetcher: Send + Sync {
    async fn fetch(&self, asset: &AssetRef) -> Result<Image, FetchError>;
}
