//! # Beacon Assets
//!
//! Resolves image references (large icons, action icons, pictures, avatars)
//! for the assembly pipeline.
//!
//! - `HttpAssetFetcher` — `http(s)://`, `file://`, absolute paths and bundled
//!   resources by bare name
//! - `AssetResolver` — bounded wait around any fetcher; every failure
//!   becomes "no image"

pub mod fetcher;
pub mod resolver;

pub use fetcher::HttpAssetFetcher;
pub use resolver::AssetResolver;
