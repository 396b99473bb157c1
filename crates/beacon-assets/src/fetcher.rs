//! Default asset fetcher — remote URLs, local files and bundled resources.

use async_trait::async_trait;
use beacon_core::config::AssetConfig;
use beacon_core::traits::{AssetFetcher, FetchError};
use beacon_core::types::{AssetRef, Image, ImageFormat};
use std::path::{Component, Path, PathBuf};

/// Extensions tried, in order, for a bare resource name.
const RESOURCE_EXTENSIONS: &[&str] = &["png", "webp", "jpg", "jpeg", "gif"];

/// Where an asset reference points.
#[derive(Debug, PartialEq)]
enum Location {
    Remote(String),
    File(PathBuf),
    Resource(String),
}

fn classify(asset: &AssetRef) -> Result<Location, FetchError> {
    let raw = asset.as_str().trim();
    let lower = raw.to_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        return Ok(Location::Remote(raw.to_string()));
    }
    if let Some(path) = raw.strip_prefix("file://") {
        return Ok(Location::File(PathBuf::from(path)));
    }
    if raw.contains("://") {
        return Err(FetchError::Unsupported(raw.to_string()));
    }
    if Path::new(raw).is_absolute() {
        return Ok(Location::File(PathBuf::from(raw)));
    }
    Ok(Location::Resource(raw.to_string()))
}

/// Fetches images over HTTP and from disk.
///
/// Holds only immutable configuration and a connection-pooled client, so one
/// instance serves concurrent fetches.
pub struct HttpAssetFetcher {
    client: reqwest::Client,
    resource_dir: PathBuf,
    max_bytes: u64,
}

impl HttpAssetFetcher {
    pub fn new(config: &AssetConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.fetch_timeout())
            .build()
            .map_err(|e| FetchError::Network(format!("Client error: {e}")))?;
        let resource_dir = PathBuf::from(shellexpand::tilde(&config.resource_dir).to_string());
        Ok(Self::with_client(client, resource_dir, config.max_bytes))
    }

    pub fn with_client(client: reqwest::Client, resource_dir: PathBuf, max_bytes: u64) -> Self {
        Self {
            client,
            resource_dir,
            max_bytes,
        }
    }

    async fn fetch_remote(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Network(format!("Request failed: {e}")))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(url.to_string()));
        }
        if !status.is_success() {
            return Err(FetchError::Http {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        if response.content_length().is_some_and(|len| len > self.max_bytes) {
            return Err(self.too_large(url));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::Network(format!("Read body failed: {e}")))?;
        if bytes.len() as u64 > self.max_bytes {
            return Err(self.too_large(url));
        }
        Ok(bytes.to_vec())
    }

    async fn fetch_file(&self, path: &Path) -> Result<Vec<u8>, FetchError> {
        let meta = match tokio::fs::metadata(path).await {
            Ok(meta) => meta,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(FetchError::NotFound(path.display().to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        if meta.len() > self.max_bytes {
            return Err(self.too_large(&path.display().to_string()));
        }
        Ok(tokio::fs::read(path).await?)
    }

    /// Resolve a bundled resource name. Names must stay inside the
    /// resource directory.
    async fn locate_resource(&self, name: &str) -> Result<PathBuf, FetchError> {
        let contained = Path::new(name)
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !contained {
            return Err(FetchError::Unsupported(name.to_string()));
        }
        let direct = self.resource_dir.join(name);
        if Path::new(name).extension().is_some() {
            return Ok(direct);
        }
        for ext in RESOURCE_EXTENSIONS {
            let candidate = direct.with_extension(ext);
            if tokio::fs::try_exists(&candidate).await.unwrap_or(false) {
                return Ok(candidate);
            }
        }
        Err(FetchError::NotFound(name.to_string()))
    }

    fn too_large(&self, source_ref: &str) -> FetchError {
        FetchError::TooLarge {
            source_ref: source_ref.to_string(),
            limit: self.max_bytes,
        }
    }
}

#[async_trait]
impl AssetFetcher for HttpAssetFetcher {
    async fn fetch(&self, asset: &AssetRef) -> Result<Image, FetchError> {
        let bytes = match classify(asset)? {
            Location::Remote(url) => self.fetch_remote(&url).await?,
            Location::File(path) => self.fetch_file(&path).await?,
            Location::Resource(name) => {
                let path = self.locate_resource(&name).await?;
                self.fetch_file(&path).await?
            }
        };

        let format = ImageFormat::sniff(&bytes)
            .ok_or_else(|| FetchError::Decode(asset.to_string()))?;
        tracing::debug!("🖼️ Fetched {} ({:?}, {} bytes)", asset, format, bytes.len());
        Ok(Image {
            source: asset.to_string(),
            format,
            bytes,
        })
    }
}
