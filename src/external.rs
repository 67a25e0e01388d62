//! URL-keyed downloads
//!
//! [`ExternalAssets`] fetches arbitrary URLs as text or bytes. Cached
//! downloads go through a [`KeyedCache`] keyed by URL and kind, so the same
//! URL requested as text and as bytes occupies two entries and concurrent
//! requests for either share one download.

use crate::cache::{CacheOptions, KeyedCache};
use crate::error::{FetchError, FetchResult, LoadError, LoadResult};
use crate::key::{AssetKind, CacheKey, TypedKey};
use crate::loader::{AssetLoader, HttpClient};
use crate::progress::Progress;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Body of a downloaded URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExternalAsset {
    Text(String),
    Bytes(Vec<u8>),
}

impl ExternalAsset {
    /// The body as text, if it was downloaded as text
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Bytes(_) => None,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        match self {
            Self::Text(text) => text.as_bytes(),
            Self::Bytes(bytes) => bytes,
        }
    }
}

/// UTF-8 text downloads
pub struct Text;

impl AssetKind for Text {
    const TAG: &'static str = "text";
}

/// Raw byte downloads
pub struct Bytes;

impl AssetKind for Bytes {
    const TAG: &'static str = "bytes";
}

/// Loader treating the key name as a URL
#[derive(Debug, Clone)]
pub struct UrlLoader {
    client: HttpClient,
}

impl UrlLoader {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AssetLoader for UrlLoader {
    type Asset = ExternalAsset;

    async fn fetch(&self, key: &CacheKey, progress: &Progress) -> FetchResult<Option<ExternalAsset>> {
        let url = key.name();
        debug!("Downloading {}", url);
        let bytes = match self.client.get_bytes(url, progress).await {
            Ok(bytes) => bytes,
            Err(err) if err.is_not_found() => return Ok(None),
            Err(err) => return Err(err),
        };
        debug!("Downloaded {} ({} bytes)", url, bytes.len());

        if key.tag() == Some(Text::TAG) {
            let text = String::from_utf8(bytes)
                .map_err(|e| FetchError::Other(format!("{} is not valid UTF-8: {}", url, e)))?;
            return Ok(Some(ExternalAsset::Text(text)));
        }
        Ok(Some(ExternalAsset::Bytes(bytes)))
    }

    fn release(&self, key: &CacheKey, _asset: Arc<ExternalAsset>) -> FetchResult<()> {
        trace!("Dropped cached {}", key);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "url"
    }
}

/// Downloads of arbitrary URLs with an optional in-memory cache
pub struct ExternalAssets {
    cache: KeyedCache<UrlLoader>,
    client: HttpClient,
}

impl ExternalAssets {
    pub fn new(client: HttpClient) -> Self {
        let cache = KeyedCache::new(UrlLoader::new(client.clone()), CacheOptions::default());
        debug!("Constructed external asset cache");
        Self { cache, client }
    }

    /// The cache holding downloaded bodies
    pub fn cache(&self) -> &KeyedCache<UrlLoader> {
        &self.cache
    }

    /// Download `url` as UTF-8 text
    pub async fn download_text(
        &self,
        url: &str,
        cache: bool,
        progress: Progress,
    ) -> LoadResult<Arc<ExternalAsset>> {
        let key = TypedKey::<Text>::new(url).to_cache_key()?;
        self.download(key, cache, progress).await
    }

    /// Download `url` as raw bytes
    pub async fn download_bytes(
        &self,
        url: &str,
        cache: bool,
        progress: Progress,
    ) -> LoadResult<Arc<ExternalAsset>> {
        let key = TypedKey::<Bytes>::new(url).to_cache_key()?;
        self.download(key, cache, progress).await
    }

    async fn download(
        &self,
        key: CacheKey,
        cache: bool,
        progress: Progress,
    ) -> LoadResult<Arc<ExternalAsset>> {
        if cache {
            return self.cache.load_key(key, progress).await;
        }
        match self.cache.loader().fetch(&key, &progress).await {
            Ok(Some(asset)) => Ok(Arc::new(asset)),
            Ok(None) => Err(LoadError::NotFound(key.name().to_string())),
            Err(err) => Err(LoadError::from_fetch(key.name(), err)),
        }
    }

    /// Save `url` to `save_path`.
    ///
    /// With `cache` set, an existing file at `save_path` is kept as is.
    pub async fn download_file(
        &self,
        url: &str,
        save_path: &Path,
        cache: bool,
        progress: Progress,
    ) -> LoadResult<()> {
        CacheKey::parse(url)?;
        if cache && tokio::fs::try_exists(save_path).await.unwrap_or(false) {
            debug!("{} already saved to {}", url, save_path.display());
            progress.finish();
            return Ok(());
        }

        debug!("Saving {} to {}", url, save_path.display());
        self.client
            .get_to_file(url, save_path, &progress)
            .await
            .map_err(|e| LoadError::from_fetch(url, e))?;
        Ok(())
    }

    /// Forget the cached text and bytes for `key`, or delete the file at that
    /// path if nothing is cached. Returns whether anything was deleted.
    pub fn delete_cache(&self, key: &str) -> bool {
        let mut deleted = false;
        for tag in [Text::TAG, Bytes::TAG] {
            let Ok(cache_key) = CacheKey::tagged(key, tag) else {
                continue;
            };
            if self.cache.contains_key(&cache_key) && self.cache.unload_key(cache_key).is_ok() {
                deleted = true;
            }
        }
        if deleted {
            debug!("Deleted {}", key);
            return true;
        }

        let path = Path::new(key);
        if path.is_file() {
            match std::fs::remove_file(path) {
                Ok(()) => {
                    debug!("Deleted {}", key);
                    return true;
                }
                Err(err) => {
                    warn!("Failed to delete {}: {}", key, err);
                    return false;
                }
            }
        }

        warn!("Failed to delete {}", key);
        false
    }

    /// Drop every cached download
    pub fn dispose(&self) -> usize {
        self.cache.dispose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    fn assets() -> ExternalAssets {
        ExternalAssets::new(HttpClient::new(Duration::from_secs(2), "hoard-test"))
    }

    #[test]
    fn text_and_bytes_are_distinct_kinds() {
        let text = TypedKey::<Text>::new("https://x/a").to_cache_key().unwrap();
        let bytes = TypedKey::<Bytes>::new("https://x/a").to_cache_key().unwrap();
        assert_ne!(text, bytes);
        assert_eq!(ExternalAsset::Text("hi".into()).bytes(), b"hi");
        assert_eq!(ExternalAsset::Bytes(vec![1]).text(), None);
    }

    #[tokio::test]
    async fn rejects_blank_urls() {
        let assets = assets();
        assert!(matches!(
            assets.download_text("", true, Progress::none()).await,
            Err(LoadError::InvalidKey { .. })
        ));
        assert!(matches!(
            assets
                .download_file(" ", Path::new("out"), true, Progress::none())
                .await,
            Err(LoadError::InvalidKey { .. })
        ));
    }

    #[tokio::test]
    async fn existing_file_skips_download() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("saved.bin");
        std::fs::write(&path, b"old").unwrap();

        assets()
            .download_file("http://127.0.0.1:1/saved.bin", &path, true, Progress::none())
            .await
            .unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"old");
    }

    #[tokio::test]
    async fn unreachable_urls_fail_without_caching() {
        let assets = assets();
        let err = assets
            .download_bytes("http://127.0.0.1:1/a", true, Progress::none())
            .await
            .unwrap_err();
        assert!(matches!(err, LoadError::LoadFailed { .. }));
        assert_eq!(assets.cache().stats().loaded, 0);
    }

    #[test]
    fn delete_cache_falls_back_to_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("download.txt");
        std::fs::write(&path, b"x").unwrap();
        let assets = assets();

        let key = path.to_str().unwrap();
        assert!(assets.delete_cache(key));
        assert!(!path.exists());
        assert!(!assets.delete_cache(key));
    }
}
