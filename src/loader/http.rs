//! HTTP loader with an on-disk download cache
//!
//! Assets live at `<base_url>/<key>`. A JSON catalog at
//! `<base_url>/<catalog_path>` lists downloadable assets and named groups:
//!
//! ```json
//! { "assets": ["ui/logo.png"], "groups": { "enemies": ["enemies/orc"] } }
//! ```
//!
//! When a cache directory is configured, `download` stores bodies there under
//! a hash of their URL and `fetch` prefers the stored copy.

use super::AssetLoader;
use crate::error::{FetchError, FetchResult};
use crate::key::CacheKey;
use crate::progress::Progress;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info, trace};

const CHUNK: usize = 64 * 1024;

/// Blocking `ureq` agent driven from tokio's blocking pool
#[derive(Clone)]
pub struct HttpClient {
    agent: ureq::Agent,
}

impl HttpClient {
    pub fn new(timeout: Duration, user_agent: &str) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .user_agent(user_agent)
            .build();
        Self {
            agent: config.into(),
        }
    }

    /// GET `url` into memory
    pub async fn get_bytes(&self, url: &str, progress: &Progress) -> FetchResult<Vec<u8>> {
        let agent = self.agent.clone();
        let url = url.to_string();
        let progress = progress.clone();
        run_blocking(move || {
            let mut body = Vec::new();
            stream(&agent, &url, &progress, &mut body)?;
            Ok(body)
        })
        .await
    }

    /// GET `url` into `path`, replacing it atomically; returns bytes written
    pub async fn get_to_file(&self, url: &str, path: &Path, progress: &Progress) -> FetchResult<u64> {
        let agent = self.agent.clone();
        let url = url.to_string();
        let path = path.to_path_buf();
        let progress = progress.clone();
        run_blocking(move || {
            let dir = path.parent().unwrap_or_else(|| Path::new("."));
            std::fs::create_dir_all(dir)
                .map_err(|e| FetchError::io(format!("creating {}", dir.display()), e))?;

            let temp = dir.join(format!(".{}.part", uuid::Uuid::new_v4()));
            let written = std::fs::File::create(&temp)
                .map_err(|e| FetchError::io(format!("creating {}", temp.display()), e))
                .and_then(|mut file| stream(&agent, &url, &progress, &mut file));
            let written = match written {
                Ok(n) => n,
                Err(err) => {
                    let _ = std::fs::remove_file(&temp);
                    return Err(err);
                }
            };

            std::fs::rename(&temp, &path)
                .map_err(|e| FetchError::io(format!("moving download to {}", path.display()), e))?;
            Ok(written)
        })
        .await
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient").finish_non_exhaustive()
    }
}

async fn run_blocking<T, F>(f: F) -> FetchResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> FetchResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| FetchError::Other(format!("download task failed: {}", e)))?
}

fn stream(
    agent: &ureq::Agent,
    url: &str,
    progress: &Progress,
    sink: &mut impl Write,
) -> FetchResult<u64> {
    let mut response = agent.get(url).call().map_err(|e| request_error(url, e))?;
    let total = response.body().content_length();
    let mut reader = response.body_mut().as_reader();

    let context = || format!("downloading {}", url);
    let mut buf = vec![0u8; CHUNK];
    let mut done = 0u64;
    loop {
        let n = reader
            .read(&mut buf)
            .map_err(|e| FetchError::io(context(), e))?;
        if n == 0 {
            break;
        }
        sink.write_all(&buf[..n])
            .map_err(|e| FetchError::io(context(), e))?;
        done += n as u64;
        progress.report_bytes(done, total);
    }
    progress.finish();
    trace!("Fetched {} bytes from {}", done, url);
    Ok(done)
}

fn request_error(url: &str, err: ureq::Error) -> FetchError {
    match err {
        ureq::Error::StatusCode(status) => {
            FetchError::http(url, Some(status), format!("server returned {}", status))
        }
        other => FetchError::http(url, None, other.to_string()),
    }
}

/// Remote asset listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub assets: Vec<String>,
    #[serde(default)]
    pub groups: BTreeMap<String, Vec<String>>,
}

/// Body of a remote asset
#[derive(Debug, Clone)]
pub struct RemoteAsset {
    pub key: String,
    pub url: String,
    pub bytes: Vec<u8>,
    /// Served from the download cache rather than the network
    pub cached: bool,
}

/// Loads assets over HTTP
#[derive(Debug)]
pub struct HttpLoader {
    client: HttpClient,
    base_url: String,
    catalog_path: String,
    cache_dir: Option<PathBuf>,
    catalog: OnceCell<Catalog>,
}

impl HttpLoader {
    pub fn new(client: HttpClient, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            catalog_path: "catalog.json".to_string(),
            cache_dir: None,
            catalog: OnceCell::new(),
        }
    }

    pub fn with_catalog_path(mut self, path: impl Into<String>) -> Self {
        self.catalog_path = path.into();
        self
    }

    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    pub fn cache_dir(&self) -> Option<&Path> {
        self.cache_dir.as_deref()
    }

    pub fn url_for(&self, key: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            key.trim_start_matches('/')
        )
    }

    /// Where a downloaded copy of `key` is stored
    pub fn cached_path(&self, key: &str) -> Option<PathBuf> {
        let url = self.url_for(key);
        self.cache_dir
            .as_ref()
            .map(|dir| dir.join(cache_file_name(&url)))
    }

    /// Fetch the catalog once per loader
    pub async fn catalog(&self) -> FetchResult<&Catalog> {
        self.catalog
            .get_or_try_init(|| async {
                let url = self.url_for(&self.catalog_path);
                let body = self.client.get_bytes(&url, &Progress::none()).await?;
                let catalog: Catalog = serde_json::from_slice(&body)
                    .map_err(|e| FetchError::Other(format!("invalid catalog at {}: {}", url, e)))?;
                debug!(
                    "Catalog lists {} asset(s) and {} group(s)",
                    catalog.assets.len(),
                    catalog.groups.len()
                );
                Ok(catalog)
            })
            .await
    }

    /// Delete the downloaded copy of `key`; returns whether one existed
    pub async fn clear_cached(&self, key: &str) -> FetchResult<bool> {
        let Some(path) = self.cached_path(key) else {
            return Ok(false);
        };
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!("Removed cached copy of {}", key);
                Ok(true)
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(FetchError::io(format!("removing {}", path.display()), err)),
        }
    }
}

#[async_trait]
impl AssetLoader for HttpLoader {
    type Asset = RemoteAsset;

    async fn fetch(&self, key: &CacheKey, progress: &Progress) -> FetchResult<Option<RemoteAsset>> {
        let url = self.url_for(key.name());

        if let Some(path) = self.cached_path(key.name()) {
            match tokio::fs::read(&path).await {
                Ok(bytes) => {
                    debug!("Serving {} from download cache", key);
                    progress.finish();
                    return Ok(Some(RemoteAsset {
                        key: key.name().to_string(),
                        url,
                        bytes,
                        cached: true,
                    }));
                }
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => {
                    return Err(FetchError::io(format!("reading {}", path.display()), err))
                }
            }
        }

        match self.client.get_bytes(&url, progress).await {
            Ok(bytes) => Ok(Some(RemoteAsset {
                key: key.name().to_string(),
                url,
                bytes,
                cached: false,
            })),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn resolve_group(&self, key: &CacheKey) -> FetchResult<Vec<CacheKey>> {
        let catalog = self.catalog().await?;
        match catalog.groups.get(key.name()) {
            Some(members) => Ok(members.iter().map(|m| key.with_name(m.as_str())).collect()),
            None => Err(FetchError::NotFound(key.name().to_string())),
        }
    }

    fn release(&self, key: &CacheKey, asset: Arc<RemoteAsset>) -> FetchResult<()> {
        trace!("Released {} ({} bytes)", key, asset.bytes.len());
        Ok(())
    }

    async fn download(&self, key: &CacheKey, progress: &Progress) -> FetchResult<()> {
        let Some(path) = self.cached_path(key.name()) else {
            return Err(FetchError::Unsupported {
                loader: self.name(),
                operation: "downloads without a cache directory",
            });
        };
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            debug!("{} already downloaded", key);
            progress.finish();
            return Ok(());
        }

        let url = self.url_for(key.name());
        let written = self.client.get_to_file(&url, &path, progress).await?;
        debug!("Downloaded {} ({} bytes)", key, written);
        Ok(())
    }

    async fn download_all(&self, progress: &Progress) -> FetchResult<()> {
        let stages = progress.split(2);
        let catalog = self.catalog().await?;
        stages[0].finish();

        if catalog.assets.is_empty() {
            stages[1].finish();
            return Ok(());
        }

        let parts = stages[1].split(catalog.assets.len());
        for (asset, part) in catalog.assets.iter().zip(&parts) {
            let key = CacheKey::parse(asset).map_err(|e| FetchError::InvalidPath {
                path: asset.clone(),
                reason: e.to_string(),
            })?;
            self.download(&key, part).await?;
        }
        info!("Downloaded {} catalog asset(s)", catalog.assets.len());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

/// Stable file name for a URL in the download cache
pub(crate) fn cache_file_name(url: &str) -> String {
    let digest = Sha256::digest(url.as_bytes());
    hex::encode(&digest[..16])
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn loader(base: &str) -> HttpLoader {
        HttpLoader::new(HttpClient::new(Duration::from_secs(2), "hoard-test"), base)
    }

    #[test]
    fn joins_urls() {
        let loader = loader("https://cdn.example.com/assets/");
        assert_eq!(
            loader.url_for("/ui/logo.png"),
            "https://cdn.example.com/assets/ui/logo.png"
        );
    }

    #[test]
    fn cache_names_are_stable_hashes() {
        let a = cache_file_name("https://cdn.example.com/a");
        assert_eq!(a.len(), 32);
        assert_eq!(a, cache_file_name("https://cdn.example.com/a"));
        assert_ne!(a, cache_file_name("https://cdn.example.com/b"));
    }

    #[test]
    fn catalog_fields_are_optional() {
        let catalog: Catalog = serde_json::from_str(r#"{"assets": ["a"]}"#).unwrap();
        assert_eq!(catalog.assets, vec!["a"]);
        assert!(catalog.groups.is_empty());
    }

    #[tokio::test]
    async fn fetch_prefers_download_cache() {
        let dir = TempDir::new().unwrap();
        let loader = loader("http://127.0.0.1:1").with_cache_dir(dir.path());
        let path = loader.cached_path("ui/logo").unwrap();
        std::fs::write(&path, b"png").unwrap();

        let key = CacheKey::parse("ui/logo").unwrap();
        let asset = loader.fetch(&key, &Progress::none()).await.unwrap().unwrap();
        assert!(asset.cached);
        assert_eq!(asset.bytes, b"png");

        // Already present, so no request is made
        loader.download(&key, &Progress::none()).await.unwrap();

        assert!(loader.clear_cached("ui/logo").await.unwrap());
        assert!(!loader.clear_cached("ui/logo").await.unwrap());
    }

    #[tokio::test]
    async fn download_needs_cache_dir() {
        let loader = loader("http://127.0.0.1:1");
        let key = CacheKey::parse("a").unwrap();
        let err = loader.download(&key, &Progress::none()).await.unwrap_err();
        assert!(matches!(err, FetchError::Unsupported { .. }));
    }

    #[tokio::test]
    async fn unreachable_server_is_a_failure() {
        let loader = loader("http://127.0.0.1:1");
        let key = CacheKey::parse("a").unwrap();
        let err = loader.fetch(&key, &Progress::none()).await.unwrap_err();
        assert!(matches!(err, FetchError::Http { status: None, .. }));
        assert!(!err.is_not_found());
    }
}
