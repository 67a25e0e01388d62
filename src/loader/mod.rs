//! Asset loader abstraction
//!
//! Loaders are the collaborators that actually materialize and free assets.
//! The cache never touches the backing store itself; it only calls into an
//! [`AssetLoader`]:
//! - [`FsLoader`]: assets under a local directory
//! - [`HttpLoader`]: assets served over HTTP, with an on-disk download cache

mod fs;
mod http;

pub use fs::{FsAsset, FsLoader};
pub use http::{Catalog, HttpClient, HttpLoader, RemoteAsset};

use crate::error::{FetchError, FetchResult};
use crate::key::CacheKey;
use crate::progress::Progress;
use async_trait::async_trait;
use std::sync::Arc;

/// Abstract asset loader interface
///
/// Keys passed in are already scoped. A loader may be called concurrently for
/// different keys, but the cache never fetches the same key twice at once.
#[async_trait]
pub trait AssetLoader: Send + Sync + 'static {
    /// The asset type this loader produces
    type Asset: Send + Sync + 'static;

    /// Materialize the asset for `key`.
    ///
    /// `Ok(None)` and [`FetchError::NotFound`] both mean the asset does not
    /// exist; any other error is a load failure.
    async fn fetch(&self, key: &CacheKey, progress: &Progress) -> FetchResult<Option<Self::Asset>>;

    /// Resolve a group key to its ordered member keys.
    ///
    /// Members are returned in the same namespace as `key` (scope included).
    async fn resolve_group(&self, key: &CacheKey) -> FetchResult<Vec<CacheKey>> {
        let _ = key;
        Err(FetchError::Unsupported {
            loader: self.name(),
            operation: "asset groups",
        })
    }

    /// Free an asset previously returned by [`fetch`](Self::fetch).
    ///
    /// Called exactly once per cached asset. Must tolerate assets the backing
    /// store has already torn down.
    fn release(&self, key: &CacheKey, asset: Arc<Self::Asset>) -> FetchResult<()>;

    /// Prefetch whatever `key` depends on without producing the asset
    async fn download(&self, key: &CacheKey, progress: &Progress) -> FetchResult<()> {
        let _ = key;
        progress.finish();
        Ok(())
    }

    /// Prefetch everything this loader knows about
    async fn download_all(&self, progress: &Progress) -> FetchResult<()> {
        progress.finish();
        Ok(())
    }

    /// Human-readable loader name for logs
    fn name(&self) -> &'static str;
}
