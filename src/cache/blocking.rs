//! Synchronous facade over [`KeyedCache`]
//!
//! Owns a small multi-threaded runtime that drives loads, so callers without
//! an async context can use the cache. Must not be used from inside another
//! tokio runtime.

use super::{CacheOptions, KeyedCache};
use crate::error::{HoardError, HoardResult, LoadResult};
use crate::loader::AssetLoader;
use crate::progress::Progress;
use std::sync::Arc;
use tokio::runtime::{Builder, Runtime};

/// Blocking asset cache
pub struct BlockingCache<L: AssetLoader> {
    // Dropped before the runtime so final releases still see a live runtime
    cache: KeyedCache<L>,
    runtime: Runtime,
}

impl<L: AssetLoader> BlockingCache<L> {
    /// Create a cache with its own load runtime
    pub fn new(loader: L, options: CacheOptions) -> HoardResult<Self> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("hoard-load")
            .enable_all()
            .build()
            .map_err(|e| HoardError::io("starting load runtime", e))?;
        let cache = KeyedCache::with_runtime(loader, options, runtime.handle().clone());
        Ok(Self { cache, runtime })
    }

    /// The async cache behind this facade
    pub fn cache(&self) -> &KeyedCache<L> {
        &self.cache
    }

    pub fn load(&self, key: &str) -> LoadResult<Arc<L::Asset>> {
        self.runtime.block_on(self.cache.load(key))
    }

    pub fn load_with_progress(&self, key: &str, progress: Progress) -> LoadResult<Arc<L::Asset>> {
        self.runtime
            .block_on(self.cache.load_with_progress(key, progress))
    }

    pub fn load_all(&self, key: &str) -> LoadResult<Vec<Arc<L::Asset>>> {
        self.runtime.block_on(self.cache.load_all(key))
    }

    pub fn try_load(&self, key: &str) -> Option<Arc<L::Asset>> {
        self.runtime.block_on(self.cache.try_load(key))
    }

    pub fn download(&self, key: &str, progress: Progress) -> LoadResult<()> {
        self.runtime.block_on(self.cache.download(key, progress))
    }

    pub fn download_all(&self, progress: Progress) -> LoadResult<()> {
        self.runtime.block_on(self.cache.download_all(progress))
    }

    pub fn unload(&self, key: &str) -> LoadResult<()> {
        self.cache.unload(key)
    }

    pub fn unload_all(&self) -> usize {
        self.cache.unload_all()
    }

    pub fn dispose(&self) -> usize {
        self.cache.dispose()
    }
}
