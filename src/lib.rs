//! Hoard - keyed asset cache
//!
//! Loads assets by key through pluggable loaders. Concurrent requests for the
//! same key share one in-flight load, groups resolve to their members, and
//! everything is released exactly once on unload or dispose.

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod external;
pub mod key;
pub mod loader;
pub mod progress;
pub mod ui;

pub use cache::{BlockingCache, CacheOptions, FailurePolicy, KeyedCache};
pub use error::{FetchError, HoardError, HoardResult, LoadError, LoadResult};
pub use key::{AssetKind, CacheKey, Scope, TypedKey};
pub use loader::AssetLoader;
pub use progress::Progress;
