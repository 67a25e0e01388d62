//! Keyed asset cache with deduplicated concurrent loads
//!
//! Maps a [`CacheKey`] to a lazily loaded asset. At most one load per key is
//! in flight at any time; concurrent callers for the same key attach to that
//! load and all receive the same `Arc`. Every cached asset is handed to the
//! loader's `release` exactly once, on unload, dispose or drop.
//!
//! # Entry States
//!
//! | State | Description |
//! |-------|-------------|
//! | Absent | Never requested, unloaded, or the last load failed |
//! | Loading | Fetch running in its own task; callers attach to it |
//! | Loaded | Asset cached until unloaded |
//! | Failed | Not-found outcome remembered (`remember_failures` only) |
//!
//! # Concurrency
//!
//! The key map sits behind a `std::sync::Mutex` that is never held across an
//! await. Each fetch runs in a spawned task and publishes its outcome and
//! progress through `watch` channels. Dropping a load future detaches that
//! caller; when the last caller detaches the fetch is aborted, unless
//! `cancel_orphaned_loads` is off.
//!
//! `dispose` must not race with loads that are still starting: callers are
//! responsible for serializing teardown against new requests.

mod blocking;
mod pending;

pub use blocking::BlockingCache;

use crate::error::{FetchResult, LoadError, LoadResult};
use crate::key::{CacheKey, Scope};
use crate::loader::AssetLoader;
use crate::progress::Progress;
use chrono::{DateTime, Utc};
use futures_util::future::try_join_all;
use pending::{PendingLoad, Waiter};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::runtime::Handle;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

/// What `load_all` does when a group fails to load
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Propagate the error to the caller
    #[default]
    Strict,
    /// Log a warning and return an empty list
    BestEffort,
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strict => write!(f, "strict"),
            Self::BestEffort => write!(f, "best-effort"),
        }
    }
}

/// Construction-time cache settings
#[derive(Debug, Clone)]
pub struct CacheOptions {
    /// Prefix applied to every key
    pub scope: Option<String>,

    /// Failure handling for group loads
    pub failure_policy: FailurePolicy,

    /// Remember not-found outcomes until the key is unloaded
    pub remember_failures: bool,

    /// Abort a fetch once every caller waiting on it has gone away
    pub cancel_orphaned_loads: bool,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            scope: None,
            failure_policy: FailurePolicy::Strict,
            remember_failures: false,
            cancel_orphaned_loads: true,
        }
    }
}

impl CacheOptions {
    /// Default options under a scope prefix
    pub fn scoped(scope: impl Into<String>) -> Self {
        Self {
            scope: Some(scope.into()),
            ..Self::default()
        }
    }

    /// Set the group failure policy
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }
}

/// Entry counts by state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub loaded: usize,
    pub loading: usize,
    pub failed: usize,
    pub groups: usize,
}

/// State of a cache entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryState {
    Loaded,
    Loading,
    Failed,
}

impl fmt::Display for EntryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Loaded => "loaded",
            Self::Loading => "loading",
            Self::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

/// Point-in-time view of one entry
#[derive(Debug, Clone, Serialize)]
pub struct EntrySnapshot {
    /// Key as callers see it (scope stripped)
    pub key: String,
    pub kind: Option<&'static str>,
    pub state: EntryState,
    pub loaded_at: Option<DateTime<Utc>>,
    /// Callers attached to an in-flight load
    pub waiters: usize,
}

/// Keyed asset cache
///
/// Cheap to clone; clones share the same entries.
pub struct KeyedCache<L: AssetLoader> {
    inner: Arc<Inner<L>>,
}

impl<L: AssetLoader> Clone for KeyedCache<L> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

type Asset<L> = <L as AssetLoader>::Asset;

struct Inner<L: AssetLoader> {
    loader: L,
    scope: Scope,
    options: CacheOptions,
    runtime: Option<Handle>,
    state: Mutex<State<L::Asset>>,
    next_load_id: AtomicU64,
    disposed: AtomicBool,
}

struct State<A> {
    entries: HashMap<CacheKey, Slot<A>>,
    groups: HashMap<CacheKey, Arc<OnceCell<Vec<CacheKey>>>>,
}

enum Slot<A> {
    Ready {
        asset: Arc<A>,
        loaded_at: DateTime<Utc>,
    },
    Pending(Arc<PendingLoad<A>>),
    Failed(LoadError),
}

enum Attached<L: AssetLoader> {
    Ready(Arc<L::Asset>),
    Waiting(Waiter<L>),
}

impl<L: AssetLoader> KeyedCache<L> {
    /// Create a cache that spawns loads on the ambient tokio runtime
    pub fn new(loader: L, options: CacheOptions) -> Self {
        Self::build(loader, options, None)
    }

    /// Create a cache that spawns loads on `runtime`
    pub fn with_runtime(loader: L, options: CacheOptions, runtime: Handle) -> Self {
        Self::build(loader, options, Some(runtime))
    }

    fn build(loader: L, options: CacheOptions, runtime: Option<Handle>) -> Self {
        let scope = Scope::new(options.scope.as_deref());
        debug!(
            "Constructed {} cache (scope: {})",
            loader.name(),
            scope.prefix().unwrap_or("none")
        );
        Self {
            inner: Arc::new(Inner {
                loader,
                scope,
                options,
                runtime,
                state: Mutex::new(State {
                    entries: HashMap::new(),
                    groups: HashMap::new(),
                }),
                next_load_id: AtomicU64::new(1),
                disposed: AtomicBool::new(false),
            }),
        }
    }

    /// The loader backing this cache
    pub fn loader(&self) -> &L {
        &self.inner.loader
    }

    /// The key scope
    pub fn scope(&self) -> &Scope {
        &self.inner.scope
    }

    /// The options this cache was built with
    pub fn options(&self) -> &CacheOptions {
        &self.inner.options
    }

    /// Load an asset, reusing the cached or in-flight copy
    pub async fn load(&self, key: &str) -> LoadResult<Arc<Asset<L>>> {
        self.load_with_progress(key, Progress::none()).await
    }

    /// Load an asset, reporting fetch progress
    pub async fn load_with_progress(
        &self,
        key: &str,
        progress: Progress,
    ) -> LoadResult<Arc<Asset<L>>> {
        let key = CacheKey::parse(key)?;
        self.load_key(key, progress).await
    }

    /// Load the asset keyed by `T`'s short type name
    pub async fn load_type<T: ?Sized>(&self) -> LoadResult<Arc<Asset<L>>> {
        self.load_key(CacheKey::of::<T>(), Progress::none()).await
    }

    /// Load by a prebuilt (possibly tagged) key
    pub async fn load_key(&self, key: CacheKey, progress: Progress) -> LoadResult<Arc<Asset<L>>> {
        let key = self.inner.scope.apply(key);
        self.inner.load_scoped(key, progress).await
    }

    /// Load an asset, logging and discarding any failure
    pub async fn try_load(&self, key: &str) -> Option<Arc<Asset<L>>> {
        match self.load(key).await {
            Ok(asset) => Some(asset),
            Err(err) => {
                debug!("try_load {} failed: {}", key, err);
                None
            }
        }
    }

    /// Load every member of a group
    pub async fn load_all(&self, key: &str) -> LoadResult<Vec<Arc<Asset<L>>>> {
        self.load_all_with_progress(key, Progress::none()).await
    }

    /// Load every member of a group, reporting the mean member progress
    pub async fn load_all_with_progress(
        &self,
        key: &str,
        progress: Progress,
    ) -> LoadResult<Vec<Arc<Asset<L>>>> {
        let key = CacheKey::parse(key)?;
        self.load_all_key(key, progress).await
    }

    /// Load every member of a group by a prebuilt key
    pub async fn load_all_key(
        &self,
        key: CacheKey,
        progress: Progress,
    ) -> LoadResult<Vec<Arc<Asset<L>>>> {
        let group = self.inner.scope.apply(key);
        match self.inner.load_group(&group, progress).await {
            Ok(assets) => {
                debug!("Loaded all {} ({} asset(s))", group, assets.len());
                Ok(assets)
            }
            Err(err @ (LoadError::Disposed | LoadError::NoRuntime)) => Err(err),
            Err(err) if self.inner.options.failure_policy == FailurePolicy::BestEffort => {
                warn!("Failed to load all assets with key '{}': {}", group, err);
                Ok(Vec::new())
            }
            Err(err) => Err(err),
        }
    }

    /// Load every member of the group keyed by `T`'s short type name
    pub async fn load_all_type<T: ?Sized>(&self) -> LoadResult<Vec<Arc<Asset<L>>>> {
        self.load_all_key(CacheKey::of::<T>(), Progress::none()).await
    }

    /// Prefetch an asset's dependencies through the loader without caching it
    pub async fn download(&self, key: &str, progress: Progress) -> LoadResult<()> {
        self.download_key(CacheKey::parse(key)?, progress).await
    }

    /// Prefetch the dependencies of the asset keyed by `T`'s short type name
    pub async fn download_type<T: ?Sized>(&self, progress: Progress) -> LoadResult<()> {
        self.download_key(CacheKey::of::<T>(), progress).await
    }

    /// Prefetch by a prebuilt key
    pub async fn download_key(&self, key: CacheKey, progress: Progress) -> LoadResult<()> {
        let key = self.inner.scope.apply(key);
        self.inner.ensure_live()?;
        self.inner
            .loader
            .download(&key, &progress)
            .await
            .map_err(|e| LoadError::from_fetch(key.to_string(), e))?;
        debug!("Downloaded {}", key);
        Ok(())
    }

    /// Prefetch everything the loader knows about
    pub async fn download_all(&self, progress: Progress) -> LoadResult<()> {
        self.inner.ensure_live()?;
        self.inner
            .loader
            .download_all(&progress)
            .await
            .map_err(|e| LoadError::from_fetch("<all>", e))?;
        info!("Downloaded all assets via {}", self.inner.loader.name());
        Ok(())
    }

    /// Unload a single asset or a whole group.
    ///
    /// Unloading a key that is not loaded only logs a warning.
    pub fn unload(&self, key: &str) -> LoadResult<()> {
        self.unload_key(CacheKey::parse(key)?)
    }

    /// Unload the asset keyed by `T`'s short type name
    pub fn unload_type<T: ?Sized>(&self) -> LoadResult<()> {
        self.unload_key(CacheKey::of::<T>())
    }

    /// Unload by a prebuilt key
    pub fn unload_key(&self, key: CacheKey) -> LoadResult<()> {
        let key = self.inner.scope.apply(key);
        match self.inner.take(&key) {
            Ok(taken) => {
                let released = self.inner.release_all(taken);
                debug!("Unloaded {} ({} asset(s) released)", key, released);
            }
            Err(err @ LoadError::NotLoaded(_)) => warn!("{}", err),
            Err(err) => return Err(err),
        }
        Ok(())
    }

    /// Release every loaded asset and forget every group.
    ///
    /// Loads still in flight are left alone and land in the cache when they
    /// complete. Returns the number of assets released.
    pub fn unload_all(&self) -> usize {
        let taken = self.inner.drain(false);
        let released = self.inner.release_all(taken);
        info!("Unloaded {} asset(s)", released);
        released
    }

    /// Release everything and refuse further loads.
    ///
    /// Idempotent: later calls release nothing and return 0.
    pub fn dispose(&self) -> usize {
        if self.inner.disposed.swap(true, Ordering::AcqRel) {
            debug!("Cache already disposed");
            return 0;
        }
        let taken = self.inner.drain(true);
        let released = self.inner.release_all(taken);
        info!("Disposed {} cache ({} asset(s) released)", self.inner.loader.name(), released);
        released
    }

    /// Whether `dispose` has been called
    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.load(Ordering::Acquire)
    }

    /// Whether `key` currently holds a loaded asset
    pub fn contains(&self, key: &str) -> bool {
        let Ok(key) = CacheKey::parse(key) else {
            return false;
        };
        self.contains_key(&key)
    }

    /// Whether a prebuilt (possibly tagged) key holds a loaded asset
    pub fn contains_key(&self, key: &CacheKey) -> bool {
        let key = self.inner.scope.apply(key.clone());
        matches!(
            self.inner.state().entries.get(&key),
            Some(Slot::Ready { .. })
        )
    }

    /// Entry counts by state
    pub fn stats(&self) -> CacheStats {
        let state = self.inner.state();
        let mut stats = CacheStats {
            groups: state.groups.len(),
            ..CacheStats::default()
        };
        for slot in state.entries.values() {
            match slot {
                Slot::Ready { .. } => stats.loaded += 1,
                Slot::Pending(_) => stats.loading += 1,
                Slot::Failed(_) => stats.failed += 1,
            }
        }
        stats
    }

    /// Snapshot of every entry, sorted by key
    pub fn entries(&self) -> Vec<EntrySnapshot> {
        let state = self.inner.state();
        let mut entries: Vec<EntrySnapshot> = state
            .entries
            .iter()
            .map(|(key, slot)| {
                let (state, loaded_at, waiters) = match slot {
                    Slot::Ready { loaded_at, .. } => (EntryState::Loaded, Some(*loaded_at), 0),
                    Slot::Pending(pending) => (EntryState::Loading, None, pending.waiters()),
                    Slot::Failed(_) => (EntryState::Failed, None, 0),
                };
                EntrySnapshot {
                    key: self.inner.scope.strip(key).to_string(),
                    kind: key.tag(),
                    state,
                    loaded_at,
                    waiters,
                }
            })
            .collect();
        entries.sort_by(|a, b| a.key.cmp(&b.key).then(a.kind.cmp(&b.kind)));
        entries
    }
}

impl<L: AssetLoader> Inner<L> {
    fn state(&self) -> MutexGuard<'_, State<L::Asset>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_live(&self) -> LoadResult<()> {
        if self.disposed.load(Ordering::Acquire) {
            return Err(LoadError::Disposed);
        }
        Ok(())
    }

    async fn load_scoped(
        self: &Arc<Self>,
        key: CacheKey,
        progress: Progress,
    ) -> LoadResult<Arc<L::Asset>> {
        match self.attach(&key)? {
            Attached::Ready(asset) => {
                progress.finish();
                Ok(asset)
            }
            Attached::Waiting(waiter) => waiter.wait(&progress).await,
        }
    }

    /// Join the entry for `key`, starting a fetch if there is none
    fn attach(self: &Arc<Self>, key: &CacheKey) -> LoadResult<Attached<L>> {
        let mut state = self.state();
        self.ensure_live()?;

        match state.entries.get(key) {
            Some(Slot::Ready { asset, .. }) => return Ok(Attached::Ready(Arc::clone(asset))),
            Some(Slot::Failed(err)) => return Err(err.clone()),
            Some(Slot::Pending(pending)) => {
                debug!("Joining in-flight load of {}", key);
                return Ok(Attached::Waiting(Waiter::attach(self, pending)));
            }
            None => {}
        }

        let runtime = self
            .runtime
            .clone()
            .or_else(|| Handle::try_current().ok())
            .ok_or(LoadError::NoRuntime)?;

        let id = self.next_load_id.fetch_add(1, Ordering::Relaxed);
        let pending = Arc::new(PendingLoad::new(id, key.clone()));
        state
            .entries
            .insert(key.clone(), Slot::Pending(Arc::clone(&pending)));
        let waiter = Waiter::attach(self, &pending);

        let task = runtime.spawn(Arc::clone(self).run_fetch(Arc::clone(&pending)));
        pending.set_abort_handle(task.abort_handle());

        debug!("Loading {} via {}", key, self.loader.name());
        Ok(Attached::Waiting(waiter))
    }

    async fn run_fetch(self: Arc<Self>, pending: Arc<PendingLoad<L::Asset>>) {
        let mut guard = AbandonGuard {
            inner: &self,
            pending: &pending,
            armed: true,
        };
        let progress = pending.reporter();
        let result = self.loader.fetch(&pending.key, &progress).await;
        guard.armed = false;
        self.complete(&pending, result);
    }

    /// Publish a finished fetch to the map and to every waiter
    fn complete(&self, pending: &PendingLoad<L::Asset>, result: FetchResult<Option<L::Asset>>) {
        let key = &pending.key;
        let outcome = match result {
            Ok(Some(asset)) => Ok(Arc::new(asset)),
            Ok(None) => Err(LoadError::NotFound(key.to_string())),
            Err(err) => Err(LoadError::from_fetch(key.to_string(), err)),
        };

        let current = {
            let mut state = self.state();
            let current = is_current(&state, pending);
            if current {
                match &outcome {
                    Ok(asset) => {
                        state.entries.insert(
                            key.clone(),
                            Slot::Ready {
                                asset: Arc::clone(asset),
                                loaded_at: Utc::now(),
                            },
                        );
                    }
                    Err(err @ LoadError::NotFound(_)) if self.options.remember_failures => {
                        state.entries.insert(key.clone(), Slot::Failed(err.clone()));
                    }
                    Err(_) => {
                        state.entries.remove(key);
                    }
                }
            }
            current
        };

        let outcome = match outcome {
            Ok(asset) if !current => {
                debug!("Load of {} landed after its entry was dropped", key);
                release_with(&self.loader, key, asset);
                Err(self.stale_error(key))
            }
            other => other,
        };

        match &outcome {
            Ok(_) => debug!("Loaded {}", key),
            Err(err) => debug!("Load of {} failed: {}", key, err),
        }
        pending.finish(outcome);
    }

    /// The fetch task went away without completing (aborted or panicked)
    fn abandon(&self, pending: &PendingLoad<L::Asset>) {
        {
            let mut state = self.state();
            if is_current(&state, pending) {
                state.entries.remove(&pending.key);
            }
        }
        debug!("Abandoned load of {}", pending.key);
        pending.finish(Err(LoadError::Cancelled(pending.key.to_string())));
    }

    /// A waiter went away; abort the fetch if nobody is left
    fn detach(&self, pending: &PendingLoad<L::Asset>) {
        let mut state = self.state();
        let remaining = pending.release_waiter();
        if remaining > 0 || !self.options.cancel_orphaned_loads || !is_current(&state, pending) {
            return;
        }
        state.entries.remove(&pending.key);
        drop(state);

        pending.abort();
        debug!("Cancelled orphaned load of {}", pending.key);
    }

    fn stale_error(&self, key: &CacheKey) -> LoadError {
        if self.disposed.load(Ordering::Acquire) {
            LoadError::Disposed
        } else {
            LoadError::Cancelled(key.to_string())
        }
    }

    async fn load_group(
        self: &Arc<Self>,
        group: &CacheKey,
        progress: Progress,
    ) -> LoadResult<Vec<Arc<L::Asset>>> {
        let cell = {
            let mut state = self.state();
            self.ensure_live()?;
            Arc::clone(state.groups.entry(group.clone()).or_default())
        };

        let resolved = cell
            .get_or_try_init(|| async {
                self.loader
                    .resolve_group(group)
                    .await
                    .map_err(|e| LoadError::from_fetch(group.to_string(), e))
            })
            .await;
        let members = match resolved {
            Ok(members) => members.clone(),
            Err(err) => {
                self.forget_unresolved_group(group, &cell);
                return Err(err);
            }
        };
        debug!("Group {} resolved to {} member(s)", group, members.len());

        if members.is_empty() {
            progress.finish();
            return Ok(Vec::new());
        }

        let parts = progress.split(members.len());
        let loads = members
            .into_iter()
            .zip(parts)
            .map(|(member, part)| self.load_scoped(member, part));
        try_join_all(loads).await
    }

    fn forget_unresolved_group(&self, group: &CacheKey, cell: &Arc<OnceCell<Vec<CacheKey>>>) {
        let mut state = self.state();
        let unresolved = state
            .groups
            .get(group)
            .is_some_and(|c| Arc::ptr_eq(c, cell) && !c.initialized());
        if unresolved {
            state.groups.remove(group);
        }
    }

    /// Remove `key` (single entry first, then group) and return what to release
    fn take(&self, key: &CacheKey) -> LoadResult<Vec<(CacheKey, Arc<L::Asset>)>> {
        let mut state = self.state();

        match state.entries.remove(key) {
            Some(Slot::Ready { asset, .. }) => return Ok(vec![(key.clone(), asset)]),
            Some(Slot::Failed(_)) => return Ok(Vec::new()),
            Some(slot @ Slot::Pending(_)) => {
                state.entries.insert(key.clone(), slot);
                warn!("Cannot unload {} while it is still loading", key);
                return Ok(Vec::new());
            }
            None => {}
        }

        let members = match state.groups.get(key).map(|cell| cell.get().cloned()) {
            Some(Some(members)) => members,
            Some(None) => {
                warn!("Cannot unload group {} while it is still resolving", key);
                return Ok(Vec::new());
            }
            None => return Err(LoadError::NotLoaded(key.to_string())),
        };
        state.groups.remove(key);

        let mut taken = Vec::with_capacity(members.len());
        for member in members {
            match state.entries.remove(&member) {
                Some(Slot::Ready { asset, .. }) => taken.push((member, asset)),
                Some(slot @ Slot::Pending(_)) => {
                    warn!("Group member {} is still loading; leaving it cached", member);
                    state.entries.insert(member, slot);
                }
                Some(Slot::Failed(_)) => {}
                None => debug!("Group member {} was already unloaded", member),
            }
        }
        Ok(taken)
    }

    /// Empty the map, optionally including in-flight loads
    fn drain(&self, include_pending: bool) -> Vec<(CacheKey, Arc<L::Asset>)> {
        let mut state = self.state();
        state.groups.clear();

        let mut taken = Vec::new();
        for (key, slot) in std::mem::take(&mut state.entries) {
            match slot {
                Slot::Ready { asset, .. } => taken.push((key, asset)),
                Slot::Pending(_) if !include_pending => {
                    state.entries.insert(key, slot);
                }
                Slot::Pending(_) | Slot::Failed(_) => {}
            }
        }
        taken
    }

    fn release_all(&self, taken: Vec<(CacheKey, Arc<L::Asset>)>) -> usize {
        taken
            .into_iter()
            .filter(|(key, asset)| release_with(&self.loader, key, Arc::clone(asset)))
            .count()
    }
}

impl<L: AssetLoader> Drop for Inner<L> {
    fn drop(&mut self) {
        if *self.disposed.get_mut() {
            return;
        }
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        let entries = std::mem::take(&mut state.entries);

        let mut released = 0;
        for (key, slot) in entries {
            if let Slot::Ready { asset, .. } = slot {
                if release_with(&self.loader, &key, asset) {
                    released += 1;
                }
            }
        }
        if released > 0 {
            debug!("Released {} asset(s) on drop", released);
        }
    }
}

/// Sends a cancellation to waiters if the fetch task is dropped mid-flight
struct AbandonGuard<'a, L: AssetLoader> {
    inner: &'a Inner<L>,
    pending: &'a PendingLoad<L::Asset>,
    armed: bool,
}

impl<L: AssetLoader> Drop for AbandonGuard<'_, L> {
    fn drop(&mut self) {
        if self.armed {
            self.inner.abandon(self.pending);
        }
    }
}

fn is_current<A>(state: &State<A>, pending: &PendingLoad<A>) -> bool {
    matches!(
        state.entries.get(&pending.key),
        Some(Slot::Pending(p)) if p.id == pending.id
    )
}

fn release_with<L: AssetLoader>(loader: &L, key: &CacheKey, asset: Arc<L::Asset>) -> bool {
    match loader.release(key, asset) {
        Ok(()) => true,
        Err(err) => {
            warn!("Failed to release {}: {}", key, err);
            false
        }
    }
}
