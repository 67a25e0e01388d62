//! In-flight load bookkeeping
//!
//! A [`PendingLoad`] is shared between the fetch task and every caller
//! waiting on it. The task publishes progress and the final outcome through
//! `watch` channels; callers hold a [`Waiter`] whose drop detaches them.

use super::Inner;
use crate::error::{LoadError, LoadResult};
use crate::key::CacheKey;
use crate::loader::AssetLoader;
use crate::progress::Progress;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use tokio::sync::watch;
use tokio::task::AbortHandle;

pub(super) struct PendingLoad<A> {
    /// Distinguishes this load from later loads of the same key
    pub(super) id: u64,
    pub(super) key: CacheKey,
    outcome: watch::Sender<Option<LoadResult<Arc<A>>>>,
    progress: watch::Sender<f32>,
    waiters: AtomicUsize,
    abort: OnceLock<AbortHandle>,
}

impl<A: Send + Sync + 'static> PendingLoad<A> {
    pub(super) fn new(id: u64, key: CacheKey) -> Self {
        let (outcome, _) = watch::channel(None);
        let (progress, _) = watch::channel(0.0);
        Self {
            id,
            key,
            outcome,
            progress,
            waiters: AtomicUsize::new(0),
            abort: OnceLock::new(),
        }
    }

    /// Progress handle the loader reports into
    pub(super) fn reporter(self: &Arc<Self>) -> Progress {
        let this = Arc::clone(self);
        Progress::new(move |value| {
            this.progress.send_replace(value);
        })
    }

    pub(super) fn set_abort_handle(&self, handle: AbortHandle) {
        let _ = self.abort.set(handle);
    }

    pub(super) fn abort(&self) {
        if let Some(handle) = self.abort.get() {
            handle.abort();
        }
    }

    pub(super) fn waiters(&self) -> usize {
        self.waiters.load(Ordering::Acquire)
    }

    /// Drop one waiter; returns how many remain
    pub(super) fn release_waiter(&self) -> usize {
        self.waiters.fetch_sub(1, Ordering::AcqRel).saturating_sub(1)
    }

    /// Publish the outcome; only the first call has any effect
    pub(super) fn finish(&self, outcome: LoadResult<Arc<A>>) {
        self.outcome.send_if_modified(|slot| {
            if slot.is_some() {
                return false;
            }
            *slot = Some(outcome);
            true
        });
    }
}

/// One caller attached to a [`PendingLoad`]
pub(super) struct Waiter<L: AssetLoader> {
    inner: Arc<Inner<L>>,
    pending: Arc<PendingLoad<L::Asset>>,
}

impl<L: AssetLoader> Waiter<L> {
    /// Must be called with the cache state locked
    pub(super) fn attach(inner: &Arc<Inner<L>>, pending: &Arc<PendingLoad<L::Asset>>) -> Self {
        pending.waiters.fetch_add(1, Ordering::AcqRel);
        Self {
            inner: Arc::clone(inner),
            pending: Arc::clone(pending),
        }
    }

    /// Wait for the outcome, forwarding progress into `progress`
    pub(super) async fn wait(self, progress: &Progress) -> LoadResult<Arc<L::Asset>> {
        let mut outcome = self.pending.outcome.subscribe();
        let mut updates = self.pending.progress.subscribe();

        let current = *updates.borrow_and_update();
        if current > 0.0 {
            progress.report(current);
        }

        let mut listening = progress.is_tracked();
        let settled = loop {
            tokio::select! {
                biased;
                done = outcome.wait_for(Option::is_some) => {
                    break done.ok().and_then(|value| (*value).clone());
                }
                changed = updates.changed(), if listening => {
                    match changed {
                        Ok(()) => progress.report(*updates.borrow_and_update()),
                        Err(_) => listening = false,
                    }
                }
            }
        };

        let result =
            settled.unwrap_or_else(|| Err(LoadError::Cancelled(self.pending.key.to_string())));
        if result.is_ok() {
            progress.finish();
        }
        result
    }
}

impl<L: AssetLoader> Drop for Waiter<L> {
    fn drop(&mut self) {
        self.inner.detach(&self.pending);
    }
}
