//! Fractional progress reporting
//!
//! A [`Progress`] is a cheap, cloneable handle around an optional callback
//! receiving values in `0.0..=1.0`. Untracked handles make every report a
//! no-op, so loaders can report unconditionally.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

/// Callback receiving progress values
pub type ProgressFn = dyn Fn(f32) + Send + Sync;

/// Progress reporter handed to loads and loaders
#[derive(Clone, Default)]
pub struct Progress {
    sink: Option<Arc<ProgressFn>>,
}

impl Progress {
    /// Report into `f`
    pub fn new(f: impl Fn(f32) + Send + Sync + 'static) -> Self {
        Self {
            sink: Some(Arc::new(f)),
        }
    }

    /// A reporter that discards everything
    pub fn none() -> Self {
        Self::default()
    }

    /// Whether anyone is listening
    pub fn is_tracked(&self) -> bool {
        self.sink.is_some()
    }

    /// Report a fraction, clamped to `0.0..=1.0` (NaN reports as 0)
    pub fn report(&self, value: f32) {
        if let Some(sink) = &self.sink {
            sink(clamp(value));
        }
    }

    /// Report `done` out of `total` bytes; unknown totals report nothing
    pub fn report_bytes(&self, done: u64, total: Option<u64>) {
        match total {
            Some(0) => self.report(1.0),
            Some(total) => self.report((done as f64 / total as f64) as f32),
            None => {}
        }
    }

    /// Report completion
    pub fn finish(&self) {
        self.report(1.0);
    }

    /// Split into `parts` equally weighted sub-reporters.
    ///
    /// Each sub-reporter tracks its own fraction; this reporter receives
    /// their mean whenever any of them changes.
    pub fn split(&self, parts: usize) -> Vec<Progress> {
        let Some(sink) = self.sink.clone() else {
            return vec![Progress::none(); parts];
        };
        if parts == 0 {
            return Vec::new();
        }

        let fractions = Arc::new(Mutex::new(vec![0.0f32; parts]));
        (0..parts)
            .map(|index| {
                let fractions = Arc::clone(&fractions);
                let sink = Arc::clone(&sink);
                Progress::new(move |value| {
                    let mean = {
                        let mut fractions =
                            fractions.lock().unwrap_or_else(PoisonError::into_inner);
                        fractions[index] = value;
                        fractions.iter().sum::<f32>() / fractions.len() as f32
                    };
                    sink(clamp(mean));
                })
            })
            .collect()
    }
}

impl fmt::Debug for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Progress")
            .field("tracked", &self.is_tracked())
            .finish()
    }
}

fn clamp(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder() -> (Progress, Arc<Mutex<Vec<f32>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let progress = Progress::new(move |v| sink.lock().unwrap().push(v));
        (progress, seen)
    }

    #[test]
    fn clamps_values() {
        let (progress, seen) = recorder();
        progress.report(-1.0);
        progress.report(2.0);
        progress.report(f32::NAN);
        assert_eq!(*seen.lock().unwrap(), vec![0.0, 1.0, 0.0]);
    }

    #[test]
    fn split_reports_mean() {
        let (progress, seen) = recorder();
        let parts = progress.split(2);
        parts[0].finish();
        parts[1].report(0.5);
        assert_eq!(*seen.lock().unwrap(), vec![0.5, 0.75]);
    }

    #[test]
    fn untracked_split_is_untracked() {
        let parts = Progress::none().split(3);
        assert_eq!(parts.len(), 3);
        assert!(parts.iter().all(|p| !p.is_tracked()));
    }

    #[test]
    fn byte_progress() {
        let (progress, seen) = recorder();
        progress.report_bytes(25, Some(100));
        progress.report_bytes(10, None);
        progress.report_bytes(0, Some(0));
        assert_eq!(*seen.lock().unwrap(), vec![0.25, 1.0]);
    }
}
