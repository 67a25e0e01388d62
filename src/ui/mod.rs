//! UI module for consistent CLI output
//!
//! Uses `cliclack` log steps and spinners with automatic fallback to plain
//! output in CI/non-interactive environments, and `indicatif` bars for
//! byte-level transfer progress.
//!
//! # Example
//!
//! ```rust,ignore
//! use hoard::ui::{self, UiContext, TransferProgress};
//!
//! let ctx = UiContext::detect();
//!
//! ui::intro(&ctx, "Prefetching assets");
//!
//! let bar = TransferProgress::new(&ctx, "catalog");
//! cache.download_all(bar.reporter()).await?;
//! bar.finish();
//!
//! ui::outro_success(&ctx, "All assets downloaded");
//! ```

mod context;
mod output;
mod progress;

pub use context::UiContext;
pub use output::{
    intro, key_value, outro_success, outro_warn, remark, section, step_error_detail, step_ok,
    step_ok_detail, step_warn_hint,
};
pub use progress::{TaskSpinner, TransferProgress};
