//! Progress indicators with CI fallback

use super::context::UiContext;
use crate::progress::Progress;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Resolution of transfer bars
const BAR_STEPS: u64 = 1000;

/// A task spinner with CI fallback
pub struct TaskSpinner {
    spinner: Option<cliclack::ProgressBar>,
    interactive: bool,
    quiet: bool,
}

impl TaskSpinner {
    /// Create a new spinner (shows immediately in interactive mode)
    pub fn new(ctx: &UiContext) -> Self {
        Self {
            spinner: None,
            interactive: ctx.use_fancy_output(),
            quiet: ctx.is_json(),
        }
    }

    /// Start the spinner with a message
    pub fn start(&mut self, message: &str) {
        if self.interactive {
            let spinner = cliclack::spinner();
            spinner.start(message);
            self.spinner = Some(spinner);
        } else if !self.quiet {
            // Plain output for CI
            println!("{} {}", style("...").dim(), message);
        }
    }

    /// Stop with success message
    pub fn stop(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.stop(message);
        } else if self.quiet {
            return;
        } else if self.interactive {
            // Fallback if spinner wasn't started
            println!("{} {}", style("✓").green(), message);
        } else {
            println!("{} {}", style("[OK]").green(), message);
        }
    }

    /// Stop with error message
    pub fn stop_error(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.error(message);
        } else if self.quiet {
            return;
        } else if self.interactive {
            println!("{} {}", style("✗").red(), message);
        } else {
            println!("{} {}", style("[FAIL]").red(), message);
        }
    }
}

/// Progress bar for downloads and loads.
///
/// Shows an indicatif bar in interactive mode and a single line in CI. The
/// bar is driven through the [`Progress`] handle returned by
/// [`reporter`](Self::reporter).
pub struct TransferProgress {
    bar: Option<ProgressBar>,
}

impl TransferProgress {
    pub fn new(ctx: &UiContext, label: &str) -> Self {
        let bar = if ctx.use_fancy_output() {
            let bar = ProgressBar::new(BAR_STEPS);
            let bar_style = ProgressStyle::default_bar()
                .template("  {spinner:.cyan} {prefix}  {bar:20.cyan/dim} {percent:>3}%  {elapsed:.dim}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
                .progress_chars("━╸─");
            bar.set_style(bar_style);
            bar.set_prefix(label.to_string());
            bar.enable_steady_tick(std::time::Duration::from_millis(120));
            Some(bar)
        } else {
            if !ctx.is_json() {
                println!("{} {}", style("...").dim(), label);
            }
            None
        };
        Self { bar }
    }

    /// Progress handle feeding this bar
    pub fn reporter(&self) -> Progress {
        match &self.bar {
            Some(bar) => {
                let bar = bar.clone();
                Progress::new(move |value| bar.set_position(to_position(value)))
            }
            None => Progress::none(),
        }
    }

    /// Finish and clear the progress bar
    pub fn finish(&self) {
        if let Some(ref bar) = self.bar {
            bar.disable_steady_tick();
            bar.finish_and_clear();
        }
    }
}

fn to_position(value: f32) -> u64 {
    (value.clamp(0.0, 1.0) * BAR_STEPS as f32).round() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spinner_non_interactive() {
        let ctx = UiContext::non_interactive();
        let mut spinner = TaskSpinner::new(&ctx);
        spinner.start("Testing...");
        spinner.stop("Done");
        // Should not panic
    }

    #[test]
    fn transfer_progress_non_interactive() {
        let ctx = UiContext::non_interactive();
        let progress = TransferProgress::new(&ctx, "catalog");
        let reporter = progress.reporter();
        assert!(!reporter.is_tracked());
        reporter.report(0.5);
        progress.finish();
    }

    #[test]
    fn positions_scale_to_bar() {
        assert_eq!(to_position(0.0), 0);
        assert_eq!(to_position(0.25), 250);
        assert_eq!(to_position(1.5), BAR_STEPS);
    }
}
