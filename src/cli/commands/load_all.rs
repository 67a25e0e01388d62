//! Load-all command - load every asset of a group

use super::{open_fs_cache, print_cache_state};
use crate::cache::FailurePolicy;
use crate::cli::args::LoadAllArgs;
use crate::config::Config;
use crate::error::HoardResult;
use crate::ui::{self, TransferProgress, UiContext};

/// Execute the load-all command
pub async fn execute(args: LoadAllArgs, config: &Config) -> HoardResult<()> {
    let ctx = UiContext::detect().with_json(args.source.json);
    let mut options = config.cache.options();
    if args.best_effort {
        options.failure_policy = FailurePolicy::BestEffort;
    }
    let cache = open_fs_cache(&args.source, config, options)?;

    ui::intro(&ctx, &format!("Loading group {}", args.group));
    let bar = TransferProgress::new(&ctx, &args.group);
    let result = cache
        .load_all_with_progress(&args.group, bar.reporter())
        .await;
    bar.finish();
    let assets = result?;

    for asset in &assets {
        ui::step_ok_detail(&ctx, &asset.key, &format!("{} bytes", asset.len()));
    }

    print_cache_state(&ctx, &cache)?;
    cache.dispose();

    if assets.is_empty() {
        ui::outro_warn(&ctx, &format!("No assets loaded for {}", args.group));
    } else {
        ui::outro_success(&ctx, &format!("Loaded {} asset(s)", assets.len()));
    }
    Ok(())
}
