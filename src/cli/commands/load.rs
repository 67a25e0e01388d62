//! Load command - load assets from a directory through one cache

use super::{open_fs_cache, print_cache_state};
use crate::cli::args::LoadArgs;
use crate::config::Config;
use crate::error::{HoardError, HoardResult};
use crate::ui::{self, TaskSpinner, UiContext};
use futures_util::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;

/// Execute the load command
pub async fn execute(args: LoadArgs, config: &Config) -> HoardResult<()> {
    let ctx = UiContext::detect().with_json(args.source.json);
    let cache = open_fs_cache(&args.source, config, config.cache.options())?;

    let mut seen = HashSet::new();
    let keys: Vec<&str> = args
        .keys
        .iter()
        .map(String::as_str)
        .filter(|key| seen.insert(*key))
        .collect();
    let repeat = args.repeat as usize;

    ui::intro(&ctx, &format!("Loading {} asset(s)", keys.len()));
    let mut spinner = TaskSpinner::new(&ctx);
    spinner.start(&format!("Loading {} request(s)...", keys.len() * repeat));

    let requests = keys
        .iter()
        .flat_map(|key| std::iter::repeat(*key).take(repeat))
        .map(|key| {
            let cache = cache.clone();
            async move { (key, cache.load(key).await) }
        });
    let results = join_all(requests).await;

    let failures = results.iter().filter(|(_, r)| r.is_err()).count();
    if failures == 0 {
        spinner.stop("All assets loaded");
    } else {
        spinner.stop_error(&format!("{} request(s) failed", failures));
    }

    let mut first_error = None;
    for key in keys {
        let outcomes: Vec<_> = results.iter().filter(|(k, _)| *k == key).collect();
        match &outcomes[0].1 {
            Ok(asset) => {
                let shared = outcomes.iter().all(|(_, r)| match r {
                    Ok(other) => Arc::ptr_eq(asset, other),
                    Err(_) => false,
                });
                let detail = if repeat > 1 && shared {
                    format!("{} bytes, {} requests shared one load", asset.len(), repeat)
                } else {
                    format!("{} bytes", asset.len())
                };
                ui::step_ok_detail(&ctx, key, &detail);
            }
            Err(err) => {
                ui::step_error_detail(&ctx, key, &err.to_string());
                first_error.get_or_insert_with(|| err.clone());
            }
        }
    }

    print_cache_state(&ctx, &cache)?;
    let released = cache.dispose();
    ui::remark(&ctx, &format!("Released {} asset(s)", released));

    match first_error {
        Some(err) => Err(HoardError::Load(err)),
        None => {
            ui::outro_success(&ctx, "Done");
            Ok(())
        }
    }
}
