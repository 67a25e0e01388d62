//! Prefetch command - download remote assets into the download cache

use super::http_client;
use crate::cache::KeyedCache;
use crate::cli::args::PrefetchArgs;
use crate::config::Config;
use crate::error::{HoardError, HoardResult};
use crate::loader::HttpLoader;
use crate::ui::{self, TransferProgress, UiContext};

/// Execute the prefetch command
pub async fn execute(args: PrefetchArgs, config: &Config) -> HoardResult<()> {
    let ctx = UiContext::detect();
    let base_url = args
        .base_url
        .or_else(|| config.remote.base_url.clone())
        .ok_or(HoardError::RemoteNotConfigured)?;
    let cache_dir = args
        .cache_dir
        .unwrap_or_else(|| config.remote.download_dir());

    let loader = HttpLoader::new(http_client(config), &base_url)
        .with_catalog_path(&config.remote.catalog)
        .with_cache_dir(&cache_dir);
    let cache = KeyedCache::new(loader, config.cache.options());

    ui::intro(&ctx, &format!("Prefetching from {}", base_url));

    if args.keys.is_empty() {
        let bar = TransferProgress::new(&ctx, "catalog");
        let result = cache.download_all(bar.reporter()).await;
        bar.finish();
        result?;
        ui::step_ok(&ctx, "All catalog assets downloaded");
    } else {
        for key in &args.keys {
            let bar = TransferProgress::new(&ctx, key);
            let result = cache.download(key, bar.reporter()).await;
            bar.finish();
            result?;
            ui::step_ok(&ctx, key);
        }
    }

    ui::key_value(&ctx, "cache", &cache_dir.display().to_string());
    ui::outro_success(&ctx, "Prefetch complete");
    Ok(())
}
