//! CLI command implementations

pub mod completions;
pub mod config;
pub mod get;
pub mod load;
pub mod load_all;
pub mod prefetch;

pub use completions::execute as completions;
pub use config::execute as config;
pub use get::execute as get;
pub use load::execute as load;
pub use load_all::execute as load_all;
pub use prefetch::execute as prefetch;

use crate::cache::{CacheOptions, CacheStats, EntrySnapshot, EntryState, KeyedCache};
use crate::cli::args::SourceArgs;
use crate::config::Config;
use crate::error::{HoardError, HoardResult};
use crate::loader::{AssetLoader, FsLoader, HttpClient};
use crate::ui::{self, UiContext};
use console::style;
use tracing::debug;

/// Cache over the configured (or overridden) asset directory
fn open_fs_cache(
    source: &SourceArgs,
    config: &Config,
    mut options: CacheOptions,
) -> HoardResult<KeyedCache<FsLoader>> {
    let root = source.root.clone().unwrap_or_else(|| config.fs.root.clone());
    if !root.is_dir() {
        return Err(HoardError::PathNotFound(root));
    }
    if source.scope.is_some() {
        options.scope = source.scope.clone();
    }
    debug!("Serving assets from {}", root.display());
    Ok(KeyedCache::new(FsLoader::new(root), options))
}

fn http_client(config: &Config) -> HttpClient {
    HttpClient::new(config.remote.timeout(), &config.remote.user_agent)
}

/// Print the cache's entries and counts as a table or JSON
fn print_cache_state<L: AssetLoader>(
    ctx: &UiContext,
    cache: &KeyedCache<L>,
) -> HoardResult<()> {
    let entries = cache.entries();
    let stats = cache.stats();

    if ctx.is_json() {
        #[derive(serde::Serialize)]
        struct CacheJson<'a> {
            scope: Option<&'a str>,
            entries: &'a [EntrySnapshot],
            stats: CacheStats,
        }

        let json = CacheJson {
            scope: cache.scope().prefix(),
            entries: &entries,
            stats,
        };
        println!("{}", serde_json::to_string_pretty(&json)?);
        return Ok(());
    }

    ui::section(ctx, "Cache");
    println!("  {:<40} {:<10} {:<20}", "KEY", "STATE", "LOADED");
    println!("  {}", "-".repeat(70));
    for entry in &entries {
        let state = match entry.state {
            EntryState::Loaded => style(entry.state).green().to_string(),
            EntryState::Loading => style(entry.state).yellow().to_string(),
            EntryState::Failed => style(entry.state).red().to_string(),
        };
        let loaded = entry
            .loaded_at
            .map(|t| t.format("%H:%M:%S%.3f").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("  {:<40} {:<10} {:<20}", entry.key, state, loaded);
    }
    println!();
    ui::key_value(ctx, "loaded", &stats.loaded.to_string());
    ui::key_value(ctx, "groups", &stats.groups.to_string());
    if let Some(scope) = cache.scope().prefix() {
        ui::key_value(ctx, "scope", scope);
    }
    Ok(())
}
