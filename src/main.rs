//! Hoard - keyed asset cache
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use hoard::cli::{Cli, Commands};
use hoard::config::{Config, ConfigManager};
use hoard::error::{HoardError, HoardResult};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> HoardResult<()> {
    let cli = Cli::parse();

    // Completions don't need config loading
    if let Commands::Completions(args) = cli.command {
        hoard::cli::commands::completions(args);
        return Ok(());
    }

    let config_manager = if let Some(ref path) = cli.config {
        ConfigManager::with_path(path.clone())
    } else {
        ConfigManager::new()
    };

    // Find local config unless --no-local is set
    let local_config_path = if cli.no_local {
        None
    } else {
        let cwd = std::env::current_dir()
            .map_err(|e| HoardError::io("getting current directory", e))?;
        ConfigManager::find_local_config(&cwd)
    };

    let config = config_manager
        .load_merged(local_config_path.as_deref())
        .await?;

    init_logging(cli.verbose, &config);
    if let Some(ref path) = local_config_path {
        debug!("Using local config: {}", path.display());
    }

    match cli.command {
        Commands::Completions(_) => unreachable!("Completions handled above"),
        Commands::Load(args) => hoard::cli::commands::load(args, &config).await,
        Commands::LoadAll(args) => hoard::cli::commands::load_all(args, &config).await,
        Commands::Prefetch(args) => hoard::cli::commands::prefetch(args, &config).await,
        Commands::Get(args) => hoard::cli::commands::get(args, &config).await,
        Commands::Config(args) => {
            hoard::cli::commands::config(args, &config, &config_manager).await
        }
    }
}

/// 0 = warn, 1 = info, 2+ = debug. Logs go to stderr so `--json` output stays clean.
fn init_logging(verbose: u8, config: &Config) {
    let filter = match verbose {
        0 => EnvFilter::new("hoard=warn"),
        1 => EnvFilter::new("hoard=info"),
        _ => EnvFilter::new("hoard=debug"),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time();

    if config.general.log_format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}
