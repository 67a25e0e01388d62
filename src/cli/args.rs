//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Hoard - keyed asset cache
///
/// Loads assets from a directory or an HTTP server through a cache that
/// collapses concurrent requests for the same key into one load.
#[derive(Parser, Debug)]
#[command(name = "hoard")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "HOARD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Skip local .hoard.toml discovery
    #[arg(long, global = true)]
    pub no_local: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load assets from a directory and show the cache state
    Load(LoadArgs),

    /// Load every asset of a group (a directory under the root)
    LoadAll(LoadAllArgs),

    /// Download remote assets into the download cache
    Prefetch(PrefetchArgs),

    /// Fetch a single URL
    Get(GetArgs),

    /// Show or edit configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Options shared by the directory-backed commands
#[derive(Parser, Debug, Clone)]
pub struct SourceArgs {
    /// Asset root directory (default: from config)
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Key scope prefix (default: from config)
    #[arg(short, long)]
    pub scope: Option<String>,

    /// Print entries and stats as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the load command
#[derive(Parser, Debug)]
pub struct LoadArgs {
    /// Asset keys to load
    #[arg(required = true)]
    pub keys: Vec<String>,

    #[command(flatten)]
    pub source: SourceArgs,

    /// Request each key this many times concurrently
    #[arg(long, default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
    pub repeat: u32,
}

/// Arguments for the load-all command
#[derive(Parser, Debug)]
pub struct LoadAllArgs {
    /// Group key
    pub group: String,

    #[command(flatten)]
    pub source: SourceArgs,

    /// Return nothing instead of failing when a member cannot be loaded
    #[arg(long)]
    pub best_effort: bool,
}

/// Arguments for the prefetch command
#[derive(Parser, Debug)]
pub struct PrefetchArgs {
    /// Asset keys to download (all catalog assets when omitted)
    pub keys: Vec<String>,

    /// Remote base URL (default: from config)
    #[arg(long)]
    pub base_url: Option<String>,

    /// Download cache directory (default: from config)
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,
}

/// Arguments for the get command
#[derive(Parser, Debug)]
pub struct GetArgs {
    /// URL to fetch
    pub url: String,

    /// Save the body to this file instead of printing it
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Decode the body as UTF-8 text
    #[arg(long, conflicts_with = "output")]
    pub text: bool,

    /// Always download, even if the output file exists
    #[arg(long)]
    pub no_cache: bool,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., cache.scope)
        key: String,
        /// Value to set
        value: String,
    },
}

/// Arguments for the completions command
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn load_requires_keys() {
        assert!(Cli::try_parse_from(["hoard", "load"]).is_err());
        let cli = Cli::try_parse_from(["hoard", "load", "a", "b", "--repeat", "4"]).unwrap();
        match cli.command {
            Commands::Load(args) => {
                assert_eq!(args.keys, vec!["a", "b"]);
                assert_eq!(args.repeat, 4);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn repeat_must_be_positive() {
        assert!(Cli::try_parse_from(["hoard", "load", "a", "--repeat", "0"]).is_err());
    }

    #[test]
    fn text_conflicts_with_output() {
        assert!(Cli::try_parse_from(["hoard", "get", "http://x", "--text", "-o", "f"]).is_err());
    }
}
