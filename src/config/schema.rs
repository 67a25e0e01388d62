//! Configuration schema for Hoard
//!
//! Configuration is stored at `~/.config/hoard/config.toml`

use crate::cache::{CacheOptions, FailurePolicy};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Cache behavior
    pub cache: CacheConfig,

    /// Local directory loader
    pub fs: FsConfig,

    /// Remote (HTTP) loader
    pub remote: RemoteConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
        }
    }
}

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Key prefix applied to every asset (empty = none)
    pub scope: Option<String>,

    /// "strict" propagates group load errors, "best-effort" returns nothing
    pub failure_policy: FailurePolicy,

    /// Remember not-found assets until unloaded
    pub remember_failures: bool,

    /// Abort loads nobody is waiting for anymore
    pub cancel_orphaned_loads: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            scope: None,
            failure_policy: FailurePolicy::Strict,
            remember_failures: false,
            cancel_orphaned_loads: true,
        }
    }
}

impl CacheConfig {
    /// Cache options for these settings
    pub fn options(&self) -> CacheOptions {
        CacheOptions {
            scope: self.scope.clone(),
            failure_policy: self.failure_policy,
            remember_failures: self.remember_failures,
            cancel_orphaned_loads: self.cancel_orphaned_loads,
        }
    }
}

/// Local directory loader settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FsConfig {
    /// Asset root directory
    pub root: PathBuf,
}

impl Default for FsConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("assets"),
        }
    }
}

/// Remote loader settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Base URL assets are served from
    pub base_url: Option<String>,

    /// Catalog path relative to the base URL
    pub catalog: String,

    /// Download cache directory (defaults to the user cache dir)
    pub cache_dir: Option<PathBuf>,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// User-Agent header sent with requests
    pub user_agent: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            catalog: "catalog.json".to_string(),
            cache_dir: None,
            timeout_secs: 30,
            user_agent: format!("hoard/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl RemoteConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Configured download cache, or `<user cache dir>/hoard/downloads`
    pub fn download_dir(&self) -> PathBuf {
        self.cache_dir.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("hoard")
                .join("downloads")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(toml.contains("[general]"));
        assert!(toml.contains("[cache]"));
        assert!(toml.contains("failure_policy = \"strict\""));
    }

    #[test]
    fn config_deserializes_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.fs.root, PathBuf::from("assets"));
        assert!(config.cache.cancel_orphaned_loads);
    }

    #[test]
    fn config_deserializes_partial() {
        let toml = r#"
            [cache]
            scope = "mymod"
            failure_policy = "best-effort"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        let options = config.cache.options();
        assert_eq!(options.scope.as_deref(), Some("mymod"));
        assert_eq!(options.failure_policy, FailurePolicy::BestEffort);
        assert_eq!(config.remote.timeout_secs, 30); // default preserved
    }

    #[test]
    fn rejects_unknown_policy() {
        let toml = r#"
            [cache]
            failure_policy = "lenient"
        "#;
        assert!(toml::from_str::<Config>(toml).is_err());
    }
}
