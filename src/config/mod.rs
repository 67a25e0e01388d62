//! Configuration management for Hoard

pub mod schema;

pub use schema::{CacheConfig, Config, FsConfig, GeneralConfig, RemoteConfig};

use crate::error::{HoardError, HoardResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Project-local config file name
pub const LOCAL_CONFIG_FILE: &str = ".hoard.toml";

/// Configuration manager
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new config manager with default path
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Create a config manager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("hoard")
            .join("config.toml")
    }

    /// Walk up from `start` looking for a `.hoard.toml`
    pub fn find_local_config(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(LOCAL_CONFIG_FILE))
            .find(|candidate| candidate.is_file())
    }

    /// Load configuration, creating default if not exists
    pub async fn load(&self) -> HoardResult<Config> {
        if !self.config_path.exists() {
            debug!("Config file not found, using defaults");
            return Ok(Config::default());
        }

        self.load_from_file(&self.config_path).await
    }

    /// Load the global config with a local override merged on top.
    ///
    /// Tables merge key by key; any other value in the local file replaces
    /// the global one.
    pub async fn load_merged(&self, local: Option<&Path>) -> HoardResult<Config> {
        let Some(local) = local else {
            return self.load().await;
        };

        let mut merged = if self.config_path.exists() {
            self.read_table(&self.config_path).await?
        } else {
            toml::Table::new()
        };
        let overrides = self.read_table(local).await?;
        merge_tables(&mut merged, overrides);

        toml::Value::Table(merged)
            .try_into()
            .map_err(|e: toml::de::Error| HoardError::ConfigInvalid {
                path: local.to_path_buf(),
                reason: e.to_string(),
            })
    }

    /// Load configuration from a specific file
    pub async fn load_from_file(&self, path: &Path) -> HoardResult<Config> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| HoardError::io(format!("reading config from {}", path.display()), e))?;

        toml::from_str(&content).map_err(|e| HoardError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    async fn read_table(&self, path: &Path) -> HoardResult<toml::Table> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| HoardError::io(format!("reading config from {}", path.display()), e))?;

        content
            .parse::<toml::Table>()
            .map_err(|e| HoardError::ConfigInvalid {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
    }

    /// Save configuration to file
    pub async fn save(&self, config: &Config) -> HoardResult<()> {
        self.ensure_config_dir().await?;

        let content = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, content).await.map_err(|e| {
            HoardError::io(
                format!("writing config to {}", self.config_path.display()),
                e,
            )
        })?;

        info!("Configuration saved to {}", self.config_path.display());
        Ok(())
    }

    /// Ensure the config directory exists
    async fn ensure_config_dir(&self) -> HoardResult<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| HoardError::ConfigDirCreate {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }
        Ok(())
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

fn merge_tables(base: &mut toml::Table, overrides: toml::Table) {
    for (key, value) in overrides {
        if let toml::Value::Table(incoming) = value {
            if let Some(toml::Value::Table(existing)) = base.get_mut(&key) {
                merge_tables(existing, incoming);
                continue;
            }
            base.insert(key, toml::Value::Table(incoming));
        } else {
            base.insert(key, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::FailurePolicy;
    use serial_test::serial;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_default_when_missing() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nonexistent.toml");
        let manager = ConfigManager::with_path(path);

        let config = manager.load().await.unwrap();
        assert_eq!(config.fs.root, PathBuf::from("assets"));
    }

    #[tokio::test]
    async fn save_and_load_roundtrip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.toml");
        let manager = ConfigManager::with_path(path);

        let mut config = Config::default();
        config.cache.scope = Some("mymod".to_string());

        manager.save(&config).await.unwrap();
        let loaded = manager.load().await.unwrap();

        assert_eq!(loaded.cache.scope.as_deref(), Some("mymod"));
    }

    #[tokio::test]
    async fn invalid_config_is_reported() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[cache\nscope = ").unwrap();

        let err = ConfigManager::with_path(path).load().await.unwrap_err();
        assert!(matches!(err, HoardError::ConfigInvalid { .. }));
        assert!(err.hint().is_some());
    }

    #[tokio::test]
    async fn local_config_overrides_global() {
        let temp = TempDir::new().unwrap();
        let global = temp.path().join("config.toml");
        std::fs::write(
            &global,
            "[cache]\nscope = \"global\"\nremember_failures = true\n[fs]\nroot = \"/srv/assets\"\n",
        )
        .unwrap();
        let local = temp.path().join(LOCAL_CONFIG_FILE);
        std::fs::write(&local, "[cache]\nfailure_policy = \"best-effort\"\n").unwrap();

        let config = ConfigManager::with_path(global)
            .load_merged(Some(&local))
            .await
            .unwrap();
        assert_eq!(config.cache.scope.as_deref(), Some("global"));
        assert!(config.cache.remember_failures);
        assert_eq!(config.cache.failure_policy, FailurePolicy::BestEffort);
        assert_eq!(config.fs.root, PathBuf::from("/srv/assets"));
    }

    #[test]
    fn finds_local_config_in_ancestors() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(temp.path().join(LOCAL_CONFIG_FILE), "").unwrap();

        let found = ConfigManager::find_local_config(&nested).unwrap();
        assert_eq!(found, temp.path().join(LOCAL_CONFIG_FILE));
    }

    #[test]
    #[serial]
    fn config_path_env_is_honored_by_cli() {
        use crate::cli::Cli;
        use clap::Parser;

        std::env::set_var("HOARD_CONFIG", "/tmp/hoard-env.toml");
        let cli = Cli::try_parse_from(["hoard", "config", "path"]).unwrap();
        std::env::remove_var("HOARD_CONFIG");

        assert_eq!(cli.config, Some(PathBuf::from("/tmp/hoard-env.toml")));
    }
}
