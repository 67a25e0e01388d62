//! Config command - show or edit configuration

use crate::cache::FailurePolicy;
use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::config::{Config, ConfigManager};
use crate::error::{HoardError, HoardResult};
use crate::ui::{self, UiContext};
use std::path::PathBuf;

const VALID_KEYS: &[&str] = &[
    "general.log_format",
    "cache.scope",
    "cache.failure_policy",
    "cache.remember_failures",
    "cache.cancel_orphaned_loads",
    "fs.root",
    "remote.base_url",
    "remote.catalog",
    "remote.cache_dir",
    "remote.timeout_secs",
    "remote.user_agent",
];

/// Execute the config command
pub async fn execute(args: ConfigArgs, config: &Config, manager: &ConfigManager) -> HoardResult<()> {
    match args.action {
        None | Some(ConfigAction::Show) => show_config(config)?,
        Some(ConfigAction::Path) => show_path(manager),
        Some(ConfigAction::Init { force }) => init_config(manager, force).await?,
        Some(ConfigAction::Set { key, value }) => set_value(manager, &key, &value).await?,
    }

    Ok(())
}

fn show_config(config: &Config) -> HoardResult<()> {
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

fn show_path(manager: &ConfigManager) {
    println!("{}", manager.path().display());
}

async fn init_config(manager: &ConfigManager, force: bool) -> HoardResult<()> {
    let ctx = UiContext::detect();
    let path = manager.path();

    if path.exists() && !force {
        ui::step_warn_hint(
            &ctx,
            &format!("Config already exists at {}", path.display()),
            "Use --force to overwrite",
        );
        return Ok(());
    }

    let config = Config::default();
    manager.save(&config).await?;

    ui::step_ok_detail(
        &ctx,
        "Configuration initialized",
        &path.display().to_string(),
    );

    Ok(())
}

/// Update one key in the file `manager` points at (not the merged view)
async fn set_value(manager: &ConfigManager, key: &str, value: &str) -> HoardResult<()> {
    let ctx = UiContext::detect();
    let mut config = manager.load().await?;

    if let Err(err) = apply(&mut config, key, value) {
        if matches!(err, HoardError::User(ref msg) if msg.starts_with("Unknown config key")) {
            ui::remark(&ctx, &format!("Valid keys: {}", VALID_KEYS.join(", ")));
        }
        return Err(err);
    }

    manager.save(&config).await?;
    ui::step_ok(&ctx, &format!("Set {} = {}", key, value));

    Ok(())
}

fn apply(config: &mut Config, key: &str, value: &str) -> HoardResult<()> {
    let parts: Vec<&str> = key.split('.').collect();

    match parts.as_slice() {
        ["general", "log_format"] => config.general.log_format = parse_log_format(value)?,

        ["cache", "scope"] => config.cache.scope = optional(value),
        ["cache", "failure_policy"] => config.cache.failure_policy = parse_policy(value)?,
        ["cache", "remember_failures"] => config.cache.remember_failures = parse_bool(value)?,
        ["cache", "cancel_orphaned_loads"] => {
            config.cache.cancel_orphaned_loads = parse_bool(value)?
        }

        ["fs", "root"] => config.fs.root = PathBuf::from(value),

        ["remote", "base_url"] => config.remote.base_url = optional(value),
        ["remote", "catalog"] => config.remote.catalog = value.to_string(),
        ["remote", "cache_dir"] => config.remote.cache_dir = optional(value).map(PathBuf::from),
        ["remote", "timeout_secs"] => config.remote.timeout_secs = parse_u64(value)?,
        ["remote", "user_agent"] => config.remote.user_agent = value.to_string(),

        _ => return Err(HoardError::User(format!("Unknown config key: {}", key))),
    }

    Ok(())
}

/// Empty values clear optional settings
fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn parse_bool(value: &str) -> HoardResult<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(HoardError::User(format!(
            "Invalid boolean value: {}. Use true/false",
            value
        ))),
    }
}

fn parse_u64(value: &str) -> HoardResult<u64> {
    value
        .parse()
        .map_err(|_| HoardError::User(format!("Invalid number: {}", value)))
}

fn parse_policy(value: &str) -> HoardResult<FailurePolicy> {
    match value {
        "strict" => Ok(FailurePolicy::Strict),
        "best-effort" => Ok(FailurePolicy::BestEffort),
        _ => Err(HoardError::User(format!(
            "Invalid failure policy: {}. Use strict/best-effort",
            value
        ))),
    }
}

fn parse_log_format(value: &str) -> HoardResult<String> {
    match value {
        "text" | "json" => Ok(value.to_string()),
        _ => Err(HoardError::User(format!(
            "Invalid log format: {}. Use text/json",
            value
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn applies_known_keys() {
        let mut config = Config::default();
        apply(&mut config, "cache.scope", "mymod").unwrap();
        apply(&mut config, "cache.failure_policy", "best-effort").unwrap();
        apply(&mut config, "remote.timeout_secs", "5").unwrap();
        apply(&mut config, "remote.cache_dir", "").unwrap();

        assert_eq!(config.cache.scope.as_deref(), Some("mymod"));
        assert_eq!(config.cache.failure_policy, FailurePolicy::BestEffort);
        assert_eq!(config.remote.timeout_secs, 5);
        assert_eq!(config.remote.cache_dir, None);
    }

    #[test]
    fn rejects_bad_values() {
        let mut config = Config::default();
        assert!(apply(&mut config, "cache.size", "x").is_err());
        assert!(apply(&mut config, "cache.remember_failures", "maybe").is_err());
        assert!(apply(&mut config, "general.log_format", "xml").is_err());
    }

    #[tokio::test]
    async fn set_persists_to_file() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_path(temp.path().join("config.toml"));

        set_value(&manager, "fs.root", "/srv/assets").await.unwrap();
        let loaded = manager.load().await.unwrap();
        assert_eq!(loaded.fs.root, PathBuf::from("/srv/assets"));
    }
}
