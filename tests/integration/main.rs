//! Integration tests for Hoard

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use tempfile::TempDir;

    /// Command isolated from the user's global and local config
    fn hoard(temp: &TempDir) -> Command {
        let mut cmd = cargo_bin_cmd!("hoard");
        cmd.env_remove("HOARD_CONFIG")
            .arg("--no-local")
            .arg("--config")
            .arg(temp.path().join("config.toml"));
        cmd
    }

    fn asset_root() -> TempDir {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("assets");
        std::fs::create_dir_all(root.join("sprites")).unwrap();
        std::fs::write(root.join("hero.png"), b"hero-bytes").unwrap();
        std::fs::write(root.join("sprites").join("a.png"), b"a").unwrap();
        std::fs::write(root.join("sprites").join("b.png"), b"bb").unwrap();
        temp
    }

    #[test]
    fn help_displays() {
        cargo_bin_cmd!("hoard")
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Keyed asset cache"));
    }

    #[test]
    fn version_displays() {
        cargo_bin_cmd!("hoard")
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("hoard"));
    }

    #[test]
    fn config_path() {
        let temp = TempDir::new().unwrap();
        hoard(&temp)
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show() {
        let temp = TempDir::new().unwrap();
        hoard(&temp)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[cache]"));
    }

    #[test]
    fn config_set_then_show() {
        let temp = TempDir::new().unwrap();
        hoard(&temp)
            .args(["config", "set", "cache.scope", "mymod"])
            .assert()
            .success();
        hoard(&temp)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("scope = \"mymod\""));
    }

    #[test]
    fn config_set_unknown_key() {
        let temp = TempDir::new().unwrap();
        hoard(&temp)
            .args(["config", "set", "cache.size", "x"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unknown config key"));
    }

    #[test]
    fn load_from_directory() {
        let temp = asset_root();
        let root = temp.path().join("assets");
        hoard(&temp)
            .args(["load", "hero", "--repeat", "3", "--root"])
            .arg(&root)
            .assert()
            .success()
            .stdout(predicate::str::contains("hero"));
    }

    #[test]
    fn load_json_output() {
        let temp = asset_root();
        let root = temp.path().join("assets");
        hoard(&temp)
            .args(["load", "hero", "--json", "--root"])
            .arg(&root)
            .assert()
            .success()
            .stdout(predicate::str::contains("\"loaded\": 1"));
    }

    #[test]
    fn load_missing_key() {
        let temp = asset_root();
        let root = temp.path().join("assets");
        hoard(&temp)
            .args(["load", "villain", "--root"])
            .arg(&root)
            .assert()
            .failure()
            .stderr(predicate::str::contains("Asset not found"));
    }

    #[test]
    fn load_missing_root() {
        let temp = TempDir::new().unwrap();
        hoard(&temp)
            .args(["load", "hero", "--root"])
            .arg(temp.path().join("nowhere"))
            .assert()
            .failure()
            .stderr(predicate::str::contains("Path not found"));
    }

    #[test]
    fn load_all_lists_members() {
        let temp = asset_root();
        let root = temp.path().join("assets");
        hoard(&temp)
            .args(["load-all", "sprites", "--root"])
            .arg(&root)
            .assert()
            .success()
            .stdout(predicate::str::contains("sprites/a").and(predicate::str::contains("sprites/b")));
    }

    #[test]
    fn prefetch_requires_base_url() {
        let temp = TempDir::new().unwrap();
        hoard(&temp)
            .args(["prefetch"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("No remote base URL configured"));
    }

    #[test]
    fn completions_generate() {
        let temp = TempDir::new().unwrap();
        hoard(&temp)
            .args(["completions", "bash"])
            .assert()
            .success()
            .stdout(predicate::str::contains("hoard"));
    }
}
