//! Binary-level tests for the `sprout` CLI.
//!
//! Every invocation runs with its own home, config and cache directories so
//! nothing touches the real user environment. None of these tests reach the
//! network.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

struct Sandbox {
    home: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        Self {
            home: TempDir::new().unwrap(),
        }
    }

    fn path(&self) -> &Path {
        self.home.path()
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("sprout").unwrap();
        cmd.current_dir(self.path())
            .env("HOME", self.path())
            .env("XDG_CONFIG_HOME", self.path().join("config"))
            .env("SPROUT_CACHE__BASE_DIR", self.path())
            .env_remove("RUST_LOG")
            .env_remove("SPROUT_DEFAULTS__REPOSITORY");
        cmd
    }
}

#[test]
fn help_lists_subcommands() {
    Sandbox::new()
        .cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("new"))
        .stdout(predicate::str::contains("cache"))
        .stdout(predicate::str::contains("completions"));
}

#[test]
fn version_flag() {
    Sandbox::new()
        .cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn shell_completions() {
    Sandbox::new()
        .cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("sprout"));
}

#[test]
fn new_without_repository_is_a_user_error() {
    Sandbox::new()
        .cmd()
        .args(["new", "out", "--no-tty"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("No template repository"))
        .stderr(predicate::str::contains("--repo"));
}

#[test]
fn new_refuses_existing_output_before_cloning() {
    let sandbox = Sandbox::new();
    fs::create_dir(sandbox.path().join("taken")).unwrap();

    sandbox
        .cmd()
        .args(["new", "taken", "--repo", "acme/never-cloned", "--no-tty"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("already exists"))
        .stderr(predicate::str::contains("--force"));

    assert!(!sandbox.path().join(".sprout/cache/repos").exists());
}

#[test]
fn new_rejects_bad_ttl() {
    Sandbox::new()
        .cmd()
        .args(["new", "--repo", "acme/t", "--ttl", "3y"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid duration unit"));
}

#[test]
fn new_rejects_stray_trailing_answer() {
    Sandbox::new()
        .cmd()
        .args(["new", "out", "--repo", "acme/t", "--no-tty", "--", "Alice"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--KEY value"));
}

#[test]
fn cache_path_is_under_base_dir() {
    let sandbox = Sandbox::new();
    let expected = sandbox.path().join(".sprout").join("cache").join("repos");

    sandbox
        .cmd()
        .args(["cache", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains(expected.display().to_string()));
}

#[test]
fn cache_list_when_empty() {
    Sandbox::new()
        .cmd()
        .args(["cache", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No cached repositories"));
}

#[test]
fn cache_list_json_when_empty() {
    Sandbox::new()
        .cmd()
        .args(["--format", "json", "cache", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[]"));
}

#[test]
fn cache_status_reports_missing() {
    Sandbox::new()
        .cmd()
        .args(["cache", "status", "--repo", "acme/templates"])
        .assert()
        .success()
        .stdout(predicate::str::contains("missing"));
}

#[test]
fn cache_clear_all_when_empty() {
    Sandbox::new()
        .cmd()
        .args(["cache", "clear"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed 0"));
}

#[test]
fn config_get_default_and_env_override() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .args(["config", "get", "cache.ttl"])
        .assert()
        .success()
        .stdout(predicate::str::contains("7d"));

    sandbox
        .cmd()
        .env("SPROUT_CACHE__TTL", "1d")
        .args(["config", "get", "cache.ttl"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1d"));
}

#[test]
fn config_get_unknown_key_is_config_error() {
    Sandbox::new()
        .cmd()
        .args(["config", "get", "nope.nothing"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Unknown config key"));
}

#[test]
fn missing_explicit_config_file_is_config_error() {
    Sandbox::new()
        .cmd()
        .args(["--config", "absent.toml", "cache", "path"])
        .assert()
        .code(4);
}

#[test]
fn init_writes_config_once() {
    let sandbox = Sandbox::new();
    let config = sandbox.path().join("sprout.toml");
    let config_arg = config.display().to_string();

    sandbox
        .cmd()
        .args(["--config", &config_arg, "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration created"));

    let written = fs::read_to_string(&config).unwrap();
    assert!(written.contains("[cache]"));
    assert!(written.contains("ttl = \"7d\""));

    sandbox
        .cmd()
        .args(["--config", &config_arg, "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));

    sandbox
        .cmd()
        .args(["--config", &config_arg, "config", "get", "cache.tool_name"])
        .assert()
        .success()
        .stdout(predicate::str::contains("sprout"));
}
