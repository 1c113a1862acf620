//! CLI smoke tests.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn tether(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("tether").unwrap();
    cmd.current_dir(home.path())
        .env("XDG_CONFIG_HOME", home.path().join("config"))
        .env_remove("TETHER_CONFIG")
        .env_remove("TETHER_BIND")
        .env_remove("TETHER_TTL_MINUTES")
        .env_remove("TETHER_MAX_AGENTS")
        .env_remove("TETHER_WINDOW_SIZE")
        .env_remove("TETHER_SESSION_DIR");
    cmd
}

#[test]
fn test_help() {
    let home = TempDir::new().unwrap();
    tether(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_config_prints_defaults() {
    let home = TempDir::new().unwrap();
    tether(&home)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("max_agents = 100"))
        .stdout(predicate::str::contains("ttl_minutes = 10"))
        .stdout(predicate::str::contains("bind = \"127.0.0.1:8000\""));
}

#[test]
fn test_config_reads_project_file_and_env() {
    let home = TempDir::new().unwrap();
    std::fs::write(
        home.path().join("tether.toml"),
        "[pool]\nmax_agents = 7\n\n[agent]\nwindow_size = 4\n",
    )
    .unwrap();

    tether(&home)
        .env("TETHER_WINDOW_SIZE", "6")
        .args(["config", "--source"])
        .assert()
        .success()
        .stdout(predicate::str::contains("# Loaded from: tether.toml"))
        .stdout(predicate::str::contains("max_agents = 7"))
        .stdout(predicate::str::contains("window_size = 6"));
}

#[test]
fn test_missing_explicit_config_fails() {
    let home = TempDir::new().unwrap();
    tether(&home)
        .args(["--config", "does-not-exist.toml", "config"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does-not-exist.toml"));
}

#[test]
fn test_serve_rejects_bad_bind() {
    let home = TempDir::new().unwrap();
    tether(&home)
        .args(["serve", "--bind", "not-an-address"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid bind address"));
}
