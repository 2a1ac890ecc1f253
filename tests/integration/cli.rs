use predicates::prelude::*;
use tempfile::TempDir;

use super::explorer_cmd;

#[test]
fn test_help_lists_commands() {
    explorer_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("repo-bundles"))
        .stdout(predicate::str::contains("credentials"))
        .stdout(predicate::str::contains("locate"));
}

#[test]
fn test_invalid_format_is_rejected() {
    explorer_cmd()
        .args(["bundles", "--format", "yaml"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Invalid format 'yaml'. Valid formats are: tree, json, text"));
}

#[test]
fn test_zero_depth_is_rejected() {
    explorer_cmd()
        .args(["repos", "--depth", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Depth must be at least 1"));
}

#[test]
fn test_verbose_and_quiet_conflict() {
    explorer_cmd().args(["-v", "-q", "bundles"]).assert().failure();
}

#[test]
fn test_malformed_config_file() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("config.toml");
    std::fs::write(&config, "timeout-secs = \"soon\"\n").unwrap();

    explorer_cmd()
        .arg("--config")
        .arg(&config)
        .arg("bundles")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"))
        .stderr(predicate::str::contains("suggestion"));
}

#[test]
fn test_config_rejects_unknown_scheme() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("config.toml");
    std::fs::write(&config, "index-scheme = \"ftp\"\n").unwrap();

    explorer_cmd()
        .env("DUFFLE_EXPLORER_CONFIG", &config)
        .arg("repos")
        .assert()
        .failure()
        .stderr(predicate::str::contains("ftp"));
}

#[test]
fn test_locate_uses_duffle_home() {
    let home = TempDir::new().unwrap();
    let expected = home
        .path()
        .join("repositories")
        .join("hub.example.com")
        .join("team")
        .join("bundles")
        .join("web.json");

    explorer_cmd()
        .env("DUFFLE_HOME", home.path())
        .args(["locate", "hub.example.com/team/web"])
        .assert()
        .success()
        .stdout(format!("{}\n", expected.display()));
}

#[test]
fn test_locate_requires_a_reference() {
    explorer_cmd().arg("locate").assert().failure();
}
