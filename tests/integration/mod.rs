//! End-to-end tests for the `duffle-explorer` binary.
//!
//! Each test drives the compiled binary against a scripted duffle
//! ([`FakeDuffle`]) and, where repository indexes are involved, a local
//! `wiremock` server.
//!
//! # Running
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Organization
//!
//! - **cli**: argument validation, configuration errors and `locate`
//! - **explorers**: every explorer command in each output format

use assert_cmd::Command;
use duffle_explorer::config::ExplorerConfig;
use duffle_explorer::test_utils::InstalledFakeDuffle;
use std::path::PathBuf;

mod cli;
mod explorers;

/// The binary with colors and the spinner off and no inherited log filter.
fn explorer_cmd() -> Command {
    let mut cmd = Command::cargo_bin("duffle-explorer").unwrap();
    cmd.env("NO_COLOR", "1").env_remove("RUST_LOG").env_remove("DUFFLE_EXPLORER_CONFIG").arg("--no-progress");
    cmd
}

/// Write a config for `fake`, optionally reading indexes over plain HTTP.
fn write_config(fake: &InstalledFakeDuffle, repositories: Vec<String>, http: bool) -> PathBuf {
    let mut config = ExplorerConfig {
        repositories,
        ..fake.config()
    };
    if http {
        config.index_scheme = "http".to_string();
    }
    fake.write_config(&config).unwrap()
}
