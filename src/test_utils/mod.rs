//! Helpers shared by unit and integration tests.
//!
//! Available to this crate's unit tests and, through the `test-utils`
//! feature, to the integration suite.

mod fake_duffle;

pub use fake_duffle::{FakeDuffle, InstalledFakeDuffle};

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::models::RepoBundle;

static INIT_LOGGING: Once = Once::new();

/// Install a test-friendly tracing subscriber once per process.
///
/// With `None` logging stays off unless `RUST_LOG` is set:
///
/// ```bash
/// RUST_LOG=duffle=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}

/// Records for `name` at each of `versions`, tagged with `repository`.
pub fn repo_bundles(repository: &str, name: &str, versions: &[&str]) -> Vec<RepoBundle> {
    versions.iter().map(|version| RepoBundle::new(name, *version).with_repository(repository)).collect()
}

/// An `index.json` body listing every `(name, version)` pair with a dummy digest.
pub fn index_json(entries: &[(&str, &str)]) -> String {
    let index: crate::models::RepoIndex = entries
        .iter()
        .map(|(name, version)| {
            (name.to_string(), version.to_string(), format!("sha256:{name}-{version}"))
        })
        .collect();
    serde_json::to_string(&index).unwrap_or_else(|_| "{}".to_string())
}
