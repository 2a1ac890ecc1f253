//! User configuration for duffle-explorer.
//!
//! The configuration file is optional. When present it is TOML with
//! kebab-case keys:
//!
//! ```toml
//! # Use a specific duffle build instead of the one on PATH
//! duffle-path = "~/bin/duffle"
//!
//! # Repositories shown in addition to those `duffle repo list` reports
//! repositories = ["hub.example.com", "registry.internal/team"]
//!
//! # Seconds to wait for any single duffle invocation
//! timeout-secs = 60
//!
//! # Scheme used to fetch <repository>/index.json
//! index-scheme = "https"
//! ```
//!
//! # Location
//!
//! 1. `--config <PATH>` (or `DUFFLE_EXPLORER_CONFIG`, read by the CLI parser)
//! 2. `~/.duffle-explorer/config.toml`
//!
//! A missing file yields [`ExplorerConfig::default`].

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;

use crate::core::DuffleError;

const fn default_timeout_secs() -> u64 {
    60
}

fn default_index_scheme() -> String {
    "https".to_string()
}

/// Settings that change how duffle is invoked and where indexes come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ExplorerConfig {
    /// Explicit duffle binary; `~` and `$VAR` are expanded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duffle_path: Option<String>,

    /// Extra repositories to list alongside `duffle repo list`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub repositories: Vec<String>,

    /// Per-invocation timeout for duffle commands
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// `https` in production; tests point this at a plain-HTTP mock server
    #[serde(default = "default_index_scheme")]
    pub index_scheme: String,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            duffle_path: None,
            repositories: Vec::new(),
            timeout_secs: default_timeout_secs(),
            index_scheme: default_index_scheme(),
        }
    }
}

impl ExplorerConfig {
    /// Load from `path` if given, otherwise from [`default_path`](Self::default_path).
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::default_path()?,
        };

        if fs::try_exists(&path).await.unwrap_or(false) {
            Self::load_from(&path).await
        } else {
            tracing::debug!("No configuration at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Load and validate a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid TOML, or
    /// fails [`validate`](Self::validate).
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .map_err(DuffleError::from)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;

        config.validate()?;
        tracing::debug!(
            "Loaded configuration from {} ({} configured repositories)",
            path.display(),
            config.repositories.len()
        );
        Ok(config)
    }

    /// `~/.duffle-explorer/config.toml`
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Unable to determine home directory"))?;
        Ok(home.join(".duffle-explorer").join("config.toml"))
    }

    /// Reject values that would make every duffle call fail.
    ///
    /// # Errors
    ///
    /// Returns [`DuffleError::ConfigError`] for a zero timeout or an
    /// unsupported index scheme.
    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            return Err(DuffleError::ConfigError {
                message: "timeout-secs must be greater than 0".to_string(),
            }
            .into());
        }
        if !matches!(self.index_scheme.as_str(), "https" | "http") {
            return Err(DuffleError::ConfigError {
                message: format!(
                    "index-scheme must be 'https' or 'http', got '{}'",
                    self.index_scheme
                ),
            }
            .into());
        }
        Ok(())
    }

    /// Timeout applied to each duffle invocation.
    pub const fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// The configured duffle binary with `~` and environment variables expanded.
    pub fn expanded_duffle_path(&self) -> Option<PathBuf> {
        self.duffle_path.as_deref().map(|raw| {
            let expanded = shellexpand::full(raw).map_or_else(|_| raw.to_string(), |s| s.into_owned());
            PathBuf::from(expanded)
        })
    }

    /// Whether switching from `self` to `other` requires re-resolving the
    /// duffle binary or rebuilding the HTTP client.
    ///
    /// Repository list changes do not: the next listing simply reads them.
    pub fn affects_tool_configuration(&self, other: &Self) -> bool {
        self.duffle_path != other.duffle_path
            || self.timeout_secs != other.timeout_secs
            || self.index_scheme != other.index_scheme
    }
}
