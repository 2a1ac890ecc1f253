//! The handle every duffle interaction goes through.
//!
//! A [`DuffleSession`] owns the active [`ExplorerConfig`] together with the
//! resources derived from it: the resolved duffle binary and the HTTP client
//! used for repository indexes. Both are created on first use and dropped
//! when a reconfiguration changes how they would be built.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::OnceLock;

use super::command_builder::DuffleCommand;
use crate::config::ExplorerConfig;
use crate::core::DuffleError;

/// Explicit, reconfigurable access to duffle and repository indexes.
#[derive(Debug, Default)]
pub struct DuffleSession {
    config: ExplorerConfig,
    binary: OnceLock<PathBuf>,
    http: OnceLock<reqwest::Client>,
}

impl DuffleSession {
    /// Create a session; nothing is resolved until first use.
    pub fn new(config: ExplorerConfig) -> Self {
        Self {
            config,
            binary: OnceLock::new(),
            http: OnceLock::new(),
        }
    }

    /// The active configuration.
    pub const fn config(&self) -> &ExplorerConfig {
        &self.config
    }

    /// Swap in a new configuration.
    ///
    /// Returns `true` when the cached binary and HTTP client were dropped
    /// because the change affects how duffle is invoked.
    pub fn apply_config(&mut self, config: ExplorerConfig) -> bool {
        let invalidate = self.config.affects_tool_configuration(&config);
        if invalidate {
            tracing::debug!(target: "duffle", "Tool configuration changed, resetting session");
            self.binary = OnceLock::new();
            self.http = OnceLock::new();
        }
        self.config = config;
        invalidate
    }

    /// Path of the duffle binary, resolved once per configuration.
    ///
    /// # Errors
    ///
    /// Returns [`DuffleError::DuffleNotFound`] when the configured path does
    /// not exist or, with no configured path, `duffle` is not on `PATH`.
    pub fn binary(&self) -> Result<PathBuf> {
        if let Some(path) = self.binary.get() {
            return Ok(path.clone());
        }

        let resolved = self.resolve_binary()?;
        tracing::debug!(target: "duffle", "Using duffle at {}", resolved.display());
        Ok(self.binary.get_or_init(|| resolved).clone())
    }

    fn resolve_binary(&self) -> Result<PathBuf> {
        match self.config.expanded_duffle_path() {
            Some(path) if path.is_file() => Ok(path),
            Some(path) => {
                tracing::debug!(target: "duffle", "Configured duffle-path {} does not exist", path.display());
                Err(DuffleError::DuffleNotFound.into())
            }
            None => which::which("duffle").map_err(|_| DuffleError::DuffleNotFound.into()),
        }
    }

    /// A command for the resolved binary with the configured timeout.
    ///
    /// # Errors
    ///
    /// See [`binary`](Self::binary).
    pub fn command(&self) -> Result<DuffleCommand> {
        Ok(DuffleCommand::new(self.binary()?).with_timeout(Some(self.config.command_timeout())))
    }

    /// Shared HTTP client for index fetches.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialised.
    pub fn http_client(&self) -> Result<reqwest::Client> {
        if let Some(client) = self.http.get() {
            return Ok(client.clone());
        }

        let client = reqwest::Client::builder()
            .user_agent(concat!("duffle-explorer/", env!("CARGO_PKG_VERSION")))
            .timeout(self.config.command_timeout())
            .build()
            .context("Failed to create HTTP client")?;
        Ok(self.http.get_or_init(|| client).clone())
    }
}
