//! Adapters over the `duffle` command-line tool.
//!
//! duffle prints one entity per line for each of its list commands. The
//! functions here run those commands through a [`DuffleSession`] and turn the
//! output into typed references.
//!
//! | Function | Command |
//! |---|---|
//! | [`list`] | `duffle list` |
//! | [`list_repos`] | `duffle repo list` |
//! | [`list_credential_sets`] | `duffle credentials list` |
//! | [`list_installations`] | `duffle claims list` |

pub mod command_builder;
pub mod paths;
pub mod repo;
pub mod session;

pub use command_builder::{DuffleCommand, DuffleCommandOutput};
pub use repo::{read_repo_bundles, read_repo_index};
pub use session::DuffleSession;

use anyhow::{Context, Result};

use crate::models::{BundleRef, CredentialSetRef, InstallationRef};

/// Split command output into trimmed, non-empty lines.
pub fn parse_lines(stdout: &str) -> Vec<String> {
    stdout.lines().map(str::trim).filter(|line| !line.is_empty()).map(str::to_string).collect()
}

async fn invoke_lines(session: &DuffleSession, args: &[&str]) -> Result<Vec<String>> {
    let stdout = session
        .command()?
        .args(args.iter().copied())
        .execute_stdout()
        .await
        .with_context(|| format!("Failed to run duffle {}", args.join(" ")))?;
    let lines = parse_lines(&stdout);
    tracing::trace!(target: "duffle", "duffle {} listed {} item(s)", args.join(" "), lines.len());
    Ok(lines)
}

/// Bundles stored locally.
///
/// # Errors
///
/// Fails when duffle cannot be found or the command fails.
pub async fn list(session: &DuffleSession) -> Result<Vec<BundleRef>> {
    Ok(invoke_lines(session, &["list"])
        .await?
        .into_iter()
        .map(|bundle_name| BundleRef {
            bundle_name,
        })
        .collect())
}

/// Repositories duffle knows about.
///
/// # Errors
///
/// Fails when duffle cannot be found or the command fails.
pub async fn list_repos(session: &DuffleSession) -> Result<Vec<String>> {
    invoke_lines(session, &["repo", "list"]).await
}

/// Credential sets in the duffle home.
///
/// # Errors
///
/// Fails when duffle cannot be found or the command fails.
pub async fn list_credential_sets(session: &DuffleSession) -> Result<Vec<CredentialSetRef>> {
    Ok(invoke_lines(session, &["credentials", "list"])
        .await?
        .into_iter()
        .map(|credential_set_name| CredentialSetRef {
            credential_set_name,
        })
        .collect())
}

/// Installations recorded as claims.
///
/// # Errors
///
/// Fails when duffle cannot be found or the command fails.
pub async fn list_installations(session: &DuffleSession) -> Result<Vec<InstallationRef>> {
    Ok(invoke_lines(session, &["claims", "list"])
        .await?
        .into_iter()
        .map(|installation_name| InstallationRef {
            installation_name,
        })
        .collect())
}
