//! Locations inside the duffle home directory.
//!
//! ```text
//! $DUFFLE_HOME (default ~/.duffle)
//! ├── credentials/<name>.yaml
//! └── repositories/<host>/<path>/bundles/<name>.json
//! ```

use anyhow::Result;
use std::path::{Path, PathBuf};

/// Environment variable overriding the duffle home directory.
pub const DUFFLE_HOME_ENV: &str = "DUFFLE_HOME";

/// The duffle home directory: `$DUFFLE_HOME`, else `~/.duffle`.
///
/// # Errors
///
/// Returns an error when `DUFFLE_HOME` is unset and the home directory
/// cannot be determined.
pub fn home() -> Result<PathBuf> {
    home_from(std::env::var_os(DUFFLE_HOME_ENV).map(PathBuf::from))
}

fn home_from(override_dir: Option<PathBuf>) -> Result<PathBuf> {
    match override_dir {
        Some(dir) if !dir.as_os_str().is_empty() => Ok(dir),
        _ => Ok(dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Unable to determine home directory"))?
            .join(".duffle")),
    }
}

/// `<home>/credentials/<name>.yaml`
pub fn credential_set_path_in(home: &Path, name: &str) -> PathBuf {
    home.join("credentials").join(format!("{name}.yaml"))
}

/// File duffle keeps for a credential set.
///
/// # Errors
///
/// See [`home`].
pub fn credential_set_path(name: &str) -> Result<PathBuf> {
    Ok(credential_set_path_in(&home()?, name))
}

/// `<home>/repositories/<prefix>/bundles/<last segment>.json`
///
/// `bundle_ref` is `<repository>/<name>`; the final `/`-segment is the bundle
/// and everything before it the directory it is stored under. A ref without
/// any `/` is stored directly under `repositories/bundles/`.
pub fn repo_bundle_path_in(home: &Path, bundle_ref: &str) -> PathBuf {
    let (prefix, last) = bundle_ref.rsplit_once('/').unwrap_or(("", bundle_ref));

    let mut path = home.join("repositories");
    path.extend(prefix.split('/').filter(|segment| !segment.is_empty()));
    path.push("bundles");
    path.push(format!("{last}.json"));
    path
}

/// Local copy of a repository bundle.
///
/// # Errors
///
/// See [`home`].
pub fn repo_bundle_path(bundle_ref: &str) -> Result<PathBuf> {
    Ok(repo_bundle_path_in(&home()?, bundle_ref))
}
