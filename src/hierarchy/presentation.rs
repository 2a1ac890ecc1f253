//! Labels and affordances for nodes that aggregate several versions.
//!
//! A collapsed node stands for every version of one bundle name. Its summary
//! names the primary version when that version is unambiguous (tagged
//! `latest`, or the only one) and otherwise just counts versions.

use crate::models::{LATEST_TAG, RepoBundle};

/// Anything carrying a version tag.
pub trait Versioned {
    /// The version tag
    fn version(&self) -> &str;
}

impl Versioned for RepoBundle {
    fn version(&self) -> &str {
        &self.version
    }
}

/// Summary text for a node labelled `label` whose primary version is
/// `primary`, out of `version_count` versions.
///
/// - `"<label>:latest"`, with `" (+ N other version(s))"` when other versions exist
/// - `"<label>:<version>"` when there is exactly one version
/// - `"<count> versions"` otherwise
pub fn tooltip(label: &str, primary: &impl Versioned, version_count: usize) -> String {
    if primary.version() == LATEST_TAG {
        let others = if version_count <= 1 {
            String::new()
        } else {
            format!(" (+ {} other version(s))", version_count - 1)
        };
        format!("{label}:{}{others}", primary.version())
    } else if version_count == 1 {
        format!("{label}:{}", primary.version())
    } else {
        format!("{version_count} versions")
    }
}

/// A node can be expanded into its versions when it has more than one.
pub const fn is_expandable(version_count: usize) -> bool {
    version_count > 1
}

/// The context value a node advertises to command bindings.
///
/// Only nodes that resolve to a single concrete bundle (primary is `latest`,
/// or there is just one version) get `desired`; ambiguous ones get `None`.
pub fn context_value(
    desired: &str,
    primary: &impl Versioned,
    version_count: usize,
) -> Option<String> {
    if primary.version() == LATEST_TAG || version_count == 1 {
        Some(desired.to_string())
    } else {
        None
    }
}
