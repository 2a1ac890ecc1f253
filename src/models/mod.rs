//! Object model shared by the duffle adapters, the stratifier and the explorers.
//!
//! Records here are plain data: they are produced by parsing duffle output or
//! a repository index and are never mutated afterwards.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The distinguished version tag preferred as a bundle's primary version.
pub const LATEST_TAG: &str = "latest";

/// One version of a bundle published in a repository.
///
/// `name` is fully qualified and may contain `/`-separated namespace
/// segments, e.g. `"ns1/ns2/bundle"`. `repository` is provenance only and
/// is carried through stratification untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoBundle {
    /// Fully qualified bundle name
    pub name: String,
    /// Version tag (`"latest"` is special-cased by the explorers)
    pub version: String,
    /// Repository the record came from, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
}

impl RepoBundle {
    /// Create a record without repository provenance.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            repository: None,
        }
    }

    /// Attach the repository this record was read from.
    #[must_use]
    pub fn with_repository(mut self, repository: impl Into<String>) -> Self {
        self.repository = Some(repository.into());
        self
    }

    /// Whether this record carries the `latest` tag.
    pub fn is_latest(&self) -> bool {
        self.version == LATEST_TAG
    }

    /// The reference duffle accepts for this bundle: `<repository>/<name>`,
    /// or just the name when the repository is unknown.
    pub fn bundle_ref(&self) -> String {
        match &self.repository {
            Some(repository) => format!("{repository}/{}", self.name),
            None => self.name.clone(),
        }
    }

    /// `bundle_ref` with the version appended: `<ref>:<version>`.
    pub fn versioned_ref(&self) -> String {
        format!("{}:{}", self.bundle_ref(), self.version)
    }
}

/// A bundle stored locally, as listed by `duffle list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BundleRef {
    /// Name printed by duffle
    pub bundle_name: String,
}

/// A credential set, as listed by `duffle credentials list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CredentialSetRef {
    /// Name printed by duffle
    pub credential_set_name: String,
}

/// An installation claim, as listed by `duffle claims list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallationRef {
    /// Name printed by duffle
    pub installation_name: String,
}

/// The `index.json` document served by a bundle repository.
///
/// The document maps each bundle name to its version tags, and each tag to
/// the content digest it points at:
///
/// ```json
/// {
///   "hello": { "0.1.0": "sha256:aa..", "latest": "sha256:aa.." },
///   "ns/web": { "1.2.0": "sha256:bb.." }
/// }
/// ```
///
/// Names and tags are kept sorted so that flattening is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RepoIndex {
    entries: BTreeMap<String, BTreeMap<String, String>>,
}

impl RepoIndex {
    /// Number of distinct bundle names in the index.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index lists no bundles.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Digest recorded for `name` at `version`.
    pub fn digest(&self, name: &str, version: &str) -> Option<&str> {
        self.entries.get(name)?.get(version).map(String::as_str)
    }

    /// Flatten into one record per (name, version), tagged with `repository`.
    pub fn bundles(&self, repository: &str) -> Vec<RepoBundle> {
        self.entries
            .iter()
            .flat_map(|(name, versions)| {
                versions.keys().map(move |version| {
                    RepoBundle::new(name.clone(), version.clone()).with_repository(repository)
                })
            })
            .collect()
    }
}

impl FromIterator<(String, String, String)> for RepoIndex {
    /// Build an index from `(name, version, digest)` triples.
    fn from_iter<T: IntoIterator<Item = (String, String, String)>>(iter: T) -> Self {
        let mut entries: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();
        for (name, version, digest) in iter {
            entries.entry(name).or_default().insert(version, digest);
        }
        Self {
            entries,
        }
    }
}
