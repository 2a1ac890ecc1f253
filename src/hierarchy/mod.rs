//! Namespace stratification of flat bundle listings.
//!
//! Repository indexes list bundles by fully qualified name, e.g.
//! `"ns1/ns2/app"`, one record per version. Explorers present them as a tree
//! where each `/`-separated segment becomes a collapsible namespace and each
//! fully resolved name becomes a single leaf aggregating all its versions:
//!
//! ```text
//! ns1
//! └── ns2
//!     └── app        (app:latest (+ 2 other version(s)))
//! hello              (hello:0.1.0)
//! ```
//!
//! [`stratify`] builds only the top level. A [`NamespaceNode`] keeps its
//! members unstripped and re-stratifies them (prefix and separator removed)
//! each time [`NamespaceNode::children`] is called, so deep trees are only
//! partitioned as far as a user actually expands them.
//!
//! Stratification is total: any list of records, including an empty one or
//! names with empty segments, produces a well-defined tree. Names are not
//! validated; splitting always happens at the first `/`.

pub mod presentation;


use crate::models::RepoBundle;
use crate::utils::iterable::{Group, iter};

/// Separator between namespace segments in a bundle name.
pub const NAMESPACE_SEPARATOR: char = '/';

/// A record together with the part of its name still to be stratified.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Member {
    local_name: String,
    bundle: RepoBundle,
}

/// Every version of one (local) name.
type NameGroup = Group<String, Member>;

/// A node of the stratified tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StratifiedNode {
    /// A shared namespace segment with deferred children
    Namespace(NamespaceNode),
    /// All versions of one fully resolved name
    Bundle(BundleNode),
}

impl StratifiedNode {
    /// Display label: the namespace segment or the local bundle name.
    pub fn label(&self) -> &str {
        match self {
            Self::Namespace(node) => node.key(),
            Self::Bundle(node) => node.name(),
        }
    }

    /// Summary text. Namespaces have none.
    pub fn tooltip(&self) -> Option<String> {
        match self {
            Self::Namespace(_) => None,
            Self::Bundle(node) => Some(node.tooltip()),
        }
    }

    /// Whether the node has anything to expand into.
    pub fn is_expandable(&self) -> bool {
        match self {
            Self::Namespace(_) => true,
            Self::Bundle(node) => node.is_expandable(),
        }
    }

    /// Child nodes. Bundle nodes have no stratified children; their versions
    /// are available through [`BundleNode::bundles`].
    pub fn children(&self) -> Vec<StratifiedNode> {
        match self {
            Self::Namespace(node) => node.children(),
            Self::Bundle(_) => Vec::new(),
        }
    }

    /// Every record beneath this node, in source order within each name.
    pub fn records(&self) -> Vec<&RepoBundle> {
        match self {
            Self::Namespace(node) => node.records().collect(),
            Self::Bundle(node) => node.bundles().iter().collect(),
        }
    }
}

/// A namespace segment shared by one or more names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceNode {
    key: String,
    members: Vec<NameGroup>,
}

impl NamespaceNode {
    /// The namespace segment, without separator.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Number of distinct names under this namespace, at any depth.
    pub fn name_count(&self) -> usize {
        self.members.len()
    }

    fn records(&self) -> impl Iterator<Item = &RepoBundle> {
        self.members.iter().flat_map(|group| group.values.iter().map(|member| &member.bundle))
    }

    /// Strip this namespace from every member and stratify what remains.
    pub fn children(&self) -> Vec<StratifiedNode> {
        let stripped = iter(&self.members)
            .collect(|group| &group.values)
            .map(|member| Member {
                local_name: strip_namespace(&member.local_name).to_string(),
                bundle: member.bundle.clone(),
            })
            .to_vec();

        tracing::trace!(
            namespace = %self.key,
            records = stripped.len(),
            "Expanding namespace"
        );

        stratify_members(stripped)
    }
}

/// All versions of one fully resolved bundle name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleNode {
    name: String,
    bundles: Vec<RepoBundle>,
    primary: usize,
}

impl BundleNode {
    fn from_name_group(group: NameGroup) -> Self {
        let bundles: Vec<RepoBundle> = group.values.into_iter().map(|member| member.bundle).collect();
        // No "latest" tag: the first version listed wins, whatever it is.
        let primary = bundles.iter().position(RepoBundle::is_latest).unwrap_or(0);
        Self {
            name: group.key,
            bundles,
            primary,
        }
    }

    /// Local name, i.e. the last segment(s) left after namespace stripping.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Every version, in source order. Never empty.
    pub fn bundles(&self) -> &[RepoBundle] {
        &self.bundles
    }

    /// The version representing this node when collapsed.
    pub fn primary(&self) -> &RepoBundle {
        &self.bundles[self.primary]
    }

    /// Number of versions aggregated by this node.
    pub fn version_count(&self) -> usize {
        self.bundles.len()
    }

    /// See [`presentation::tooltip`].
    pub fn tooltip(&self) -> String {
        presentation::tooltip(&self.name, self.primary(), self.bundles.len())
    }

    /// True when there is more than one version to show.
    pub fn is_expandable(&self) -> bool {
        presentation::is_expandable(self.bundles.len())
    }

    /// See [`presentation::context_value`].
    pub fn context_value(&self, desired: &str) -> Option<String> {
        presentation::context_value(desired, self.primary(), self.bundles.len())
    }
}

/// Build the top level of the namespace tree for `records`.
///
/// Namespace nodes come first, then bundle nodes; within each kind the
/// order is that in which names first appear in `records`.
pub fn stratify<I>(records: I) -> Vec<StratifiedNode>
where
    I: IntoIterator<Item = RepoBundle>,
{
    let members = records
        .into_iter()
        .map(|bundle| Member {
            local_name: bundle.name.clone(),
            bundle,
        })
        .collect();
    stratify_members(members)
}

fn stratify_members(members: Vec<Member>) -> Vec<StratifiedNode> {
    let by_prefix = iter(members)
        .group_by(|member| member.local_name.clone())
        .group_by(|name_group| namespace_prefix(&name_group.key).map(str::to_string));

    let namespaces = by_prefix
        .clone()
        .collect(|group| {
            group.key.map(|key| NamespaceNode {
                key,
                members: group.values,
            })
        })
        .map(StratifiedNode::Namespace);

    let bundles = by_prefix
        .filter(|group| group.key.is_none())
        .collect(|group| group.values)
        .map(|name_group| StratifiedNode::Bundle(BundleNode::from_name_group(name_group)));

    let mut nodes = namespaces.to_vec();
    nodes.extend(bundles);
    nodes
}

/// The first namespace segment of `name`, or `None` for an unqualified name.
pub fn namespace_prefix(name: &str) -> Option<&str> {
    name.split_once(NAMESPACE_SEPARATOR).map(|(prefix, _)| prefix)
}

/// `name` with its first namespace segment and separator removed.
pub fn strip_namespace(name: &str) -> &str {
    name.split_once(NAMESPACE_SEPARATOR).map_or(name, |(_, rest)| rest)
}
