//! Explorer trees over duffle state.
//!
//! Each [`ExplorerKind`] has a set of root nodes; every [`ExplorerNode`]
//! describes itself as a [`TreeItem`] and expands into children on demand.
//! Nothing is cached between expansions, so re-reading roots always reflects
//! the current duffle state.
//!
//! Failures never abort a tree. A root listing or repository fetch that
//! fails produces an [`ExplorerNode::Error`] in place of the nodes it would
//! have contributed.

mod repo_path;


pub use repo_path::RepoPathNode;

use anyhow::Result;
use futures::future::join_all;
use std::path::PathBuf;

use crate::duffle::{self, DuffleSession, paths};
use crate::hierarchy::{BundleNode, NamespaceNode, StratifiedNode, stratify};
use crate::models::{BundleRef, CredentialSetRef, InstallationRef, RepoBundle};

/// Context value of a locally stored bundle.
pub const CONTEXT_BUNDLE: &str = "duffle.bundle";
/// Context value of a repository bundle resolving to one concrete version.
pub const CONTEXT_REPO_BUNDLE: &str = "duffle.repoBundle";
/// Context value of a credential set.
pub const CONTEXT_CREDENTIAL_SET: &str = "duffle.credentialset";
/// Context value of an installation.
pub const CONTEXT_INSTALLATION: &str = "duffle.installation";

/// Label shown for error nodes.
pub const ERROR_LABEL: &str = "Error";

/// The trees that can be explored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExplorerKind {
    /// Bundles stored locally (`duffle list`)
    Bundles,
    /// Known repositories as a path tree
    Repositories,
    /// Every bundle of every repository, stratified into namespaces
    RepositoryBundles,
    /// Credential sets (`duffle credentials list`)
    Credentials,
    /// Installations (`duffle claims list`)
    Installations,
}

/// Whether a tree item can be expanded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollapsibleState {
    /// A leaf
    None,
    /// Has children, shown collapsed
    Collapsed,
}

impl CollapsibleState {
    const fn from_expandable(expandable: bool) -> Self {
        if expandable {
            Self::Collapsed
        } else {
            Self::None
        }
    }
}

/// How a node is presented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeItem {
    /// Display label
    pub label: String,
    /// Hover or secondary text
    pub tooltip: Option<String>,
    /// Expandability
    pub collapsible: CollapsibleState,
    /// Identifier used to bind commands to nodes
    pub context_value: Option<String>,
}

impl TreeItem {
    fn new(label: impl Into<String>, collapsible: CollapsibleState) -> Self {
        Self {
            label: label.into(),
            tooltip: None,
            collapsible,
            context_value: None,
        }
    }

    fn tooltip(mut self, tooltip: Option<String>) -> Self {
        self.tooltip = tooltip;
        self
    }

    fn context(mut self, context_value: Option<&str>) -> Self {
        self.context_value = context_value.map(str::to_string);
        self
    }
}

/// A credential set together with the file duffle keeps it in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialSetNode {
    /// The credential set
    pub credential_set: CredentialSetRef,
    /// `<duffle home>/credentials/<name>.yaml`, when the home is known
    pub file: Option<PathBuf>,
}

/// Any node of any explorer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExplorerNode {
    /// A locally stored bundle
    LocalBundle(BundleRef),
    /// A repository path prefix
    RepoPath(RepoPathNode),
    /// A bundle namespace segment
    Namespace(NamespaceNode),
    /// Every version of one repository bundle
    Bundle(BundleNode),
    /// One version of a repository bundle
    BundleVersion(RepoBundle),
    /// A credential set
    CredentialSet(CredentialSetNode),
    /// An installation claim
    Installation(InstallationRef),
    /// A failure, shown in place of the nodes that could not be listed
    Error(String),
}

impl From<StratifiedNode> for ExplorerNode {
    fn from(node: StratifiedNode) -> Self {
        match node {
            StratifiedNode::Namespace(namespace) => Self::Namespace(namespace),
            StratifiedNode::Bundle(bundle) => Self::Bundle(bundle),
        }
    }
}

impl ExplorerNode {
    /// An error node describing `error` and its causes.
    pub fn error(error: &anyhow::Error) -> Self {
        Self::Error(format!("{error:#}"))
    }

    /// Presentation of this node.
    pub fn tree_item(&self) -> TreeItem {
        match self {
            Self::LocalBundle(bundle) => TreeItem::new(&bundle.bundle_name, CollapsibleState::None)
                .context(Some(CONTEXT_BUNDLE)),
            Self::RepoPath(node) => TreeItem::new(
                node.label(),
                CollapsibleState::from_expandable(node.has_sub_paths() || node.is_repository()),
            ),
            Self::Namespace(node) => TreeItem::new(node.key(), CollapsibleState::Collapsed),
            Self::Bundle(node) => {
                TreeItem::new(node.name(), CollapsibleState::from_expandable(node.is_expandable()))
                    .tooltip(Some(node.tooltip()))
                    .context(node.context_value(CONTEXT_REPO_BUNDLE).as_deref())
            }
            Self::BundleVersion(bundle) => TreeItem::new(&bundle.version, CollapsibleState::None)
                .tooltip(Some(bundle.versioned_ref()))
                .context(Some(CONTEXT_REPO_BUNDLE)),
            Self::CredentialSet(node) => {
                TreeItem::new(&node.credential_set.credential_set_name, CollapsibleState::None)
                    .tooltip(node.file.as_ref().map(|file| file.display().to_string()))
                    .context(Some(CONTEXT_CREDENTIAL_SET))
            }
            Self::Installation(installation) => {
                TreeItem::new(&installation.installation_name, CollapsibleState::None)
                    .context(Some(CONTEXT_INSTALLATION))
            }
            Self::Error(message) => {
                TreeItem::new(ERROR_LABEL, CollapsibleState::None).tooltip(Some(message.clone()))
            }
        }
    }

    /// Expand this node.
    ///
    /// Only repository paths that are repositories touch the network; other
    /// nodes expand from data they already hold.
    pub async fn children(&self, session: &DuffleSession) -> Vec<Self> {
        match self {
            Self::RepoPath(node) => repo_path_children(node, session).await,
            Self::Namespace(node) => node.children().into_iter().map(Self::from).collect(),
            Self::Bundle(node) if node.is_expandable() => {
                node.bundles().iter().cloned().map(Self::BundleVersion).collect()
            }
            Self::Bundle(_)
            | Self::LocalBundle(_)
            | Self::BundleVersion(_)
            | Self::CredentialSet(_)
            | Self::Installation(_)
            | Self::Error(_) => Vec::new(),
        }
    }
}

async fn repo_path_children(node: &RepoPathNode, session: &DuffleSession) -> Vec<ExplorerNode> {
    let mut children: Vec<ExplorerNode> =
        node.sub_paths().into_iter().map(ExplorerNode::RepoPath).collect();

    if node.is_repository() {
        let repository = node.path();
        match duffle::read_repo_bundles(session, &repository).await {
            Ok(records) => children.extend(stratify(records).into_iter().map(ExplorerNode::from)),
            Err(e) => {
                tracing::warn!("Failed to read bundles of repository {}: {:#}", repository, e);
                children.push(ExplorerNode::error(&e));
            }
        }
    }

    children
}

/// Root nodes of `kind`.
pub async fn roots(kind: ExplorerKind, session: &DuffleSession) -> Vec<ExplorerNode> {
    let result = match kind {
        ExplorerKind::Bundles => bundle_roots(session).await,
        ExplorerKind::Repositories => repository_roots(session).await,
        ExplorerKind::RepositoryBundles => match all_repositories(session).await {
            Ok(repositories) => Ok(repository_bundle_roots(session, &repositories).await),
            Err(e) => Err(e),
        },
        ExplorerKind::Credentials => credential_roots(session).await,
        ExplorerKind::Installations => installation_roots(session).await,
    };

    result.unwrap_or_else(|e| {
        tracing::debug!("Listing {:?} failed: {:#}", kind, e);
        vec![ExplorerNode::error(&e)]
    })
}

async fn bundle_roots(session: &DuffleSession) -> Result<Vec<ExplorerNode>> {
    Ok(duffle::list(session).await?.into_iter().map(ExplorerNode::LocalBundle).collect())
}

async fn repository_roots(session: &DuffleSession) -> Result<Vec<ExplorerNode>> {
    let repositories = all_repositories(session).await?;
    Ok(RepoPathNode::roots(&repositories).into_iter().map(ExplorerNode::RepoPath).collect())
}

async fn credential_roots(session: &DuffleSession) -> Result<Vec<ExplorerNode>> {
    let credential_sets = duffle::list_credential_sets(session).await?;
    let home = paths::home().ok();
    Ok(credential_sets
        .into_iter()
        .map(|credential_set| {
            let file = home
                .as_deref()
                .map(|home| paths::credential_set_path_in(home, &credential_set.credential_set_name));
            ExplorerNode::CredentialSet(CredentialSetNode {
                credential_set,
                file,
            })
        })
        .collect())
}

async fn installation_roots(session: &DuffleSession) -> Result<Vec<ExplorerNode>> {
    Ok(duffle::list_installations(session).await?.into_iter().map(ExplorerNode::Installation).collect())
}

/// Repositories from `duffle repo list` followed by configured ones not
/// already listed.
///
/// # Errors
///
/// Fails when `duffle repo list` fails.
pub async fn all_repositories(session: &DuffleSession) -> Result<Vec<String>> {
    let mut repositories = duffle::list_repos(session).await?;
    for configured in &session.config().repositories {
        if !repositories.contains(configured) {
            repositories.push(configured.clone());
        }
    }
    Ok(repositories)
}

/// Fetch every repository's index concurrently and stratify the combined
/// records.
///
/// Records are concatenated in repository order. A repository that cannot be
/// read contributes an error node, listed after the bundle tree.
pub async fn repository_bundle_roots(
    session: &DuffleSession,
    repositories: &[String],
) -> Vec<ExplorerNode> {
    let fetches = repositories.iter().map(|repository| duffle::read_repo_bundles(session, repository));
    let results = join_all(fetches).await;

    let mut records = Vec::new();
    let mut errors = Vec::new();
    for (repository, result) in repositories.iter().zip(results) {
        match result {
            Ok(bundles) => records.extend(bundles),
            Err(e) => {
                tracing::warn!("Skipping repository {}: {:#}", repository, e);
                errors.push(ExplorerNode::error(&e));
            }
        }
    }

    let mut nodes: Vec<ExplorerNode> = stratify(records).into_iter().map(ExplorerNode::from).collect();
    nodes.extend(errors);
    nodes
}
