//! Repository names as a browsable path tree.
//!
//! Repository names such as `hub.example.com/team/apps` are split on `/` and
//! shown one segment per level, sharing common prefixes.

use std::sync::Arc;

use crate::utils::iterable::iter;

/// Separator between repository path segments.
const PATH_SEPARATOR: char = '/';

/// One prefix of one or more repository paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoPathNode {
    segments: Vec<String>,
    all: Arc<[Vec<String>]>,
}

impl RepoPathNode {
    /// One root per distinct first segment, in first-seen order.
    pub fn roots(repositories: &[String]) -> Vec<Self> {
        let all: Arc<[Vec<String>]> = repositories.iter().map(|repo| split(repo)).collect();

        iter(all.iter())
            .filter(|path| !path.is_empty())
            .group_by(|path| path[0].clone())
            .map(|group| Self {
                segments: vec![group.key],
                all: Arc::clone(&all),
            })
            .to_vec()
    }

    /// The last segment.
    pub fn label(&self) -> &str {
        self.segments.last().map_or("", String::as_str)
    }

    /// The full prefix this node stands for, e.g. `hub.example.com/team`.
    pub fn path(&self) -> String {
        self.segments.join("/")
    }

    /// Whether the prefix is itself a repository.
    pub fn is_repository(&self) -> bool {
        self.all.iter().any(|path| *path == self.segments)
    }

    fn remainders(&self) -> impl Iterator<Item = &[String]> + Clone {
        let depth = self.segments.len();
        self.all
            .iter()
            .filter(move |path| path.len() > depth && path.starts_with(&self.segments))
            .map(move |path| &path[depth..])
    }

    /// Whether any repository lies strictly below this prefix.
    pub fn has_sub_paths(&self) -> bool {
        self.remainders().next().is_some()
    }

    /// Nodes for each distinct next segment below this prefix.
    pub fn sub_paths(&self) -> Vec<Self> {
        iter(self.remainders())
            .group_by(|rest| rest[0].clone())
            .map(|group| {
                let mut segments = self.segments.clone();
                segments.push(group.key);
                Self {
                    segments,
                    all: Arc::clone(&self.all),
                }
            })
            .to_vec()
    }
}

fn split(repository: &str) -> Vec<String> {
    repository.split(PATH_SEPARATOR).filter(|s| !s.is_empty()).map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repos(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn labels(nodes: &[RepoPathNode]) -> Vec<&str> {
        nodes.iter().map(RepoPathNode::label).collect()
    }

    #[test]
    fn test_roots_share_first_segment() {
        let roots = RepoPathNode::roots(&repos(&["a/b", "a/c", "d"]));
        assert_eq!(labels(&roots), vec!["a", "d"]);

        let under_a = roots[0].sub_paths();
        assert_eq!(labels(&under_a), vec!["b", "c"]);
        assert_eq!(under_a[1].path(), "a/c");
        assert!(under_a[1].is_repository());
        assert!(!under_a[1].has_sub_paths());

        assert!(!roots[0].is_repository());
        assert!(roots[1].is_repository());
        assert!(roots[1].sub_paths().is_empty());
    }

    #[test]
    fn test_prefix_that_is_also_a_repository() {
        let roots = RepoPathNode::roots(&repos(&["hub.example.com", "hub.example.com/team"]));
        assert_eq!(roots.len(), 1);
        assert!(roots[0].is_repository());
        assert!(roots[0].has_sub_paths());
        assert_eq!(labels(&roots[0].sub_paths()), vec!["team"]);
    }

    #[test]
    fn test_segments_are_compared_whole() {
        let roots = RepoPathNode::roots(&repos(&["ab/x", "a/y"]));
        assert_eq!(labels(&roots), vec!["ab", "a"]);
        assert_eq!(labels(&roots[1].sub_paths()), vec!["y"]);
    }

    #[test]
    fn test_empty_segments_are_ignored() {
        let roots = RepoPathNode::roots(&repos(&["/a//b/", ""]));
        assert_eq!(labels(&roots), vec!["a"]);
        assert_eq!(labels(&roots[0].sub_paths()), vec!["b"]);
    }
}
