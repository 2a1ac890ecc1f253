//! duffle-explorer: explorer trees for duffle CNAB bundles.
//!
//! The crate shells out to the `duffle` CLI and reads repository
//! `index.json` documents to build the trees an editor side bar would show:
//! local bundles, repositories, repository bundles grouped by namespace,
//! credential sets and installations.
//!
//! # Layout
//!
//! - [`utils::iterable`] - lazy, restartable sequences with first-occurrence grouping
//! - [`hierarchy`] - turns flat `name`/`version` records into a namespace tree
//! - [`models`] - records, references and the repository index document
//! - [`duffle`] - command builder, session handle, list operations, index fetch, home paths
//! - [`explorer`] - explorer nodes, tree items and roots per explorer
//! - [`cli`] - terminal front end rendering trees as tree, text or JSON
//! - [`config`] - optional TOML configuration
//! - [`core`] - error types and user-facing error rendering
//!
//! # Example
//!
//! ```rust
//! use duffle_explorer::hierarchy::{StratifiedNode, stratify};
//! use duffle_explorer::models::RepoBundle;
//!
//! let nodes = stratify(vec![
//!     RepoBundle::new("ns/app", "1.0"),
//!     RepoBundle::new("ns/app", "latest"),
//!     RepoBundle::new("hello", "0.1.0"),
//! ]);
//!
//! assert_eq!(nodes[0].label(), "ns");
//! assert_eq!(nodes[1].tooltip().as_deref(), Some("hello:0.1.0"));
//!
//! let children = nodes[0].children();
//! let app = &children[0];
//! assert!(matches!(app, StratifiedNode::Bundle(_)));
//! assert_eq!(app.tooltip().as_deref(), Some("app:latest (+ 1 other version(s))"));
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod duffle;
pub mod explorer;
pub mod hierarchy;
pub mod models;
pub mod utils;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
