//! Render an explorer tree to the terminal.
//!
//! Three formats are supported:
//!
//! ```text
//! $ duffle-explorer repo-bundles              # tree (default)
//! Repository bundles
//! ├── ns
//! │   └── web (web:latest (+ 1 other version(s)))
//! └── hello (hello:0.1.0)
//!
//! $ duffle-explorer repo-bundles --format text
//! ns
//!   web (web:latest (+ 1 other version(s)))
//! hello (hello:0.1.0)
//! ```
//!
//! `--format json` prints `{"explorer": <title>, "nodes": [...]}` where each
//! node is `{label, tooltip, context, children}`.
//!
//! Nodes are expanded until `--depth` levels are shown (roots are level 1);
//! without `--depth` every expandable node is expanded.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::fmt::Write as _;

use crate::core::DuffleError;
use crate::duffle::DuffleSession;
use crate::explorer::{CollapsibleState, ExplorerNode, TreeItem};

/// Output options shared by every explorer command.
#[derive(Args, Debug, Clone)]
pub struct TreeCommand {
    /// Maximum depth to display (roots are depth 1)
    #[arg(short = 'd', long)]
    depth: Option<usize>,

    /// Output format: tree, text or json
    #[arg(short = 'f', long, default_value = "tree")]
    format: String,
}

/// A node with its children already expanded.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RenderedNode {
    item: TreeItem,
    is_error: bool,
    children: Vec<RenderedNode>,
}

impl TreeCommand {
    /// Check `--format` and `--depth` before doing any work.
    ///
    /// # Errors
    ///
    /// Returns [`DuffleError::InvalidArgument`] for an unknown format or a
    /// depth of zero.
    pub fn validate_arguments(&self) -> Result<()> {
        match self.format.as_str() {
            "tree" | "json" | "text" => {}
            _ => {
                return Err(DuffleError::InvalidArgument {
                    message: format!(
                        "Invalid format '{}'. Valid formats are: tree, json, text",
                        self.format
                    ),
                }
                .into());
            }
        }

        if let Some(depth) = self.depth
            && depth == 0
        {
            return Err(DuffleError::InvalidArgument {
                message: "Depth must be at least 1".to_string(),
            }
            .into());
        }

        Ok(())
    }

    /// Expand `roots` as deep as requested.
    async fn expand(&self, roots: Vec<ExplorerNode>, session: &DuffleSession) -> Vec<RenderedNode> {
        let mut rendered = Vec::with_capacity(roots.len());
        for root in &roots {
            rendered.push(self.expand_node(root, session, 1).await);
        }
        rendered
    }

    async fn expand_node(
        &self,
        node: &ExplorerNode,
        session: &DuffleSession,
        level: usize,
    ) -> RenderedNode {
        let item = node.tree_item();
        let within_depth = self.depth.is_none_or(|max| level < max);

        let mut children = Vec::new();
        if within_depth && item.collapsible == CollapsibleState::Collapsed {
            for child in node.children(session).await {
                children.push(Box::pin(self.expand_node(&child, session, level + 1)).await);
            }
        }

        RenderedNode {
            item,
            is_error: matches!(node, ExplorerNode::Error(_)),
            children,
        }
    }

    /// Expand `roots` and format them.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub async fn render(
        &self,
        title: &str,
        roots: Vec<ExplorerNode>,
        session: &DuffleSession,
    ) -> Result<String> {
        let nodes = self.expand(roots, session).await;
        tracing::debug!("Rendering {} root node(s) as {}", nodes.len(), self.format);

        match self.format.as_str() {
            "json" => output_json(title, &nodes),
            "text" => Ok(output_text(title, &nodes)),
            _ => Ok(output_tree(title, &nodes)),
        }
    }
}

fn empty_message(title: &str) -> String {
    format!("No {} found.", title.to_lowercase())
}

fn describe(item: &TreeItem) -> String {
    match &item.tooltip {
        Some(tooltip) if tooltip != &item.label => format!("{} ({tooltip})", item.label),
        _ => item.label.clone(),
    }
}

fn output_tree(title: &str, nodes: &[RenderedNode]) -> String {
    if nodes.is_empty() {
        return format!("{}\n", empty_message(title));
    }

    let mut out = String::new();
    let _ = writeln!(out, "{}", title.cyan().bold());
    for (i, node) in nodes.iter().enumerate() {
        print_node(&mut out, node, "", i == nodes.len() - 1);
    }
    out
}

fn print_node(out: &mut String, node: &RenderedNode, prefix: &str, is_last: bool) {
    let connector = if is_last { "└── " } else { "├── " };

    let label = if node.is_error {
        node.item.label.red().bold()
    } else {
        node.item.label.cyan()
    };
    let tooltip = node
        .item
        .tooltip
        .as_deref()
        .filter(|tooltip| *tooltip != node.item.label)
        .map(|tooltip| format!(" ({})", tooltip.bright_black()))
        .unwrap_or_default();

    let _ = writeln!(out, "{prefix}{connector}{label}{tooltip}");

    let child_prefix = if is_last {
        format!("{prefix}    ")
    } else {
        format!("{prefix}│   ")
    };
    for (i, child) in node.children.iter().enumerate() {
        print_node(out, child, &child_prefix, i == node.children.len() - 1);
    }
}

fn output_text(title: &str, nodes: &[RenderedNode]) -> String {
    if nodes.is_empty() {
        return format!("{}\n", empty_message(title));
    }

    let mut out = String::new();
    for node in nodes {
        print_text_node(&mut out, node, 0);
    }
    out
}

fn print_text_node(out: &mut String, node: &RenderedNode, indent: usize) {
    let _ = writeln!(out, "{}{}", "  ".repeat(indent), describe(&node.item));
    for child in &node.children {
        print_text_node(out, child, indent + 1);
    }
}

fn output_json(title: &str, nodes: &[RenderedNode]) -> Result<String> {
    let json = serde_json::json!({
        "explorer": title,
        "nodes": nodes.iter().map(node_to_json).collect::<Vec<_>>(),
    });
    Ok(format!("{}\n", serde_json::to_string_pretty(&json)?))
}

fn node_to_json(node: &RenderedNode) -> serde_json::Value {
    serde_json::json!({
        "label": node.item.label,
        "tooltip": node.item.tooltip,
        "context": node.item.context_value,
        "children": node.children.iter().map(node_to_json).collect::<Vec<_>>(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::stratify;
    use crate::models::RepoBundle;
    use serial_test::serial;

    fn create_default_command() -> TreeCommand {
        TreeCommand {
            depth: None,
            format: "tree".to_string(),
        }
    }

    fn sample_roots() -> Vec<ExplorerNode> {
        stratify(vec![
            RepoBundle::new("hello", "0.1.0"),
            RepoBundle::new("ns/web", "1.0"),
            RepoBundle::new("ns/web", "latest"),
        ])
        .into_iter()
        .map(ExplorerNode::from)
        .collect()
    }

    #[test]
    fn test_validate_arguments_valid_format() {
        for format in ["tree", "json", "text"] {
            let cmd = TreeCommand {
                format: format.to_string(),
                ..create_default_command()
            };
            assert!(cmd.validate_arguments().is_ok());
        }
    }

    #[test]
    fn test_validate_arguments_invalid_format() {
        let cmd = TreeCommand {
            format: "yaml".to_string(),
            ..create_default_command()
        };

        let err = cmd.validate_arguments().unwrap_err();
        assert!(err.to_string().contains("Invalid format 'yaml'"));
        assert!(matches!(
            err.downcast_ref::<DuffleError>(),
            Some(DuffleError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_validate_arguments_zero_depth() {
        let cmd = TreeCommand {
            depth: Some(0),
            ..create_default_command()
        };

        let result = cmd.validate_arguments();
        assert!(result.unwrap_err().to_string().contains("must be at least 1"));
    }

    #[tokio::test]
    async fn test_text_output_expands_everything() {
        let cmd = TreeCommand {
            format: "text".to_string(),
            ..create_default_command()
        };
        let out = cmd.render("Repository bundles", sample_roots(), &DuffleSession::default()).await.unwrap();

        assert_eq!(
            out,
            "ns\n  web (web:latest (+ 1 other version(s)))\n    1.0 (ns/web:1.0)\n    latest (ns/web:latest)\nhello (hello:0.1.0)\n"
        );
    }

    #[tokio::test]
    async fn test_depth_limits_expansion() {
        let cmd = TreeCommand {
            format: "text".to_string(),
            depth: Some(1),
        };
        let out = cmd.render("Repository bundles", sample_roots(), &DuffleSession::default()).await.unwrap();
        assert_eq!(out, "ns\nhello (hello:0.1.0)\n");

        let cmd = TreeCommand {
            depth: Some(2),
            ..cmd
        };
        let out = cmd.render("Repository bundles", sample_roots(), &DuffleSession::default()).await.unwrap();
        assert_eq!(out, "ns\n  web (web:latest (+ 1 other version(s)))\nhello (hello:0.1.0)\n");
    }

    // Tests that switch color output off share one global override.
    #[tokio::test]
    #[serial]
    async fn test_tree_output_connectors() {
        colored::control::set_override(false);
        let out = create_default_command()
            .render("Repository bundles", sample_roots(), &DuffleSession::default())
            .await
            .unwrap();

        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "Repository bundles");
        assert_eq!(lines[1], "├── ns");
        assert_eq!(lines[2], "│   └── web (web:latest (+ 1 other version(s)))");
        assert_eq!(lines[3], "│       ├── 1.0 (ns/web:1.0)");
        assert_eq!(lines[4], "│       └── latest (ns/web:latest)");
        assert_eq!(lines[5], "└── hello (hello:0.1.0)");
    }

    #[tokio::test]
    #[serial]
    async fn test_tree_output_error_node() {
        colored::control::set_override(false);
        let roots = vec![ExplorerNode::Error("duffle is not installed".to_string())];
        let out = create_default_command().render("Bundles", roots, &DuffleSession::default()).await.unwrap();
        assert_eq!(out, "Bundles\n└── Error (duffle is not installed)\n");
    }

    #[tokio::test]
    async fn test_json_output() {
        let cmd = TreeCommand {
            format: "json".to_string(),
            depth: Some(2),
        };
        let out = cmd.render("Repository bundles", sample_roots(), &DuffleSession::default()).await.unwrap();
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();

        assert_eq!(json["explorer"], "Repository bundles");
        let nodes = json["nodes"].as_array().unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0]["label"], "ns");
        assert!(nodes[0]["tooltip"].is_null());
        assert_eq!(nodes[0]["children"][0]["context"], "duffle.repoBundle");
        assert_eq!(nodes[1]["tooltip"], "hello:0.1.0");
        assert_eq!(nodes[1]["children"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_empty_tree() {
        let out = create_default_command()
            .render("Installations", Vec::new(), &DuffleSession::default())
            .await
            .unwrap();
        assert_eq!(out, "No installations found.\n");
    }
}
