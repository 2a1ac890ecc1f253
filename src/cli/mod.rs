//! Command-line interface for duffle-explorer.
//!
//! ```text
//! duffle-explorer [--verbose|--quiet] [--config PATH] [--no-progress] <COMMAND>
//!
//! Commands:
//!   bundles       Bundles stored locally
//!   repos         Known repositories as a path tree
//!   repo-bundles  Bundles of every repository, grouped by namespace
//!   credentials   Credential sets
//!   claims        Installations
//!   locate        Print where duffle stores a repository bundle
//! ```
//!
//! Every explorer command accepts `--depth N` and `--format tree|text|json`.

mod tree;

pub use tree::TreeCommand;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::config::ExplorerConfig;
use crate::duffle::{DuffleSession, paths};
use crate::explorer::{self, ExplorerKind, ExplorerNode};
use crate::utils::Spinner;

/// Settings derived from global flags.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Log filter used when `RUST_LOG` is unset
    pub log_level: String,
    /// Hide the spinner
    pub no_progress: bool,
    /// Configuration file to load instead of the default
    pub config_path: Option<PathBuf>,
}

impl CliConfig {
    /// Install the stderr tracing subscriber.
    ///
    /// `RUST_LOG` takes precedence over the level chosen by `--verbose` or
    /// `--quiet`.
    pub fn init_logging(&self) {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.log_level));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}

/// Browse duffle bundles, repositories, credential sets and claims.
#[derive(Parser, Debug)]
#[command(name = "duffle-explorer", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the configuration file
    #[arg(short, long, global = true, env = "DUFFLE_EXPLORER_CONFIG")]
    config: Option<PathBuf>,

    /// Disable the progress spinner
    #[arg(long, global = true)]
    no_progress: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Bundles stored locally (duffle list)
    Bundles(TreeCommand),
    /// Known repositories as a path tree
    Repos(TreeCommand),
    /// Bundles of every repository, grouped by namespace
    RepoBundles(RepoBundlesCommand),
    /// Credential sets (duffle credentials list)
    Credentials(TreeCommand),
    /// Installations (duffle claims list)
    Claims(TreeCommand),
    /// Print where duffle stores a repository bundle
    Locate(LocateCommand),
}

/// `repo-bundles` options.
#[derive(Args, Debug)]
struct RepoBundlesCommand {
    /// Only these repositories (repeatable); defaults to every known repository
    #[arg(long = "repo", value_name = "REPOSITORY")]
    repositories: Vec<String>,

    #[command(flatten)]
    view: TreeCommand,
}

/// `locate` options.
#[derive(Args, Debug)]
struct LocateCommand {
    /// Bundle reference: <repository>/<name>
    bundle_ref: String,
}

impl Cli {
    /// Derive settings from global flags.
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "warn"
        };

        CliConfig {
            log_level: log_level.to_string(),
            no_progress: self.no_progress,
            config_path: self.config.clone(),
        }
    }

    /// Run the selected command.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid arguments, an unreadable configuration
    /// file or output failures. Failures of duffle itself are shown as error
    /// nodes instead.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        config.init_logging();
        self.execute_with_config(config).await
    }

    /// Run with explicit settings; logging must already be set up.
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        let (title, view, source) = match &self.command {
            Commands::Locate(cmd) => {
                println!("{}", paths::repo_bundle_path(&cmd.bundle_ref)?.display());
                return Ok(());
            }
            Commands::Bundles(view) => ("Bundles", view, Source::Kind(ExplorerKind::Bundles)),
            Commands::Repos(view) => ("Repositories", view, Source::Kind(ExplorerKind::Repositories)),
            Commands::RepoBundles(cmd) if cmd.repositories.is_empty() => {
                ("Repository bundles", &cmd.view, Source::Kind(ExplorerKind::RepositoryBundles))
            }
            Commands::RepoBundles(cmd) => {
                ("Repository bundles", &cmd.view, Source::Repositories(&cmd.repositories))
            }
            Commands::Credentials(view) => ("Credential sets", view, Source::Kind(ExplorerKind::Credentials)),
            Commands::Claims(view) => ("Installations", view, Source::Kind(ExplorerKind::Installations)),
        };
        view.validate_arguments()?;

        let explorer_config = ExplorerConfig::load(config.config_path.as_deref()).await?;
        let session = DuffleSession::new(explorer_config);

        let spinner = Spinner::new(!config.no_progress, format!("Loading {}...", title.to_lowercase()));
        let roots = source.load(&session).await;
        spinner.set_message(format!("Expanding {} node(s)...", roots.len()));
        let output = view.render(title, roots, &session).await;
        spinner.finish_and_clear();

        print!("{}", output?);
        Ok(())
    }
}

/// Where a command's root nodes come from.
enum Source<'a> {
    Kind(ExplorerKind),
    Repositories(&'a [String]),
}

impl Source<'_> {
    async fn load(self, session: &DuffleSession) -> Vec<ExplorerNode> {
        match self {
            Self::Kind(kind) => explorer::roots(kind, session).await,
            Self::Repositories(repositories) => {
                explorer::repository_bundle_roots(session, repositories).await
            }
        }
    }
}
