//! Error handling for duffle-explorer
//!
//! Two layers, as everywhere in this crate:
//! 1. [`DuffleError`] - strongly typed failures raised by the duffle adapters,
//!    the repository index fetcher and configuration loading
//! 2. [`ErrorContext`] - a user-facing wrapper adding details and a suggestion,
//!    produced by [`user_friendly_error`] and printed by the binary
//!
//! Library functions return [`anyhow::Result`], attaching context with
//! [`anyhow::Context`] and raising `DuffleError` variants where callers may want
//! to match on the failure.
//!
//! Explorer roots never surface these errors to the user as a failure of the
//! whole command: they turn them into an error node (see
//! [`crate::explorer::ExplorerNode::Error`]) so the rest of a tree remains
//! visible.
//!
//! # Examples
//!
//! ```rust,no_run
//! use duffle_explorer::core::{DuffleError, user_friendly_error};
//!
//! let err = anyhow::Error::from(DuffleError::DuffleNotFound);
//! let ctx = user_friendly_error(err);
//! ctx.display(); // colored error, details and suggestion on stderr
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// Failures raised while talking to duffle, fetching indexes or reading config.
#[derive(Error, Debug)]
pub enum DuffleError {
    /// The duffle binary could not be located
    ///
    /// Raised when no `duffle-path` is configured and `duffle` is not on `PATH`,
    /// or when the configured path does not exist.
    #[error("duffle is not installed or not found in PATH")]
    DuffleNotFound,

    /// A duffle command exited unsuccessfully
    #[error("duffle {operation} failed: {stderr}")]
    CommandFailed {
        /// The subcommand that failed (e.g. "list", "repo list")
        operation: String,
        /// Error output printed by duffle
        stderr: String,
    },

    /// A duffle command did not finish in time
    #[error("duffle {operation} timed out after {seconds} seconds")]
    CommandTimedOut {
        /// The subcommand that timed out
        operation: String,
        /// Configured timeout
        seconds: u64,
    },

    /// A repository index could not be downloaded
    #[error("Failed to fetch index for repository '{repository}': {reason}")]
    IndexFetchFailed {
        /// Repository host/path as configured
        repository: String,
        /// Transport error or HTTP status
        reason: String,
    },

    /// A repository index was downloaded but is not a valid index document
    #[error("Invalid index for repository '{repository}': {reason}")]
    IndexParseFailed {
        /// Repository host/path as configured
        repository: String,
        /// JSON decoding error
        reason: String,
    },

    /// Configuration file problems
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration error
        message: String,
    },

    /// A command-line argument was rejected
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// What was wrong with the argument
        message: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// Other error
    #[error("{message}")]
    Other {
        /// Generic error message
        message: String,
    },
}

impl Clone for DuffleError {
    fn clone(&self) -> Self {
        match self {
            Self::DuffleNotFound => Self::DuffleNotFound,
            Self::CommandFailed {
                operation,
                stderr,
            } => Self::CommandFailed {
                operation: operation.clone(),
                stderr: stderr.clone(),
            },
            Self::CommandTimedOut {
                operation,
                seconds,
            } => Self::CommandTimedOut {
                operation: operation.clone(),
                seconds: *seconds,
            },
            Self::IndexFetchFailed {
                repository,
                reason,
            } => Self::IndexFetchFailed {
                repository: repository.clone(),
                reason: reason.clone(),
            },
            Self::IndexParseFailed {
                repository,
                reason,
            } => Self::IndexParseFailed {
                repository: repository.clone(),
                reason: reason.clone(),
            },
            Self::ConfigError {
                message,
            } => Self::ConfigError {
                message: message.clone(),
            },
            Self::InvalidArgument {
                message,
            } => Self::InvalidArgument {
                message: message.clone(),
            },
            // io::Error is not Clone; keep kind and message
            Self::IoError(e) => Self::IoError(std::io::Error::new(e.kind(), e.to_string())),
            // toml errors are not Clone either; they are configuration problems
            Self::TomlError(e) => Self::ConfigError {
                message: format!("TOML parsing error: {e}"),
            },
            Self::Other {
                message,
            } => Self::Other {
                message: message.clone(),
            },
        }
    }
}

/// An error with optional details and a suggestion for the user.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: DuffleError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Wrap `error` with no details or suggestion.
    #[must_use]
    pub const fn new(error: DuffleError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion, shown in green.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add details, shown in yellow.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error, details and suggestion to stderr with colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into an [`ErrorContext`] suitable for the terminal.
///
/// [`DuffleError`]s anywhere in the chain get tailored suggestions; IO and
/// TOML errors get generic ones; everything else is reported with its full
/// cause chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(duffle_error) = error.chain().find_map(|cause| cause.downcast_ref::<DuffleError>()) {
        return create_error_context(duffle_error.clone());
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => {
                return ErrorContext::new(DuffleError::Other {
                    message: format!("Permission denied: {io_error}"),
                })
                .with_suggestion("Check the permissions of the duffle home directory and the configuration file");
            }
            std::io::ErrorKind::NotFound => {
                return ErrorContext::new(DuffleError::Other {
                    message: format!("Not found: {io_error}"),
                })
                .with_suggestion("Check that the file or directory exists and the path is correct");
            }
            _ => {}
        }
    }

    if let Some(toml_error) = error.downcast_ref::<toml::de::Error>() {
        return ErrorContext::new(DuffleError::ConfigError {
            message: format!("TOML parsing error: {toml_error}"),
        })
        .with_suggestion("Check the TOML syntax of the configuration file");
    }

    let mut message = error.to_string();
    let chain: Vec<String> = error.chain().skip(1).map(std::string::ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(DuffleError::Other {
        message,
    })
}

fn create_error_context(error: DuffleError) -> ErrorContext {
    match &error {
        DuffleError::DuffleNotFound => ErrorContext::new(error)
            .with_suggestion("Install duffle from https://github.com/cnabio/duffle/releases, or set 'duffle-path' in the configuration file")
            .with_details("duffle-explorer shells out to the duffle CLI to list bundles, repositories, credential sets and claims"),

        DuffleError::CommandFailed { operation, .. } => {
            let suggestion = format!("Run 'duffle {operation}' manually to see the full output");
            ErrorContext::new(error).with_suggestion(suggestion)
        }

        DuffleError::CommandTimedOut { .. } => ErrorContext::new(error)
            .with_suggestion("Increase 'timeout-secs' in the configuration file")
            .with_details("duffle did not respond in time; it may be waiting for input or a slow network"),

        DuffleError::IndexFetchFailed { repository, .. } => {
            let suggestion = format!(
                "Check that https://{repository}/index.json is reachable and the repository name is correct"
            );
            ErrorContext::new(error).with_suggestion(suggestion)
        }

        DuffleError::IndexParseFailed { .. } => ErrorContext::new(error)
            .with_details("A repository index must map bundle names to version tags and digests"),

        DuffleError::ConfigError { .. } => ErrorContext::new(error)
            .with_suggestion("Check the configuration file (see --config or DUFFLE_EXPLORER_CONFIG)"),

        _ => ErrorContext::new(error),
    }
}
