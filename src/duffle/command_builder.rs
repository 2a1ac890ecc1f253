//! Builder for duffle invocations with consistent logging and error mapping.
//!
//! Every listing operation goes through [`DuffleCommand`] so that timeouts,
//! captured output and failures look the same regardless of the subcommand.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

use crate::core::DuffleError;

/// Default upper bound for a single duffle invocation.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// A duffle invocation under construction.
///
/// ```rust,no_run
/// use duffle_explorer::duffle::command_builder::DuffleCommand;
///
/// # async fn example() -> anyhow::Result<()> {
/// let stdout = DuffleCommand::new("/usr/local/bin/duffle")
///     .args(["repo", "list"])
///     .with_context("repositories")
///     .execute_stdout()
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct DuffleCommand {
    program: PathBuf,
    args: Vec<String>,
    env_vars: Vec<(String, String)>,
    timeout_duration: Option<Duration>,
    context: Option<String>,
}

impl DuffleCommand {
    /// Start a command that runs `program`.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env_vars: Vec::new(),
            timeout_duration: Some(DEFAULT_TIMEOUT),
            context: None,
        }
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments in order.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set an environment variable for the child process only.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_vars.push((key.into(), value.into()));
        self
    }

    /// Replace the timeout (`None` waits indefinitely).
    pub const fn with_timeout(mut self, duration: Option<Duration>) -> Self {
        self.timeout_duration = duration;
        self
    }

    /// Tag log lines with `context`, e.g. the repository being listed.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// The subcommand words, used to name the operation in errors.
    fn operation(&self) -> String {
        let words: Vec<&str> = self
            .args
            .iter()
            .map(String::as_str)
            .take_while(|arg| !arg.starts_with('-'))
            .collect();
        if words.is_empty() {
            "unknown".to_string()
        } else {
            words.join(" ")
        }
    }

    fn log_prefix(&self) -> String {
        self.context.as_ref().map(|ctx| format!("({ctx}) ")).unwrap_or_default()
    }

    /// Run the command and capture its output.
    ///
    /// # Errors
    ///
    /// - [`DuffleError::DuffleNotFound`] if the program cannot be spawned because it does not exist
    /// - [`DuffleError::CommandTimedOut`] if the timeout elapses
    /// - [`DuffleError::CommandFailed`] on a non-zero exit status
    pub async fn execute(self) -> Result<DuffleCommandOutput> {
        let start = std::time::Instant::now();
        let operation = self.operation();
        let prefix = self.log_prefix();

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        for (key, value) in &self.env_vars {
            tracing::trace!(target: "duffle", "Setting env var: {}={}", key, value);
            cmd.env(key, value);
        }
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.kill_on_drop(true);

        tracing::debug!(
            target: "duffle",
            "{}Executing command: {} {}",
            prefix,
            self.program.display(),
            self.args.join(" ")
        );

        let output_future = cmd.output();
        let result = if let Some(duration) = self.timeout_duration {
            if let Ok(result) = timeout(duration, output_future).await {
                result
            } else {
                tracing::warn!(
                    target: "duffle",
                    "{}Command timed out after {} seconds: duffle {}",
                    prefix,
                    duration.as_secs(),
                    self.args.join(" ")
                );
                return Err(DuffleError::CommandTimedOut {
                    operation,
                    seconds: duration.as_secs(),
                }
                .into());
            }
        } else {
            output_future.await
        };

        let output = match result {
            Ok(output) => output,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(target: "duffle", "Binary not found: {}", self.program.display());
                return Err(DuffleError::DuffleNotFound.into());
            }
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to execute {} {}", self.program.display(), self.args.join(" "))
                });
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !output.status.success() {
            tracing::debug!(
                target: "duffle",
                "{}Command failed with exit code: {:?}",
                prefix,
                output.status.code()
            );
            // duffle prints some errors on stdout
            let message = if stderr.trim().is_empty() {
                stdout.trim().to_string()
            } else {
                stderr.trim().to_string()
            };
            return Err(DuffleError::CommandFailed {
                operation,
                stderr: message,
            }
            .into());
        }

        if !stderr.trim().is_empty() {
            tracing::debug!(target: "duffle", "{}{}", prefix, stderr.trim());
        }
        tracing::trace!(target: "duffle", "{}{}", prefix, stdout.trim());

        let elapsed = start.elapsed();
        if elapsed.as_secs() > 1 {
            tracing::info!(
                target: "duffle::perf",
                "{}duffle {} took {:.2}s",
                prefix,
                operation,
                elapsed.as_secs_f64()
            );
        } else if elapsed.as_millis() > 100 {
            tracing::debug!(
                target: "duffle::perf",
                "{}duffle {} took {}ms",
                prefix,
                operation,
                elapsed.as_millis()
            );
        }

        Ok(DuffleCommandOutput {
            stdout,
            stderr,
        })
    }

    /// Run the command and return its standard output, untrimmed.
    pub async fn execute_stdout(self) -> Result<String> {
        Ok(self.execute().await?.stdout)
    }
}

/// Captured output of a successful invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuffleCommandOutput {
    /// Standard output
    pub stdout: String,
    /// Standard error (duffle writes warnings here)
    pub stderr: String,
}
