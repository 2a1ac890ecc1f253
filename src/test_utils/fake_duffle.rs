//! A scripted stand-in for the duffle binary.
//!
//! Tests describe what each subcommand prints, then [`FakeDuffle::install`]
//! writes a POSIX shell script into a temporary directory and returns a
//! handle that can produce a matching [`ExplorerConfig`] or config file.
//! Unknown subcommands exit 1 with a message on stderr.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::config::ExplorerConfig;

#[derive(Debug, Clone)]
enum Response {
    Output(String),
    Failure(String),
}

/// Builder for a fake duffle script.
#[derive(Debug, Clone, Default)]
pub struct FakeDuffle {
    responses: Vec<(String, Response)>,
}

impl FakeDuffle {
    /// A fake that knows no subcommands.
    pub fn new() -> Self {
        Self::default()
    }

    /// Print `stdout` and exit 0 when invoked with exactly `args`.
    #[must_use]
    pub fn with_output(mut self, args: &[&str], stdout: &str) -> Self {
        self.responses.push((args.join(" "), Response::Output(stdout.to_string())));
        self
    }

    /// Print `stderr` and exit 1 when invoked with exactly `args`.
    #[must_use]
    pub fn with_failure(mut self, args: &[&str], stderr: &str) -> Self {
        self.responses.push((args.join(" "), Response::Failure(stderr.to_string())));
        self
    }

    fn script(&self) -> String {
        let mut script = String::from("#!/bin/sh\ncase \"$*\" in\n");
        for (args, response) in &self.responses {
            script.push_str(&format!("  {})\n", quote(args)));
            match response {
                Response::Output(stdout) => {
                    script.push_str(&format!("    printf '%s' {}\n    exit 0\n    ;;\n", quote(stdout)));
                }
                Response::Failure(stderr) => {
                    script.push_str(&format!(
                        "    printf '%s\\n' {} >&2\n    exit 1\n    ;;\n",
                        quote(stderr)
                    ));
                }
            }
        }
        script.push_str("  *)\n    echo \"unknown command: $*\" >&2\n    exit 1\n    ;;\nesac\n");
        script
    }

    /// Write the script and make it executable.
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary directory or script cannot be created.
    pub fn install(&self) -> Result<InstalledFakeDuffle> {
        let dir = TempDir::new().context("Failed to create temp dir for fake duffle")?;
        let path = dir.path().join("duffle");
        std::fs::write(&path, self.script())
            .with_context(|| format!("Failed to write {}", path.display()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
                .with_context(|| format!("Failed to make {} executable", path.display()))?;
        }

        Ok(InstalledFakeDuffle {
            dir,
            path,
        })
    }
}

/// Wrap `value` in single quotes for `sh`.
fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// A fake duffle on disk; removed when dropped.
#[derive(Debug)]
pub struct InstalledFakeDuffle {
    dir: TempDir,
    path: PathBuf,
}

impl InstalledFakeDuffle {
    /// Path of the script.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A configuration pointing at this fake.
    pub fn config(&self) -> ExplorerConfig {
        ExplorerConfig {
            duffle_path: Some(self.path.display().to_string()),
            ..Default::default()
        }
    }

    /// Write a TOML config file for the binary, next to the script.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be serialized or written.
    pub fn write_config(&self, config: &ExplorerConfig) -> Result<PathBuf> {
        let path = self.dir.path().join("config.toml");
        let content = toml::to_string(config).context("Failed to serialize config")?;
        std::fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_escapes_single_quotes() {
        assert_eq!(quote("it's"), r"'it'\''s'");
    }

    #[test]
    fn test_script_lists_each_response() {
        let script = FakeDuffle::new()
            .with_output(&["list"], "a\n")
            .with_failure(&["claims", "list"], "boom")
            .script();

        assert!(script.starts_with("#!/bin/sh"));
        assert!(script.contains("  'list')"));
        assert!(script.contains("  'claims list')"));
        assert!(script.contains("exit 1"));
    }

    #[cfg(unix)]
    #[test]
    fn test_installed_script_runs() {
        let fake = FakeDuffle::new().with_output(&["repo", "list"], "x\ny\n").install().unwrap();
        let output = std::process::Command::new(fake.path()).args(["repo", "list"]).output().unwrap();

        assert!(output.status.success());
        assert_eq!(String::from_utf8_lossy(&output.stdout), "x\ny\n");

        let unknown = std::process::Command::new(fake.path()).arg("nope").output().unwrap();
        assert!(!unknown.status.success());
    }
}
