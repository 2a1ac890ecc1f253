//! Spinner shown while the explorer waits on duffle or a repository index.
//!
//! Spinners are hidden when progress is disabled (`--no-progress`) or when
//! stderr is not a terminal, so piped tree output stays clean.

use indicatif::{ProgressBar as IndicatifBar, ProgressStyle as IndicatifStyle};
use std::io::IsTerminal;
use std::time::Duration;

/// Indeterminate progress indicator with the explorer's styling.
#[derive(Clone)]
pub struct Spinner {
    inner: IndicatifBar,
}

impl Spinner {
    /// Create a spinner showing `msg`.
    ///
    /// When `enabled` is false, or stderr is not a TTY, the spinner is hidden
    /// and every call on it is a no-op.
    pub fn new(enabled: bool, msg: impl Into<String>) -> Self {
        let bar = if enabled && std::io::stderr().is_terminal() {
            let bar = IndicatifBar::new_spinner();
            bar.set_style(spinner_style());
            bar.enable_steady_tick(Duration::from_millis(100));
            bar
        } else {
            IndicatifBar::hidden()
        };
        bar.set_message(msg.into());
        Self {
            inner: bar,
        }
    }

    /// Replace the message shown next to the spinner.
    pub fn set_message(&self, msg: impl Into<String>) {
        self.inner.set_message(msg.into());
    }

    /// Whether the spinner draws anything.
    pub fn is_hidden(&self) -> bool {
        self.inner.is_hidden()
    }

    /// Stop the spinner and erase it.
    pub fn finish_and_clear(&self) {
        self.inner.finish_and_clear();
    }
}

fn spinner_style() -> IndicatifStyle {
    IndicatifStyle::default_spinner()
        .template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| IndicatifStyle::default_spinner())
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
}
