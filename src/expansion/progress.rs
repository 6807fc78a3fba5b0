//! Progress reporting for batch expansion.
//!
//! Strategies report per-document completion through a [`ProgressReporter`].
//! Reporting has no influence on the expansion result.

use indicatif::{ProgressBar, ProgressStyle};

/// Observer notified while a batch of documents is expanded.
pub trait ProgressReporter {
    /// Called once before work starts with the number of documents.
    fn start(&self, total: u64);

    /// Called after `delta` more documents were expanded.
    fn advance(&self, delta: u64);

    /// Called once after the last document.
    fn finish(&self);
}

/// Reporter that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn start(&self, _total: u64) {}

    fn advance(&self, _delta: u64) {}

    fn finish(&self) {}
}

/// Terminal progress bar backed by `indicatif`.
#[derive(Debug, Clone)]
pub struct ProgressBarReporter {
    bar: ProgressBar,
}

impl ProgressBarReporter {
    pub fn new(label: &str) -> Self {
        let bar = ProgressBar::new(0);
        if let Ok(style) = ProgressStyle::with_template(
            "{msg:>12} [{elapsed_precise}] {bar:40} {pos}/{len} docs ({per_sec})",
        ) {
            bar.set_style(style);
        }
        bar.set_message(label.to_string());
        Self { bar }
    }
}

impl ProgressReporter for ProgressBarReporter {
    fn start(&self, total: u64) {
        self.bar.set_length(total);
        self.bar.set_position(0);
    }

    fn advance(&self, delta: u64) {
        self.bar.inc(delta);
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

/// Pick a reporter for the `show_progress` flag.
pub fn reporter(show_progress: bool, label: &str) -> Box<dyn ProgressReporter> {
    if show_progress {
        Box::new(ProgressBarReporter::new(label))
    } else {
        Box::new(NoProgress)
    }
}
