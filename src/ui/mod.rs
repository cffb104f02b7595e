//! UI/Progress presentation layer
//!
//! This module handles:
//! - Progress reporting while a pipeline runs its stages
//! - The run summary table printed after a pipeline completes
//!
//! All progress reporting goes through the ProgressReporter trait, so the
//! `--quiet` flag and nested pipelines can swap in the silent reporter.

mod summary;

pub use summary::print_summary;

use indicatif::{ProgressBar, ProgressStyle};

/// Progress reporter trait for pipeline runs
pub trait ProgressReporter {
    /// Announce the stage about to run
    fn start_stage(&mut self, name: &str, kind: &str);

    /// Mark the current stage finished
    fn finish_stage(&mut self);

    /// Finish all progress output
    fn finish(&mut self);

    /// Abandon on error
    fn abandon(&mut self);
}

/// Interactive progress reporter with a stage progress bar
pub struct InteractiveProgressReporter {
    stage_pb: ProgressBar,
}

impl InteractiveProgressReporter {
    /// Create a new interactive progress reporter with total stage count
    pub fn new(total_stages: u64) -> Self {
        let stage_pb = ProgressBar::new(total_stages);
        if let Ok(style) = ProgressStyle::default_bar().template("[{bar:40.cyan/blue}] {pos}/{len} {msg}") {
            stage_pb.set_style(style.progress_chars("#>-"));
        }

        Self { stage_pb }
    }
}

impl ProgressReporter for InteractiveProgressReporter {
    fn start_stage(&mut self, name: &str, kind: &str) {
        self.stage_pb.set_message(format!("{kind}::{name}"));
    }

    fn finish_stage(&mut self) {
        self.stage_pb.inc(1);
    }

    fn finish(&mut self) {
        self.stage_pb.finish_and_clear();
    }

    fn abandon(&mut self) {
        self.stage_pb.abandon();
    }
}

/// Silent progress reporter
///
/// No-op implementation used with --quiet and for nested pipelines.
#[derive(Default)]
pub struct SilentProgressReporter;

impl ProgressReporter for SilentProgressReporter {
    fn start_stage(&mut self, _name: &str, _kind: &str) {}

    fn finish_stage(&mut self) {}

    fn finish(&mut self) {}

    fn abandon(&mut self) {}
}
