//! Per-track outcomes and the run tally.

use std::fmt;
use std::path::{Path, PathBuf};

/// Terminal state of one track
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessingOutcome {
    /// Tags were written; `cover_art` tells whether images were attached
    Tagged { cover_art: bool },
    /// The track was not identified
    Skipped { reason: SkipReason },
    /// Something went wrong while writing tags (or a defect surfaced)
    Failed { error: String },
}

/// Why a track was skipped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The service answered but did not recognize the track
    NoMatch,
    /// Every attempt failed with a transient error
    RetriesExhausted { attempts: u32 },
    /// The service failed in a way retrying would not fix
    NonTransient(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoMatch => write!(f, "no match"),
            SkipReason::RetriesExhausted { attempts } => {
                write!(f, "gave up after {attempts} attempts")
            }
            SkipReason::NonTransient(e) => write!(f, "recognition failed: {e}"),
        }
    }
}

impl fmt::Display for ProcessingOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessingOutcome::Tagged { cover_art: true } => write!(f, "✓ tagged (with cover art)"),
            ProcessingOutcome::Tagged { cover_art: false } => write!(f, "✓ tagged"),
            ProcessingOutcome::Skipped { reason } => write!(f, "✗ skipped: {reason}"),
            ProcessingOutcome::Failed { error } => write!(f, "✗ failed: {error}"),
        }
    }
}

/// Tally of a whole run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub tagged: usize,
    /// Subset of `tagged` that also received cover art
    pub with_cover_art: usize,
    pub skipped: usize,
    pub failures: Vec<(PathBuf, String)>,
    /// Worker tasks that died outside the per-track boundary
    pub worker_failures: Vec<String>,
}

impl RunSummary {
    pub fn record(&mut self, path: &Path, outcome: &ProcessingOutcome) {
        match outcome {
            ProcessingOutcome::Tagged { cover_art } => {
                self.tagged += 1;
                if *cover_art {
                    self.with_cover_art += 1;
                }
            }
            ProcessingOutcome::Skipped { .. } => self.skipped += 1,
            ProcessingOutcome::Failed { error } => {
                self.failures.push((path.to_path_buf(), error.clone()));
            }
        }
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// Tracks that reached an outcome.
    pub fn processed(&self) -> usize {
        self.tagged + self.skipped + self.failed()
    }
}
