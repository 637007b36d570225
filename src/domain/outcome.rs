//! Per-run outcome.
//!
//! A run moves through `Dumping -> Verifying -> Pruning` and then delivery.
//! Failure in any of the first three stages ends the run with
//! [`RunOutcome::Failure`]; the job turns that into exactly one failure
//! notification.

use std::fmt;
use std::path::PathBuf;

use crate::error::Error;

use super::artifact::BackupArtifact;

/// Stage at which a run can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Dumping,
    Verifying,
    Pruning,
}

impl Stage {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dumping => "dumping",
            Self::Verifying => "verifying",
            Self::Pruning => "pruning",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Files removed (or that would be removed) by one retention pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PruneReport {
    pub removed: Vec<PathBuf>,
    pub kept: usize,
}

/// A successful dump and the retention pass that followed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub artifact: BackupArtifact,
    pub pruned: PruneReport,
}

/// Tagged result of one backup run.
#[derive(Debug)]
pub enum RunOutcome {
    Success(RunReport),
    /// The source had nothing to dump; no artifact was produced.
    NothingToDo { reason: String },
    Failure {
        stage: Stage,
        /// Path the artifact was (or would have been) written to.
        artifact_path: PathBuf,
        error: Error,
    },
}

impl RunOutcome {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}
