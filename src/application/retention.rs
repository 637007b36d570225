//! Artifact catalog and retention pruning.

use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};

use crate::domain::{ArtifactName, BackupArtifact, PruneReport};
use crate::error::Result;

/// An artifact found on disk, with its modification time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredArtifact {
    pub artifact: BackupArtifact,
    pub modified: DateTime<Utc>,
}

/// List artifacts for `prefix` in `dir`, newest first.
///
/// The scan is not recursive. A missing directory has no artifacts.
pub fn scan(dir: &Path, prefix: &str) -> Result<Vec<StoredArtifact>> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut found = Vec::new();
    for entry in entries {
        let entry = entry?;
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str().and_then(|n| ArtifactName::parse(prefix, n)) else {
            continue;
        };
        let metadata = entry.metadata()?;
        if !metadata.is_file() {
            continue;
        }
        found.push(StoredArtifact {
            artifact: BackupArtifact {
                path: entry.path(),
                name,
                size_bytes: metadata.len(),
            },
            modified: metadata.modified()?.into(),
        });
    }
    found.sort_by(|a, b| b.artifact.name.created_at().cmp(&a.artifact.name.created_at()));
    Ok(found)
}

/// Removes artifacts older than the retention window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    pub days: u32,
}

impl RetentionPolicy {
    #[must_use]
    pub const fn new(days: u32) -> Self {
        Self { days }
    }

    /// Artifacts modified strictly before this instant are expired.
    #[must_use]
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::days(i64::from(self.days))
    }

    #[must_use]
    pub fn is_expired(&self, modified: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        modified < self.cutoff(now)
    }

    /// Delete expired artifacts in `dir`. With `dry_run` nothing is deleted
    /// but the report lists what would have been.
    pub fn prune(
        &self,
        dir: &Path,
        prefix: &str,
        now: DateTime<Utc>,
        dry_run: bool,
    ) -> Result<PruneReport> {
        self.prune_except(dir, prefix, now, dry_run, None)
    }

    /// Like [`prune`](Self::prune), but `keep` survives whatever its age.
    ///
    /// A run passes its own artifact here so a zero-day window cannot delete
    /// the file it just wrote.
    pub fn prune_except(
        &self,
        dir: &Path,
        prefix: &str,
        now: DateTime<Utc>,
        dry_run: bool,
        keep: Option<&Path>,
    ) -> Result<PruneReport> {
        let mut report = PruneReport::default();
        for stored in scan(dir, prefix)? {
            let kept = keep.is_some_and(|keep| keep == stored.artifact.path.as_path());
            if kept || !self.is_expired(stored.modified, now) {
                report.kept += 1;
                continue;
            }
            let path = stored.artifact.path;
            if dry_run {
                debug!(path = %path.display(), "Would remove expired artifact");
            } else {
                match std::fs::remove_file(&path) {
                    Ok(()) => info!(path = %path.display(), "Removed expired artifact"),
                    // Another run got there first.
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                    Err(e) => return Err(e.into()),
                }
            }
            report.removed.push(path);
        }
        report.removed.sort();
        Ok(report)
    }
}
