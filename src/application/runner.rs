//! One backup run: dump, verify, prune, deliver.
//!
//! [`BackupRunner::run`] covers the stages that can fail the run and returns
//! a tagged [`RunOutcome`]. [`BackupJob::execute`] adds delivery on top: it
//! reports failures to the chat exactly once, and on success optionally
//! uploads the artifact and sends a summary. Delivery problems are recorded
//! in the [`JobReport`] and never change the run's result.

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use super::notifier::Notifier;
use super::producer::{self, DumpProducer};
use super::retention::RetentionPolicy;
use super::uploader::Uploader;
use crate::domain::{
    BackupArtifact, Delivery, PruneReport, RunOutcome, RunReport, Stage, UploadOutcome,
};
use crate::error::{Error, Result};
use crate::infrastructure::config::Settings;
use crate::port::DumpSource;

/// Per-invocation switches from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobOptions {
    /// Send the success summary.
    pub notify: bool,
    /// Attach the artifact.
    pub upload: bool,
    /// Decode the artifact before declaring success.
    pub verify: bool,
}

impl Default for JobOptions {
    fn default() -> Self {
        Self {
            notify: true,
            upload: false,
            verify: true,
        }
    }
}

/// Runs the failing stages of a backup.
pub struct BackupRunner<'a> {
    settings: &'a Settings,
    source: &'a dyn DumpSource,
    verify: bool,
}

impl<'a> BackupRunner<'a> {
    #[must_use]
    pub fn new(settings: &'a Settings, source: &'a dyn DumpSource) -> Self {
        Self {
            settings,
            source,
            verify: true,
        }
    }

    #[must_use]
    pub fn verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    /// Dump, verify and prune for a run started at `started_at`.
    pub async fn run(&self, started_at: DateTime<Utc>) -> RunOutcome {
        if !self.source.has_data() {
            let reason = format!("{} has nothing to back up", self.source.describe());
            info!(%reason, "Skipping backup");
            return RunOutcome::NothingToDo { reason };
        }

        let producer = DumpProducer::new(&self.settings.backup_dir, &self.settings.prefix);
        let (name, artifact_path) = producer.plan(started_at);
        let fail = |stage: Stage, error: Error| RunOutcome::Failure {
            stage,
            artifact_path: artifact_path.clone(),
            error,
        };

        let artifact = match producer.produce(self.source, name).await {
            Ok(artifact) => artifact,
            Err(e) => return fail(Stage::Dumping, e),
        };

        if self.verify {
            if let Err(e) = producer::verify(&artifact).await {
                return fail(Stage::Verifying, e);
            }
        }

        let policy = RetentionPolicy::new(self.settings.retention_days);
        let pruned = match policy.prune_except(
            &self.settings.backup_dir,
            &self.settings.prefix,
            Utc::now(),
            false,
            Some(&artifact.path),
        ) {
            Ok(report) => report,
            Err(e) => return fail(Stage::Pruning, e),
        };

        info!(
            path = %artifact.path.display(),
            size_bytes = artifact.size_bytes,
            pruned = pruned.removed.len(),
            "Backup complete"
        );
        RunOutcome::Success(RunReport { artifact, pruned })
    }
}

/// What a completed job did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobReport {
    /// `None` when the source had nothing to back up.
    pub artifact: Option<BackupArtifact>,
    pub pruned: PruneReport,
    pub upload: Option<UploadOutcome>,
    /// Delivery of the success summary, when one was requested.
    pub summary: Option<Delivery>,
}

/// A backup run plus its notifications.
pub struct BackupJob<'a> {
    settings: &'a Settings,
    source: &'a dyn DumpSource,
    notifier: &'a Notifier,
    options: JobOptions,
}

impl<'a> BackupJob<'a> {
    #[must_use]
    pub fn new(
        settings: &'a Settings,
        source: &'a dyn DumpSource,
        notifier: &'a Notifier,
        options: JobOptions,
    ) -> Self {
        Self {
            settings,
            source,
            notifier,
            options,
        }
    }

    /// Run the backup started at `started_at`.
    ///
    /// On failure exactly one failure message is sent, whatever `notify`
    /// says, and the stage's error is returned.
    pub async fn execute(&self, started_at: DateTime<Utc>) -> Result<JobReport> {
        let outcome = BackupRunner::new(self.settings, self.source)
            .verify(self.options.verify)
            .run(started_at)
            .await;

        let report = match outcome {
            RunOutcome::Success(report) => report,
            RunOutcome::NothingToDo { .. } => {
                return Ok(JobReport {
                    artifact: None,
                    pruned: PruneReport::default(),
                    upload: None,
                    summary: None,
                });
            }
            RunOutcome::Failure {
                stage,
                artifact_path,
                error,
            } => {
                error!(%stage, path = %artifact_path.display(), error = %error, "Backup failed");
                let text =
                    failure_message(&self.settings.host_label, stage, &artifact_path, &error);
                let delivery = self.notifier.notify(&text).await;
                if !delivery.is_delivered() {
                    warn!(delivery = delivery.label(), "Failure notification not delivered");
                }
                return Err(error);
            }
        };

        let upload = if self.options.upload {
            Some(
                Uploader::new(self.notifier, &self.settings.host_label)
                    .upload(&report.artifact)
                    .await,
            )
        } else {
            None
        };

        let summary = if self.options.notify {
            let text = success_message(&self.settings.host_label, &report);
            Some(self.notifier.notify(&text).await)
        } else {
            None
        };

        Ok(JobReport {
            artifact: Some(report.artifact),
            pruned: report.pruned,
            upload,
            summary,
        })
    }
}

/// Chat text for a successful run.
#[must_use]
pub fn success_message(host_label: &str, report: &RunReport) -> String {
    format!(
        "✅ DB backup OK on {host}\nFile: {path}\nSize: {size}\nRemoved old backups: {removed}",
        host = host_label,
        path = report.artifact.path.display(),
        size = report.artifact.display_size(),
        removed = report.pruned.removed.len(),
    )
}

/// Chat text for a failed run.
#[must_use]
pub fn failure_message(
    host_label: &str,
    stage: Stage,
    artifact_path: &std::path::Path,
    error: &Error,
) -> String {
    format!(
        "❌ DB backup FAILED on {host}\nTarget: {path}\nStage: {stage}\nError: {error}",
        host = host_label,
        path = artifact_path.display(),
    )
}
