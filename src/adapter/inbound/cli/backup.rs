use std::path::Path;

use chrono::Utc;
use serde_json::json;

use super::command::BackupArgs;
use super::{context, output};
use crate::adapter::outbound::dump;
use crate::application::{BackupJob, JobReport};
use crate::domain::{Delivery, UploadOutcome};
use crate::error::Result;

/// Run one backup: dump, verify, prune, then deliver as requested.
pub async fn execute(env_file: &Path, args: &BackupArgs) -> Result<()> {
    let settings = context::load_settings(env_file)?;
    let notifier = context::notifier(&settings)?;
    let source = dump::from_settings(&settings);
    let options = args.options();

    let pb = output::spinner(&format!("Backing up {}", source.describe()));
    let report = match BackupJob::new(&settings, source.as_ref(), &notifier, options)
        .execute(Utc::now())
        .await
    {
        Ok(report) => report,
        Err(e) => {
            output::spinner_fail(&pb, "Backup failed");
            return Err(e);
        }
    };

    let Some(artifact) = &report.artifact else {
        output::spinner_success(&pb, "Nothing to back up");
        if output::is_json() {
            output::json_output(json!({
                "command": "backup",
                "status": "nothing_to_do",
                "source": source.describe(),
            }));
        } else {
            output::note(&format!("{} has no data yet", source.describe()));
        }
        return Ok(());
    };
    output::spinner_success(&pb, "Backup complete");

    if output::is_json() {
        output::json_output(json!({
            "command": "backup",
            "status": "ok",
            "artifact": artifact.path.display().to_string(),
            "size_bytes": artifact.size_bytes,
            "pruned": report
                .pruned
                .removed
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>(),
            "upload": report.upload.as_ref().map(UploadOutcome::label),
            "summary": report.summary.as_ref().map(Delivery::label),
        }));
        return Ok(());
    }

    print_report(&report);
    Ok(())
}

fn print_report(report: &JobReport) {
    output::section("Backup");
    if let Some(artifact) = &report.artifact {
        output::field("Artifact", artifact.path.display());
        output::field("Size", artifact.display_size());
    }
    output::field("Pruned", report.pruned.removed.len());
    for path in &report.pruned.removed {
        output::note(&format!("removed {}", path.display()));
    }

    match &report.upload {
        None => {}
        Some(UploadOutcome::TooLarge { size_bytes, .. }) => {
            output::warning(&format!(
                "Artifact too large to attach ({}), sent a notice instead",
                crate::domain::artifact::format_size(*size_bytes)
            ));
        }
        Some(UploadOutcome::Sent(delivery)) => print_delivery("Upload", delivery),
    }
    if let Some(delivery) = &report.summary {
        print_delivery("Notify", delivery);
    }
}

fn print_delivery(label: &str, delivery: &Delivery) {
    match delivery {
        Delivery::Delivered => output::field(label, "delivered"),
        Delivery::Skipped => {
            output::field(label, "skipped");
            output::hint("set BACKUP_BOT_TOKEN and BACKUP_CHAT_ID to enable Telegram delivery");
        }
        Delivery::Failed(reason) => output::warning(&format!("{label} failed: {reason}")),
    }
}
