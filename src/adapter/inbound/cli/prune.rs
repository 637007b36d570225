use std::path::Path;

use chrono::Utc;
use serde_json::json;

use super::command::PruneArgs;
use super::{context, output};
use crate::application::RetentionPolicy;
use crate::error::Result;

/// Apply the retention window outside a backup run.
pub fn execute(env_file: &Path, args: &PruneArgs) -> Result<()> {
    let settings = context::load_settings(env_file)?;
    let policy = RetentionPolicy::new(settings.retention_days);
    let report = policy.prune(
        &settings.backup_dir,
        &settings.prefix,
        Utc::now(),
        args.dry_run,
    )?;

    if output::is_json() {
        output::json_output(json!({
            "command": "prune",
            "dry_run": args.dry_run,
            "retention_days": settings.retention_days,
            "removed": report
                .removed
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>(),
            "kept": report.kept,
        }));
        return Ok(());
    }

    output::section(if args.dry_run { "Prune (dry run)" } else { "Prune" });
    output::field("Directory", settings.backup_dir.display());
    output::field("Retention", format!("{} days", settings.retention_days));
    let verb = if args.dry_run { "would remove" } else { "removed" };
    for path in &report.removed {
        output::note(&format!("{verb} {}", path.display()));
    }
    output::field("Kept", report.kept);
    output::success(&format!(
        "{} {} artifact(s)",
        capitalize(verb),
        report.removed.len()
    ));
    Ok(())
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
