use std::path::{Path, PathBuf};

use serde_json::json;

use super::command::{CronArgs, CronCommand};
use super::{context, output};
use crate::adapter::outbound::SystemCrontab;
use crate::application::schedule::{self, CronPlan, CronVariant};
use crate::error::Result;

/// Dispatch `pgkeep cron <subcommand>`.
pub fn execute(env_file: &Path, command: &CronCommand) -> Result<()> {
    match command {
        CronCommand::Install(args) => install(env_file, args),
        CronCommand::Show(args) => show(env_file, args),
        CronCommand::Uninstall => uninstall(),
    }
}

fn install(env_file: &Path, args: &CronArgs) -> Result<()> {
    let plan = plan(env_file, args)?;
    let report = schedule::install(&SystemCrontab, &plan)?;

    if output::is_json() {
        output::json_output(json!({
            "command": "cron.install",
            "installed": report.installed.iter().map(|v| v.as_str()).collect::<Vec<_>>(),
            "already_present": report
                .already_present
                .iter()
                .map(|v| v.as_str())
                .collect::<Vec<_>>(),
        }));
        return Ok(());
    }

    output::section("Cron");
    for entry in plan.entries() {
        if report.installed.contains(&entry.variant) {
            output::action_done("Installed", &entry.line());
        } else {
            output::note(&format!("{} entry already present", entry.variant));
        }
    }
    if report.installed.is_empty() {
        output::hint("run `pgkeep cron uninstall` first to change existing schedules");
    }
    Ok(())
}

fn show(env_file: &Path, args: &CronArgs) -> Result<()> {
    let plan = plan(env_file, args)?;
    let entries = plan.entries();

    if output::is_json() {
        output::json_output(json!({
            "command": "cron.show",
            "entries": entries
                .iter()
                .map(|e| json!({
                    "variant": e.variant.as_str(),
                    "schedule": e.schedule,
                    "line": e.line(),
                }))
                .collect::<Vec<_>>(),
        }));
        return Ok(());
    }

    output::section("Cron");
    let lines: Vec<String> = entries.iter().map(|e| e.line()).collect();
    output::lines(&lines.join("\n"));
    Ok(())
}

fn uninstall() -> Result<()> {
    let binary = std::env::current_exe()?;
    let removed = schedule::uninstall(&SystemCrontab, &binary)?;

    if output::is_json() {
        output::json_output(json!({
            "command": "cron.uninstall",
            "removed": removed,
        }));
        return Ok(());
    }

    output::section("Cron");
    if removed == 0 {
        output::note("no pgkeep entries for this binary");
    } else {
        let noun = if removed == 1 { "entry" } else { "entries" };
        output::success(&format!("Removed {removed} {noun}"));
    }
    Ok(())
}

/// Entries for the running binary. Jobs run from the env file's directory,
/// so a relative `BACKUP_DIR` places the default log next to the artifacts
/// the job will write.
fn plan(env_file: &Path, args: &CronArgs) -> Result<CronPlan> {
    let settings = context::load_settings(env_file)?;
    let binary = std::env::current_exe()?;
    let env_file = absolute(env_file)?;
    let working_dir = env_file.parent().map(Path::to_path_buf).unwrap_or_default();
    let log_file = match &args.log_file {
        Some(path) => absolute(path)?,
        None => {
            let backup_dir = settings.backup_dir.strip_prefix(".").unwrap_or(&settings.backup_dir);
            working_dir.join(backup_dir).join("pgkeep-cron.log")
        }
    };

    let mut plan = CronPlan::new(binary, env_file).with_log_file(log_file);
    if let Some(schedule) = &args.fast_schedule {
        plan = plan.with_schedule(CronVariant::Fast, schedule)?;
    }
    if let Some(schedule) = &args.notify_schedule {
        plan = plan.with_schedule(CronVariant::Notify, schedule)?;
    }
    Ok(plan)
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}
