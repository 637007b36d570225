//! Cron entries for scheduled backups.
//!
//! Two entries are managed: a frequent silent run and a daily run that
//! notifies and uploads. Each installed line changes into the env file's
//! directory first, since cron starts jobs in `$HOME` and relative settings
//! such as `BACKUP_DIR=./backups` or the compose project resolve from the
//! working directory. Lines end with a marker comment (`# pgkeep:fast`,
//! `# pgkeep:notify`) and name the binary by absolute path. Installation
//! skips a variant when a line already carries both, so re-running the
//! installer never duplicates entries.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{ConfigError, Result};
use crate::port::CrontabStore;

/// Comment prefix that tags lines managed by this tool.
pub const MARKER_PREFIX: &str = "# pgkeep:";

/// Which scheduled run an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CronVariant {
    /// Frequent backup with no chat traffic on success.
    Fast,
    /// Daily backup that notifies and uploads.
    Notify,
}

impl CronVariant {
    pub const ALL: [Self; 2] = [Self::Fast, Self::Notify];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Notify => "notify",
        }
    }

    /// Marker comment appended to this variant's line.
    #[must_use]
    pub fn marker(self) -> String {
        format!("{MARKER_PREFIX}{}", self.as_str())
    }

    #[must_use]
    pub const fn default_schedule(self) -> &'static str {
        match self {
            Self::Fast => "0 */6 * * *",
            Self::Notify => "0 3 * * *",
        }
    }

    /// `backup` arguments for this variant.
    #[must_use]
    pub const fn backup_args(self) -> &'static [&'static str] {
        match self {
            Self::Fast => &["backup", "--no-notify"],
            Self::Notify => &["backup", "--notify", "--upload"],
        }
    }
}

impl fmt::Display for CronVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One crontab line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CronEntry {
    pub variant: CronVariant,
    pub schedule: String,
    pub command: String,
}

impl CronEntry {
    #[must_use]
    pub fn line(&self) -> String {
        format!("{} {} {}", self.schedule, self.command, self.variant.marker())
    }
}

/// Everything needed to render the managed entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CronPlan {
    binary: PathBuf,
    env_file: PathBuf,
    working_dir: Option<PathBuf>,
    log_file: Option<PathBuf>,
    fast_schedule: String,
    notify_schedule: String,
}

impl CronPlan {
    /// Plan with default schedules for `binary` reading `env_file`.
    ///
    /// Jobs run from the env file's directory.
    #[must_use]
    pub fn new(binary: impl Into<PathBuf>, env_file: impl Into<PathBuf>) -> Self {
        let env_file = env_file.into();
        let working_dir = env_file
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .map(Path::to_path_buf);
        Self {
            binary: binary.into(),
            env_file,
            working_dir,
            log_file: None,
            fast_schedule: CronVariant::Fast.default_schedule().to_string(),
            notify_schedule: CronVariant::Notify.default_schedule().to_string(),
        }
    }

    /// Append each run's output to `log_file`.
    #[must_use]
    pub fn with_log_file(mut self, log_file: impl Into<PathBuf>) -> Self {
        self.log_file = Some(log_file.into());
        self
    }

    /// Replace the schedule of `variant` after validating it.
    pub fn with_schedule(mut self, variant: CronVariant, schedule: &str) -> Result<Self> {
        let schedule = validate_schedule(variant, schedule)?;
        match variant {
            CronVariant::Fast => self.fast_schedule = schedule,
            CronVariant::Notify => self.notify_schedule = schedule,
        }
        Ok(self)
    }

    #[must_use]
    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Directory the jobs change into before running.
    #[must_use]
    pub fn working_dir(&self) -> Option<&Path> {
        self.working_dir.as_deref()
    }

    #[must_use]
    pub fn entries(&self) -> Vec<CronEntry> {
        CronVariant::ALL
            .into_iter()
            .map(|variant| CronEntry {
                variant,
                schedule: match variant {
                    CronVariant::Fast => self.fast_schedule.clone(),
                    CronVariant::Notify => self.notify_schedule.clone(),
                },
                command: self.command(variant),
            })
            .collect()
    }

    fn command(&self, variant: CronVariant) -> String {
        let mut parts = Vec::new();
        if let Some(dir) = &self.working_dir {
            parts.push(format!("cd {} &&", cron_escape(&shell_quote(&dir.to_string_lossy()))));
        }
        parts.push(binary_token(&self.binary));
        parts.push("--env-file".to_string());
        parts.push(cron_escape(&shell_quote(&self.env_file.to_string_lossy())));
        parts.extend(variant.backup_args().iter().map(|arg| (*arg).to_string()));
        if let Some(log_file) = &self.log_file {
            let log_file = cron_escape(&shell_quote(&log_file.to_string_lossy()));
            parts.push(format!(">> {log_file} 2>&1"));
        }
        parts.join(" ")
    }
}

/// Result of an install pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallReport {
    pub installed: Vec<CronVariant>,
    pub already_present: Vec<CronVariant>,
}

/// Append the plan's entries that are not already present in `existing`.
#[must_use]
pub fn merge(existing: &str, plan: &CronPlan) -> (String, InstallReport) {
    let binary = binary_token(&plan.binary);
    let mut contents = existing.to_string();
    let mut report = InstallReport::default();

    for entry in plan.entries() {
        let marker = entry.variant.marker();
        let present = existing
            .lines()
            .any(|line| invokes(line, &binary) && has_marker(line, &marker));
        if present {
            report.already_present.push(entry.variant);
            continue;
        }
        if !contents.is_empty() && !contents.ends_with('\n') {
            contents.push('\n');
        }
        contents.push_str(&entry.line());
        contents.push('\n');
        report.installed.push(entry.variant);
    }
    (contents, report)
}

/// Drop managed lines for `binary`; returns the new contents and how many
/// lines were removed.
#[must_use]
pub fn remove(existing: &str, binary: &Path) -> (String, usize) {
    let binary = binary_token(binary);
    let mut removed = 0;
    let mut contents = String::with_capacity(existing.len());
    for line in existing.lines() {
        let managed = invokes(line, &binary)
            && CronVariant::ALL
                .into_iter()
                .any(|variant| has_marker(line, &variant.marker()));
        if managed {
            removed += 1;
            continue;
        }
        contents.push_str(line);
        contents.push('\n');
    }
    (contents, removed)
}

/// Install the plan into `store`. Writes only when something changed.
pub fn install(store: &dyn CrontabStore, plan: &CronPlan) -> Result<InstallReport> {
    let existing = store.read()?;
    let (contents, report) = merge(&existing, plan);
    if report.installed.is_empty() {
        info!("Cron entries already installed");
    } else {
        store.write(&contents)?;
        info!(installed = ?report.installed, "Installed cron entries");
    }
    Ok(report)
}

/// Remove managed entries for `binary` from `store`.
pub fn uninstall(store: &dyn CrontabStore, binary: &Path) -> Result<usize> {
    let existing = store.read()?;
    let (contents, removed) = remove(&existing, binary);
    if removed > 0 {
        store.write(&contents)?;
    }
    debug!(removed, "Removed cron entries");
    Ok(removed)
}

/// The binary as it appears in a rendered line.
fn binary_token(binary: &Path) -> String {
    cron_escape(&shell_quote(&binary.to_string_lossy()))
}

// cron treats a bare `%` as a newline.
fn cron_escape(value: &str) -> String {
    value.replace('%', "\\%")
}

/// Whether `token` appears in `line` as a whole word, so `/opt/pgkeep` does
/// not match `/opt/pgkeep-old`.
fn invokes(line: &str, token: &str) -> bool {
    line.match_indices(token).any(|(at, _)| {
        let before = line[..at].chars().next_back().map_or(true, char::is_whitespace);
        let after = line[at + token.len()..]
            .chars()
            .next()
            .map_or(true, char::is_whitespace);
        before && after
    })
}

// `# pgkeep:fast` must not match `# pgkeep:fastest`.
fn has_marker(line: &str, marker: &str) -> bool {
    line.match_indices(marker).any(|(at, _)| {
        line[at + marker.len()..]
            .chars()
            .next()
            .map_or(true, char::is_whitespace)
    })
}

const MACROS: &[&str] = &[
    "@reboot", "@yearly", "@annually", "@monthly", "@weekly", "@daily", "@midnight", "@hourly",
];

fn validate_schedule(variant: CronVariant, schedule: &str) -> Result<String> {
    let field = match variant {
        CronVariant::Fast => "fast schedule",
        CronVariant::Notify => "notify schedule",
    };
    let invalid = |reason: String| ConfigError::InvalidValue { field, reason };

    let schedule = schedule.trim();
    if schedule.starts_with('@') {
        return if MACROS.contains(&schedule) {
            Ok(schedule.to_string())
        } else {
            Err(invalid(format!("unknown macro `{schedule}`")).into())
        };
    }

    let fields: Vec<&str> = schedule.split_whitespace().collect();
    if fields.len() != 5 {
        return Err(invalid(format!(
            "expected 5 fields, got {} in `{schedule}`",
            fields.len()
        ))
        .into());
    }
    let allowed = |c: char| c.is_ascii_alphanumeric() || matches!(c, '*' | '/' | ',' | '-');
    if let Some(bad) = fields.iter().find(|f| !f.chars().all(allowed)) {
        return Err(invalid(format!("unexpected characters in `{bad}`")).into());
    }
    Ok(fields.join(" "))
}

fn shell_quote(value: &str) -> String {
    let safe = |c: char| {
        c.is_ascii_alphanumeric() || matches!(c, '/' | '.' | '_' | '-' | '+' | ':' | '=' | ',')
    };
    if !value.is_empty() && value.chars().all(safe) {
        value.to_string()
    } else {
        format!("'{}'", value.replace('\'', r"'\''"))
    }
}
