use std::path::Path;

use chrono::{DateTime, Utc};
use serde_json::json;

use super::{context, output};
use crate::application::retention::{self, RetentionPolicy};
use crate::error::Result;

/// Show the artifacts in the backup directory, newest first.
pub fn execute(env_file: &Path) -> Result<()> {
    let settings = context::load_settings(env_file)?;
    let stored = retention::scan(&settings.backup_dir, &settings.prefix)?;
    let policy = RetentionPolicy::new(settings.retention_days);
    let now = Utc::now();

    if output::is_json() {
        let artifacts: Vec<_> = stored
            .iter()
            .map(|s| {
                json!({
                    "name": s.artifact.name.file_name(),
                    "path": s.artifact.path.display().to_string(),
                    "size_bytes": s.artifact.size_bytes,
                    "created_at": s.artifact.created_at().to_rfc3339(),
                    "modified": s.modified.to_rfc3339(),
                    "expired": policy.is_expired(s.modified, now),
                })
            })
            .collect();
        output::json_output(json!({
            "command": "list",
            "directory": settings.backup_dir.display().to_string(),
            "artifacts": artifacts,
        }));
        return Ok(());
    }

    output::section("Backups");
    output::field("Directory", settings.backup_dir.display());
    if stored.is_empty() {
        output::note("no artifacts yet");
        return Ok(());
    }

    let name_width = stored
        .iter()
        .map(|s| s.artifact.name.file_name().len())
        .max()
        .unwrap_or(0)
        .max(4);
    let widths = [name_width, 10, 8];
    output::table_header(&[("Name", widths[0]), ("Size", widths[1]), ("Age", widths[2])]);
    output::table_separator(&widths);
    for s in &stored {
        let mut age = format_age(s.modified, now);
        if policy.is_expired(s.modified, now) {
            age.push('*');
        }
        output::table_row(
            &[s.artifact.name.file_name(), s.artifact.display_size(), age],
            &widths,
        );
    }
    if stored.iter().any(|s| policy.is_expired(s.modified, now)) {
        output::hint("* older than the retention window; removed on the next prune");
    }
    Ok(())
}

/// Coarse age, e.g. `2d 4h`, `35m`.
fn format_age(modified: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = (now - modified).num_minutes().max(0);
    let (days, hours, mins) = (minutes / 1440, (minutes / 60) % 24, minutes % 60);
    match (days, hours) {
        (0, 0) => format!("{mins}m"),
        (0, _) => format!("{hours}h {mins}m"),
        _ => format!("{days}d {hours}h"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn ages_are_coarse() {
        let now = Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap();
        assert_eq!(format_age(now - Duration::minutes(35), now), "35m");
        assert_eq!(format_age(now - Duration::minutes(125), now), "2h 5m");
        assert_eq!(format_age(now - Duration::hours(52), now), "2d 4h");
        assert_eq!(format_age(now + Duration::minutes(5), now), "0m");
    }
}
