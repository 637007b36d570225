//! Backup artifact naming.
//!
//! An artifact file is named `<prefix>_<YYYYMMDD_HHMMSS>.sql.gz`, with the
//! timestamp in UTC at second resolution. The name is the artifact's identity:
//! listing and pruning only ever consider files that parse back into an
//! [`ArtifactName`] for the configured prefix.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime, SubsecRound, Utc};

/// File extension of every artifact.
pub const ARTIFACT_EXTENSION: &str = ".sql.gz";

/// `strftime` layout of the timestamp embedded in artifact names.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

const TIMESTAMP_LEN: usize = 15;

/// Parsed artifact file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactName {
    prefix: String,
    created_at: DateTime<Utc>,
}

impl ArtifactName {
    /// Create a name for an artifact started at `created_at`.
    ///
    /// Sub-second precision is dropped so that the name round-trips.
    #[must_use]
    pub fn new(prefix: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            prefix: prefix.into(),
            created_at: created_at.trunc_subsecs(0),
        }
    }

    /// Parse a file name produced for `prefix`.
    ///
    /// Returns `None` for anything that is not exactly
    /// `<prefix>_<YYYYMMDD_HHMMSS>.sql.gz`.
    #[must_use]
    pub fn parse(prefix: &str, file_name: &str) -> Option<Self> {
        let rest = file_name.strip_prefix(prefix)?.strip_prefix('_')?;
        let stamp = rest.strip_suffix(ARTIFACT_EXTENSION)?;
        if !is_timestamp_shape(stamp) {
            return None;
        }
        let naive = NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT).ok()?;
        Some(Self {
            prefix: prefix.to_string(),
            created_at: naive.and_utc(),
        })
    }

    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// The timestamp component, e.g. `20250301_031500`.
    #[must_use]
    pub fn timestamp(&self) -> String {
        self.created_at.format(TIMESTAMP_FORMAT).to_string()
    }

    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}_{}{}", self.prefix, self.timestamp(), ARTIFACT_EXTENSION)
    }

    /// Full path of this artifact inside `dir`.
    #[must_use]
    pub fn path_in(&self, dir: &Path) -> PathBuf {
        dir.join(self.file_name())
    }
}

impl fmt::Display for ArtifactName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.file_name())
    }
}

fn is_timestamp_shape(stamp: &str) -> bool {
    stamp.len() == TIMESTAMP_LEN
        && stamp.bytes().enumerate().all(|(i, b)| {
            if i == 8 {
                b == b'_'
            } else {
                b.is_ascii_digit()
            }
        })
}

/// A dump file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupArtifact {
    pub name: ArtifactName,
    pub path: PathBuf,
    pub size_bytes: u64,
}

impl BackupArtifact {
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.name.created_at()
    }

    /// Human-readable size, e.g. `12.4 MiB`.
    #[must_use]
    pub fn display_size(&self) -> String {
        format_size(self.size_bytes)
    }
}

/// Format a byte count using binary units.
#[must_use]
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn file_name_uses_utc_second_resolution() {
        let when = at(2025, 3, 1, 3, 15, 0) + chrono::Duration::milliseconds(750);
        let name = ArtifactName::new("tradebot", when);
        assert_eq!(name.file_name(), "tradebot_20250301_031500.sql.gz");
        assert_eq!(name.created_at(), at(2025, 3, 1, 3, 15, 0));
    }

    #[test]
    fn parse_accepts_own_output() {
        let name = ArtifactName::new("tradebot", at(2024, 12, 31, 23, 59, 59));
        let parsed = ArtifactName::parse("tradebot", &name.file_name()).unwrap();
        assert_eq!(parsed, name);
    }

    #[test]
    fn parse_rejects_foreign_files() {
        for candidate in [
            "tradebot_20250301_031500.sql",
            "tradebot_20250301_031500.sql.gz.part",
            "other_20250301_031500.sql.gz",
            "tradebot_2025031_031500.sql.gz",
            "tradebot_20250301-031500.sql.gz",
            "tradebot_20251301_031500.sql.gz",
            "tradebot20250301_031500.sql.gz",
            "notes.txt",
        ] {
            assert!(
                ArtifactName::parse("tradebot", candidate).is_none(),
                "{candidate} should not parse"
            );
        }
    }

    #[test]
    fn parse_does_not_confuse_longer_prefixes() {
        assert!(ArtifactName::parse("bot", "bot_db_20250301_031500.sql.gz").is_none());
        assert!(ArtifactName::parse("bot_db", "bot_db_20250301_031500.sql.gz").is_some());
    }

    #[test]
    fn names_order_by_time() {
        let earlier = ArtifactName::new("db", at(2025, 1, 1, 0, 0, 0));
        let later = ArtifactName::new("db", at(2025, 1, 1, 0, 0, 1));
        assert!(earlier.file_name() < later.file_name());
    }

    #[test]
    fn format_size_picks_unit() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KiB");
        assert_eq!(format_size(45 * 1024 * 1024), "45.0 MiB");
        assert_eq!(format_size(3 * 1024 * 1024 * 1024), "3.0 GiB");
    }
}
