//! `KEY=value` environment file reader.
//!
//! Deliberately lenient: the same file is sourced by the deploy scripts and
//! by docker compose, so lines this reader does not understand are skipped
//! rather than rejected. Later assignments override earlier ones.

use std::collections::HashMap;
use std::path::Path;

use tracing::debug;

use crate::error::{ConfigError, Result};

/// Parsed environment file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvFile {
    values: HashMap<String, String>,
}

impl EnvFile {
    /// Read `path`. A missing file yields an empty set of values.
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(contents) => {
                let file = Self::parse(&contents);
                debug!(path = %path.display(), keys = file.len(), "Loaded env file");
                Ok(file)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "Env file not found, using environment only");
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::ReadFile {
                path: path.to_path_buf(),
                source,
            }
            .into()),
        }
    }

    /// Parse file contents.
    #[must_use]
    pub fn parse(contents: &str) -> Self {
        let mut values = HashMap::new();
        for raw in contents.split('\n') {
            let line = raw.strip_suffix('\r').unwrap_or(raw);
            let trimmed = line.trim_start();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let assignment = trimmed
                .strip_prefix("export ")
                .map_or(trimmed, str::trim_start);
            let Some((key, value)) = assignment.split_once('=') else {
                continue;
            };
            if !is_valid_key(key) {
                continue;
            }
            values.insert(key.to_string(), unquote(value).to_string());
        }
        Self { values }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn is_valid_key(key: &str) -> bool {
    let mut chars = key.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Strip one layer of matching single or double quotes.
fn unquote(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == last && (first == b'"' || first == b'\'') {
            return &value[1..value.len() - 1];
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_assignment_wins() {
        let file = EnvFile::parse("POSTGRES_DB=first\nPOSTGRES_DB=second\n");
        assert_eq!(file.get("POSTGRES_DB"), Some("second"));
    }

    #[test]
    fn strips_crlf_and_one_quote_layer() {
        let file = EnvFile::parse(
            "BOT_TOKEN=\"abc:def\"\r\nPOSTGRES_USER='bot'\r\nNESTED=\"'inner'\"\r\nRAW=plain\r",
        );
        assert_eq!(file.get("BOT_TOKEN"), Some("abc:def"));
        assert_eq!(file.get("POSTGRES_USER"), Some("bot"));
        assert_eq!(file.get("NESTED"), Some("'inner'"));
        assert_eq!(file.get("RAW"), Some("plain"));
    }

    #[test]
    fn mismatched_quotes_are_kept() {
        let file = EnvFile::parse("A=\"open\nB='\n");
        assert_eq!(file.get("A"), Some("\"open"));
        assert_eq!(file.get("B"), Some("'"));
    }

    #[test]
    fn value_may_contain_equals() {
        let file = EnvFile::parse("DATABASE_URL=postgresql://u:p@db/x?sslmode=disable\n");
        assert_eq!(
            file.get("DATABASE_URL"),
            Some("postgresql://u:p@db/x?sslmode=disable")
        );
    }

    #[test]
    fn skips_comments_blank_and_malformed_lines() {
        let file = EnvFile::parse("# comment\n\n   \nnot an assignment\n1BAD=x\nBAD KEY=y\nOK=1\n");
        assert_eq!(file.len(), 1);
        assert_eq!(file.get("OK"), Some("1"));
    }

    #[test]
    fn accepts_export_prefix() {
        let file = EnvFile::parse("export BACKUP_DIR=/var/backups/bot\n");
        assert_eq!(file.get("BACKUP_DIR"), Some("/var/backups/bot"));
    }

    #[test]
    fn empty_value_is_present_but_empty() {
        let file = EnvFile::parse("ADMIN_TOPIC_ID=\n");
        assert_eq!(file.get("ADMIN_TOPIC_ID"), Some(""));
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = EnvFile::load(&dir.path().join("absent.env")).unwrap();
        assert!(file.is_empty());
    }

    #[test]
    fn loads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "BACKUP_RETENTION_DAYS=7\n").unwrap();
        let file = EnvFile::load(&path).unwrap();
        assert_eq!(file.get("BACKUP_RETENTION_DAYS"), Some("7"));
    }
}
