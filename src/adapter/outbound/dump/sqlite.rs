//! SQLite database file dumped with the `sqlite3` CLI.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::command::CommandDump;
use crate::error::Result;
use crate::port::DumpSource;

/// Dumps a SQLite file as SQL text via `sqlite3 <path> .dump`.
///
/// A missing database file means there is nothing to back up yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqliteDump {
    path: PathBuf,
    command: CommandDump,
}

impl SqliteDump {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        let args = [path.display().to_string(), ".dump".to_string()];
        let command = CommandDump::new("sqlite3", args);
        Self { path, command }
    }

    /// Use a different dump command for the same file.
    #[must_use]
    pub fn with_command(path: PathBuf, command: CommandDump) -> Self {
        Self { path, command }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl DumpSource for SqliteDump {
    fn describe(&self) -> String {
        format!("sqlite {}", self.path.display())
    }

    fn has_data(&self) -> bool {
        self.path.is_file()
    }

    async fn write_compressed(&self, destination: &Path) -> Result<()> {
        self.command.run_into(destination).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_has_no_data() {
        let dir = tempfile::tempdir().unwrap();
        let dump = SqliteDump::new(dir.path().join("bot.db"));
        assert!(!dump.has_data());
    }

    #[test]
    fn existing_file_has_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bot.db");
        std::fs::write(&path, b"SQLite format 3\0").unwrap();
        let dump = SqliteDump::new(path.clone());
        assert!(dump.has_data());
        assert_eq!(dump.describe(), format!("sqlite {}", path.display()));
    }

    #[test]
    fn default_command_uses_sqlite3_dump() {
        let dump = SqliteDump::new(PathBuf::from("data/bot.db"));
        assert_eq!(dump.command.command_line(), "sqlite3 data/bot.db .dump");
    }
}
