//! Dump production and verification.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use flate2::read::GzDecoder;
use tracing::{debug, info};

use crate::domain::{ArtifactName, BackupArtifact};
use crate::error::{BackupError, Result};
use crate::port::DumpSource;

/// Writes one timestamped artifact per run into the backup directory.
pub struct DumpProducer<'a> {
    backup_dir: &'a Path,
    prefix: &'a str,
}

impl<'a> DumpProducer<'a> {
    #[must_use]
    pub fn new(backup_dir: &'a Path, prefix: &'a str) -> Self {
        Self { backup_dir, prefix }
    }

    /// Name of the artifact a run started at `started_at` produces.
    #[must_use]
    pub fn plan(&self, started_at: DateTime<Utc>) -> (ArtifactName, PathBuf) {
        let name = ArtifactName::new(self.prefix, started_at);
        let path = name.path_in(self.backup_dir);
        (name, path)
    }

    /// Create the backup directory and write the dump for `name`.
    pub async fn produce(
        &self,
        source: &dyn DumpSource,
        name: ArtifactName,
    ) -> Result<BackupArtifact> {
        tokio::fs::create_dir_all(self.backup_dir)
            .await
            .map_err(|source| BackupError::Directory {
                path: self.backup_dir.to_path_buf(),
                source,
            })?;

        let path = name.path_in(self.backup_dir);
        info!(source = %source.describe(), path = %path.display(), "Dumping database");
        source.write_compressed(&path).await?;

        let size_bytes = tokio::fs::metadata(&path)
            .await
            .map_err(|source| BackupError::Write {
                path: path.clone(),
                source,
            })?
            .len();
        debug!(size_bytes, "Artifact size");

        Ok(BackupArtifact {
            name,
            path,
            size_bytes,
        })
    }
}

/// Decode the whole artifact to prove the gzip stream is intact.
///
/// Returns the uncompressed size.
pub async fn verify(artifact: &BackupArtifact) -> Result<u64> {
    let path = artifact.path.clone();
    let checked = path.clone();
    let result = tokio::task::spawn_blocking(move || decode_all(&checked))
        .await
        .map_err(|e| std::io::Error::other(e.to_string()))?;

    match result {
        Ok(bytes) => {
            debug!(uncompressed_bytes = bytes, path = %path.display(), "Artifact verified");
            Ok(bytes)
        }
        Err(source) => Err(BackupError::Corrupt { path, source }.into()),
    }
}

fn decode_all(path: &Path) -> std::io::Result<u64> {
    let file = File::open(path)?;
    let mut decoder = GzDecoder::new(BufReader::new(file));
    std::io::copy(&mut decoder, &mut std::io::sink())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::outbound::dump::CommandDump;
    use crate::error::Error;
    use chrono::TimeZone;

    fn started() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 3, 15, 0).unwrap()
    }

    #[tokio::test]
    async fn produces_artifact_in_nested_directory() {
        let dir = tempfile::tempdir().unwrap();
        let backup_dir = dir.path().join("var").join("backups");
        let producer = DumpProducer::new(&backup_dir, "tradebot");
        let (name, planned) = producer.plan(started());

        let source = CommandDump::new("sh", ["-c", "echo 'SELECT 1;'"]);
        let artifact = producer.produce(&source, name).await.unwrap();

        assert_eq!(artifact.path, planned);
        assert_eq!(
            artifact.path,
            backup_dir.join("tradebot_20250301_031500.sql.gz")
        );
        assert!(artifact.size_bytes > 0);
        assert_eq!(verify(&artifact).await.unwrap(), "SELECT 1;\n".len() as u64);
    }

    #[tokio::test]
    async fn failed_dump_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let producer = DumpProducer::new(dir.path(), "db");
        let (name, _) = producer.plan(started());

        let source = CommandDump::new("sh", ["-c", "exit 7"]);
        let err = producer.produce(&source, name).await.unwrap_err();

        assert_eq!(err.exit_code(), 7);
    }

    #[tokio::test]
    async fn verify_rejects_non_gzip() {
        let dir = tempfile::tempdir().unwrap();
        let name = ArtifactName::new("db", started());
        let path = name.path_in(dir.path());
        std::fs::write(&path, b"definitely not gzip").unwrap();
        let artifact = BackupArtifact {
            name,
            path,
            size_bytes: 19,
        };

        let err = verify(&artifact).await.unwrap_err();
        assert!(matches!(err, Error::Backup(BackupError::Corrupt { .. })));
    }

    #[tokio::test]
    async fn verify_rejects_truncated_gzip() {
        let dir = tempfile::tempdir().unwrap();
        let producer = DumpProducer::new(dir.path(), "db");
        let (name, _) = producer.plan(started());
        let source = CommandDump::new("sh", ["-c", "seq 1 20000"]);
        let artifact = producer.produce(&source, name).await.unwrap();

        let bytes = std::fs::read(&artifact.path).unwrap();
        std::fs::write(&artifact.path, &bytes[..bytes.len() / 2]).unwrap();

        assert!(verify(&artifact).await.is_err());
    }
}
