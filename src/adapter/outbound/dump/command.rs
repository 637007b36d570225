//! External dump command piped through gzip.

use std::io::{BufWriter, Write};
use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use flate2::write::GzEncoder;
use flate2::Compression;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::error::{BackupError, Result};
use crate::port::DumpSource;

const STDERR_TAIL_CHARS: usize = 500;
const READ_CHUNK: usize = 64 * 1024;
const WRITE_QUEUE: usize = 16;

/// Runs `program args...` and writes its gzip-compressed stdout to the artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandDump {
    program: String,
    args: Vec<String>,
}

impl CommandDump {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// The command line as it would be typed in a shell.
    #[must_use]
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Spawn the command and stream its stdout into `destination`.
    ///
    /// Compression and file writes run on a blocking thread fed through a
    /// bounded channel, so the runtime only ever awaits the child's pipes.
    pub async fn run_into(&self, destination: &Path) -> Result<()> {
        let write_err = |source| BackupError::Write {
            path: destination.to_path_buf(),
            source,
        };

        let file = tokio::fs::File::create(destination)
            .await
            .map_err(write_err)?
            .into_std()
            .await;

        debug!(command = %self.command_line(), "Spawning dump command");
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| BackupError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let mut stdout = child.stdout.take().ok_or_else(|| {
            write_err(std::io::Error::other("dump command stdout was not captured"))
        })?;
        let mut stderr = child.stderr.take().ok_or_else(|| {
            write_err(std::io::Error::other("dump command stderr was not captured"))
        })?;

        // Drain stderr concurrently so a chatty dump cannot fill the pipe and stall.
        let stderr_task = tokio::spawn(async move {
            let mut buf = Vec::new();
            let _ = stderr.read_to_end(&mut buf).await;
            buf
        });

        let (chunks, mut received) = mpsc::channel::<Vec<u8>>(WRITE_QUEUE);
        let writer = tokio::task::spawn_blocking(move || -> std::io::Result<()> {
            let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
            while let Some(chunk) = received.blocking_recv() {
                encoder.write_all(&chunk)?;
            }
            encoder.finish()?.flush()
        });

        let mut chunk = vec![0u8; READ_CHUNK];
        let mut raw_bytes: u64 = 0;
        loop {
            let n = stdout.read(&mut chunk).await?;
            if n == 0 {
                break;
            }
            raw_bytes += n as u64;
            if chunks.send(chunk[..n].to_vec()).await.is_err() {
                // The writer gave up; its error is reported below.
                let _ = child.start_kill();
                break;
            }
        }
        drop(chunks);

        let status = child.wait().await?;
        let stderr = stderr_task.await.unwrap_or_default();
        writer
            .await
            .map_err(|e| write_err(std::io::Error::other(e)))?
            .map_err(write_err)?;

        if !status.success() {
            return Err(BackupError::DumpFailed {
                code: status.code(),
                stderr: stderr_tail(&stderr),
            }
            .into());
        }

        info!(raw_bytes, path = %destination.display(), "Dump written");
        Ok(())
    }
}

#[async_trait]
impl DumpSource for CommandDump {
    fn describe(&self) -> String {
        self.command_line()
    }

    async fn write_compressed(&self, destination: &Path) -> Result<()> {
        self.run_into(destination).await
    }
}

/// `pg_dump` executed inside the database's docker compose service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposeDump {
    user: String,
    database: String,
    service: String,
    command: CommandDump,
}

impl ComposeDump {
    #[must_use]
    pub fn new(user: &str, database: &str, service: &str, compose_file: Option<&Path>) -> Self {
        let mut args: Vec<String> = vec!["compose".into()];
        if let Some(file) = compose_file {
            args.push("-f".into());
            args.push(file.display().to_string());
        }
        args.extend(
            ["exec", "-T", service, "pg_dump", "-U", user, database]
                .into_iter()
                .map(String::from),
        );
        Self {
            user: user.to_string(),
            database: database.to_string(),
            service: service.to_string(),
            command: CommandDump::new("docker", args),
        }
    }

    #[must_use]
    pub fn command(&self) -> &CommandDump {
        &self.command
    }
}

#[async_trait]
impl DumpSource for ComposeDump {
    fn describe(&self) -> String {
        format!("postgres {}@{} ({})", self.database, self.service, self.user)
    }

    async fn write_compressed(&self, destination: &Path) -> Result<()> {
        self.command.run_into(destination).await
    }
}

fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let text = text.trim();
    let count = text.chars().count();
    if count <= STDERR_TAIL_CHARS {
        return text.to_string();
    }
    text.chars().skip(count - STDERR_TAIL_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use flate2::read::GzDecoder;
    use std::fs::File;
    use std::io::Read;

    fn sh(script: &str) -> CommandDump {
        CommandDump::new("sh", ["-c", script])
    }

    fn gunzip(path: &Path) -> String {
        let mut out = String::new();
        GzDecoder::new(File::open(path).unwrap())
            .read_to_string(&mut out)
            .unwrap();
        out
    }

    #[test]
    fn compose_command_line() {
        let dump = ComposeDump::new("bot", "tradebot", "db", None);
        assert_eq!(
            dump.command().command_line(),
            "docker compose exec -T db pg_dump -U bot tradebot"
        );

        let compose_file = Path::new("/srv/bot/compose.yml");
        let dump = ComposeDump::new("bot", "tradebot", "pg", Some(compose_file));
        assert_eq!(
            dump.command().command_line(),
            "docker compose -f /srv/bot/compose.yml exec -T pg pg_dump -U bot tradebot"
        );
        assert_eq!(dump.describe(), "postgres tradebot@pg (bot)");
    }

    #[tokio::test]
    async fn stdout_is_compressed_into_destination() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.sql.gz");

        sh("printf 'CREATE TABLE t (id int);\\n'")
            .write_compressed(&path)
            .await
            .unwrap();

        assert_eq!(gunzip(&path), "CREATE TABLE t (id int);\n");
    }

    #[tokio::test]
    async fn output_larger_than_the_write_queue_is_kept_whole() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.sql.gz");

        sh("yes 'INSERT INTO t VALUES (1);' | head -n 200000")
            .write_compressed(&path)
            .await
            .unwrap();

        let text = gunzip(&path);
        assert_eq!(text.lines().count(), 200_000);
        assert!(text.lines().all(|line| line == "INSERT INTO t VALUES (1);"));
    }

    #[tokio::test]
    async fn nonzero_exit_reports_code_and_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.sql.gz");

        let err = sh("echo 'pg_dump: error: connection refused' >&2; exit 3")
            .write_compressed(&path)
            .await
            .unwrap_err();

        match err {
            Error::Backup(BackupError::DumpFailed { code, stderr }) => {
                assert_eq!(code, Some(3));
                assert!(stderr.contains("connection refused"));
            }
            other => panic!("expected DumpFailed, got {other}"),
        }
        assert!(path.exists(), "partial artifact is left in place");
    }

    #[tokio::test]
    async fn missing_program_is_a_spawn_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = CommandDump::new("pgkeep-definitely-not-a-binary", Vec::<String>::new())
            .write_compressed(&dir.path().join("x.sql.gz"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Backup(BackupError::Spawn { .. })));
    }

    #[test]
    fn stderr_tail_keeps_the_end() {
        let long = "x".repeat(1000) + "END";
        let tail = stderr_tail(long.as_bytes());
        assert_eq!(tail.chars().count(), STDERR_TAIL_CHARS);
        assert!(tail.ends_with("END"));
    }
}
