//! System crontab via the `crontab` binary.

use std::io::Write;
use std::process::{Command, Stdio};

use crate::error::{Error, Result};
use crate::port::CrontabStore;

/// The invoking user's crontab, read with `crontab -l` and replaced with `crontab -`.
#[derive(Debug, Clone, Default)]
pub struct SystemCrontab;

impl CrontabStore for SystemCrontab {
    fn read(&self) -> Result<String> {
        let output = Command::new("crontab")
            .arg("-l")
            .stdin(Stdio::null())
            .output()
            .map_err(|e| Error::Crontab(format!("failed to run crontab -l: {e}")))?;

        if output.status.success() {
            return Ok(String::from_utf8_lossy(&output.stdout).into_owned());
        }

        // `crontab -l` exits 1 with "no crontab for <user>" when none exists.
        let stderr = String::from_utf8_lossy(&output.stderr);
        if stderr.to_ascii_lowercase().contains("no crontab") {
            return Ok(String::new());
        }
        Err(Error::Crontab(format!(
            "crontab -l failed: {}",
            stderr.trim()
        )))
    }

    fn write(&self, contents: &str) -> Result<()> {
        let mut child = Command::new("crontab")
            .arg("-")
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::Crontab(format!("failed to run crontab -: {e}")))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(contents.as_bytes())?;
        }

        let output = child.wait_with_output()?;
        if output.status.success() {
            Ok(())
        } else {
            Err(Error::Crontab(format!(
                "crontab - failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )))
        }
    }
}
