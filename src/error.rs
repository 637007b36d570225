use std::path::PathBuf;

use thiserror::Error;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read env file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failures of the dump pipeline. Every variant aborts the run.
#[derive(Error, Debug)]
pub enum BackupError {
    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("dump command exited with {}: {stderr}", describe_code(.code))]
    DumpFailed { code: Option<i32>, stderr: String },

    #[error("cannot prepare backup directory {path}: {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write artifact {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("artifact {path} failed gzip verification: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "a signal".to_string(),
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Backup(#[from] BackupError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("crontab error: {0}")]
    Crontab(String),

    #[error("delivery failed: {0}")]
    Delivery(String),
}

impl Error {
    /// Process exit status for this error.
    ///
    /// A failed dump exits with the dump command's own status so that cron
    /// mail and wrapper scripts see the same code `pg_dump` returned.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Backup(BackupError::DumpFailed {
                code: Some(code), ..
            }) if *code != 0 => *code,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
