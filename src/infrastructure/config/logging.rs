//! Logging configuration and initialization.

use tracing_subscriber::{fmt, EnvFilter};

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl LoggingConfig {
    /// Derive the level from CLI verbosity flags.
    ///
    /// `PGKEEP_LOG_FORMAT=json` selects JSON lines even without `--json`.
    #[must_use]
    pub fn from_flags(verbose: u8, quiet: bool, json: bool) -> Self {
        let level = match (quiet, verbose) {
            (true, _) => "error",
            (false, 0) => "warn",
            (false, 1) => "info",
            (false, 2) => "debug",
            (false, _) => "trace",
        };
        let json_env = std::env::var("PGKEEP_LOG_FORMAT")
            .map(|v| v.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        Self {
            level: level.to_string(),
            format: if json || json_env {
                LogFormat::Json
            } else {
                LogFormat::Pretty
            },
        }
    }

    /// Initialize the tracing subscriber. `RUST_LOG` overrides the level.
    ///
    /// Logs are written to stderr so stdout stays clean for command output.
    pub fn init(&self) {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level));

        let builder = fmt().with_env_filter(filter).with_writer(std::io::stderr);
        // A subscriber may already be installed (tests); that is fine.
        let _ = match self.format {
            LogFormat::Json => builder.json().try_init(),
            LogFormat::Pretty => builder.try_init(),
        };
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".into(),
            format: LogFormat::Pretty,
        }
    }
}
