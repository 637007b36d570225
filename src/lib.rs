//! pgkeep - scheduled database backups with retention and Telegram delivery.
//!
//! One run dumps the bot's database through `pg_dump` inside its compose
//! service (or `sqlite3` for a SQLite deployment), gzips the output into a
//! timestamped artifact, prunes artifacts older than the retention window and
//! reports to a Telegram chat. Failures are reported exactly once; delivery
//! problems never fail a run.
//!
//! # Modules
//!
//! - [`domain`] - Artifact naming, delivery results and run outcomes
//! - [`port`] - Traits for the dump source, chat API and crontab
//! - [`application`] - Backup run, retention, notifier, uploader, cron plan
//! - [`adapter`] - CLI (inbound) plus process, Telegram and crontab adapters
//! - [`infrastructure`] - Env file parsing, settings and logging setup
//! - [`error`] - Error types for the crate
//! - `testkit` - Test doubles and fixtures (tests and the `testkit` feature)
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use pgkeep::adapter::outbound::{dump, TelegramApi};
//! use pgkeep::application::{BackupJob, JobOptions, Notifier};
//! use pgkeep::infrastructure::config::Settings;
//!
//! # async fn run() -> pgkeep::error::Result<()> {
//! let settings = Settings::load(".env".as_ref())?;
//! let api = TelegramApi::new(settings.telegram.api_url.as_str())?;
//! let notifier = Notifier::new(Arc::new(api), settings.telegram.target.clone());
//! let source = dump::from_settings(&settings);
//!
//! let report = BackupJob::new(&settings, source.as_ref(), &notifier, JobOptions::default())
//!     .execute(chrono::Utc::now())
//!     .await?;
//! println!("{:?}", report.artifact);
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
