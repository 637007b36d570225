//! Application services (use cases).
//!
//! These services orchestrate the domain types and drive the outbound ports
//! to implement a backup run, retention, delivery and scheduling.

pub mod notifier;
pub mod producer;
pub mod retention;
pub mod runner;
pub mod schedule;
pub mod uploader;

pub use notifier::Notifier;
pub use producer::DumpProducer;
pub use retention::{RetentionPolicy, StoredArtifact};
pub use runner::{BackupJob, BackupRunner, JobOptions, JobReport};
pub use schedule::{CronEntry, CronPlan, CronVariant, InstallReport};
pub use uploader::{Uploader, MAX_UPLOAD_BYTES};
