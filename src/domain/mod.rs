//! Domain types shared by every backup stage.
//!
//! Nothing here performs I/O. Artifacts are named and parsed here, delivery
//! results are classified here, and the per-run outcome lives here so that
//! adapters and the CLI agree on one vocabulary.

pub mod artifact;
pub mod delivery;
pub mod outcome;

pub use artifact::{ArtifactName, BackupArtifact, ARTIFACT_EXTENSION, TIMESTAMP_FORMAT};
pub use delivery::{ChatTarget, Delivery, UploadOutcome};
pub use outcome::{PruneReport, RunOutcome, RunReport, Stage};
