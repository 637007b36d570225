//! Dump source port.

use std::path::Path;

use async_trait::async_trait;

use crate::error::Result;

/// Something that can write a gzip-compressed database dump to a file.
#[async_trait]
pub trait DumpSource: Send + Sync {
    /// Human-readable description for logs, e.g. `postgres tradebot@db`.
    fn describe(&self) -> String;

    /// Whether there is anything to dump.
    ///
    /// Returning `false` ends the run early without an artifact.
    fn has_data(&self) -> bool {
        true
    }

    /// Write the compressed dump to `destination`, creating the file.
    ///
    /// On failure the partially written file is left in place.
    async fn write_compressed(&self, destination: &Path) -> Result<()>;
}
