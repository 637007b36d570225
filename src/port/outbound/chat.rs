//! Chat port for backup notifications.

use std::path::Path;

use async_trait::async_trait;

use crate::domain::ChatTarget;
use crate::error::Result;

/// Minimal chat API used by the notifier and uploader.
///
/// Implementations report transport and API failures as errors. Swallowing
/// them is the caller's decision, not the adapter's.
#[async_trait]
pub trait ChatApi: Send + Sync {
    /// Post a plain-text message.
    async fn send_message(&self, target: &ChatTarget, text: &str) -> Result<()>;

    /// Post a file as a document attachment with a caption.
    async fn send_document(&self, target: &ChatTarget, document: &Path, caption: &str)
        -> Result<()>;
}
