//! Artifact upload with a size ceiling.

use tracing::info;

use super::notifier::Notifier;
use crate::domain::artifact::format_size;
use crate::domain::{BackupArtifact, UploadOutcome};

/// Largest artifact attached to the chat: 45 MiB.
///
/// The Bot API rejects documents over 50 MB; multipart overhead and caption
/// need headroom.
pub const MAX_UPLOAD_BYTES: u64 = 45 * 1024 * 1024;

/// Attaches artifacts to the chat, or explains why it did not.
pub struct Uploader<'a> {
    notifier: &'a Notifier,
    host_label: &'a str,
    limit_bytes: u64,
}

impl<'a> Uploader<'a> {
    #[must_use]
    pub fn new(notifier: &'a Notifier, host_label: &'a str) -> Self {
        Self {
            notifier,
            host_label,
            limit_bytes: MAX_UPLOAD_BYTES,
        }
    }

    /// Override the size ceiling.
    #[must_use]
    pub fn with_limit(mut self, limit_bytes: u64) -> Self {
        self.limit_bytes = limit_bytes;
        self
    }

    /// Upload `artifact`, or send a size notice if it exceeds the ceiling.
    pub async fn upload(&self, artifact: &BackupArtifact) -> UploadOutcome {
        if artifact.size_bytes > self.limit_bytes {
            info!(
                size_bytes = artifact.size_bytes,
                limit_bytes = self.limit_bytes,
                "Artifact too large to attach"
            );
            let notice = self.notifier.notify(&self.too_large_message(artifact)).await;
            return UploadOutcome::TooLarge {
                size_bytes: artifact.size_bytes,
                notice,
            };
        }

        let caption = self.caption(artifact);
        UploadOutcome::Sent(self.notifier.send_document(&artifact.path, &caption).await)
    }

    fn caption(&self, artifact: &BackupArtifact) -> String {
        format!(
            "DB backup {} {} UTC",
            self.host_label,
            artifact.created_at().format("%Y-%m-%d %H:%M:%S")
        )
    }

    fn too_large_message(&self, artifact: &BackupArtifact) -> String {
        format!(
            "Backup on {} is too large to attach ({} > {}): {}",
            self.host_label,
            artifact.display_size(),
            format_size(self.limit_bytes),
            artifact.path.display()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ArtifactName, Delivery};
    use crate::testkit::chat::{target, ChatCall, RecordingChat};
    use chrono::TimeZone;
    use std::path::PathBuf;
    use std::sync::Arc;

    fn artifact(size_bytes: u64) -> BackupArtifact {
        let created_at = chrono::Utc.with_ymd_and_hms(2025, 3, 1, 3, 0, 0).unwrap();
        let name = ArtifactName::new("tradebot", created_at);
        BackupArtifact {
            path: PathBuf::from("/var/backups").join(name.file_name()),
            name,
            size_bytes,
        }
    }

    #[tokio::test]
    async fn uploads_within_ceiling() {
        let chat = RecordingChat::new();
        let notifier = Notifier::new(Arc::new(chat.clone()), Some(target()));
        let uploader = Uploader::new(&notifier, "vps-1");

        let outcome = uploader.upload(&artifact(MAX_UPLOAD_BYTES)).await;

        assert_eq!(outcome, UploadOutcome::Sent(Delivery::Delivered));
        assert_eq!(
            chat.calls(),
            vec![ChatCall::Document {
                chat_id: target().chat_id,
                path: PathBuf::from("/var/backups/tradebot_20250301_030000.sql.gz"),
                caption: "DB backup vps-1 2025-03-01 03:00:00 UTC".into(),
            }]
        );
    }

    #[tokio::test]
    async fn oversized_artifact_sends_one_notice_and_no_document() {
        let chat = RecordingChat::new();
        let notifier = Notifier::new(Arc::new(chat.clone()), Some(target()));
        let uploader = Uploader::new(&notifier, "vps-1");

        let outcome = uploader.upload(&artifact(MAX_UPLOAD_BYTES + 1)).await;

        assert_eq!(
            outcome,
            UploadOutcome::TooLarge {
                size_bytes: MAX_UPLOAD_BYTES + 1,
                notice: Delivery::Delivered,
            }
        );
        let calls = chat.calls();
        assert_eq!(calls.len(), 1);
        let ChatCall::Message { text, .. } = &calls[0] else {
            panic!("expected a text notice, got {calls:?}");
        };
        assert!(text.contains("45.0 MiB"));
        assert!(text.contains("/var/backups/tradebot_20250301_030000.sql.gz"));
    }

    #[tokio::test]
    async fn unconfigured_upload_is_skipped() {
        let chat = RecordingChat::new();
        let notifier = Notifier::new(Arc::new(chat.clone()), None);

        let outcome = Uploader::new(&notifier, "vps-1").upload(&artifact(10)).await;

        assert_eq!(outcome, UploadOutcome::Sent(Delivery::Skipped));
        assert!(chat.calls().is_empty());
    }

    #[tokio::test]
    async fn custom_limit_applies() {
        let chat = RecordingChat::new();
        let notifier = Notifier::new(Arc::new(chat.clone()), Some(target()));

        let outcome = Uploader::new(&notifier, "vps-1")
            .with_limit(100)
            .upload(&artifact(101))
            .await;

        assert!(matches!(outcome, UploadOutcome::TooLarge { size_bytes: 101, .. }));
    }
}
