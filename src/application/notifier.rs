//! Best-effort chat notifications.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::{ChatTarget, Delivery};
use crate::port::ChatApi;

/// Sends messages and documents to the configured chat.
///
/// Never fails: a missing target yields [`Delivery::Skipped`] without any
/// network call, and API or transport errors become [`Delivery::Failed`].
#[derive(Clone)]
pub struct Notifier {
    api: Arc<dyn ChatApi>,
    target: Option<ChatTarget>,
}

impl Notifier {
    #[must_use]
    pub fn new(api: Arc<dyn ChatApi>, target: Option<ChatTarget>) -> Self {
        Self { api, target }
    }

    /// Whether a bot token and chat ID are configured.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.target.is_some()
    }

    #[must_use]
    pub fn target(&self) -> Option<&ChatTarget> {
        self.target.as_ref()
    }

    /// Post `text` to the chat.
    pub async fn notify(&self, text: &str) -> Delivery {
        let Some(target) = &self.target else {
            debug!("Telegram not configured, skipping message");
            return Delivery::Skipped;
        };
        match self.api.send_message(target, text).await {
            Ok(()) => Delivery::Delivered,
            Err(e) => {
                warn!(error = %e, chat_id = target.chat_id, "Failed to send Telegram message");
                Delivery::Failed(e.to_string())
            }
        }
    }

    /// Post `path` as a document with `caption`.
    pub async fn send_document(&self, path: &Path, caption: &str) -> Delivery {
        let Some(target) = &self.target else {
            debug!("Telegram not configured, skipping document");
            return Delivery::Skipped;
        };
        match self.api.send_document(target, path, caption).await {
            Ok(()) => Delivery::Delivered,
            Err(e) => {
                warn!(
                    error = %e,
                    chat_id = target.chat_id,
                    path = %path.display(),
                    "Failed to send Telegram document"
                );
                Delivery::Failed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::chat::{target, ChatCall, RecordingChat};

    #[tokio::test]
    async fn delivers_when_configured() {
        let chat = RecordingChat::new();
        let notifier = Notifier::new(Arc::new(chat.clone()), Some(target()));

        assert_eq!(notifier.notify("hello").await, Delivery::Delivered);
        assert_eq!(
            chat.calls(),
            vec![ChatCall::Message {
                chat_id: target().chat_id,
                text: "hello".into(),
            }]
        );
    }

    #[tokio::test]
    async fn skips_without_network_when_unconfigured() {
        let chat = RecordingChat::new();
        let notifier = Notifier::new(Arc::new(chat.clone()), None);

        assert_eq!(notifier.notify("hello").await, Delivery::Skipped);
        assert_eq!(
            notifier
                .send_document(Path::new("/tmp/x.sql.gz"), "caption")
                .await,
            Delivery::Skipped
        );
        assert!(chat.calls().is_empty());
        assert!(!notifier.is_configured());
    }

    #[tokio::test]
    async fn swallows_api_failures() {
        let chat = RecordingChat::failing();
        let notifier = Notifier::new(Arc::new(chat.clone()), Some(target()));

        match notifier.notify("hello").await {
            Delivery::Failed(reason) => assert!(reason.contains("chat not found")),
            other => panic!("expected a failed delivery, got {other:?}"),
        }
        assert_eq!(chat.len(), 1);
    }
}
