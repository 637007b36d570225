//! Best-effort delivery results.

use std::fmt;

/// Where chat messages go.
#[derive(Clone, PartialEq, Eq)]
pub struct ChatTarget {
    /// Bot API token obtained from BotFather.
    pub bot_token: String,
    /// Target chat ID.
    pub chat_id: i64,
    /// Forum topic inside the chat, if any.
    pub thread_id: Option<i64>,
}

impl fmt::Debug for ChatTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatTarget")
            .field("bot_token", &mask_token(&self.bot_token))
            .field("chat_id", &self.chat_id)
            .field("thread_id", &self.thread_id)
            .finish()
    }
}

/// Shorten a bot token for display.
#[must_use]
pub fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() >= 15 {
        let head: String = chars[..10].iter().collect();
        let tail: String = chars[chars.len() - 5..].iter().collect();
        format!("{head}...{tail}")
    } else {
        let head: String = chars.iter().take(10).collect();
        format!("{head}...")
    }
}

/// Result of one best-effort chat call.
///
/// Delivery never fails a run; this type records what happened so callers
/// and tests can tell the cases apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// The API accepted the request.
    Delivered,
    /// No bot token or chat ID configured; nothing was sent.
    Skipped,
    /// The request was attempted and failed.
    Failed(String),
}

impl Delivery {
    #[must_use]
    pub const fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered)
    }

    /// Short label for logs and JSON output.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Delivered => "delivered",
            Self::Skipped => "skipped",
            Self::Failed(_) => "failed",
        }
    }
}

/// Result of trying to attach an artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// The artifact was within the size ceiling and the upload was attempted.
    Sent(Delivery),
    /// The artifact exceeded the ceiling; a text notice was sent instead.
    TooLarge { size_bytes: u64, notice: Delivery },
}

impl UploadOutcome {
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Sent(delivery) => delivery.label(),
            Self::TooLarge { .. } => "too_large",
        }
    }
}
