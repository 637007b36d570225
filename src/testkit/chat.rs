use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::domain::ChatTarget;
use crate::error::{Error, Result};
use crate::port::ChatApi;

/// A chat call as seen by the port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCall {
    Message { chat_id: i64, text: String },
    Document { chat_id: i64, path: PathBuf, caption: String },
}

/// Thread-safe chat double that records every call.
///
/// Clones share the same call log, so a test can keep one handle and give
/// the other to a [`Notifier`](crate::application::Notifier).
#[derive(Clone, Default)]
pub struct RecordingChat {
    calls: Arc<Mutex<Vec<ChatCall>>>,
    fail: bool,
}

impl RecordingChat {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call fails after being recorded.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<ChatCall> {
        self.calls.lock().expect("lock chat calls").clone()
    }

    pub fn len(&self) -> usize {
        self.calls.lock().expect("lock chat calls").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn messages(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ChatCall::Message { text, .. } => Some(text),
                ChatCall::Document { .. } => None,
            })
            .collect()
    }

    pub fn documents(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, ChatCall::Document { .. }))
            .count()
    }

    fn record(&self, call: ChatCall) -> Result<()> {
        self.calls.lock().expect("lock chat calls").push(call);
        if self.fail {
            Err(Error::Delivery("Bad Request: chat not found".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ChatApi for RecordingChat {
    async fn send_message(&self, target: &ChatTarget, text: &str) -> Result<()> {
        self.record(ChatCall::Message {
            chat_id: target.chat_id,
            text: text.to_string(),
        })
    }

    async fn send_document(
        &self,
        target: &ChatTarget,
        document: &Path,
        caption: &str,
    ) -> Result<()> {
        self.record(ChatCall::Document {
            chat_id: target.chat_id,
            path: document.to_path_buf(),
            caption: caption.to_string(),
        })
    }
}

/// A fully configured chat target in a forum topic.
pub fn target() -> ChatTarget {
    ChatTarget {
        bot_token: "123456789:ABCdefGHIjklMNOpqr".into(),
        chat_id: -1001234567890,
        thread_id: Some(42),
    }
}
