//! Telegram Bot API client.
//!
//! Talks to `sendMessage` (form-encoded) and `sendDocument` (multipart)
//! directly over reqwest. The API base URL is configurable so a local Bot API
//! server or a test double can stand in for `api.telegram.org`.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::debug;

use crate::domain::ChatTarget;
use crate::error::{Error, Result};
use crate::port::ChatApi;

const MESSAGE_TIMEOUT: Duration = Duration::from_secs(60);
const UPLOAD_TIMEOUT: Duration = Duration::from_secs(300);

/// Error body returned by the Bot API on failure.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// reqwest-backed [`ChatApi`] for the Telegram Bot API.
#[derive(Debug, Clone)]
pub struct TelegramApi {
    client: reqwest::Client,
    base_url: String,
}

impl TelegramApi {
    /// Create a client for the Bot API at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("pgkeep/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// URL of a Bot API method for `token`.
    #[must_use]
    pub fn endpoint(&self, token: &str, method: &str) -> String {
        format!("{}/bot{token}/{method}", self.base_url)
    }
}

#[async_trait]
impl ChatApi for TelegramApi {
    async fn send_message(&self, target: &ChatTarget, text: &str) -> Result<()> {
        let mut form = vec![
            ("chat_id", target.chat_id.to_string()),
            ("text", text.to_string()),
            ("disable_web_page_preview", "true".to_string()),
        ];
        if let Some(thread_id) = target.thread_id {
            form.push(("message_thread_id", thread_id.to_string()));
        }

        let response = self
            .client
            .post(self.endpoint(&target.bot_token, "sendMessage"))
            .form(&form)
            .timeout(MESSAGE_TIMEOUT)
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;
        check_response(response).await?;
        debug!(chat_id = target.chat_id, "Telegram message sent");
        Ok(())
    }

    async fn send_document(
        &self,
        target: &ChatTarget,
        document: &Path,
        caption: &str,
    ) -> Result<()> {
        let bytes = tokio::fs::read(document).await?;
        let file_name = document
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "backup.sql.gz".to_string());
        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("application/gzip")?;

        let mut form = Form::new()
            .text("chat_id", target.chat_id.to_string())
            .text("caption", caption.to_string())
            .part("document", part);
        if let Some(thread_id) = target.thread_id {
            form = form.text("message_thread_id", thread_id.to_string());
        }

        let response = self
            .client
            .post(self.endpoint(&target.bot_token, "sendDocument"))
            .multipart(form)
            .timeout(UPLOAD_TIMEOUT)
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;
        check_response(response).await?;
        debug!(chat_id = target.chat_id, path = %document.display(), "Telegram document sent");
        Ok(())
    }
}

/// Map a non-success response to [`Error::Delivery`] with the API's reason.
async fn check_response(response: reqwest::Response) -> Result<()> {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    if status.is_success() {
        if let Ok(parsed) = serde_json::from_str::<ApiResponse>(&body) {
            if !parsed.ok {
                return Err(Error::Delivery(describe(status, &parsed, &body)));
            }
        }
        return Ok(());
    }
    let reason = match serde_json::from_str::<ApiResponse>(&body) {
        Ok(parsed) => describe(status, &parsed, &body),
        Err(_) => format!("{status}: {}", truncate(&body, 200)),
    };
    Err(Error::Delivery(reason))
}

fn describe(status: reqwest::StatusCode, parsed: &ApiResponse, body: &str) -> String {
    match &parsed.description {
        Some(description) => format!("{status}: {description}"),
        None => format!("{status}: {}", truncate(body, 200)),
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars).collect();
    out.push('…');
    out
}
