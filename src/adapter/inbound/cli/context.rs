//! Shared setup for command handlers.

use std::path::Path;
use std::sync::Arc;

use crate::adapter::outbound::TelegramApi;
use crate::application::Notifier;
use crate::error::Result;
use crate::infrastructure::config::Settings;

/// Resolve settings from `env_file` and the process environment.
pub fn load_settings(env_file: &Path) -> Result<Settings> {
    Settings::load(env_file)
}

/// Notifier backed by the Telegram Bot API.
pub fn notifier(settings: &Settings) -> Result<Notifier> {
    let api = TelegramApi::new(settings.telegram.api_url.as_str())?;
    Ok(Notifier::new(Arc::new(api), settings.telegram.target.clone()))
}
