use std::path::Path;

use serde_json::json;

use crate::adapter::inbound::cli::{context, output};
use crate::domain::delivery::mask_token;
use crate::domain::Delivery;
use crate::error::{Error, Result};

/// Send a test message. Unlike backup notifications, a skipped or failed
/// delivery is an error here.
pub async fn execute_telegram(env_file: &Path) -> Result<()> {
    let settings = context::load_settings(env_file)?;
    let notifier = context::notifier(&settings)?;

    if !output::is_json() {
        output::section("Telegram Check");
        output::action("Sending", "Telegram test message");
    }

    let text = format!("🔔 pgkeep test message from {}", settings.host_label);
    match notifier.notify(&text).await {
        Delivery::Delivered => {}
        Delivery::Skipped => {
            return Err(Error::Delivery(
                "Telegram is not configured (set BACKUP_BOT_TOKEN and BACKUP_CHAT_ID)".into(),
            ));
        }
        Delivery::Failed(reason) => return Err(Error::Delivery(reason)),
    }

    // Delivered implies a target.
    let (masked_token, chat_id) = notifier
        .target()
        .map(|t| (mask_token(&t.bot_token), t.chat_id))
        .unwrap_or_default();

    if output::is_json() {
        output::json_output(json!({
            "command": "check.telegram",
            "masked_token": masked_token,
            "chat_id": chat_id,
            "status": "sent",
        }));
        return Ok(());
    }

    output::field("Bot token", masked_token);
    output::field("Chat ID", chat_id);
    output::action_done("Sent", "Telegram test message");
    output::hint("check Telegram for the message");
    Ok(())
}
