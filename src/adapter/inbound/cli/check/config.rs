use std::path::Path;

use serde_json::json;

use crate::adapter::inbound::cli::{context, output};
use crate::adapter::outbound::dump;
use crate::domain::delivery::mask_token;
use crate::error::Result;
use crate::infrastructure::config::{DatabaseSource, Settings};

/// Show the effective settings with the bot token masked.
pub fn execute_config(env_file: &Path) -> Result<()> {
    let settings = context::load_settings(env_file)?;
    let source = dump::from_settings(&settings);

    if output::is_json() {
        output::json_output(summary(env_file, &settings, &source.describe()));
        return Ok(());
    }

    output::header(env!("CARGO_PKG_VERSION"));
    output::section("Configuration");
    if env_file.is_file() {
        output::field("Env file", env_file.display());
    } else {
        output::field("Env file", format!("{} (not found)", env_file.display()));
    }
    output::field("Database", source.describe());
    if let DatabaseSource::Postgres {
        compose_file: Some(file),
        ..
    } = &settings.database
    {
        output::field("Compose", file.display());
    }
    output::field("Backup dir", settings.backup_dir.display());
    output::field("Prefix", &settings.prefix);
    output::field("Retention", format!("{} days", settings.retention_days));
    output::field("Host", &settings.host_label);

    output::section("Telegram");
    match &settings.telegram.target {
        Some(target) => {
            output::field("Bot token", mask_token(&target.bot_token));
            output::field("Chat ID", target.chat_id);
            if let Some(thread_id) = target.thread_id {
                output::field("Topic ID", thread_id);
            }
            output::field("API", &settings.telegram.api_url);
            output::success("Telegram delivery configured");
        }
        None => {
            output::warning("Telegram not configured; notifications and uploads are skipped");
            output::hint(
                "set BACKUP_BOT_TOKEN and BACKUP_CHAT_ID (or BOT_TOKEN and ADMIN_CHAT_ID)",
            );
        }
    }

    Ok(())
}

fn summary(env_file: &Path, settings: &Settings, source: &str) -> serde_json::Value {
    let telegram = settings.telegram.target.as_ref().map(|target| {
        json!({
            "bot_token": mask_token(&target.bot_token),
            "chat_id": target.chat_id,
            "thread_id": target.thread_id,
            "api_url": settings.telegram.api_url,
        })
    });
    json!({
        "command": "check.config",
        "env_file": env_file.display().to_string(),
        "env_file_found": env_file.is_file(),
        "database": source,
        "backup_dir": settings.backup_dir.display().to_string(),
        "prefix": settings.prefix,
        "retention_days": settings.retention_days,
        "host": settings.host_label,
        "telegram": telegram,
    })
}
