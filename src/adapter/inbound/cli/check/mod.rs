//! Diagnostic command handlers.

pub mod config;
pub mod telegram;

use std::path::Path;

use super::command::CheckCommand;
use crate::error::Result;

/// Dispatch `pgkeep check <subcommand>`.
pub async fn execute(env_file: &Path, command: &CheckCommand) -> Result<()> {
    match command {
        CheckCommand::Config => config::execute_config(env_file),
        CheckCommand::Telegram => telegram::execute_telegram(env_file).await,
    }
}
