//! Outbound adapters (driven side).

pub mod crontab;
pub mod dump;
pub mod telegram;

pub use crontab::SystemCrontab;
pub use telegram::TelegramApi;
