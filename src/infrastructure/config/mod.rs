//! Configuration loading.

pub mod env_file;
pub mod logging;
pub mod settings;

pub use env_file::EnvFile;
pub use logging::{LogFormat, LoggingConfig};
pub use settings::{DatabaseSource, Settings, TelegramSettings};
