//! Implementations of ports (hexagonal adapters).
//!
//! - [`inbound`] - the `pgkeep` command line
//! - [`outbound`] - dump processes, the Telegram Bot API and the crontab

pub mod inbound;
pub mod outbound;
