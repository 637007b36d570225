//! Outbound ports (driven side): interfaces implemented by outbound adapters.

pub mod chat;
pub mod crontab;
pub mod dump;
