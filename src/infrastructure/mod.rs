//! Infrastructure layer.
//!
//! Technical concerns that support the backup use cases without containing
//! backup logic: configuration loading, logging and host identity.

pub mod config;
pub mod host;
