//! Dump source adapters.
//!
//! Both sources run an external command whose stdout is a SQL dump and stream
//! it through a gzip encoder into the artifact file.

mod command;
mod sqlite;

pub use command::{CommandDump, ComposeDump};
pub use sqlite::SqliteDump;

use crate::infrastructure::config::{DatabaseSource, Settings};
use crate::port::DumpSource;

/// Build the dump source described by `settings`.
#[must_use]
pub fn from_settings(settings: &Settings) -> Box<dyn DumpSource> {
    match &settings.database {
        DatabaseSource::Postgres {
            user,
            name,
            service,
            compose_file,
        } => Box::new(ComposeDump::new(user, name, service, compose_file.as_deref())),
        DatabaseSource::Sqlite { path } => Box::new(SqliteDump::new(path.clone())),
    }
}
