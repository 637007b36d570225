//! Crontab port.

use crate::error::Result;

/// Read and replace the invoking user's crontab.
pub trait CrontabStore {
    /// Current crontab contents; empty when the user has none.
    fn read(&self) -> Result<String>;

    /// Replace the whole crontab with `contents`.
    fn write(&self, contents: &str) -> Result<()>;
}
