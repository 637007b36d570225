use std::sync::Mutex;

use crate::error::Result;
use crate::port::CrontabStore;

/// Crontab held in memory. Counts writes so tests can assert that an
/// unchanged table is left alone.
#[derive(Default)]
pub struct MemoryCrontab {
    contents: Mutex<String>,
    writes: Mutex<usize>,
}

impl MemoryCrontab {
    pub fn with(contents: &str) -> Self {
        Self {
            contents: Mutex::new(contents.to_string()),
            writes: Mutex::new(0),
        }
    }

    pub fn contents(&self) -> String {
        self.contents.lock().expect("lock crontab").clone()
    }

    pub fn writes(&self) -> usize {
        *self.writes.lock().expect("lock crontab writes")
    }
}

impl CrontabStore for MemoryCrontab {
    fn read(&self) -> Result<String> {
        Ok(self.contents())
    }

    fn write(&self, contents: &str) -> Result<()> {
        *self.contents.lock().expect("lock crontab") = contents.to_string();
        *self.writes.lock().expect("lock crontab writes") += 1;
        Ok(())
    }
}
