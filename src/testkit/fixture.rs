use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};

use super::chat::target;
use crate::infrastructure::config::{DatabaseSource, Settings, TelegramSettings};

/// Settings for a compose-backed database writing into `dir`.
pub fn settings(dir: &Path) -> Settings {
    Settings {
        database: DatabaseSource::Postgres {
            user: "bot".into(),
            name: "tradebot".into(),
            service: "db".into(),
            compose_file: None,
        },
        backup_dir: dir.to_path_buf(),
        prefix: "tradebot".into(),
        retention_days: 3,
        telegram: TelegramSettings {
            api_url: "http://127.0.0.1:9".into(),
            target: Some(target()),
        },
        host_label: "vps-test".into(),
    }
}

/// Create `name` in `dir` with the given modification time.
pub fn artifact_at(dir: &Path, name: &str, modified: DateTime<Utc>) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, b"stale").expect("write artifact");
    File::options()
        .write(true)
        .open(&path)
        .expect("open artifact")
        .set_modified(SystemTime::from(modified))
        .expect("set mtime");
    path
}

/// File names in `dir`, sorted.
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .expect("read dir")
        .map(|entry| entry.expect("dir entry").file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
