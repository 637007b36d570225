//! Resolved backup settings.
//!
//! [`Settings`] is built once per run from the env file and the process
//! environment and then passed by reference to every stage. Values in the env
//! file take precedence over inherited environment variables, matching how the
//! deploy scripts export the file before invoking the backup.
//!
//! # Example
//!
//! ```no_run
//! use pgkeep::infrastructure::config::settings::Settings;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let settings = Settings::load(".env".as_ref())?;
//!     println!("backups go to {}", settings.backup_dir.display());
//!     Ok(())
//! }
//! ```

use std::path::{Path, PathBuf};

use tracing::debug;

use super::env_file::EnvFile;
use crate::domain::ChatTarget;
use crate::error::{ConfigError, Result};
use crate::infrastructure::host;

/// Default retention window in days.
pub const DEFAULT_RETENTION_DAYS: u32 = 3;

/// Default Telegram Bot API endpoint.
pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Which database the dump is taken from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseSource {
    /// `pg_dump` run inside a docker compose service.
    Postgres {
        user: String,
        name: String,
        service: String,
        compose_file: Option<PathBuf>,
    },
    /// A SQLite database file on the host, dumped with the `sqlite3` CLI.
    Sqlite { path: PathBuf },
}

impl DatabaseSource {
    /// Database name used as the default artifact prefix.
    #[must_use]
    pub fn default_prefix(&self) -> String {
        match self {
            Self::Postgres { name, .. } => name.clone(),
            Self::Sqlite { path } => path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| "sqlite".to_string()),
        }
    }
}

/// Telegram delivery settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelegramSettings {
    /// Base URL of the Bot API.
    pub api_url: String,
    /// Destination; `None` when the token or chat ID is missing.
    pub target: Option<ChatTarget>,
}

/// Immutable configuration for one backup run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub database: DatabaseSource,
    pub backup_dir: PathBuf,
    pub prefix: String,
    pub retention_days: u32,
    pub telegram: TelegramSettings,
    /// Host identity used in messages and captions.
    pub host_label: String,
}

impl Settings {
    /// Load from `env_file` (optional) and the process environment.
    pub fn load(env_file: &Path) -> Result<Self> {
        let file = EnvFile::load(env_file)?;
        Self::resolve(&file, |key| std::env::var(key).ok())
    }

    /// Resolve settings from an env file and an environment lookup.
    pub fn resolve<F>(file: &EnvFile, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = Lookup { file, env: &env };

        let database = match lookup.first(&["DATABASE_URL"]).and_then(|url| sqlite_path(&url)) {
            Some(path) => DatabaseSource::Sqlite { path },
            None => DatabaseSource::Postgres {
                user: lookup.or("POSTGRES_USER", "postgres"),
                name: lookup.or("POSTGRES_DB", "postgres"),
                service: lookup.or("BACKUP_DB_SERVICE", "db"),
                compose_file: lookup.first(&["BACKUP_COMPOSE_FILE"]).map(PathBuf::from),
            },
        };

        let retention_days = match lookup.first(&["BACKUP_RETENTION_DAYS"]) {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                field: "BACKUP_RETENTION_DAYS",
                reason: format!("expected a non-negative number of days, got {raw:?}"),
            })?,
            None => DEFAULT_RETENTION_DAYS,
        };

        let prefix = lookup
            .first(&["BACKUP_PREFIX"])
            .unwrap_or_else(|| database.default_prefix());
        validate_prefix(&prefix)?;

        let telegram = TelegramSettings {
            api_url: lookup
                .or("TELEGRAM_API_URL", DEFAULT_TELEGRAM_API_URL)
                .trim_end_matches('/')
                .to_string(),
            target: resolve_target(&lookup)?,
        };

        let host_label = lookup
            .first(&["BACKUP_HOST_LABEL"])
            .unwrap_or_else(host::hostname);

        let settings = Self {
            database,
            backup_dir: PathBuf::from(lookup.or("BACKUP_DIR", "./backups")),
            prefix,
            retention_days,
            telegram,
            host_label,
        };
        debug!(
            backup_dir = %settings.backup_dir.display(),
            prefix = %settings.prefix,
            retention_days = settings.retention_days,
            telegram = settings.telegram.target.is_some(),
            "Resolved settings"
        );
        Ok(settings)
    }
}

/// Env file first, then the process environment. Empty values count as unset.
struct Lookup<'a, F> {
    file: &'a EnvFile,
    env: &'a F,
}

impl<F> Lookup<'_, F>
where
    F: Fn(&str) -> Option<String>,
{
    fn one(&self, key: &str) -> Option<String> {
        let present = |value: &String| !value.trim().is_empty();
        self.file
            .get(key)
            .map(ToOwned::to_owned)
            .filter(present)
            .or_else(|| (self.env)(key).filter(present))
    }

    fn first(&self, keys: &[&str]) -> Option<String> {
        keys.iter().find_map(|key| self.one(key))
    }

    fn or(&self, key: &str, default: &str) -> String {
        self.one(key).unwrap_or_else(|| default.to_string())
    }
}

fn resolve_target<F>(lookup: &Lookup<'_, F>) -> Result<Option<ChatTarget>>
where
    F: Fn(&str) -> Option<String>,
{
    let token = lookup.first(&["BACKUP_BOT_TOKEN", "BOT_TOKEN"]);
    let chat_id = lookup
        .first(&["BACKUP_CHAT_ID", "ADMIN_CHAT_ID"])
        .map(|raw| parse_id("BACKUP_CHAT_ID", &raw))
        .transpose()?;
    let thread_id = lookup
        .first(&["BACKUP_TOPIC_ID", "ADMIN_TOPIC_ID"])
        .map(|raw| parse_id("BACKUP_TOPIC_ID", &raw))
        .transpose()?;

    // The bot config uses ADMIN_CHAT_ID=0 to mean "not configured".
    Ok(match (token, chat_id) {
        (Some(bot_token), Some(chat_id)) if chat_id != 0 => Some(ChatTarget {
            bot_token,
            chat_id,
            thread_id,
        }),
        _ => None,
    })
}

fn parse_id(field: &'static str, raw: &str) -> Result<i64> {
    raw.trim().parse().map_err(|_| {
        ConfigError::InvalidValue {
            field,
            reason: format!("expected an integer chat id, got {raw:?}"),
        }
        .into()
    })
}

fn validate_prefix(prefix: &str) -> Result<()> {
    let valid = !prefix.is_empty()
        && prefix
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            field: "BACKUP_PREFIX",
            reason: format!("{prefix:?} must be non-empty and use only [A-Za-z0-9_.-]"),
        }
        .into())
    }
}

/// Filesystem path of a SQLite database URL, or `None` for other schemes.
///
/// Accepts SQLAlchemy-style URLs: `sqlite:///relative.db`,
/// `sqlite:////absolute/path.db` and driver variants such as
/// `sqlite+aiosqlite:///bot.db`. In-memory databases have no path.
#[must_use]
pub fn sqlite_path(url: &str) -> Option<PathBuf> {
    let (scheme, rest) = url.split_once("://")?;
    if !scheme.starts_with("sqlite") {
        return None;
    }
    let rest = rest.split('?').next().unwrap_or_default();
    let path = rest.strip_prefix('/').unwrap_or(rest);
    if path.is_empty() || path == ":memory:" {
        return None;
    }
    Some(PathBuf::from(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn resolve(file: &str, env: &[(&str, &str)]) -> Result<Settings> {
        let env: HashMap<String, String> = env
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Settings::resolve(&EnvFile::parse(file), |key| env.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let settings = resolve("BACKUP_HOST_LABEL=box\n", &[]).unwrap();
        assert_eq!(
            settings.database,
            DatabaseSource::Postgres {
                user: "postgres".into(),
                name: "postgres".into(),
                service: "db".into(),
                compose_file: None,
            }
        );
        assert_eq!(settings.backup_dir, PathBuf::from("./backups"));
        assert_eq!(settings.prefix, "postgres");
        assert_eq!(settings.retention_days, DEFAULT_RETENTION_DAYS);
        assert_eq!(settings.telegram.api_url, DEFAULT_TELEGRAM_API_URL);
        assert!(settings.telegram.target.is_none());
        assert_eq!(settings.host_label, "box");
    }

    #[test]
    fn env_file_overrides_process_environment() {
        let settings = resolve(
            "POSTGRES_DB=from_file\nBACKUP_HOST_LABEL=box\n",
            &[("POSTGRES_DB", "from_env"), ("POSTGRES_USER", "env_user")],
        )
        .unwrap();
        let DatabaseSource::Postgres { user, name, .. } = settings.database else {
            panic!("expected postgres source");
        };
        assert_eq!(name, "from_file");
        assert_eq!(user, "env_user");
        assert_eq!(settings.prefix, "from_file");
    }

    #[test]
    fn empty_values_fall_back() {
        let settings =
            resolve("BACKUP_DIR=\nBACKUP_HOST_LABEL=box\n", &[("BACKUP_DIR", "")]).unwrap();
        assert_eq!(settings.backup_dir, PathBuf::from("./backups"));
    }

    #[test]
    fn telegram_target_needs_token_and_chat() {
        let only_token = resolve("BOT_TOKEN=t\nBACKUP_HOST_LABEL=box\n", &[]).unwrap();
        assert!(only_token.telegram.target.is_none());

        let only_chat = resolve("ADMIN_CHAT_ID=-100\nBACKUP_HOST_LABEL=box\n", &[]).unwrap();
        assert!(only_chat.telegram.target.is_none());

        let both = resolve(
            "BOT_TOKEN=t\nADMIN_CHAT_ID=-100\nADMIN_TOPIC_ID=42\nBACKUP_HOST_LABEL=box\n",
            &[],
        )
        .unwrap();
        assert_eq!(
            both.telegram.target,
            Some(ChatTarget {
                bot_token: "t".into(),
                chat_id: -100,
                thread_id: Some(42),
            })
        );
    }

    #[test]
    fn backup_specific_keys_take_priority() {
        let settings = resolve(
            "BOT_TOKEN=bot\nBACKUP_BOT_TOKEN=backup\n\
             ADMIN_CHAT_ID=1\nBACKUP_CHAT_ID=2\nBACKUP_HOST_LABEL=box\n",
            &[],
        )
        .unwrap();
        let target = settings.telegram.target.unwrap();
        assert_eq!(target.bot_token, "backup");
        assert_eq!(target.chat_id, 2);
        assert_eq!(target.thread_id, None);
    }

    #[test]
    fn zero_chat_id_means_unconfigured() {
        let settings =
            resolve("BOT_TOKEN=t\nADMIN_CHAT_ID=0\nBACKUP_HOST_LABEL=box\n", &[]).unwrap();
        assert!(settings.telegram.target.is_none());
    }

    #[test]
    fn invalid_retention_is_rejected() {
        let err = resolve("BACKUP_RETENTION_DAYS=three\n", &[]).unwrap_err();
        assert!(matches!(
            err,
            crate::error::Error::Config(ConfigError::InvalidValue {
                field: "BACKUP_RETENTION_DAYS",
                ..
            })
        ));
    }

    #[test]
    fn invalid_chat_id_is_rejected() {
        let err = resolve("BOT_TOKEN=t\nADMIN_CHAT_ID=@channel\n", &[]).unwrap_err();
        assert!(err.to_string().contains("BACKUP_CHAT_ID"));
    }

    #[test]
    fn invalid_prefix_is_rejected() {
        let err = resolve("BACKUP_PREFIX=../escape\nBACKUP_HOST_LABEL=box\n", &[]).unwrap_err();
        assert!(err.to_string().contains("BACKUP_PREFIX"));
    }

    #[test]
    fn api_url_trailing_slash_is_trimmed() {
        let settings = resolve(
            "TELEGRAM_API_URL=http://127.0.0.1:8081/\nBACKUP_HOST_LABEL=box\n",
            &[],
        )
        .unwrap();
        assert_eq!(settings.telegram.api_url, "http://127.0.0.1:8081");
    }

    #[test]
    fn sqlite_url_switches_source_and_prefix() {
        let settings = resolve(
            "DATABASE_URL=sqlite+aiosqlite:///./data/bot.db\nBACKUP_HOST_LABEL=box\n",
            &[],
        )
        .unwrap();
        assert_eq!(
            settings.database,
            DatabaseSource::Sqlite {
                path: PathBuf::from("./data/bot.db")
            }
        );
        assert_eq!(settings.prefix, "bot");
    }

    #[test]
    fn postgres_url_keeps_compose_source() {
        let settings = resolve(
            "DATABASE_URL=postgresql+asyncpg://u:p@db:5432/bot\nBACKUP_HOST_LABEL=box\n",
            &[],
        )
        .unwrap();
        assert!(matches!(settings.database, DatabaseSource::Postgres { .. }));
    }

    #[test]
    fn sqlite_path_variants() {
        assert_eq!(sqlite_path("sqlite:///bot.db"), Some(PathBuf::from("bot.db")));
        assert_eq!(
            sqlite_path("sqlite:////var/lib/bot.db"),
            Some(PathBuf::from("/var/lib/bot.db"))
        );
        assert_eq!(sqlite_path("sqlite://"), None);
        assert_eq!(sqlite_path("sqlite:///:memory:"), None);
        assert_eq!(sqlite_path("postgresql://db/x"), None);
        assert_eq!(sqlite_path("not a url"), None);
    }
}
