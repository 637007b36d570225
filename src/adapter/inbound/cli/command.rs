//! Command-line interface definitions.
//!
//! Defines the CLI structure for pgkeep using `clap`. Global flags pick the
//! env file and output mode; subcommands run a backup, prune or list
//! artifacts, manage the cron schedule and run diagnostic checks.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::application::JobOptions;

/// Scheduled Postgres backups with retention and Telegram delivery
#[derive(Parser, Debug)]
#[command(name = "pgkeep")]
#[command(version)]
pub struct Cli {
    /// Environment file with backup and bot settings
    #[arg(long, global = true, default_value = ".env", value_name = "PATH")]
    pub env_file: PathBuf,

    /// Color output mode [auto, always, never]
    #[arg(
        long,
        global = true,
        default_value = "auto",
        hide_possible_values = true
    )]
    pub color: ColorChoice,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase output verbosity
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Color output mode for terminal rendering.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ColorChoice {
    /// Detect automatically
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Dump the database, prune old artifacts and report to the chat
    Backup(BackupArgs),

    /// Delete artifacts older than the retention window
    Prune(PruneArgs),

    /// List artifacts in the backup directory
    List,

    /// Manage the crontab entries that run scheduled backups
    #[command(subcommand)]
    Cron(CronCommand),

    /// Run diagnostic checks
    #[command(subcommand)]
    Check(CheckCommand),
}

/// Arguments for `pgkeep backup`.
#[derive(Args, Debug, Default)]
pub struct BackupArgs {
    /// Send a summary to the chat on success (default)
    #[arg(long, overrides_with = "no_notify")]
    pub notify: bool,

    /// Stay silent on success; failures are still reported
    #[arg(long, overrides_with = "notify")]
    pub no_notify: bool,

    /// Attach the artifact to the chat
    #[arg(long, overrides_with = "no_upload")]
    pub upload: bool,

    /// Do not attach the artifact (default)
    #[arg(long, overrides_with = "upload")]
    pub no_upload: bool,

    /// Skip decoding the artifact after the dump
    #[arg(long)]
    pub no_verify: bool,
}

impl BackupArgs {
    /// Resolve the flag pairs; the last flag given wins.
    #[must_use]
    pub fn options(&self) -> JobOptions {
        JobOptions {
            notify: !self.no_notify,
            upload: self.upload && !self.no_upload,
            verify: !self.no_verify,
        }
    }
}

/// Arguments for `pgkeep prune`.
#[derive(Args, Debug, Default)]
pub struct PruneArgs {
    /// Report what would be deleted without deleting
    #[arg(long)]
    pub dry_run: bool,
}

/// Subcommands for `pgkeep cron`.
#[derive(Subcommand, Debug)]
pub enum CronCommand {
    /// Add the fast and notify entries to the user's crontab
    Install(CronArgs),
    /// Print the entries that would be installed
    Show(CronArgs),
    /// Remove this binary's entries from the user's crontab
    Uninstall,
}

/// Schedule overrides for `pgkeep cron install|show`.
#[derive(Args, Debug, Default)]
pub struct CronArgs {
    /// Schedule of the silent backup [default: "0 */6 * * *"]
    #[arg(long, value_name = "CRON")]
    pub fast_schedule: Option<String>,

    /// Schedule of the notifying backup with upload [default: "0 3 * * *"]
    #[arg(long, value_name = "CRON")]
    pub notify_schedule: Option<String>,

    /// File that receives each run's output [default: <backup dir>/pgkeep-cron.log]
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

/// Subcommands for `pgkeep check`.
#[derive(Subcommand, Debug)]
pub enum CheckCommand {
    /// Show the effective settings
    Config,
    /// Send a test message to the configured chat
    Telegram,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_command_factory_builds() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_name_and_version() {
        let cmd = Cli::command();
        assert_eq!(cmd.get_name(), "pgkeep");
        assert!(cmd.get_version().is_some());
    }

    #[test]
    fn test_parse_backup_defaults() {
        let cli = Cli::try_parse_from(["pgkeep", "backup"]).unwrap();
        let Commands::Backup(args) = cli.command else {
            panic!("expected backup");
        };
        assert_eq!(
            args.options(),
            JobOptions {
                notify: true,
                upload: false,
                verify: true,
            }
        );
        assert_eq!(cli.env_file, PathBuf::from(".env"));
        assert_eq!(cli.color, ColorChoice::Auto);
    }

    #[test]
    fn test_parse_backup_flags() {
        let cli =
            Cli::try_parse_from(["pgkeep", "backup", "--no-notify", "--upload", "--no-verify"])
                .unwrap();
        let Commands::Backup(args) = cli.command else {
            panic!("expected backup");
        };
        assert_eq!(
            args.options(),
            JobOptions {
                notify: false,
                upload: true,
                verify: false,
            }
        );
    }

    #[test]
    fn test_last_flag_wins() {
        let cli = Cli::try_parse_from([
            "pgkeep",
            "backup",
            "--no-notify",
            "--notify",
            "--upload",
            "--no-upload",
        ])
        .unwrap();
        let Commands::Backup(args) = cli.command else {
            panic!("expected backup");
        };
        assert!(args.options().notify);
        assert!(!args.options().upload);
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "pgkeep",
            "prune",
            "--dry-run",
            "--env-file",
            "/etc/bot.env",
            "--json",
            "-vv",
        ])
        .unwrap();
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.env_file, PathBuf::from("/etc/bot.env"));
        assert!(matches!(cli.command, Commands::Prune(PruneArgs { dry_run: true })));
    }

    #[test]
    fn test_parse_cron_install_overrides() {
        let cli = Cli::try_parse_from([
            "pgkeep",
            "cron",
            "install",
            "--fast-schedule",
            "*/30 * * * *",
            "--log-file",
            "/var/log/pgkeep.log",
        ])
        .unwrap();
        let Commands::Cron(CronCommand::Install(args)) = cli.command else {
            panic!("expected cron install");
        };
        assert_eq!(args.fast_schedule.as_deref(), Some("*/30 * * * *"));
        assert_eq!(args.notify_schedule, None);
        assert_eq!(args.log_file, Some(PathBuf::from("/var/log/pgkeep.log")));
    }

    #[test]
    fn test_parse_check_commands() {
        let cli = Cli::try_parse_from(["pgkeep", "check", "telegram"]).unwrap();
        assert!(matches!(cli.command, Commands::Check(CheckCommand::Telegram)));
        let cli = Cli::try_parse_from(["pgkeep", "--color", "never", "check", "config"]).unwrap();
        assert!(matches!(cli.command, Commands::Check(CheckCommand::Config)));
        assert_eq!(cli.color, ColorChoice::Never);
    }

    #[test]
    fn test_unknown_subcommand_fails() {
        assert!(Cli::try_parse_from(["pgkeep", "restore"]).is_err());
    }
}
