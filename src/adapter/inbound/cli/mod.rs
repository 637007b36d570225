//! CLI module graph.

pub mod backup;
pub mod check;
pub mod command;
pub mod context;
pub mod cron;
pub mod list;
pub mod output;
pub mod prune;

use command::{Cli, Commands};

use crate::error::Result;

/// Run the parsed command line.
pub async fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Backup(args) => backup::execute(&cli.env_file, args).await,
        Commands::Prune(args) => prune::execute(&cli.env_file, args),
        Commands::List => list::execute(&cli.env_file),
        Commands::Cron(command) => cron::execute(&cli.env_file, command),
        Commands::Check(command) => check::execute(&cli.env_file, command).await,
    }
}
