use clap::Parser;
use pgkeep::adapter::inbound::cli::{self, command::Cli, output};
use pgkeep::infrastructure::config::LoggingConfig;
use tracing::error;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    output::configure(output::OutputConfig::new(cli.json, cli.quiet), cli.color);
    LoggingConfig::from_flags(cli.verbose, cli.quiet, cli.json).init();

    if let Err(e) = cli::run(&cli).await {
        error!(error = %e, "Command failed");
        output::error(&e.to_string());
        std::process::exit(e.exit_code());
    }
}
