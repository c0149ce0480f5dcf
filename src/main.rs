//! Risk control evaluation CLI.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use risk_config::load_config;
use risk_monitor::setup_logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config =
        load_config(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(level) = cli.log_level {
        config.logging.level = level.as_str().to_string();
    }
    if cli.json_logs {
        config.logging.format = "json".to_string();
    }
    let _guard = setup_logging(&config.logging);

    match cli.command {
        Commands::Evaluate(args) => cli::commands::evaluate::run(args, &config).await,
        Commands::Controls => cli::commands::controls::run().await,
        Commands::Profile(args) => cli::commands::profile::run(args, &config).await,
        Commands::ValidateConfig => {
            cli::commands::validate::run(cli.config.as_deref(), &config).await
        }
    }
}
