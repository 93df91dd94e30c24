//! Muster CLI entry point.

use clap::Parser;

use muster::cli::{handle_error, Cli, Commands, ConfigCommands};
use muster::infrastructure::config::ConfigLoader;
use muster::infrastructure::logging::{LogConfig, LoggerImpl};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(err) => handle_error(err, cli.json),
    };

    let _logger = match LoggerImpl::init(&LogConfig::from(&config.logging)) {
        Ok(logger) => logger,
        Err(err) => handle_error(err, cli.json),
    };

    let result = match cli.command {
        Commands::Run(args) => muster::cli::commands::run::execute(args, &config, cli.json).await,
        Commands::Config(ConfigCommands::Show) => {
            muster::cli::commands::config::show(&config, cli.json)
        }
    };

    if let Err(err) = result {
        handle_error(err, cli.json);
    }
}
