//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::cli::commands::run::RunArgs;

#[derive(Parser)]
#[command(name = "muster")]
#[command(about = "Muster - sidebar component orchestration", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Load configuration from this file instead of .muster/
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Simulate a page load against an in-memory host
    Run(RunArgs),

    /// Configuration commands
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_flags() {
        let cli = Cli::try_parse_from([
            "muster",
            "--json",
            "run",
            "--arrive",
            "Core",
            "--arrive",
            "UI:300",
            "--fail",
            "Todo",
            "--stale",
            "2",
            "--ephemeral",
        ])
        .unwrap();

        assert!(cli.json);
        let Commands::Run(args) = cli.command else {
            panic!("expected run command");
        };
        assert_eq!(args.arrive.len(), 2);
        assert_eq!(args.arrive[1].name, "UI");
        assert_eq!(args.arrive[1].delay_ms, 300);
        assert_eq!(args.fail, vec!["Todo"]);
        assert_eq!(args.stale, 2);
        assert!(args.ephemeral);
    }

    #[test]
    fn test_parse_config_show_with_global_path() {
        let cli = Cli::try_parse_from(["muster", "config", "show", "--config", "custom.yaml"])
            .unwrap();

        assert!(matches!(cli.command, Commands::Config(ConfigCommands::Show)));
        assert_eq!(cli.config, Some(PathBuf::from("custom.yaml")));
    }

    #[test]
    fn test_rejects_bad_arrival_delay() {
        assert!(Cli::try_parse_from(["muster", "run", "--arrive", "UI:soon"]).is_err());
    }
}
