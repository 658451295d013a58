//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for linkage using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// linkage - DICOM record linkage and anonymisation
#[derive(Parser, Debug)]
#[command(name = "linkage")]
#[command(version, about, long_about = None)]
#[command(author = "Atlas Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "linkage.toml", env = "LINKAGE_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "LINKAGE_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Anonymise the source tree into the target tree
    Anonymize(commands::anonymize::AnonymizeArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate_config::ValidateArgs),

    /// Show ledger contents (pseudonyms and counts only)
    Status(commands::status::StatusArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_anonymize() {
        let cli = Cli::parse_from(["linkage", "anonymize"]);
        assert_eq!(cli.config, "linkage.toml");
        assert!(matches!(cli.command, Commands::Anonymize(_)));
    }

    #[test]
    fn test_cli_parse_anonymize_overrides() {
        let cli = Cli::parse_from([
            "linkage",
            "--config",
            "custom.toml",
            "anonymize",
            "--source",
            "/mnt/export",
            "--compress",
            "--dry-run",
        ]);
        assert_eq!(cli.config, "custom.toml");
        match cli.command {
            Commands::Anonymize(args) => {
                assert_eq!(args.source.as_deref(), Some(std::path::Path::new("/mnt/export")));
                assert!(args.compress);
                assert!(args.dry_run);
                assert!(args.target.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["linkage", "--log-level", "debug", "status"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_parse_validate_config() {
        let cli = Cli::parse_from(["linkage", "validate-config"]);
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }

    #[test]
    fn test_cli_parse_init() {
        let cli = Cli::parse_from(["linkage", "init"]);
        assert!(matches!(cli.command, Commands::Init(_)));
    }
}
