//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for Aegis using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Aegis - PHI Detection and Governance Gate Engine
#[derive(Parser, Debug)]
#[command(name = "aegis")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "aegis.toml", env = "AEGIS_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "AEGIS_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan text for PHI and report the governance decision
    Scan(commands::scan::ScanArgs),

    /// Scan text and write a redacted copy
    Redact(commands::redact::RedactArgs),

    /// List the loaded pattern catalog
    Patterns(commands::patterns::PatternsArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_scan() {
        let cli = Cli::parse_from(["aegis", "scan", "notes.txt"]);
        assert_eq!(cli.config, "aegis.toml");
        assert!(matches!(cli.command, Commands::Scan(_)));
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["aegis", "--config", "custom.toml", "patterns"]);
        assert_eq!(cli.config, "custom.toml");
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["aegis", "--log-level", "debug", "patterns"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_parse_validate_config() {
        let cli = Cli::parse_from(["aegis", "validate-config"]);
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }

    #[test]
    fn test_cli_parse_redact() {
        let cli = Cli::parse_from(["aegis", "redact", "notes.txt", "--output", "clean.txt"]);
        assert!(matches!(cli.command, Commands::Redact(_)));
    }

    #[test]
    fn test_cli_parse_init() {
        let cli = Cli::parse_from(["aegis", "init"]);
        assert!(matches!(cli.command, Commands::Init(_)));
    }
}
