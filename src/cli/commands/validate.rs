//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the Aegis configuration file.

use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration file loaded successfully");
                c
            }
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Application: {}", config.application.name);
        println!("  Log Level: {}", config.application.log_level);
        println!("  Mode: {}", config.application.mode);
        println!("  Max Input Bytes: {}", config.scanner.max_input_bytes);
        println!(
            "  Confidence Threshold: {}",
            config.governance.confidence_threshold
        );
        println!(
            "  Risk Cutoffs: medium >= {}, high >= {}",
            config.governance.risk.medium_finding_count, config.governance.risk.high_finding_count
        );
        match &config.patterns.path {
            Some(path) => println!("  Pattern Library: {}", path.display()),
            None => println!("  Pattern Library: built-in defaults"),
        }
        println!("  Audit Log: {}", config.audit.path.display());
        println!();
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_args_creation() {
        let args = ValidateArgs {};
        let _ = format!("{args:?}");
    }
}
