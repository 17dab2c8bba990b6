//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "aegis.toml")]
    pub output: String,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2);
        }

        match fs::write(&self.output, Self::sample_config()) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your settings", self.output);
                println!("  2. Validate configuration: aegis validate-config");
                println!("  3. Scan some text: aegis scan notes.txt");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(2)
            }
        }
    }

    fn sample_config() -> &'static str {
        r#"# Aegis configuration

[application]
name = "aegis"
# Log level: trace, debug, info, warn, error
log_level = "info"
# Operating mode: LIVE blocks on high-confidence PHI, DEMO is advisory only
mode = "LIVE"

[scanner]
# Maximum accepted input size in bytes
max_input_bytes = 1048576

[governance]
# Block in LIVE mode when any finding reaches this confidence
confidence_threshold = 0.7

[governance.risk]
medium_finding_count = 5
high_finding_count = 10

[patterns]
# Custom pattern library; built-in defaults when omitted
# path = "patterns/phi_patterns.toml"

[audit]
path = "logs/audit.jsonl"

[logging]
local_enabled = true
local_path = "logs"
json_format = false
"#
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_init_writes_loadable_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("aegis.toml");
        let args = InitArgs {
            output: path.to_string_lossy().to_string(),
            force: false,
        };

        let code = args.execute().await.unwrap();
        assert_eq!(code, 0);

        let config = load_config(&path).unwrap();
        assert_eq!(config.application.name, "aegis");
    }

    #[tokio::test]
    async fn test_init_refuses_overwrite_without_force() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("aegis.toml");
        std::fs::write(&path, "existing").unwrap();

        let args = InitArgs {
            output: path.to_string_lossy().to_string(),
            force: false,
        };
        let code = args.execute().await.unwrap();
        assert_eq!(code, 2);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "existing");
    }
}
