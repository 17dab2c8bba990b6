//! Patterns command implementation
//!
//! Lists the loaded pattern catalog in evaluation order.

use crate::cli::commands::{build_catalog, resolve_config};
use clap::Args;

/// Arguments for the patterns command
#[derive(Args, Debug)]
pub struct PatternsArgs {}

impl PatternsArgs {
    /// Execute the patterns command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = match resolve_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Configuration error: {e}");
                return Ok(2);
            }
        };

        let catalog = build_catalog(&config)?;
        println!("{} rule(s) loaded, in evaluation order:", catalog.len());
        println!();
        for rule in catalog.rules() {
            println!(
                "  {:<20} {:<14} category {:>2}  confidence {:.2}",
                rule.name,
                rule.phi_type.label(),
                rule.regulatory_category,
                rule.base_confidence
            );
        }
        Ok(0)
    }
}
