//! Redact command implementation
//!
//! Scans a file (or stdin) and writes a copy with each detected value
//! replaced by its typed placeholder.

use crate::cli::commands::{build_catalog, read_input, resolve_config};
use crate::domain::ids::ScanScope;
use crate::redactor::redact;
use crate::scanner::Scanner;
use anyhow::Context;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the redact command
#[derive(Args, Debug)]
pub struct RedactArgs {
    /// Input file; reads stdin when omitted
    pub input: Option<PathBuf>,

    /// Output file; writes stdout when omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Scope tag recorded with the scan
    #[arg(long, default_value = "redact")]
    pub scope: String,
}

impl RedactArgs {
    /// Execute the redact command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = match resolve_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Configuration error: {e}");
                return Ok(2);
            }
        };

        let catalog = build_catalog(&config)?;
        let scanner = Scanner::new(catalog, config.scanner).with_thresholds(config.governance.risk);
        let text = read_input(self.input.as_deref())?;

        let scan = scanner.scan(&text, ScanScope::new(self.scope.clone()))?;
        let redacted = redact(&text, &scan.findings);

        match &self.output {
            Some(path) => {
                std::fs::write(path, &redacted)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                eprintln!(
                    "Redacted {} finding(s) -> {}",
                    scan.summary.total_matches,
                    path.display()
                );
            }
            None => print!("{redacted}"),
        }

        Ok(0)
    }
}
