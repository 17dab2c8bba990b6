//! Scan command implementation
//!
//! Scans a file (or stdin) for PHI and prints the findings summary and the
//! governance decision. Matched values are reported by hash and type only.

use crate::cli::commands::{build_catalog, read_input, resolve_config};
use crate::domain::ids::ScanScope;
use crate::governance::{decide, GovernancePolicy, OperatingMode};
use crate::redactor::redact;
use crate::scanner::Scanner;
use anyhow::Context;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the scan command
#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Input file; reads stdin when omitted
    pub input: Option<PathBuf>,

    /// Scope tag recorded with the scan (e.g. upload, export, chat-message)
    #[arg(long, default_value = "upload")]
    pub scope: String,

    /// Override the configured operating mode (DEMO or LIVE)
    #[arg(long)]
    pub mode: Option<String>,

    /// Emit the full scan result as JSON instead of a summary
    #[arg(long)]
    pub json: bool,

    /// Also write a redacted copy of the input to this path
    #[arg(long, value_name = "FILE")]
    pub redact_to: Option<PathBuf>,
}

impl ScanArgs {
    /// Execute the scan command
    ///
    /// Exit codes: 0 when the operation is allowed, 1 when blocked,
    /// 2 for configuration errors.
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = match resolve_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Configuration error: {e}");
                return Ok(2);
            }
        };

        let mode = match resolve_mode(self.mode.as_deref(), config.application.mode) {
            Ok(m) => m,
            Err(e) => {
                eprintln!("{e}");
                return Ok(2);
            }
        };

        let catalog = build_catalog(&config)?;
        let scanner = Scanner::new(catalog, config.scanner).with_thresholds(config.governance.risk);
        let text = read_input(self.input.as_deref())?;

        let scan = scanner.scan(&text, ScanScope::new(self.scope.clone()))?;
        let policy = GovernancePolicy {
            confidence_threshold: config.governance.confidence_threshold,
            risk: config.governance.risk,
        };
        let decision = decide(&scan, mode, &policy);

        if self.json {
            println!("{}", serde_json::to_string_pretty(&scan)?);
        } else {
            println!("Scope: {} | Mode: {mode}", scan.scope);
            println!(
                "Findings: {} ({} types, {} critical) | Risk: {}",
                scan.summary.total_matches,
                scan.summary.unique_types,
                scan.summary.critical_count,
                scan.risk_level
            );
            for finding in &scan.findings {
                println!(
                    "  {} [category {}] hash={} len={} span={}..{} confidence={:.2}",
                    finding.phi_type.label(),
                    finding.regulatory_category,
                    finding.value_hash,
                    finding.value_length,
                    finding.span.start,
                    finding.span.end,
                    finding.confidence
                );
            }
            println!();
            if decision.allowed {
                println!("✅ {}", decision.reason);
            } else {
                println!("❌ {}", decision.reason);
            }
            if let Some(warning) = &decision.warning {
                println!("⚠️  {warning}");
            }
        }

        if let Some(out) = &self.redact_to {
            let redacted = redact(&text, &scan.findings);
            std::fs::write(out, redacted)
                .with_context(|| format!("Failed to write redacted output: {}", out.display()))?;
            if !self.json {
                println!("📝 Redacted copy written to {}", out.display());
            }
        }

        Ok(if decision.allowed { 0 } else { 1 })
    }
}

/// Resolve the effective operating mode from the CLI override and config
pub(crate) fn resolve_mode(
    override_str: Option<&str>,
    configured: OperatingMode,
) -> anyhow::Result<OperatingMode> {
    match override_str {
        None => Ok(configured),
        Some(s) => match s.to_uppercase().as_str() {
            "DEMO" => Ok(OperatingMode::Demo),
            "LIVE" => Ok(OperatingMode::Live),
            other => anyhow::bail!("invalid mode '{other}': expected DEMO or LIVE"),
        },
    }
}
