//! Configuration schema types
//!
//! Defines the structure of the `aegis.toml` configuration file. Every
//! section has workable defaults; an empty file yields the same engine as
//! compiled-in constants.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::governance::{GovernancePolicy, OperatingMode};
use crate::scanner::ScannerLimits;

/// Main Aegis configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AegisConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Scanner input limits
    #[serde(default)]
    pub scanner: ScannerLimits,

    /// Governance policy thresholds
    #[serde(default)]
    pub governance: GovernancePolicy,

    /// Pattern catalog source
    #[serde(default)]
    pub patterns: PatternsConfig,

    /// Audit trail destination
    #[serde(default)]
    pub audit: AuditConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AegisConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        if self.scanner.max_input_bytes == 0 {
            return Err("scanner.max_input_bytes must be greater than zero".to_string());
        }
        self.governance.validate()?;
        self.audit.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Application name, used in log output
    #[serde(default = "default_app_name")]
    pub name: String,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Operating mode (DEMO or LIVE)
    ///
    /// LIVE is the default: the blocking posture is the safe one.
    #[serde(default = "default_mode")]
    pub mode: OperatingMode,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            log_level: default_log_level(),
            mode: default_mode(),
        }
    }
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

/// Pattern catalog source configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PatternsConfig {
    /// Path to a custom rule library TOML; embedded defaults when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Audit trail destination configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// JSON-lines audit log path
    #[serde(default = "default_audit_path")]
    pub path: PathBuf,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            path: default_audit_path(),
        }
    }
}

impl AuditConfig {
    fn validate(&self) -> Result<(), String> {
        if self.path.as_os_str().is_empty() {
            return Err("audit.path cannot be empty".to_string());
        }
        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default = "default_true")]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_log_path")]
    pub local_path: String,

    /// Emit JSON-structured log lines instead of human-readable ones
    #[serde(default)]
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: default_true(),
            local_path: default_log_path(),
            json_format: false,
        }
    }
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local logging is enabled".to_string());
        }
        Ok(())
    }
}

fn default_app_name() -> String {
    "aegis".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_mode() -> OperatingMode {
    OperatingMode::Live
}

fn default_audit_path() -> PathBuf {
    PathBuf::from("logs/audit.jsonl")
}

fn default_log_path() -> String {
    "logs".to_string()
}

fn default_true() -> bool {
    true
}
