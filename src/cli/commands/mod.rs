//! CLI command implementations
//!
//! This module contains all CLI command implementations.

pub mod init;
pub mod patterns;
pub mod redact;
pub mod scan;
pub mod validate;

use crate::catalog::PatternCatalog;
use crate::config::{default_config, load_config, AegisConfig};
use anyhow::Context;
use std::path::Path;
use std::sync::Arc;

/// Load configuration, falling back to defaults when the file is absent
///
/// An explicitly-named file that does not exist is still an error; only the
/// default `aegis.toml` location is optional.
pub(crate) fn resolve_config(config_path: &str) -> anyhow::Result<AegisConfig> {
    if Path::new(config_path).exists() {
        Ok(load_config(config_path)?)
    } else if config_path == "aegis.toml" {
        Ok(default_config()?)
    } else {
        anyhow::bail!("configuration file not found: {config_path}")
    }
}

/// Build the pattern catalog named by the configuration
pub(crate) fn build_catalog(config: &AegisConfig) -> anyhow::Result<Arc<PatternCatalog>> {
    let catalog = match &config.patterns.path {
        Some(path) => PatternCatalog::from_file(path)
            .with_context(|| format!("failed to load pattern library {}", path.display()))?,
        None => PatternCatalog::default_rules()?,
    };
    Ok(Arc::new(catalog))
}

/// Read the input text from a file, or stdin when no path is given
pub(crate) fn read_input(input: Option<&Path>) -> anyhow::Result<String> {
    match input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read input file {}", path.display())),
        None => {
            std::io::read_to_string(std::io::stdin()).context("failed to read text from stdin")
        }
    }
}
