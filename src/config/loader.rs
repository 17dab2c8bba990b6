//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::AegisConfig;
use crate::domain::errors::AegisError;
use crate::domain::result::Result;
use crate::governance::OperatingMode;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into AegisConfig
/// 4. Applies environment variable overrides (AEGIS_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - Environment variable substitution fails
/// - Configuration validation fails
pub fn load_config(path: impl AsRef<Path>) -> Result<AegisConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(AegisError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        AegisError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: AegisConfig = toml::from_str(&contents)
        .map_err(|e| AegisError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config);

    config.validate().map_err(|e| {
        AegisError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Builds the default configuration, with environment overrides applied
///
/// Used when no configuration file is given on the command line.
pub fn default_config() -> Result<AegisConfig> {
    let mut config = AegisConfig::default();
    apply_env_overrides(&mut config);
    config.validate().map_err(|e| {
        AegisError::Configuration(format!("Configuration validation failed: {e}"))
    })?;
    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").map_err(|e| {
        AegisError::Configuration(format!("invalid substitution pattern: {e}"))
    })?;
    let mut result = String::new();
    let mut missing_vars = Vec::new();

    // Process line by line to skip comments
    for line in input.lines() {
        let trimmed = line.trim_start();

        if trimmed.starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{var_name}}}");
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.contains(&var_name.to_string()) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(AegisError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using the AEGIS_* prefix
///
/// Environment variables follow the pattern: AEGIS_<SECTION>_<KEY>
/// For example: AEGIS_APPLICATION_MODE, AEGIS_GOVERNANCE_CONFIDENCE_THRESHOLD
fn apply_env_overrides(config: &mut AegisConfig) {
    if let Ok(val) = std::env::var("AEGIS_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Ok(val) = std::env::var("AEGIS_APPLICATION_MODE") {
        match val.to_uppercase().as_str() {
            "DEMO" => config.application.mode = OperatingMode::Demo,
            "LIVE" => config.application.mode = OperatingMode::Live,
            _ => {}
        }
    }

    if let Ok(val) = std::env::var("AEGIS_SCANNER_MAX_INPUT_BYTES") {
        if let Ok(bytes) = val.parse() {
            config.scanner.max_input_bytes = bytes;
        }
    }

    if let Ok(val) = std::env::var("AEGIS_GOVERNANCE_CONFIDENCE_THRESHOLD") {
        if let Ok(threshold) = val.parse() {
            config.governance.confidence_threshold = threshold;
        }
    }
    if let Ok(val) = std::env::var("AEGIS_GOVERNANCE_MEDIUM_FINDING_COUNT") {
        if let Ok(count) = val.parse() {
            config.governance.risk.medium_finding_count = count;
        }
    }
    if let Ok(val) = std::env::var("AEGIS_GOVERNANCE_HIGH_FINDING_COUNT") {
        if let Ok(count) = val.parse() {
            config.governance.risk.high_finding_count = count;
        }
    }

    if let Ok(val) = std::env::var("AEGIS_PATTERNS_PATH") {
        config.patterns.path = Some(val.into());
    }

    if let Ok(val) = std::env::var("AEGIS_AUDIT_PATH") {
        config.audit.path = val.into();
    }

    if let Ok(val) = std::env::var("AEGIS_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(true);
    }
    if let Ok(val) = std::env::var("AEGIS_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Ok(val) = std::env::var("AEGIS_LOGGING_JSON_FORMAT") {
        config.logging.json_format = val.parse().unwrap_or(false);
    }
}
