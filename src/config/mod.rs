//! Configuration management
//!
//! TOML-based configuration loading, parsing, and validation. Every section
//! defaults to the compiled-in constants, so the engine runs without a
//! configuration file at all.
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! name = "aegis"
//! log_level = "info"
//! mode = "LIVE"
//!
//! [scanner]
//! max_input_bytes = 1048576
//!
//! [governance]
//! confidence_threshold = 0.7
//!
//! [governance.risk]
//! medium_finding_count = 5
//! high_finding_count = 10
//!
//! [patterns]
//! path = "patterns/phi_patterns.toml"
//!
//! [audit]
//! path = "logs/audit.jsonl"
//!
//! [logging]
//! local_enabled = true
//! local_path = "logs"
//! ```
//!
//! # Environment Variables
//!
//! `${VAR_NAME}` placeholders in the file are substituted at load time, and
//! `AEGIS_<SECTION>_<KEY>` variables override individual values:
//!
//! ```bash
//! export AEGIS_APPLICATION_MODE="DEMO"
//! export AEGIS_GOVERNANCE_CONFIDENCE_THRESHOLD="0.9"
//! ```

pub mod loader;
pub mod schema;

// Re-export commonly used types
pub use loader::{default_config, load_config};
pub use schema::{
    AegisConfig, ApplicationConfig, AuditConfig, LoggingConfig, PatternsConfig,
};
