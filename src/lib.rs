// Aegis - PHI Detection and Governance Gate Engine
// Licensed under the MIT License

//! # Aegis - PHI Detection and Governance Gate Engine
//!
//! Aegis scans free text for protected health information (PHI), classifies
//! the resulting risk, and gates pipeline operations on the outcome. It is
//! built for clinical research platforms where data leaves a controlled
//! boundary: uploads, exports, chat messages.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Detecting** the HIPAA identifier categories with an ordered,
//!   configurable pattern catalog
//! - **Classifying** scan results into risk levels (NONE through CRITICAL)
//! - **Redacting** detected values with typed placeholders
//! - **Gating** pipeline stages on scan outcomes, with audited overrides,
//!   quarantine, and remediation
//!
//! Detected values never leave the scanner: findings carry a truncated
//! SHA-256 hash, the value length, and the byte span, and the same rule
//! holds for every log line and audit entry the engine emits.
//!
//! ## Architecture
//!
//! Aegis follows a layered architecture:
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`catalog`] - PHI types and the ordered pattern catalog
//! - [`scanner`] - Text scanning and finding extraction
//! - [`risk`] - Risk level classification
//! - [`redactor`] - Placeholder substitution
//! - [`governance`] - Allow/block decisions per operating mode
//! - [`gate`] - Per-stage gate state machine with audit trail
//! - [`domain`] - Core domain types and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging and observability
//!
//! ## Quick Start
//!
//! ```rust
//! use aegis::catalog::PatternCatalog;
//! use aegis::domain::ids::ScanScope;
//! use aegis::governance::{decide, GovernancePolicy, OperatingMode};
//! use aegis::scanner::{Scanner, ScannerLimits};
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let catalog = Arc::new(PatternCatalog::default_rules()?);
//! let scanner = Scanner::new(catalog, ScannerLimits::default());
//!
//! let scan = scanner.scan("SSN: 123-45-6789", ScanScope::export())?;
//! let decision = decide(&scan, OperatingMode::Live, &GovernancePolicy::default());
//!
//! assert!(!decision.allowed);
//! # Ok(())
//! # }
//! ```
//!
//! ## Gating a pipeline stage
//!
//! ```rust,no_run
//! use aegis::catalog::PatternCatalog;
//! use aegis::domain::ids::{ScanScope, SessionId, StageId};
//! use aegis::gate::{GateKey, GateRegistry, MemoryAuditSink};
//! use aegis::governance::{GovernancePolicy, OperatingMode};
//! use aegis::scanner::{Scanner, ScannerLimits};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let catalog = Arc::new(PatternCatalog::default_rules()?);
//! let scanner = Scanner::new(catalog, ScannerLimits::default());
//! let registry = GateRegistry::new(
//!     scanner,
//!     Arc::new(MemoryAuditSink::new()),
//!     GovernancePolicy::default(),
//! );
//!
//! let key = GateKey::new(StageId::new("export")?, SessionId::generate());
//! registry
//!     .run_scan(&key, "patient notes", ScanScope::export(), OperatingMode::Live, "analyst")
//!     .await?;
//!
//! let outcome = registry.request_gate_check(&key, "pipeline").await?;
//! println!("may proceed: {}", outcome.passed);
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Engine operations return the [`domain::AegisError`] type; catalog
//! construction surfaces `anyhow` errors with rule-level context:
//!
//! ```rust
//! fn example() -> anyhow::Result<()> {
//!     let catalog = aegis::catalog::PatternCatalog::default_rules()?;
//!     assert!(!catalog.is_empty());
//!     Ok(())
//! }
//! ```
//!
//! ## Logging
//!
//! Aegis uses structured logging with the `tracing` crate. Log records
//! carry counts, types, and hashes; never raw matched text.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod domain;
pub mod gate;
pub mod governance;
pub mod logging;
pub mod redactor;
pub mod risk;
pub mod scanner;
