//! Gate state machine
//!
//! A gate is a checkpoint bound to a pipeline stage that must resolve to
//! "may proceed" before the stage continues. This module tracks PHI status
//! per (stage, session) pair, runs the scan/override/quarantine/remediate
//! workflow, and emits one audit entry per transition.
//!
//! # States
//!
//! ```text
//! UNCHECKED ──▶ SCANNING ──▶ PASS
//!                   │
//!                   ▼
//!                 FAIL ──▶ QUARANTINED
//!                   │ ──▶ OVERRIDDEN (approval workflow)
//!                   │ ──▶ PASS       (remediation)
//! ```
//!
//! Any settled state re-enters `SCANNING` when a fresh scan is requested.
//! "May proceed" means `PASS`, or `OVERRIDDEN` with an unexpired approval;
//! an expired override gates exactly like `FAIL`.

pub mod approval;
pub mod audit;
pub mod machine;

use serde::{Deserialize, Serialize};
use std::fmt;

// Re-export main types
pub use approval::{
    ApprovalDecision, Approver, OverrideApproval, OverrideRequest, StaticApprover,
    MIN_JUSTIFICATION_CHARS,
};
pub use audit::{AuditAction, AuditEntry, AuditSink, JsonlAuditSink, MemoryAuditSink};
pub use machine::{GateCheckOutcome, GateKey, GateRegistry};

/// Gate status per (stage, session)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GateStatus {
    /// No scan has run yet
    Unchecked,
    /// A scan is in flight (transient)
    Scanning,
    /// Last scan allowed the operation
    Pass,
    /// Last scan blocked the operation
    Fail,
    /// Findings isolated, not remediated
    Quarantined,
    /// Override approval granted
    Overridden,
}

impl fmt::Display for GateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Unchecked => "UNCHECKED",
            Self::Scanning => "SCANNING",
            Self::Pass => "PASS",
            Self::Fail => "FAIL",
            Self::Quarantined => "QUARANTINED",
            Self::Overridden => "OVERRIDDEN",
        };
        write!(f, "{s}")
    }
}
