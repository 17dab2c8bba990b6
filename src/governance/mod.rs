//! Governance decision engine
//!
//! Maps a scan result and an operating mode to an allow/deny/warn outcome.
//! [`decide`] is a pure function: the same scan result and mode always yield
//! the same decision, with no hidden state. The decision is computed on
//! demand and never persisted as an entity.
//!
//! Operating modes:
//! - **Live** - strict. Findings at or above the confidence threshold block
//!   the operation and the reason string is surfaced verbatim to the caller.
//! - **Demo** - advisory. Detections never block; the warning that Live
//!   would have blocked is surfaced instead.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::risk::RiskThresholds;
use crate::scanner::ScanResult;

/// Default confidence cutoff above which Live mode blocks
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.7;

/// Operating mode supplied by the caller per request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperatingMode {
    /// Advisory-only governance; never blocks
    Demo,
    /// Strict, blocking governance
    Live,
}

impl fmt::Display for OperatingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Demo => write!(f, "DEMO"),
            Self::Live => write!(f, "LIVE"),
        }
    }
}

/// Tunable governance cutoffs
///
/// The source constants (0.7 confidence, 5/10 finding counts) are preserved
/// as defaults; deployments may override them through configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GovernancePolicy {
    /// Maximum-finding-confidence cutoff for blocking in Live mode
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f32,
    /// Risk classifier cutoffs
    #[serde(default)]
    pub risk: RiskThresholds,
}

fn default_confidence_threshold() -> f32 {
    DEFAULT_CONFIDENCE_THRESHOLD
}

impl Default for GovernancePolicy {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            risk: RiskThresholds::default(),
        }
    }
}

impl GovernancePolicy {
    /// Validate threshold ranges and ordering
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(format!(
                "confidence threshold must be within [0, 1], got {}",
                self.confidence_threshold
            ));
        }
        self.risk.validate()
    }
}

/// Outcome of a governance decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceDecision {
    /// Whether the operation may proceed
    pub allowed: bool,
    /// Human-readable reason, surfaced verbatim on blocks
    pub reason: String,
    /// Advisory warning, surfaced even when allowed
    pub warning: Option<String>,
}

/// Decide whether an operation may proceed
///
/// Pure function of (scan result, mode, policy); re-derivable identically on
/// every call.
pub fn decide(
    scan: &ScanResult,
    mode: OperatingMode,
    policy: &GovernancePolicy,
) -> GovernanceDecision {
    if !scan.has_findings() {
        return GovernanceDecision {
            allowed: true,
            reason: "No PHI detected".to_string(),
            warning: None,
        };
    }

    let max_confidence = scan.max_confidence().unwrap_or(0.0);
    let over_threshold = max_confidence >= policy.confidence_threshold;

    match mode {
        OperatingMode::Live => {
            if over_threshold {
                GovernanceDecision {
                    allowed: false,
                    reason: format!(
                        "{} PHI pattern(s) detected at {} risk; operation blocked in LIVE mode",
                        scan.summary.total_matches, scan.risk_level
                    ),
                    warning: None,
                }
            } else {
                GovernanceDecision {
                    allowed: true,
                    reason: "Low-confidence PHI patterns detected".to_string(),
                    warning: Some(format!(
                        "{} low-confidence PHI pattern(s) detected (max confidence {:.2}, threshold {:.2}); review before release",
                        scan.summary.total_matches, max_confidence, policy.confidence_threshold
                    )),
                }
            }
        }
        OperatingMode::Demo => GovernanceDecision {
            allowed: true,
            reason: "DEMO mode - PHI checks are advisory only".to_string(),
            warning: Some(if over_threshold {
                format!(
                    "{} PHI pattern(s) at {} risk would be blocked in LIVE mode",
                    scan.summary.total_matches, scan.risk_level
                )
            } else {
                format!(
                    "{} low-confidence PHI pattern(s) detected; LIVE mode would allow with a warning",
                    scan.summary.total_matches
                )
            }),
        },
    }
}
