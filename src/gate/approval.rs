//! Override approval workflow
//!
//! An override is an approved exception allowing a gate to proceed despite a
//! failed scan, bounded by a justification and an optional expiry. Approval
//! is decided by an external [`Approver`] (a human or policy service); the
//! state machine tolerates that call failing or never resolving without
//! corrupting the failed gate.
//!
//! Expiry is evaluated lazily: there are no background timers, only the
//! [`OverrideApproval::is_valid_at`] predicate checked on each gate check.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::errors::GateError;
use crate::risk::RiskLevel;

/// Minimum length of a meaningful override justification
pub const MIN_JUSTIFICATION_CHARS: usize = 20;

/// Validate an override justification
///
/// Requires at least [`MIN_JUSTIFICATION_CHARS`] characters after trimming.
/// Rejection causes no state change and no audit entry.
pub fn validate_justification(justification: &str) -> Result<(), GateError> {
    let trimmed = justification.trim();
    if trimmed.chars().count() < MIN_JUSTIFICATION_CHARS {
        return Err(GateError::ValidationFailed(format!(
            "override justification must be at least {MIN_JUSTIFICATION_CHARS} characters, got {}",
            trimmed.chars().count()
        )));
    }
    Ok(())
}

/// A recorded override approval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverrideApproval {
    /// Whether the override was approved
    pub approved: bool,
    /// The requester's justification
    pub justification: String,
    /// Role of the approver (e.g. "privacy-officer")
    pub approver_role: String,
    /// Who reviewed the request
    pub reviewed_by: String,
    /// When the review happened
    pub reviewed_at: DateTime<Utc>,
    /// Optional expiry; past this instant the override is treated as absent
    pub expires_at: Option<DateTime<Utc>>,
    /// Conditions attached to the approval
    pub conditions: Vec<String>,
}

impl OverrideApproval {
    /// Whether the approval still authorizes passage at `now`
    ///
    /// An expired override is fail-equivalent for gating purposes; the
    /// historical audit trail is untouched.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.approved && self.expires_at.map_or(true, |expires| expires > now)
    }
}

/// Context handed to the external approver
#[derive(Debug, Clone, Serialize)]
pub struct OverrideRequest {
    /// Stage of the failed gate
    pub stage: String,
    /// Owning session
    pub session: String,
    /// The requester's justification (already validated)
    pub justification: String,
    /// Risk level of the failed scan
    pub risk_level: RiskLevel,
    /// Who is requesting the override
    pub requested_by: String,
    /// When the request was made
    pub requested_at: DateTime<Utc>,
}

/// The approver's verdict
#[derive(Debug, Clone)]
pub struct ApprovalDecision {
    /// Whether the override is granted
    pub approved: bool,
    /// Role of the reviewer
    pub approver_role: String,
    /// Identity of the reviewer
    pub reviewed_by: String,
    /// Optional expiry attached to the approval
    pub expires_at: Option<DateTime<Utc>>,
    /// Conditions attached to the approval
    pub conditions: Vec<String>,
    /// Reason text, surfaced on denial
    pub reason: Option<String>,
}

/// External, possibly-asynchronous override reviewer
#[async_trait]
pub trait Approver: Send + Sync {
    /// Review an override request
    ///
    /// # Errors
    ///
    /// An error here (reviewer unreachable, service down) leaves the gate in
    /// its failed state; it is not a denial.
    async fn review(&self, request: &OverrideRequest) -> Result<ApprovalDecision, GateError>;
}

/// Approver that always returns the same decision
///
/// Useful for tests and for deployments where approval policy is evaluated
/// upstream of the engine.
pub struct StaticApprover {
    decision: ApprovalDecision,
}

impl StaticApprover {
    /// Grant every request with the given role and optional expiry
    pub fn approving(role: impl Into<String>, expires_at: Option<DateTime<Utc>>) -> Self {
        let role = role.into();
        Self {
            decision: ApprovalDecision {
                approved: true,
                reviewed_by: role.clone(),
                approver_role: role,
                expires_at,
                conditions: Vec::new(),
                reason: None,
            },
        }
    }

    /// Deny every request with the given reason
    pub fn denying(role: impl Into<String>, reason: impl Into<String>) -> Self {
        let role = role.into();
        Self {
            decision: ApprovalDecision {
                approved: false,
                reviewed_by: role.clone(),
                approver_role: role,
                expires_at: None,
                conditions: Vec::new(),
                reason: Some(reason.into()),
            },
        }
    }

    /// Attach conditions to every approval
    pub fn with_conditions(mut self, conditions: Vec<String>) -> Self {
        self.decision.conditions = conditions;
        self
    }
}

#[async_trait]
impl Approver for StaticApprover {
    async fn review(&self, _request: &OverrideRequest) -> Result<ApprovalDecision, GateError> {
        Ok(self.decision.clone())
    }
}
