//! Gate registry and transition logic
//!
//! The registry holds one [`GateRecord`] per (stage, session) pair behind a
//! per-gate async lock; that lock is the single point of serialization for
//! concurrent callers on the same gate. Waiting gate checks suspend on a
//! oneshot channel and receive exactly one resolution event.
//!
//! Every transition emits its audit entry synchronously, before the
//! in-memory state is mutated; a failed audit write aborts the transition
//! with the record unchanged.

use chrono::Utc;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex as StdMutex;
use std::time::Duration;
use tokio::sync::{oneshot, Mutex};

use crate::domain::errors::{AegisError, GateError};
use crate::domain::ids::{ScanScope, SessionId, StageId};
use crate::domain::Result;
use crate::gate::approval::{
    validate_justification, Approver, OverrideApproval, OverrideRequest,
};
use crate::gate::audit::{AuditAction, AuditEntry, AuditSink};
use crate::gate::GateStatus;
use crate::governance::{decide, GovernanceDecision, GovernancePolicy, OperatingMode};
use crate::risk::RiskLevel;
use crate::scanner::{ScanResult, Scanner};

/// Key identifying one gate
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GateKey {
    /// Pipeline stage the gate guards
    pub stage: StageId,
    /// Owning workflow session
    pub session: SessionId,
}

impl GateKey {
    /// Build a key from a stage and session
    pub fn new(stage: StageId, session: SessionId) -> Self {
        Self { stage, session }
    }
}

/// Resolution delivered to a gate check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateCheckOutcome {
    /// Whether the stage may proceed
    pub passed: bool,
    /// Gate status at resolution time
    pub status: GateStatus,
}

/// Per-gate state
struct GateRecord {
    stage: String,
    session: String,
    status: GateStatus,
    scan: Option<Arc<ScanResult>>,
    decision: Option<GovernanceDecision>,
    approval: Option<OverrideApproval>,
    audit_trail: Vec<AuditEntry>,
    waiters: Vec<oneshot::Sender<GateCheckOutcome>>,
}

impl GateRecord {
    fn new(key: &GateKey) -> Self {
        Self {
            stage: key.stage.to_string(),
            session: key.session.to_string(),
            status: GateStatus::Unchecked,
            scan: None,
            decision: None,
            approval: None,
            audit_trail: Vec::new(),
            waiters: Vec::new(),
        }
    }

    /// The "may proceed" predicate: PASS, or OVERRIDDEN with a live approval
    fn may_proceed(&self, now: chrono::DateTime<chrono::Utc>) -> bool {
        match self.status {
            GateStatus::Pass => true,
            GateStatus::Overridden => self
                .approval
                .as_ref()
                .map_or(false, |a| a.is_valid_at(now)),
            _ => false,
        }
    }

    fn resolve_waiters(&mut self, outcome: GateCheckOutcome) {
        for tx in self.waiters.drain(..) {
            // A waiter that gave up (timeout) has dropped its receiver.
            let _ = tx.send(outcome);
        }
    }
}

/// Registry of gates, keyed by (stage, session)
///
/// Shareable across tasks behind an `Arc`. The scanner and policy are fixed
/// at construction; the operating mode arrives with each scan request.
pub struct GateRegistry {
    scanner: Arc<Scanner>,
    policy: GovernancePolicy,
    sink: Arc<dyn AuditSink>,
    gates: StdMutex<HashMap<GateKey, Arc<Mutex<GateRecord>>>>,
}

impl GateRegistry {
    /// Create a registry over a scanner, audit sink, and policy
    pub fn new(scanner: Scanner, sink: Arc<dyn AuditSink>, policy: GovernancePolicy) -> Self {
        Self {
            scanner: Arc::new(scanner),
            policy,
            sink,
            gates: StdMutex::new(HashMap::new()),
        }
    }

    fn gate(&self, key: &GateKey) -> Arc<Mutex<GateRecord>> {
        let mut gates = self.gates.lock().expect("gate map poisoned");
        gates
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(GateRecord::new(key))))
            .clone()
    }

    /// Emit the audit entry for a transition, then apply it
    ///
    /// The sink write happens first; on failure the record is untouched.
    fn commit(
        &self,
        rec: &mut GateRecord,
        action: AuditAction,
        new_status: GateStatus,
        findings: Option<Vec<crate::scanner::Finding>>,
        actor: &str,
        metadata: serde_json::Value,
    ) -> std::result::Result<(), crate::domain::errors::AuditError> {
        let mut entry = AuditEntry::new(action, new_status, &rec.stage, &rec.session, actor);
        if let Some(findings) = findings {
            entry = entry.with_findings(findings);
        }
        if !metadata.is_null() {
            entry = entry.with_metadata(metadata);
        }
        self.sink.record(&entry)?;
        rec.status = new_status;
        rec.audit_trail.push(entry);
        Ok(())
    }

    /// Check whether a stage may proceed, suspending until the gate resolves
    ///
    /// If the gate is already passable a `PHI_GATE_PASSED` entry is emitted
    /// and the call returns immediately - no implicit rescan. Otherwise the
    /// caller suspends until a scan, override, remediation, or cancellation
    /// resolves the gate; the caller receives a single resolution event.
    pub async fn request_gate_check(&self, key: &GateKey, actor: &str) -> Result<GateCheckOutcome> {
        let gate = self.gate(key);
        let rx = {
            let mut rec = gate.lock().await;
            if rec.may_proceed(Utc::now()) {
                let status = rec.status;
                self.commit(
                    &mut rec,
                    AuditAction::PhiGatePassed,
                    status,
                    None,
                    actor,
                    serde_json::Value::Null,
                )?;
                return Ok(GateCheckOutcome {
                    passed: true,
                    status,
                });
            }

            tracing::debug!(
                stage = %rec.stage,
                session = %rec.session,
                status = %rec.status,
                "gate not passable, suspending caller"
            );
            let (tx, rx) = oneshot::channel();
            rec.waiters.push(tx);
            rx
        };

        rx.await
            .map_err(|_| AegisError::from(GateError::Cancelled))
    }

    /// [`request_gate_check`](Self::request_gate_check) with a safety-net timeout
    pub async fn request_gate_check_timeout(
        &self,
        key: &GateKey,
        actor: &str,
        timeout: Duration,
    ) -> Result<GateCheckOutcome> {
        match tokio::time::timeout(timeout, self.request_gate_check(key, actor)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(GateError::Timeout.into()),
        }
    }

    /// Run a scan on a gate and settle it to PASS or FAIL
    ///
    /// The gate holds `SCANNING` while the text is scanned; a concurrent
    /// scan attempt on the same gate gets `TransitionConflict` and may
    /// retry. Input problems fail fast before any transition is recorded.
    pub async fn run_scan(
        &self,
        key: &GateKey,
        text: &str,
        scope: ScanScope,
        mode: OperatingMode,
        actor: &str,
    ) -> Result<(Arc<ScanResult>, GovernanceDecision)> {
        self.scanner.validate_input(text)?;

        let gate = self.gate(key);

        let prior = {
            let mut rec = gate.lock().await;
            if rec.status == GateStatus::Scanning {
                return Err(GateError::TransitionConflict {
                    stage: rec.stage.clone(),
                    session: rec.session.clone(),
                    detail: "a scan is already in progress".to_string(),
                }
                .into());
            }
            let prior = rec.status;
            self.commit(
                &mut rec,
                AuditAction::PhiScanStarted,
                GateStatus::Scanning,
                None,
                actor,
                json!({ "scope": scope.as_str(), "mode": mode.to_string() }),
            )?;
            prior
        };

        // Pure CPU-bound work, outside the gate lock so the SCANNING window
        // is observable to concurrent callers.
        let scan = match self.scanner.scan(text, scope) {
            Ok(scan) => Arc::new(scan),
            Err(e) => {
                let mut rec = gate.lock().await;
                rec.status = prior;
                return Err(e.into());
            }
        };
        let decision = decide(&scan, mode, &self.policy);
        let settled = if decision.allowed {
            GateStatus::Pass
        } else {
            GateStatus::Fail
        };

        let mut rec = gate.lock().await;
        let completed_meta = json!({
            "mode": mode.to_string(),
            "risk_level": scan.risk_level.to_string(),
            "total_matches": scan.summary.total_matches,
            "allowed": decision.allowed,
            "reason": decision.reason.clone(),
        });
        if let Err(e) = self.commit(
            &mut rec,
            AuditAction::PhiScanCompleted,
            settled,
            None,
            actor,
            completed_meta,
        ) {
            rec.status = prior;
            return Err(e.into());
        }
        if scan.has_findings() {
            let detected_meta = json!({
                "unique_types": scan.summary.unique_types,
                "critical_count": scan.summary.critical_count,
            });
            if let Err(e) = self.commit(
                &mut rec,
                AuditAction::PhiDetected,
                settled,
                Some(scan.findings.clone()),
                actor,
                detected_meta,
            ) {
                rec.status = prior;
                return Err(e.into());
            }
        }

        rec.scan = Some(scan.clone());
        rec.decision = Some(decision.clone());
        // A fresh scan supersedes any earlier override.
        rec.approval = None;
        if decision.allowed {
            rec.resolve_waiters(GateCheckOutcome {
                passed: true,
                status: settled,
            });
        }

        tracing::info!(
            stage = %rec.stage,
            session = %rec.session,
            status = %settled,
            risk_level = %scan.risk_level,
            total_matches = scan.summary.total_matches,
            "gate scan settled"
        );

        Ok((scan, decision))
    }

    /// Request an override for a failed gate
    ///
    /// Valid only from `FAIL`. The justification is validated locally
    /// before the external approver is consulted; a rejected justification
    /// causes no state change and no audit entry. The gate lock is released
    /// while the approver deliberates, so a hung reviewer never wedges the
    /// gate; the failed state is re-verified afterwards.
    pub async fn request_override(
        &self,
        key: &GateKey,
        justification: &str,
        actor: &str,
        approver: &dyn Approver,
    ) -> Result<OverrideApproval> {
        validate_justification(justification)?;

        let gate = self.gate(key);
        let request = {
            let rec = gate.lock().await;
            if rec.status != GateStatus::Fail {
                return Err(GateError::InvalidTransition {
                    from: rec.status,
                    action: "request override",
                }
                .into());
            }
            OverrideRequest {
                stage: rec.stage.clone(),
                session: rec.session.clone(),
                justification: justification.to_string(),
                risk_level: rec
                    .scan
                    .as_ref()
                    .map(|s| s.risk_level)
                    .unwrap_or(RiskLevel::None),
                requested_by: actor.to_string(),
                requested_at: Utc::now(),
            }
        };

        let verdict = approver.review(&request).await?;

        let mut rec = gate.lock().await;
        if rec.status != GateStatus::Fail {
            return Err(GateError::TransitionConflict {
                stage: rec.stage.clone(),
                session: rec.session.clone(),
                detail: "gate changed while the override was under review".to_string(),
            }
            .into());
        }

        if !verdict.approved {
            let reason = verdict
                .reason
                .clone()
                .unwrap_or_else(|| "denied by approver".to_string());
            self.commit(
                &mut rec,
                AuditAction::PhiOverrideDenied,
                GateStatus::Fail,
                None,
                actor,
                json!({ "reviewed_by": verdict.reviewed_by, "reason": reason.clone() }),
            )?;
            return Err(GateError::ApprovalDenied { reason }.into());
        }

        let now = Utc::now();
        let approval = OverrideApproval {
            approved: true,
            justification: justification.to_string(),
            approver_role: verdict.approver_role,
            reviewed_by: verdict.reviewed_by,
            reviewed_at: now,
            expires_at: verdict.expires_at,
            conditions: verdict.conditions,
        };

        self.commit(
            &mut rec,
            AuditAction::PhiOverrideApproved,
            GateStatus::Overridden,
            None,
            actor,
            json!({
                "approver_role": approval.approver_role.clone(),
                "expires_at": approval.expires_at,
                "conditions": approval.conditions.clone(),
            }),
        )?;
        rec.approval = Some(approval.clone());

        // An approval expired at creation time never unblocks anyone.
        if approval.is_valid_at(now) {
            rec.resolve_waiters(GateCheckOutcome {
                passed: true,
                status: GateStatus::Overridden,
            });
        }

        Ok(approval)
    }

    /// Isolate a gate's findings without remediation
    ///
    /// Valid from any state whose last scan has findings; the findings are
    /// retained.
    pub async fn quarantine(&self, key: &GateKey, actor: &str) -> Result<()> {
        let gate = self.gate(key);
        let mut rec = gate.lock().await;

        let finding_count = rec
            .scan
            .as_ref()
            .map(|s| s.summary.total_matches)
            .unwrap_or(0);
        if finding_count == 0 {
            return Err(GateError::InvalidTransition {
                from: rec.status,
                action: "quarantine",
            }
            .into());
        }

        self.commit(
            &mut rec,
            AuditAction::PhiQuarantined,
            GateStatus::Quarantined,
            None,
            actor,
            json!({ "finding_count": finding_count }),
        )?;
        Ok(())
    }

    /// Clear a gate's findings and settle it to PASS
    ///
    /// Issues a fresh empty-findings scan result rather than mutating the
    /// old one; the superseded result stays reachable through the audit
    /// trail.
    pub async fn remediate(&self, key: &GateKey, actor: &str) -> Result<Arc<ScanResult>> {
        let gate = self.gate(key);
        let mut rec = gate.lock().await;

        let Some(old) = rec.scan.clone() else {
            return Err(GateError::InvalidTransition {
                from: rec.status,
                action: "remediate",
            }
            .into());
        };

        let fresh = Arc::new(ScanResult::empty(old.scope.clone()));
        self.commit(
            &mut rec,
            AuditAction::PhiRemediated,
            GateStatus::Pass,
            None,
            actor,
            json!({ "cleared_findings": old.summary.total_matches }),
        )?;
        rec.scan = Some(fresh.clone());
        rec.decision = None;
        rec.approval = None;
        rec.resolve_waiters(GateCheckOutcome {
            passed: true,
            status: GateStatus::Pass,
        });

        Ok(fresh)
    }

    /// Cancel all pending gate checks on a gate
    ///
    /// Emits `PHI_GATE_BLOCKED` and resolves every waiter with
    /// `passed: false`. The gate status itself is unchanged.
    pub async fn cancel(&self, key: &GateKey, actor: &str) -> Result<()> {
        let gate = self.gate(key);
        let mut rec = gate.lock().await;

        let status = rec.status;
        let pending = rec.waiters.len();
        self.commit(
            &mut rec,
            AuditAction::PhiGateBlocked,
            status,
            None,
            actor,
            json!({ "pending_waiters": pending }),
        )?;
        rec.resolve_waiters(GateCheckOutcome {
            passed: false,
            status,
        });
        Ok(())
    }

    /// Tear down all gates owned by a session
    ///
    /// Pending waiters are cancelled; audit history already written to the
    /// sink is retained there.
    pub fn end_session(&self, session: &SessionId) {
        let removed: Vec<_> = {
            let mut gates = self.gates.lock().expect("gate map poisoned");
            let keys: Vec<_> = gates
                .keys()
                .filter(|k| &k.session == session)
                .cloned()
                .collect();
            keys.into_iter().filter_map(|k| gates.remove(&k)).collect()
        };

        for gate in removed {
            // Dropping the senders resolves pending receivers with Cancelled.
            if let Ok(mut rec) = gate.try_lock() {
                rec.waiters.clear();
            }
        }
    }

    /// Current status of a gate, if it exists
    pub async fn status(&self, key: &GateKey) -> Option<GateStatus> {
        let gate = {
            let gates = self.gates.lock().expect("gate map poisoned");
            gates.get(key).cloned()
        }?;
        let rec = gate.lock().await;
        Some(rec.status)
    }

    /// Whether a gate currently reports "may proceed"
    pub async fn may_proceed(&self, key: &GateKey) -> bool {
        let gate = {
            let gates = self.gates.lock().expect("gate map poisoned");
            gates.get(key).cloned()
        };
        match gate {
            Some(gate) => gate.lock().await.may_proceed(Utc::now()),
            None => false,
        }
    }

    /// Snapshot of a gate's audit trail
    pub async fn audit_trail(&self, key: &GateKey) -> Vec<AuditEntry> {
        let gate = {
            let gates = self.gates.lock().expect("gate map poisoned");
            gates.get(key).cloned()
        };
        match gate {
            Some(gate) => gate.lock().await.audit_trail.clone(),
            None => Vec::new(),
        }
    }

    /// Last governance decision recorded on a gate
    pub async fn decision(&self, key: &GateKey) -> Option<GovernanceDecision> {
        let gate = {
            let gates = self.gates.lock().expect("gate map poisoned");
            gates.get(key).cloned()
        }?;
        let rec = gate.lock().await;
        rec.decision.clone()
    }

    /// Last scan result recorded on a gate
    pub async fn scan_result(&self, key: &GateKey) -> Option<Arc<ScanResult>> {
        let gate = {
            let gates = self.gates.lock().expect("gate map poisoned");
            gates.get(key).cloned()
        }?;
        let rec = gate.lock().await;
        rec.scan.clone()
    }
}
