//! Integration tests for the gate state machine workflow

use aegis::catalog::PatternCatalog;
use aegis::domain::errors::{AegisError, GateError};
use aegis::domain::ids::{ScanScope, SessionId, StageId};
use aegis::gate::{
    AuditAction, GateKey, GateRegistry, GateStatus, JsonlAuditSink, MemoryAuditSink,
    StaticApprover,
};
use aegis::governance::{GovernancePolicy, OperatingMode};
use aegis::scanner::{Scanner, ScannerLimits};
use chrono::{Duration as ChronoDuration, Utc};
use std::sync::Arc;
use std::time::Duration;

const PHI_TEXT: &str = "Patient SSN 123-45-6789, contact nurse@clinic.org";
const CLEAN_TEXT: &str = "cohort size 412, median stay 4 days";
const JUSTIFICATION: &str = "IRB protocol 2026-114 approved disclosure to the study sponsor";

fn registry() -> (Arc<GateRegistry>, Arc<MemoryAuditSink>) {
    let catalog = Arc::new(PatternCatalog::default_rules().unwrap());
    let scanner = Scanner::new(catalog, ScannerLimits::default());
    let sink = Arc::new(MemoryAuditSink::new());
    let registry = Arc::new(GateRegistry::new(
        scanner,
        sink.clone(),
        GovernancePolicy::default(),
    ));
    (registry, sink)
}

fn key(stage: &str, session: &str) -> GateKey {
    GateKey::new(
        StageId::new(stage).unwrap(),
        SessionId::new(session).unwrap(),
    )
}

#[tokio::test]
async fn test_full_pass_workflow() {
    let (registry, sink) = registry();
    let k = key("upload", "sess-1");

    let (scan, decision) = registry
        .run_scan(&k, CLEAN_TEXT, ScanScope::upload(), OperatingMode::Live, "analyst")
        .await
        .unwrap();
    assert!(decision.allowed);
    assert!(!scan.has_findings());

    let outcome = registry.request_gate_check(&k, "pipeline").await.unwrap();
    assert!(outcome.passed);
    assert_eq!(outcome.status, GateStatus::Pass);

    assert_eq!(
        sink.actions(),
        vec![
            AuditAction::PhiScanStarted,
            AuditAction::PhiScanCompleted,
            AuditAction::PhiGatePassed,
        ]
    );
}

#[tokio::test]
async fn test_full_block_and_override_workflow() {
    let (registry, sink) = registry();
    let k = key("export", "sess-1");

    let (_, decision) = registry
        .run_scan(&k, PHI_TEXT, ScanScope::export(), OperatingMode::Live, "analyst")
        .await
        .unwrap();
    assert!(!decision.allowed);
    assert_eq!(registry.status(&k).await, Some(GateStatus::Fail));

    // A waiter parked before the override resolves with it.
    let waiter = {
        let registry = registry.clone();
        let k = k.clone();
        tokio::spawn(async move { registry.request_gate_check(&k, "pipeline").await })
    };
    tokio::task::yield_now().await;

    let approver = StaticApprover::approving(
        "privacy-officer",
        Some(Utc::now() + ChronoDuration::hours(24)),
    );
    let approval = registry
        .request_override(&k, JUSTIFICATION, "analyst", &approver)
        .await
        .unwrap();
    assert!(approval.approved);

    let outcome = waiter.await.unwrap().unwrap();
    assert!(outcome.passed);
    assert_eq!(outcome.status, GateStatus::Overridden);

    assert_eq!(sink.count(AuditAction::PhiDetected), 1);
    assert_eq!(sink.count(AuditAction::PhiOverrideApproved), 1);
}

#[tokio::test]
async fn test_expired_override_does_not_unblock() {
    let (registry, _) = registry();
    let k = key("export", "sess-1");

    registry
        .run_scan(&k, PHI_TEXT, ScanScope::export(), OperatingMode::Live, "analyst")
        .await
        .unwrap();

    let approver = StaticApprover::approving(
        "privacy-officer",
        Some(Utc::now() - ChronoDuration::minutes(5)),
    );
    registry
        .request_override(&k, JUSTIFICATION, "analyst", &approver)
        .await
        .unwrap();

    // Status shows the approval happened, but gating treats it as FAIL.
    assert_eq!(registry.status(&k).await, Some(GateStatus::Overridden));
    assert!(!registry.may_proceed(&k).await);

    let err = registry
        .request_gate_check_timeout(&k, "pipeline", Duration::from_millis(20))
        .await
        .unwrap_err();
    assert!(matches!(err, AegisError::Gate(GateError::Timeout)));
}

#[tokio::test]
async fn test_quarantine_then_remediate() {
    let (registry, sink) = registry();
    let k = key("export", "sess-1");

    registry
        .run_scan(&k, PHI_TEXT, ScanScope::export(), OperatingMode::Live, "analyst")
        .await
        .unwrap();

    registry.quarantine(&k, "privacy-officer").await.unwrap();
    assert_eq!(registry.status(&k).await, Some(GateStatus::Quarantined));
    assert!(!registry.may_proceed(&k).await);

    // Quarantine retains the findings for review.
    let quarantined = registry.scan_result(&k).await.unwrap();
    assert!(quarantined.has_findings());

    let fresh = registry.remediate(&k, "privacy-officer").await.unwrap();
    assert!(!fresh.has_findings());
    assert_eq!(registry.status(&k).await, Some(GateStatus::Pass));
    assert!(registry.may_proceed(&k).await);

    assert_eq!(sink.count(AuditAction::PhiQuarantined), 1);
    assert_eq!(sink.count(AuditAction::PhiRemediated), 1);
}

// The scan itself is synchronous CPU work, so the first scan needs its own
// worker thread for the second caller to observe the SCANNING window.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_scan_conflict() {
    let (registry, _) = registry();
    let k = key("export", "sess-1");

    // Enough text that the first scan holds the SCANNING window for a long
    // stretch of wall-clock time.
    let big_text = "zip 90210 and 10001 plus notes. ".repeat(20_000);

    let first = {
        let registry = registry.clone();
        let k = k.clone();
        let text = big_text.clone();
        tokio::spawn(async move {
            registry
                .run_scan(&k, &text, ScanScope::export(), OperatingMode::Live, "a")
                .await
        })
    };

    // The gate lock is released while the scan text is being processed, so
    // status() stays responsive; wait until the first scan is in flight.
    let deadline = std::time::Instant::now() + Duration::from_secs(10);
    while registry.status(&k).await != Some(GateStatus::Scanning) {
        assert!(
            std::time::Instant::now() < deadline,
            "first scan never entered SCANNING"
        );
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    let second = registry
        .run_scan(&k, CLEAN_TEXT, ScanScope::export(), OperatingMode::Live, "b")
        .await;
    match second {
        Err(AegisError::Gate(GateError::TransitionConflict { .. })) => {}
        other => panic!("expected transition conflict, got {other:?}"),
    }

    first.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_session_teardown_cancels_pending_checks() {
    let (registry, _) = registry();
    let k = key("export", "sess-1");

    registry
        .run_scan(&k, PHI_TEXT, ScanScope::export(), OperatingMode::Live, "analyst")
        .await
        .unwrap();

    let waiter = {
        let registry = registry.clone();
        let k = k.clone();
        tokio::spawn(async move { registry.request_gate_check(&k, "pipeline").await })
    };
    tokio::task::yield_now().await;

    registry.end_session(&SessionId::new("sess-1").unwrap());

    let err = waiter.await.unwrap().unwrap_err();
    assert!(matches!(err, AegisError::Gate(GateError::Cancelled)));
    assert_eq!(registry.status(&k).await, None);
}

#[tokio::test]
async fn test_audit_trail_is_one_entry_per_transition() {
    let (registry, sink) = registry();
    let k = key("export", "sess-1");

    registry
        .run_scan(&k, PHI_TEXT, ScanScope::export(), OperatingMode::Live, "analyst")
        .await
        .unwrap();
    let approver = StaticApprover::approving("privacy-officer", None);
    registry
        .request_override(&k, JUSTIFICATION, "analyst", &approver)
        .await
        .unwrap();
    registry.quarantine(&k, "privacy-officer").await.unwrap();
    registry.remediate(&k, "privacy-officer").await.unwrap();

    assert_eq!(
        sink.actions(),
        vec![
            AuditAction::PhiScanStarted,
            AuditAction::PhiScanCompleted,
            AuditAction::PhiDetected,
            AuditAction::PhiOverrideApproved,
            AuditAction::PhiQuarantined,
            AuditAction::PhiRemediated,
        ]
    );

    // The per-gate trail mirrors the sink.
    let trail = registry.audit_trail(&k).await;
    assert_eq!(trail.len(), sink.entries().len());
}

#[tokio::test]
async fn test_jsonl_sink_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("audit").join("gate.jsonl");

    let catalog = Arc::new(PatternCatalog::default_rules().unwrap());
    let scanner = Scanner::new(catalog, ScannerLimits::default());
    let sink = Arc::new(JsonlAuditSink::new(path.clone()).unwrap());
    let registry = GateRegistry::new(scanner, sink, GovernancePolicy::default());

    let k = key("export", "sess-1");
    registry
        .run_scan(&k, PHI_TEXT, ScanScope::export(), OperatingMode::Live, "analyst")
        .await
        .unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].contains("PHI_SCAN_STARTED"));
    assert!(lines[1].contains("PHI_SCAN_COMPLETED"));
    assert!(lines[2].contains("PHI_DETECTED"));

    // Raw values never reach the durable trail.
    assert!(!content.contains("123-45-6789"));
    assert!(!content.contains("nurse@clinic.org"));

    for line in lines {
        let entry: serde_json::Value = serde_json::from_str(line).unwrap();
        assert_eq!(entry["stage"], "export");
        assert_eq!(entry["session"], "sess-1");
    }
}
