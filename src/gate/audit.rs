//! Audit trail for gate transitions
//!
//! Every gate state transition emits exactly one [`AuditEntry`] to an
//! [`AuditSink`], synchronously, before the transition is considered
//! complete. The trail is the durable record for compliance reporting.
//! Findings appear by hash/type/span only; no sink output ever contains
//! a raw matched value.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;
use uuid::Uuid;

use crate::domain::errors::AuditError;
use crate::gate::GateStatus;
use crate::scanner::Finding;

/// Gate transition audit actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditAction {
    /// A scan began on the gate
    #[serde(rename = "PHI_SCAN_STARTED")]
    PhiScanStarted,
    /// A scan finished and the gate settled
    #[serde(rename = "PHI_SCAN_COMPLETED")]
    PhiScanCompleted,
    /// The completed scan produced findings
    #[serde(rename = "PHI_DETECTED")]
    PhiDetected,
    /// A gate check found the gate passable
    #[serde(rename = "PHI_GATE_PASSED")]
    PhiGatePassed,
    /// A pending gate check was cancelled
    #[serde(rename = "PHI_GATE_BLOCKED")]
    PhiGateBlocked,
    /// An override was approved
    #[serde(rename = "PHI_OVERRIDE_APPROVED")]
    PhiOverrideApproved,
    /// An override was reviewed and denied
    #[serde(rename = "PHI_OVERRIDE_DENIED")]
    PhiOverrideDenied,
    /// Findings were isolated without remediation
    #[serde(rename = "PHI_QUARANTINED")]
    PhiQuarantined,
    /// Findings were cleared and the gate passed
    #[serde(rename = "PHI_REMEDIATED")]
    PhiRemediated,
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::PhiScanStarted => "PHI_SCAN_STARTED",
            Self::PhiScanCompleted => "PHI_SCAN_COMPLETED",
            Self::PhiDetected => "PHI_DETECTED",
            Self::PhiGatePassed => "PHI_GATE_PASSED",
            Self::PhiGateBlocked => "PHI_GATE_BLOCKED",
            Self::PhiOverrideApproved => "PHI_OVERRIDE_APPROVED",
            Self::PhiOverrideDenied => "PHI_OVERRIDE_DENIED",
            Self::PhiQuarantined => "PHI_QUARANTINED",
            Self::PhiRemediated => "PHI_REMEDIATED",
        };
        write!(f, "{s}")
    }
}

/// One append-only, write-once audit record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Unique entry ID
    pub id: Uuid,
    /// What happened
    pub action: AuditAction,
    /// Gate status after the transition
    pub resulting_status: GateStatus,
    /// Pipeline stage the gate belongs to
    pub stage: String,
    /// Owning workflow session
    pub session: String,
    /// Findings by hash/type/span only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub findings: Option<Vec<Finding>>,
    /// Who triggered the transition
    pub actor: String,
    /// When the transition happened
    pub timestamp: DateTime<Utc>,
    /// Action-specific details
    pub metadata: serde_json::Value,
}

impl AuditEntry {
    /// Build a new entry stamped with the current time
    pub fn new(
        action: AuditAction,
        resulting_status: GateStatus,
        stage: impl Into<String>,
        session: impl Into<String>,
        actor: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            action,
            resulting_status,
            stage: stage.into(),
            session: session.into(),
            findings: None,
            actor: actor.into(),
            timestamp: Utc::now(),
            metadata: serde_json::Value::Null,
        }
    }

    /// Attach findings (hash-identified only)
    pub fn with_findings(mut self, findings: Vec<Finding>) -> Self {
        self.findings = Some(findings);
        self
    }

    /// Attach metadata
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Append-only destination for audit entries
///
/// The engine does not own durable storage; it guarantees one entry per
/// transition, emitted synchronously before the transition completes.
pub trait AuditSink: Send + Sync {
    /// Persist one entry
    fn record(&self, entry: &AuditEntry) -> Result<(), AuditError>;
}

/// JSON-lines file sink
///
/// Appends one JSON object per entry. The parent directory is created on
/// construction.
pub struct JsonlAuditSink {
    path: PathBuf,
}

impl JsonlAuditSink {
    /// Create a sink writing to the given path
    pub fn new(path: PathBuf) -> Result<Self, AuditError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AuditError::WriteFailed(format!(
                    "failed to create audit log directory {}: {e}",
                    parent.display()
                ))
            })?;
        }
        Ok(Self { path })
    }

    /// The log file path
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl AuditSink for JsonlAuditSink {
    fn record(&self, entry: &AuditEntry) -> Result<(), AuditError> {
        let line = serde_json::to_string(entry)
            .map_err(|e| AuditError::SerializationFailed(e.to_string()))?;

        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| {
                AuditError::WriteFailed(format!(
                    "failed to open audit log {}: {e}",
                    self.path.display()
                ))
            })?;

        writeln!(file, "{line}").map_err(|e| AuditError::WriteFailed(e.to_string()))?;
        Ok(())
    }
}

/// In-memory sink for tests and embedding
#[derive(Default)]
pub struct MemoryAuditSink {
    entries: Mutex<Vec<AuditEntry>>,
}

impl MemoryAuditSink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all recorded entries
    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries.lock().expect("audit sink poisoned").clone()
    }

    /// Actions in emission order
    pub fn actions(&self) -> Vec<AuditAction> {
        self.entries().iter().map(|e| e.action).collect()
    }

    /// Count of entries with the given action
    pub fn count(&self, action: AuditAction) -> usize {
        self.entries().iter().filter(|e| e.action == action).count()
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, entry: &AuditEntry) -> Result<(), AuditError> {
        self.entries
            .lock()
            .expect("audit sink poisoned")
            .push(entry.clone());
        Ok(())
    }
}

/// Sink that always fails, for rollback tests
#[cfg(test)]
pub(crate) struct FailingAuditSink;

#[cfg(test)]
impl AuditSink for FailingAuditSink {
    fn record(&self, _entry: &AuditEntry) -> Result<(), AuditError> {
        Err(AuditError::WriteFailed("sink unavailable".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn entry() -> AuditEntry {
        AuditEntry::new(
            AuditAction::PhiGatePassed,
            GateStatus::Pass,
            "upload",
            "sess-1",
            "tester",
        )
    }

    #[test]
    fn test_jsonl_sink_appends() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("audit").join("gate.jsonl");
        let sink = JsonlAuditSink::new(path.clone()).unwrap();

        sink.record(&entry()).unwrap();
        sink.record(&entry()).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(content.contains("PHI_GATE_PASSED"));
    }

    #[test]
    fn test_jsonl_entries_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("gate.jsonl");
        let sink = JsonlAuditSink::new(path.clone()).unwrap();
        sink.record(&entry()).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let parsed: AuditEntry = serde_json::from_str(content.lines().next().unwrap()).unwrap();
        assert_eq!(parsed.action, AuditAction::PhiGatePassed);
        assert_eq!(parsed.stage, "upload");
    }

    #[test]
    fn test_memory_sink_counts() {
        let sink = MemoryAuditSink::new();
        sink.record(&entry()).unwrap();
        sink.record(&entry()).unwrap();
        assert_eq!(sink.count(AuditAction::PhiGatePassed), 2);
        assert_eq!(sink.count(AuditAction::PhiQuarantined), 0);
        assert_eq!(
            sink.actions(),
            vec![AuditAction::PhiGatePassed, AuditAction::PhiGatePassed]
        );
    }

    #[test]
    fn test_action_labels() {
        assert_eq!(AuditAction::PhiScanStarted.to_string(), "PHI_SCAN_STARTED");
        assert_eq!(
            AuditAction::PhiOverrideApproved.to_string(),
            "PHI_OVERRIDE_APPROVED"
        );
        let json = serde_json::to_string(&AuditAction::PhiDetected).unwrap();
        assert_eq!(json, "\"PHI_DETECTED\"");
    }
}
