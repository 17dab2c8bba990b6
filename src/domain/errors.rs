//! Domain error types
//!
//! This module defines the error hierarchy for Aegis. All errors are
//! domain-specific and don't expose third-party types. Scanner, redactor,
//! and decision errors are local failures returned to the immediate caller;
//! gate transition failures never leave a gate half-updated.

use thiserror::Error;

use crate::gate::GateStatus;

/// Main Aegis error type
///
/// This is the primary error type used throughout the engine.
/// It wraps subsystem-specific error types and provides context for
/// error handling.
#[derive(Debug, Error)]
pub enum AegisError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Scanner input errors
    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),

    /// Gate state machine errors
    #[error("Gate error: {0}")]
    Gate(#[from] GateError),

    /// Audit sink errors
    #[error("Audit error: {0}")]
    Audit(#[from] AuditError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

/// Scanner input errors
///
/// A scan is all-or-nothing: any of these means no `ScanResult` was produced
/// and nothing was recorded.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScanError {
    /// Input exceeds the configured byte limit
    #[error("input too large: {len} bytes exceeds limit of {max}")]
    InputTooLarge { len: usize, max: usize },

    /// Input is not valid UTF-8
    #[error("input is not valid UTF-8")]
    InvalidEncoding,
}

/// Gate state machine errors
///
/// `ApprovalDenied` and an expired override are normal workflow outcomes,
/// not corruption: the gate stays in `Fail` and the audit trail records what
/// happened.
#[derive(Debug, Error)]
pub enum GateError {
    /// Override justification failed validation; no state change occurred
    #[error("validation failed: {0}")]
    ValidationFailed(String),

    /// Another caller is concurrently transitioning the same gate
    #[error("gate transition conflict for stage '{stage}' session '{session}': {detail}")]
    TransitionConflict {
        stage: String,
        session: String,
        detail: String,
    },

    /// The requested action is not valid from the current status
    #[error("invalid transition: cannot {action} from {from:?}")]
    InvalidTransition {
        from: GateStatus,
        action: &'static str,
    },

    /// The external approver declined the override; gate remains failed
    #[error("override denied: {reason}")]
    ApprovalDenied { reason: String },

    /// The external approver could not be reached or errored out
    #[error("approver unavailable: {0}")]
    ApproverUnavailable(String),

    /// A pending gate check was cancelled by the caller
    #[error("gate check cancelled")]
    Cancelled,

    /// A pending gate check hit its safety-net timeout
    #[error("gate check timed out")]
    Timeout,
}

/// Audit sink errors
///
/// Emission is synchronous and precedes transition completion; a failed write
/// aborts the transition.
#[derive(Debug, Error)]
pub enum AuditError {
    /// The sink could not persist the entry
    #[error("failed to write audit entry: {0}")]
    WriteFailed(String),

    /// The entry could not be serialized
    #[error("failed to serialize audit entry: {0}")]
    SerializationFailed(String),
}

// Conversion from std::io::Error
impl From<std::io::Error> for AegisError {
    fn from(err: std::io::Error) -> Self {
        AegisError::Io(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for AegisError {
    fn from(err: toml::de::Error) -> Self {
        AegisError::Configuration(format!("TOML parse error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aegis_error_display() {
        let err = AegisError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_scan_error_conversion() {
        let scan_err = ScanError::InputTooLarge {
            len: 2048,
            max: 1024,
        };
        let err: AegisError = scan_err.into();
        assert!(matches!(err, AegisError::Scan(_)));
        assert!(err.to_string().contains("2048"));
    }

    #[test]
    fn test_gate_error_conversion() {
        let gate_err = GateError::ValidationFailed("justification too short".to_string());
        let err: AegisError = gate_err.into();
        assert!(matches!(err, AegisError::Gate(_)));
    }

    #[test]
    fn test_audit_error_conversion() {
        let audit_err = AuditError::WriteFailed("disk full".to_string());
        let err: AegisError = audit_err.into();
        assert!(matches!(err, AegisError::Audit(_)));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: AegisError = io_err.into();
        assert!(matches!(err, AegisError::Io(_)));
    }

    #[test]
    fn test_invalid_transition_display() {
        let err = GateError::InvalidTransition {
            from: GateStatus::Unchecked,
            action: "quarantine",
        };
        assert!(err.to_string().contains("quarantine"));
        assert!(err.to_string().contains("Unchecked"));
    }

    #[test]
    fn test_errors_implement_std_error() {
        let err = AegisError::Configuration("test".to_string());
        let _: &dyn std::error::Error = &err;
        let scan = ScanError::InvalidEncoding;
        let _: &dyn std::error::Error = &scan;
    }
}
