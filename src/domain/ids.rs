//! Domain identifier types with validation
//!
//! This module provides newtype wrappers for gate and scan identifiers.
//! Each type ensures type safety and rejects empty values at construction.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Pipeline stage identifier newtype wrapper
///
/// Identifies one stage of a multi-stage research workflow
/// (e.g. "upload", "analysis", "export").
///
/// # Examples
///
/// ```
/// use aegis::domain::ids::StageId;
///
/// let stage = StageId::new("data-export").unwrap();
/// assert_eq!(stage.as_str(), "data-export");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StageId(String);

impl StageId {
    /// Creates a new StageId from a string
    ///
    /// # Errors
    ///
    /// Returns an error if the ID is empty or whitespace-only.
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("stage ID cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Returns the stage ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for StageId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Workflow session identifier newtype wrapper
///
/// Identifies one owning workflow session. Gate records are scoped to a
/// session and torn down with it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    /// Creates a new SessionId from a string
    ///
    /// # Errors
    ///
    /// Returns an error if the ID is empty or whitespace-only.
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("session ID cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Generates a fresh random session ID
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Returns the session ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Scope tag attached to a scan invocation
///
/// Describes which operation the scanned text belongs to. Free-form with
/// well-known values provided as constructors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScanScope(String);

impl ScanScope {
    /// Creates a scope tag from a string
    pub fn new(scope: impl Into<String>) -> Self {
        let scope = scope.into();
        if scope.trim().is_empty() {
            Self("unscoped".to_string())
        } else {
            Self(scope)
        }
    }

    /// Scope for uploaded artifacts
    pub fn upload() -> Self {
        Self("upload".to_string())
    }

    /// Scope for export operations
    pub fn export() -> Self {
        Self("export".to_string())
    }

    /// Scope for chat messages
    pub fn chat_message() -> Self {
        Self("chat-message".to_string())
    }

    /// Returns the scope as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScanScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
