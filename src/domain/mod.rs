//! Domain models and types for Aegis.
//!
//! This module contains the core domain types shared across the engine:
//!
//! - **Strongly-typed identifiers** ([`StageId`], [`SessionId`], [`ScanScope`])
//! - **Error types** ([`AegisError`], [`ScanError`], [`GateError`], [`AuditError`])
//! - **Result type alias** ([`Result`])
//!
//! # Type Safety
//!
//! Aegis uses the newtype pattern for identifiers to prevent mixing different
//! ID types:
//!
//! ```rust
//! use aegis::domain::{StageId, SessionId};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let stage = StageId::new("data-export")?;
//! let session = SessionId::new("7d44b88c-4199-4bad-97dc-d78268e01398")?;
//!
//! // This won't compile - type safety prevents mixing IDs
//! // let wrong: StageId = session;  // Compile error!
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, AegisError>`]:
//!
//! ```rust
//! use aegis::domain::Result;
//!
//! fn example() -> Result<()> {
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod ids;
pub mod result;

// Re-export commonly used types for convenience
pub use errors::{AegisError, AuditError, GateError, ScanError};
pub use ids::{ScanScope, SessionId, StageId};
pub use result::Result;
