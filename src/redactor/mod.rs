//! Redaction of scanned text
//!
//! Produces a redacted copy of the original text from a finding list.
//! Replacement walks findings by start offset **descending**, so every
//! not-yet-processed (lower) offset stays valid while higher offsets are
//! rewritten. That ordering is mandatory: ascending replacement would shift
//! every later span.
//!
//! Placeholders use the stable `[<TYPE>_REDACTED]` bracket format and are
//! chosen so that no catalog rule matches them - re-scanning redacted text
//! yields nothing new.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use aegis::catalog::PatternCatalog;
//! use aegis::domain::ScanScope;
//! use aegis::redactor::redact;
//! use aegis::scanner::{Scanner, ScannerLimits};
//!
//! # fn example() -> anyhow::Result<()> {
//! let catalog = Arc::new(PatternCatalog::default_rules()?);
//! let scanner = Scanner::new(catalog, ScannerLimits::default());
//!
//! let text = "SSN 123-45-6789";
//! let result = scanner.scan(text, ScanScope::export())?;
//! assert_eq!(redact(text, &result.findings), "SSN [SSN_REDACTED]");
//! # Ok(())
//! # }
//! ```

use crate::scanner::Finding;

/// Suffix of every redaction placeholder
pub const REDACTION_SUFFIX: &str = "_REDACTED";

/// Build the placeholder token for one finding
pub fn placeholder(finding: &Finding) -> String {
    format!("[{}{}]", finding.phi_type.label(), REDACTION_SUFFIX)
}

/// Replace every finding's span with its placeholder token
///
/// Findings are replaced in descending start order (ties: longer span first).
/// A finding whose span overlaps an already-replaced region is skipped, so
/// same-span duplicates from independent rules produce a single placeholder.
/// Empty findings return the input unchanged.
pub fn redact(text: &str, findings: &[Finding]) -> String {
    if findings.is_empty() {
        return text.to_string();
    }

    let mut ordered: Vec<&Finding> = findings.iter().collect();
    ordered.sort_by(|a, b| {
        b.span
            .start
            .cmp(&a.span.start)
            .then(b.span.end.cmp(&a.span.end))
    });

    let mut out = text.to_string();
    // Everything at or beyond this offset has already been rewritten.
    let mut rewritten_from = text.len();

    for finding in ordered {
        if finding.span.end > rewritten_from || finding.span.end > text.len() {
            continue;
        }
        out.replace_range(finding.span.start..finding.span.end, &placeholder(finding));
        rewritten_from = finding.span.start;
    }

    out
}
