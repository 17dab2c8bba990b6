//! PHI scanner
//!
//! Applies the injected [`PatternCatalog`](crate::catalog::PatternCatalog)
//! to free text and produces an immutable [`ScanResult`]. Matched substrings
//! are hashed the moment they are seen; no finding, log line, or audit entry
//! ever carries the raw value.
//!
//! Scanning is pure and CPU-bound with no suspension points. A scanner can
//! be shared across tasks behind an `Arc`; the catalog is read-only.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use aegis::catalog::PatternCatalog;
//! use aegis::domain::ScanScope;
//! use aegis::scanner::{Scanner, ScannerLimits};
//!
//! # fn example() -> anyhow::Result<()> {
//! let catalog = Arc::new(PatternCatalog::default_rules()?);
//! let scanner = Scanner::new(catalog, ScannerLimits::default());
//!
//! let result = scanner.scan("SSN 123-45-6789", ScanScope::upload())?;
//! assert!(!result.findings.is_empty());
//! # Ok(())
//! # }
//! ```

pub mod hash;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::catalog::{PatternCatalog, PatternRule, PhiType};
use crate::domain::errors::ScanError;
use crate::domain::ids::ScanScope;
use crate::risk::{classify, RiskLevel, RiskThresholds, ScanSummary};

use hash::short_hash;

/// Default cap on scan input size
pub const DEFAULT_MAX_INPUT_BYTES: usize = 1_048_576;

/// Bytes of preceding text inspected for context keywords
pub const CONTEXT_WINDOW_BYTES: usize = 40;

/// Confidence bump applied when a context keyword precedes a match
pub const CONTEXT_CONFIDENCE_BOOST: f32 = 0.1;

/// Byte span of a match within the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    /// Start offset (inclusive)
    pub start: usize,
    /// End offset (exclusive)
    pub end: usize,
}

impl Span {
    /// Span length in bytes
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the span is empty
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// One detected PHI match
///
/// Identified only by hash, length, span, and type - never by raw value.
/// Created only by the scanner and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    /// PHI type this match was detected as
    pub phi_type: PhiType,
    /// Truncated one-way digest of the matched substring
    pub value_hash: String,
    /// Byte length of the matched substring
    pub value_length: usize,
    /// Byte span within the source text
    pub span: Span,
    /// Confidence after context-keyword adjustment
    pub confidence: f32,
    /// HIPAA identifier category index (1..=18)
    pub regulatory_category: u8,
}

impl Finding {
    pub(crate) fn new(
        phi_type: PhiType,
        value_hash: String,
        span: Span,
        confidence: f32,
        regulatory_category: u8,
    ) -> Self {
        Self {
            phi_type,
            value_hash,
            value_length: span.len(),
            span,
            confidence,
            regulatory_category,
        }
    }

    #[cfg(test)]
    pub(crate) fn for_tests(
        phi_type: PhiType,
        value_hash: &str,
        value_length: usize,
        span: Span,
        confidence: f32,
    ) -> Self {
        Self {
            phi_type,
            value_hash: value_hash.to_string(),
            value_length,
            span,
            confidence,
            regulatory_category: phi_type.regulatory_category(),
        }
    }
}

/// Immutable result of one scan invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    /// Findings in catalog order, match order within each rule
    pub findings: Vec<Finding>,
    /// Aggregate risk level
    pub risk_level: RiskLevel,
    /// Aggregate counts
    pub summary: ScanSummary,
    /// When the scan ran
    pub scanned_at: DateTime<Utc>,
    /// Which operation the text belongs to
    pub scope: ScanScope,
}

impl ScanResult {
    /// A clean result with zero findings
    ///
    /// Used when remediation clears a gate: a fresh result is issued rather
    /// than mutating the old one.
    pub fn empty(scope: ScanScope) -> Self {
        let (risk_level, summary) = classify(&[], &RiskThresholds::default());
        Self {
            findings: Vec::new(),
            risk_level,
            summary,
            scanned_at: Utc::now(),
            scope,
        }
    }

    /// Whether any PHI was detected
    pub fn has_findings(&self) -> bool {
        !self.findings.is_empty()
    }

    /// Highest confidence among findings, if any
    pub fn max_confidence(&self) -> Option<f32> {
        self.findings
            .iter()
            .map(|f| f.confidence)
            .fold(None, |acc, c| match acc {
                Some(best) if best >= c => Some(best),
                _ => Some(c),
            })
    }
}

/// Scanner input limits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannerLimits {
    /// Maximum accepted input size in bytes
    #[serde(default = "default_max_input_bytes")]
    pub max_input_bytes: usize,
}

fn default_max_input_bytes() -> usize {
    DEFAULT_MAX_INPUT_BYTES
}

impl Default for ScannerLimits {
    fn default() -> Self {
        Self {
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
        }
    }
}

/// PHI scanner
///
/// Holds the injected catalog and input limits. All-or-nothing per call:
/// an error means no `ScanResult` was produced and nothing was recorded.
pub struct Scanner {
    catalog: Arc<PatternCatalog>,
    limits: ScannerLimits,
    thresholds: RiskThresholds,
}

impl Scanner {
    /// Create a scanner over a catalog with the given limits
    pub fn new(catalog: Arc<PatternCatalog>, limits: ScannerLimits) -> Self {
        Self {
            catalog,
            limits,
            thresholds: RiskThresholds::default(),
        }
    }

    /// Override the risk cutoffs
    pub fn with_thresholds(mut self, thresholds: RiskThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// The injected catalog
    pub fn catalog(&self) -> &PatternCatalog {
        &self.catalog
    }

    /// Scan raw bytes, validating UTF-8 first
    ///
    /// # Errors
    ///
    /// `ScanError::InvalidEncoding` if the bytes are not valid UTF-8, plus
    /// everything [`scan`](Self::scan) can return.
    pub fn scan_bytes(&self, bytes: &[u8], scope: ScanScope) -> Result<ScanResult, ScanError> {
        let text = std::str::from_utf8(bytes).map_err(|_| ScanError::InvalidEncoding)?;
        self.scan(text, scope)
    }

    /// Check a text against the input limits without scanning it
    ///
    /// Lets callers fail fast before recording any state.
    pub fn validate_input(&self, text: &str) -> Result<(), ScanError> {
        if text.len() > self.limits.max_input_bytes {
            return Err(ScanError::InputTooLarge {
                len: text.len(),
                max: self.limits.max_input_bytes,
            });
        }
        Ok(())
    }

    /// Scan a text for PHI
    ///
    /// Visits the entire input once per catalog rule; overlapping matches
    /// from different rules are kept as separate findings.
    ///
    /// # Errors
    ///
    /// `ScanError::InputTooLarge` if the text exceeds the configured limit.
    pub fn scan(&self, text: &str, scope: ScanScope) -> Result<ScanResult, ScanError> {
        self.validate_input(text)?;

        let mut findings = Vec::new();
        for rule in self.catalog.rules() {
            for m in rule.regex.find_iter(text) {
                let confidence = derive_confidence(rule, text, m.start());
                findings.push(Finding::new(
                    rule.phi_type,
                    short_hash(m.as_str()),
                    Span {
                        start: m.start(),
                        end: m.end(),
                    },
                    confidence,
                    rule.regulatory_category,
                ));
            }
        }

        let (risk_level, summary) = classify(&findings, &self.thresholds);

        tracing::debug!(
            scope = %scope,
            total_matches = summary.total_matches,
            unique_types = summary.unique_types,
            critical_count = summary.critical_count,
            risk_level = %risk_level,
            "scan completed"
        );

        Ok(ScanResult {
            findings,
            risk_level,
            summary,
            scanned_at: Utc::now(),
            scope,
        })
    }
}

/// Adjust a rule's base confidence using nearby context keywords
///
/// A keyword occurring in the window immediately before the match raises
/// confidence by [`CONTEXT_CONFIDENCE_BOOST`], clamped to 1.0.
fn derive_confidence(rule: &PatternRule, text: &str, match_start: usize) -> f32 {
    if rule.context_keywords.is_empty() {
        return rule.base_confidence;
    }

    let mut window_start = match_start.saturating_sub(CONTEXT_WINDOW_BYTES);
    while window_start < match_start && !text.is_char_boundary(window_start) {
        window_start += 1;
    }
    let window = text[window_start..match_start].to_lowercase();

    if rule.context_keywords.iter().any(|k| window.contains(k)) {
        (rule.base_confidence + CONTEXT_CONFIDENCE_BOOST).min(1.0)
    } else {
        rule.base_confidence
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogBuilder;

    fn scanner() -> Scanner {
        let catalog = Arc::new(PatternCatalog::default_rules().unwrap());
        Scanner::new(catalog, ScannerLimits::default())
    }

    #[test]
    fn test_empty_text_is_clean() {
        let result = scanner().scan("", ScanScope::upload()).unwrap();
        assert!(result.findings.is_empty());
        assert_eq!(result.risk_level, RiskLevel::None);
        assert_eq!(result.summary.total_matches, 0);
    }

    #[test]
    fn test_ssn_and_email_detected() {
        let result = scanner()
            .scan(
                "Contact John at john@example.com, SSN 123-45-6789",
                ScanScope::chat_message(),
            )
            .unwrap();

        assert!(result.findings.len() >= 2);
        assert!(result.findings.iter().any(|f| f.phi_type == PhiType::Email));
        assert!(result.findings.iter().any(|f| f.phi_type == PhiType::Ssn));
        assert_eq!(result.risk_level, RiskLevel::Critical);
    }

    #[test]
    fn test_no_raw_value_anywhere() {
        let secret = "123-45-6789";
        let text = format!("patient SSN {secret} on file");
        let result = scanner().scan(&text, ScanScope::upload()).unwrap();

        assert!(result.has_findings());
        let serialized = serde_json::to_string(&result).unwrap();
        assert!(!serialized.contains(secret));

        for f in &result.findings {
            assert!(!f.value_hash.contains(secret));
            assert_eq!(f.value_hash.len(), hash::VALUE_HASH_LEN);
        }
    }

    #[test]
    fn test_span_and_length_identify_match() {
        let text = "call 555-123-4567 now";
        let result = scanner().scan(text, ScanScope::upload()).unwrap();
        let phone = result
            .findings
            .iter()
            .find(|f| f.phi_type == PhiType::Phone)
            .expect("phone finding");

        assert_eq!(&text[phone.span.start..phone.span.end], "555-123-4567");
        assert_eq!(phone.value_length, "555-123-4567".len());
        assert_eq!(phone.value_hash, short_hash("555-123-4567"));
    }

    #[test]
    fn test_input_too_large_fails_fast() {
        let catalog = Arc::new(PatternCatalog::default_rules().unwrap());
        let scanner = Scanner::new(catalog, ScannerLimits { max_input_bytes: 16 });
        let err = scanner
            .scan("this text is longer than sixteen bytes", ScanScope::upload())
            .unwrap_err();
        assert!(matches!(err, ScanError::InputTooLarge { .. }));
    }

    #[test]
    fn test_invalid_encoding_rejected() {
        let err = scanner()
            .scan_bytes(&[0xff, 0xfe, 0xfd], ScanScope::upload())
            .unwrap_err();
        assert_eq!(err, ScanError::InvalidEncoding);
    }

    #[test]
    fn test_context_keyword_boosts_confidence() {
        let catalog = Arc::new(
            CatalogBuilder::new()
                .rule_with_keywords("zip", PhiType::Zip, r"\b\d{5}\b", 0.4, &["zip"])
                .unwrap()
                .build(),
        );
        let scanner = Scanner::new(catalog, ScannerLimits::default());

        let bare = scanner.scan("value 90210 here", ScanScope::upload()).unwrap();
        let keyed = scanner.scan("zip code 90210", ScanScope::upload()).unwrap();

        assert!((bare.findings[0].confidence - 0.4).abs() < f32::EPSILON);
        assert!((keyed.findings[0].confidence - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_confidence_boost_clamped() {
        let catalog = Arc::new(
            CatalogBuilder::new()
                .rule_with_keywords("ssn", PhiType::Ssn, r"\b\d{3}-\d{2}-\d{4}\b", 0.95, &["ssn"])
                .unwrap()
                .build(),
        );
        let scanner = Scanner::new(catalog, ScannerLimits::default());
        let result = scanner.scan("SSN 123-45-6789", ScanScope::upload()).unwrap();
        assert!((result.findings[0].confidence - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_low_confidence_zips_not_critical() {
        let result = scanner()
            .scan(
                "90210 10001 60601 73301 94105 33101",
                ScanScope::upload(),
            )
            .unwrap();
        let zips = result
            .findings
            .iter()
            .filter(|f| f.phi_type == PhiType::Zip)
            .count();
        assert_eq!(zips, 6);
        assert_eq!(result.risk_level, RiskLevel::Medium);
    }

    #[test]
    fn test_overlapping_rules_both_reported() {
        // A span matching two independent rules appears twice; the catalog
        // applies rules independently with no cross-rule dedup.
        let catalog = Arc::new(
            CatalogBuilder::new()
                .rule("digits-a", PhiType::Account, r"\b\d{6}\b", 0.6)
                .unwrap()
                .rule("digits-b", PhiType::Other, r"\b\d{6}\b", 0.5)
                .unwrap()
                .build(),
        );
        let scanner = Scanner::new(catalog, ScannerLimits::default());
        let result = scanner.scan("code 123456 end", ScanScope::upload()).unwrap();
        assert_eq!(result.findings.len(), 2);
        assert_eq!(result.findings[0].span, result.findings[1].span);
    }

    #[test]
    fn test_max_confidence() {
        let result = scanner()
            .scan("mail a@b.co and 90210", ScanScope::upload())
            .unwrap();
        let max = result.max_confidence().unwrap();
        for f in &result.findings {
            assert!(f.confidence <= max);
        }
        assert!(ScanResult::empty(ScanScope::upload()).max_confidence().is_none());
    }

    #[test]
    fn test_multibyte_context_window_is_safe() {
        let catalog = Arc::new(
            CatalogBuilder::new()
                .rule_with_keywords("zip", PhiType::Zip, r"\b\d{5}\b", 0.4, &["zip"])
                .unwrap()
                .build(),
        );
        let scanner = Scanner::new(catalog, ScannerLimits::default());
        // Multibyte chars right before the match must not panic the window slice.
        let text = "ünïcödé ünïcödé ünïcödé ünïcödé 90210";
        let result = scanner.scan(text, ScanScope::upload()).unwrap();
        assert_eq!(result.findings.len(), 1);
    }
}
