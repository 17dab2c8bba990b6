//! Risk classification for scan findings
//!
//! Aggregates a finding list into a discrete risk level. The rule is exact
//! and reproduced everywhere gate decisions are made:
//!
//! - 0 findings → `None`
//! - any finding of a critical type (SSN, MRN, health plan) → `Critical`
//! - ≥ [`HIGH_FINDING_COUNT`] findings → `High`
//! - ≥ [`MEDIUM_FINDING_COUNT`] findings → `Medium`
//! - otherwise → `Low`

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::scanner::Finding;

/// Finding count at which non-critical risk becomes MEDIUM
pub const MEDIUM_FINDING_COUNT: usize = 5;

/// Finding count at which non-critical risk becomes HIGH
pub const HIGH_FINDING_COUNT: usize = 10;

/// Discrete risk level for a scan
///
/// Ordered: `None < Low < Medium < High < Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    /// No findings
    None,
    /// 1-4 non-critical findings
    Low,
    /// 5-9 non-critical findings
    Medium,
    /// 10 or more non-critical findings
    High,
    /// At least one critical-type finding, regardless of count
    Critical,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::None => "NONE",
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        };
        write!(f, "{s}")
    }
}

/// Aggregate counts attached to every scan result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanSummary {
    /// Total findings across all rules
    pub total_matches: usize,
    /// Count of distinct PHI types present
    pub unique_types: usize,
    /// Count of findings whose type is in the critical set
    pub critical_count: usize,
}

/// Configurable risk cutoffs
///
/// Defaults mirror the named constants; a deployment may raise or lower
/// them through configuration without touching the classification rule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskThresholds {
    /// Finding count for MEDIUM
    #[serde(default = "default_medium_count")]
    pub medium_finding_count: usize,
    /// Finding count for HIGH
    #[serde(default = "default_high_count")]
    pub high_finding_count: usize,
}

fn default_medium_count() -> usize {
    MEDIUM_FINDING_COUNT
}

fn default_high_count() -> usize {
    HIGH_FINDING_COUNT
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            medium_finding_count: MEDIUM_FINDING_COUNT,
            high_finding_count: HIGH_FINDING_COUNT,
        }
    }
}

impl RiskThresholds {
    /// Validate cutoff ordering
    pub fn validate(&self) -> Result<(), String> {
        if self.medium_finding_count == 0 {
            return Err("medium finding count must be at least 1".to_string());
        }
        if self.medium_finding_count >= self.high_finding_count {
            return Err(format!(
                "medium cutoff ({}) must be below high cutoff ({})",
                self.medium_finding_count, self.high_finding_count
            ));
        }
        Ok(())
    }
}

/// Classify findings into a risk level and summary
pub fn classify(findings: &[Finding], thresholds: &RiskThresholds) -> (RiskLevel, ScanSummary) {
    let unique_types: HashSet<_> = findings.iter().map(|f| f.phi_type).collect();
    let critical_count = findings.iter().filter(|f| f.phi_type.is_critical()).count();

    let summary = ScanSummary {
        total_matches: findings.len(),
        unique_types: unique_types.len(),
        critical_count,
    };

    let level = if findings.is_empty() {
        RiskLevel::None
    } else if critical_count > 0 {
        RiskLevel::Critical
    } else if findings.len() >= thresholds.high_finding_count {
        RiskLevel::High
    } else if findings.len() >= thresholds.medium_finding_count {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    };

    (level, summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::PhiType;
    use crate::scanner::{Finding, Span};
    use test_case::test_case;

    fn finding(phi_type: PhiType) -> Finding {
        Finding::for_tests(phi_type, "abcdef012345", 9, Span { start: 0, end: 9 }, 0.5)
    }

    #[test]
    fn test_empty_is_none() {
        let (level, summary) = classify(&[], &RiskThresholds::default());
        assert_eq!(level, RiskLevel::None);
        assert_eq!(summary.total_matches, 0);
        assert_eq!(summary.unique_types, 0);
        assert_eq!(summary.critical_count, 0);
    }

    #[test_case(1, RiskLevel::Low; "one finding")]
    #[test_case(4, RiskLevel::Low; "four findings")]
    #[test_case(5, RiskLevel::Medium; "medium boundary")]
    #[test_case(9, RiskLevel::Medium; "just below high")]
    #[test_case(10, RiskLevel::High; "high boundary")]
    #[test_case(25, RiskLevel::High; "well above high")]
    fn test_non_critical_counts(count: usize, expected: RiskLevel) {
        let findings: Vec<_> = (0..count).map(|_| finding(PhiType::Zip)).collect();
        let (level, _) = classify(&findings, &RiskThresholds::default());
        assert_eq!(level, expected);
    }

    #[test_case(PhiType::Ssn)]
    #[test_case(PhiType::Mrn)]
    #[test_case(PhiType::HealthPlan)]
    fn test_single_critical_forces_critical(phi_type: PhiType) {
        let findings = vec![finding(phi_type)];
        let (level, summary) = classify(&findings, &RiskThresholds::default());
        assert_eq!(level, RiskLevel::Critical);
        assert_eq!(summary.critical_count, 1);
    }

    #[test]
    fn test_critical_wins_over_count() {
        let mut findings: Vec<_> = (0..20).map(|_| finding(PhiType::Email)).collect();
        findings.push(finding(PhiType::Ssn));
        let (level, _) = classify(&findings, &RiskThresholds::default());
        assert_eq!(level, RiskLevel::Critical);
    }

    #[test]
    fn test_unique_types_counted() {
        let findings = vec![
            finding(PhiType::Email),
            finding(PhiType::Email),
            finding(PhiType::Phone),
        ];
        let (_, summary) = classify(&findings, &RiskThresholds::default());
        assert_eq!(summary.unique_types, 2);
        assert_eq!(summary.total_matches, 3);
    }

    #[test]
    fn test_monotonic_in_critical_findings() {
        // Adding a critical finding can never lower the level.
        for base_count in [0usize, 1, 5, 10] {
            let mut findings: Vec<_> = (0..base_count).map(|_| finding(PhiType::Zip)).collect();
            let (before, _) = classify(&findings, &RiskThresholds::default());
            findings.push(finding(PhiType::Mrn));
            let (after, _) = classify(&findings, &RiskThresholds::default());
            assert!(after >= before);
        }
    }

    #[test]
    fn test_level_ordering() {
        assert!(RiskLevel::None < RiskLevel::Low);
        assert!(RiskLevel::Low < RiskLevel::Medium);
        assert!(RiskLevel::Medium < RiskLevel::High);
        assert!(RiskLevel::High < RiskLevel::Critical);
    }

    #[test]
    fn test_thresholds_validation() {
        assert!(RiskThresholds::default().validate().is_ok());
        let bad = RiskThresholds {
            medium_finding_count: 10,
            high_finding_count: 5,
        };
        assert!(bad.validate().is_err());
        let zero = RiskThresholds {
            medium_finding_count: 0,
            high_finding_count: 10,
        };
        assert!(zero.validate().is_err());
    }

    #[test]
    fn test_custom_thresholds() {
        let thresholds = RiskThresholds {
            medium_finding_count: 2,
            high_finding_count: 3,
        };
        let findings: Vec<_> = (0..2).map(|_| finding(PhiType::Zip)).collect();
        let (level, _) = classify(&findings, &thresholds);
        assert_eq!(level, RiskLevel::Medium);
    }
}
