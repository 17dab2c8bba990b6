//! Pattern catalog for PHI detection
//!
//! This module provides the immutable, ordered rule set applied by the
//! scanner. The catalog is constructed once at startup (embedded defaults or
//! a TOML file from configuration) and injected into the scanner - there is
//! no ambient/global pattern state. Rule order is stable load order and is
//! the tie-break when overlapping spans compete during redaction.
//!
//! # Examples
//!
//! ```
//! use aegis::catalog::{PatternCatalog, PhiType};
//!
//! let catalog = PatternCatalog::default_rules().unwrap();
//! assert!(!catalog.rules().is_empty());
//! assert!(catalog.rules_for(PhiType::Ssn).is_some());
//! ```

use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// PHI identifier category
///
/// Covers the HIPAA Safe Harbor identifier list (45 CFR §164.514(b)(2)) as
/// far as regex detection can reach, plus low-confidence generics (`Zip`,
/// `Date`) that only matter in aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PhiType {
    /// Names (with titles or in name-labelled context)
    Name,
    /// Street addresses
    Address,
    /// ZIP codes (geographic subdivision smaller than state)
    Zip,
    /// Dates of birth
    Dob,
    /// Other date elements (admission, discharge)
    Date,
    /// Telephone numbers
    Phone,
    /// Fax numbers
    Fax,
    /// Email addresses
    Email,
    /// Social Security Numbers
    Ssn,
    /// Medical Record Numbers
    Mrn,
    /// Health plan beneficiary / insurance member numbers
    HealthPlan,
    /// Account numbers
    Account,
    /// Certificate/license numbers
    License,
    /// Vehicle identifiers (VIN, plates)
    Vehicle,
    /// Device identifiers and serial numbers
    Device,
    /// Web URLs
    Url,
    /// IP addresses
    IpAddress,
    /// Biometric identifiers
    Biometric,
    /// Any other unique identifying number or code
    Other,
}

impl PhiType {
    /// Uppercase label used in audit records and redaction placeholders
    pub fn label(&self) -> &'static str {
        match self {
            Self::Name => "NAME",
            Self::Address => "ADDRESS",
            Self::Zip => "ZIP",
            Self::Dob => "DOB",
            Self::Date => "DATE",
            Self::Phone => "PHONE",
            Self::Fax => "FAX",
            Self::Email => "EMAIL",
            Self::Ssn => "SSN",
            Self::Mrn => "MRN",
            Self::HealthPlan => "HEALTH_PLAN",
            Self::Account => "ACCOUNT",
            Self::License => "LICENSE",
            Self::Vehicle => "VEHICLE",
            Self::Device => "DEVICE",
            Self::Url => "URL",
            Self::IpAddress => "IP_ADDRESS",
            Self::Biometric => "BIOMETRIC",
            Self::Other => "OTHER",
        }
    }

    /// HIPAA identifier category index (1..=18, 18 = other)
    pub fn regulatory_category(&self) -> u8 {
        match self {
            Self::Name => 1,
            Self::Address | Self::Zip => 2,
            Self::Dob | Self::Date => 3,
            Self::Phone => 4,
            Self::Fax => 5,
            Self::Email => 6,
            Self::Ssn => 7,
            Self::Mrn => 8,
            Self::HealthPlan => 9,
            Self::Account => 10,
            Self::License => 11,
            Self::Vehicle => 12,
            Self::Device => 13,
            Self::Url => 14,
            Self::IpAddress => 15,
            Self::Biometric => 16,
            Self::Other => 18,
        }
    }

    /// Whether a single finding of this type forces CRITICAL risk
    pub fn is_critical(&self) -> bool {
        matches!(self, Self::Ssn | Self::Mrn | Self::HealthPlan)
    }

    /// Parse an uppercase label back to a type
    pub fn parse_label(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "NAME" => Ok(Self::Name),
            "ADDRESS" | "LOCATION" => Ok(Self::Address),
            "ZIP" | "ZIPCODE" => Ok(Self::Zip),
            "DOB" => Ok(Self::Dob),
            "DATE" => Ok(Self::Date),
            "PHONE" => Ok(Self::Phone),
            "FAX" => Ok(Self::Fax),
            "EMAIL" => Ok(Self::Email),
            "SSN" => Ok(Self::Ssn),
            "MRN" | "MEDICAL_RECORD_NUMBER" => Ok(Self::Mrn),
            "HEALTH_PLAN" | "INSURANCE" => Ok(Self::HealthPlan),
            "ACCOUNT" | "ACCOUNT_NUMBER" => Ok(Self::Account),
            "LICENSE" => Ok(Self::License),
            "VEHICLE" => Ok(Self::Vehicle),
            "DEVICE" => Ok(Self::Device),
            "URL" => Ok(Self::Url),
            "IP_ADDRESS" | "IP" => Ok(Self::IpAddress),
            "BIOMETRIC" => Ok(Self::Biometric),
            "OTHER" | "IDENTIFIER" => Ok(Self::Other),
            _ => anyhow::bail!("Unknown PHI type: {s}"),
        }
    }
}

impl fmt::Display for PhiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Rule definition as written in TOML
#[derive(Debug, Clone, Deserialize)]
pub struct RuleDefinition {
    /// Rule name (diagnostics only)
    pub name: String,
    /// PHI type label
    #[serde(rename = "type")]
    pub phi_type: String,
    /// Regex patterns for this rule
    pub patterns: Vec<String>,
    /// Base confidence score (0.0 - 1.0)
    pub confidence: f32,
    /// Keywords that raise confidence when found near a match
    #[serde(default)]
    pub context_keywords: Vec<String>,
}

/// Rule library container (array-of-tables keeps file order)
#[derive(Debug, Deserialize)]
struct RuleLibrary {
    rules: Vec<RuleDefinition>,
}

/// One compiled identifier-category rule
#[derive(Debug, Clone)]
pub struct PatternRule {
    /// Rule name (diagnostics only)
    pub name: String,
    /// PHI type this rule detects
    pub phi_type: PhiType,
    /// Compiled regex
    pub regex: Regex,
    /// Base confidence score
    pub base_confidence: f32,
    /// HIPAA identifier category index (1..=18)
    pub regulatory_category: u8,
    /// Lowercased context keywords
    pub context_keywords: Vec<String>,
}

/// Immutable, ordered PHI pattern catalog
pub struct PatternCatalog {
    rules: Vec<PatternRule>,
}

impl PatternCatalog {
    /// Load the catalog from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).with_context(|| {
            format!(
                "Failed to read pattern library: {}",
                path.as_ref().display()
            )
        })?;

        Self::from_toml(&content)
    }

    /// Load the catalog from TOML content
    pub fn from_toml(content: &str) -> Result<Self> {
        let library: RuleLibrary =
            toml::from_str(content).context("Failed to parse pattern library TOML")?;

        let mut rules = Vec::with_capacity(library.rules.len());
        for def in library.rules {
            let phi_type = PhiType::parse_label(&def.phi_type)
                .with_context(|| format!("Invalid type in rule '{}'", def.name))?;

            if !(0.0..=1.0).contains(&def.confidence) {
                anyhow::bail!(
                    "Confidence out of range in rule '{}': {}",
                    def.name,
                    def.confidence
                );
            }

            for pattern_str in &def.patterns {
                let regex = Regex::new(pattern_str)
                    .with_context(|| format!("Invalid regex in rule '{}': {pattern_str}", def.name))?;

                rules.push(PatternRule {
                    name: def.name.clone(),
                    phi_type,
                    regex,
                    base_confidence: def.confidence,
                    regulatory_category: phi_type.regulatory_category(),
                    context_keywords: def
                        .context_keywords
                        .iter()
                        .map(|k| k.to_lowercase())
                        .collect(),
                });
            }
        }

        Ok(Self { rules })
    }

    /// Build the catalog from the embedded default library
    pub fn default_rules() -> Result<Self> {
        let default_toml = include_str!("../../patterns/phi_patterns.toml");
        Self::from_toml(default_toml)
    }

    /// All rules in stable load order
    pub fn rules(&self) -> &[PatternRule] {
        &self.rules
    }

    /// Rules detecting a specific PHI type, in load order
    pub fn rules_for(&self, phi_type: PhiType) -> Option<Vec<&PatternRule>> {
        let matching: Vec<&PatternRule> = self
            .rules
            .iter()
            .filter(|r| r.phi_type == phi_type)
            .collect();
        if matching.is_empty() {
            None
        } else {
            Some(matching)
        }
    }

    /// Number of compiled rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the catalog holds no rules
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Bootstrap/test-time catalog builder
///
/// Registration happens only here, before the catalog is handed to a
/// scanner; there is no per-scan mutation path.
#[derive(Default)]
pub struct CatalogBuilder {
    rules: Vec<PatternRule>,
}

impl CatalogBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from the embedded default library
    pub fn with_defaults() -> Result<Self> {
        let catalog = PatternCatalog::default_rules()?;
        Ok(Self {
            rules: catalog.rules,
        })
    }

    /// Append one rule
    pub fn rule(
        mut self,
        name: impl Into<String>,
        phi_type: PhiType,
        pattern: &str,
        base_confidence: f32,
    ) -> Result<Self> {
        let regex = Regex::new(pattern).context("Invalid rule regex")?;
        self.rules.push(PatternRule {
            name: name.into(),
            phi_type,
            regex,
            base_confidence: base_confidence.clamp(0.0, 1.0),
            regulatory_category: phi_type.regulatory_category(),
            context_keywords: Vec::new(),
        });
        Ok(self)
    }

    /// Append one rule with context keywords
    pub fn rule_with_keywords(
        mut self,
        name: impl Into<String>,
        phi_type: PhiType,
        pattern: &str,
        base_confidence: f32,
        keywords: &[&str],
    ) -> Result<Self> {
        let regex = Regex::new(pattern).context("Invalid rule regex")?;
        self.rules.push(PatternRule {
            name: name.into(),
            phi_type,
            regex,
            base_confidence: base_confidence.clamp(0.0, 1.0),
            regulatory_category: phi_type.regulatory_category(),
            context_keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
        });
        Ok(self)
    }

    /// Finish construction
    pub fn build(self) -> PatternCatalog {
        PatternCatalog { rules: self.rules }
    }
}
