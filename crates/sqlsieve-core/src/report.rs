//! Run report schema (stable v1)
//!
//! This schema is STABLE and VERSIONED.
//! Breaking changes require a new version.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use crate::category::StatementCategory;
use crate::finding::{ComplianceFinding, Severity};

/// Report schema version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportVersion {
    /// Major version (breaking changes)
    pub major: u32,

    /// Minor version (backward-compatible additions)
    pub minor: u32,
}

impl ReportVersion {
    /// Current report schema version
    pub const CURRENT: ReportVersion = ReportVersion { major: 1, minor: 0 };
}

impl std::fmt::Display for ReportVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Summary statistics for a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Total number of statements
    pub statements: usize,

    /// Statements classified as schema definition
    pub schema_definition: usize,

    /// Statements classified as data manipulation
    pub data_manipulation: usize,

    /// Statements left unclassified
    pub unclassified: usize,

    /// Blocking findings across all statements
    pub blocking: usize,

    /// Warning findings across all statements
    pub warnings: usize,

    /// Informational findings across all statements
    pub informational: usize,
}

/// Per-statement entry of the report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementSummary {
    /// 0-based position in the script
    pub ordinal: usize,

    pub category: StatementCategory,

    /// Byte offset of the first character of the span
    pub start_offset: usize,

    /// Byte offset one past the last character of the span (terminator excluded)
    pub end_offset: usize,

    /// Whether the statement was closed by an explicit terminator
    pub terminated: bool,

    pub findings: Vec<ComplianceFinding>,
}

/// Processing report (report.json v1)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Schema version
    pub version: ReportVersion,

    /// Source identifier of the script
    pub source: String,

    /// Processing timestamp (ISO 8601), supplied by the caller
    pub timestamp: String,

    /// Hex SHA-256 of the script text
    pub script_sha256: String,

    /// Summary statistics
    pub summary: ReportSummary,

    /// Per-statement results in ordinal order
    pub statements: Vec<StatementSummary>,

    /// Findings raised while resolving the nomenclature ruleset
    pub ruleset_findings: Vec<ComplianceFinding>,
}

impl RunReport {
    /// Build a report from per-statement results
    pub fn new(
        source: impl Into<String>,
        timestamp: DateTime<Utc>,
        script_text: &str,
        statements: Vec<StatementSummary>,
        ruleset_findings: Vec<ComplianceFinding>,
    ) -> Self {
        let mut summary = ReportSummary {
            statements: statements.len(),
            ..ReportSummary::default()
        };

        for statement in &statements {
            match statement.category {
                StatementCategory::SchemaDefinition => summary.schema_definition += 1,
                StatementCategory::DataManipulation => summary.data_manipulation += 1,
                StatementCategory::Unclassified => summary.unclassified += 1,
            }

            for finding in &statement.findings {
                match finding.severity {
                    Severity::Blocking => summary.blocking += 1,
                    Severity::Warning => summary.warnings += 1,
                    Severity::Informational => summary.informational += 1,
                }
            }
        }

        Self {
            version: ReportVersion::CURRENT,
            source: source.into(),
            timestamp: timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            script_sha256: Self::digest(script_text),
            summary,
            statements,
            ruleset_findings,
        }
    }

    /// Hex SHA-256 of a text, used as an audit fingerprint
    pub fn digest(text: &str) -> String {
        hex::encode(Sha256::digest(text.as_bytes()))
    }

    /// Check if any statement carries a blocking finding
    pub fn has_blocking(&self) -> bool {
        self.summary.blocking > 0
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse a report previously written with `to_json`
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Save to file
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let json = self.to_json()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        std::fs::write(path, json)
    }
}
