//! Compliance findings attached to statements
//!
//! IMPORTANT: Finding codes are versioned and stable.
//! NEVER rename or remove codes - they are part of the public API.
//! Add new codes with new names only.

use serde::{Deserialize, Serialize};

/// Finding code registry (v1)
///
/// Codes are plain strings so that rules loaded from configuration can
/// carry their own identifiers next to the built-in ones.
pub mod codes {
    // Structural irregularities (STRUCT-xxx)
    /// Input ended inside a literal, quoted identifier, block comment or dollar block
    pub const UNTERMINATED_CONSTRUCT: &str = "STRUCT-001";

    /// Last statement was closed by end of input instead of a terminator
    pub const MISSING_TERMINATOR: &str = "STRUCT-002";

    // Nomenclature ruleset issues (NOM-xxx)
    /// A ruleset line could not be parsed and was skipped
    pub const RULESET_LINE_SKIPPED: &str = "NOM-001";

    /// A ruleset section header is not recognised
    pub const RULESET_UNKNOWN_SECTION: &str = "NOM-002";

    // Snowflake compliance profile (SF-xxxx)
    /// Secondary index creation
    pub const SF_SECONDARY_INDEX: &str = "SF-B001";

    /// AUTO_INCREMENT spelling
    pub const SF_AUTO_INCREMENT: &str = "SF-B002";

    /// CHECK constraint
    pub const SF_CHECK_CONSTRAINT: &str = "SF-W001";

    /// Foreign key constraint
    pub const SF_FOREIGN_KEY: &str = "SF-W002";

    /// CREATE OR REPLACE
    pub const SF_CREATE_OR_REPLACE: &str = "SF-I001";

    /// IF [NOT] EXISTS guard
    pub const SF_EXISTENCE_GUARD: &str = "SF-I002";

    /// TIMESTAMP_NTZ / LTZ / TZ
    pub const SF_TIMESTAMP_TYPES: &str = "SF-I003";

    /// NUMBER / VARCHAR / BOOLEAN / VARIANT
    pub const SF_PREFERRED_TYPES: &str = "SF-I004";

    /// AUTOINCREMENT spelling
    pub const SF_AUTOINCREMENT: &str = "SF-I005";
}

/// Finding severity level
///
/// Ordered from least to most significant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Good practice or structural note
    Informational,

    /// Should be reviewed but not blocking
    Warning,

    /// Construct the target dialect does not accept
    Blocking,
}

impl Severity {
    /// Upper-case label used in generated headers
    pub fn label(&self) -> &'static str {
        match self {
            Self::Informational => "INFO",
            Self::Warning => "WARNING",
            Self::Blocking => "BLOCKING",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Informational => write!(f, "informational"),
            Self::Warning => write!(f, "warning"),
            Self::Blocking => write!(f, "blocking"),
        }
    }
}

/// A single advisory finding about a statement or ruleset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceFinding {
    /// Stable rule identifier
    pub rule_id: String,

    /// Severity level
    pub severity: Severity,

    /// Human-readable message
    pub message: String,
}

impl ComplianceFinding {
    /// Create a new finding
    pub fn new(rule_id: impl Into<String>, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            rule_id: rule_id.into(),
            severity,
            message: message.into(),
        }
    }

    /// Shorthand for an informational finding
    pub fn info(rule_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(rule_id, Severity::Informational, message)
    }

    pub fn is_blocking(&self) -> bool {
        self.severity == Severity::Blocking
    }
}

impl std::fmt::Display for ComplianceFinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.severity.label(), self.rule_id, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finding_code_stability() {
        // Ensure codes are stable strings
        assert_eq!(codes::UNTERMINATED_CONSTRUCT, "STRUCT-001");
        assert_eq!(codes::SF_SECONDARY_INDEX, "SF-B001");
        assert_eq!(codes::RULESET_LINE_SKIPPED, "NOM-001");
    }

    #[test]
    fn severity_ordering() {
        assert!(Severity::Blocking > Severity::Warning);
        assert!(Severity::Warning > Severity::Informational);
    }

    #[test]
    fn finding_serialization() {
        let finding = ComplianceFinding::new(
            codes::SF_AUTO_INCREMENT,
            Severity::Blocking,
            "Use AUTOINCREMENT",
        );

        let json = serde_json::to_string(&finding).unwrap();
        assert!(json.contains("SF-B002"));
        assert!(json.contains("blocking"));
    }

    #[test]
    fn finding_display() {
        let finding = ComplianceFinding::info(codes::MISSING_TERMINATOR, "missing trailing terminator");
        assert_eq!(finding.to_string(), "[INFO] STRUCT-002: missing trailing terminator");
        assert!(!finding.is_blocking());
    }
}
