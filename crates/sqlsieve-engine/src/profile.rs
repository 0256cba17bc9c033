//! Compliance profiles
//!
//! A profile is an ordered rule table. Rules are data: a pattern, a default
//! severity and a message. Adding a rule never touches the checker.

use regex::{Regex, RegexBuilder};
use sqlsieve_core::{codes, ComplianceFinding, Config, Dialect, Severity, SeverityThreshold};

/// Static description of a built-in rule
#[derive(Debug, Clone, Copy)]
pub struct RuleDefinition {
    pub id: &'static str,
    pub pattern: &'static str,
    pub severity: Severity,
    pub message: &'static str,
}

/// Snowflake rule table, evaluated in this order
pub const SNOWFLAKE_RULES: &[RuleDefinition] = &[
    RuleDefinition {
        id: codes::SF_SECONDARY_INDEX,
        pattern: r"\bCREATE\s+(OR\s+REPLACE\s+)?(UNIQUE\s+)?INDEX\b",
        severity: Severity::Blocking,
        message: "Snowflake has no secondary indexes; use CLUSTER BY or search optimization instead",
    },
    RuleDefinition {
        id: codes::SF_AUTO_INCREMENT,
        pattern: r"\bAUTO_INCREMENT\b",
        severity: Severity::Blocking,
        message: "Snowflake spells it AUTOINCREMENT (one word), not AUTO_INCREMENT",
    },
    RuleDefinition {
        id: codes::SF_CHECK_CONSTRAINT,
        pattern: r"\bCHECK\s*\(",
        severity: Severity::Warning,
        message: "CHECK constraints are not supported by Snowflake standard tables",
    },
    RuleDefinition {
        id: codes::SF_FOREIGN_KEY,
        pattern: r"\b(FOREIGN\s+KEY|REFERENCES)\b",
        severity: Severity::Warning,
        message: "Foreign key constraints are recorded but not enforced by Snowflake",
    },
    RuleDefinition {
        id: codes::SF_CREATE_OR_REPLACE,
        pattern: r"\bCREATE\s+OR\s+REPLACE\b",
        severity: Severity::Informational,
        message: "Good practice: uses CREATE OR REPLACE (idempotent create)",
    },
    RuleDefinition {
        id: codes::SF_EXISTENCE_GUARD,
        pattern: r"\bIF\s+(NOT\s+)?EXISTS\b",
        severity: Severity::Informational,
        message: "Good practice: uses an IF [NOT] EXISTS guard",
    },
    RuleDefinition {
        id: codes::SF_TIMESTAMP_TYPES,
        pattern: r"\bTIMESTAMP_(NTZ|LTZ|TZ)\b",
        severity: Severity::Informational,
        message: "Good practice: uses Snowflake timestamp types",
    },
    RuleDefinition {
        id: codes::SF_PREFERRED_TYPES,
        pattern: r"\b(NUMBER|VARCHAR|BOOLEAN|VARIANT)\b",
        severity: Severity::Informational,
        message: "Good practice: uses Snowflake-preferred data types",
    },
    RuleDefinition {
        id: codes::SF_AUTOINCREMENT,
        pattern: r"\bAUTOINCREMENT\b",
        severity: Severity::Informational,
        message: "Good practice: uses Snowflake AUTOINCREMENT syntax",
    },
];

/// Profile construction errors
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("Invalid pattern for rule {rule_id}: {source}")]
    InvalidPattern {
        rule_id: String,
        #[source]
        source: regex::Error,
    },

    #[error("Duplicate rule id: {0}")]
    DuplicateRule(String),
}

/// A compiled rule
#[derive(Debug, Clone)]
pub struct ComplianceRule {
    pub id: String,
    pub severity: Severity,
    pub message: String,
    pattern: Regex,
}

impl ComplianceRule {
    /// Compile a rule; the pattern is matched case-insensitively
    pub fn new(
        id: impl Into<String>,
        pattern: &str,
        severity: Severity,
        message: impl Into<String>,
    ) -> Result<Self, ProfileError> {
        let id = id.into();
        let pattern = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|source| ProfileError::InvalidPattern {
                rule_id: id.clone(),
                source,
            })?;

        Ok(Self {
            id,
            severity,
            message: message.into(),
            pattern,
        })
    }

    fn from_definition(definition: &RuleDefinition) -> Result<Self, ProfileError> {
        Self::new(definition.id, definition.pattern, definition.severity, definition.message)
    }

    /// Whether the rule matches the given text
    pub fn matches(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}

/// An ordered compliance rule table plus severity overrides
#[derive(Debug, Clone)]
pub struct ComplianceProfile {
    name: String,
    rules: Vec<ComplianceRule>,
    severity: SeverityThreshold,
}

impl ComplianceProfile {
    /// Empty profile
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rules: Vec::new(),
            severity: SeverityThreshold::default(),
        }
    }

    /// Built-in Snowflake profile
    pub fn snowflake() -> Result<Self, ProfileError> {
        Self::from_definitions("snowflake", SNOWFLAKE_RULES, |_| true)
    }

    /// Build a profile from configuration: built-ins for the dialect minus
    /// disabled ids, then custom rules, then severity overrides
    pub fn from_config(config: &Config) -> Result<Self, ProfileError> {
        let mut profile = match config.dialect {
            Dialect::Snowflake => Self::from_definitions("snowflake", SNOWFLAKE_RULES, |definition| {
                !config.profile.is_disabled(definition.id)
            })?,
            Dialect::Generic => Self::empty("generic"),
        };

        for custom in &config.profile.rules {
            let rule = ComplianceRule::new(&custom.id, &custom.pattern, custom.severity, &custom.message)?;
            profile = profile.with_rule(rule)?;
        }

        profile.severity = config.severity.clone();
        Ok(profile)
    }

    fn from_definitions(
        name: &str,
        definitions: &[RuleDefinition],
        keep: impl Fn(&RuleDefinition) -> bool,
    ) -> Result<Self, ProfileError> {
        let rules = definitions
            .iter()
            .filter(|definition| keep(definition))
            .map(ComplianceRule::from_definition)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            name: name.to_string(),
            rules,
            severity: SeverityThreshold::default(),
        })
    }

    /// Append a rule at the end of the table
    pub fn with_rule(mut self, rule: ComplianceRule) -> Result<Self, ProfileError> {
        if self.rules.iter().any(|existing| existing.id == rule.id) {
            return Err(ProfileError::DuplicateRule(rule.id));
        }
        self.rules.push(rule);
        Ok(self)
    }

    /// Replace the severity overrides
    pub fn with_severity(mut self, severity: SeverityThreshold) -> Self {
        self.severity = severity;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rules(&self) -> &[ComplianceRule] {
        &self.rules
    }

    /// Build a finding, applying any severity override for the rule id
    pub fn finding(&self, rule_id: &str, default: Severity, message: impl Into<String>) -> ComplianceFinding {
        ComplianceFinding::new(rule_id, self.severity.get_severity(rule_id, default), message)
    }
}
