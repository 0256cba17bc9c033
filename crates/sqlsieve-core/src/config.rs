//! Configuration schema (sqlsieve.toml)

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use crate::category::StatementCategory;
use crate::finding::Severity;

/// Target dialect, selecting the built-in compliance rule table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Snowflake compliance profile
    Snowflake,

    /// No built-in rules; only custom rules apply
    Generic,
}

impl Default for Dialect {
    fn default() -> Self {
        Self::Snowflake
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Snowflake => write!(f, "snowflake"),
            Self::Generic => write!(f, "generic"),
        }
    }
}

/// Where unclassified statements end up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnclassifiedPolicy {
    /// Emit a third, explicitly labelled pass-through document
    Separate,

    /// Append them after the DML statements of the DML document
    AppendToDml,
}

impl Default for UnclassifiedPolicy {
    fn default() -> Self {
        Self::Separate
    }
}

/// Severity overrides for specific rule ids
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SeverityThreshold {
    /// Map of rule id to severity override
    #[serde(default)]
    pub overrides: BTreeMap<String, Severity>,
}

impl SeverityThreshold {
    /// Get severity for a rule id, or default
    pub fn get_severity(&self, rule_id: &str, default: Severity) -> Severity {
        self.overrides
            .get(rule_id)
            .copied()
            .unwrap_or(default)
    }

    /// Set severity override for a rule id
    pub fn set_override(&mut self, rule_id: impl Into<String>, severity: Severity) {
        self.overrides.insert(rule_id.into(), severity);
    }
}

/// A rule supplied through configuration, appended after the built-in table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomRule {
    /// Stable identifier reported in findings
    pub id: String,

    /// Regular expression, matched case-insensitively against de-commented text
    pub pattern: String,

    pub severity: Severity,

    pub message: String,
}

/// Compliance profile adjustments
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProfileConfig {
    /// Built-in rule ids to skip (supports a single `*` wildcard, e.g. `SF-I*`)
    #[serde(default)]
    pub disabled: Vec<String>,

    /// Extra rules
    #[serde(default)]
    pub rules: Vec<CustomRule>,
}

impl ProfileConfig {
    /// Check if a rule id is disabled
    pub fn is_disabled(&self, rule_id: &str) -> bool {
        self.disabled.iter().any(|pattern| glob_match(pattern, rule_id))
    }
}

/// Output file naming
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_ddl_suffix")]
    pub ddl_suffix: String,

    #[serde(default = "default_dml_suffix")]
    pub dml_suffix: String,

    #[serde(default = "default_unclassified_suffix")]
    pub unclassified_suffix: String,

    /// File extension without the leading dot
    #[serde(default = "default_extension")]
    pub extension: String,
}

fn default_ddl_suffix() -> String {
    "_DDL".to_string()
}

fn default_dml_suffix() -> String {
    "_DML".to_string()
}

fn default_unclassified_suffix() -> String {
    "_UNCLASSIFIED".to_string()
}

fn default_extension() -> String {
    "sql".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            ddl_suffix: default_ddl_suffix(),
            dml_suffix: default_dml_suffix(),
            unclassified_suffix: default_unclassified_suffix(),
            extension: default_extension(),
        }
    }
}

impl OutputConfig {
    /// File name for a document of the given category, e.g. `orders_DDL.sql`
    pub fn file_name(&self, stem: &str, category: StatementCategory) -> String {
        let suffix = match category {
            StatementCategory::SchemaDefinition => &self.ddl_suffix,
            StatementCategory::DataManipulation => &self.dml_suffix,
            StatementCategory::Unclassified => &self.unclassified_suffix,
        };
        format!("{}{}.{}", stem, suffix, self.extension)
    }

    /// Whether a file name looks like one this tool generated
    pub fn is_generated(&self, file_name: &str) -> bool {
        let Some(stem) = file_name.strip_suffix(&format!(".{}", self.extension)) else {
            return false;
        };
        [&self.ddl_suffix, &self.dml_suffix, &self.unclassified_suffix]
            .iter()
            .any(|suffix| stem.ends_with(suffix.as_str()))
    }
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Config {
    /// Target dialect
    #[serde(default)]
    pub dialect: Dialect,

    /// Routing of unclassified statements
    #[serde(default)]
    pub unclassified: UnclassifiedPolicy,

    /// Severity overrides
    #[serde(default)]
    pub severity: SeverityThreshold,

    /// Compliance profile adjustments
    #[serde(default)]
    pub profile: ProfileConfig,

    /// Output naming
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Load config from TOML file
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        Self::from_toml(&contents)
    }

    /// Load config from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml)
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Save config to TOML file
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        let toml = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, toml)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }
}

/// Simple glob matching (supports a single *)
fn glob_match(pattern: &str, text: &str) -> bool {
    if pattern == "*" {
        return true;
    }

    if let Some(star_pos) = pattern.find('*') {
        let prefix = &pattern[..star_pos];
        let suffix = &pattern[star_pos + 1..];

        text.len() >= prefix.len() + suffix.len()
            && text.starts_with(prefix)
            && text.ends_with(suffix)
    } else {
        pattern == text
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),
}
