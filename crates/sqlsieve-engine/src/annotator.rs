//! Statement annotation
//!
//! Builds the comment header prepended to every statement. The header is a
//! pure function of its inputs, so identical inputs give identical bytes.

use chrono::{DateTime, SecondsFormat, Utc};
use sqlsieve_core::{ComplianceFinding, Severity, StatementCategory};
use sqlsieve_sql::Statement;
use crate::nomenclature::NomenclatureRuleSet;

pub(crate) const RULE_LINE: &str = "-- ==========================================";

/// A statement with its category, findings and generated header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedStatement {
    pub statement: Statement,
    pub category: StatementCategory,

    /// Findings in rule evaluation order
    pub findings: Vec<ComplianceFinding>,

    /// Comment block, each line ending in a newline
    pub header: String,
}

impl AnnotatedStatement {
    /// Number of blocking findings
    pub fn blocking_count(&self) -> usize {
        self.findings.iter().filter(|f| f.is_blocking()).count()
    }

    /// Header, original text and original terminator
    pub fn render(&self) -> String {
        format!("{}{}", self.header, self.statement.source_text())
    }
}

/// Annotate a statement
pub fn annotate(
    statement: Statement,
    category: StatementCategory,
    findings: Vec<ComplianceFinding>,
    ruleset: &NomenclatureRuleSet,
    source_id: &str,
    timestamp: DateTime<Utc>,
) -> AnnotatedStatement {
    let header = render_header(&statement, category, &findings, ruleset, source_id, timestamp);
    AnnotatedStatement {
        statement,
        category,
        findings,
        header,
    }
}

/// Render the header block for a statement
pub fn render_header(
    statement: &Statement,
    category: StatementCategory,
    findings: &[ComplianceFinding],
    ruleset: &NomenclatureRuleSet,
    source_id: &str,
    timestamp: DateTime<Utc>,
) -> String {
    let mut lines = vec![
        RULE_LINE.to_string(),
        format!(
            "-- STATEMENT {} | {} ({})",
            statement.ordinal + 1,
            category,
            category.short_label()
        ),
        RULE_LINE.to_string(),
        format!(
            "-- Source: {} (bytes {}..{})",
            single_line(source_id),
            statement.start_offset,
            statement.end_offset
        ),
        format!("-- Processed: {}", format_timestamp(timestamp)),
    ];

    if category == StatementCategory::Unclassified {
        lines.push("-- !!! UNCLASSIFIED: not recognised as schema definition or data manipulation".to_string());
        lines.push("-- !!! Passed through unchanged; review before execution".to_string());
    }

    if findings.is_empty() {
        lines.push("-- Compliance findings: none".to_string());
    } else {
        let blocking = findings.iter().filter(|f| f.severity == Severity::Blocking).count();
        lines.push(format!(
            "-- Compliance findings: {} ({} blocking)",
            findings.len(),
            blocking
        ));
        for finding in findings {
            lines.push(format!(
                "--   [{}] {}: {}",
                finding.severity.label(),
                single_line(&finding.rule_id),
                single_line(&finding.message)
            ));
        }
    }

    let matches = ruleset.matches(&statement.raw_text);
    if !matches.is_empty() {
        lines.push("-- Nomenclature:".to_string());
        for entry in matches {
            if entry.canonical.is_empty() {
                lines.push(format!("--   {} {}", entry.kind.label(), single_line(entry.token)));
            } else {
                lines.push(format!(
                    "--   {} {} -> {}",
                    entry.kind.label(),
                    single_line(entry.token),
                    single_line(entry.canonical)
                ));
            }
        }
    }

    lines.push(RULE_LINE.to_string());

    let mut header = lines.join("\n");
    header.push('\n');
    header
}

pub(crate) fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Keep interpolated values inside a single comment line
pub(crate) fn single_line(value: &str) -> String {
    value.replace(&['\r', '\n'][..], " ")
}
