//! Document emission
//!
//! Assembles annotated statements of one category into a self-describing
//! document: a document header, then each statement block in ordinal order.

use chrono::{DateTime, Utc};
use sqlsieve_core::{OutputConfig, StatementCategory};
use crate::annotator::{format_timestamp, single_line, AnnotatedStatement, RULE_LINE};

/// A finished output document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputDocument {
    /// Primary category of the document
    pub category: StatementCategory,

    /// Statements in document order
    pub statements: Vec<AnnotatedStatement>,

    /// Document-level header
    pub header: String,

    /// Full text, ready to be persisted verbatim
    pub body: String,
}

impl OutputDocument {
    /// Number of statements in the document
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Blocking findings across all statements of the document
    pub fn blocking_count(&self) -> usize {
        self.statements.iter().map(AnnotatedStatement::blocking_count).sum()
    }

    /// File name derived from the source stem and the category
    pub fn file_name(&self, output: &OutputConfig, stem: &str) -> String {
        output.file_name(stem, self.category)
    }
}

/// Emit the document for one category
pub fn emit(
    statements: &[AnnotatedStatement],
    category: StatementCategory,
    source_id: &str,
    timestamp: DateTime<Utc>,
) -> OutputDocument {
    emit_with_appended(statements, category, &[], source_id, timestamp)
}

/// Emit a document for `category` that also carries statements of the
/// `appended` categories, all in script order
///
/// A statement left open at end of input is always last in the script, so
/// keeping script order never places another statement inside it.
pub fn emit_with_appended(
    statements: &[AnnotatedStatement],
    category: StatementCategory,
    appended: &[StatementCategory],
    source_id: &str,
    timestamp: DateTime<Utc>,
) -> OutputDocument {
    let mut selected = select(statements, category);
    let primary_count = selected.len();
    for extra in appended.iter().filter(|extra| **extra != category) {
        selected.extend(select(statements, *extra));
    }
    selected.sort_by_key(|s| s.statement.ordinal);

    let header = render_document_header(category, &selected, primary_count, source_id, timestamp);

    let mut body = header.clone();
    for statement in &selected {
        body.push('\n');
        body.push_str(&statement.render());
        body.push('\n');
    }

    OutputDocument {
        category,
        statements: selected,
        header,
        body,
    }
}

fn select(statements: &[AnnotatedStatement], category: StatementCategory) -> Vec<AnnotatedStatement> {
    let mut selected: Vec<AnnotatedStatement> = statements
        .iter()
        .filter(|s| s.category == category)
        .cloned()
        .collect();
    selected.sort_by_key(|s| s.statement.ordinal);
    selected
}

fn document_title(category: StatementCategory) -> &'static str {
    match category {
        StatementCategory::SchemaDefinition => "DDL STATEMENTS",
        StatementCategory::DataManipulation => "DML STATEMENTS",
        StatementCategory::Unclassified => "UNCLASSIFIED PASS-THROUGH",
    }
}

fn render_document_header(
    category: StatementCategory,
    statements: &[AnnotatedStatement],
    primary_count: usize,
    source_id: &str,
    timestamp: DateTime<Utc>,
) -> String {
    let blocking: usize = statements.iter().map(AnnotatedStatement::blocking_count).sum();

    let mut lines = vec![
        RULE_LINE.to_string(),
        format!("-- SQLSIEVE - {}", document_title(category)),
        RULE_LINE.to_string(),
        format!("-- Category: {}", category),
        format!("-- Source File: {}", single_line(source_id)),
        format!("-- Generated: {}", format_timestamp(timestamp)),
        format!("-- Statements: {}", statements.len()),
        format!("-- Blocking Findings: {}", blocking),
    ];

    if category == StatementCategory::Unclassified {
        lines.push("-- !!! PASS-THROUGH: these statements were not recognised as schema".to_string());
        lines.push("-- !!! definition or data manipulation and are reproduced unchanged.".to_string());
    }

    let appended = statements.len() - primary_count;
    if appended > 0 {
        lines.push(format!(
            "-- !!! {} statement(s) of another category merged in script order with the {} statement(s)",
            appended,
            category.short_label()
        ));
    }

    if blocking > 0 {
        lines.push("-- !!! REVIEW REQUIRED: blocking findings present".to_string());
    }

    lines.push(RULE_LINE.to_string());

    let mut header = lines.join("\n");
    header.push('\n');
    header
}
