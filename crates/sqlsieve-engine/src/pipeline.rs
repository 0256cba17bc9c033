//! End-to-end pipeline
//!
//! split -> classify -> check -> annotate -> emit, with the ruleset resolved
//! once per run. Every run is independent; the pipeline holds no mutable state.

use chrono::{DateTime, Utc};
use sqlsieve_core::{
    ComplianceFinding, Config, RunReport, StatementCategory, StatementSummary, UnclassifiedPolicy,
};
use sqlsieve_sql::{classify, Script, Statement};
use tracing::{debug, info};
use crate::annotator::{annotate, AnnotatedStatement};
use crate::checker::check;
use crate::emitter::{emit, emit_with_appended, OutputDocument};
use crate::nomenclature::resolve;
use crate::profile::{ComplianceProfile, ProfileError};

/// A statement with its category and findings, before annotation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckedStatement {
    pub statement: Statement,
    pub category: StatementCategory,
    pub findings: Vec<ComplianceFinding>,
}

/// Everything produced by one run
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// All annotated statements in ordinal order
    pub statements: Vec<AnnotatedStatement>,

    /// Output documents: DDL, DML, then the pass-through document if any
    pub documents: Vec<OutputDocument>,

    /// Findings raised while resolving the nomenclature ruleset
    pub ruleset_findings: Vec<ComplianceFinding>,

    pub report: RunReport,
}

impl PipelineOutput {
    /// Document whose primary category is `category`
    pub fn document(&self, category: StatementCategory) -> Option<&OutputDocument> {
        self.documents.iter().find(|d| d.category == category)
    }

    pub fn has_blocking(&self) -> bool {
        self.report.has_blocking()
    }
}

/// Statement processing pipeline
#[derive(Debug, Clone)]
pub struct Pipeline {
    profile: ComplianceProfile,
    unclassified: UnclassifiedPolicy,
}

impl Pipeline {
    pub fn new(profile: ComplianceProfile, unclassified: UnclassifiedPolicy) -> Self {
        Self { profile, unclassified }
    }

    /// Build the pipeline described by a configuration
    pub fn from_config(config: &Config) -> Result<Self, ProfileError> {
        Ok(Self::new(ComplianceProfile::from_config(config)?, config.unclassified))
    }

    pub fn profile(&self) -> &ComplianceProfile {
        &self.profile
    }

    /// Split, classify and check a script without annotating it
    pub fn check_script(&self, script: &Script) -> Vec<CheckedStatement> {
        script
            .statements()
            .into_iter()
            .map(|statement| {
                let category = classify(&statement);
                let findings = check(&statement, &self.profile);
                debug!(
                    ordinal = statement.ordinal,
                    %category,
                    findings = findings.len(),
                    "checked statement"
                );
                CheckedStatement {
                    statement,
                    category,
                    findings,
                }
            })
            .collect()
    }

    /// Process a script into annotated documents
    ///
    /// Never fails. `timestamp` is supplied by the caller so that identical
    /// inputs always produce identical output.
    pub fn run(&self, script: &Script, ruleset_text: &str, timestamp: DateTime<Utc>) -> PipelineOutput {
        let source_id = script.source_identifier.as_str();
        let resolution = resolve(ruleset_text);

        let statements: Vec<AnnotatedStatement> = self
            .check_script(script)
            .into_iter()
            .map(|checked| {
                annotate(
                    checked.statement,
                    checked.category,
                    checked.findings,
                    &resolution.ruleset,
                    source_id,
                    timestamp,
                )
            })
            .collect();

        let documents = self.documents(&statements, source_id, timestamp);

        let summaries = statements.iter().map(summarize).collect();
        let report = RunReport::new(
            source_id,
            timestamp,
            &script.text,
            summaries,
            resolution.findings.clone(),
        );

        info!(
            source = source_id,
            statements = report.summary.statements,
            ddl = report.summary.schema_definition,
            dml = report.summary.data_manipulation,
            unclassified = report.summary.unclassified,
            blocking = report.summary.blocking,
            "processed script"
        );

        PipelineOutput {
            statements,
            documents,
            ruleset_findings: resolution.findings,
            report,
        }
    }

    fn documents(
        &self,
        statements: &[AnnotatedStatement],
        source_id: &str,
        timestamp: DateTime<Utc>,
    ) -> Vec<OutputDocument> {
        let ddl = emit(statements, StatementCategory::SchemaDefinition, source_id, timestamp);

        match self.unclassified {
            UnclassifiedPolicy::Separate => {
                let dml = emit(statements, StatementCategory::DataManipulation, source_id, timestamp);
                let passthrough = emit(statements, StatementCategory::Unclassified, source_id, timestamp);

                let mut documents = vec![ddl, dml];
                if !passthrough.is_empty() {
                    documents.push(passthrough);
                }
                documents
            }
            UnclassifiedPolicy::AppendToDml => {
                let dml = emit_with_appended(
                    statements,
                    StatementCategory::DataManipulation,
                    &[StatementCategory::Unclassified],
                    source_id,
                    timestamp,
                );
                vec![ddl, dml]
            }
        }
    }
}

fn summarize(annotated: &AnnotatedStatement) -> StatementSummary {
    StatementSummary {
        ordinal: annotated.statement.ordinal,
        category: annotated.category,
        start_offset: annotated.statement.start_offset,
        end_offset: annotated.statement.end_offset,
        terminated: annotated.statement.is_terminated(),
        findings: annotated.findings.clone(),
    }
}
