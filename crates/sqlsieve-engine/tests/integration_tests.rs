//! Integration tests for the processing pipeline

use chrono::{DateTime, TimeZone, Utc};
use pretty_assertions::assert_eq;
use sqlsieve_core::{codes, Config, Severity, StatementCategory, UnclassifiedPolicy};
use sqlsieve_engine::{check, resolve, ComplianceProfile, Pipeline};
use sqlsieve_sql::{split, Script};

const NOMENCLATURE: &str = "\
# Banking data warehouse nomenclature
[subject_areas]
cust = Customer & party
acct = Accounts & products
txn = Transactions
risk = Risk & regulatory

[layers]
stg_ = staging
dim_ = dimension
fct_ = fact
";

const SCRIPT: &str = "\
-- Customer staging
CREATE OR REPLACE TABLE stg_cust (
    cust_id NUMBER AUTOINCREMENT,
    created_at TIMESTAMP_NTZ
);
CREATE INDEX ix_cust ON stg_cust(cust_id);
INSERT INTO stg_cust (created_at) VALUES ('2024-01-01; 00:00');
-- c;d
SELECT * FROM fct_txn;
SHOW TABLES;
UPDATE dim_acct SET flag = 1 /* unterminated";

fn timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap()
}

fn pipeline() -> Pipeline {
    Pipeline::from_config(&Config::default()).unwrap()
}

#[test]
fn end_to_end_routing() {
    let script = Script::new("/data/load_customers.sql", SCRIPT);
    let output = pipeline().run(&script, NOMENCLATURE, timestamp());

    let categories: Vec<StatementCategory> = output.statements.iter().map(|s| s.category).collect();
    assert_eq!(
        categories,
        vec![
            StatementCategory::SchemaDefinition,
            StatementCategory::SchemaDefinition,
            StatementCategory::DataManipulation,
            StatementCategory::DataManipulation,
            StatementCategory::Unclassified,
            StatementCategory::DataManipulation,
        ]
    );

    assert_eq!(output.documents.len(), 3);
    let ddl = output.document(StatementCategory::SchemaDefinition).unwrap();
    let dml = output.document(StatementCategory::DataManipulation).unwrap();
    let passthrough = output.document(StatementCategory::Unclassified).unwrap();
    assert_eq!(ddl.len(), 2);
    assert_eq!(dml.len(), 3);
    assert_eq!(passthrough.len(), 1);

    assert_eq!(ddl.blocking_count(), 1);
    assert!(ddl.header.contains("-- Blocking Findings: 1"));
    assert!(dml.body.contains("VALUES ('2024-01-01; 00:00');"));
    assert!(dml.body.contains("-- Nomenclature:"));

    assert_eq!(output.report.summary.blocking, 1);
    assert!(output.has_blocking());
    assert_eq!(output.report.script_sha256.len(), 64);
}

#[test]
fn unterminated_tail_is_flagged_not_fatal() {
    let script = Script::new("load.sql", SCRIPT);
    let output = pipeline().run(&script, NOMENCLATURE, timestamp());

    let last = output.statements.last().unwrap();
    assert!(!last.statement.is_terminated());
    assert_eq!(last.findings[0].rule_id, codes::UNTERMINATED_CONSTRUCT);
    assert_eq!(last.findings[0].severity, Severity::Informational);
}

#[test]
fn unterminated_block_comment_after_statement() {
    let statements = split("SELECT 1; /* unterminated");
    assert_eq!(statements.len(), 2);

    let profile = ComplianceProfile::snowflake().unwrap();
    let findings = check(&statements[1], &profile);
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].rule_id, codes::UNTERMINATED_CONSTRUCT);
    assert_eq!(findings[0].severity, Severity::Informational);
}

#[test]
fn documents_are_byte_identical_across_runs() {
    let script = Script::new("load.sql", SCRIPT);
    let first = pipeline().run(&script, NOMENCLATURE, timestamp());
    let second = pipeline().run(&script, NOMENCLATURE, timestamp());

    let bodies = |output: &sqlsieve_engine::PipelineOutput| {
        output.documents.iter().map(|d| d.body.clone()).collect::<Vec<_>>()
    };
    assert_eq!(bodies(&first), bodies(&second));
    assert_eq!(
        serde_json::to_string(&first.report).unwrap(),
        serde_json::to_string(&second.report).unwrap()
    );
}

#[test]
fn documents_reproduce_every_statement() {
    let script = Script::new("load.sql", SCRIPT);
    let output = pipeline().run(&script, "", timestamp());

    for statement in split(SCRIPT) {
        let found = output
            .documents
            .iter()
            .filter(|d| d.body.contains(&statement.source_text()))
            .count();
        assert_eq!(found, 1, "statement {} not emitted exactly once", statement.ordinal);
    }
}

#[test]
fn empty_ruleset_omits_nomenclature() {
    let script = Script::new("load.sql", SCRIPT);
    let output = pipeline().run(&script, "", timestamp());

    assert!(resolve("").ruleset.is_empty());
    assert!(output.statements.iter().all(|s| !s.header.contains("Nomenclature")));
}

#[test]
fn config_driven_pipeline() {
    let config = Config::from_toml(
        r#"
        unclassified = "append-to-dml"

        [severity.overrides]
        "SF-B001" = "warning"

        [profile]
        disabled = ["SF-I*"]

        [[profile.rules]]
        id = "ACME-001"
        pattern = '\bSELECT\s+\*'
        severity = "blocking"
        message = "Avoid SELECT * in warehouse loads"
        "#,
    )
    .unwrap();
    assert_eq!(config.unclassified, UnclassifiedPolicy::AppendToDml);

    let output = Pipeline::from_config(&config)
        .unwrap()
        .run(&Script::new("load.sql", SCRIPT), NOMENCLATURE, timestamp());

    assert_eq!(output.documents.len(), 2);
    let index = &output.statements[1];
    assert_eq!(index.findings[0].rule_id, codes::SF_SECONDARY_INDEX);
    assert_eq!(index.findings[0].severity, Severity::Warning);

    let select = &output.statements[3];
    assert_eq!(select.findings.len(), 1);
    assert_eq!(select.findings[0].rule_id, "ACME-001");
    assert!(output.has_blocking());

    assert!(output.statements[0].findings.is_empty());
}
