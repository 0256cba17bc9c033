//! Rule checker
//!
//! Evaluates a statement against a compliance profile. Structural findings
//! come first, then one finding per matching rule in table order.

use sqlsieve_core::{codes, ComplianceFinding, Severity};
use sqlsieve_sql::{decomment, Statement, Terminator};
use crate::profile::ComplianceProfile;

/// Check a statement against a profile
pub fn check(statement: &Statement, profile: &ComplianceProfile) -> Vec<ComplianceFinding> {
    let mut findings = structural_findings(statement, profile);

    let text = decomment(&statement.raw_text);
    findings.extend(
        profile
            .rules()
            .iter()
            .filter(|rule| rule.matches(&text))
            .map(|rule| profile.finding(&rule.id, rule.severity, rule.message.clone())),
    );

    findings
}

/// Findings describing how the splitter closed the statement
fn structural_findings(statement: &Statement, profile: &ComplianceProfile) -> Vec<ComplianceFinding> {
    if let Some(construct) = &statement.unterminated {
        return vec![profile.finding(
            codes::UNTERMINATED_CONSTRUCT,
            Severity::Informational,
            format!("Unterminated lexical construct ({}); statement closed at end of input", construct),
        )];
    }

    if statement.terminator == Terminator::EndOfInput {
        return vec![profile.finding(
            codes::MISSING_TERMINATOR,
            Severity::Informational,
            "Missing trailing terminator; end of input used as implicit terminator",
        )];
    }

    Vec::new()
}
