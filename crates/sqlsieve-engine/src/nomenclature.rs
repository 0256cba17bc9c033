//! Nomenclature ruleset resolution
//!
//! Parses a line-oriented naming-convention document into subject-area
//! tokens and layer prefixes. Bad lines are skipped with a finding; parsing
//! never fails.
//!
//! ```text
//! # banking nomenclature
//! [subject_areas]
//! cust = Customer & party
//! acct: Accounts & products
//!
//! [layers]
//! stg_ = staging
//! dim_ | dimension
//! fct_
//! ```

use std::collections::BTreeMap;
use sqlsieve_core::{codes, ComplianceFinding};
use tracing::warn;

/// Which table an entry belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum NomenclatureKind {
    SubjectArea,
    LayerPrefix,
}

impl NomenclatureKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::SubjectArea => "subject area",
            Self::LayerPrefix => "layer prefix",
        }
    }
}

/// Read-only lookup built from a ruleset document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NomenclatureRuleSet {
    /// Subject-area token (lowercase) to canonical abbreviation or label
    subject_areas: BTreeMap<String, String>,

    /// Layer-prefix token (lowercase) to optional description
    layer_prefixes: BTreeMap<String, String>,
}

/// An entry whose token occurs in a statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NomenclatureMatch<'a> {
    pub kind: NomenclatureKind,
    pub token: &'a str,
    pub canonical: &'a str,
}

/// Result of resolving a ruleset document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    pub ruleset: NomenclatureRuleSet,

    /// Ruleset-level findings for skipped lines
    pub findings: Vec<ComplianceFinding>,
}

impl NomenclatureRuleSet {
    pub fn is_empty(&self) -> bool {
        self.subject_areas.is_empty() && self.layer_prefixes.is_empty()
    }

    /// Total number of entries
    pub fn len(&self) -> usize {
        self.subject_areas.len() + self.layer_prefixes.len()
    }

    pub fn subject_areas(&self) -> &BTreeMap<String, String> {
        &self.subject_areas
    }

    pub fn layer_prefixes(&self) -> &BTreeMap<String, String> {
        &self.layer_prefixes
    }

    /// Canonical value for a subject-area token (case-insensitive)
    pub fn subject_area(&self, token: &str) -> Option<&str> {
        self.subject_areas.get(&token.to_lowercase()).map(String::as_str)
    }

    pub fn is_layer_prefix(&self, token: &str) -> bool {
        self.layer_prefixes.contains_key(&token.to_lowercase())
    }

    /// Entries whose token is a case-insensitive substring of the text
    ///
    /// Subject areas come first, then layer prefixes, each in token order.
    pub fn matches(&self, text: &str) -> Vec<NomenclatureMatch<'_>> {
        let haystack = text.to_lowercase();
        let subject_areas = self
            .subject_areas
            .iter()
            .map(|entry| (NomenclatureKind::SubjectArea, entry));
        let layer_prefixes = self
            .layer_prefixes
            .iter()
            .map(|entry| (NomenclatureKind::LayerPrefix, entry));

        subject_areas
            .chain(layer_prefixes)
            .filter(|(_, (token, _))| haystack.contains(token.as_str()))
            .map(|(kind, (token, canonical))| NomenclatureMatch {
                kind,
                token: token.as_str(),
                canonical: canonical.as_str(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    SubjectAreas,
    Layers,
    /// Lines under an unrecognised header are skipped
    Unknown,
}

/// Parse a ruleset document
pub fn resolve(text: &str) -> Resolution {
    let mut resolution = Resolution::default();
    let mut section = Section::SubjectAreas;

    for (index, line) in text.lines().enumerate() {
        let line_number = index + 1;
        let trimmed = line.trim();

        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with("//") {
            continue;
        }

        if let Some(name) = trimmed.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')) {
            section = parse_section(name);
            if section == Section::Unknown {
                warn!(line = line_number, section = name, "unknown nomenclature section");
                resolution.findings.push(ComplianceFinding::info(
                    codes::RULESET_UNKNOWN_SECTION,
                    format!("line {}: unknown section [{}]; its entries are skipped", line_number, name.trim()),
                ));
            }
            continue;
        }

        let entry = trimmed
            .strip_prefix("- ")
            .or_else(|| trimmed.strip_prefix("* "))
            .unwrap_or(trimmed);

        let target = match section {
            Section::SubjectAreas => &mut resolution.ruleset.subject_areas,
            Section::Layers => &mut resolution.ruleset.layer_prefixes,
            Section::Unknown => continue,
        };

        match parse_entry(entry, section == Section::Layers) {
            Ok((token, canonical)) => {
                target.insert(token, canonical);
            }
            Err(reason) => {
                warn!(line = line_number, reason, "skipping nomenclature line");
                resolution.findings.push(ComplianceFinding::info(
                    codes::RULESET_LINE_SKIPPED,
                    format!("line {}: {}; skipped", line_number, reason),
                ));
            }
        }
    }

    resolution
}

fn parse_section(name: &str) -> Section {
    match name.trim().to_lowercase().replace(&[' ', '-'][..], "_").as_str() {
        "subject_areas" | "subjects" | "domains" => Section::SubjectAreas,
        "layers" | "layer_prefixes" | "prefixes" => Section::Layers,
        _ => Section::Unknown,
    }
}

/// Split `key = value`, `key: value` or `key | value` at the first delimiter
fn parse_entry(entry: &str, bare_token_allowed: bool) -> Result<(String, String), &'static str> {
    let (key, value) = match entry.find(&['=', ':', '|'][..]) {
        Some(pos) => (entry[..pos].trim(), entry[pos + 1..].trim()),
        None if bare_token_allowed => (entry, ""),
        None => return Err("expected `token = value`"),
    };

    if key.is_empty() {
        return Err("empty token");
    }
    if key.contains(char::is_whitespace) {
        return Err("token contains whitespace");
    }
    if value.is_empty() && !bare_token_allowed {
        return Err("empty value");
    }

    Ok((key.to_lowercase(), value.to_string()))
}
