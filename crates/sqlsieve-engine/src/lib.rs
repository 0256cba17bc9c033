//! SQLSieve engine - Core business logic
//!
//! This crate implements the processing engine:
//! - Compliance profiles and the rule checker
//! - Nomenclature ruleset resolution
//! - Statement annotation
//! - Document emission
//! - The end-to-end pipeline

pub mod profile;
pub mod checker;
pub mod nomenclature;
pub mod annotator;
pub mod emitter;
pub mod pipeline;

pub use profile::{ComplianceProfile, ComplianceRule, ProfileError, RuleDefinition, SNOWFLAKE_RULES};
pub use checker::check;
pub use nomenclature::{resolve, NomenclatureKind, NomenclatureMatch, NomenclatureRuleSet, Resolution};
pub use annotator::{annotate, render_header, AnnotatedStatement};
pub use emitter::{emit, emit_with_appended, OutputDocument};
pub use pipeline::{CheckedStatement, Pipeline, PipelineOutput};
