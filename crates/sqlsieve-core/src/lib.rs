//! SQLSieve Core
//!
//! Core domain model with stable, versioned types.
//! Never rename finding codes - they are part of the public API.

pub mod finding;
pub mod category;
pub mod report;
pub mod config;

pub use finding::{ComplianceFinding, Severity, codes};
pub use category::StatementCategory;
pub use report::{RunReport, ReportVersion, ReportSummary, StatementSummary};
pub use config::{Config, ConfigError, Dialect, SeverityThreshold, ProfileConfig, CustomRule, UnclassifiedPolicy, OutputConfig};
