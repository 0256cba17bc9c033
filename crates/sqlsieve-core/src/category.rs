//! Statement categories

use serde::{Deserialize, Serialize};

/// Category assigned to every statement by the classifier
///
/// `Unclassified` is a valid outcome (comment-only spans, stray terminators,
/// unknown leading keywords), not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementCategory {
    /// Defines or alters structural objects (DDL)
    SchemaDefinition,

    /// Reads or mutates row-level data (DML)
    DataManipulation,

    /// Neither of the above
    Unclassified,
}

impl StatementCategory {
    /// Short label used in file names and document banners
    pub fn short_label(&self) -> &'static str {
        match self {
            Self::SchemaDefinition => "DDL",
            Self::DataManipulation => "DML",
            Self::Unclassified => "UNCLASSIFIED",
        }
    }
}

impl std::fmt::Display for StatementCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SchemaDefinition => write!(f, "SchemaDefinition"),
            Self::DataManipulation => write!(f, "DataManipulation"),
            Self::Unclassified => write!(f, "Unclassified"),
        }
    }
}
