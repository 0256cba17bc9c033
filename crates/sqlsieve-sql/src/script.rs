//! Script and statement model

use serde::{Deserialize, Serialize};
use crate::lexer::UnterminatedConstruct;

/// Immutable input script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    /// Originating path or name
    pub source_identifier: String,

    /// Full raw content
    pub text: String,
}

impl Script {
    pub fn new(source_identifier: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            source_identifier: source_identifier.into(),
            text: text.into(),
        }
    }

    /// Split the script into statements
    pub fn statements(&self) -> Vec<Statement> {
        crate::splitter::split(&self.text)
    }

    /// File stem of the source identifier, used to name output documents
    pub fn stem(&self) -> String {
        std::path::Path::new(&self.source_identifier)
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .unwrap_or("script")
            .to_string()
    }
}

/// How a statement span was closed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Terminator {
    /// An explicit `;`
    Semicolon,

    /// End of input acted as an implicit terminator
    EndOfInput,
}

impl Terminator {
    /// Text consumed from the script for this terminator
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Semicolon => ";",
            Self::EndOfInput => "",
        }
    }
}

/// A contiguous span of the script text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    /// 0-based position in the script
    pub ordinal: usize,

    /// Span text including leading comments and whitespace, terminator excluded
    pub raw_text: String,

    /// Byte offset into `Script::text`
    pub start_offset: usize,

    /// Byte offset one past the span; the terminator (if any) starts here
    pub end_offset: usize,

    pub terminator: Terminator,

    /// Construct left open when input ended inside this statement
    pub unterminated: Option<UnterminatedConstruct>,
}

impl Statement {
    /// Whether an explicit `;` closed the statement
    pub fn is_terminated(&self) -> bool {
        self.terminator == Terminator::Semicolon
    }

    /// Original span text followed by its original terminator
    pub fn source_text(&self) -> String {
        format!("{}{}", self.raw_text, self.terminator.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_stem() {
        assert_eq!(Script::new("/data/in/orders.sql", "").stem(), "orders");
        assert_eq!(Script::new("orders", "").stem(), "orders");
        assert_eq!(Script::new("", "").stem(), "script");
    }

    #[test]
    fn terminator_text() {
        assert_eq!(Terminator::Semicolon.as_str(), ";");
        assert_eq!(Terminator::EndOfInput.as_str(), "");
    }
}
