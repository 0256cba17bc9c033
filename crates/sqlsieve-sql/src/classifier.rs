//! Statement classification by leading keyword

use sqlsieve_core::StatementCategory;
use crate::lexer::{lex, SegmentKind};
use crate::script::Statement;

/// Keywords opening a schema-definition statement
const SCHEMA_DEFINITION_KEYWORDS: &[&str] = &[
    "CREATE", "ALTER", "DROP", "TRUNCATE", "RENAME", "GRANT", "REVOKE", "COMMENT", "UNDROP", "USE",
];

/// Keywords opening a data-manipulation statement
const DATA_MANIPULATION_KEYWORDS: &[&str] = &[
    "SELECT", "WITH", "INSERT", "UPDATE", "DELETE", "MERGE", "UPSERT", "CALL", "EXEC", "EXECUTE",
    "COPY", "VALUES",
];

/// Leading mark of UTF-8 files saved by some editors
const BYTE_ORDER_MARK: char = '\u{feff}';

/// Classify a statement
pub fn classify(statement: &Statement) -> StatementCategory {
    classify_text(&statement.raw_text)
}

/// Classify raw statement text
///
/// Leading whitespace, a byte order mark, comments and opening parentheses are
/// skipped; the first word is matched case-insensitively. No match yields `Unclassified`.
pub fn classify_text(text: &str) -> StatementCategory {
    let Some(keyword) = leading_keyword(text) else {
        return StatementCategory::Unclassified;
    };

    let keyword = keyword.to_ascii_uppercase();
    if SCHEMA_DEFINITION_KEYWORDS.contains(&keyword.as_str()) {
        StatementCategory::SchemaDefinition
    } else if DATA_MANIPULATION_KEYWORDS.contains(&keyword.as_str()) {
        StatementCategory::DataManipulation
    } else {
        StatementCategory::Unclassified
    }
}

/// First word of the statement outside comments
///
/// Returns `None` for empty or comment-only text, or when the first
/// significant character is not the start of a word (a literal, a number).
pub fn leading_keyword(text: &str) -> Option<&str> {
    let lexed = lex(text);

    for segment in &lexed.segments {
        match segment.kind {
            SegmentKind::LineComment | SegmentKind::BlockComment => continue,
            SegmentKind::Code => {
                let code = segment.text(text);
                let rest = code.trim_start_matches(|c: char| c.is_whitespace() || c == '(' || c == BYTE_ORDER_MARK);
                if rest.is_empty() {
                    continue;
                }
                if !rest.starts_with(|c: char| c.is_ascii_alphabetic()) {
                    return None;
                }
                let end = rest
                    .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                    .unwrap_or(rest.len());
                return Some(&rest[..end]);
            }
            _ => return None,
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_definition_keywords() {
        for sql in ["CREATE TABLE t (a INT)", "alter table t add c int", "DROP VIEW v", "GRANT SELECT ON t TO r"] {
            assert_eq!(classify_text(sql), StatementCategory::SchemaDefinition, "{}", sql);
        }
    }

    #[test]
    fn data_manipulation_keywords() {
        for sql in ["INSERT INTO t VALUES (1)", "update t set a = 1", "DELETE FROM t", "Select 1", "MERGE INTO t USING s ON 1=1"] {
            assert_eq!(classify_text(sql), StatementCategory::DataManipulation, "{}", sql);
        }
    }

    #[test]
    fn leading_comments_are_skipped() {
        let sql = "-- creates the table\n/* CREATE? no: INSERT */\n  INSERT INTO t VALUES (1)";
        assert_eq!(leading_keyword(sql), Some("INSERT"));
        assert_eq!(classify_text(sql), StatementCategory::DataManipulation);
    }

    #[test]
    fn byte_order_mark_is_skipped() {
        assert_eq!(classify_text("\u{feff}CREATE TABLE t (a INT)"), StatementCategory::SchemaDefinition);
        assert_eq!(leading_keyword("\u{feff}-- header\nSELECT 1"), Some("SELECT"));
    }

    #[test]
    fn parenthesised_query() {
        assert_eq!(classify_text("\n((SELECT 1) UNION (SELECT 2))"), StatementCategory::DataManipulation);
    }

    #[test]
    fn unclassified_outcomes() {
        assert_eq!(classify_text(""), StatementCategory::Unclassified);
        assert_eq!(classify_text("   \n"), StatementCategory::Unclassified);
        assert_eq!(classify_text("-- only a comment"), StatementCategory::Unclassified);
        assert_eq!(classify_text("/* unterminated"), StatementCategory::Unclassified);
        assert_eq!(classify_text("'literal'"), StatementCategory::Unclassified);
        assert_eq!(classify_text("42"), StatementCategory::Unclassified);
        assert_eq!(classify_text("SHOW TABLES"), StatementCategory::Unclassified);
    }

    #[test]
    fn keyword_must_be_whole_word() {
        assert_eq!(leading_keyword("CREATED_AT"), Some("CREATED_AT"));
        assert_eq!(classify_text("CREATED_AT"), StatementCategory::Unclassified);
    }
}
