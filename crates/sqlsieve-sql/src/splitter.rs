//! Statement splitter
//!
//! Groups lexer segments into statements at every terminator seen in
//! normal mode. Never fails: any input yields a complete partition.

use crate::lexer::{lex, Lexed, SegmentKind};
use crate::script::{Statement, Terminator};

/// Split raw script text into ordered statements
///
/// Spans keep their leading and trailing whitespace. Text after the last
/// terminator becomes a final statement closed by end of input, unless it
/// holds only whitespace and closed comments, in which case it is dropped.
pub fn split(text: &str) -> Vec<Statement> {
    let Lexed { segments, final_mode } = lex(text);
    let mut statements = Vec::new();
    let mut start = 0;

    for segment in segments.iter().filter(|s| s.kind == SegmentKind::Terminator) {
        statements.push(Statement {
            ordinal: statements.len(),
            raw_text: text[start..segment.start].to_string(),
            start_offset: start,
            end_offset: segment.start,
            terminator: Terminator::Semicolon,
            unterminated: None,
        });
        start = segment.end;
    }

    let unterminated = final_mode.unterminated();
    let remainder_has_content = unterminated.is_some()
        || segments
            .iter()
            .filter(|s| s.start >= start)
            .any(|s| match s.kind {
                SegmentKind::Code => !s.text(text).trim().is_empty(),
                SegmentKind::LineComment | SegmentKind::BlockComment => false,
                _ => true,
            });

    if remainder_has_content {
        statements.push(Statement {
            ordinal: statements.len(),
            raw_text: text[start..].to_string(),
            start_offset: start,
            end_offset: text.len(),
            terminator: Terminator::EndOfInput,
            unterminated,
        });
    }

    statements
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::UnterminatedConstruct;

    fn raw(statements: &[Statement]) -> Vec<&str> {
        statements.iter().map(|s| s.raw_text.as_str()).collect()
    }

    #[test]
    fn split_simple_statements() {
        let statements = split("SELECT 1; SELECT 2;");
        assert_eq!(raw(&statements), vec!["SELECT 1", " SELECT 2"]);
        assert!(statements.iter().all(|s| s.is_terminated()));
    }

    #[test]
    fn split_keeps_literal_and_skips_comment() {
        let statements = split("INSERT INTO t VALUES ('a;b'); -- c;d\nSELECT 1;");
        assert_eq!(statements.len(), 2);
        assert!(statements[0].raw_text.contains("'a;b'"));
        assert_eq!(statements[1].raw_text, " -- c;d\nSELECT 1");
    }

    #[test]
    fn offsets_point_into_text() {
        let text = "CREATE TABLE a (x INT);\nINSERT INTO a VALUES (1);";
        for statement in split(text) {
            assert_eq!(&text[statement.start_offset..statement.end_offset], statement.raw_text);
        }
    }

    #[test]
    fn trailing_whitespace_dropped() {
        let statements = split("SELECT 1;\n\n  \n");
        assert_eq!(statements.len(), 1);
    }

    #[test]
    fn trailing_closed_comment_dropped() {
        let statements = split("SELECT 1;\n-- end of script\n/* done */\n");
        assert_eq!(statements.len(), 1);
    }

    #[test]
    fn missing_final_terminator_is_implicit() {
        let statements = split("SELECT 1;\nSELECT 2\n");
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[1].terminator, Terminator::EndOfInput);
        assert_eq!(statements[1].raw_text, "\nSELECT 2\n");
        assert_eq!(statements[1].unterminated, None);
    }

    #[test]
    fn unterminated_block_comment() {
        let statements = split("SELECT 1; /* unterminated");
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[1].raw_text, " /* unterminated");
        assert_eq!(statements[1].unterminated, Some(UnterminatedConstruct::BlockComment));
    }

    #[test]
    fn unterminated_literal_swallows_rest() {
        let statements = split("SELECT 'abc; SELECT 2;");
        assert_eq!(statements.len(), 1);
        assert_eq!(statements[0].unterminated, Some(UnterminatedConstruct::SingleQuotedLiteral));
        assert_eq!(statements[0].end_offset, "SELECT 'abc; SELECT 2;".len());
    }

    #[test]
    fn stray_terminators_yield_empty_statements() {
        let statements = split("SELECT 1;;");
        assert_eq!(raw(&statements), vec!["SELECT 1", ""]);
        assert_eq!(statements[1].ordinal, 1);
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert!(split("").is_empty());
        assert!(split("   \n\t").is_empty());
    }

    #[test]
    fn dollar_quoted_procedure_body() {
        let text = "CREATE OR REPLACE PROCEDURE p() RETURNS STRING LANGUAGE SQL AS $$\nBEGIN\n  INSERT INTO t VALUES (1);\n  RETURN 'ok';\nEND;\n$$;\nCALL p();";
        let statements = split(text);
        assert_eq!(statements.len(), 2);
        assert!(statements[0].raw_text.contains("RETURN 'ok';"));
        assert_eq!(statements[1].raw_text, "\nCALL p()");
    }
}
