//! Mode-driven SQL lexer
//!
//! A single left-to-right pass over the text. The current lexical mode is an
//! explicit state; every byte of the input lands in exactly one segment.
//! All delimiters are ASCII, so segment boundaries are always char boundaries.

use serde::{Deserialize, Serialize};

/// Lexical mode of the scanner
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexMode {
    /// Plain SQL code; `;` terminates a statement here and only here
    Normal,

    /// Inside `'...'`; `''` is an escaped quote
    SingleQuotedLiteral,

    /// Inside `"..."`; `""` is an escaped quote
    QuotedIdentifier,

    /// From `--` up to (not including) the next newline
    LineComment,

    /// From `/*` to the first `*/`; no nesting
    BlockComment,

    /// Inside `$tag$ ... $tag$`, tag stored without the dollars (may be empty)
    DollarQuotedBlock(String),
}

impl LexMode {
    /// The construct left open if input ends in this mode
    ///
    /// A line comment is closed by end of input, so it never counts.
    pub fn unterminated(&self) -> Option<UnterminatedConstruct> {
        match self {
            Self::Normal | Self::LineComment => None,
            Self::SingleQuotedLiteral => Some(UnterminatedConstruct::SingleQuotedLiteral),
            Self::QuotedIdentifier => Some(UnterminatedConstruct::QuotedIdentifier),
            Self::BlockComment => Some(UnterminatedConstruct::BlockComment),
            Self::DollarQuotedBlock(tag) => Some(UnterminatedConstruct::DollarQuotedBlock(tag.clone())),
        }
    }

    fn segment_kind(&self) -> SegmentKind {
        match self {
            Self::Normal => SegmentKind::Code,
            Self::SingleQuotedLiteral => SegmentKind::Literal,
            Self::QuotedIdentifier => SegmentKind::QuotedIdentifier,
            Self::LineComment => SegmentKind::LineComment,
            Self::BlockComment => SegmentKind::BlockComment,
            Self::DollarQuotedBlock(_) => SegmentKind::DollarBlock,
        }
    }
}

/// A lexical construct still open at end of input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnterminatedConstruct {
    SingleQuotedLiteral,
    QuotedIdentifier,
    BlockComment,
    DollarQuotedBlock(String),
}

impl std::fmt::Display for UnterminatedConstruct {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SingleQuotedLiteral => write!(f, "single-quoted literal"),
            Self::QuotedIdentifier => write!(f, "quoted identifier"),
            Self::BlockComment => write!(f, "block comment"),
            Self::DollarQuotedBlock(tag) => write!(f, "dollar-quoted block ${}$", tag),
        }
    }
}

/// Kind of a lexed segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Code,
    Literal,
    QuotedIdentifier,
    LineComment,
    BlockComment,
    DollarBlock,
    /// A statement-terminating `;`
    Terminator,
}

impl SegmentKind {
    pub fn is_comment(&self) -> bool {
        matches!(self, Self::LineComment | Self::BlockComment)
    }
}

/// A contiguous byte range of the input with a single kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub kind: SegmentKind,
    pub start: usize,
    pub end: usize,
}

impl Segment {
    /// Slice of the original text covered by this segment
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }
}

/// Result of lexing a text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lexed {
    /// Ordered, gap-free segments covering the whole input
    pub segments: Vec<Segment>,

    /// Mode the scanner was in when input ran out
    pub final_mode: LexMode,
}

/// Lex a text into segments
pub fn lex(text: &str) -> Lexed {
    let mut lexer = Lexer::new(text);
    while lexer.pos < lexer.bytes.len() {
        lexer.step();
    }
    lexer.finish()
}

/// Replace every comment by a single space, keeping everything else verbatim
pub fn decomment(text: &str) -> String {
    let lexed = lex(text);
    let mut out = String::with_capacity(text.len());
    for segment in &lexed.segments {
        if segment.kind.is_comment() {
            out.push(' ');
        } else {
            out.push_str(segment.text(text));
        }
    }
    out
}

struct Lexer<'a> {
    bytes: &'a [u8],
    pos: usize,
    mode: LexMode,
    segment_start: usize,
    /// Closing delimiter of the current dollar block, e.g. `$body$`
    dollar_closer: Vec<u8>,
    segments: Vec<Segment>,
}

impl<'a> Lexer<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            bytes: text.as_bytes(),
            pos: 0,
            mode: LexMode::Normal,
            segment_start: 0,
            dollar_closer: Vec::new(),
            segments: Vec::new(),
        }
    }

    fn peek(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn step(&mut self) {
        match self.mode {
            LexMode::Normal => self.step_normal(),
            LexMode::SingleQuotedLiteral => self.step_quoted(b'\''),
            LexMode::QuotedIdentifier => self.step_quoted(b'"'),
            LexMode::LineComment => self.step_line_comment(),
            LexMode::BlockComment => self.step_block_comment(),
            LexMode::DollarQuotedBlock(_) => self.step_dollar_block(),
        }
    }

    fn step_normal(&mut self) {
        match self.bytes[self.pos] {
            b'\'' => self.enter(LexMode::SingleQuotedLiteral, 1),
            b'"' => self.enter(LexMode::QuotedIdentifier, 1),
            b'-' if self.peek(1) == Some(b'-') => self.enter(LexMode::LineComment, 2),
            b'/' if self.peek(1) == Some(b'*') => self.enter(LexMode::BlockComment, 2),
            b'$' => match self.dollar_tag() {
                Some(tag) => {
                    let opener_len = tag.len() + 2;
                    self.dollar_closer = format!("${}$", tag).into_bytes();
                    self.enter(LexMode::DollarQuotedBlock(tag), opener_len);
                }
                None => self.pos += 1,
            },
            b';' => {
                self.close_segment(self.pos);
                self.segments.push(Segment {
                    kind: SegmentKind::Terminator,
                    start: self.pos,
                    end: self.pos + 1,
                });
                self.pos += 1;
                self.segment_start = self.pos;
            }
            _ => self.pos += 1,
        }
    }

    /// Parse a `$tag$` opener at the current position
    fn dollar_tag(&self) -> Option<String> {
        if self.pos > 0 && is_ident_byte(self.bytes[self.pos - 1]) {
            return None;
        }

        let tag_start = self.pos + 1;
        let mut end = tag_start;
        match self.bytes.get(end) {
            Some(b'$') => return Some(String::new()),
            Some(b) if b.is_ascii_alphabetic() || *b == b'_' => end += 1,
            _ => return None,
        }
        while end < self.bytes.len() && (self.bytes[end].is_ascii_alphanumeric() || self.bytes[end] == b'_') {
            end += 1;
        }

        if self.bytes.get(end) == Some(&b'$') {
            // Tag bytes are ASCII
            Some(String::from_utf8_lossy(&self.bytes[tag_start..end]).into_owned())
        } else {
            None
        }
    }

    fn step_quoted(&mut self, quote: u8) {
        if self.bytes[self.pos] != quote {
            self.pos += 1;
        } else if self.peek(1) == Some(quote) {
            self.pos += 2;
        } else {
            self.pos += 1;
            self.leave();
        }
    }

    fn step_line_comment(&mut self) {
        if self.bytes[self.pos] == b'\n' {
            // The newline itself belongs to the following code
            self.leave();
        } else {
            self.pos += 1;
        }
    }

    fn step_block_comment(&mut self) {
        if self.bytes[self.pos] == b'*' && self.peek(1) == Some(b'/') {
            self.pos += 2;
            self.leave();
        } else {
            self.pos += 1;
        }
    }

    fn step_dollar_block(&mut self) {
        if self.bytes[self.pos..].starts_with(&self.dollar_closer) {
            self.pos += self.dollar_closer.len();
            self.dollar_closer.clear();
            self.leave();
        } else {
            self.pos += 1;
        }
    }

    /// Close pending code and switch into a quoted or comment mode
    fn enter(&mut self, mode: LexMode, opener_len: usize) {
        self.close_segment(self.pos);
        self.segment_start = self.pos;
        self.mode = mode;
        self.pos += opener_len;
    }

    /// Close the current construct at `pos` and return to normal mode
    fn leave(&mut self) {
        self.close_segment(self.pos);
        self.segment_start = self.pos;
        self.mode = LexMode::Normal;
    }

    fn close_segment(&mut self, end: usize) {
        if end > self.segment_start {
            self.segments.push(Segment {
                kind: self.mode.segment_kind(),
                start: self.segment_start,
                end,
            });
        }
    }

    fn finish(mut self) -> Lexed {
        self.close_segment(self.bytes.len());
        Lexed {
            segments: self.segments,
            final_mode: self.mode,
        }
    }
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str) -> Vec<(SegmentKind, &str)> {
        lex(text)
            .segments
            .iter()
            .map(|s| (s.kind, s.text(text)))
            .collect()
    }

    #[test]
    fn lex_code_and_terminator() {
        assert_eq!(
            kinds("SELECT 1;"),
            vec![(SegmentKind::Code, "SELECT 1"), (SegmentKind::Terminator, ";")]
        );
    }

    #[test]
    fn doubled_quote_stays_in_literal() {
        let text = "SELECT 'it''s;fine';";
        assert_eq!(
            kinds(text),
            vec![
                (SegmentKind::Code, "SELECT "),
                (SegmentKind::Literal, "'it''s;fine'"),
                (SegmentKind::Terminator, ";"),
            ]
        );
    }

    #[test]
    fn line_comment_ends_before_newline() {
        let text = "-- a;b\nSELECT 1";
        assert_eq!(
            kinds(text),
            vec![
                (SegmentKind::LineComment, "-- a;b"),
                (SegmentKind::Code, "\nSELECT 1"),
            ]
        );
        assert_eq!(lex(text).final_mode, LexMode::Normal);
    }

    #[test]
    fn block_comment_does_not_nest() {
        let text = "/* a /* b */ c */";
        let segments = kinds(text);
        assert_eq!(segments[0], (SegmentKind::BlockComment, "/* a /* b */"));
        assert_eq!(segments[1], (SegmentKind::Code, " c */"));
    }

    #[test]
    fn dollar_block_requires_matching_tag() {
        let text = "AS $body$ x; $$ y; $body$;";
        assert_eq!(
            kinds(text),
            vec![
                (SegmentKind::Code, "AS "),
                (SegmentKind::DollarBlock, "$body$ x; $$ y; $body$"),
                (SegmentKind::Terminator, ";"),
            ]
        );
    }

    #[test]
    fn empty_dollar_tag() {
        let text = "AS $$ BEGIN; END; $$";
        let lexed = lex(text);
        assert_eq!(lexed.final_mode, LexMode::Normal);
        assert!(lexed.segments.iter().all(|s| s.kind != SegmentKind::Terminator));
    }

    #[test]
    fn positional_parameter_is_not_dollar_block() {
        let text = "SELECT $1; SELECT a$b$c;";
        let terminators = lex(text)
            .segments
            .iter()
            .filter(|s| s.kind == SegmentKind::Terminator)
            .count();
        assert_eq!(terminators, 2);
    }

    #[test]
    fn quoted_identifier_hides_terminator() {
        assert_eq!(
            kinds("SELECT \"a;b\";"),
            vec![
                (SegmentKind::Code, "SELECT "),
                (SegmentKind::QuotedIdentifier, "\"a;b\""),
                (SegmentKind::Terminator, ";"),
            ]
        );
    }

    #[test]
    fn unterminated_constructs_reported() {
        assert_eq!(lex("SELECT 'abc").final_mode.unterminated(), Some(UnterminatedConstruct::SingleQuotedLiteral));
        assert_eq!(lex("/* abc").final_mode.unterminated(), Some(UnterminatedConstruct::BlockComment));
        assert_eq!(
            lex("$fn$ abc").final_mode.unterminated(),
            Some(UnterminatedConstruct::DollarQuotedBlock("fn".to_string()))
        );
        assert_eq!(lex("-- abc").final_mode.unterminated(), None);
    }

    #[test]
    fn segments_cover_input() {
        let text = "a 'b' -- c\n/* d */ $$e$$ \"f\";g";
        let lexed = lex(text);
        let rebuilt: String = lexed.segments.iter().map(|s| s.text(text)).collect();
        assert_eq!(rebuilt, text);
    }

    #[test]
    fn decomment_replaces_comments_with_space() {
        assert_eq!(
            decomment("CREATE /* x */TABLE t -- INDEX\n(a INT)"),
            "CREATE  TABLE t  \n(a INT)"
        );
        assert_eq!(decomment("SELECT '--not a comment'"), "SELECT '--not a comment'");
    }

    #[test]
    fn multibyte_text_is_safe() {
        let text = "SELECT 'héllo; wörld'; -- ünïcode ;\nSELECT '€';";
        let lexed = lex(text);
        let terminators = lexed.segments.iter().filter(|s| s.kind == SegmentKind::Terminator).count();
        assert_eq!(terminators, 2);
    }
}
