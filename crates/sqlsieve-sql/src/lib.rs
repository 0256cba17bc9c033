//! SQL script segmentation and classification
//!
//! This crate handles:
//! - Lexing raw script text into code, literal, comment and terminator segments
//! - Splitting a script into statements without being fooled by quotes or comments
//! - Classifying statements as schema definition or data manipulation
//! - Producing de-commented text for pattern-based rule checks

pub mod lexer;
pub mod script;
pub mod splitter;
pub mod classifier;

pub use lexer::{lex, decomment, LexMode, Lexed, Segment, SegmentKind, UnterminatedConstruct};
pub use script::{Script, Statement, Terminator};
pub use splitter::split;
pub use classifier::{classify, classify_text, leading_keyword};
