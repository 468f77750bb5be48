//! Parse error types.

use source_map::Span;
use thiserror::Error;

/// An error that occurred during parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}")]
pub struct ParseError {
    /// The kind of error.
    pub kind: ParseErrorKind,
    /// The location in the source where the error occurred.
    pub span: Span,
}

impl ParseError {
    /// Creates a new parse error.
    pub fn new(kind: ParseErrorKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// The kind of parse error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("unexpected character: expected {expected}, found {found:?}")]
    UnexpectedChar { expected: String, found: char },

    #[error("unexpected end of file: expected {expected}")]
    UnexpectedEof { expected: String },

    #[error("unclosed tag: <{tag_name}>")]
    UnclosedTag { tag_name: String },

    #[error("mismatched closing tag: expected </{expected}>, found </{found}>")]
    MismatchedClosingTag { expected: String, found: String },

    #[error("unexpected closing tag: </{tag_name}>")]
    UnexpectedClosingTag { tag_name: String },

    #[error("unclosed block: {{#{block_type}}}")]
    UnclosedBlock { block_type: String },

    #[error("unclosed comment")]
    UnclosedComment,

    #[error("unclosed expression")]
    UnclosedExpression,

    #[error("invalid attribute: {message}")]
    InvalidAttribute { message: String },

    #[error("invalid tag name: {name}")]
    InvalidTagName { name: String },

    #[error("invalid block syntax: {message}")]
    InvalidBlockSyntax { message: String },

    #[error("a component can only have one {what}")]
    Duplicate { what: &'static str },
}
