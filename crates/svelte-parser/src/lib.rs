//! Svelte 5 markup parser for svelte-stylex.
//!
//! This crate provides:
//! - A recursive descent parser over the raw source bytes
//! - AST types for elements, components, blocks, tags and attributes
//! - Byte spans on every node, so callers can splice the original text
//! - Error recovery for partial parsing
//!
//! Embedded JavaScript is delimited but not parsed; expressions are exposed
//! as raw source slices.
//!
//! # Example
//!
//! ```
//! use svelte_parser::{parse, Attribute, TemplateNode};
//!
//! let source = r#"<div stylex={styles.card}>hello</div>"#;
//!
//! let result = parse(source);
//! assert!(result.errors.is_empty());
//!
//! let Some(TemplateNode::Element(div)) = result.document.fragment.nodes.first() else {
//!     panic!("expected an element");
//! };
//! assert!(matches!(div.attributes[0], Attribute::Normal(_)));
//! ```

mod ast;
mod error;
mod parser;
mod scan;

pub use ast::*;
pub use error::{ParseError, ParseErrorKind};
pub use source_map::Span;

/// The result of parsing a Svelte file.
#[derive(Debug)]
pub struct ParseResult {
    /// The parsed document.
    pub document: SvelteDocument,
    /// Any errors encountered during parsing.
    pub errors: Vec<ParseError>,
}

/// Parses a Svelte source file into an AST.
///
/// This function will attempt to parse the entire file and recover from errors
/// where possible, returning both the AST and any errors encountered.
pub fn parse(source: &str) -> ParseResult {
    parser::Parser::new(source).parse()
}
