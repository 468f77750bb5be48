//! Attribute expression extraction and analysis.
//!
//! The parser keeps expressions as raw text. Extraction decides whether an
//! attribute carries exactly one dynamic expression; analysis parses that
//! expression with SWC to learn the few shapes the rewriter cares about.

use source_map::Span;
use std::sync::Arc;
use swc_common::{FileName, SourceMap, Spanned};
use swc_ecma_ast::{Expr, Lit};
use swc_ecma_parser::{Parser, StringInput, Syntax, TsSyntax};
use svelte_parser::{AttributeValue, AttributeValuePart, Expression, NormalAttribute};

/// Returns the single expression an attribute value consists of.
///
/// Boolean attributes, static text and values mixing text with
/// expressions carry no single expression.
pub fn extract(attribute: &NormalAttribute) -> Option<&Expression> {
    match &attribute.value {
        AttributeValue::True => None,
        AttributeValue::Expression(value) => Some(&value.expression),
        AttributeValue::Parts(parts) => match parts.as_slice() {
            [AttributeValuePart::Expression(value)] => Some(&value.expression),
            _ => None,
        },
    }
}

/// The shape of an analysed expression. Spans are absolute source offsets.
#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionKind {
    Identifier(String),
    /// An array literal; `None` marks a hole. Spread elements include
    /// their `...`.
    Array(Vec<Option<Span>>),
    Number(f64),
    Other,
}

/// An expression SWC could not parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    /// Absolute offset of the error.
    pub offset: u32,
    pub message: String,
}

/// Parses `expression` and classifies its top-level shape.
pub fn analyze(expression: &Expression) -> Result<ExpressionKind, SyntaxError> {
    let base = u32::from(expression.span.start);

    let cm: Arc<SourceMap> = Default::default();
    let fm = cm.new_source_file(
        FileName::Custom("svelte-attribute".into()).into(),
        expression.text.clone(),
    );
    let start_pos = fm.start_pos.0;
    let absolute = |pos: swc_common::BytePos| pos.0 - start_pos + base;

    let syntax = Syntax::Typescript(TsSyntax {
        tsx: false,
        ..Default::default()
    });
    let mut parser = Parser::new(syntax, StringInput::from(&*fm), None);

    let expr = parser.parse_expr().map_err(|err| SyntaxError {
        offset: absolute(err.span().lo),
        message: err.kind().msg().into_owned(),
    })?;
    if let Some(err) = parser.take_errors().into_iter().next() {
        return Err(SyntaxError {
            offset: absolute(err.span().lo),
            message: err.kind().msg().into_owned(),
        });
    }

    // `parse_expr` stops at the first token it cannot use.
    let consumed = (expr.span().hi.0 - start_pos) as usize;
    let trailing = expression.text.get(consumed..).unwrap_or_default().trim_start();
    if !trailing.is_empty() && !trailing.starts_with("//") && !trailing.starts_with("/*") {
        return Err(SyntaxError {
            offset: base + (expression.text.len() - trailing.len()) as u32,
            message: "Unexpected token after expression".to_string(),
        });
    }

    // Parentheses are not part of the expression's shape.
    let mut expr = *expr;
    let expr = loop {
        match expr {
            Expr::Paren(paren) => expr = *paren.expr,
            other => break other,
        }
    };

    let kind = match expr {
        Expr::Ident(ident) => ExpressionKind::Identifier(ident.sym.to_string()),
        Expr::Lit(Lit::Num(number)) => ExpressionKind::Number(number.value),
        Expr::Array(array) => ExpressionKind::Array(
            array
                .elems
                .iter()
                .map(|element| {
                    element.as_ref().map(|element| {
                        let lo = element.spread.map_or(element.expr.span().lo, |s| s.lo);
                        let hi = element.expr.span().hi;
                        Span::new(absolute(lo), absolute(hi))
                    })
                })
                .collect(),
        ),
        _ => ExpressionKind::Other,
    };
    Ok(kind)
}
