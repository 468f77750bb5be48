//! Attribute classification.
//!
//! Walks the template once and records, per element, which convention
//! attributes it carries. Nothing is edited here; the emitter turns the
//! plans into splices.

use crate::expression::{analyze, extract, ExpressionKind};
use crate::notice::Notice;
use crate::options::is_valid_identifier;
use crate::walker::{walk, ElementRef};
use crate::{Context, PreprocessError};
use indexmap::IndexMap;
use smol_str::SmolStr;
use source_map::{ByteOffset, Span};
use svelte_parser::{Attribute, Expression, Fragment, NormalAttribute};

/// Where the hoisted style reference goes in the attrs argument list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Index(usize),
    /// After every other argument.
    End,
}

impl Default for Position {
    fn default() -> Self {
        Position::Index(0)
    }
}

impl Position {
    /// The insertion index into a list of `len` arguments. Out-of-range
    /// indices append.
    pub fn resolve(self, len: usize) -> usize {
        match self {
            Position::Index(index) => index.min(len),
            Position::End => len,
        }
    }
}

/// An attribute to replace with a runtime `attrs` call.
#[derive(Debug, Clone, PartialEq)]
pub struct AttrsPlan {
    /// Name of the matched attribute, for diagnostics.
    pub attribute: SmolStr,
    /// The whole attribute, replaced on emit.
    pub span: Span,
    pub expression: Expression,
}

/// An inline style definition to hoist.
#[derive(Debug, Clone, PartialEq)]
pub struct CreatePlan {
    /// Tag name of the owning element.
    pub tag: SmolStr,
    /// The whole attribute.
    pub span: Span,
    pub expression: Expression,
}

/// Everything recorded for one element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementPlan {
    pub attrs: Option<AttrsPlan>,
    pub create: Option<CreatePlan>,
    pub at: Option<Position>,
    /// Attributes that must not reach the output.
    pub removals: Vec<Span>,
}

impl ElementPlan {
    fn is_empty(&self) -> bool {
        self.attrs.is_none() && self.create.is_none() && self.removals.is_empty()
    }

    /// Whether the element will be rewritten.
    pub fn rewrites(&self) -> bool {
        self.attrs.is_some() || self.create.is_some()
    }

    /// Whether the element's markup changes at all, including removals.
    pub fn edits(&self) -> bool {
        self.rewrites() || !self.removals.is_empty()
    }
}

/// Plans keyed by element start offset, in walk order.
pub type Plans = IndexMap<ByteOffset, ElementPlan>;

/// Records the convention attributes of every element under `fragment`.
pub(crate) fn classify(fragment: &Fragment, cx: &Context<'_>) -> Result<Plans, PreprocessError> {
    let mut plans = Plans::new();
    for element in walk(fragment) {
        let plan = classify_element(element, cx)?;
        if !plan.is_empty() {
            log::debug!(
                "{}:{}: <{}> attrs={} create={} at={:?}",
                cx.display_filename(),
                cx.location(element.span.start),
                element.name,
                plan.attrs.is_some(),
                plan.create.is_some(),
                plan.at,
            );
            plans.insert(element.span.start, plan);
        }
    }
    Ok(plans)
}

fn classify_element(element: ElementRef<'_>, cx: &Context<'_>) -> Result<ElementPlan, PreprocessError> {
    let options = cx.options;
    let mut plan = ElementPlan::default();

    for attribute in element.attributes {
        match attribute {
            Attribute::Normal(attr) if options.is_attrs_name(&attr.name) => {
                if let Some(expression) = extract(attr) {
                    plan.attrs = Some(AttrsPlan {
                        attribute: attr.name.clone(),
                        span: attr.span,
                        expression: expression.clone(),
                    });
                }
            }
            Attribute::Normal(attr) if attr.name == options.create_attribute_name => {
                if let Some(expression) = extract(attr) {
                    cx.notices.raise(
                        Notice::InlineCreate,
                        &attr.name,
                        cx.filename,
                        cx.location(attr.span.start),
                    );
                    plan.create = Some(CreatePlan {
                        tag: element.name.into(),
                        span: attr.span,
                        expression: expression.clone(),
                    });
                }
            }
            Attribute::Normal(attr) if attr.name == options.create_position_attribute_name => {
                cx.notices.raise(
                    Notice::CreatePosition,
                    &attr.name,
                    cx.filename,
                    cx.location(attr.span.start),
                );
                plan.removals.push(attr.span);
                if let Some(position) = position(attr, cx)? {
                    plan.at = Some(position);
                }
            }
            Attribute::Spread(spread) if is_binding(&spread.expression.text, cx) => {
                plan.attrs = Some(AttrsPlan {
                    attribute: SmolStr::new(&spread.expression.text),
                    span: spread.span,
                    expression: spread.expression.clone(),
                });
            }
            Attribute::Shorthand(shorthand) if is_binding(shorthand.name(), cx) => {
                plan.attrs = Some(AttrsPlan {
                    attribute: SmolStr::new(shorthand.name()),
                    span: shorthand.span,
                    expression: shorthand.expression.clone(),
                });
            }
            _ => {}
        }
    }
    Ok(plan)
}

/// `{...name}` and `{name}` only count when `name` is a bare identifier
/// naming the attrs convention.
fn is_binding(text: &str, cx: &Context<'_>) -> bool {
    is_valid_identifier(text) && cx.options.is_attrs_name(text)
}

fn position(attr: &NormalAttribute, cx: &Context<'_>) -> Result<Option<Position>, PreprocessError> {
    let Some(expression) = extract(attr) else {
        return Ok(None);
    };
    let kind = analyze(expression).map_err(|err| cx.expression_error(&attr.name, err))?;
    Ok(match kind {
        ExpressionKind::Identifier(name) if name == "Infinity" => Some(Position::End),
        ExpressionKind::Number(value) if value.is_finite() && value >= 0.0 => {
            Some(Position::Index(value as usize))
        }
        _ => None,
    })
}
