//! Lazy traversal of the elements in a template.

use source_map::Span;
use svelte_parser::{Attribute, Fragment, SvelteElementKind, TemplateNode};

/// An element that can carry StyleX attributes: a regular element or
/// `<svelte:element>`.
#[derive(Debug, Clone, Copy)]
pub struct ElementRef<'a> {
    /// The tag name as written.
    pub name: &'a str,
    pub span: Span,
    pub attributes: &'a [Attribute],
}

/// Iterator over the elements of a fragment, depth-first in document order.
///
/// Recurses through every fragment a node owns (element children, block
/// branches, snippet bodies, component slots) but yields only elements.
pub struct Elements<'a> {
    stack: Vec<&'a TemplateNode>,
}

/// Walks `fragment` lazily.
pub fn walk(fragment: &Fragment) -> Elements<'_> {
    Elements {
        stack: fragment.nodes.iter().rev().collect(),
    }
}

impl<'a> Iterator for Elements<'a> {
    type Item = ElementRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            // Children go on the stack in reverse so the first child is
            // visited next.
            let children: Vec<&'a TemplateNode> =
                node.fragments().flat_map(|f| f.nodes.iter()).collect();
            self.stack.extend(children.into_iter().rev());

            match node {
                TemplateNode::Element(el) => {
                    return Some(ElementRef {
                        name: &el.name,
                        span: el.span,
                        attributes: &el.attributes,
                    });
                }
                TemplateNode::SvelteElement(el) if el.kind == SvelteElementKind::Element => {
                    return Some(ElementRef {
                        name: &el.name,
                        span: el.span,
                        attributes: &el.attributes,
                    });
                }
                _ => {}
            }
        }
        None
    }
}
