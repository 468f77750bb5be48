//! AST types for Svelte 5 markup.
//!
//! Every node carries the byte [`Span`] it was parsed from. Script and style
//! bodies are kept as raw text; template expressions are kept as raw source
//! slices and only analysed by consumers that need their structure.

use smol_str::SmolStr;
use source_map::Span;

/// A complete Svelte document.
#[derive(Debug, Clone, Default)]
pub struct SvelteDocument {
    /// The module-level script (`<script module>` or `<script context="module">`).
    pub module_script: Option<Script>,
    /// The instance script (`<script>`).
    pub instance_script: Option<Script>,
    /// The top-level style block (`<style>`).
    pub style: Option<Style>,
    /// The template fragment.
    pub fragment: Fragment,
    /// The span of the entire document.
    pub span: Span,
}

/// A top-level script block.
#[derive(Debug, Clone)]
pub struct Script {
    /// The span of the entire script block including tags.
    pub span: Span,
    /// The span of just the script content.
    pub content_span: Span,
    /// The raw content of the script.
    pub content: String,
    /// The script language (js or ts).
    pub lang: ScriptLang,
    /// The script context (module or default).
    pub context: ScriptContext,
    /// Attributes on the script tag.
    pub attributes: Vec<Attribute>,
}

/// The language of a script block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScriptLang {
    #[default]
    JavaScript,
    TypeScript,
}

/// The context of a script block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScriptContext {
    /// Instance context.
    #[default]
    Default,
    /// Module context.
    Module,
}

/// A top-level style block.
#[derive(Debug, Clone)]
pub struct Style {
    pub span: Span,
    pub content_span: Span,
    pub content: String,
    pub attributes: Vec<Attribute>,
}

/// An ordered list of sibling nodes.
#[derive(Debug, Clone, Default)]
pub struct Fragment {
    pub nodes: Vec<TemplateNode>,
    pub span: Span,
}

impl Fragment {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// A node in the template.
#[derive(Debug, Clone)]
pub enum TemplateNode {
    /// A regular HTML (or SVG) element.
    Element(Element),
    /// A component (capitalised or dotted tag name).
    Component(Component),
    /// A special `svelte:*` element.
    SvelteElement(SvelteElement),
    Text(Text),
    Comment(Comment),
    /// An expression `{expr}`.
    Expression(ExpressionTag),
    /// `{@html}`, `{@const}`, `{@debug}` or `{@render}`.
    Tag(SpecialTag),
    IfBlock(IfBlock),
    EachBlock(EachBlock),
    AwaitBlock(AwaitBlock),
    KeyBlock(KeyBlock),
    SnippetBlock(SnippetBlock),
}

impl TemplateNode {
    /// Returns the span of this node.
    pub fn span(&self) -> Span {
        match self {
            TemplateNode::Element(n) => n.span,
            TemplateNode::Component(n) => n.span,
            TemplateNode::SvelteElement(n) => n.span,
            TemplateNode::Text(n) => n.span,
            TemplateNode::Comment(n) => n.span,
            TemplateNode::Expression(n) => n.span,
            TemplateNode::Tag(n) => n.span,
            TemplateNode::IfBlock(n) => n.span,
            TemplateNode::EachBlock(n) => n.span,
            TemplateNode::AwaitBlock(n) => n.span,
            TemplateNode::KeyBlock(n) => n.span,
            TemplateNode::SnippetBlock(n) => n.span,
        }
    }

    /// Returns the child fragments this node owns, in source order.
    ///
    /// Leaf nodes (text, comments, expression and special tags) own none.
    pub fn fragments(&self) -> impl Iterator<Item = &Fragment> {
        let slots: [Option<&Fragment>; 3] = match self {
            TemplateNode::Element(n) => [Some(&n.fragment), None, None],
            TemplateNode::Component(n) => [Some(&n.fragment), None, None],
            TemplateNode::SvelteElement(n) => [Some(&n.fragment), None, None],
            TemplateNode::IfBlock(n) => [Some(&n.consequent), n.alternate.as_ref(), None],
            TemplateNode::EachBlock(n) => [Some(&n.body), n.fallback.as_ref(), None],
            TemplateNode::AwaitBlock(n) => [n.pending.as_ref(), n.then.as_ref(), n.catch.as_ref()],
            TemplateNode::KeyBlock(n) => [Some(&n.body), None, None],
            TemplateNode::SnippetBlock(n) => [Some(&n.body), None, None],
            TemplateNode::Text(_)
            | TemplateNode::Comment(_)
            | TemplateNode::Expression(_)
            | TemplateNode::Tag(_) => [None, None, None],
        };
        slots.into_iter().flatten()
    }
}

/// A raw JavaScript expression as it appears in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
    /// The span of the expression text, trimmed of surrounding whitespace.
    pub span: Span,
    /// The expression source text.
    pub text: String,
}

/// An HTML element.
#[derive(Debug, Clone)]
pub struct Element {
    pub span: Span,
    /// The tag name.
    pub name: SmolStr,
    pub attributes: Vec<Attribute>,
    pub fragment: Fragment,
    pub self_closing: bool,
}

/// A Svelte component.
#[derive(Debug, Clone)]
pub struct Component {
    pub span: Span,
    /// The component name, e.g. `Button` or `ui.Card`.
    pub name: SmolStr,
    pub attributes: Vec<Attribute>,
    pub fragment: Fragment,
    pub self_closing: bool,
}

/// A special Svelte element (`svelte:*`).
#[derive(Debug, Clone)]
pub struct SvelteElement {
    pub span: Span,
    pub kind: SvelteElementKind,
    /// The full tag name, e.g. `svelte:element`.
    pub name: SmolStr,
    pub attributes: Vec<Attribute>,
    pub fragment: Fragment,
}

/// The kind of special Svelte element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SvelteElementKind {
    /// `<svelte:self>`
    Self_,
    /// `<svelte:component>`
    Component,
    /// `<svelte:element>`
    Element,
    /// `<svelte:window>`
    Window,
    /// `<svelte:document>`
    Document,
    /// `<svelte:body>`
    Body,
    /// `<svelte:head>`
    Head,
    /// `<svelte:options>`
    Options,
    /// `<svelte:fragment>`
    Fragment,
    /// `<svelte:boundary>`
    Boundary,
}

impl SvelteElementKind {
    /// Looks up the kind from the part of the tag name after `svelte:`.
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        Some(match suffix {
            "self" => Self::Self_,
            "component" => Self::Component,
            "element" => Self::Element,
            "window" => Self::Window,
            "document" => Self::Document,
            "body" => Self::Body,
            "head" => Self::Head,
            "options" => Self::Options,
            "fragment" => Self::Fragment,
            "boundary" => Self::Boundary,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Text {
    pub span: Span,
    pub data: String,
}

/// A comment; `data` excludes `<!--` and `-->`.
#[derive(Debug, Clone)]
pub struct Comment {
    pub span: Span,
    pub data: String,
}

/// An expression tag `{expr}`.
#[derive(Debug, Clone)]
pub struct ExpressionTag {
    /// The span of the tag, braces included.
    pub span: Span,
    pub expression: Expression,
}

/// A `{@...}` tag.
#[derive(Debug, Clone)]
pub struct SpecialTag {
    pub span: Span,
    pub kind: SpecialTagKind,
    /// Everything after the keyword, e.g. the declaration of `{@const}`.
    pub expression: Expression,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialTagKind {
    Html,
    Const,
    Debug,
    Render,
}

/// An `{#if}` block. `{:else if}` chains nest as an `IfBlock` with
/// `elseif` set, alone in the parent's `alternate` fragment.
#[derive(Debug, Clone)]
pub struct IfBlock {
    pub span: Span,
    pub elseif: bool,
    pub test: Expression,
    pub consequent: Fragment,
    pub alternate: Option<Fragment>,
}

/// An `{#each}` block. The header (`items as item, i (key)`) is kept raw.
#[derive(Debug, Clone)]
pub struct EachBlock {
    pub span: Span,
    pub header: Expression,
    pub body: Fragment,
    pub fallback: Option<Fragment>,
}

/// An `{#await}` block.
#[derive(Debug, Clone)]
pub struct AwaitBlock {
    pub span: Span,
    /// The promise expression, including any inline `then`/`catch` binding.
    pub header: Expression,
    pub pending: Option<Fragment>,
    pub then: Option<Fragment>,
    pub catch: Option<Fragment>,
}

/// A `{#key}` block.
#[derive(Debug, Clone)]
pub struct KeyBlock {
    pub span: Span,
    pub expression: Expression,
    pub body: Fragment,
}

/// A `{#snippet}` block.
#[derive(Debug, Clone)]
pub struct SnippetBlock {
    pub span: Span,
    pub name: SmolStr,
    /// The raw parameter list without parentheses.
    pub parameters: String,
    pub body: Fragment,
}

/// An attribute on an element, component or script tag.
#[derive(Debug, Clone)]
pub enum Attribute {
    /// `name`, `name="value"` or `name={expr}`.
    Normal(NormalAttribute),
    /// `{...expr}`.
    Spread(SpreadAttribute),
    /// `{name}`.
    Shorthand(ShorthandAttribute),
    /// `on:event`, `bind:prop`, etc.
    Directive(Directive),
    /// `{@attach expr}`.
    Attach(AttachAttribute),
}

impl Attribute {
    /// Returns the span of this attribute.
    pub fn span(&self) -> Span {
        match self {
            Attribute::Normal(a) => a.span,
            Attribute::Spread(a) => a.span,
            Attribute::Shorthand(a) => a.span,
            Attribute::Directive(a) => a.span,
            Attribute::Attach(a) => a.span,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NormalAttribute {
    pub span: Span,
    pub name: SmolStr,
    pub value: AttributeValue,
}

impl NormalAttribute {
    /// Returns the literal value if it has no expression parts.
    pub fn static_value(&self) -> Option<String> {
        match &self.value {
            AttributeValue::Parts(parts) => parts
                .iter()
                .map(|part| match part {
                    AttributeValuePart::Text(text) => Some(text.value.as_str()),
                    AttributeValuePart::Expression(_) => None,
                })
                .collect(),
            AttributeValue::True | AttributeValue::Expression(_) => None,
        }
    }
}

/// The value of a normal attribute.
#[derive(Debug, Clone)]
pub enum AttributeValue {
    /// No value, a boolean attribute.
    True,
    /// An unquoted `{expr}`.
    Expression(ExpressionValue),
    /// A quoted or unquoted literal, possibly interleaved with `{expr}` parts.
    Parts(Vec<AttributeValuePart>),
}

#[derive(Debug, Clone)]
pub enum AttributeValuePart {
    Text(TextValue),
    Expression(ExpressionValue),
}

#[derive(Debug, Clone)]
pub struct TextValue {
    pub span: Span,
    pub value: String,
}

/// A braced expression inside an attribute value.
#[derive(Debug, Clone)]
pub struct ExpressionValue {
    /// The span including braces.
    pub span: Span,
    pub expression: Expression,
}

#[derive(Debug, Clone)]
pub struct SpreadAttribute {
    pub span: Span,
    /// The expression after `...`.
    pub expression: Expression,
}

#[derive(Debug, Clone)]
pub struct ShorthandAttribute {
    pub span: Span,
    /// The identifier inside the braces.
    pub expression: Expression,
}

impl ShorthandAttribute {
    #[inline]
    pub fn name(&self) -> &str {
        &self.expression.text
    }
}

#[derive(Debug, Clone)]
pub struct AttachAttribute {
    pub span: Span,
    pub expression: Expression,
}

/// A directive such as `on:click|once={handler}`.
#[derive(Debug, Clone)]
pub struct Directive {
    pub span: Span,
    pub kind: DirectiveKind,
    /// The name after the colon.
    pub name: SmolStr,
    /// Modifiers after `|`.
    pub modifiers: Vec<SmolStr>,
    pub value: Option<AttributeValue>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveKind {
    On,
    Bind,
    Class,
    Style,
    Use,
    Transition,
    In,
    Out,
    Animate,
    Let,
}

impl DirectiveKind {
    /// Looks up the kind from a directive prefix such as `bind`.
    pub fn from_prefix(prefix: &str) -> Option<Self> {
        Some(match prefix {
            "on" => Self::On,
            "bind" => Self::Bind,
            "class" => Self::Class,
            "style" => Self::Style,
            "use" => Self::Use,
            "transition" => Self::Transition,
            "in" => Self::In,
            "out" => Self::Out,
            "animate" => Self::Animate,
            "let" => Self::Let,
            _ => return None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(start: u32, end: u32) -> TemplateNode {
        TemplateNode::Text(Text {
            span: Span::new(start, end),
            data: String::new(),
        })
    }

    #[test]
    fn test_template_node_span() {
        let node = text(5, 10);
        assert_eq!(node.span(), Span::new(5u32, 10u32));
    }

    #[test]
    fn test_leaf_nodes_have_no_fragments() {
        assert_eq!(text(0, 1).fragments().count(), 0);
    }

    #[test]
    fn test_await_fragments_in_order() {
        let fragment = |start: u32| Fragment {
            nodes: vec![],
            span: Span::empty(start),
        };
        let node = TemplateNode::AwaitBlock(AwaitBlock {
            span: Span::new(0u32, 40u32),
            header: Expression {
                span: Span::new(8u32, 9u32),
                text: "p".into(),
            },
            pending: Some(fragment(10)),
            then: None,
            catch: Some(fragment(30)),
        });

        let starts: Vec<_> = node.fragments().map(|f| u32::from(f.span.start)).collect();
        assert_eq!(starts, vec![10, 30]);
    }

    #[test]
    fn test_kind_lookups() {
        assert_eq!(
            SvelteElementKind::from_suffix("element"),
            Some(SvelteElementKind::Element)
        );
        assert_eq!(SvelteElementKind::from_suffix("nope"), None);
        assert_eq!(DirectiveKind::from_prefix("bind"), Some(DirectiveKind::Bind));
        assert_eq!(DirectiveKind::from_prefix("stylex"), None);
    }
}
