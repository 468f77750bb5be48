//! Recursive descent parser for Svelte markup.
//!
//! The parser walks the source byte by byte. It recovers from most errors by
//! recording them and carrying on, so a tree is always produced.

use crate::ast::*;
use crate::error::{ParseError, ParseErrorKind};
use crate::scan::find_closing_brace;
use crate::ParseResult;
use smol_str::SmolStr;
use source_map::Span;

/// HTML void elements that never have children.
const HTML_VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Returns true if the given element name is an HTML void element.
fn is_void_element(name: &str) -> bool {
    HTML_VOID_ELEMENTS
        .iter()
        .any(|void| void.eq_ignore_ascii_case(name))
}

/// Elements whose content is raw text rather than markup.
fn is_raw_text_element(name: &str) -> bool {
    matches!(name, "script" | "style")
}

/// Elements whose content is text and `{expression}` tags, never markup.
fn is_text_content_element(name: &str) -> bool {
    name == "textarea"
}

fn is_tag_name_end(b: u8) -> bool {
    b.is_ascii_whitespace() || b == b'>' || b == b'/'
}

fn is_attribute_name_end(b: u8) -> bool {
    b.is_ascii_whitespace() || matches!(b, b'=' | b'>' | b'{' | b'}' | b'"' | b'\'')
}

/// The Svelte parser.
pub struct Parser<'src> {
    source: &'src str,
    /// Current byte offset.
    pos: usize,
    errors: Vec<ParseError>,
}

impl<'src> Parser<'src> {
    /// Creates a new parser.
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            pos: 0,
            errors: Vec::new(),
        }
    }

    /// Parses the source into a document.
    pub fn parse(mut self) -> ParseResult {
        let document = self.parse_document();
        ParseResult {
            document,
            errors: self.errors,
        }
    }

    // ========================================================================
    // Cursor helpers
    // ========================================================================

    #[inline]
    fn rest(&self) -> &'src str {
        &self.source[self.pos..]
    }

    #[inline]
    fn is_eof(&self) -> bool {
        self.pos >= self.source.len()
    }

    #[inline]
    fn peek(&self) -> Option<u8> {
        self.source.as_bytes().get(self.pos).copied()
    }

    #[inline]
    fn peek_at(&self, ahead: usize) -> Option<u8> {
        self.source.as_bytes().get(self.pos + ahead).copied()
    }

    #[inline]
    fn starts_with(&self, s: &str) -> bool {
        self.rest().starts_with(s)
    }

    fn eat(&mut self, s: &str) -> bool {
        if self.starts_with(s) {
            self.pos += s.len();
            true
        } else {
            false
        }
    }

    /// Advances past the current character.
    fn bump(&mut self) {
        if let Some(c) = self.rest().chars().next() {
            self.pos += c.len_utf8();
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    /// Consumes bytes until `stop` matches or the source ends.
    fn read_until(&mut self, stop: impl Fn(u8) -> bool) -> &'src str {
        let start = self.pos;
        while self.peek().is_some_and(|b| !stop(b)) {
            self.pos += 1;
        }
        &self.source[start..self.pos]
    }

    fn read_word(&mut self) -> &'src str {
        self.read_until(|b| !b.is_ascii_alphabetic())
    }

    fn span_from(&self, start: usize) -> Span {
        Span::from_usize(start, self.pos)
    }

    fn error(&mut self, kind: ParseErrorKind, span: Span) {
        self.errors.push(ParseError::new(kind, span));
    }

    /// Consumes `expected` or records an error.
    fn expect(&mut self, expected: &str) -> bool {
        if self.eat(expected) {
            return true;
        }
        let span = Span::from_usize(self.pos, self.pos);
        match self.rest().chars().next() {
            Some(found) => self.error(
                ParseErrorKind::UnexpectedChar {
                    expected: format!("`{expected}`"),
                    found,
                },
                span,
            ),
            None => self.error(
                ParseErrorKind::UnexpectedEof {
                    expected: format!("`{expected}`"),
                },
                span,
            ),
        }
        false
    }

    /// Returns true if the cursor is at `<name` followed by a tag delimiter.
    fn at_tag(&self, name: &str) -> bool {
        self.peek() == Some(b'<')
            && self.rest()[1..].starts_with(name)
            && self.peek_at(1 + name.len()).map_or(true, is_tag_name_end)
    }

    /// Returns true at `{:...}` or `{/...}`.
    fn at_block_continuation(&self) -> bool {
        self.starts_with("{:") || self.starts_with("{/")
    }

    /// Builds an expression from `start..end`, trimmed of surrounding whitespace.
    fn expression(&self, start: usize, end: usize) -> Expression {
        let raw = &self.source[start..end];
        let leading = raw.len() - raw.trim_start().len();
        let text = raw.trim();
        let start = start + leading;
        Expression {
            span: Span::from_usize(start, start + text.len()),
            text: text.to_string(),
        }
    }

    /// Reads up to the `}` closing the expression at the cursor and consumes
    /// it. On failure, records an error and moves to the end of the source.
    fn read_braced(&mut self) -> Option<Expression> {
        let start = self.pos;
        match find_closing_brace(self.source, start) {
            Some(end) => {
                self.pos = end + 1;
                Some(self.expression(start, end))
            }
            None => {
                self.error(
                    ParseErrorKind::UnclosedExpression,
                    Span::from_usize(start.saturating_sub(1), self.source.len()),
                );
                self.pos = self.source.len();
                None
            }
        }
    }

    /// Skips a stray `{...}` or `</...>` that has nothing to close.
    fn skip_stray(&mut self, close: u8) {
        self.pos += 1;
        match self.source[self.pos..].bytes().position(|b| b == close) {
            Some(n) => self.pos += n + 1,
            None => self.pos = self.source.len(),
        }
    }

    // ========================================================================
    // Document
    // ========================================================================

    fn parse_document(&mut self) -> SvelteDocument {
        let mut document = SvelteDocument {
            span: Span::from_usize(0, self.source.len()),
            ..Default::default()
        };
        let mut nodes = Vec::new();

        while !self.is_eof() {
            if self.at_tag("script") {
                let script = self.parse_script();
                let (slot, what) = match script.context {
                    ScriptContext::Module => (&mut document.module_script, "module script"),
                    ScriptContext::Default => (&mut document.instance_script, "instance script"),
                };
                if slot.is_some() {
                    self.error(ParseErrorKind::Duplicate { what }, script.span);
                } else {
                    *slot = Some(script);
                }
            } else if self.at_tag("style") {
                let style = self.parse_style();
                if document.style.is_some() {
                    self.error(
                        ParseErrorKind::Duplicate {
                            what: "top-level style",
                        },
                        style.span,
                    );
                } else {
                    document.style = Some(style);
                }
            } else if self.starts_with("</") {
                let start = self.pos;
                self.pos += 2;
                let tag_name = self.read_until(is_tag_name_end).to_string();
                self.pos = start;
                self.skip_stray(b'>');
                self.error(
                    ParseErrorKind::UnexpectedClosingTag { tag_name },
                    self.span_from(start),
                );
            } else if self.at_block_continuation() {
                let start = self.pos;
                self.skip_stray(b'}');
                self.error(
                    ParseErrorKind::InvalidBlockSyntax {
                        message: format!(
                            "unexpected `{}` outside of a block",
                            &self.source[start..self.pos]
                        ),
                    },
                    self.span_from(start),
                );
            } else if let Some(node) = self.parse_node() {
                nodes.push(node);
            }
        }

        document.fragment = Fragment {
            nodes,
            span: document.span,
        };
        document
    }

    /// Parses `<script ...>content</script>` at the cursor.
    fn parse_script(&mut self) -> Script {
        let start = self.pos;
        let (attributes, content_span) = self.parse_raw_block("script");

        let mut lang = ScriptLang::JavaScript;
        let mut context = ScriptContext::Default;
        for attribute in &attributes {
            let Attribute::Normal(attribute) = attribute else {
                continue;
            };
            match attribute.name.as_str() {
                "lang" | "type" => {
                    if attribute
                        .static_value()
                        .is_some_and(|v| v == "ts" || v.contains("typescript"))
                    {
                        lang = ScriptLang::TypeScript;
                    }
                }
                "context" => {
                    if attribute.static_value().as_deref() == Some("module") {
                        context = ScriptContext::Module;
                    }
                }
                // Svelte 5 form: <script module>
                "module" => context = ScriptContext::Module,
                _ => {}
            }
        }

        Script {
            span: self.span_from(start),
            content_span,
            content: content_span.slice(self.source).to_string(),
            lang,
            context,
            attributes,
        }
    }

    fn parse_style(&mut self) -> Style {
        let start = self.pos;
        let (attributes, content_span) = self.parse_raw_block("style");
        Style {
            span: self.span_from(start),
            content_span,
            content: content_span.slice(self.source).to_string(),
            attributes,
        }
    }

    /// Parses an opening tag, raw text content and closing tag. Returns the
    /// attributes and the content span.
    fn parse_raw_block(&mut self, name: &str) -> (Vec<Attribute>, Span) {
        let start = self.pos;
        self.pos += 1 + name.len();
        let attributes = self.parse_attributes();

        if self.eat("/>") {
            return (attributes, Span::from_usize(self.pos, self.pos));
        }
        self.expect(">");

        let content_start = self.pos;
        let closing = format!("</{name}");
        match self.rest().find(&closing) {
            Some(n) => {
                self.pos += n;
                let content_span = self.span_from(content_start);
                self.pos += closing.len();
                self.skip_whitespace();
                self.expect(">");
                (attributes, content_span)
            }
            None => {
                self.pos = self.source.len();
                self.error(
                    ParseErrorKind::UnclosedTag {
                        tag_name: name.to_string(),
                    },
                    self.span_from(start),
                );
                (attributes, self.span_from(content_start))
            }
        }
    }

    // ========================================================================
    // Template nodes
    // ========================================================================

    /// Parses sibling nodes until the end of input, a closing tag or a block
    /// continuation.
    fn parse_fragment(&mut self) -> Fragment {
        let start = self.pos;
        let mut nodes = Vec::new();
        while !self.is_eof() && !self.starts_with("</") && !self.at_block_continuation() {
            if let Some(node) = self.parse_node() {
                nodes.push(node);
            }
        }
        Fragment {
            nodes,
            span: self.span_from(start),
        }
    }

    /// Parses one node. Always advances the cursor.
    fn parse_node(&mut self) -> Option<TemplateNode> {
        if self.starts_with("<!--") {
            Some(self.parse_comment())
        } else if self.peek() == Some(b'<') && self.peek_at(1).is_some_and(|b| b.is_ascii_alphabetic())
        {
            Some(self.parse_element())
        } else if self.starts_with("{#") {
            self.parse_block()
        } else if self.starts_with("{@") {
            self.parse_special_tag()
        } else if self.peek() == Some(b'{') {
            let start = self.pos;
            self.pos += 1;
            let expression = self.read_braced()?;
            Some(TemplateNode::Expression(ExpressionTag {
                span: self.span_from(start),
                expression,
            }))
        } else {
            Some(self.parse_text())
        }
    }

    fn parse_text(&mut self) -> TemplateNode {
        let start = self.pos;
        self.bump();
        while let Some(b) = self.peek() {
            let opens_markup = b == b'<'
                && self
                    .peek_at(1)
                    .is_some_and(|next| next.is_ascii_alphabetic() || next == b'/' || next == b'!');
            if b == b'{' || opens_markup {
                break;
            }
            self.bump();
        }
        TemplateNode::Text(Text {
            span: self.span_from(start),
            data: self.source[start..self.pos].to_string(),
        })
    }

    fn parse_comment(&mut self) -> TemplateNode {
        let start = self.pos;
        self.pos += 4;
        let data = match self.rest().find("-->") {
            Some(n) => {
                let data = &self.rest()[..n];
                self.pos += n + 3;
                data
            }
            None => {
                let data = self.rest();
                self.pos = self.source.len();
                self.error(ParseErrorKind::UnclosedComment, self.span_from(start));
                data
            }
        };
        TemplateNode::Comment(Comment {
            span: self.span_from(start),
            data: data.to_string(),
        })
    }

    fn parse_element(&mut self) -> TemplateNode {
        let start = self.pos;
        self.pos += 1;
        let name = SmolStr::new(self.read_until(is_tag_name_end));
        let attributes = self.parse_attributes();

        let self_closing = self.eat("/>");
        let mut fragment = Fragment {
            nodes: Vec::new(),
            span: Span::from_usize(self.pos, self.pos),
        };

        if !self_closing {
            if !self.eat(">") {
                self.error(
                    ParseErrorKind::UnclosedTag {
                        tag_name: name.to_string(),
                    },
                    self.span_from(start),
                );
            } else if is_raw_text_element(&name) {
                fragment = self.parse_raw_text_children(&name);
                self.parse_closing_tag(&name, start);
            } else if is_text_content_element(&name) {
                fragment = self.parse_text_content_children(&name);
                self.parse_closing_tag(&name, start);
            } else if !is_void_element(&name) {
                fragment = self.parse_fragment();
                self.parse_closing_tag(&name, start);
            }
        }

        let span = self.span_from(start);
        if let Some(suffix) = name.strip_prefix("svelte:") {
            match SvelteElementKind::from_suffix(suffix) {
                Some(kind) => {
                    return TemplateNode::SvelteElement(SvelteElement {
                        span,
                        kind,
                        name,
                        attributes,
                        fragment,
                    });
                }
                None => self.error(
                    ParseErrorKind::InvalidTagName {
                        name: name.to_string(),
                    },
                    span,
                ),
            }
        }

        let is_component = name.starts_with(|c: char| c.is_ascii_uppercase())
            || (name.contains('.') && !name.contains(':'));
        if is_component {
            TemplateNode::Component(Component {
                span,
                name,
                attributes,
                fragment,
                self_closing,
            })
        } else {
            TemplateNode::Element(Element {
                span,
                name,
                attributes,
                fragment,
                self_closing,
            })
        }
    }

    fn parse_raw_text_children(&mut self, name: &str) -> Fragment {
        let start = self.pos;
        let closing = format!("</{name}");
        self.pos = match self.rest().find(&closing) {
            Some(n) => self.pos + n,
            None => self.source.len(),
        };
        let span = self.span_from(start);
        let nodes = if span.is_empty() {
            Vec::new()
        } else {
            vec![TemplateNode::Text(Text {
                span,
                data: span.slice(self.source).to_string(),
            })]
        };
        Fragment { nodes, span }
    }

    /// Reads text and expression tags up to `</name`. Tags in between are text.
    fn parse_text_content_children(&mut self, name: &str) -> Fragment {
        let start = self.pos;
        let closing = format!("</{name}");
        let mut nodes = Vec::new();
        while !self.is_eof() && !self.starts_with(&closing) {
            if self.peek() == Some(b'{') {
                let tag_start = self.pos;
                self.pos += 1;
                if let Some(expression) = self.read_braced() {
                    nodes.push(TemplateNode::Expression(ExpressionTag {
                        span: self.span_from(tag_start),
                        expression,
                    }));
                }
                continue;
            }

            let text_start = self.pos;
            let rest = self.rest();
            let end = match (rest.find('{'), rest.find(&closing)) {
                (Some(brace), Some(close)) => brace.min(close),
                (Some(n), None) | (None, Some(n)) => n,
                (None, None) => rest.len(),
            };
            self.pos += end;
            let span = self.span_from(text_start);
            nodes.push(TemplateNode::Text(Text {
                span,
                data: span.slice(self.source).to_string(),
            }));
        }
        Fragment {
            nodes,
            span: self.span_from(start),
        }
    }

    /// Consumes `</name>` for the element opened at `open`.
    fn parse_closing_tag(&mut self, name: &str, open: usize) {
        if !self.starts_with("</") {
            self.error(
                ParseErrorKind::UnclosedTag {
                    tag_name: name.to_string(),
                },
                Span::from_usize(open, self.pos),
            );
            return;
        }

        let start = self.pos;
        self.pos += 2;
        let found = self.read_until(is_tag_name_end);
        self.skip_whitespace();
        self.expect(">");

        if found != name {
            self.error(
                ParseErrorKind::MismatchedClosingTag {
                    expected: name.to_string(),
                    found: found.to_string(),
                },
                self.span_from(start),
            );
        }
    }

    // ========================================================================
    // Attributes
    // ========================================================================

    fn parse_attributes(&mut self) -> Vec<Attribute> {
        let mut attributes = Vec::new();
        loop {
            self.skip_whitespace();
            if self.is_eof() || self.starts_with(">") || self.starts_with("/>") {
                break;
            }
            if let Some(attribute) = self.parse_attribute() {
                attributes.push(attribute);
            }
        }
        attributes
    }

    /// Parses one attribute. Always advances the cursor.
    fn parse_attribute(&mut self) -> Option<Attribute> {
        let start = self.pos;

        if self.peek() == Some(b'{') {
            self.pos += 1;
            let inner = self.read_braced()?;
            let span = self.span_from(start);

            if let Some(rest) = inner.text.strip_prefix("...") {
                let offset = u32::from(inner.span.end) as usize - rest.len();
                return Some(Attribute::Spread(SpreadAttribute {
                    span,
                    expression: self.expression(offset, u32::from(inner.span.end) as usize),
                }));
            }
            if let Some(rest) = inner.text.strip_prefix("@attach") {
                let offset = u32::from(inner.span.end) as usize - rest.len();
                return Some(Attribute::Attach(AttachAttribute {
                    span,
                    expression: self.expression(offset, u32::from(inner.span.end) as usize),
                }));
            }
            if inner.text.is_empty() {
                self.error(
                    ParseErrorKind::InvalidAttribute {
                        message: "empty shorthand attribute".to_string(),
                    },
                    span,
                );
                return None;
            }
            return Some(Attribute::Shorthand(ShorthandAttribute {
                span,
                expression: inner,
            }));
        }

        // `/` only ends a name as part of `/>`.
        while let Some(b) = self.peek() {
            if is_attribute_name_end(b) || (b == b'/' && self.peek_at(1) == Some(b'>')) {
                break;
            }
            self.pos += 1;
        }
        let name = &self.source[start..self.pos];
        if name.is_empty() {
            let found = self.rest().chars().next().unwrap_or_default();
            self.bump();
            self.error(
                ParseErrorKind::InvalidAttribute {
                    message: format!("unexpected {found:?}"),
                },
                self.span_from(start),
            );
            return None;
        }

        let before_value = self.pos;
        self.skip_whitespace();
        let value = if self.eat("=") {
            self.skip_whitespace();
            self.parse_attribute_value()
        } else {
            self.pos = before_value;
            AttributeValue::True
        };
        let span = self.span_from(start);

        if let Some((prefix, rest)) = name.split_once(':') {
            if let Some(kind) = DirectiveKind::from_prefix(prefix) {
                let mut segments = rest.split('|');
                let directive_name = SmolStr::new(segments.next().unwrap_or_default());
                let modifiers = segments.map(SmolStr::new).collect();
                let value = match value {
                    AttributeValue::True => None,
                    value => Some(value),
                };
                return Some(Attribute::Directive(Directive {
                    span,
                    kind,
                    name: directive_name,
                    modifiers,
                    value,
                }));
            }
        }

        Some(Attribute::Normal(NormalAttribute {
            span,
            name: SmolStr::new(name),
            value,
        }))
    }

    fn parse_attribute_value(&mut self) -> AttributeValue {
        let start = self.pos;
        match self.peek() {
            Some(quote @ (b'"' | b'\'')) => {
                self.pos += 1;
                let mut parts = self.parse_value_parts(Some(quote));
                if parts.is_empty() {
                    parts.push(AttributeValuePart::Text(TextValue {
                        span: Span::from_usize(self.pos, self.pos),
                        value: String::new(),
                    }));
                }
                if !self.eat(if quote == b'"' { "\"" } else { "'" }) {
                    self.error(
                        ParseErrorKind::UnexpectedEof {
                            expected: "closing quote".to_string(),
                        },
                        self.span_from(start),
                    );
                }
                AttributeValue::Parts(parts)
            }
            _ => {
                let parts = self.parse_value_parts(None);
                match <[AttributeValuePart; 1]>::try_from(parts) {
                    Ok([AttributeValuePart::Expression(value)]) => AttributeValue::Expression(value),
                    Ok(single) => AttributeValue::Parts(single.into()),
                    Err(parts) => {
                        if parts.is_empty() {
                            self.error(
                                ParseErrorKind::InvalidAttribute {
                                    message: "missing attribute value".to_string(),
                                },
                                self.span_from(start),
                            );
                        }
                        AttributeValue::Parts(parts)
                    }
                }
            }
        }
    }

    /// Parses text and `{expr}` parts up to the closing quote, or for
    /// unquoted values up to whitespace or the end of the tag.
    fn parse_value_parts(&mut self, quote: Option<u8>) -> Vec<AttributeValuePart> {
        let mut parts = Vec::new();
        loop {
            let Some(b) = self.peek() else { break };
            let at_end = match quote {
                Some(quote) => b == quote,
                None => b.is_ascii_whitespace() || b == b'>' || self.starts_with("/>"),
            };
            if at_end {
                break;
            }

            let start = self.pos;
            if b == b'{' {
                self.pos += 1;
                let Some(expression) = self.read_braced() else {
                    break;
                };
                parts.push(AttributeValuePart::Expression(ExpressionValue {
                    span: self.span_from(start),
                    expression,
                }));
                continue;
            }

            while let Some(b) = self.peek() {
                let stop = match quote {
                    Some(quote) => b == quote || b == b'{',
                    None => {
                        b.is_ascii_whitespace() || b == b'>' || b == b'{' || self.starts_with("/>")
                    }
                };
                if stop {
                    break;
                }
                self.bump();
            }
            parts.push(AttributeValuePart::Text(TextValue {
                span: self.span_from(start),
                value: self.source[start..self.pos].to_string(),
            }));
        }
        parts
    }

    // ========================================================================
    // Blocks and tags
    // ========================================================================

    fn parse_special_tag(&mut self) -> Option<TemplateNode> {
        let start = self.pos;
        self.pos += 2;
        let keyword = self.read_word();
        let kind = match keyword {
            "html" => Some(SpecialTagKind::Html),
            "const" => Some(SpecialTagKind::Const),
            "debug" => Some(SpecialTagKind::Debug),
            "render" => Some(SpecialTagKind::Render),
            _ => None,
        };
        let expression = self.read_braced()?;

        match kind {
            Some(kind) => Some(TemplateNode::Tag(SpecialTag {
                span: self.span_from(start),
                kind,
                expression,
            })),
            None => {
                self.error(
                    ParseErrorKind::InvalidBlockSyntax {
                        message: format!("unknown tag `{{@{keyword}}}`"),
                    },
                    self.span_from(start),
                );
                None
            }
        }
    }

    fn parse_block(&mut self) -> Option<TemplateNode> {
        let start = self.pos;
        self.pos += 2;
        let keyword = self.read_word();
        let header = self.read_braced()?;

        let node = match keyword {
            "if" => TemplateNode::IfBlock(self.parse_if_block(start, header, false)),
            "each" => {
                let body = self.parse_fragment();
                let mut fallback = None;
                while let Some((keyword, rest)) = self.parse_continuation() {
                    if keyword != "else" || !rest.text.is_empty() {
                        self.unexpected_continuation("each", &keyword, rest.span);
                    }
                    fallback = Some(self.parse_fragment());
                }
                self.parse_block_close("each", start);
                TemplateNode::EachBlock(EachBlock {
                    span: self.span_from(start),
                    header,
                    body,
                    fallback,
                })
            }
            "await" => TemplateNode::AwaitBlock(self.parse_await_block(start, header)),
            "key" => {
                let body = self.parse_fragment();
                self.parse_block_close("key", start);
                TemplateNode::KeyBlock(KeyBlock {
                    span: self.span_from(start),
                    expression: header,
                    body,
                })
            }
            "snippet" => {
                let text = header.text.as_str();
                let name_end = text.find(['(', '<']).unwrap_or(text.len());
                let parameters = match (text.find('('), text.rfind(')')) {
                    (Some(open), Some(close)) if open < close => text[open + 1..close].trim(),
                    _ => "",
                };
                let name = SmolStr::new(text[..name_end].trim());
                let parameters = parameters.to_string();
                let body = self.parse_fragment();
                self.parse_block_close("snippet", start);
                TemplateNode::SnippetBlock(SnippetBlock {
                    span: self.span_from(start),
                    name,
                    parameters,
                    body,
                })
            }
            _ => {
                self.error(
                    ParseErrorKind::InvalidBlockSyntax {
                        message: format!("unknown block `{{#{keyword}}}`"),
                    },
                    self.span_from(start),
                );
                return None;
            }
        };
        Some(node)
    }

    /// Parses the rest of an if block whose header has been read.
    ///
    /// An `{:else if}` branch is parsed as a nested block that stops before
    /// the shared `{/if}`, which only the outermost block consumes.
    fn parse_if_block(&mut self, start: usize, test: Expression, elseif: bool) -> IfBlock {
        let consequent = self.parse_fragment();
        let mut alternate = None;

        if self.at_continuation() {
            let branch_start = self.pos;
            if let Some((keyword, rest)) = self.parse_continuation() {
                let else_if = rest
                    .text
                    .strip_prefix("if")
                    .filter(|tail| tail.starts_with(|c: char| c.is_whitespace()));
                match (keyword.as_str(), else_if) {
                    ("else", Some(tail)) => {
                        let end = u32::from(rest.span.end) as usize;
                        let test = self.expression(end - tail.len(), end);
                        let nested = self.parse_if_block(branch_start, test, true);
                        alternate = Some(Fragment {
                            span: nested.span,
                            nodes: vec![TemplateNode::IfBlock(nested)],
                        });
                    }
                    ("else", None) if rest.text.is_empty() => {
                        alternate = Some(self.parse_fragment());
                    }
                    _ => {
                        self.unexpected_continuation("if", &keyword, rest.span);
                        alternate = Some(self.parse_fragment());
                    }
                }
            }
        }

        if !elseif {
            self.parse_block_close("if", start);
        }

        IfBlock {
            span: self.span_from(start),
            elseif,
            test,
            consequent,
            alternate,
        }
    }

    fn parse_await_block(&mut self, start: usize, header: Expression) -> AwaitBlock {
        let first = self.parse_fragment();
        let mut pending = None;
        let mut then = None;
        let mut catch = None;

        // `{#await promise then value}` skips the pending branch.
        match header.text.split_whitespace().skip(1).find(|w| matches!(*w, "then" | "catch")) {
            Some("then") => then = Some(first),
            Some(_) => catch = Some(first),
            None => pending = Some(first),
        }

        while let Some((keyword, rest)) = self.parse_continuation() {
            let body = self.parse_fragment();
            match keyword.as_str() {
                "then" => then = Some(body),
                "catch" => catch = Some(body),
                _ => self.unexpected_continuation("await", &keyword, rest.span),
            }
        }

        self.parse_block_close("await", start);
        AwaitBlock {
            span: self.span_from(start),
            header,
            pending,
            then,
            catch,
        }
    }

    #[inline]
    fn at_continuation(&self) -> bool {
        self.starts_with("{:")
    }

    /// Parses `{:keyword rest}`, returning the keyword and the trimmed rest.
    fn parse_continuation(&mut self) -> Option<(String, Expression)> {
        if !self.at_continuation() {
            return None;
        }
        self.pos += 2;
        let keyword = self.read_word().to_string();
        let rest = self.read_braced()?;
        Some((keyword, rest))
    }

    fn unexpected_continuation(&mut self, block: &str, keyword: &str, span: Span) {
        self.error(
            ParseErrorKind::InvalidBlockSyntax {
                message: format!("unexpected `{{:{keyword}}}` in {{#{block}}} block"),
            },
            span,
        );
    }

    /// Consumes `{/block}` for the block opened at `open`.
    fn parse_block_close(&mut self, block: &str, open: usize) {
        if !self.starts_with("{/") {
            self.error(
                ParseErrorKind::UnclosedBlock {
                    block_type: block.to_string(),
                },
                Span::from_usize(open, self.pos),
            );
            return;
        }

        let start = self.pos;
        self.pos += 2;
        let found = self.read_word();
        self.skip_whitespace();
        self.expect("}");

        if found != block {
            self.error(
                ParseErrorKind::InvalidBlockSyntax {
                    message: format!("expected `{{/{block}}}`, found `{{/{found}}}`"),
                },
                self.span_from(start),
            );
        }
    }
}
