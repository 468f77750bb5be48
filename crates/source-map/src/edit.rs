//! A splice buffer over immutable source text.
//!
//! [`EditBuffer`] records replacements and insertions against offsets of the
//! *original* text, so edits never have to account for each other's shifts.
//! Rendering walks the original once, emitting untouched text verbatim and
//! building a [`SourceMap`] as it goes.
//!
//! Insertions come in two flavours per offset. *Left* insertions belong to
//! the text ending at the offset, *right* insertions to the text starting
//! there. Both render at the offset, left first.

use crate::{ByteOffset, SourceMap, SourceMapBuilder, Span};
use std::collections::{BTreeMap, BTreeSet};
use text_size::TextSize;
use thiserror::Error;

/// An edit that cannot be applied to the buffer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("offset {offset} is out of bounds (length {len})")]
    OutOfBounds { offset: u32, len: u32 },

    #[error("offset {offset} is not on a character boundary")]
    NotCharBoundary { offset: u32 },

    #[error("cannot replace an empty or inverted range {start}..{end}")]
    EmptyRange { start: u32, end: u32 },

    #[error("range {start}..{end} overlaps the edited range {existing_start}..{existing_end}")]
    Overlap {
        start: u32,
        end: u32,
        existing_start: u32,
        existing_end: u32,
    },

    #[error("offset {offset} falls inside the edited range {start}..{end}")]
    InsideEdit { offset: u32, start: u32, end: u32 },
}

#[derive(Debug, Clone)]
struct Replacement {
    end: ByteOffset,
    text: String,
}

#[derive(Debug, Clone, Default)]
struct Insertion {
    left: String,
    right: String,
}

/// The rendered output of an [`EditBuffer`].
#[derive(Debug, Clone)]
pub struct Rendered {
    pub code: String,
    pub map: SourceMap,
}

/// Records edits against a source string and renders the result.
#[derive(Debug, Clone)]
pub struct EditBuffer<'src> {
    source: &'src str,
    intro: String,
    outro: String,
    /// Replaced ranges keyed by start offset.
    replacements: BTreeMap<ByteOffset, Replacement>,
    inserts: BTreeMap<ByteOffset, Insertion>,
}

impl<'src> EditBuffer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            intro: String::new(),
            outro: String::new(),
            replacements: BTreeMap::new(),
            inserts: BTreeMap::new(),
        }
    }

    /// The original, unedited text.
    #[inline]
    pub fn original(&self) -> &'src str {
        self.source
    }

    /// Replaces `span` of the original with `text`.
    ///
    /// Each original byte can be replaced at most once; a second edit
    /// touching the same bytes is rejected rather than merged.
    pub fn update(&mut self, span: Span, text: impl Into<String>) -> Result<(), EditError> {
        if span.start >= span.end {
            return Err(EditError::EmptyRange {
                start: span.start.into(),
                end: span.end.into(),
            });
        }
        self.check_offset(span.start)?;
        self.check_offset(span.end)?;

        if let Some((start, existing)) = self
            .replacements
            .iter()
            .find(|(start, r)| Span::new(**start, r.end).overlaps(span))
        {
            return Err(EditError::Overlap {
                start: span.start.into(),
                end: span.end.into(),
                existing_start: (*start).into(),
                existing_end: existing.end.into(),
            });
        }
        if let Some(offset) = self
            .inserts
            .range(span.start..span.end)
            .map(|(offset, _)| *offset)
            .find(|offset| span.strictly_contains(*offset))
        {
            return Err(EditError::InsideEdit {
                offset: offset.into(),
                start: span.start.into(),
                end: span.end.into(),
            });
        }

        self.replacements.insert(
            span.start,
            Replacement {
                end: span.end,
                text: text.into(),
            },
        );
        Ok(())
    }

    /// Removes `span` from the output. Removing an empty span is a no-op.
    pub fn remove(&mut self, span: Span) -> Result<(), EditError> {
        if span.is_empty() {
            return self.check_offset(span.start);
        }
        self.update(span, String::new())
    }

    /// Inserts text at the very beginning of the output.
    pub fn prepend(&mut self, text: &str) {
        self.intro.insert_str(0, text);
    }

    /// Inserts text at the very end of the output.
    pub fn append(&mut self, text: &str) {
        self.outro.push_str(text);
    }

    /// Inserts before any left insertions already at `offset`.
    pub fn prepend_left(
        &mut self,
        offset: impl Into<ByteOffset>,
        text: &str,
    ) -> Result<(), EditError> {
        self.insertion_at(offset.into())?.left.insert_str(0, text);
        Ok(())
    }

    /// Inserts after any left insertions already at `offset`.
    pub fn append_left(
        &mut self,
        offset: impl Into<ByteOffset>,
        text: &str,
    ) -> Result<(), EditError> {
        self.insertion_at(offset.into())?.left.push_str(text);
        Ok(())
    }

    /// Inserts before any right insertions already at `offset`.
    pub fn prepend_right(
        &mut self,
        offset: impl Into<ByteOffset>,
        text: &str,
    ) -> Result<(), EditError> {
        self.insertion_at(offset.into())?.right.insert_str(0, text);
        Ok(())
    }

    /// Inserts after any right insertions already at `offset`.
    pub fn append_right(
        &mut self,
        offset: impl Into<ByteOffset>,
        text: &str,
    ) -> Result<(), EditError> {
        self.insertion_at(offset.into())?.right.push_str(text);
        Ok(())
    }

    /// Returns true if rendering would produce anything but the original.
    pub fn has_changed(&self) -> bool {
        !self.intro.is_empty()
            || !self.outro.is_empty()
            || !self.replacements.is_empty()
            || self
                .inserts
                .values()
                .any(|i| !i.left.is_empty() || !i.right.is_empty())
    }

    /// Renders the edited text together with its source map.
    pub fn render(&self) -> Rendered {
        let mut code = String::with_capacity(self.source.len() + self.intro.len());
        let mut builder = SourceMapBuilder::new();

        code.push_str(&self.intro);
        builder.add_generated(&self.intro);

        let points: BTreeSet<ByteOffset> = self
            .inserts
            .keys()
            .chain(self.replacements.keys())
            .copied()
            .collect();

        let mut cursor = TextSize::from(0);
        for point in points {
            if point < cursor {
                continue;
            }

            let verbatim = Span::new(cursor, point).slice(self.source);
            code.push_str(verbatim);
            builder.add_source(cursor, verbatim);
            cursor = point;

            if let Some(insertion) = self.inserts.get(&point) {
                for text in [&insertion.left, &insertion.right] {
                    code.push_str(text);
                    builder.add_generated(text);
                }
            }

            if let Some(replacement) = self.replacements.get(&point) {
                code.push_str(&replacement.text);
                builder.add_transformed(Span::new(point, replacement.end), &replacement.text);
                cursor = replacement.end;
            }
        }

        let rest = &self.source[u32::from(cursor) as usize..];
        code.push_str(rest);
        builder.add_source(cursor, rest);

        code.push_str(&self.outro);
        builder.add_generated(&self.outro);

        Rendered {
            code,
            map: builder.build(),
        }
    }

    fn insertion_at(&mut self, offset: ByteOffset) -> Result<&mut Insertion, EditError> {
        self.check_offset(offset)?;
        if let Some((start, replacement)) = self
            .replacements
            .range(..offset)
            .next_back()
            .filter(|(start, r)| Span::new(**start, r.end).strictly_contains(offset))
        {
            return Err(EditError::InsideEdit {
                offset: offset.into(),
                start: (*start).into(),
                end: replacement.end.into(),
            });
        }

        Ok(self.inserts.entry(offset).or_default())
    }

    fn check_offset(&self, offset: ByteOffset) -> Result<(), EditError> {
        let raw = u32::from(offset);
        if raw as usize > self.source.len() {
            return Err(EditError::OutOfBounds {
                offset: raw,
                len: self.source.len() as u32,
            });
        }
        if !self.source.is_char_boundary(raw as usize) {
            return Err(EditError::NotCharBoundary { offset: raw });
        }
        Ok(())
    }
}

impl std::fmt::Display for EditBuffer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render().code)
    }
}
