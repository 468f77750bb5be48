//! Generated-to-original position mappings.

use crate::{ByteOffset, Span};
use text_size::TextSize;

/// A single mapping from a generated span to an original span.
///
/// Verbatim copies have equal lengths; rewritten text usually does not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mapping {
    /// The span in the generated output.
    pub generated: Span,
    /// The span in the original source.
    pub original: Span,
}

impl Mapping {
    /// Returns true if the generated text is a byte-for-byte copy of the original.
    #[inline]
    pub fn is_verbatim(&self) -> bool {
        self.generated.len() == self.original.len()
    }
}

/// Position mappings from generated output back to original source, sorted by
/// generated position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceMap {
    mappings: Vec<Mapping>,
}

impl SourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> SourceMapBuilder {
        SourceMapBuilder::new()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    pub fn mappings(&self) -> impl Iterator<Item = &Mapping> {
        self.mappings.iter()
    }

    /// Finds the original position of a generated position.
    ///
    /// Positions inside rewritten text resolve into the original span,
    /// clamped to its last byte. Returns `None` for synthesized text.
    pub fn original_position(&self, generated: ByteOffset) -> Option<ByteOffset> {
        let mapping = self.find_mapping_for_generated(generated)?;
        let offset_in_span = generated - mapping.generated.start;
        let position = mapping.original.start + offset_in_span;

        if mapping.original.is_empty() {
            return Some(mapping.original.start);
        }
        Some(position.min(mapping.original.end - TextSize::from(1)))
    }

    /// Finds the generated position of an original position.
    ///
    /// Only verbatim mappings resolve exactly; an offset inside rewritten
    /// text resolves to the start of its replacement.
    pub fn generated_position(&self, original: ByteOffset) -> Option<ByteOffset> {
        let mapping = self
            .mappings
            .iter()
            .find(|m| m.original.contains(original))?;

        if mapping.is_verbatim() {
            Some(mapping.generated.start + (original - mapping.original.start))
        } else {
            Some(mapping.generated.start)
        }
    }

    fn find_mapping_for_generated(&self, generated: ByteOffset) -> Option<&Mapping> {
        let idx = match self
            .mappings
            .binary_search_by(|m| m.generated.start.cmp(&generated))
        {
            Ok(idx) => idx,
            Err(idx) => idx.checked_sub(1)?,
        };

        self.mappings
            .get(idx)
            .filter(|m| m.generated.contains(generated))
    }
}

/// Accumulates mappings while output text is being written in order.
#[derive(Debug, Default)]
pub struct SourceMapBuilder {
    mappings: Vec<Mapping>,
    /// Current position in the generated output.
    generated_offset: ByteOffset,
}

impl SourceMapBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn generated_offset(&self) -> ByteOffset {
        self.generated_offset
    }

    /// Records text copied unchanged from `original_start`.
    pub fn add_source(&mut self, original_start: ByteOffset, text: &str) {
        let len = TextSize::from(text.len() as u32);
        self.add_transformed(Span::new(original_start, original_start + len), text);
    }

    /// Records synthesized text with no original position.
    pub fn add_generated(&mut self, text: &str) {
        self.generated_offset += TextSize::from(text.len() as u32);
    }

    /// Records `generated_text` as the rewrite of `original`.
    pub fn add_transformed(&mut self, original: Span, generated_text: &str) {
        let len = TextSize::from(generated_text.len() as u32);
        if len == TextSize::from(0) {
            return;
        }

        self.mappings.push(Mapping {
            generated: Span::new(self.generated_offset, self.generated_offset + len),
            original,
        });
        self.generated_offset += len;
    }

    pub fn build(mut self) -> SourceMap {
        self.mappings.sort_by_key(|m| m.generated.start);
        SourceMap {
            mappings: self.mappings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_source_map() {
        let map = SourceMap::new();
        assert!(map.is_empty());
        assert_eq!(map.original_position(TextSize::from(0)), None);
    }

    #[test]
    fn test_builder_add_source() {
        let mut builder = SourceMapBuilder::new();
        builder.add_source(TextSize::from(0), "<div ");
        builder.add_generated("/* synthetic */");
        builder.add_source(TextSize::from(10), "</div>");

        let map = builder.build();
        assert_eq!(map.len(), 2);
        assert_eq!(
            map.original_position(TextSize::from(4)),
            Some(TextSize::from(4))
        );
        assert_eq!(map.original_position(TextSize::from(5)), None);
        assert_eq!(
            map.original_position(TextSize::from(20)),
            Some(TextSize::from(10))
        );
    }

    #[test]
    fn test_transformed_mapping_is_clamped() {
        let mut builder = SourceMapBuilder::new();
        builder.add_transformed(Span::new(5u32, 8u32), "replacement");

        let map = builder.build();
        assert_eq!(
            map.original_position(TextSize::from(1)),
            Some(TextSize::from(6))
        );
        assert_eq!(
            map.original_position(TextSize::from(10)),
            Some(TextSize::from(7))
        );
    }

    #[test]
    fn test_reverse_lookup() {
        let mut builder = SourceMapBuilder::new();
        builder.add_generated("<script>x</script>");
        builder.add_source(TextSize::from(0), "hello");

        let map = builder.build();
        assert_eq!(
            map.generated_position(TextSize::from(3)),
            Some(TextSize::from(21))
        );
        assert_eq!(map.generated_position(TextSize::from(5)), None);
    }

    #[test]
    fn test_empty_generated_text_is_not_mapped() {
        let mut builder = SourceMapBuilder::new();
        builder.add_transformed(Span::new(0u32, 4u32), "");
        assert!(builder.build().is_empty());
    }
}
