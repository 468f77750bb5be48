//! Byte spans into a source string.

use std::ops::Range;
use text_size::{TextRange, TextSize};

/// A byte offset into a source string.
pub type ByteOffset = TextSize;

/// A half-open `[start, end)` byte range in source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Span {
    /// The start byte offset (inclusive).
    pub start: ByteOffset,
    /// The end byte offset (exclusive).
    pub end: ByteOffset,
}

impl Span {
    /// Creates a new span from start and end byte offsets.
    #[inline]
    pub fn new(start: impl Into<ByteOffset>, end: impl Into<ByteOffset>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Creates a span from `usize` offsets, as produced by `str` searches.
    #[inline]
    pub fn from_usize(start: usize, end: usize) -> Self {
        Self::new(TextSize::from(start as u32), TextSize::from(end as u32))
    }

    /// Creates an empty span at the given offset.
    #[inline]
    pub fn empty(offset: impl Into<ByteOffset>) -> Self {
        let offset = offset.into();
        Self::new(offset, offset)
    }

    /// Length of the span in bytes.
    #[inline]
    pub fn len(&self) -> TextSize {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns true if `offset` lies inside `[start, end)`.
    #[inline]
    pub fn contains(&self, offset: ByteOffset) -> bool {
        self.start <= offset && offset < self.end
    }

    /// Returns true if `offset` lies strictly between `start` and `end`.
    #[inline]
    pub fn strictly_contains(&self, offset: ByteOffset) -> bool {
        self.start < offset && offset < self.end
    }

    /// Returns true if the two spans share at least one byte.
    #[inline]
    pub fn overlaps(&self, other: Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// The span as a `usize` range, for slicing.
    #[inline]
    pub fn range(&self) -> Range<usize> {
        u32::from(self.start) as usize..u32::from(self.end) as usize
    }

    /// Slices `text` by this span.
    ///
    /// Panics if the span is out of bounds or not on char boundaries, like
    /// ordinary string slicing.
    #[inline]
    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        &text[self.range()]
    }
}

impl From<TextRange> for Span {
    fn from(range: TextRange) -> Self {
        Span::new(range.start(), range.end())
    }
}

impl From<Span> for TextRange {
    fn from(span: Span) -> Self {
        TextRange::new(span.start, span.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_from_usize() {
        let span = Span::from_usize(3, 9);
        assert_eq!(span.start, TextSize::from(3));
        assert_eq!(span.end, TextSize::from(9));
        assert_eq!(span.range(), 3..9);
    }

    #[test]
    fn test_span_empty() {
        let span = Span::empty(5u32);
        assert!(span.is_empty());
        assert_eq!(span.len(), TextSize::from(0));
    }

    #[test]
    fn test_span_contains() {
        let span = Span::new(5u32, 15u32);
        assert!(!span.contains(TextSize::from(4)));
        assert!(span.contains(TextSize::from(5)));
        assert!(!span.contains(TextSize::from(15)));
        assert!(!span.strictly_contains(TextSize::from(5)));
        assert!(span.strictly_contains(TextSize::from(6)));
    }

    #[test]
    fn test_span_overlaps() {
        let a = Span::new(5u32, 10u32);
        assert!(a.overlaps(Span::new(9u32, 12u32)));
        assert!(!a.overlaps(Span::new(10u32, 12u32)));
        assert!(!a.overlaps(Span::new(0u32, 5u32)));
    }

    #[test]
    fn test_span_slice() {
        let text = "<div stylex={x}>";
        assert_eq!(Span::from_usize(5, 11).slice(text), "stylex");
    }
}
