//! Offset to line/column conversion.

use crate::ByteOffset;
use text_size::TextSize;

/// A zero-based line and byte column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LineCol {
    /// 0-indexed line number.
    pub line: u32,
    /// 0-indexed byte column within the line.
    pub col: u32,
}

impl LineCol {
    #[inline]
    pub fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }

    /// Converts to the location convention used by JS parsers and stack
    /// traces: 1-based line, 0-based column.
    #[inline]
    pub fn to_location(self) -> Location {
        Location {
            line: self.line + 1,
            column: self.col,
        }
    }
}

/// A 1-based line with a 0-based column, as reported by JS tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Location {
    pub line: u32,
    pub column: u32,
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Start offsets of every line in a text, for O(log n) lookups.
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// `line_starts[i]` is the offset where line `i` begins.
    line_starts: Vec<ByteOffset>,
    len: ByteOffset,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let line_starts = std::iter::once(TextSize::from(0))
            .chain(
                text.match_indices('\n')
                    .map(|(offset, _)| TextSize::from((offset + 1) as u32)),
            )
            .collect();

        Self {
            line_starts,
            len: TextSize::from(text.len() as u32),
        }
    }

    #[inline]
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Converts a byte offset to a line/column position.
    ///
    /// Returns `None` if the offset is past the end of the text.
    pub fn line_col(&self, offset: ByteOffset) -> Option<LineCol> {
        if offset > self.len {
            return None;
        }

        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(line) => line.saturating_sub(1),
        };
        let col = u32::from(offset) - u32::from(self.line_starts[line]);

        Some(LineCol::new(line as u32, col))
    }

    /// Like [`LineIndex::line_col`], in the 1-based line convention.
    pub fn location(&self, offset: ByteOffset) -> Option<Location> {
        self.line_col(offset).map(LineCol::to_location)
    }

    /// Like [`LineIndex::location`], with the column counted in UTF-16 code
    /// units of `text` as JS tooling does.
    ///
    /// Returns `None` if the offset is past the end or not on a char boundary.
    pub fn location_utf16(&self, text: &str, offset: ByteOffset) -> Option<Location> {
        let line_col = self.line_col(offset)?;
        let start = usize::from(self.line_starts[line_col.line as usize]);
        let column = text
            .get(start..usize::from(offset))?
            .chars()
            .map(char::len_utf16)
            .sum::<usize>();
        Some(Location {
            line: line_col.line + 1,
            column: column as u32,
        })
    }

    /// Converts a line/column position back to a byte offset.
    pub fn offset(&self, line_col: LineCol) -> Option<ByteOffset> {
        let start = self.line_start(line_col.line)?;
        Some(start + TextSize::from(line_col.col))
    }

    pub fn line_start(&self, line: u32) -> Option<ByteOffset> {
        self.line_starts.get(line as usize).copied()
    }
}
