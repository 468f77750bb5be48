//! Source positions, text splicing and source maps for svelte-stylex.
//!
//! The preprocessor never reparses its own output. It records edits against
//! offsets of the original file in an [`EditBuffer`], renders them once, and
//! hands back a [`SourceMap`] (or its v3 JSON form) so the Svelte compiler
//! can report positions in the file the user actually wrote.

mod builder;
mod edit;
mod line_index;
mod span;
mod v3;

pub use builder::{Mapping, SourceMap, SourceMapBuilder};
pub use edit::{EditBuffer, EditError, Rendered};
pub use line_index::{LineCol, LineIndex, Location};
pub use span::{ByteOffset, Span};
pub use v3::RawSourceMap;
