//! StyleX attribute preprocessing for Svelte markup.
//!
//! Rewrites convention attributes into calls against the StyleX runtime
//! before the Svelte compiler sees the file:
//!
//! - `stylex={expr}`, `stylex-attrs={expr}`, `{stylex}` and `{...stylex}`
//!   become `{...__stylex.attrs(expr)}`; array literals are spread into
//!   separate arguments.
//! - `stylex-create={{...}}` hoists the definition into a module-level
//!   `__stylex.create({...})` call and passes a reference to it, at the
//!   index chosen by `stylex-create-at`.
//!
//! The import of the runtime is added to the instance script, and the
//! hoisted definitions to the module script, creating either when missing.
//! Everything outside the rewritten attributes is left byte-for-byte intact.
//!
//! # Example
//!
//! ```
//! use svelte_stylex::{preprocess, Notices, StylexOptions};
//!
//! let out = preprocess(
//!     "<div stylex={[styles.a, styles.b]}></div>",
//!     Some("App.svelte"),
//!     &StylexOptions::default(),
//!     &Notices::new(),
//! )
//! .unwrap()
//! .unwrap();
//!
//! assert_eq!(
//!     out.code,
//!     r#"<script>import * as __stylex from "@stylexjs/stylex";</script><div {...__stylex.attrs(styles.a, styles.b)}></div>"#
//! );
//! ```

mod classify;
mod emit;
mod error;
mod expression;
mod notice;
mod options;
mod runtime;
mod walker;

pub use classify::Position;
pub use error::PreprocessError;
pub use expression::{extract, ExpressionKind};
pub use notice::{format_notice, Notice, Notices};
pub use options::{InvalidOption, StylexOptions};
pub use runtime::{props_to_attrs, DomAttrs, StyleProps, StyleValue};
pub use walker::{walk, ElementRef, Elements};

use error::ANONYMOUS;
use expression::SyntaxError;
use source_map::{ByteOffset, LineIndex, Location, SourceMap};

/// The output of a file that was rewritten.
#[derive(Debug, Clone)]
pub struct Processed {
    pub code: String,
    /// Maps `code` back to the original source.
    pub map: SourceMap,
}

impl Processed {
    /// The source map as v3 JSON, naming `filename` as its only source.
    pub fn source_map_json(&self, original: &str, filename: &str) -> String {
        self.map.to_v3(original, &self.code, filename).to_json()
    }
}

/// Per-file state shared by the classifier and the emitter.
pub(crate) struct Context<'a> {
    pub source: &'a str,
    pub filename: Option<&'a str>,
    pub options: &'a StylexOptions,
    pub notices: &'a Notices,
    lines: LineIndex,
}

impl<'a> Context<'a> {
    pub fn new(
        source: &'a str,
        filename: Option<&'a str>,
        options: &'a StylexOptions,
        notices: &'a Notices,
    ) -> Self {
        Self {
            source,
            filename,
            options,
            notices,
            lines: LineIndex::new(source),
        }
    }

    pub fn display_filename(&self) -> &str {
        self.filename.unwrap_or(ANONYMOUS)
    }

    pub fn location(&self, offset: impl Into<ByteOffset>) -> Location {
        self.lines
            .location_utf16(self.source, offset.into())
            .unwrap_or_default()
    }

    pub fn expression_error(&self, attribute: &str, err: SyntaxError) -> PreprocessError {
        PreprocessError::Expression {
            filename: self.display_filename().to_string(),
            location: self.location(err.offset),
            attribute: attribute.into(),
            message: err.message,
        }
    }
}

/// Rewrites the StyleX attributes in one Svelte file.
///
/// Returns `Ok(None)` when the file has nothing to rewrite. Advisories for
/// experimental attributes are raised through `notices`.
pub fn preprocess(
    source: &str,
    filename: Option<&str>,
    options: &StylexOptions,
    notices: &Notices,
) -> Result<Option<Processed>, PreprocessError> {
    let cx = Context::new(source, filename, options, notices);

    if !options.mentioned_in(source) {
        log::debug!("{}: no StyleX attributes, skipping", cx.display_filename());
        return Ok(None);
    }

    let parsed = svelte_parser::parse(source);
    if let Some(first) = parsed.errors.first() {
        return Err(PreprocessError::Parse {
            filename: cx.display_filename().to_string(),
            location: cx.location(first.span.start),
            message: first.to_string(),
            additional: parsed.errors.len() - 1,
        });
    }

    let plans = classify::classify(&parsed.document.fragment, &cx)?;
    let Some(rendered) = emit::emit(&parsed.document, &plans, &cx)? else {
        log::debug!("{}: nothing to rewrite", cx.display_filename());
        return Ok(None);
    };

    Ok(Some(Processed {
        code: rendered.code,
        map: rendered.map,
    }))
}

/// Validated options together with the advisories raised so far.
///
/// One instance is meant to live as long as the host process, so each
/// advisory is shown once.
#[derive(Debug, Default)]
pub struct Preprocessor {
    options: StylexOptions,
    notices: Notices,
}

impl Preprocessor {
    pub fn new(options: StylexOptions) -> Result<Self, InvalidOption> {
        options.validate()?;
        Ok(Self {
            options,
            notices: Notices::new(),
        })
    }

    pub fn options(&self) -> &StylexOptions {
        &self.options
    }

    pub fn notices(&self) -> &Notices {
        &self.notices
    }

    /// Preprocesses the markup of one file.
    pub fn markup(
        &self,
        source: &str,
        filename: Option<&str>,
    ) -> Result<Option<Processed>, PreprocessError> {
        preprocess(source, filename, &self.options, &self.notices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preprocessor_rejects_invalid_options() {
        let options = StylexOptions {
            runtime_alias: "not valid".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            Preprocessor::new(options),
            Err(InvalidOption::NotAnIdentifier { option: "runtimeAlias", .. })
        ));
    }

    #[test]
    fn test_skips_unmentioned_source() {
        let preprocessor = Preprocessor::default();
        assert!(preprocessor.markup("<div></div>", None).unwrap().is_none());
    }

    #[test]
    fn test_parse_error_reports_first_error() {
        let err = preprocess(
            "<div stylex={a}>\n<span>\n</div>",
            Some("Broken.svelte"),
            &StylexOptions::default(),
            &Notices::new(),
        )
        .unwrap_err();

        match err {
            PreprocessError::Parse {
                filename, location, ..
            } => {
                assert_eq!(filename, "Broken.svelte");
                assert!(location.line >= 1);
            }
            other => panic!("expected a parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_context_location_is_one_based_line() {
        let options = StylexOptions::default();
        let notices = Notices::new();
        let cx = Context::new("a\nbc", None, &options, &notices);
        assert_eq!(cx.location(3u32), Location { line: 2, column: 1 });
        assert_eq!(cx.display_filename(), "<anonymous>");
    }
}
