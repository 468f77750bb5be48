//! Preprocessing errors.

use smol_str::SmolStr;
use source_map::{EditError, Location};
use thiserror::Error;

/// Placeholder for sources without a filename.
pub(crate) const ANONYMOUS: &str = "<anonymous>";

/// A file that could not be preprocessed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PreprocessError {
    /// The markup does not parse.
    #[error("{filename}:{location}: {message}{}", more_errors(.additional))]
    Parse {
        filename: String,
        location: Location,
        message: String,
        /// How many further parse errors were reported.
        additional: usize,
    },

    /// A convention attribute holds something that is not a JS expression.
    #[error("{filename}:{location}: invalid expression in `{attribute}`: {message}")]
    Expression {
        filename: String,
        location: Location,
        attribute: SmolStr,
        message: String,
    },

    /// Two edits touched the same text.
    #[error("conflicting edits: {0}")]
    Edit(#[from] EditError),
}

fn more_errors(additional: &usize) -> String {
    match *additional {
        0 => String::new(),
        1 => " (and 1 more error)".to_string(),
        n => format!(" (and {n} more errors)"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let error = PreprocessError::Parse {
            filename: "App.svelte".to_string(),
            location: Location { line: 2, column: 4 },
            message: "unclosed tag: <div>".to_string(),
            additional: 2,
        };
        insta::assert_snapshot!(
            error.to_string(),
            @"App.svelte:2:4: unclosed tag: <div> (and 2 more errors)"
        );
    }

    #[test]
    fn test_expression_error_display() {
        let error = PreprocessError::Expression {
            filename: ANONYMOUS.to_string(),
            location: Location { line: 1, column: 12 },
            attribute: SmolStr::new("stylex"),
            message: "Expression expected".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "<anonymous>:1:12: invalid expression in `stylex`: Expression expected"
        );
    }
}
