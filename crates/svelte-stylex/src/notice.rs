//! One-time advisories for experimental attributes.

use crate::error::ANONYMOUS;
use source_map::Location;
use std::sync::atomic::{AtomicBool, Ordering};

/// An advisory raised at most once per [`Notices`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// An inline style-definition attribute was used.
    InlineCreate,
    /// A create-position attribute was used.
    CreatePosition,
}

impl Notice {
    fn message(self, attribute: &str) -> String {
        match self {
            Notice::InlineCreate => format!(
                "[svelte-stylex] `{attribute}` is experimental: inline styles are hoisted into a module-level create() call and may change in a future release."
            ),
            Notice::CreatePosition => format!(
                "[svelte-stylex] `{attribute}` is experimental and may change in a future release."
            ),
        }
    }
}

/// Tracks which advisories have been raised.
///
/// Shared by reference across files (and threads) so each advisory is
/// logged once per instance.
#[derive(Debug, Default)]
pub struct Notices {
    inline_create: AtomicBool,
    create_position: AtomicBool,
}

impl Notices {
    pub fn new() -> Self {
        Self::default()
    }

    fn flag(&self, notice: Notice) -> &AtomicBool {
        match notice {
            Notice::InlineCreate => &self.inline_create,
            Notice::CreatePosition => &self.create_position,
        }
    }

    /// Logs `notice` at warn level unless it was raised before.
    ///
    /// Returns true if this call raised it.
    pub fn raise(
        &self,
        notice: Notice,
        attribute: &str,
        filename: Option<&str>,
        location: Location,
    ) -> bool {
        if self.flag(notice).swap(true, Ordering::Relaxed) {
            return false;
        }
        log::warn!("{}", format_notice(notice, attribute, filename, location));
        true
    }

    pub fn has_raised(&self, notice: Notice) -> bool {
        self.flag(notice).load(Ordering::Relaxed)
    }
}

/// Formats an advisory with a stack-trace style location line.
pub fn format_notice(
    notice: Notice,
    attribute: &str,
    filename: Option<&str>,
    location: Location,
) -> String {
    format!(
        "{} \n\tat {}:{}:{}",
        notice.message(attribute),
        filename.unwrap_or(ANONYMOUS),
        location.line,
        location.column
    )
}
