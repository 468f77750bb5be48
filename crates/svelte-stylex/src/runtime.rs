//! Conversion of StyleX props into DOM attributes.
//!
//! The StyleX runtime resolves styles into `{ className, style,
//! "data-style-src" }`. Svelte elements take `class` and a `style` string
//! instead, which is what the runtime helper's `attrs` returns.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A resolved inline style value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StyleValue {
    String(String),
    Number(f64),
}

impl fmt::Display for StyleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StyleValue::String(value) => f.write_str(value),
            StyleValue::Number(value) => write!(f, "{value}"),
        }
    }
}

/// The props object produced by the StyleX runtime.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleProps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    /// Inline styles in declaration order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<IndexMap<String, StyleValue>>,
    #[serde(
        default,
        rename = "data-style-src",
        skip_serializing_if = "Option::is_none"
    )]
    pub data_style_src: Option<String>,
}

/// Attributes ready to spread onto a Svelte element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomAttrs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(
        default,
        rename = "data-style-src",
        skip_serializing_if = "Option::is_none"
    )]
    pub data_style_src: Option<String>,
}

/// Converts StyleX props into DOM attributes.
///
/// Empty class names, empty style maps and empty source hints are dropped.
pub fn props_to_attrs(props: &StyleProps) -> DomAttrs {
    let class = props.class_name.clone().filter(|c| !c.is_empty());

    let style = props
        .style
        .as_ref()
        .filter(|style| !style.is_empty())
        .map(|style| {
            style
                .iter()
                .map(|(key, value)| format!("{key}: {value};"))
                .collect::<Vec<_>>()
                .join(" ")
        });

    let data_style_src = props.data_style_src.clone().filter(|s| !s.is_empty());

    DomAttrs {
        class,
        style,
        data_style_src,
    }
}
