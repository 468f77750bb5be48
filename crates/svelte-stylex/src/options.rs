//! Preprocessor options.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Names the preprocessor looks for and generates.
///
/// Deserializes from camelCase JSON; every field is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StylexOptions {
    /// Attribute whose value is passed to the runtime `attrs` helper.
    pub attrs_attribute_name: String,

    /// Identifier-valid alternative to `attrs_attribute_name`, usable as a
    /// plain attribute, a shorthand `{stylex}` or a spread `{...stylex}`.
    pub shorthand_attr_name: Option<String>,

    /// Attribute holding an inline style definition to hoist.
    pub create_attribute_name: String,

    /// Attribute choosing where the hoisted style goes in the attrs list.
    pub create_position_attribute_name: String,

    /// Module the runtime helper is imported from.
    pub import_source: String,

    /// Namespace alias for the imported runtime helper.
    pub runtime_alias: String,

    /// Name of the hoisted style-definition constant.
    pub hoist_var_name: String,
}

impl Default for StylexOptions {
    fn default() -> Self {
        Self {
            attrs_attribute_name: "stylex-attrs".to_string(),
            shorthand_attr_name: Some("stylex".to_string()),
            create_attribute_name: "stylex-create".to_string(),
            create_position_attribute_name: "stylex-create-at".to_string(),
            import_source: "@stylexjs/stylex".to_string(),
            runtime_alias: "__stylex".to_string(),
            hoist_var_name: "__styles".to_string(),
        }
    }
}

/// An option value that would produce broken output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidOption {
    #[error("`{option}` must not be empty")]
    Empty { option: &'static str },

    #[error("`{option}` must be a valid JavaScript identifier, got `{value}`")]
    NotAnIdentifier { option: &'static str, value: String },
}

impl StylexOptions {
    /// Checks that generated code built from these names will be valid.
    pub fn validate(&self) -> Result<(), InvalidOption> {
        for (option, value) in [
            ("attrsAttributeName", &self.attrs_attribute_name),
            ("createAttributeName", &self.create_attribute_name),
            (
                "createPositionAttributeName",
                &self.create_position_attribute_name,
            ),
            ("importSource", &self.import_source),
        ] {
            if value.is_empty() {
                return Err(InvalidOption::Empty { option });
            }
        }

        let identifiers = [
            ("runtimeAlias", Some(&self.runtime_alias)),
            ("hoistVarName", Some(&self.hoist_var_name)),
            ("shorthandAttrName", self.shorthand_attr_name.as_ref()),
        ];
        for (option, value) in identifiers {
            if let Some(value) = value.filter(|v| !is_valid_identifier(v)) {
                return Err(InvalidOption::NotAnIdentifier {
                    option,
                    value: value.clone(),
                });
            }
        }
        Ok(())
    }

    /// Whether `name` selects the attrs conversion: the attrs attribute name
    /// or the shorthand name.
    pub fn is_attrs_name(&self, name: &str) -> bool {
        name == self.attrs_attribute_name || self.shorthand_attr_name.as_deref() == Some(name)
    }

    /// Cheap test for whether `source` can contain anything to rewrite.
    pub fn mentioned_in(&self, source: &str) -> bool {
        [
            Some(self.attrs_attribute_name.as_str()),
            self.shorthand_attr_name.as_deref(),
            Some(self.create_attribute_name.as_str()),
            Some(self.create_position_attribute_name.as_str()),
        ]
        .into_iter()
        .flatten()
        .any(|name| source.contains(name))
    }
}

/// Returns true if `name` is a plain ASCII JavaScript identifier.
pub(crate) fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let first = match chars.next() {
        Some(c) => c,
        None => return false,
    };
    if !(first.is_ascii_alphabetic() || first == '_' || first == '$') {
        return false;
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let options = StylexOptions::default();
        assert_eq!(options.attrs_attribute_name, "stylex-attrs");
        assert_eq!(options.shorthand_attr_name.as_deref(), Some("stylex"));
        assert_eq!(options.create_attribute_name, "stylex-create");
        assert_eq!(options.create_position_attribute_name, "stylex-create-at");
        assert_eq!(options.import_source, "@stylexjs/stylex");
        assert_eq!(options.runtime_alias, "__stylex");
        assert_eq!(options.hoist_var_name, "__styles");
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_deserialize_partial_camel_case() {
        let options: StylexOptions =
            serde_json::from_str(r#"{"runtimeAlias": "sx", "shorthandAttrName": null}"#).unwrap();
        assert_eq!(options.runtime_alias, "sx");
        assert_eq!(options.shorthand_attr_name, None);
        assert_eq!(options.hoist_var_name, "__styles");
    }

    #[test]
    fn test_validate_rejects_bad_identifiers() {
        let options = StylexOptions {
            hoist_var_name: "my-styles".to_string(),
            ..Default::default()
        };
        assert_eq!(
            options.validate(),
            Err(InvalidOption::NotAnIdentifier {
                option: "hoistVarName",
                value: "my-styles".to_string()
            })
        );

        let options = StylexOptions {
            import_source: String::new(),
            ..Default::default()
        };
        assert_eq!(
            options.validate(),
            Err(InvalidOption::Empty {
                option: "importSource"
            })
        );
    }

    #[test]
    fn test_is_attrs_name() {
        let options = StylexOptions::default();
        assert!(options.is_attrs_name("stylex"));
        assert!(options.is_attrs_name("stylex-attrs"));
        assert!(!options.is_attrs_name("stylex-create"));

        let options = StylexOptions {
            shorthand_attr_name: None,
            ..Default::default()
        };
        assert!(!options.is_attrs_name("stylex"));
    }

    #[test]
    fn test_mentioned_in() {
        let options = StylexOptions::default();
        assert!(options.mentioned_in("<div stylex={s}></div>"));
        assert!(!options.mentioned_in("<div class=\"a\"></div>"));
    }

    #[test]
    fn test_is_valid_identifier() {
        assert!(is_valid_identifier("div"));
        assert!(is_valid_identifier("$x_1"));
        assert!(!is_valid_identifier("svelte:element"));
        assert!(!is_valid_identifier("my-tag"));
        assert!(!is_valid_identifier(""));
    }
}
