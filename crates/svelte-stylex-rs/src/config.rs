//! Configuration loading.

use crate::cli::Args;
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use std::sync::Arc;
use svelte_stylex::StylexOptions;
use swc_common::SourceMap;
use swc_ecma_ast::{
    ExportDefaultExpr, Expr, KeyValueProp, Lit, ModuleDecl, ModuleItem, ObjectLit, Prop, PropName,
    PropOrSpread,
};
use swc_ecma_parser::{parse_file_as_module, EsSyntax, Syntax, TsSyntax};
use thiserror::Error;

/// Name of the options file looked up in the workspace.
pub const CONFIG_FILE: &str = "stylex.config.json";

/// An options file that could not be used.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: Utf8PathBuf,
        source: std::io::Error,
    },

    #[error("invalid options in {path}: {source}")]
    Parse {
        path: Utf8PathBuf,
        source: serde_json::Error,
    },
}

/// Loads preprocessor options.
///
/// An explicit `path` must exist; otherwise `stylex.config.json` in the
/// workspace is used when present, and the defaults when not. JSON comments
/// are allowed.
pub fn load_options(
    workspace: &Utf8Path,
    path: Option<&Utf8Path>,
) -> Result<StylexOptions, ConfigError> {
    let path = match path {
        Some(path) if path.is_relative() => workspace.join(path),
        Some(path) => path.to_path_buf(),
        None => {
            let default = workspace.join(CONFIG_FILE);
            if !default.exists() {
                return Ok(StylexOptions::default());
            }
            default
        }
    };

    let content = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;
    let options = serde_json::from_str(&remove_json_comments(&content))
        .map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;
    log::debug!("loaded options from {}", path);
    Ok(options)
}

/// Applies command-line overrides on top of file options.
pub fn apply_overrides(mut options: StylexOptions, args: &Args) -> StylexOptions {
    let overrides = [
        (&mut options.attrs_attribute_name, &args.attrs_name),
        (&mut options.create_attribute_name, &args.create_name),
        (&mut options.create_position_attribute_name, &args.create_at_name),
        (&mut options.import_source, &args.import_source),
        (&mut options.runtime_alias, &args.runtime_alias),
        (&mut options.hoist_var_name, &args.hoist_var),
    ];
    for (target, value) in overrides {
        if let Some(value) = value {
            target.clone_from(value);
        }
    }

    if args.no_shorthand {
        options.shorthand_attr_name = None;
    } else if let Some(name) = &args.shorthand_name {
        options.shorthand_attr_name = Some(name.clone());
    }
    options
}

/// The parts of the Svelte project configuration the preprocessor uses.
#[derive(Debug, Clone, Default)]
pub struct SvelteConfig {
    /// File extensions to process.
    pub extensions: Vec<String>,
}

impl SvelteConfig {
    /// Loads configuration from a svelte.config.js file.
    pub fn load(project_root: &Utf8Path) -> Self {
        let config_files = ["svelte.config.js", "svelte.config.mjs", "svelte.config.ts"];

        for config_file in config_files {
            let config_path = project_root.join(config_file);
            if config_path.exists() {
                match Self::parse_config(&config_path) {
                    Ok(config) => return config,
                    Err(e) => {
                        log::warn!("Failed to parse {}: {}", config_path, e);
                        return Self::default();
                    }
                }
            }
        }

        Self::default()
    }

    /// Parses a svelte.config.js or svelte.config.ts file using SWC.
    fn parse_config(path: &Utf8Path) -> Result<Self, String> {
        let content = fs::read_to_string(path).map_err(|e| e.to_string())?;

        let cm: Arc<SourceMap> = Default::default();
        let fm = cm.new_source_file(
            swc_common::FileName::Custom(path.to_string()).into(),
            content,
        );

        let syntax = if path.as_str().ends_with(".ts") {
            Syntax::Typescript(TsSyntax {
                tsx: false,
                ..Default::default()
            })
        } else {
            Syntax::Es(EsSyntax {
                jsx: false,
                ..Default::default()
            })
        };

        let module = parse_file_as_module(
            &fm,
            syntax,
            swc_ecma_ast::EsVersion::Es2022,
            None,
            &mut Vec::new(),
        )
        .map_err(|e| format!("Parse error: {}", e.kind().msg()))?;

        let mut config = SvelteConfig::default();
        for item in &module.body {
            if let ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultExpr(ExportDefaultExpr {
                expr,
                ..
            })) = item
            {
                if let Expr::Object(obj) = expr.as_ref() {
                    config.extensions = Self::extensions(obj);
                }
            }
        }

        Ok(config)
    }

    fn prop_name_str(key: &PropName) -> Option<&str> {
        match key {
            PropName::Ident(ident) => Some(ident.sym.as_str()),
            PropName::Str(s) => s.value.as_str(),
            _ => None,
        }
    }

    /// Reads the string entries of a top-level `extensions` array.
    fn extensions(obj: &ObjectLit) -> Vec<String> {
        let mut extensions = Vec::new();
        for prop in &obj.props {
            let PropOrSpread::Prop(prop) = prop else {
                continue;
            };
            let Prop::KeyValue(KeyValueProp { key, value }) = prop.as_ref() else {
                continue;
            };
            if Self::prop_name_str(key) != Some("extensions") {
                continue;
            }
            if let Expr::Array(arr) = value.as_ref() {
                for elem in arr.elems.iter().flatten() {
                    if let Expr::Lit(Lit::Str(s)) = elem.expr.as_ref() {
                        if let Some(ext) = s.value.as_str() {
                            extensions.push(ext.to_string());
                        }
                    }
                }
            }
        }
        extensions
    }

    /// Returns the file extensions to process.
    pub fn file_extensions(&self) -> Vec<&str> {
        if self.extensions.is_empty() {
            vec![".svelte"]
        } else {
            self.extensions.iter().map(|s| s.as_str()).collect()
        }
    }
}

/// Removes single-line and multi-line comments from JSON.
fn remove_json_comments(json: &str) -> String {
    let mut result = String::with_capacity(json.len());
    let mut chars = json.chars().peekable();
    let mut in_string = false;

    while let Some(c) = chars.next() {
        if in_string {
            result.push(c);
            if c == '"' {
                in_string = false;
            } else if c == '\\' {
                if let Some(next) = chars.next() {
                    result.push(next);
                }
            }
        } else if c == '"' {
            result.push(c);
            in_string = true;
        } else if c == '/' {
            match chars.peek() {
                Some('/') => {
                    chars.next();
                    while let Some(&next) = chars.peek() {
                        if next == '\n' {
                            break;
                        }
                        chars.next();
                    }
                }
                Some('*') => {
                    chars.next();
                    while let Some(next) = chars.next() {
                        if next == '*' && chars.peek() == Some(&'/') {
                            chars.next();
                            break;
                        }
                    }
                }
                _ => {
                    result.push(c);
                }
            }
        } else {
            result.push(c);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use pretty_assertions::assert_eq;

    fn workspace(dir: &tempfile::TempDir) -> Utf8PathBuf {
        Utf8PathBuf::try_from(dir.path().to_path_buf()).unwrap()
    }

    #[test]
    fn test_remove_comments() {
        let json = r#"{
            // This is a comment
            "importSource": "@stylexjs/stylex" /* inline comment */,
            "runtimeAlias": "a//b"
        }"#;

        let cleaned = remove_json_comments(json);
        assert!(!cleaned.contains("This is"));
        assert!(!cleaned.contains("/*"));
        assert!(cleaned.contains("\"a//b\""));
    }

    #[test]
    fn test_missing_config_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let options = load_options(&workspace(&dir), None).unwrap();
        assert_eq!(options, StylexOptions::default());
    }

    #[test]
    fn test_workspace_config_with_comments() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            "{\n  // project runtime\n  \"importSource\": \"~/lib/stylex\",\n  \"shorthandAttrName\": null\n}\n",
        )
        .unwrap();

        let options = load_options(&workspace(&dir), None).unwrap();
        assert_eq!(options.import_source, "~/lib/stylex");
        assert_eq!(options.shorthand_attr_name, None);
        assert_eq!(options.runtime_alias, "__stylex");
    }

    #[test]
    fn test_explicit_config_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_options(&workspace(&dir), Some(Utf8Path::new("missing.json"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_invalid_config() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("opts.json"), "{\"runtimeAlias\": 3}").unwrap();
        let err = load_options(&workspace(&dir), Some(Utf8Path::new("opts.json"))).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("opts.json"));
    }

    #[test]
    fn test_apply_overrides() {
        let args = Args::parse_from([
            "svelte-stylex-rs",
            "--create-name",
            "inline-css",
            "--shorthand-name",
            "sx",
        ]);
        let options = apply_overrides(StylexOptions::default(), &args);
        assert_eq!(options.create_attribute_name, "inline-css");
        assert_eq!(options.shorthand_attr_name.as_deref(), Some("sx"));
        assert_eq!(options.attrs_attribute_name, "stylex-attrs");

        let args = Args::parse_from(["svelte-stylex-rs", "--no-shorthand"]);
        let options = apply_overrides(StylexOptions::default(), &args);
        assert_eq!(options.shorthand_attr_name, None);
    }

    #[test]
    fn test_default_extensions() {
        let config = SvelteConfig::default();
        assert_eq!(config.file_extensions(), vec![".svelte"]);
    }

    #[test]
    fn test_parse_svelte_config_extensions() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("svelte.config.js"),
            r#"
                import adapter from '@sveltejs/adapter-auto';
                export default {
                    extensions: ['.svelte', '.svx'],
                    kit: { adapter: adapter() }
                };
            "#,
        )
        .unwrap();

        let config = SvelteConfig::load(&workspace(&dir));
        assert_eq!(config.file_extensions(), vec![".svelte", ".svx"]);
    }

    #[test]
    fn test_unparsable_svelte_config_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("svelte.config.js"), "export default {").unwrap();
        let config = SvelteConfig::load(&workspace(&dir));
        assert_eq!(config.file_extensions(), vec![".svelte"]);
    }
}
