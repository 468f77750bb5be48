//! Turns element plans into splices and renders the result.

use crate::classify::{AttrsPlan, CreatePlan, Plans};
use crate::expression::{analyze, ExpressionKind};
use crate::options::is_valid_identifier;
use crate::{Context, PreprocessError};
use source_map::{EditBuffer, Rendered};
use svelte_parser::SvelteDocument;

/// Tag used in hoist names when the element name is not an identifier.
const FALLBACK_TAG: &str = "element";

/// A hoisted inline style definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Hoisted<'a> {
    pub name: String,
    /// Source text of the definition.
    pub text: &'a str,
}

/// Applies `plans` to the source and renders it.
///
/// Returns `None` when no element changes. The runtime import is added only
/// when some element is rewritten.
pub(crate) fn emit(
    document: &SvelteDocument,
    plans: &Plans,
    cx: &Context<'_>,
) -> Result<Option<Rendered>, PreprocessError> {
    if !plans.values().any(|plan| plan.edits()) {
        return Ok(None);
    }

    let options = cx.options;
    let mut buffer = EditBuffer::new(cx.source);
    let mut hoisted: Vec<Hoisted<'_>> = Vec::new();

    for plan in plans.values() {
        for span in &plan.removals {
            buffer.remove(*span)?;
        }

        let mut args = match &plan.attrs {
            Some(attrs) => arguments(attrs, cx)?,
            None => Vec::new(),
        };

        if let Some(create) = &plan.create {
            let name = hoist_name(create, cx);
            let index = plan.at.unwrap_or_default().resolve(args.len());
            args.insert(index, format!("{}.{}", options.hoist_var_name, name));
            hoisted.push(Hoisted {
                name,
                text: &create.expression.text,
            });
        }

        let replacement = format!("{{...{}.attrs({})}}", options.runtime_alias, args.join(", "));
        match (&plan.attrs, &plan.create) {
            (Some(attrs), create) => {
                buffer.update(attrs.span, replacement)?;
                if let Some(create) = create {
                    buffer.remove(create.span)?;
                }
            }
            // The create attribute is the anchor: one edit, not remove then update.
            (None, Some(create)) => buffer.update(create.span, replacement)?,
            (None, None) => {}
        }
    }

    if plans.values().any(|plan| plan.rewrites()) {
        let import = import_statement(cx);
        match &document.instance_script {
            Some(script) => {
                buffer.prepend_right(script.content_span.start, &format!("{import}\n"))?
            }
            None => buffer.prepend(&format!("<script>{import}</script>")),
        }
    }

    if !hoisted.is_empty() {
        let declaration = hoist_declaration(&hoisted, cx);
        match &document.module_script {
            Some(script) => {
                buffer.append_left(script.content_span.end, &format!("\n{declaration}\n"))?
            }
            None => buffer.prepend(&format!("<script module>{declaration}</script>")),
        }
    }

    Ok(Some(buffer.render()))
}

/// The argument list an attrs expression contributes.
///
/// Array literals are unwrapped into their elements, holes dropped.
fn arguments(attrs: &AttrsPlan, cx: &Context<'_>) -> Result<Vec<String>, PreprocessError> {
    let kind = analyze(&attrs.expression)
        .map_err(|err| cx.expression_error(&attrs.attribute, err))?;
    Ok(match kind {
        ExpressionKind::Array(elements) => elements
            .into_iter()
            .flatten()
            .map(|span| span.slice(cx.source).to_string())
            .collect(),
        _ => vec![attrs.expression.text.clone()],
    })
}

/// `<tag>$<line>_<column>` of the definition's first character.
pub(crate) fn hoist_name(create: &CreatePlan, cx: &Context<'_>) -> String {
    let tag = if is_valid_identifier(&create.tag) {
        create.tag.as_str()
    } else {
        FALLBACK_TAG
    };
    let location = cx.location(create.expression.span.start);
    format!("{tag}${}_{}", location.line, location.column)
}

fn import_statement(cx: &Context<'_>) -> String {
    format!(
        "import * as {} from {};",
        cx.options.runtime_alias,
        serde_json::Value::from(cx.options.import_source.as_str())
    )
}

fn hoist_declaration(hoisted: &[Hoisted<'_>], cx: &Context<'_>) -> String {
    let entries = hoisted
        .iter()
        .map(|h| format!("{}: {}", serde_json::Value::from(h.name.as_str()), h.text))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "const {} = {}.create({{{entries}}});",
        cx.options.hoist_var_name, cx.options.runtime_alias
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;
    use crate::{Notices, StylexOptions};
    use pretty_assertions::assert_eq;

    fn render(source: &str) -> Option<String> {
        let options = StylexOptions::default();
        let notices = Notices::new();
        let result = svelte_parser::parse(source);
        assert!(result.errors.is_empty(), "{:?}", result.errors);
        let cx = Context::new(source, None, &options, &notices);
        let plans = classify(&result.document.fragment, &cx).unwrap();
        emit(&result.document, &plans, &cx)
            .unwrap()
            .map(|rendered| rendered.code)
    }

    #[test]
    fn test_no_plans_is_none() {
        assert_eq!(render("<div class=\"a\"></div>"), None);
    }

    #[test]
    fn test_lone_position_is_removed_without_import() {
        assert_eq!(
            render("<div stylex-create-at={1}></div>").as_deref(),
            Some("<div ></div>")
        );
        let code = render("<script>let a = 1;</script><i stylex-create-at={Infinity}></i>").unwrap();
        assert_eq!(code, "<script>let a = 1;</script><i ></i>");
    }

    #[test]
    fn test_hoist_name_fallback_tag() {
        let source = "<svelte:element this={t} stylex-create={{a: 1}} />";
        let options = StylexOptions::default();
        let notices = Notices::new();
        let result = svelte_parser::parse(source);
        let cx = Context::new(source, None, &options, &notices);
        let plans = classify(&result.document.fragment, &cx).unwrap();
        let create = plans[0].create.as_ref().unwrap();
        assert_eq!(hoist_name(create, &cx), "element$1_40");
    }

    #[test]
    fn test_hoist_name_uses_line_and_column() {
        let source = "<div>\n  <span\n    stylex-create={{a: 1}}></span></div>";
        let code = render(source).unwrap();
        assert!(code.contains("__styles.span$3_19"), "{code}");
        assert!(code.contains("\"span$3_19\": {a: 1}"), "{code}");
    }

    #[test]
    fn test_hoist_name_counts_utf16_columns() {
        let code = render("<p>é</p><div stylex-create={{a:1}}></div>").unwrap();
        assert!(code.contains("__styles.div$1_28"), "{code}");
        let code = render("<p>😀</p><div stylex-create={{a:1}}></div>").unwrap();
        assert!(code.contains("__styles.div$1_29"), "{code}");
    }

    #[test]
    fn test_both_attrs_and_create() {
        let code = render("<p stylex={[a, b]} stylex-create={{c: 1}}></p>").unwrap();
        assert!(
            code.ends_with("<p {...__stylex.attrs(__styles.p$1_34, a, b)} ></p>"),
            "{code}"
        );
    }

    #[test]
    fn test_position_moves_reference() {
        let code =
            render("<p stylex={[a, b]} stylex-create={{c: 1}} stylex-create-at={Infinity}></p>")
                .unwrap();
        assert!(
            code.ends_with("<p {...__stylex.attrs(a, b, __styles.p$1_34)}  ></p>"),
            "{code}"
        );
    }

    #[test]
    fn test_import_json_escapes_source() {
        let options = StylexOptions {
            import_source: "we\"ird".to_string(),
            ..Default::default()
        };
        let notices = Notices::new();
        let cx = Context::new("", None, &options, &notices);
        assert_eq!(
            import_statement(&cx),
            r#"import * as __stylex from "we\"ird";"#
        );
    }
}
