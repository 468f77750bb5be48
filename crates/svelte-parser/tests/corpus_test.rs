//! Corpus tests that parse all fixture files to ensure no panics
//! and that valid fixtures produce no errors.

use std::fs;
use std::path::PathBuf;
use svelte_parser::{parse, Attribute, TemplateNode};

fn get_fixtures_dir() -> PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    PathBuf::from(manifest_dir)
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("test-fixtures")
}

fn collect_svelte_files(dir: &std::path::Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    if let Ok(entries) = fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "svelte") {
                files.push(path);
            } else if path.is_dir() {
                files.extend(collect_svelte_files(&path));
            }
        }
    }
    files.sort();
    files
}

#[test]
fn test_parse_all_valid_fixtures() {
    let fixtures_dir = get_fixtures_dir().join("valid");
    let files = collect_svelte_files(&fixtures_dir);

    assert!(!files.is_empty(), "No valid fixtures found");

    for path in &files {
        let source = fs::read_to_string(path).expect("Failed to read file");
        let filename = path.file_name().unwrap().to_string_lossy();

        let result = parse(&source);

        assert!(
            result.errors.is_empty(),
            "Valid fixture {} should have no errors, but got: {:?}",
            filename,
            result.errors
        );
        assert!(
            !result.document.fragment.nodes.is_empty(),
            "Valid fixture {} should produce some markup",
            filename
        );
    }
}

#[test]
fn test_parse_all_invalid_fixtures() {
    let fixtures_dir = get_fixtures_dir().join("invalid");
    let files = collect_svelte_files(&fixtures_dir);

    for path in &files {
        let source = fs::read_to_string(path).expect("Failed to read file");
        let filename = path.file_name().unwrap().to_string_lossy();

        let result = parse(&source);
        assert!(
            !result.errors.is_empty(),
            "Invalid fixture {} should produce errors",
            filename
        );
    }
}

#[test]
fn test_spans_slice_back_to_source() {
    let path = get_fixtures_dir().join("valid").join("Card.svelte");
    let source = fs::read_to_string(path).expect("Failed to read file");
    let result = parse(&source);

    let mut stack: Vec<&TemplateNode> = result.document.fragment.nodes.iter().collect();
    let mut checked = 0;
    while let Some(node) = stack.pop() {
        let span = node.span();
        assert!(span.end <= result.document.span.end);

        if let TemplateNode::Element(el) = node {
            assert!(span.slice(&source).starts_with(&format!("<{}", el.name)));
            for attribute in &el.attributes {
                let text = attribute.span().slice(&source);
                match attribute {
                    Attribute::Normal(attr) => assert!(text.starts_with(attr.name.as_str())),
                    Attribute::Spread(_) => assert!(text.starts_with("{...")),
                    Attribute::Shorthand(attr) => assert_eq!(text, format!("{{{}}}", attr.name())),
                    Attribute::Directive(_) | Attribute::Attach(_) => {}
                }
                checked += 1;
            }
        }

        for fragment in node.fragments() {
            stack.extend(fragment.nodes.iter());
        }
    }
    assert!(checked > 0);
}

#[test]
fn test_edge_cases() {
    // None of these may panic.
    let edge_cases = [
        "",
        "   ",
        "<div>",
        "{#if",
        "<!-- comment",
        "{expression",
        "<div attr=",
        "<div attr=\"",
        "{#each items}",
        "{#await}",
        "<div {",
        "{/if}",
        "{:else}",
        "<",
        "<div a={`${`}",
        "<p>é</",
    ];

    for source in edge_cases {
        let _result = parse(source);
    }
}

#[test]
fn test_invalid_syntax_produces_errors() {
    let invalid_cases: &[(&str, &str)] = &[
        ("<div>", "unclosed tag"),
        ("<div></span>", "mismatched closing tag"),
        ("{expression", "unclosed expression"),
        ("<div attr=\"unclosed>", "unclosed attribute quote"),
        ("{#if true}<p>test</p>", "unclosed if block"),
        ("{#each items as item}<li>test</li>", "unclosed each block"),
        ("{#await promise}<p>loading</p>", "unclosed await block"),
        ("{#key id}<div>test</div>", "unclosed key block"),
        ("{#if a}{/each}", "wrong block close"),
        ("{#nope}", "unknown block"),
    ];

    for (source, description) in invalid_cases {
        let result = parse(source);
        assert!(
            !result.errors.is_empty(),
            "expected an error for {} ({})",
            description,
            source
        );
    }
}

#[test]
fn test_error_messages() {
    insta::assert_snapshot!(parse("<div>").errors[0].to_string(), @"unclosed tag: <div>");
    insta::assert_snapshot!(
        parse("{#key id}").errors[0].to_string(),
        @"unclosed block: {#key}"
    );
}

#[test]
fn test_stress_deeply_nested() {
    let mut source = String::new();
    for _ in 0..50 {
        source.push_str("{#if true}<div>");
    }
    source.push_str("<p>deep</p>");
    for _ in 0..50 {
        source.push_str("</div>{/if}");
    }

    let result = parse(&source);
    assert!(
        result.errors.is_empty(),
        "Deep nesting should parse: {:?}",
        result.errors
    );
}

#[test]
fn test_stress_many_siblings() {
    let mut source = String::new();
    for i in 0..100 {
        source.push_str(&format!("<div id=\"{}\">content</div>", i));
    }

    let result = parse(&source);
    assert!(result.errors.is_empty());
    assert_eq!(result.document.fragment.nodes.len(), 100);
}
