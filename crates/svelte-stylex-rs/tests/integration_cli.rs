//! End-to-end tests of the command-line tool.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

const REWRITTEN: &str = "<div {...__stylex.attrs(s.a)}></div>";

/// A temporary project with a few components.
fn project() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "src/App.svelte", "<div stylex={s.a}></div>");
    write(dir.path(), "src/Plain.svelte", "<div class=\"plain\"></div>");
    write(
        dir.path(),
        "node_modules/lib/Button.svelte",
        "<button stylex={s.b}></button>",
    );
    dir
}

fn write(root: &Path, path: &str, content: &str) {
    let path = root.join(path);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn run(workspace: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_svelte-stylex-rs"))
        .arg("--workspace")
        .arg(workspace)
        .args(args)
        .output()
        .expect("Failed to execute svelte-stylex-rs")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

#[test]
fn test_out_dir_mirrors_rewritten_files() {
    let dir = project();
    let out = dir.path().join("build");
    let output = run(dir.path(), &["--out-dir", out.to_str().unwrap()]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let code = fs::read_to_string(out.join("src/App.svelte")).unwrap();
    assert!(code.contains("import * as __stylex from \"@stylexjs/stylex\";"));
    assert!(code.ends_with(REWRITTEN));

    // No-op files and ignored directories are not written.
    assert!(!out.join("src/Plain.svelte").exists());
    assert!(!out.join("node_modules").exists());

    let report = stdout(&output);
    assert!(report.contains("src/App.svelte -> build/src/App.svelte"));
    assert!(report.contains("svelte-stylex rewrote 1 file (1 unchanged) with 0 errors in 2 files"));
}

#[test]
fn test_errors_fail_the_run_without_stopping_it() {
    let dir = project();
    write(dir.path(), "src/Broken.svelte", "<div stylex={s.a}>");
    let out = dir.path().join("build");
    let output = run(dir.path(), &["--out-dir", out.to_str().unwrap()]);

    assert_eq!(output.status.code(), Some(1));
    assert!(out.join("src/App.svelte").exists());
    assert!(!out.join("src/Broken.svelte").exists());

    let report = stdout(&output);
    assert!(report.contains("src/Broken.svelte\nError: src/Broken.svelte:"));
    assert!(report.contains("with 1 error in 3 files"));
}

#[test]
fn test_write_in_place_with_source_map() {
    let dir = project();
    let output = run(dir.path(), &["--write", "--source-map"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let app = dir.path().join("src/App.svelte");
    assert!(fs::read_to_string(&app).unwrap().ends_with(REWRITTEN));
    assert_eq!(
        fs::read_to_string(dir.path().join("src/Plain.svelte")).unwrap(),
        "<div class=\"plain\"></div>"
    );

    let map = fs::read_to_string(dir.path().join("src/App.svelte.map")).unwrap();
    let map: serde_json::Value = serde_json::from_str(&map).unwrap();
    assert_eq!(map["version"], 3);
    assert_eq!(map["sources"][0], "src/App.svelte");
    assert_eq!(map["sourcesContent"][0], "<div stylex={s.a}></div>");

    // A second pass finds nothing left to rewrite.
    let output = run(dir.path(), &["--write"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("rewrote 0 files (2 unchanged)"));
}

#[test]
fn test_stdout_mode() {
    let dir = project();
    let output = run(dir.path(), &["src/App.svelte"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).ends_with(REWRITTEN));
    assert!(stderr(&output).contains("rewrote 1 file (0 unchanged)"));
    assert_eq!(
        fs::read_to_string(dir.path().join("src/App.svelte")).unwrap(),
        "<div stylex={s.a}></div>"
    );
}

#[test]
fn test_json_output() {
    let dir = project();
    let output = run(dir.path(), &["--output", "json"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let files = value["files"].as_array().unwrap();
    assert_eq!(files.len(), 2);
    assert_eq!(files[0]["filename"], "src/App.svelte");
    assert_eq!(files[0]["status"], "rewritten");
    assert!(files[0]["code"].as_str().unwrap().ends_with(REWRITTEN));
    assert_eq!(files[1]["status"], "unchanged");
    assert_eq!(value["summary"]["rewritten_count"], 1);
}

#[test]
fn test_config_file_with_comments() {
    let dir = project();
    write(
        dir.path(),
        "stylex.config.json",
        "{\n  // shared runtime\n  \"importSource\": \"~/stylex\",\n  \"runtimeAlias\": \"sx\"\n}\n",
    );
    let output = run(dir.path(), &["src/App.svelte"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let code = stdout(&output);
    assert!(code.contains("import * as sx from \"~/stylex\";"));
    assert!(code.ends_with("<div {...sx.attrs(s.a)}></div>"));
}

#[test]
fn test_invalid_options_abort() {
    let dir = project();
    let output = run(dir.path(), &["--runtime-alias", "not valid"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("runtimeAlias"));
}
