//! The `gloss` binary as pandoc runs it: JSON in on stdin, JSON out on stdout.

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

use serde_json::{Value, json};

fn janet_grammar() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../assets/janet.tmLanguage.json")
}

fn gloss(args: &[&str], stdin: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_gloss"))
        .args(args)
        .env_remove("GLOSS_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    // The process may exit before reading stdin; a broken pipe is fine then.
    let _ = child.stdin.take().unwrap().write_all(stdin.as_bytes());
    child.wait_with_output().unwrap()
}

fn document(blocks: Value) -> String {
    json!({ "pandoc-api-version": [1, 23, 1], "meta": {}, "blocks": blocks }).to_string()
}

#[test]
fn test_filters_document() {
    let grammar = janet_grammar();
    let input = document(json!([
        { "t": "CodeBlock", "c": [["", ["janet"], []], "(print 1)"] },
        { "t": "Para", "c": [] },
    ]));
    let out = gloss(&["html", "--grammar", grammar.to_str().unwrap()], &input);

    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    let doc: Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(doc["blocks"][0]["t"], "RawBlock");
    assert_eq!(doc["blocks"][0]["c"][0], "html");
    assert_eq!(doc["blocks"][1], json!({ "t": "Para", "c": [] }));
    assert_eq!(doc["pandoc-api-version"], json!([1, 23, 1]));
}

#[test]
fn test_unknown_language_writes_nothing() {
    let grammar = janet_grammar();
    let input = document(json!([
        { "t": "CodeBlock", "c": [["", ["klingon"], []], "Qapla'"] },
    ]));
    let out = gloss(&["--grammar", grammar.to_str().unwrap()], &input);

    assert!(!out.status.success());
    assert!(out.stdout.is_empty());
    assert!(String::from_utf8_lossy(&out.stderr).contains("klingon"));
}

#[test]
fn test_missing_grammar_fails_before_reading() {
    let out = gloss(&["--grammar", "/no/such/grammar.json"], "");

    assert!(!out.status.success());
    assert!(out.stdout.is_empty());
    assert!(String::from_utf8_lossy(&out.stderr).contains("grammar"));
}

#[test]
fn test_invalid_json_fails() {
    let grammar = janet_grammar();
    let out = gloss(&["--grammar", grammar.to_str().unwrap()], "{ nope");

    assert!(!out.status.success());
    assert!(out.stdout.is_empty());
}

#[test]
fn test_help_prints_usage() {
    let out = gloss(&["--help"], "");

    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    let help = String::from_utf8_lossy(&out.stdout);
    assert!(help.contains("grammar"), "{help}");
    assert!(help.contains("parallel"), "{help}");
}
