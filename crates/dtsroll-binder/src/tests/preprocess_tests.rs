use crate::host::{CompilerHost, MemoryHost};
use crate::preprocess::{JsDocTypedefPass, PreprocessedHost, Preprocessor, jsdoc_type_to_ts};

#[test]
fn test_typedef_with_properties_becomes_type_literal() {
    let source = "/**\n * A point.\n * @typedef {Object} Point\n * @property {number} x\n * @property {string} [label]\n */\nexport function f() {}\n";
    let out = Preprocessor::new()
        .with_pass(JsDocTypedefPass)
        .run("/src/a.js", source.to_string());
    assert!(out.starts_with(source));
    assert!(out.contains("/** A point. */\nexport type Point = { x: number; label?: string; };"));
}

#[test]
fn test_typedef_without_properties_uses_type() {
    let source = "/** @typedef {Array.<string>} Names */\n";
    let out = Preprocessor::new()
        .with_pass(JsDocTypedefPass)
        .run("/src/a.js", source.to_string());
    assert!(out.contains("export type Names = Array<string>;"));
}

#[test]
fn test_passes_skip_typed_sources() {
    let source = "/** @typedef {number} N */\n";
    let out = Preprocessor::new()
        .with_pass(JsDocTypedefPass)
        .run("/src/a.ts", source.to_string());
    assert_eq!(out, source);
}

#[test]
fn test_passes_run_in_order() {
    let preprocessor = Preprocessor::new()
        .with_pass(|_: &str, text: &str| format!("{text}1"))
        .with_pass(|_: &str, text: &str| format!("{text}2"));
    assert_eq!(preprocessor.len(), 2);
    assert_eq!(preprocessor.pass_names(), vec!["closure", "closure"]);
    assert_eq!(preprocessor.run("/a.js", String::from("x")), "x12");
}

#[test]
fn test_preprocessed_host_rewrites_reads() {
    let inner = MemoryHost::new().with_file("/a.js", "a");
    let host = PreprocessedHost::new(
        inner,
        Preprocessor::new().with_pass(|_: &str, text: &str| text.to_uppercase()),
    );
    assert!(host.file_exists("/a.js"));
    assert_eq!(host.read_file("/a.js").as_deref(), Some("A"));
    assert_eq!(host.inner().read_file("/a.js").as_deref(), Some("a"));
}

#[test]
fn test_jsdoc_type_to_ts() {
    assert_eq!(jsdoc_type_to_ts("*"), "any");
    assert_eq!(jsdoc_type_to_ts("?"), "unknown");
    assert_eq!(jsdoc_type_to_ts("number="), "number");
    assert_eq!(jsdoc_type_to_ts("?string"), "string | null");
    assert_eq!(jsdoc_type_to_ts("!Object.<string, number>"), "Object<string, number>");
}
