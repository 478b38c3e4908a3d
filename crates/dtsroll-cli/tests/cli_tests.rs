//! Driver runs against projects on disk.

use clap::Parser;
use dtsroll_cli::args::CliArgs;
use dtsroll_cli::driver::run;
use std::path::Path;

fn write(root: &Path, relative: &str, text: &str) {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().expect("parent")).expect("create dirs");
    std::fs::write(path, text).expect("write file");
}

fn args(list: &[&str]) -> CliArgs {
    CliArgs::try_parse_from(std::iter::once("dtsroll").chain(list.iter().copied()))
        .expect("args parse")
}

#[test]
fn test_writes_bundle_next_to_entry() {
    let dir = tempfile::tempdir().expect("temp dir");
    write(
        dir.path(),
        "src/index.ts",
        "export function add(a: number, b: number): number { return a + b; }\n",
    );

    let result = run(&args(&["src/index.ts"]), dir.path()).expect("run");
    assert!(!result.emit_skipped());
    assert!(result.diagnostics.is_empty());

    let written = result.written.expect("bundle written");
    assert!(written.ends_with("src/bundle.d.ts"));
    let text = std::fs::read_to_string(&written).expect("read bundle");
    assert_eq!(
        text,
        "declare function add(a: number, b: number): number;\nexport { add };\n"
    );
}

#[test]
fn test_stdout_does_not_write() {
    let dir = tempfile::tempdir().expect("temp dir");
    write(dir.path(), "index.ts", "export interface Options { a: string }\n");

    let result = run(&args(&["index.ts", "--stdout"]), dir.path()).expect("run");
    assert!(result.written.is_none());
    assert_eq!(
        result.bundle.as_deref(),
        Some("interface Options {\n    a: string;\n}\nexport { Options };\n")
    );
    assert!(!dir.path().join("bundle.d.ts").exists());
}

#[test]
fn test_unresolved_import_skips_emit() {
    let dir = tempfile::tempdir().expect("temp dir");
    write(
        dir.path(),
        "src/index.ts",
        "import { b } from \"./missing\";\nexport declare const a: typeof b;\n",
    );

    let result = run(&args(&["src/index.ts"]), dir.path()).expect("run");
    assert!(result.emit_skipped());
    assert!(result.written.is_none());
    assert!(result.diagnostics.iter().any(|diagnostic| diagnostic.code == 2307));
    assert!(!dir.path().join("src/bundle.d.ts").exists());
}

#[test]
fn test_tsconfig_out_file_creates_directories() {
    let dir = tempfile::tempdir().expect("temp dir");
    write(
        dir.path(),
        "tsconfig.json",
        r#"{
            // bundled declarations
            "compilerOptions": { "outFile": "dist/types/index.d.ts", },
            "files": ["src/index.ts"],
        }"#,
    );
    write(dir.path(), "src/index.ts", "export * from \"./a\";\n");
    write(dir.path(), "src/a.ts", "export declare const a: number;\n");

    let result = run(&args(&[]), dir.path()).expect("run");
    let written = result.written.expect("bundle written");
    assert!(written.ends_with("dist/types/index.d.ts"));
    let text = std::fs::read_to_string(&written).expect("read bundle");
    assert_eq!(text, "declare const a: number;\nexport { a };\n");
    assert_eq!(result.files_read.len(), 2);
}

#[test]
fn test_declaration_dir_receives_default_name() {
    let dir = tempfile::tempdir().expect("temp dir");
    write(
        dir.path(),
        "tsconfig.json",
        r#"{ "compilerOptions": { "declarationDir": "out" } }"#,
    );
    write(dir.path(), "lib/index.ts", "export type Id = string;\n");

    let result = run(&args(&["lib/index.ts"]), dir.path()).expect("run");
    assert!(dir.path().join("out/bundle.d.ts").is_file());
    assert_eq!(
        result.bundle.as_deref(),
        Some("type Id = string;\nexport { Id };\n")
    );
}

#[test]
fn test_javascript_typedefs_become_types() {
    let dir = tempfile::tempdir().expect("temp dir");
    write(
        dir.path(),
        "src/index.ts",
        "export { Point } from \"./shapes\";\n",
    );
    write(
        dir.path(),
        "src/shapes.js",
        "/**\n * @typedef {Object} Point\n * @property {number} x\n * @property {number} [y]\n */\nexport {};\n",
    );

    let result = run(&args(&["src/index.ts", "--stdout"]), dir.path()).expect("run");
    let text = result.bundle.expect("bundle");
    assert!(text.contains("type Point = {"), "{text}");
    assert!(text.contains("y?: number;"), "{text}");
    assert!(text.ends_with("export { Point };\n"), "{text}");
}
