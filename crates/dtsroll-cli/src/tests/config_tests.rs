use clap::Parser;
use dtsroll_common::{ModuleResolutionKind, ScriptTarget};
use std::path::Path;

use crate::args::CliArgs;
use crate::config::{find_tsconfig, load_tsconfig, parse_tsconfig, resolve_config};
use crate::fs::host_path;

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
fn parses_comments_and_trailing_commas() {
    let config = parse_tsconfig(
        r#"{
            // line comment
            "compilerOptions": {
                /* block */ "target": "es2020",
                "allowJs": "false",
                "outFile": "dist/index.d.ts",
            },
            "files": ["src/index.ts",],
        }"#,
    )
    .expect("tsconfig parses");
    let options = config.compiler_options.expect("compilerOptions");
    assert_eq!(options.target.as_deref(), Some("es2020"));
    assert_eq!(options.allow_js, Some(false));
    assert_eq!(options.out_file.as_deref(), Some("dist/index.d.ts"));
    assert_eq!(config.files, Some(vec!["src/index.ts".to_string()]));
}

#[test]
fn comment_markers_inside_strings_are_kept() {
    let config = parse_tsconfig(r#"{ "files": ["src//a.ts", "b/*.ts"] }"#).expect("parses");
    assert_eq!(
        config.files,
        Some(vec!["src//a.ts".to_string(), "b/*.ts".to_string()])
    );
}

#[test]
fn rejects_bad_boolean_strings() {
    assert!(parse_tsconfig(r#"{ "compilerOptions": { "allowJs": "maybe" } }"#).is_err());
}

#[test]
fn finds_tsconfig_in_ancestors() {
    let dir = tempfile::tempdir().expect("temp dir");
    write(dir.path(), "tsconfig.json", "{}");
    write(dir.path(), "src/deep/index.ts", "export {};");
    let found = find_tsconfig(&dir.path().join("src/deep")).expect("found");
    assert_eq!(found, dir.path().join("tsconfig.json"));
}

#[test]
fn extends_merges_and_anchors_paths() {
    let dir = tempfile::tempdir().expect("temp dir");
    write(
        dir.path(),
        "base/base.json",
        r#"{ "compilerOptions": { "target": "es5", "declarationDir": "types" } }"#,
    );
    write(
        dir.path(),
        "tsconfig.json",
        r#"{ "extends": "./base/base", "compilerOptions": { "target": "es2022" } }"#,
    );
    let config = load_tsconfig(&dir.path().join("tsconfig.json")).expect("loads");
    let options = config.compiler_options.expect("options");
    assert_eq!(options.target.as_deref(), Some("es2022"));
    assert_eq!(
        options.declaration_dir,
        Some(host_path(dir.path(), Path::new("base/types")))
    );
}

#[test]
fn extends_cycle_is_an_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    write(dir.path(), "a.json", r#"{ "extends": "./b.json" }"#);
    write(dir.path(), "b.json", r#"{ "extends": "./a.json" }"#);
    assert!(load_tsconfig(&dir.path().join("a.json")).is_err());
}

#[test]
fn entry_and_output_come_from_tsconfig() {
    let dir = tempfile::tempdir().expect("temp dir");
    write(
        dir.path(),
        "tsconfig.json",
        r#"{
            "compilerOptions": { "moduleResolution": "bundler", "declarationDir": "types" },
            "files": ["src/index.ts", "src/globals.d.ts"]
        }"#,
    );
    let resolved = resolve_config(&args(&[]), dir.path()).expect("resolves");
    assert_eq!(resolved.entry, host_path(dir.path(), Path::new("src/index.ts")));
    assert_eq!(
        resolved.options.files,
        vec![host_path(dir.path(), Path::new("src/globals.d.ts"))]
    );
    assert_eq!(resolved.options.module_resolution, ModuleResolutionKind::Bundler);
    assert_eq!(
        resolved.output,
        Path::new(&host_path(dir.path(), Path::new("types"))).join("bundle.d.ts")
    );
    assert!(resolved.preserve_jsdoc);
}

#[test]
fn command_line_overrides_tsconfig() {
    let dir = tempfile::tempdir().expect("temp dir");
    write(
        dir.path(),
        "tsconfig.json",
        r#"{ "compilerOptions": { "target": "es5", "allowJs": true, "outFile": "a.d.ts" } }"#,
    );
    let resolved = resolve_config(
        &args(&["src/main.ts", "--target", "esnext", "--allowJs", "false", "-o", "out/b.d.ts", "--noJsDoc"]),
        dir.path(),
    )
    .expect("resolves");
    assert_eq!(resolved.entry, host_path(dir.path(), Path::new("src/main.ts")));
    assert_eq!(resolved.options.target, ScriptTarget::ESNext);
    assert!(!resolved.options.allow_js);
    assert_eq!(
        resolved.output,
        Path::new(&host_path(dir.path(), Path::new("out/b.d.ts")))
    );
    assert!(!resolved.preserve_jsdoc);
    assert_eq!(
        resolved.config_path.as_deref(),
        Some(dir.path().join("tsconfig.json").as_path())
    );
}

#[test]
fn default_output_sits_next_to_the_entry() {
    let dir = tempfile::tempdir().expect("temp dir");
    let resolved = resolve_config(&args(&["lib/index.ts"]), dir.path()).expect("resolves");
    assert_eq!(
        resolved.output,
        Path::new(&host_path(dir.path(), Path::new("lib"))).join("bundle.d.ts")
    );
}

#[test]
fn missing_entry_is_an_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    write(dir.path(), "tsconfig.json", "{}");
    let err = resolve_config(&args(&[]), dir.path()).expect_err("no entry");
    assert!(err.to_string().contains("no entry file"), "{err}");
}

#[test]
fn explicit_project_must_exist() {
    let dir = tempfile::tempdir().expect("temp dir");
    assert!(resolve_config(&args(&["x.ts", "-p", "nope"]), dir.path()).is_err());
}
