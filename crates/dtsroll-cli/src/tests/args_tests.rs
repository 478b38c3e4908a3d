use clap::Parser;
use std::path::{Path, PathBuf};

use crate::args::{CliArgs, ModuleResolution, Target};

#[test]
fn parses_defaults() {
    let args = CliArgs::try_parse_from(["dtsroll"]).expect("default args should parse");

    assert!(args.entry.is_none());
    assert!(args.project.is_none());
    assert!(args.out_file.is_none());
    assert_eq!(args.target, None);
    assert_eq!(args.module_resolution, None);
    assert_eq!(args.allow_js, None);
    assert_eq!(args.pretty, None);
    assert!(!args.stdout);
    assert!(!args.list_files);
    assert!(!args.no_jsdoc);
}

#[test]
fn parses_common_flags() {
    let args = CliArgs::try_parse_from([
        "dtsroll",
        "--project",
        "configs/tsconfig.json",
        "--outFile",
        "dist/index.d.ts",
        "--target",
        "ES2020",
        "--moduleResolution",
        "bundler",
        "--allowJs",
        "false",
        "--stdout",
        "--listFiles",
        "--noJsDoc",
        "src/index.ts",
    ])
    .expect("flagged args should parse");

    assert_eq!(args.entry, Some(PathBuf::from("src/index.ts")));
    assert_eq!(
        args.project.as_deref(),
        Some(Path::new("configs/tsconfig.json"))
    );
    assert_eq!(args.out_file.as_deref(), Some(Path::new("dist/index.d.ts")));
    assert_eq!(args.target, Some(Target::Es2020));
    assert_eq!(args.module_resolution, Some(ModuleResolution::Bundler));
    assert_eq!(args.allow_js, Some(false));
    assert!(args.stdout);
    assert!(args.list_files);
    assert!(args.no_jsdoc);
}

#[test]
fn bare_boolean_flags_mean_true() {
    let args = CliArgs::try_parse_from(["dtsroll", "--pretty", "--allowJs", "-o", "out.d.ts"])
        .expect("bare flags should parse");
    assert_eq!(args.pretty, Some(true));
    assert_eq!(args.allow_js, Some(true));
    assert_eq!(args.out_file.as_deref(), Some(Path::new("out.d.ts")));
}

#[test]
fn accepts_aliases() {
    let args = CliArgs::try_parse_from([
        "dtsroll",
        "--target",
        "es6",
        "--moduleResolution",
        "node",
        "--out-file",
        "x.d.ts",
    ])
    .expect("aliases should parse");
    assert_eq!(args.target, Some(Target::Es2015));
    assert_eq!(args.module_resolution, Some(ModuleResolution::Node10));
}

#[test]
fn rejects_unknown_target() {
    assert!(CliArgs::try_parse_from(["dtsroll", "--target", "es1999"]).is_err());
}
