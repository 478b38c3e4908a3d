use crate::host::MemoryHost;
use crate::module_resolver::{
    ExternalModuleEntry, ModuleResolver, PackageExports, ResolutionFailure,
    external_entry_for_path, is_relative_specifier, mangle_scoped_package_name,
    parse_package_specifier,
};
use dtsroll_common::diagnostics::diagnostic_codes;
use dtsroll_common::{ModuleResolutionKind, Span};

fn resolve(
    host: &MemoryHost,
    kind: ModuleResolutionKind,
    specifier: &str,
    from: &str,
) -> Result<String, ResolutionFailure> {
    let mut resolver = ModuleResolver::new(kind, true);
    resolver
        .resolve(specifier, from, Span::new(0, 0), host)
        .map(|module| module.resolved_path)
}

#[test]
fn test_relative_specifier_tries_extensions() {
    let host = MemoryHost::new()
        .with_file("/src/a.ts", "")
        .with_file("/src/b.d.ts", "")
        .with_file("/src/dir/index.ts", "");
    let kind = ModuleResolutionKind::Node10;
    assert_eq!(resolve(&host, kind, "./a", "/src/index.ts").as_deref(), Ok("/src/a.ts"));
    assert_eq!(resolve(&host, kind, "./b", "/src/index.ts").as_deref(), Ok("/src/b.d.ts"));
    assert_eq!(
        resolve(&host, kind, "./dir", "/src/index.ts").as_deref(),
        Ok("/src/dir/index.ts")
    );
}

#[test]
fn test_js_extension_maps_to_typescript_source() {
    let host = MemoryHost::new().with_file("/src/a.ts", "");
    assert_eq!(
        resolve(&host, ModuleResolutionKind::Node10, "./a.js", "/src/index.ts").as_deref(),
        Ok("/src/a.ts")
    );
}

#[test]
fn test_missing_relative_module_reports_2307() {
    let host = MemoryHost::new();
    let failure = resolve(&host, ModuleResolutionKind::Node10, "./missing", "/src/index.ts")
        .expect_err("nothing on disk");
    assert!(failure.is_not_found());
    assert_eq!(failure.specifier(), "./missing");
    let diag = failure.to_diagnostic();
    assert_eq!(diag.code, diagnostic_codes::CANNOT_FIND_MODULE);
    assert_eq!(diag.file, "/src/index.ts");
}

#[test]
fn test_node_modules_types_field() {
    let host = MemoryHost::new()
        .with_file(
            "/node_modules/pkg/package.json",
            r#"{ "name": "pkg", "types": "dist/main.d.ts" }"#,
        )
        .with_file("/node_modules/pkg/dist/main.d.ts", "");
    let mut resolver = ModuleResolver::new(ModuleResolutionKind::Node10, false);
    let module = resolver
        .resolve("pkg", "/src/deep/index.ts", Span::new(0, 0), &host)
        .expect("resolves through node_modules");
    assert_eq!(module.resolved_path, "/node_modules/pkg/dist/main.d.ts");
    assert!(module.is_external);
    assert_eq!(module.package_name.as_deref(), Some("pkg"));
    assert_eq!(module.subpath, None);
}

#[test]
fn test_types_package_fallback_for_scoped_names() {
    let host = MemoryHost::new().with_file("/node_modules/@types/scope__lib/index.d.ts", "");
    assert_eq!(
        resolve(&host, ModuleResolutionKind::Node10, "@scope/lib", "/src/index.ts").as_deref(),
        Ok("/node_modules/@types/scope__lib/index.d.ts")
    );
}

#[test]
fn test_bundler_reads_exports_map() {
    let host = MemoryHost::new()
        .with_file(
            "/node_modules/pkg/package.json",
            r#"{ "exports": { ".": { "types": "./types/root.d.ts" }, "./sub": { "types": "./types/sub.d.ts" } } }"#,
        )
        .with_file("/node_modules/pkg/types/root.d.ts", "")
        .with_file("/node_modules/pkg/types/sub.d.ts", "")
        .with_file("/node_modules/pkg/index.d.ts", "");
    assert_eq!(
        resolve(&host, ModuleResolutionKind::Bundler, "pkg", "/src/index.ts").as_deref(),
        Ok("/node_modules/pkg/types/root.d.ts")
    );
    assert_eq!(
        resolve(&host, ModuleResolutionKind::Bundler, "pkg/sub", "/src/index.ts").as_deref(),
        Ok("/node_modules/pkg/types/sub.d.ts")
    );
    // Node10 ignores `exports`
    assert_eq!(
        resolve(&host, ModuleResolutionKind::Node10, "pkg", "/src/index.ts").as_deref(),
        Ok("/node_modules/pkg/index.d.ts")
    );
}

#[test]
fn test_classic_walks_ancestors() {
    let host = MemoryHost::new().with_file("/project/shared.d.ts", "");
    assert_eq!(
        resolve(&host, ModuleResolutionKind::Classic, "shared", "/project/src/a/index.ts")
            .as_deref(),
        Ok("/project/shared.d.ts")
    );
}

#[test]
fn test_resolution_is_cached_per_directory() {
    let mut host = MemoryHost::new().with_file("/src/a.ts", "");
    let mut resolver = ModuleResolver::new(ModuleResolutionKind::Node10, false);
    let first = resolver.resolve("./a", "/src/x.ts", Span::new(0, 0), &host);
    assert!(first.is_ok());
    host.add_file("/src/a.d.ts", "");
    let second = resolver.resolve("./a", "/src/y.ts", Span::new(0, 0), &host);
    assert_eq!(first, second);
}

#[test]
fn test_package_specifier_helpers() {
    assert_eq!(parse_package_specifier("lodash"), ("lodash".to_string(), None));
    assert_eq!(
        parse_package_specifier("lodash/fp"),
        ("lodash".to_string(), Some("fp".to_string()))
    );
    assert_eq!(
        parse_package_specifier("@scope/pkg/sub/path"),
        ("@scope/pkg".to_string(), Some("sub/path".to_string()))
    );
    assert_eq!(mangle_scoped_package_name("@scope/pkg"), "scope__pkg");
    assert!(is_relative_specifier("../x"));
    assert!(!is_relative_specifier("x"));
}

#[test]
fn test_external_entry_for_path() {
    assert_eq!(
        external_entry_for_path("/node_modules/pkg/index.d.ts"),
        Some(ExternalModuleEntry::new("pkg", None))
    );
    assert_eq!(
        external_entry_for_path("/node_modules/@types/scope__pkg/lib/util.d.ts"),
        Some(ExternalModuleEntry::new("@scope/pkg", Some("lib/util".to_string())))
    );
    assert_eq!(external_entry_for_path("/src/index.ts"), None);
    assert_eq!(
        ExternalModuleEntry::new("@scope/pkg", Some("lib/util".to_string())).specifier(),
        "@scope/pkg/lib/util"
    );
}

#[test]
fn test_exports_conditions_follow_map_order() {
    let exports: PackageExports = serde_json::from_str(
        r#"{ "require": "./cjs.js", "import": "./esm.js", "types": "./types.d.ts" }"#,
    )
    .expect("valid exports");
    assert_eq!(exports.resolve("."), Some("./esm.js"));
    assert_eq!(exports.resolve("./sub"), None);
}
