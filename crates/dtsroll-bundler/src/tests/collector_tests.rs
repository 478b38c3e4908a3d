use crate::collector::{
    Collection, ReferenceKind, Target, collect, identifier_from_path, resolve_target,
};
use dtsroll_binder::{CompilerOptions, MemoryHost, Program, SemanticModel, SymbolId};

fn load(files: &[(&str, &str)]) -> Program {
    let mut host = MemoryHost::new();
    for (path, text) in files {
        host.add_file(path, text);
    }
    let program = Program::create("/src/index.ts", &CompilerOptions::default(), &host)
        .expect("entry exists");
    assert!(
        program.diagnostics.is_empty(),
        "unexpected diagnostics: {:?}",
        program.diagnostics
    );
    program
}

fn collect_entry(program: &Program) -> Collection {
    let model = SemanticModel::new(program);
    let module = model.module_of_file(program.entry).expect("entry is a module");
    collect(model, &model.exports_of(module))
}

fn name(program: &Program, symbol: SymbolId) -> &str {
    &program.symbol(symbol).expect("symbol").name
}

fn kept_names(program: &Program, collection: &Collection) -> Vec<String> {
    collection
        .kept
        .iter()
        .map(|&symbol| name(program, symbol).to_string())
        .collect()
}

fn entry_export(program: &Program, export: &str) -> SymbolId {
    let model = SemanticModel::new(program);
    let module = model.module_of_file(program.entry).expect("module");
    model.export_named(module, export).expect("export")
}

#[test]
fn test_kept_declarations_follow_discovery_order() {
    let program = load(&[(
        "/src/index.ts",
        "export interface Box { item: Item }\nexport declare function make(): Box;\ninterface Item { id: number }\n",
    )]);
    let collection = collect_entry(&program);
    assert_eq!(kept_names(&program, &collection), vec!["Box", "Item", "make"]);
    assert_eq!(collection.unhandled, 0);
}

#[test]
fn test_references_record_every_use_site() {
    let program = load(&[(
        "/src/index.ts",
        "export interface Box { item: Item; items: Item[] }\nexport declare function make(): Box;\ninterface Item { id: number }\n",
    )]);
    let collection = collect_entry(&program);
    let by_name = |wanted: &str| {
        collection
            .references
            .iter()
            .find(|(symbol, _)| name(&program, **symbol) == wanted)
            .map(|(_, references)| references.len())
            .unwrap_or(0)
    };
    assert_eq!(by_name("Item"), 2);
    assert_eq!(by_name("Box"), 1);
    assert!(
        collection
            .references
            .values()
            .flatten()
            .all(|reference| reference.kind == ReferenceKind::Identifier)
    );
}

#[test]
fn test_type_parameters_are_not_references() {
    let program = load(&[(
        "/src/index.ts",
        "export interface Box<T> { value: T; map<U>(f: (value: T) => U): Box<U> }\n",
    )]);
    let collection = collect_entry(&program);
    assert_eq!(kept_names(&program, &collection), vec!["Box"]);
    // Only the self reference in the return type.
    assert_eq!(collection.references.values().flatten().count(), 1);
}

#[test]
fn test_namespace_members_keep_their_namespace() {
    let program = load(&[(
        "/src/index.ts",
        "export declare function f(): NS.Inner;\ndeclare namespace NS {\n    interface Inner { next: Inner }\n}\n",
    )]);
    let collection = collect_entry(&program);
    assert_eq!(kept_names(&program, &collection), vec!["f", "NS"]);
    // `NS` is referenced from `f`; `Inner` inside `NS` is not a reference.
    let targets: Vec<&str> = collection
        .references
        .keys()
        .map(|&symbol| name(&program, symbol))
        .collect();
    assert_eq!(targets, vec!["NS"]);
}

#[test]
fn test_namespace_import_member_becomes_qualified_reference() {
    let program = load(&[
        (
            "/src/index.ts",
            "import * as m from \"./math\";\nexport declare function area(): typeof m.pi;\n",
        ),
        ("/src/math.ts", "export declare const pi: number;\n"),
    ]);
    let collection = collect_entry(&program);
    assert_eq!(kept_names(&program, &collection), vec!["area", "pi"]);
    assert!(collection.namespaces.is_empty());
    let (target, references) = collection.references.first().expect("one target");
    assert_eq!(name(&program, *target), "pi");
    assert_eq!(references[0].kind, ReferenceKind::QualifiedName);
}

#[test]
fn test_namespace_import_used_whole_is_flattened() {
    let program = load(&[
        (
            "/src/index.ts",
            "import * as m from \"./math\";\nexport declare const all: typeof m;\n",
        ),
        ("/src/math.ts", "export declare const pi: number;\nexport declare const e: number;\n"),
    ]);
    let collection = collect_entry(&program);
    assert_eq!(kept_names(&program, &collection), vec!["all", "pi", "e"]);
    let suggested: Vec<&str> = collection.namespaces.values().map(String::as_str).collect();
    assert_eq!(suggested, vec!["m"]);
}

#[test]
fn test_external_imports_are_deduplicated() {
    let program = load(&[
        (
            "/src/index.ts",
            "import { Dep } from \"dep\";\nimport { wrap } from \"./wrap\";\nexport declare function use(d: Dep): typeof wrap;\n",
        ),
        (
            "/src/wrap.ts",
            "import { Dep } from \"dep\";\nexport declare function wrap(d: Dep): Dep;\n",
        ),
        ("/node_modules/dep/index.d.ts", "export interface Dep { a: number }\n"),
    ]);
    let collection = collect_entry(&program);
    assert_eq!(kept_names(&program, &collection), vec!["use", "wrap"]);
    assert_eq!(collection.externals.len(), 1);
    let import = collection.externals.values().next().expect("import");
    assert_eq!(import.specifier, "dep");
    assert_eq!(import.imported_name.as_deref(), Some("Dep"));
    let packages: Vec<&str> = collection.external_modules.keys().map(String::as_str).collect();
    assert_eq!(packages, vec!["dep"]);
}

#[test]
fn test_unhandled_shape_is_counted_and_siblings_still_walked() {
    let program = load(&[
        (
            "/src/index.ts",
            "export declare namespace N {\n    import x = require(\"lib\");\n    export type T = x.Foo;\n}\n",
        ),
        ("/node_modules/lib/index.d.ts", "export interface Foo { a: number }\n"),
    ]);
    let collection = collect_entry(&program);
    assert_eq!(collection.unhandled, 1);
    assert_eq!(kept_names(&program, &collection), vec!["N"]);
    let import = collection.externals.values().next().expect("sibling reference collected");
    assert_eq!(import.specifier, "lib");
    assert_eq!(collection.references.values().flatten().count(), 1);
}

#[test]
fn test_unresolved_names_are_reserved() {
    let program = load(&[(
        "/src/index.ts",
        "export declare function f(): Promise<Map<string, number>>;\n",
    )]);
    let collection = collect_entry(&program);
    let reserved: Vec<&str> = collection.reserved.iter().map(String::as_str).collect();
    assert_eq!(reserved, vec!["Promise", "Map"]);
    assert!(collection.references.is_empty());
}

#[test]
fn test_overload_implementation_is_not_walked() {
    let program = load(&[(
        "/src/index.ts",
        "export function f(a: string): string;\nexport function f(a: number): number;\nexport function f(a: any): Hidden { return a; }\ninterface Hidden { secret: string }\n",
    )]);
    let collection = collect_entry(&program);
    assert_eq!(kept_names(&program, &collection), vec!["f"]);
}

#[test]
fn test_alias_cycle_collects_nothing() {
    let program = load(&[
        ("/src/index.ts", "export { x } from \"./b\";\n"),
        ("/src/b.ts", "export { x } from \"./index\";\n"),
    ]);
    let collection = collect_entry(&program);
    assert!(collection.kept.is_empty());
    let model = SemanticModel::new(&program);
    assert_eq!(resolve_target(model, entry_export(&program, "x")), None);
}

#[test]
fn test_external_default_import_keeps_local_name() {
    let program = load(&[
        (
            "/src/index.ts",
            "import Lib from \"lib\";\nexport { Lib as Library };\n",
        ),
        (
            "/node_modules/lib/index.d.ts",
            "declare class Lib { run(): void }\nexport default Lib;\n",
        ),
    ]);
    let model = SemanticModel::new(&program);
    let Some(Target::External(import)) = resolve_target(model, entry_export(&program, "Library"))
    else {
        panic!("expected an external target");
    };
    assert_eq!(import.specifier, "lib");
    assert_eq!(import.imported_name.as_deref(), Some("default"));
    assert_eq!(import.local_name.as_deref(), Some("Library"));
    assert_eq!(import.suggested_name(), "Library");
}

#[test]
fn test_identifier_from_path() {
    assert_eq!(identifier_from_path("/src/utils/index.ts"), "utils");
    assert_eq!(identifier_from_path("\"/src/my-lib.d.ts\""), "my_lib");
    assert_eq!(identifier_from_path("@scope/pkg-name"), "pkg_name");
    assert_eq!(identifier_from_path("/src/2d.ts"), "_2d");
}
