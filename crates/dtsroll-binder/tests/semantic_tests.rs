//! Semantic model queries: exports, alias resolution, declared types and
//! symbol origins.

use dtsroll_binder::{
    CompilerOptions, DeclaredType, FileOrigin, MemoryHost, Program, SemanticModel, SymbolFlags,
    SymbolId,
};
use dtsroll_parser::{BindingKey, KeywordType, NodeKind};

fn load_with(files: &[(&str, &str)], options: &CompilerOptions) -> Program {
    let mut host = MemoryHost::new();
    for (path, text) in files {
        host.add_file(path, text);
    }
    let program = Program::create("/src/index.ts", options, &host).expect("entry exists");
    assert!(
        program.diagnostics.is_empty(),
        "unexpected diagnostics: {:?}",
        program.diagnostics
    );
    program
}

fn load(files: &[(&str, &str)]) -> Program {
    load_with(files, &CompilerOptions::default())
}

fn module_of(model: &SemanticModel<'_>, path: &str) -> SymbolId {
    let file = model.program().file_by_path(path).expect("file loaded");
    model.module_of_file(file.id).expect("external module")
}

fn export(model: &SemanticModel<'_>, path: &str, name: &str) -> SymbolId {
    model
        .export_named(module_of(model, path), name)
        .unwrap_or_else(|| panic!("{path} exports {name}"))
}

fn export_names(model: &SemanticModel<'_>, module: SymbolId) -> Vec<String> {
    model
        .exports_of(module)
        .into_iter()
        .map(|export| export.name)
        .collect()
}

#[test]
fn test_exports_include_star_reexports_in_order() {
    let program = load(&[
        (
            "/src/index.ts",
            "export * from \"./a\";\nexport * from \"./b\";\nexport const z = 0;\n",
        ),
        ("/src/a.ts", "export const a = 1;\nexport default 1;\n"),
        ("/src/b.ts", "export const b = 2;\nexport const a = 3;\n"),
    ]);
    let model = SemanticModel::new(&program);
    let index = module_of(&model, "/src/index.ts");
    assert_eq!(export_names(&model, index), vec!["z", "a", "b"]);
    // first `export *` wins
    let a = model.export_named(index, "a").expect("a");
    assert_eq!(Some(a), model.export_named(module_of(&model, "/src/a.ts"), "a"));
    assert_eq!(model.export_named(index, "default"), None);
}

#[test]
fn test_resolve_alias_follows_reexport_chain() {
    let program = load(&[
        ("/src/index.ts", "export { x as y } from \"./b\";\n"),
        ("/src/b.ts", "export { x } from \"./c\";\n"),
        ("/src/c.ts", "export interface x { value: string }\n"),
    ]);
    let model = SemanticModel::new(&program);
    let y = export(&model, "/src/index.ts", "y");
    let hop = model.alias_target_of(y).expect("one hop");
    assert!(model.symbol(hop).expect("symbol").is_alias());
    let target = model.resolve_alias(y).expect("resolves");
    let symbol = model.symbol(target).expect("symbol");
    assert_eq!(symbol.name, "x");
    assert!(symbol.has_flags(SymbolFlags::INTERFACE));
    assert_eq!(target, export(&model, "/src/c.ts", "x"));
}

#[test]
fn test_alias_cycle_resolves_to_none() {
    let program = load(&[
        ("/src/index.ts", "export { x } from \"./b\";\n"),
        ("/src/b.ts", "export { x } from \"./index\";\n"),
    ]);
    let model = SemanticModel::new(&program);
    let x = export(&model, "/src/index.ts", "x");
    assert_eq!(model.resolve_alias(x), None);
}

#[test]
fn test_default_import_of_export_equals_module() {
    let program = load(&[
        ("/src/index.ts", "import lib from \"./lib\";\nexport { lib };\n"),
        ("/src/lib.d.ts", "declare function lib(): void;\nexport = lib;\n"),
    ]);
    let model = SemanticModel::new(&program);
    let exported = export(&model, "/src/index.ts", "lib");
    let target = model.resolve_alias(exported).expect("resolves");
    let symbol = model.symbol(target).expect("symbol");
    assert!(symbol.has_flags(SymbolFlags::FUNCTION));
    assert_eq!(model.origin_of(target), FileOrigin::Local);
}

#[test]
fn test_namespace_import_resolves_to_module() {
    let program = load(&[
        ("/src/index.ts", "import * as m from \"./math\";\nexport { m };\n"),
        ("/src/math.ts", "export declare const pi: number;\n"),
    ]);
    let model = SemanticModel::new(&program);
    let m = export(&model, "/src/index.ts", "m");
    let target = model.resolve_alias(m).expect("resolves");
    assert_eq!(target, module_of(&model, "/src/math.ts"));
    assert!(model.symbol(target).expect("symbol").is_module());
    assert_eq!(model.member_of(m, "pi"), model.export_named(target, "pi"));
}

#[test]
fn test_type_of_literal_initializers() {
    let program = load(&[(
        "/src/index.ts",
        "export const a = \"x\";\nexport let b = 1;\nexport const c: number = 3;\nexport const n = null;\nexport let u = undefined;\nexport default 42;\n",
    )]);
    let model = SemanticModel::new(&program);
    let type_of = |name: &str| {
        let symbol = export(&model, "/src/index.ts", name);
        model.type_of(model.declarations_of(symbol)[0])
    };
    assert_eq!(type_of("a"), DeclaredType::Literal("\"x\"".to_string()));
    assert_eq!(type_of("b"), DeclaredType::Keyword(KeywordType::Number));
    assert_eq!(type_of("n"), DeclaredType::Keyword(KeywordType::Null));
    assert_eq!(type_of("u"), DeclaredType::Keyword(KeywordType::Any));
    assert_eq!(type_of("default"), DeclaredType::Literal("42".to_string()));
    let DeclaredType::Annotation(annotation) = type_of("c") else {
        panic!("annotated");
    };
    assert!(matches!(
        model.node(annotation).map(|node| &node.kind),
        Some(NodeKind::KeywordType {
            keyword: KeywordType::Number
        })
    ));
}

#[test]
fn test_destructured_names_bind_and_take_member_types() {
    let program = load(&[(
        "/src/index.ts",
        "export const { a, b: [first], c = 'x', ...rest } = { a: 1, b: [true] };\ninterface Point { p: number }\ndeclare const origin: Point;\nexport const { p }: Point = origin;\n",
    )]);
    let model = SemanticModel::new(&program);
    assert_eq!(
        export_names(&model, module_of(&model, "/src/index.ts")),
        ["a", "first", "c", "rest", "p"]
    );
    let type_of = |name: &str| {
        let symbol = export(&model, "/src/index.ts", name);
        assert!(model.symbol(symbol).is_some_and(|data| data.has_flags(SymbolFlags::BLOCK_SCOPED_VARIABLE)));
        model.type_of(model.declarations_of(symbol)[0])
    };
    assert_eq!(type_of("a"), DeclaredType::Keyword(KeywordType::Number));
    assert_eq!(type_of("first"), DeclaredType::Keyword(KeywordType::Boolean));
    assert_eq!(type_of("c"), DeclaredType::Keyword(KeywordType::String));
    assert_eq!(type_of("rest"), DeclaredType::Unknown);
    let DeclaredType::Member { annotation, path } = type_of("p") else {
        panic!("member of the annotation");
    };
    assert_eq!(path, vec![BindingKey::Property("p".to_string())]);
    assert!(matches!(
        model.node(annotation).map(|node| &node.kind),
        Some(NodeKind::TypeReference { .. })
    ));
}

#[test]
fn test_enum_members_keep_literal_types() {
    let program = load(&[(
        "/src/index.ts",
        "export enum E { A = 1, B = \"b\", C }\n",
    )]);
    let model = SemanticModel::new(&program);
    let e = export(&model, "/src/index.ts", "E");
    let member_type = |name: &str| {
        let member = model.member_of(e, name).expect("member");
        model.type_of(model.declarations_of(member)[0])
    };
    assert_eq!(member_type("A"), DeclaredType::Literal("1".to_string()));
    assert_eq!(member_type("B"), DeclaredType::Literal("\"b\"".to_string()));
    assert_eq!(member_type("C"), DeclaredType::Unknown);
}

#[test]
fn test_import_equals_qualified_name() {
    let program = load(&[(
        "/src/index.ts",
        "namespace NS {\n    export namespace Inner {\n        export interface T {}\n    }\n}\nimport X = NS.Inner;\nexport type U = X.T;\n",
    )]);
    let model = SemanticModel::new(&program);
    let index = module_of(&model, "/src/index.ts");
    let x = model
        .symbol(index)
        .and_then(|symbol| symbol.locals.get("X"))
        .expect("import alias");
    let inner = model.resolve_alias(x).expect("resolves");
    assert_eq!(model.symbol(inner).expect("symbol").name, "Inner");
    let t = model.member_of(x, "T").expect("member");
    let ns = model
        .symbol(index)
        .and_then(|symbol| symbol.locals.get("NS"))
        .expect("namespace");
    assert_eq!(model.top_level_container_of(t), Some(ns));
    assert_eq!(model.top_level_container_of(ns), None);
}

#[test]
fn test_interfaces_merge_declarations() {
    let program = load(&[(
        "/src/index.ts",
        "export interface A { x: number }\nexport interface A { y: string }\n",
    )]);
    let model = SemanticModel::new(&program);
    let a = export(&model, "/src/index.ts", "A");
    assert_eq!(model.declarations_of(a).len(), 2);
}

#[test]
fn test_origins_and_external_entries() {
    let options = CompilerOptions::default().with_files(["/types/virtual.d.ts"]);
    let program = load_with(
        &[
            (
                "/src/index.ts",
                "import { Dep } from \"dep/sub\";\nimport { V } from \"virtual\";\nexport declare function f(d: Dep, v: V): void;\ndeclare global {\n    interface Window { app: string }\n}\n",
            ),
            ("/node_modules/dep/sub.d.ts", "export interface Dep { a: number }\n"),
            (
                "/types/virtual.d.ts",
                "declare module \"virtual\" {\n    export interface V { a: string }\n}\n",
            ),
        ],
        &options,
    );
    let model = SemanticModel::new(&program);
    let index = module_of(&model, "/src/index.ts");
    let local = |name: &str| {
        model
            .symbol(index)
            .and_then(|symbol| symbol.locals.get(name))
            .expect("local")
    };

    let dep = model.resolve_alias(local("Dep")).expect("dep");
    assert_eq!(model.origin_of(dep), FileOrigin::External);
    let entry = model.external_entry_of(dep).expect("package");
    assert_eq!(entry.specifier(), "dep/sub");

    let v = model.resolve_alias(local("V")).expect("virtual");
    assert_eq!(model.origin_of(v), FileOrigin::External);
    assert_eq!(
        model.external_entry_of(v).map(|entry| entry.specifier()),
        Some("virtual".to_string())
    );

    let window = program.globals.get("Window").expect("global");
    assert_eq!(model.origin_of(window), FileOrigin::Ambient);
    assert_eq!(model.origin_of(local("f")), FileOrigin::Local);
}

#[test]
fn test_import_type_resolves_qualifier() {
    let program = load(&[
        (
            "/src/index.ts",
            "export declare const c: import(\"./lib\").NS.Item;\n",
        ),
        (
            "/src/lib.ts",
            "export declare namespace NS {\n    interface Item { id: number }\n}\n",
        ),
    ]);
    let model = SemanticModel::new(&program);
    let file = program.entry_file().expect("entry");
    let import_type = file
        .arena
        .nodes
        .iter()
        .position(|node| matches!(node.kind, NodeKind::ImportType { .. }))
        .expect("import type node");
    let node = dtsroll_binder::NodeRef::new(file.id, dtsroll_parser::NodeIndex(import_type as u32));
    let item = model.resolve_import_type(node).expect("resolves");
    assert_eq!(model.symbol(item).expect("symbol").name, "Item");
}
