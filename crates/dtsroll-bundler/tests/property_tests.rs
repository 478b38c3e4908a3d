//! Invariants that hold for every bundle: unique top-level names,
//! consistent references, idempotent naming, bounded alias walks and
//! deduplicated external imports.

use dtsroll_binder::semantic::entity_name_parts;
use dtsroll_binder::{CompilerOptions, MemoryHost, Program, SemanticModel};
use dtsroll_bundler::{BundleOptions, BundleOutput, NameOwner, ReferenceKind, bundle_program};
use rustc_hash::FxHashMap;

fn load(files: &[(String, String)]) -> Program {
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

fn owned(files: &[(&str, &str)]) -> Vec<(String, String)> {
    files
        .iter()
        .map(|(path, text)| (path.to_string(), text.to_string()))
        .collect()
}

fn run(program: &Program) -> BundleOutput {
    bundle_program(program, &BundleOptions::default()).expect("bundles")
}

/// Three modules that each declare `Item` and `make`, plus an ambient name
/// that must stay free.
fn colliding_project() -> Vec<(String, String)> {
    owned(&[
        (
            "/src/index.ts",
            "import { make as makeA } from \"./a\";\nimport { make as makeB } from \"./b\";\ninterface Item { own: boolean }\nexport declare function make(): Item;\nexport { makeA, makeB };\nexport declare function wait(): Promise<Item>;\n",
        ),
        (
            "/src/a.ts",
            "interface Item { a: number }\nexport declare function make(): Item;\n",
        ),
        (
            "/src/b.ts",
            "interface Item { b: string }\ninterface Promise { fake: true }\nexport declare function make(p: Promise): Item;\n",
        ),
    ])
}

#[test]
fn test_kept_symbols_have_distinct_names() {
    let program = load(&colliding_project());
    let output = run(&program);
    let mut owners: FxHashMap<&str, _> = FxHashMap::default();
    for &symbol in &output.collection.kept {
        let name = output.renames.name_of(symbol).expect("kept symbol is named");
        if let Some(previous) = owners.insert(name, symbol) {
            panic!("{name} is owned by {previous:?} and {symbol:?}");
        }
    }
    assert_eq!(owners.len(), output.collection.kept.len());
    // The ambient `Promise` keeps its name; the local one is renamed.
    assert_eq!(output.renames.table.owner_of("Promise"), Some(NameOwner::Reserved));
    assert!(output.text.contains("interface Promise_1 {"), "{}", output.text);
    assert!(output.text.contains("Promise<Item>"), "{}", output.text);
}

#[test]
fn test_references_match_final_names() {
    let program = load(&colliding_project());
    let output = run(&program);
    let model = SemanticModel::new(&program);
    let mut checked = 0;
    for (&target, references) in &output.collection.references {
        let expected = output.renames.text_of(model, target).expect("target is named");
        for reference in references {
            if matches!(reference.kind, ReferenceKind::ImportType { .. }) {
                continue;
            }
            let copy = output.tree.copy_of(reference.node).expect("reference copied");
            let written: Vec<&str> = entity_name_parts(&output.tree.arena, copy)
                .into_iter()
                .filter_map(|part| output.tree.arena.identifier_text(part))
                .collect();
            assert_eq!(written.join("."), expected);
            checked += 1;
        }
    }
    assert!(checked >= 4, "only {checked} references checked");
}

#[test]
fn test_renaming_is_idempotent() {
    let program = load(&colliding_project());
    let mut output = run(&program);
    let kept = output.collection.kept.clone();
    for symbol in kept {
        let before = output.renames.name_of(symbol).expect("named").to_string();
        assert_eq!(output.renames.table.assign_name(symbol, "Other"), before);
        assert_eq!(output.renames.table.assign_name(symbol, &before), before);
    }
}

#[test]
fn test_alias_chains_flatten_to_one_declaration() {
    for hops in 1..=12 {
        let mut files = vec![(
            "/src/index.ts".to_string(),
            "export { x0 as y } from \"./m0\";\n".to_string(),
        )];
        for i in 0..hops {
            files.push((
                format!("/src/m{i}.ts"),
                format!("export {{ x{} as x{i} }} from \"./m{}\";\n", i + 1, i + 1),
            ));
        }
        files.push((
            format!("/src/m{hops}.ts"),
            format!("export interface x{hops} {{ v: number }}\n"),
        ));
        let program = load(&files);
        let output = run(&program);
        assert_eq!(output.collection.kept.len(), 1, "{hops} hops");
        assert_eq!(
            output.text,
            format!("interface x{hops} {{\n    v: number;\n}}\nexport {{ x{hops} as y }};\n"),
            "{hops} hops"
        );
    }
}

#[test]
fn test_self_and_mutual_references_terminate() {
    let program = load(&owned(&[(
        "/src/index.ts",
        "export declare class A implements I1 {\n    clone(): A;\n}\ninterface I1 { next: I2 }\ninterface I2 extends I1 { prev: I1 }\n",
    )]));
    let output = run(&program);
    assert_eq!(output.collection.kept.len(), 3);
    for needle in ["declare class A ", "interface I1 {", "interface I2 extends I1 {"] {
        assert_eq!(output.text.matches(needle).count(), 1, "{needle} in:\n{}", output.text);
    }
    assert!(output.text.contains("clone(): A;"));
}

#[test]
fn test_shared_external_symbol_is_imported_once() {
    let program = load(&owned(&[
        (
            "/src/index.ts",
            "import { Foo } from \"lib\";\nimport { Bar } from \"./bar\";\nexport declare function foo(): Foo;\nexport { Bar };\n",
        ),
        (
            "/src/bar.ts",
            "import { Foo } from \"lib\";\nexport interface Bar { foo: Foo }\n",
        ),
        ("/node_modules/lib/index.d.ts", "export interface Foo { id: number }\n"),
    ]));
    let output = run(&program);
    assert_eq!(output.collection.externals.len(), 1);
    let imports: Vec<&str> = output
        .text
        .lines()
        .filter(|line| line.starts_with("import "))
        .collect();
    assert_eq!(imports, vec!["import { Foo } from \"lib\";"]);
}
