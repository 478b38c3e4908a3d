//! Parser integration tests: declaration statements, the type grammar and
//! error recovery.

use dtsroll_parser::{
    BindingKey, KeywordType, ModifierFlags, ModuleDeclarationKind, NodeArena, NodeIndex, NodeKind,
    ParserState,
};

fn parse(source: &str) -> (NodeArena, NodeIndex, Vec<u32>) {
    let mut parser = ParserState::new("test.ts".to_string(), source.to_string());
    let root = parser.parse_source_file();
    let codes = parser.get_diagnostics().iter().map(|d| d.code).collect();
    (parser.into_arena(), root, codes)
}

fn statements(arena: &NodeArena, root: NodeIndex) -> Vec<NodeIndex> {
    match arena.kind(root) {
        Some(NodeKind::SourceFile { statements, .. }) => statements.clone(),
        other => panic!("expected source file, got {other:?}"),
    }
}

fn parse_clean(source: &str) -> (NodeArena, Vec<NodeIndex>) {
    let (arena, root, codes) = parse(source);
    assert!(codes.is_empty(), "unexpected diagnostics {codes:?} for {source}");
    let stmts = statements(&arena, root);
    (arena, stmts)
}

#[test]
fn parses_function_declaration_signature() {
    let (arena, stmts) = parse_clean("export function add(a: number, b: number): number { return a + b; }");
    assert_eq!(stmts.len(), 1);
    match arena.kind(stmts[0]) {
        Some(NodeKind::FunctionDeclaration {
            modifiers,
            name,
            parameters,
            has_body,
            ..
        }) => {
            assert!(modifiers.contains(ModifierFlags::EXPORT));
            assert_eq!(arena.identifier_text(*name), Some("add"));
            assert_eq!(parameters.len(), 2);
            assert!(*has_body);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn marks_modules_by_import_or_export() {
    let (arena, root, _) = parse("declare const x: number;");
    assert!(matches!(
        arena.kind(root),
        Some(NodeKind::SourceFile {
            is_external_module: false,
            ..
        })
    ));
    let (arena, root, _) = parse("export {};");
    assert!(matches!(
        arena.kind(root),
        Some(NodeKind::SourceFile {
            is_external_module: true,
            ..
        })
    ));
    let (arena, root, _) = parse("declare module \"m\" {\n    export const y: number;\n}");
    assert!(matches!(
        arena.kind(root),
        Some(NodeKind::SourceFile {
            is_external_module: false,
            ..
        })
    ));
}

#[test]
fn parses_import_forms() {
    let (arena, stmts) = parse_clean(
        r#"
import def, { a, b as c, type D } from "./a";
import * as ns from "./b";
import type { E } from "./c";
import "./side-effect";
import fs = require("fs");
"#,
    );
    assert_eq!(stmts.len(), 5);
    assert!(matches!(
        arena.kind(stmts[4]),
        Some(NodeKind::ImportEqualsDeclaration { .. })
    ));
    let Some(NodeKind::ImportDeclaration { import_clause, .. }) = arena.kind(stmts[2]) else {
        panic!("expected import declaration");
    };
    assert!(matches!(
        arena.kind(*import_clause),
        Some(NodeKind::ImportClause {
            is_type_only: true,
            ..
        })
    ));
}

#[test]
fn parses_export_forms() {
    let (arena, stmts) = parse_clean(
        r#"
export * from "./a";
export * as ns from "./b";
export { x, y as z } from "./c";
export { local as default };
export type { T } from "./d";
export default class {}
export = Foo;
"#,
    );
    assert_eq!(stmts.len(), 7);
    let Some(NodeKind::ExportDeclaration { export_clause, .. }) = arena.kind(stmts[1]) else {
        panic!("expected export declaration");
    };
    assert!(matches!(
        arena.kind(*export_clause),
        Some(NodeKind::NamespaceExport { .. })
    ));
    match arena.kind(stmts[5]) {
        Some(NodeKind::ClassDeclaration { modifiers, name, .. }) => {
            assert!(modifiers.contains(ModifierFlags::DEFAULT));
            assert!(name.is_none());
        }
        other => panic!("unexpected {other:?}"),
    }
    assert!(matches!(
        arena.kind(stmts[6]),
        Some(NodeKind::ExportAssignment {
            is_export_equals: true,
            ..
        })
    ));
}

#[test]
fn parses_class_members() {
    let (arena, stmts) = parse_clean(
        r#"
export abstract class Shape<T extends object = {}> extends Base<T> implements A, B.C {
    static readonly count: number = 0;
    private secret;
    protected abstract area(): number;
    constructor(public readonly name: string, size?: number);
    constructor(name: string, size = 1) { super(); }
    get size(): number { return 1; }
    set size(value: number) {}
    [key: string]: unknown;
    #hidden = 1;
    method<U>(this: Shape<T>, ...rest: U[]): void {}
}
"#,
    );
    let Some(NodeKind::ClassDeclaration {
        modifiers,
        heritage_clauses,
        members,
        type_parameters,
        ..
    }) = arena.kind(stmts[0])
    else {
        panic!("expected class");
    };
    assert!(modifiers.contains(ModifierFlags::ABSTRACT | ModifierFlags::EXPORT));
    assert_eq!(type_parameters.len(), 1);
    assert_eq!(heritage_clauses.len(), 2);
    assert_eq!(members.len(), 10);
    assert!(matches!(
        arena.kind(members[7]),
        Some(NodeKind::IndexSignature { .. })
    ));
}

#[test]
fn parses_interface_and_type_members() {
    let (arena, stmts) = parse_clean(
        r#"
interface Api extends Base {
    (x: number): string;
    new (x: string): Api;
    readonly prop?: string,
    method?<T>(arg: T): T;
    get value(): number;
    [index: number]: string;
}
"#,
    );
    let Some(NodeKind::InterfaceDeclaration { members, .. }) = arena.kind(stmts[0]) else {
        panic!("expected interface");
    };
    assert_eq!(members.len(), 6);
    assert!(matches!(
        arena.kind(members[0]),
        Some(NodeKind::CallSignature { .. })
    ));
    assert!(matches!(
        arena.kind(members[1]),
        Some(NodeKind::ConstructSignature { .. })
    ));
}

#[test]
fn parses_complex_types_without_errors() {
    parse_clean(
        r#"
type A = { [K in keyof O as `get${Capitalize<K & string>}`]-?: O[K] } & Partial<{ a: string; b: number }>;
type B<T> = T extends [infer H extends string, ...infer R] ? H : never;
type C = typeof import("./mod").value;
type D = import("./mod").Ns.Inner<string>;
type E = (a: string, b?: number) => void;
type F = abstract new (...args: any[]) => object;
type G = readonly [x: number, y?: string, ...rest: boolean[]];
type H = unique symbol;
type I = -1 | 1n | "s" | true | null | undefined;
type J = Array<Array<number>>;
declare function isString(x: unknown): x is string;
declare function assert(x: unknown): asserts x;
declare function assertIs(x: unknown): asserts x is number;
"#,
    );
}

#[test]
fn parses_conditional_type_structure() {
    let (arena, stmts) = parse_clean("type T<X> = X extends string ? 's' : X extends number ? 'n' : 'o';");
    let Some(NodeKind::TypeAliasDeclaration { type_node, .. }) = arena.kind(stmts[0]) else {
        panic!("expected type alias");
    };
    let Some(NodeKind::ConditionalType { false_type, .. }) = arena.kind(*type_node) else {
        panic!("expected conditional type");
    };
    assert!(matches!(
        arena.kind(*false_type),
        Some(NodeKind::ConditionalType { .. })
    ));
}

#[test]
fn parses_namespaces_and_ambient_modules() {
    let (arena, stmts) = parse_clean(
        r#"
declare namespace A.B { const x: number; }
declare module "pkg" { export function f(): void; }
declare module "shorthand";
declare global { interface Window { foo: string } }
"#,
    );
    assert_eq!(stmts.len(), 4);
    let Some(NodeKind::ModuleDeclaration { body, .. }) = arena.kind(stmts[0]) else {
        panic!("expected namespace");
    };
    assert!(matches!(
        arena.kind(*body),
        Some(NodeKind::ModuleDeclaration { .. })
    ));
    assert!(matches!(
        arena.kind(stmts[2]),
        Some(NodeKind::ModuleDeclaration { body, .. }) if body.is_none()
    ));
    assert!(matches!(
        arena.kind(stmts[3]),
        Some(NodeKind::ModuleDeclaration {
            kind: ModuleDeclarationKind::Global,
            ..
        })
    ));
}

#[test]
fn skips_javascript_statements() {
    let (arena, stmts) = parse_clean(
        r#"
const re = /[}]+/g;
if (re.test("x")) { console.log(`}${1}`); }
for (let i = 0; i < 10; i++) {}
export function run(opts) { return opts; }
module.exports = {};
"#,
    );
    let functions = stmts
        .iter()
        .filter(|s| matches!(arena.kind(**s), Some(NodeKind::FunctionDeclaration { .. })))
        .count();
    assert_eq!(functions, 1);
}

#[test]
fn keeps_simple_initializers_as_literals() {
    let (arena, stmts) = parse_clean("export const a = 1, b = 'x', c = -2, d = foo(), e = true;");
    let Some(NodeKind::VariableStatement { declarations, .. }) = arena.kind(stmts[0]) else {
        panic!("expected variable statement");
    };
    let initializer = |i: usize| match arena.kind(declarations[i]) {
        Some(NodeKind::VariableDeclaration { initializer, .. }) => arena.kind(*initializer).cloned(),
        _ => None,
    };
    assert!(matches!(initializer(0), Some(NodeKind::NumericLiteral { .. })));
    assert!(matches!(initializer(1), Some(NodeKind::StringLiteral { .. })));
    assert_eq!(
        initializer(2),
        Some(NodeKind::NumericLiteral {
            text: "-2".to_string()
        })
    );
    assert!(matches!(initializer(3), Some(NodeKind::OpaqueExpression { .. })));
    assert!(matches!(initializer(4), Some(NodeKind::BooleanLiteral { value: true })));
}

#[test]
fn attaches_jsdoc_to_declarations() {
    let (arena, stmts) = parse_clean(
        "/** Adds numbers. */\nexport function add(a: number): number;\ninterface I {\n    /** The x. */\n    x: number;\n}",
    );
    assert_eq!(arena.jsdoc(stmts[0]), Some("/** Adds numbers. */"));
    let Some(NodeKind::InterfaceDeclaration { members, .. }) = arena.kind(stmts[1]) else {
        panic!("expected interface");
    };
    assert_eq!(arena.jsdoc(members[0]), Some("/** The x. */"));
}

#[test]
fn keyword_types_parse_to_keywords() {
    let (arena, stmts) = parse_clean("type T = string;");
    let Some(NodeKind::TypeAliasDeclaration { type_node, .. }) = arena.kind(stmts[0]) else {
        panic!("expected type alias");
    };
    assert_eq!(
        arena.kind(*type_node),
        Some(&NodeKind::KeywordType {
            keyword: KeywordType::String
        })
    );
}

#[test]
fn reports_syntax_errors_without_panicking() {
    let (_, _, codes) = parse("type T = <;");
    assert!(!codes.is_empty());
    let (_, _, codes) = parse("declare function (): void;");
    assert!(codes.contains(&1003));
    let (_, _, codes) = parse("/** never closed");
    assert!(codes.contains(&1010));
}

#[test]
fn deeply_nested_types_hit_the_depth_limit() {
    let depth = 400;
    let source = format!("type T = {}number{};", "Array<".repeat(depth), ">".repeat(depth));
    let codes = std::thread::Builder::new()
        .stack_size(64 * 1024 * 1024)
        .spawn(move || parse(&source).2)
        .unwrap()
        .join()
        .unwrap();
    assert!(codes.contains(&2589));
}

#[test]
fn parent_links_are_set() {
    let (arena, stmts) = parse_clean("type T = Foo.Bar;");
    let Some(NodeKind::TypeAliasDeclaration { type_node, .. }) = arena.kind(stmts[0]) else {
        panic!("expected type alias");
    };
    assert_eq!(arena.parent(*type_node), stmts[0]);
}

/// Binding elements of the first declarator's pattern, by bound name.
fn binding_elements(arena: &NodeArena, statement: NodeIndex) -> Vec<(String, NodeIndex)> {
    let Some(NodeKind::VariableStatement { declarations, .. }) = arena.kind(statement) else {
        panic!("expected variable statement");
    };
    (0..arena.len() as u32)
        .map(NodeIndex)
        .filter(|&node| arena.binding_root(node) == declarations[0])
        .filter_map(|node| match arena.kind(node) {
            Some(NodeKind::BindingElement { name, .. }) => {
                Some((arena.identifier_text(*name)?.to_string(), node))
            }
            _ => None,
        })
        .collect()
}

#[test]
fn parses_destructuring_declarations() {
    let (arena, stmts) =
        parse_clean("export const { a, b: [first, , third], ...rest } = { a: 1, b: [true, null, 'x'] };");
    let Some(NodeKind::VariableStatement { declarations, .. }) = arena.kind(stmts[0]) else {
        panic!("expected variable statement");
    };
    let Some(NodeKind::VariableDeclaration {
        name, initializer, ..
    }) = arena.kind(declarations[0])
    else {
        panic!("expected declarator");
    };
    assert!(matches!(arena.kind(*name), Some(NodeKind::ObjectBindingPattern { elements }) if elements.len() == 3));
    assert!(matches!(
        arena.kind(*initializer),
        Some(NodeKind::ObjectLiteralExpression { properties }) if properties.len() == 2
    ));

    let elements = binding_elements(&arena, stmts[0]);
    let names: Vec<&str> = elements.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, ["a", "first", "third", "rest"]);
    let path = |name: &str| {
        let node = elements.iter().find(|(n, _)| n == name).map(|(_, node)| *node);
        node.and_then(|node| arena.binding_path(node))
    };
    assert_eq!(path("a"), Some(vec![BindingKey::Property("a".to_string())]));
    assert_eq!(
        path("third"),
        Some(vec![BindingKey::Property("b".to_string()), BindingKey::Index(2)])
    );
    assert_eq!(path("rest"), None);
}

#[test]
fn non_literal_object_initializers_stay_opaque() {
    let (arena, stmts) = parse_clean("const [x] = [make()], { y } = { y: () => 1 };");
    let Some(NodeKind::VariableStatement { declarations, .. }) = arena.kind(stmts[0]) else {
        panic!("expected variable statement");
    };
    for &declaration in declarations {
        let Some(NodeKind::VariableDeclaration { initializer, .. }) = arena.kind(declaration) else {
            panic!("expected declarator");
        };
        assert!(matches!(arena.kind(*initializer), Some(NodeKind::OpaqueExpression { .. })));
    }
}
