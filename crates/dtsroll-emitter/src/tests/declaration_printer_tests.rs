use crate::{DeclarationPrinter, PrinterOptions};
use dtsroll_parser::{NodeArena, NodeIndex, NodeKind, ParserState};

fn parse(source: &str) -> (NodeArena, NodeIndex) {
    let mut parser = ParserState::new("test.ts".to_string(), source.to_string());
    let root = parser.parse_source_file();
    assert!(
        parser.get_diagnostics().is_empty(),
        "unexpected diagnostics for {source}: {:?}",
        parser.get_diagnostics()
    );
    (parser.into_arena(), root)
}

fn print(source: &str) -> String {
    let (arena, root) = parse(source);
    DeclarationPrinter::new(&arena).print_source_file(root)
}

#[test]
fn test_function_declaration_drops_body() {
    assert_eq!(
        print("export function add(a: number, b: number): number { return a + b; }"),
        "export function add(a: number, b: number): number;\n"
    );
    assert_eq!(
        print("declare function add(a: number, b: number): number;"),
        "declare function add(a: number, b: number): number;\n"
    );
}

#[test]
fn test_destructuring_pattern_prints_without_defaults() {
    assert_eq!(
        print("declare const { a, b: [c, , ...d], e = 1 }: T;"),
        "declare const { a, b: [c, , ...d], e }: T;\n"
    );
}

#[test]
fn test_parameter_initializer_becomes_optional() {
    assert_eq!(
        print("function f(a = 1, ...rest: string[]) {}"),
        "function f(a?, ...rest: string[]);\n"
    );
}

#[test]
fn test_anonymous_default_function() {
    assert_eq!(
        print("export default function (a: number): void {}"),
        "export default function (a: number): void;\n"
    );
}

#[test]
fn test_class_members() {
    let source = r#"
export class Calculator {
    private value: number = 0;
    constructor(public readonly name: string, private seed?: number) {}
    add(n: number): this { return this; }
    static create(): Calculator { return new Calculator(""); }
    get total(): number { return 0; }
    #secret = 1;
}
"#;
    assert_eq!(
        print(source),
        "export class Calculator {\n    #private;\n    private value;\n    readonly name: string;\n    private seed?;\n    constructor(name: string, seed?: number);\n    add(n: number): this;\n    static create(): Calculator;\n    get total(): number;\n}\n"
    );
}

#[test]
fn test_empty_class() {
    assert_eq!(print("declare class A {}"), "declare class A {\n}\n");
}

#[test]
fn test_abstract_class() {
    let source = "export abstract class Shape {\n    abstract area(): number;\n    protected static count: number;\n}";
    assert_eq!(
        print(source),
        "export abstract class Shape {\n    abstract area(): number;\n    protected static count: number;\n}\n"
    );
}

#[test]
fn test_method_overloads_hide_implementation() {
    let source = r#"
declare class Parser {
    parse(text: string): string;
    parse(text: number): number;
    parse(text: any): any { return text; }
}
export function f(a: string): string;
export function f(a: number): number;
export function f(a: any) { return a; }
"#;
    assert_eq!(
        print(source),
        "declare class Parser {\n    parse(text: string): string;\n    parse(text: number): number;\n}\nexport function f(a: string): string;\nexport function f(a: number): number;\n"
    );
}

#[test]
fn test_interface_members() {
    let source = "interface Box<T extends object = {}> extends Base<T>, Other {\n    readonly value: T;\n    find?(key: string): T | undefined;\n    (x: number): string;\n    new (x: number): Box<T>;\n    [key: string]: unknown;\n}";
    assert_eq!(
        print(source),
        "interface Box<T extends object = {}> extends Base<T>, Other {\n    readonly value: T;\n    find?(key: string): T | undefined;\n    (x: number): string;\n    new (x: number): Box<T>;\n    [key: string]: unknown;\n}\n"
    );
}

#[test]
fn test_enum_members() {
    assert_eq!(
        print("export const enum Color { Red = 1, Green = \"g\", Blue }"),
        "export const enum Color {\n    Red = 1,\n    Green = \"g\",\n    Blue\n}\n"
    );
}

#[test]
fn test_variable_statements() {
    assert_eq!(
        print("export const a = 1, b: string = \"x\", c = foo();"),
        "export const a = 1, b: string, c;\n"
    );
    assert_eq!(print("let x = 1;"), "let x;\n");
}

#[test]
fn test_module_declarations() {
    assert_eq!(
        print("declare namespace A.B {\n    const x: number;\n    function f(): void;\n}"),
        "declare namespace A.B {\n    const x: number;\n    function f(): void;\n}\n"
    );
    assert_eq!(print("declare module \"foo\";"), "declare module \"foo\";\n");
    assert_eq!(
        print("declare global {\n    interface Window {\n        x: number;\n    }\n}"),
        "declare global {\n    interface Window {\n        x: number;\n    }\n}\n"
    );
}

#[test]
fn test_import_forms() {
    for source in [
        "import def, { a, b as c, type D } from \"./mod\";",
        "import * as ns from \"ns\";",
        "import type { T } from \"t\";",
        "import \"side\";",
        "import fs = require(\"fs\");",
        "export import X = A.B;",
    ] {
        assert_eq!(print(source), format!("{source}\n"));
    }
}

#[test]
fn test_export_forms() {
    for source in [
        "export { a, b as c };",
        "export * from \"./x\";",
        "export * as ns from \"./x\";",
        "export type { T } from \"./t\";",
        "export {};",
        "export = Foo;",
        "export default foo;",
        "export as namespace Lib;",
    ] {
        assert_eq!(print(source), format!("{source}\n"));
    }
}

#[test]
fn test_opaque_statements_print_nothing() {
    assert_eq!(print("console.log(1);\ndeclare const x: number;"), "declare const x: number;\n");
}

#[test]
fn test_jsdoc_is_preserved() {
    let source = "/**\n * Adds.\n * @param a first\n */\nexport function add(a: number): number;";
    assert_eq!(print(source), format!("{source}\n"));

    let nested = "interface I {\n    /** The x. */\n    x: number;\n}";
    assert_eq!(print(nested), format!("{nested}\n"));
}

#[test]
fn test_jsdoc_can_be_dropped() {
    let (arena, root) = parse("/** Adds. */\nexport function add(a: number): number;");
    let options = PrinterOptions {
        preserve_jsdoc: false,
    };
    let text = DeclarationPrinter::with_options(&arena, options).print_source_file(root);
    assert_eq!(text, "export function add(a: number): number;\n");
}

#[test]
fn test_print_statement_has_no_trailing_newline() {
    let (arena, root) = parse("declare class A {}");
    let Some(NodeKind::SourceFile { statements, .. }) = arena.kind(root) else {
        panic!("expected source file");
    };
    let mut printer = DeclarationPrinter::new(&arena);
    assert_eq!(printer.print_statement(statements[0]), "declare class A {\n}");
    // The printer is reusable across statements.
    assert_eq!(printer.print_statement(statements[0]), "declare class A {\n}");
}
