use crate::DeclarationPrinter;
use dtsroll_common::Span;
use dtsroll_parser::{KeywordType, NodeArena, NodeKind, ParserState};

/// Parse `type T = <text>;` and print it back.
fn round_trip(type_text: &str) -> String {
    let source = format!("type T = {type_text};");
    let mut parser = ParserState::new("test.ts".to_string(), source.clone());
    let root = parser.parse_source_file();
    assert!(
        parser.get_diagnostics().is_empty(),
        "unexpected diagnostics for {source}: {:?}",
        parser.get_diagnostics()
    );
    let arena = parser.into_arena();
    let text = DeclarationPrinter::new(&arena).print_source_file(root);
    text.trim_end()
        .strip_prefix("type T = ")
        .and_then(|rest| rest.strip_suffix(';'))
        .map(str::to_string)
        .unwrap_or(text)
}

#[test]
fn test_types_print_as_written() {
    for ty in [
        "string | number[]",
        "(string | number)[]",
        "keyof typeof obj",
        "T[K]",
        "A.B.C<D>",
        "unique symbol",
        "readonly string[]",
        "{}",
        "{ a: string; b(): void; }",
        "{ readonly [K in keyof T]?: T[K]; }",
        "{ -readonly [K in keyof T as `get${K & string}`]-?: () => T[K]; }",
        "T extends (infer U)[] ? U : never",
        "[a: string, b?: number, ...rest: boolean[]]",
        "[string, number?, ...boolean[]]",
        "new (x: number) => Foo",
        "abstract new () => object",
        "<T>(x: T, y?: string) => void",
        "import(\"./m\").Foo<string>",
        "typeof import(\"./m\")",
        "`prefix-${string}-suffix`",
        "-1 | 10n | true | null",
        "this",
    ] {
        assert_eq!(round_trip(ty), ty);
    }
}

#[test]
fn test_string_literal_types_are_double_quoted() {
    assert_eq!(round_trip("'a' | \"b\""), "\"a\" | \"b\"");
}

#[test]
fn test_type_predicates() {
    let source = "declare function isStr(x: unknown): x is string;\ndeclare function check(v: unknown): asserts v;";
    let mut parser = ParserState::new("test.ts".to_string(), source.to_string());
    let root = parser.parse_source_file();
    let arena = parser.into_arena();
    assert_eq!(
        DeclarationPrinter::new(&arena).print_source_file(root),
        format!("{source}\n")
    );
}

#[test]
fn test_synthesized_operands_are_parenthesized() {
    let mut arena = NodeArena::new();
    let span = Span::default();
    let string = arena.add(
        NodeKind::KeywordType {
            keyword: KeywordType::String,
        },
        span,
    );
    let number = arena.add(
        NodeKind::KeywordType {
            keyword: KeywordType::Number,
        },
        span,
    );
    let union = arena.add(
        NodeKind::UnionType {
            types: vec![string, number],
        },
        span,
    );
    let array = arena.add(NodeKind::ArrayType { element_type: union }, span);
    let function = arena.add(
        NodeKind::FunctionType {
            type_parameters: Vec::new(),
            parameters: Vec::new(),
            return_type: string,
        },
        span,
    );
    let outer = arena.add(
        NodeKind::UnionType {
            types: vec![function, number],
        },
        span,
    );

    let mut printer = DeclarationPrinter::new(&arena);
    assert_eq!(printer.print_type(array), "(string | number)[]");
    assert_eq!(printer.print_type(outer), "(() => string) | number");
}
