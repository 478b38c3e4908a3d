use crate::collector::collect;
use crate::working_tree::WorkingTree;
use dtsroll_binder::{CompilerOptions, MemoryHost, NodeRef, Program, SemanticModel, SymbolId};
use dtsroll_parser::{KeywordType, NodeIndex, NodeKind, VariableKind};

fn load(text: &str) -> Program {
    let host = MemoryHost::new().with_file("/src/index.ts", text);
    let program = Program::create("/src/index.ts", &CompilerOptions::default(), &host)
        .expect("entry exists");
    assert!(
        program.diagnostics.is_empty(),
        "unexpected diagnostics: {:?}",
        program.diagnostics
    );
    program
}

fn build(program: &Program) -> WorkingTree {
    let model = SemanticModel::new(program);
    let module = model.module_of_file(program.entry).expect("module");
    let collection = collect(model, &model.exports_of(module));
    WorkingTree::build(model, &collection)
}

fn kept(program: &Program, tree: &WorkingTree, name: &str) -> SymbolId {
    tree.statements
        .keys()
        .copied()
        .find(|&symbol| program.symbol(symbol).is_some_and(|data| data.name == name))
        .unwrap_or_else(|| panic!("{name} is kept"))
}

fn only_statement(program: &Program, tree: &WorkingTree, name: &str) -> NodeIndex {
    let statements = tree.statements_of(kept(program, tree, name));
    assert_eq!(statements.len(), 1, "{name} has one statement");
    statements[0]
}

fn declarator(tree: &WorkingTree, statement: NodeIndex) -> NodeIndex {
    match tree.arena.kind(statement) {
        Some(NodeKind::VariableStatement { declarations, .. }) => {
            assert_eq!(declarations.len(), 1);
            declarations[0]
        }
        other => panic!("expected a variable statement, got {other:?}"),
    }
}

#[test]
fn test_declarators_get_their_own_statements() {
    let program = load("export let a = 1, b: string = \"s\";\n");
    let tree = build(&program);
    let a = only_statement(&program, &tree, "a");
    let b = only_statement(&program, &tree, "b");
    assert_ne!(a, b);
    // Both copies point back at the shared original statement.
    assert_eq!(tree.original_of(a), tree.original_of(b));
    let declarator_b = declarator(&tree, b);
    let Some(NodeKind::VariableDeclaration { name, .. }) = tree.arena.kind(declarator_b) else {
        panic!("declarator");
    };
    assert_eq!(tree.arena.identifier_text(*name), Some("b"));
}

#[test]
fn test_copies_map_to_originals_and_back() {
    let program = load("export interface Point { x: number; y: number }\n");
    let tree = build(&program);
    let statement = only_statement(&program, &tree, "Point");
    let original = tree.original_of(statement).expect("origin recorded");
    assert_eq!(original.file, program.entry);
    assert_eq!(tree.copy_of(original), Some(statement));
    let entry = program.entry_file().expect("entry");
    assert!(matches!(
        entry.arena.kind(original.node),
        Some(NodeKind::InterfaceDeclaration { .. })
    ));
    let name = entry.arena.kind(original.node).map(NodeKind::name).expect("name");
    let name_copy = tree.copy_of(NodeRef::new(program.entry, name)).expect("name copied");
    assert_eq!(tree.arena.identifier_text(name_copy), Some("Point"));
}

#[test]
fn test_literal_default_export_becomes_const() {
    let program = load("export default 42;\n");
    let tree = build(&program);
    let statement = only_statement(&program, &tree, "default");
    let Some(NodeKind::VariableStatement { kind, .. }) = tree.arena.kind(statement) else {
        panic!("variable statement");
    };
    assert_eq!(*kind, VariableKind::Const);
    let Some(NodeKind::VariableDeclaration {
        name,
        type_annotation,
        initializer,
        ..
    }) = tree.arena.kind(declarator(&tree, statement))
    else {
        panic!("declarator");
    };
    assert_eq!(tree.arena.identifier_text(*name), Some("default"));
    assert!(initializer.is_none());
    assert!(matches!(
        tree.arena.kind(*type_annotation),
        Some(NodeKind::LiteralType { .. })
    ));
}

#[test]
fn test_anonymous_default_function_is_named() {
    let program = load("export default function (x: number): void {}\n");
    let tree = build(&program);
    let statement = only_statement(&program, &tree, "default");
    let Some(NodeKind::FunctionDeclaration { name, .. }) = tree.arena.kind(statement) else {
        panic!("function");
    };
    assert_eq!(tree.arena.identifier_text(*name), Some("default"));
}

#[test]
fn test_parameter_defaults_become_optional_typed_parameters() {
    let program = load("export function f(a = 1, ...rest: string[]): void {}\n");
    let tree = build(&program);
    let statement = only_statement(&program, &tree, "f");
    let Some(NodeKind::FunctionDeclaration { parameters, .. }) = tree.arena.kind(statement) else {
        panic!("function");
    };
    let Some(NodeKind::Parameter {
        question,
        type_annotation,
        initializer,
        ..
    }) = tree.arena.kind(parameters[0])
    else {
        panic!("parameter");
    };
    assert!(*question);
    assert!(initializer.is_none());
    assert!(matches!(
        tree.arena.kind(*type_annotation),
        Some(NodeKind::KeywordType {
            keyword: KeywordType::Number
        })
    ));
    let Some(NodeKind::Parameter { question, .. }) = tree.arena.kind(parameters[1]) else {
        panic!("rest parameter");
    };
    assert!(!*question);
}

#[test]
fn test_mutable_variable_literal_is_widened() {
    let program = load("export let count = 0;\nexport const fixed = 0;\n");
    let tree = build(&program);
    let count = declarator(&tree, only_statement(&program, &tree, "count"));
    let Some(NodeKind::VariableDeclaration {
        type_annotation,
        initializer,
        ..
    }) = tree.arena.kind(count)
    else {
        panic!("declarator");
    };
    assert!(initializer.is_none());
    assert!(matches!(
        tree.arena.kind(*type_annotation),
        Some(NodeKind::KeywordType {
            keyword: KeywordType::Number
        })
    ));
    // A const keeps its literal initializer.
    let fixed = declarator(&tree, only_statement(&program, &tree, "fixed"));
    let Some(NodeKind::VariableDeclaration { initializer, .. }) = tree.arena.kind(fixed) else {
        panic!("declarator");
    };
    assert!(initializer.is_some());
}

#[test]
fn test_entity_name_builds_left_nested_qualified_names() {
    let mut tree = WorkingTree::default();
    let entity = tree.entity_name("a.b.c");
    let Some(NodeKind::QualifiedName { left, right }) = tree.arena.kind(entity).cloned() else {
        panic!("qualified name");
    };
    assert_eq!(tree.arena.identifier_text(right), Some("c"));
    let Some(NodeKind::QualifiedName { left, right }) = tree.arena.kind(left).cloned() else {
        panic!("inner qualified name");
    };
    assert_eq!(tree.arena.identifier_text(left), Some("a"));
    assert_eq!(tree.arena.identifier_text(right), Some("b"));

    let single = tree.entity_name("x");
    assert_eq!(tree.arena.identifier_text(single), Some("x"));
}

#[test]
fn test_set_entity_name_replaces_in_place() {
    let mut tree = WorkingTree::default();
    let node = tree.identifier("old");
    tree.set_entity_name(node, "ns.fresh");
    assert!(matches!(
        tree.arena.kind(node),
        Some(NodeKind::QualifiedName { .. })
    ));
    let leftmost = tree.arena.leftmost_identifier(node);
    assert_eq!(tree.arena.identifier_text(leftmost), Some("ns"));
}
