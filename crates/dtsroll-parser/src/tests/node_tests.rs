use crate::node::{ModifierFlags, NodeIndex, NodeKind};
use crate::node_arena::NodeArena;
use dtsroll_common::Span;

fn ident(arena: &mut NodeArena, text: &str) -> NodeIndex {
    arena.add(
        NodeKind::Identifier {
            text: text.to_string(),
        },
        Span::DUMMY,
    )
}

#[test]
fn test_children_in_source_order_skip_none() {
    let mut arena = NodeArena::new();
    let left = ident(&mut arena, "a");
    let right = ident(&mut arena, "B");
    let qualified = arena.add(NodeKind::QualifiedName { left, right }, Span::DUMMY);
    let reference = arena.add(
        NodeKind::TypeReference {
            type_name: qualified,
            type_arguments: vec![],
        },
        Span::DUMMY,
    );
    let alias_name = ident(&mut arena, "T");
    let alias = arena.add(
        NodeKind::TypeAliasDeclaration {
            modifiers: ModifierFlags::EXPORT,
            name: alias_name,
            type_parameters: vec![],
            type_node: reference,
        },
        Span::DUMMY,
    );

    let kind = arena.kind(alias).cloned();
    assert_eq!(
        kind.map(|k| k.children().to_vec()),
        Some(vec![alias_name, reference])
    );

    let variable = NodeKind::VariableDeclaration {
        name: left,
        exclamation: false,
        type_annotation: NodeIndex::NONE,
        initializer: NodeIndex::NONE,
    };
    assert_eq!(variable.children().to_vec(), vec![left]);
}

#[test]
fn test_for_each_child_mut_rewrites_slots() {
    let mut arena = NodeArena::new();
    let a = ident(&mut arena, "a");
    let b = ident(&mut arena, "b");
    let mut kind = NodeKind::UnionType { types: vec![a, a] };
    kind.for_each_child_mut(|slot| *slot = b);
    assert_eq!(kind, NodeKind::UnionType { types: vec![b, b] });
}

#[test]
fn test_set_parents_and_entity_text() {
    let mut arena = NodeArena::new();
    let left = ident(&mut arena, "ns");
    let right = ident(&mut arena, "Inner");
    let qualified = arena.add(NodeKind::QualifiedName { left, right }, Span::DUMMY);
    arena.set_parents(qualified);
    assert_eq!(arena.parent(left), qualified);
    assert_eq!(arena.parent(right), qualified);
    assert_eq!(arena.entity_name_text(qualified).as_deref(), Some("ns.Inner"));
    assert_eq!(arena.leftmost_identifier(qualified), left);
}

#[test]
fn test_modifiers_accessors() {
    let mut kind = NodeKind::FunctionDeclaration {
        modifiers: ModifierFlags::EXPORT | ModifierFlags::DEFAULT,
        name: NodeIndex::NONE,
        type_parameters: vec![],
        parameters: vec![],
        return_type: NodeIndex::NONE,
        has_body: true,
    };
    assert!(kind.modifiers().contains(ModifierFlags::DEFAULT));
    if let Some(modifiers) = kind.modifiers_mut() {
        modifiers.remove(ModifierFlags::EXPORT | ModifierFlags::DEFAULT);
        modifiers.insert(ModifierFlags::DECLARE);
    }
    assert_eq!(kind.modifiers(), ModifierFlags::DECLARE);
    assert!(NodeKind::ThisType.modifiers().is_empty());
}
