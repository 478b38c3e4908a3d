//! The bundle's own arena.
//!
//! Kept declarations are deep-copied out of the per-file arenas, so
//! renaming and modifier rewriting never touch the parsed program. Every
//! copied node remembers where it came from (`origins`), and every original
//! node knows its copies (`copies`). An original has more than one copy
//! when destructured names share the declarator's annotation.

use crate::collector::{Collection, emitted_declarations};
use dtsroll_binder::{DeclaredType, FileId, NodeRef, SemanticModel, SymbolId};
use dtsroll_common::Span;
use dtsroll_parser::{
    BindingKey, ModifierFlags, NodeArena, NodeIndex, NodeKind, VariableKind,
};
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::{debug, trace};

#[derive(Debug, Default)]
pub struct WorkingTree {
    pub arena: NodeArena,
    /// Working node -> original node.
    pub origins: FxHashMap<NodeIndex, NodeRef>,
    /// Original node -> working nodes, first copy first.
    pub copies: FxHashMap<NodeRef, SmallVec<[NodeIndex; 1]>>,
    /// Declaration statements of each kept symbol, in declaration order.
    pub statements: IndexMap<SymbolId, Vec<NodeIndex>>,
}

impl WorkingTree {
    pub fn build(model: SemanticModel<'_>, collection: &Collection) -> WorkingTree {
        let mut tree = WorkingTree::default();
        for &symbol in &collection.kept {
            let mut statements = Vec::new();
            for declaration in emitted_declarations(model, symbol) {
                if let Some(statement) = tree.copy_declaration(model, declaration) {
                    statements.push(statement);
                }
            }
            tree.statements.insert(symbol, statements);
        }
        tree.fill_inferred_types(model);
        debug!(
            nodes = tree.arena.len(),
            symbols = tree.statements.len(),
            "working tree built"
        );
        tree
    }

    pub fn statements_of(&self, symbol: SymbolId) -> &[NodeIndex] {
        self.statements
            .get(&symbol)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn original_of(&self, node: NodeIndex) -> Option<NodeRef> {
        self.origins.get(&node).copied()
    }

    pub fn copy_of(&self, original: NodeRef) -> Option<NodeIndex> {
        self.copies_of(original).first().copied()
    }

    pub fn copies_of(&self, original: NodeRef) -> &[NodeIndex] {
        self.copies
            .get(&original)
            .map(SmallVec::as_slice)
            .unwrap_or_default()
    }

    pub fn identifier(&mut self, text: &str) -> NodeIndex {
        self.arena.add(
            NodeKind::Identifier {
                text: text.to_string(),
            },
            Span::DUMMY,
        )
    }

    /// An identifier or qualified name for dotted `text`.
    pub fn entity_name(&mut self, text: &str) -> NodeIndex {
        let mut parts = text.split('.');
        let mut entity = self.identifier(parts.next().unwrap_or_default());
        for part in parts {
            let right = self.identifier(part);
            entity = self.arena.add(NodeKind::QualifiedName { left: entity, right }, Span::DUMMY);
        }
        entity
    }

    /// Replace `node` in place with the entity name for `text`.
    pub fn set_entity_name(&mut self, node: NodeIndex, text: &str) {
        let entity = self.entity_name(text);
        if let Some(kind) = self.arena.kind(entity).cloned() {
            self.arena.replace(node, kind);
        }
    }

    // =========================================================================
    // Copying
    // =========================================================================

    fn copy_declaration(&mut self, model: SemanticModel<'_>, declaration: NodeRef) -> Option<NodeIndex> {
        let source = model.arena(declaration.file)?;
        match source.kind(declaration.node)? {
            NodeKind::VariableDeclaration { .. } => {
                let statement = source.parent(declaration.node);
                let Some(NodeKind::VariableStatement { modifiers, kind, .. }) = source.kind(statement)
                else {
                    return None;
                };
                let declarator = self.copy_subtree(source, declaration.file, declaration.node);
                let copy = self.arena.add(
                    NodeKind::VariableStatement {
                        modifiers: *modifiers,
                        kind: *kind,
                        declarations: vec![declarator],
                    },
                    source.span(statement),
                );
                self.record_copy(source, NodeRef::new(declaration.file, statement), copy);
                Some(copy)
            }
            NodeKind::BindingElement { name, .. } => {
                let root = source.binding_root(declaration.node);
                let statement = source.parent(root);
                let Some(NodeKind::VariableStatement { modifiers, kind, .. }) = source.kind(statement)
                else {
                    return None;
                };
                let (modifiers, kind) = (*modifiers, *kind);
                let name = self.copy_subtree(source, declaration.file, *name);
                let type_annotation = self
                    .declared_type_node(model, model.type_of(declaration))
                    .unwrap_or(NodeIndex::NONE);
                let declarator = self.arena.add(
                    NodeKind::VariableDeclaration {
                        name,
                        exclamation: false,
                        type_annotation,
                        initializer: NodeIndex::NONE,
                    },
                    source.span(declaration.node),
                );
                let copy = self.arena.add(
                    NodeKind::VariableStatement {
                        modifiers,
                        kind,
                        declarations: vec![declarator],
                    },
                    source.span(statement),
                );
                self.record_copy(source, declaration, copy);
                Some(copy)
            }
            NodeKind::ExportAssignment { .. } => self.copy_default_expression(model, declaration),
            NodeKind::FunctionDeclaration { name, .. } | NodeKind::ClassDeclaration { name, .. }
                if name.is_none() =>
            {
                let copy = self.copy_subtree(source, declaration.file, declaration.node);
                let default_name = self.identifier("default");
                if let Some(node) = self.arena.get_mut(copy)
                    && let NodeKind::FunctionDeclaration { name, .. }
                    | NodeKind::ClassDeclaration { name, .. } = &mut node.kind
                {
                    *name = default_name;
                }
                Some(copy)
            }
            _ => Some(self.copy_subtree(source, declaration.file, declaration.node)),
        }
    }

    /// `export default <expr>` becomes `const default: T`, named later.
    fn copy_default_expression(&mut self, model: SemanticModel<'_>, declaration: NodeRef) -> Option<NodeIndex> {
        let source = model.arena(declaration.file)?;
        let type_annotation = self.declared_type_node(model, model.type_of(declaration))?;
        let name = self.identifier("default");
        let declarator = self.arena.add(
            NodeKind::VariableDeclaration {
                name,
                exclamation: false,
                type_annotation,
                initializer: NodeIndex::NONE,
            },
            Span::DUMMY,
        );
        let statement = self.arena.add(
            NodeKind::VariableStatement {
                modifiers: ModifierFlags::empty(),
                kind: VariableKind::Const,
                declarations: vec![declarator],
            },
            source.span(declaration.node),
        );
        self.record_copy(source, declaration, statement);
        Some(statement)
    }

    /// A type node for `declared`, copying any annotation it points at.
    fn declared_type_node(&mut self, model: SemanticModel<'_>, declared: DeclaredType) -> Option<NodeIndex> {
        let node = match declared {
            DeclaredType::Literal(text) => {
                let literal = self.arena.add(NodeKind::OpaqueExpression { text }, Span::DUMMY);
                self.arena.add(NodeKind::LiteralType { literal }, Span::DUMMY)
            }
            DeclaredType::Keyword(keyword) => {
                self.arena.add(NodeKind::KeywordType { keyword }, Span::DUMMY)
            }
            DeclaredType::Annotation(annotation) => {
                let annotation_arena = model.arena(annotation.file)?;
                self.copy_subtree(annotation_arena, annotation.file, annotation.node)
            }
            DeclaredType::Member { annotation, path } => {
                let annotation_arena = model.arena(annotation.file)?;
                let mut object_type = self.copy_subtree(annotation_arena, annotation.file, annotation.node);
                for key in path {
                    let literal = match key {
                        BindingKey::Property(text) => NodeKind::StringLiteral { text },
                        BindingKey::Index(index) => NodeKind::NumericLiteral {
                            text: index.to_string(),
                        },
                    };
                    let literal = self.arena.add(literal, Span::DUMMY);
                    let index_type = self.arena.add(NodeKind::LiteralType { literal }, Span::DUMMY);
                    object_type = self.arena.add(
                        NodeKind::IndexedAccessType {
                            object_type,
                            index_type,
                        },
                        Span::DUMMY,
                    );
                }
                object_type
            }
            DeclaredType::Unknown => return None,
        };
        Some(node)
    }

    fn copy_subtree(&mut self, source: &NodeArena, file: FileId, node: NodeIndex) -> NodeIndex {
        let Some(original) = source.get(node) else {
            return NodeIndex::NONE;
        };
        let mut kind = original.kind.clone();
        kind.for_each_child_mut(|child| *child = self.copy_subtree(source, file, *child));
        let copy = self.arena.add(kind, original.span);
        self.record_copy(source, NodeRef::new(file, node), copy);
        copy
    }

    fn record_copy(&mut self, source: &NodeArena, original: NodeRef, copy: NodeIndex) {
        if let Some(jsdoc) = source.jsdoc(original.node) {
            self.arena.set_jsdoc(copy, jsdoc.to_string());
        }
        self.origins.insert(copy, original);
        self.copies.entry(original).or_default().push(copy);
    }

    /// Unannotated parameters, properties and variables with a literal
    /// initializer get the widened keyword type. Parameters with a default
    /// become optional.
    fn fill_inferred_types(&mut self, model: SemanticModel<'_>) {
        for index in 0..self.arena.len() {
            let node = NodeIndex(index as u32);
            let Some(original) = self.original_of(node) else {
                continue;
            };
            let needs_type = match self.arena.kind(node) {
                Some(
                    NodeKind::Parameter {
                        type_annotation,
                        initializer,
                        ..
                    }
                    | NodeKind::PropertyDeclaration {
                        type_annotation,
                        initializer,
                        ..
                    }
                    | NodeKind::VariableDeclaration {
                        type_annotation,
                        initializer,
                        ..
                    },
                ) => type_annotation.is_none() && initializer.is_some(),
                _ => false,
            };
            if !needs_type {
                continue;
            }
            let DeclaredType::Keyword(keyword) = model.type_of(original) else {
                continue;
            };
            let keyword_type = self.arena.add(NodeKind::KeywordType { keyword }, Span::DUMMY);
            trace!(node = index, keyword = keyword.as_str(), "inferred type");
            let Some(copy) = self.arena.get_mut(node) else {
                continue;
            };
            match &mut copy.kind {
                NodeKind::Parameter {
                    dot_dot_dot,
                    question,
                    type_annotation,
                    initializer,
                    ..
                } => {
                    *type_annotation = keyword_type;
                    *initializer = NodeIndex::NONE;
                    *question |= !*dot_dot_dot;
                }
                NodeKind::PropertyDeclaration {
                    type_annotation,
                    initializer,
                    ..
                }
                | NodeKind::VariableDeclaration {
                    type_annotation,
                    initializer,
                    ..
                } => {
                    *type_annotation = keyword_type;
                    *initializer = NodeIndex::NONE;
                }
                _ => {}
            }
        }
    }
}

