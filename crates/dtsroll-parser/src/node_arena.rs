//! Node arena for AST storage.

use crate::node::{Node, NodeIndex, NodeKind};
use dtsroll_common::Span;
use rustc_hash::FxHashMap;

/// Arena-based storage for AST nodes.
/// Nodes are stored contiguously and referenced by index.
#[derive(Clone, Debug, Default)]
pub struct NodeArena {
    pub nodes: Vec<Node>,
    /// Raw text of the JSDoc comment attached to a declaration node.
    jsdoc: FxHashMap<NodeIndex, String>,
}

impl NodeArena {
    pub fn new() -> NodeArena {
        NodeArena::default()
    }

    pub fn with_capacity(capacity: usize) -> NodeArena {
        NodeArena {
            nodes: Vec::with_capacity(capacity),
            jsdoc: FxHashMap::default(),
        }
    }

    /// Add a node to the arena and return its index
    pub fn add(&mut self, kind: NodeKind, span: Span) -> NodeIndex {
        let index = self.nodes.len() as u32;
        self.nodes.push(Node {
            kind,
            span,
            parent: NodeIndex::NONE,
        });
        NodeIndex(index)
    }

    /// Get a node by index
    pub fn get(&self, index: NodeIndex) -> Option<&Node> {
        if index.is_none() {
            None
        } else {
            self.nodes.get(index.0 as usize)
        }
    }

    /// Get a mutable node by index
    pub fn get_mut(&mut self, index: NodeIndex) -> Option<&mut Node> {
        if index.is_none() {
            None
        } else {
            self.nodes.get_mut(index.0 as usize)
        }
    }

    #[inline]
    pub fn kind(&self, index: NodeIndex) -> Option<&NodeKind> {
        self.get(index).map(|node| &node.kind)
    }

    pub fn span(&self, index: NodeIndex) -> Span {
        self.get(index).map(|node| node.span).unwrap_or(Span::DUMMY)
    }

    pub fn parent(&self, index: NodeIndex) -> NodeIndex {
        self.get(index).map(|node| node.parent).unwrap_or(NodeIndex::NONE)
    }

    /// Replace the kind of the node at the given index.
    /// Returns the old kind if successful
    pub fn replace(&mut self, index: NodeIndex, kind: NodeKind) -> Option<NodeKind> {
        self.get_mut(index)
            .map(|node| std::mem::replace(&mut node.kind, kind))
    }

    /// Get the number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the arena is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // =========================================================================
    // Parent links
    // =========================================================================

    /// Set parent links for every node reachable from `root`.
    pub fn set_parents(&mut self, root: NodeIndex) {
        let mut stack = vec![root];
        while let Some(parent) = stack.pop() {
            let Some(node) = self.get(parent) else {
                continue;
            };
            let children = node.kind.children();
            for child in children {
                if let Some(child_node) = self.get_mut(child) {
                    child_node.parent = parent;
                }
                stack.push(child);
            }
        }
    }

    // =========================================================================
    // JSDoc side table
    // =========================================================================

    pub fn set_jsdoc(&mut self, index: NodeIndex, text: String) {
        self.jsdoc.insert(index, text);
    }

    pub fn jsdoc(&self, index: NodeIndex) -> Option<&str> {
        self.jsdoc.get(&index).map(String::as_str)
    }

    // =========================================================================
    // Text helpers
    // =========================================================================

    /// Text of an identifier-like node (identifiers, private names, string and
    /// numeric literals used as names).
    pub fn identifier_text(&self, index: NodeIndex) -> Option<&str> {
        match self.kind(index)? {
            NodeKind::Identifier { text }
            | NodeKind::PrivateIdentifier { text }
            | NodeKind::StringLiteral { text }
            | NodeKind::NumericLiteral { text } => Some(text),
            _ => None,
        }
    }

    /// Dotted text of an entity name or property access chain (`a.b.C`).
    pub fn entity_name_text(&self, index: NodeIndex) -> Option<String> {
        match self.kind(index)? {
            NodeKind::Identifier { text } => Some(text.clone()),
            NodeKind::QualifiedName { left, right }
            | NodeKind::PropertyAccessExpression {
                expression: left,
                name: right,
            } => {
                let left = self.entity_name_text(*left)?;
                let right = self.identifier_text(*right)?;
                Some(format!("{left}.{right}"))
            }
            _ => None,
        }
    }

    /// Leftmost identifier of an entity name or property access chain.
    pub fn leftmost_identifier(&self, index: NodeIndex) -> NodeIndex {
        let mut current = index;
        loop {
            match self.kind(current) {
                Some(NodeKind::QualifiedName { left, .. })
                | Some(NodeKind::PropertyAccessExpression {
                    expression: left, ..
                }) => current = *left,
                Some(NodeKind::Identifier { .. }) => return current,
                _ => return NodeIndex::NONE,
            }
        }
    }

    // =========================================================================
    // Binding patterns
    // =========================================================================

    /// The `VariableDeclaration` whose pattern contains `element`.
    pub fn binding_root(&self, element: NodeIndex) -> NodeIndex {
        let mut current = self.parent(element);
        loop {
            match self.kind(current) {
                Some(
                    NodeKind::ObjectBindingPattern { .. }
                    | NodeKind::ArrayBindingPattern { .. }
                    | NodeKind::BindingElement { .. },
                ) => current = self.parent(current),
                Some(NodeKind::VariableDeclaration { .. }) => return current,
                _ => return NodeIndex::NONE,
            }
        }
    }

    /// Keys leading from the declaration's value to `element`, outermost
    /// first. `None` for rest elements and computed keys.
    pub fn binding_path(&self, element: NodeIndex) -> Option<Vec<BindingKey>> {
        let mut path = Vec::new();
        let mut current = element;
        while let Some(NodeKind::BindingElement {
            dot_dot_dot,
            property_name,
            name,
            ..
        }) = self.kind(current)
        {
            if *dot_dot_dot {
                return None;
            }
            let pattern = self.parent(current);
            let key = match self.kind(pattern)? {
                NodeKind::ObjectBindingPattern { .. } => {
                    let key = if property_name.is_some() { *property_name } else { *name };
                    BindingKey::Property(self.identifier_text(key)?.to_string())
                }
                NodeKind::ArrayBindingPattern { elements } => {
                    BindingKey::Index(elements.iter().position(|&slot| slot == current)?)
                }
                _ => return None,
            };
            path.push(key);
            current = self.parent(pattern);
        }
        path.reverse();
        Some(path)
    }
}

/// One step of a destructuring access.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BindingKey {
    Property(String),
    Index(usize),
}
