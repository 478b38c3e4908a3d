//! Doc-comment accessors over bundle nodes.
//!
//! Lookups go through the working node's original, so they are unaffected
//! by renaming or by declarators being split into their own statements.

use crate::working_tree::WorkingTree;
use dtsroll_binder::{NodeRef, Program};
use dtsroll_common::JsDoc;
use dtsroll_parser::{NodeIndex, NodeKind};

pub struct DocAccessor<'a> {
    program: &'a Program,
    tree: &'a WorkingTree,
}

impl<'a> DocAccessor<'a> {
    pub fn new(program: &'a Program, tree: &'a WorkingTree) -> DocAccessor<'a> {
        DocAccessor { program, tree }
    }

    pub fn description(&self, node: NodeIndex) -> Option<String> {
        self.jsdoc(node)?.description
    }

    pub fn param_description(&self, node: NodeIndex, name: &str) -> Option<String> {
        self.jsdoc(node)?.param_description(name).map(str::to_string)
    }

    pub fn return_description(&self, node: NodeIndex) -> Option<String> {
        self.jsdoc(node)?.return_description().map(str::to_string)
    }

    pub fn examples(&self, node: NodeIndex) -> Vec<String> {
        self.jsdoc(node)
            .map(|doc| doc.examples().into_iter().map(str::to_string).collect())
            .unwrap_or_default()
    }

    pub fn see_links(&self, node: NodeIndex) -> Vec<String> {
        self.jsdoc(node)
            .map(|doc| doc.see_links().into_iter().map(str::to_string).collect())
            .unwrap_or_default()
    }

    fn jsdoc(&self, node: NodeIndex) -> Option<JsDoc> {
        let original = self.tree.original_of(node)?;
        self.raw_jsdoc(original).map(JsDoc::parse)
    }

    /// Declarators carry no comment of their own; it sits on the statement.
    fn raw_jsdoc(&self, original: NodeRef) -> Option<&'a str> {
        let arena = &self.program.file(original.file)?.arena;
        if let Some(raw) = arena.jsdoc(original.node) {
            return Some(raw);
        }
        match arena.kind(original.node)? {
            NodeKind::VariableDeclaration { .. } => arena.jsdoc(arena.parent(original.node)),
            NodeKind::BindingElement { .. } => {
                arena.jsdoc(arena.parent(arena.binding_root(original.node)))
            }
            _ => None,
        }
    }
}
