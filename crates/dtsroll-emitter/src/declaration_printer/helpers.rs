//! Writer primitives, names, expressions and comments.

use super::DeclarationPrinter;
use dtsroll_common::quote_string_literal;
use dtsroll_parser::{NodeArena, NodeIndex, NodeKind};

impl<'a> DeclarationPrinter<'a> {
    // =========================================================================
    // Writer
    // =========================================================================

    pub(super) fn reset_writer(&mut self) {
        self.output.clear();
        self.indent_level = 0;
    }

    /// Take the printed text, without its trailing newline.
    pub(super) fn take_output(&mut self) -> String {
        let mut text = std::mem::take(&mut self.output);
        while text.ends_with('\n') {
            text.pop();
        }
        text
    }

    pub(super) fn write(&mut self, s: &str) {
        self.output.push_str(s);
    }

    pub(super) fn write_line(&mut self) {
        self.output.push('\n');
    }

    pub(super) fn write_indent(&mut self) {
        for _ in 0..self.indent_level {
            self.output.push_str("    ");
        }
    }

    pub(super) fn increase_indent(&mut self) {
        self.indent_level += 1;
    }

    pub(super) fn decrease_indent(&mut self) {
        if self.indent_level > 0 {
            self.indent_level -= 1;
        }
    }

    // =========================================================================
    // Comments
    // =========================================================================

    /// Print the JSDoc attached to `node` on its own line(s) at the current
    /// indentation.
    pub(super) fn emit_jsdoc(&mut self, node: NodeIndex) {
        if !self.options.preserve_jsdoc {
            return;
        }
        let Some(comment) = self.arena.jsdoc(node) else {
            return;
        };
        self.write_indent();
        self.emit_multiline_comment(comment);
        self.write_line();
    }

    /// Continuation lines are re-indented; ` *` and ` */` keep their single
    /// leading space.
    fn emit_multiline_comment(&mut self, comment: &str) {
        let mut first = true;
        for line in comment.split('\n') {
            if !first {
                self.write_line();
                self.write_indent();
            }
            let trimmed = line.trim_start();
            if !first && (trimmed.starts_with('*') || trimmed.starts_with('/')) {
                self.write(" ");
            }
            self.write(trimmed.trim_end());
            first = false;
        }
    }

    // =========================================================================
    // Names and expressions
    // =========================================================================

    /// Declaration and member names: identifiers as written, string literals
    /// re-quoted, computed names in brackets.
    pub(super) fn emit_property_name(&mut self, name: NodeIndex) {
        match self.arena.kind(name) {
            Some(NodeKind::StringLiteral { text }) => self.write(&quote_string_literal(text)),
            Some(NodeKind::ComputedPropertyName { expression }) => {
                self.write("[");
                self.emit_expression(*expression);
                self.write("]");
            }
            Some(NodeKind::Identifier { text })
            | Some(NodeKind::PrivateIdentifier { text })
            | Some(NodeKind::NumericLiteral { text })
            | Some(NodeKind::BigIntLiteral { text }) => self.write(text),
            _ => self.emit_expression(name),
        }
    }

    /// Variable and parameter names. Opaque patterns are kept as written;
    /// parsed patterns print without their defaults.
    pub(super) fn emit_binding_name(&mut self, name: NodeIndex) {
        match self.arena.kind(name) {
            Some(NodeKind::OpaqueExpression { text }) => self.write(text),
            Some(NodeKind::ObjectBindingPattern { elements }) => {
                if elements.is_empty() {
                    self.write("{}");
                    return;
                }
                self.write("{ ");
                for (i, &element) in elements.iter().enumerate() {
                    if i > 0 {
                        self.write(", ");
                    }
                    self.emit_binding_element(element);
                }
                self.write(" }");
            }
            Some(NodeKind::ArrayBindingPattern { elements }) => {
                self.write("[");
                for (i, &element) in elements.iter().enumerate() {
                    if i > 0 {
                        self.write(", ");
                    }
                    self.emit_binding_element(element);
                }
                self.write("]");
            }
            _ => self.emit_property_name(name),
        }
    }

    fn emit_binding_element(&mut self, element: NodeIndex) {
        let Some(NodeKind::BindingElement {
            dot_dot_dot,
            property_name,
            name,
            ..
        }) = self.arena.kind(element)
        else {
            return;
        };
        if *dot_dot_dot {
            self.write("...");
        }
        if property_name.is_some() {
            self.emit_property_name(*property_name);
            self.write(": ");
        }
        if name.is_some() {
            self.emit_binding_name(*name);
        }
    }

    pub(super) fn emit_entity_name(&mut self, name: NodeIndex) {
        match self.arena.kind(name) {
            Some(NodeKind::QualifiedName { left, right }) => {
                self.emit_entity_name(*left);
                self.write(".");
                self.emit_entity_name(*right);
            }
            Some(NodeKind::PropertyAccessExpression { expression, name }) => {
                self.emit_entity_name(*expression);
                self.write(".");
                self.emit_entity_name(*name);
            }
            _ => self.emit_expression(name),
        }
    }

    pub(super) fn emit_expression(&mut self, expr: NodeIndex) {
        let Some(kind) = self.arena.kind(expr) else {
            return;
        };
        match kind {
            NodeKind::Identifier { text }
            | NodeKind::PrivateIdentifier { text }
            | NodeKind::NumericLiteral { text }
            | NodeKind::BigIntLiteral { text }
            | NodeKind::TemplateLiteral { text }
            | NodeKind::OpaqueExpression { text } => self.write(text),
            NodeKind::StringLiteral { text } => self.write(&quote_string_literal(text)),
            NodeKind::BooleanLiteral { value } => self.write(if *value { "true" } else { "false" }),
            NodeKind::NullLiteral => self.write("null"),
            NodeKind::QualifiedName { .. } | NodeKind::PropertyAccessExpression { .. } => {
                self.emit_entity_name(expr)
            }
            NodeKind::ComputedPropertyName { .. } => self.emit_property_name(expr),
            other => {
                tracing::trace!(kind = other.kind_name(), "expression kind not printed");
            }
        }
    }
}

/// Literal initializers that a declaration may keep (`declare const x = 1;`).
pub(super) fn is_literal_expression(arena: &NodeArena, expr: NodeIndex) -> bool {
    matches!(
        arena.kind(expr),
        Some(
            NodeKind::StringLiteral { .. }
                | NodeKind::NumericLiteral { .. }
                | NodeKind::BigIntLiteral { .. }
                | NodeKind::BooleanLiteral { .. }
                | NodeKind::TemplateLiteral { .. }
        )
    )
}

/// Identity of a function-like declaration among its overloads.
fn overload_key(arena: &NodeArena, node: NodeIndex) -> Option<(&'static str, Option<&str>, bool)> {
    match arena.kind(node)? {
        NodeKind::FunctionDeclaration { name, .. } => {
            Some(("function", arena.identifier_text(*name), false))
        }
        NodeKind::MethodDeclaration {
            modifiers, name, ..
        } => Some((
            "method",
            arena.identifier_text(*name),
            modifiers.contains(dtsroll_parser::ModifierFlags::STATIC),
        )),
        NodeKind::Constructor { .. } => Some(("constructor", None, false)),
        _ => None,
    }
}

fn has_body(arena: &NodeArena, node: NodeIndex) -> bool {
    matches!(
        arena.kind(node),
        Some(
            NodeKind::FunctionDeclaration { has_body: true, .. }
                | NodeKind::MethodDeclaration { has_body: true, .. }
                | NodeKind::Constructor { has_body: true, .. }
        )
    )
}

/// An implementation signature is hidden when its siblings declare overloads
/// for the same name.
pub fn is_overload_implementation(
    arena: &NodeArena,
    siblings: &[NodeIndex],
    node: NodeIndex,
) -> bool {
    if !has_body(arena, node) {
        return false;
    }
    let Some(key) = overload_key(arena, node) else {
        return false;
    };
    siblings.iter().any(|&other| {
        other != node && !has_body(arena, other) && overload_key(arena, other) == Some(key)
    })
}
