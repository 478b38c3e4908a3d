//! Class and interface members, parameters, type parameters and heritage.

use super::{DeclarationPrinter, helpers};
use dtsroll_parser::{HeritageToken, ModifierFlags, NodeIndex, NodeKind};
use tracing::trace;

impl<'a> DeclarationPrinter<'a> {
    pub(super) fn emit_class_members(&mut self, members: &[NodeIndex]) {
        let arena = self.arena;
        let has_private_names = members.iter().any(|&member| {
            arena.kind(member).is_some_and(|kind| {
                matches!(arena.kind(kind.name()), Some(NodeKind::PrivateIdentifier { .. }))
            })
        });
        if has_private_names {
            self.write_indent();
            self.write("#private;");
            self.write_line();
        }

        for &member in members {
            let Some(kind) = arena.kind(member) else {
                continue;
            };
            if let NodeKind::Constructor {
                parameters,
                has_body: true,
                ..
            } = kind
            {
                self.emit_parameter_properties(parameters);
            }
            if helpers::is_overload_implementation(arena, members, member)
                || matches!(arena.kind(kind.name()), Some(NodeKind::PrivateIdentifier { .. }))
            {
                continue;
            }
            if !matches!(
                kind,
                NodeKind::PropertyDeclaration { .. }
                    | NodeKind::MethodDeclaration { .. }
                    | NodeKind::Constructor { .. }
                    | NodeKind::GetAccessor { .. }
                    | NodeKind::SetAccessor { .. }
                    | NodeKind::IndexSignature { .. }
            ) {
                trace!(kind = kind.kind_name(), "class member kind not printed");
                continue;
            }
            self.emit_jsdoc(member);
            self.write_indent();
            self.emit_class_member(member);
            self.write_line();
        }
    }

    fn emit_class_member(&mut self, member: NodeIndex) {
        let Some(kind) = self.arena.kind(member) else {
            return;
        };
        match kind {
            NodeKind::PropertyDeclaration {
                modifiers,
                name,
                question,
                type_annotation,
                initializer,
                ..
            } => {
                self.emit_member_modifiers(*modifiers);
                self.emit_property_name(*name);
                if *question {
                    self.write("?");
                }
                if modifiers.contains(ModifierFlags::PRIVATE) {
                    // Private members expose their name only.
                } else if type_annotation.is_some() {
                    self.write(": ");
                    self.emit_type(*type_annotation);
                } else if modifiers.contains(ModifierFlags::READONLY)
                    && helpers::is_literal_expression(self.arena, *initializer)
                {
                    self.write(" = ");
                    self.emit_expression(*initializer);
                }
                self.write(";");
            }
            NodeKind::MethodDeclaration {
                modifiers,
                name,
                question,
                type_parameters,
                parameters,
                return_type,
                ..
            } => {
                self.emit_member_modifiers(*modifiers);
                self.emit_property_name(*name);
                if *question {
                    self.write("?");
                }
                if !modifiers.contains(ModifierFlags::PRIVATE) {
                    self.emit_type_parameters(type_parameters);
                    self.emit_parameters(parameters);
                    self.emit_return_type(*return_type);
                }
                self.write(";");
            }
            NodeKind::Constructor {
                modifiers,
                parameters,
                ..
            } => {
                self.emit_member_modifiers(*modifiers & ModifierFlags::ACCESSIBILITY);
                self.write("constructor");
                if modifiers.contains(ModifierFlags::PRIVATE) {
                    self.write("()");
                } else {
                    self.emit_parameters(parameters);
                }
                self.write(";");
            }
            NodeKind::GetAccessor {
                modifiers,
                name,
                return_type,
                ..
            } => {
                self.emit_member_modifiers(*modifiers);
                self.write("get ");
                self.emit_property_name(*name);
                self.write("()");
                if !modifiers.contains(ModifierFlags::PRIVATE) {
                    self.emit_return_type(*return_type);
                }
                self.write(";");
            }
            NodeKind::SetAccessor {
                modifiers,
                name,
                parameters,
            } => {
                self.emit_member_modifiers(*modifiers);
                self.write("set ");
                self.emit_property_name(*name);
                if modifiers.contains(ModifierFlags::PRIVATE) {
                    self.write("(");
                    if let Some(&first) = parameters.first() {
                        let name = self.arena.kind(first).map_or(first, NodeKind::name);
                        self.emit_binding_name(name);
                    }
                    self.write(")");
                } else {
                    self.emit_parameters(parameters);
                }
                self.write(";");
            }
            NodeKind::IndexSignature { .. } => self.emit_index_signature(member),
            _ => self.emit_type_member(member),
        }
    }

    /// Constructor parameters with accessibility or `readonly` become
    /// properties; `public` itself is not printed.
    fn emit_parameter_properties(&mut self, parameters: &[NodeIndex]) {
        for &param in parameters {
            let Some(NodeKind::Parameter {
                modifiers,
                name,
                question,
                type_annotation,
                initializer,
                ..
            }) = self.arena.kind(param)
            else {
                continue;
            };
            if !modifiers.intersects(ModifierFlags::ACCESSIBILITY | ModifierFlags::READONLY) {
                continue;
            }
            self.write_indent();
            self.emit_member_modifiers(*modifiers);
            self.emit_binding_name(*name);
            if *question || initializer.is_some() {
                self.write("?");
            }
            if !modifiers.contains(ModifierFlags::PRIVATE) && type_annotation.is_some() {
                self.write(": ");
                self.emit_type(*type_annotation);
            }
            self.write(";");
            self.write_line();
        }
    }

    /// Members of interfaces and type literals, printed without indentation or
    /// a trailing newline.
    pub(super) fn emit_type_member(&mut self, member: NodeIndex) {
        let Some(kind) = self.arena.kind(member) else {
            return;
        };
        match kind {
            NodeKind::PropertySignature {
                modifiers,
                name,
                question,
                type_annotation,
            } => {
                if modifiers.contains(ModifierFlags::READONLY) {
                    self.write("readonly ");
                }
                self.emit_property_name(*name);
                if *question {
                    self.write("?");
                }
                if type_annotation.is_some() {
                    self.write(": ");
                    self.emit_type(*type_annotation);
                }
                self.write(";");
            }
            NodeKind::MethodSignature {
                name,
                question,
                type_parameters,
                parameters,
                return_type,
            } => {
                self.emit_property_name(*name);
                if *question {
                    self.write("?");
                }
                self.emit_type_parameters(type_parameters);
                self.emit_parameters(parameters);
                self.emit_return_type(*return_type);
                self.write(";");
            }
            NodeKind::CallSignature {
                type_parameters,
                parameters,
                return_type,
            } => {
                self.emit_type_parameters(type_parameters);
                self.emit_parameters(parameters);
                self.emit_return_type(*return_type);
                self.write(";");
            }
            NodeKind::ConstructSignature {
                type_parameters,
                parameters,
                return_type,
            } => {
                self.write("new ");
                self.emit_type_parameters(type_parameters);
                self.emit_parameters(parameters);
                self.emit_return_type(*return_type);
                self.write(";");
            }
            NodeKind::IndexSignature { .. } => self.emit_index_signature(member),
            NodeKind::GetAccessor { .. }
            | NodeKind::SetAccessor { .. }
            | NodeKind::PropertyDeclaration { .. }
            | NodeKind::MethodDeclaration { .. } => self.emit_class_member(member),
            other => trace!(kind = other.kind_name(), "type member kind not printed"),
        }
    }

    fn emit_index_signature(&mut self, signature: NodeIndex) {
        let Some(NodeKind::IndexSignature {
            modifiers,
            parameters,
            type_annotation,
        }) = self.arena.kind(signature)
        else {
            return;
        };
        self.emit_member_modifiers(*modifiers);
        self.write("[");
        for (i, &param) in parameters.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.emit_parameter(param);
        }
        self.write("]");
        self.emit_return_type(*type_annotation);
        self.write(";");
    }

    /// Member modifiers in declaration-file order. `public`, `override`,
    /// `async` and `declare` carry no declaration meaning and are dropped.
    fn emit_member_modifiers(&mut self, modifiers: ModifierFlags) {
        if modifiers.contains(ModifierFlags::PRIVATE) {
            self.write("private ");
        } else if modifiers.contains(ModifierFlags::PROTECTED) {
            self.write("protected ");
        }
        if modifiers.contains(ModifierFlags::STATIC) {
            self.write("static ");
        }
        if modifiers.contains(ModifierFlags::ABSTRACT) {
            self.write("abstract ");
        }
        if modifiers.contains(ModifierFlags::READONLY) {
            self.write("readonly ");
        }
        if modifiers.contains(ModifierFlags::ACCESSOR) {
            self.write("accessor ");
        }
    }

    // =========================================================================
    // Signatures
    // =========================================================================

    pub(super) fn emit_parameters(&mut self, parameters: &[NodeIndex]) {
        self.write("(");
        for (i, &param) in parameters.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.emit_parameter(param);
        }
        self.write(")");
    }

    /// Initializers are never printed; a parameter with one is optional.
    fn emit_parameter(&mut self, param: NodeIndex) {
        let Some(NodeKind::Parameter {
            dot_dot_dot,
            name,
            question,
            type_annotation,
            initializer,
            ..
        }) = self.arena.kind(param)
        else {
            return;
        };
        if *dot_dot_dot {
            self.write("...");
        }
        self.emit_binding_name(*name);
        if *question || (initializer.is_some() && !*dot_dot_dot) {
            self.write("?");
        }
        if type_annotation.is_some() {
            self.write(": ");
            self.emit_type(*type_annotation);
        }
    }

    pub(super) fn emit_return_type(&mut self, return_type: NodeIndex) {
        if return_type.is_some() {
            self.write(": ");
            self.emit_type(return_type);
        }
    }

    pub(super) fn emit_type_parameters(&mut self, type_parameters: &[NodeIndex]) {
        if type_parameters.is_empty() {
            return;
        }
        self.write("<");
        for (i, &param) in type_parameters.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.emit_type_parameter(param);
        }
        self.write(">");
    }

    pub(super) fn emit_type_parameter(&mut self, param: NodeIndex) {
        let Some(NodeKind::TypeParameter {
            modifiers,
            name,
            constraint,
            default,
        }) = self.arena.kind(param)
        else {
            return;
        };
        if modifiers.contains(ModifierFlags::CONST) {
            self.write("const ");
        }
        if modifiers.contains(ModifierFlags::IN) {
            self.write("in ");
        }
        if modifiers.contains(ModifierFlags::OUT) {
            self.write("out ");
        }
        self.emit_property_name(*name);
        if constraint.is_some() {
            self.write(" extends ");
            self.emit_type(*constraint);
        }
        if default.is_some() {
            self.write(" = ");
            self.emit_type(*default);
        }
    }

    pub(super) fn emit_heritage_clauses(&mut self, clauses: &[NodeIndex]) {
        for &clause in clauses {
            let Some(NodeKind::HeritageClause { token, types }) = self.arena.kind(clause) else {
                continue;
            };
            if types.is_empty() {
                continue;
            }
            self.write(match token {
                HeritageToken::Extends => " extends ",
                HeritageToken::Implements => " implements ",
            });
            for (i, &ty) in types.iter().enumerate() {
                if i > 0 {
                    self.write(", ");
                }
                self.emit_type(ty);
            }
        }
    }
}
