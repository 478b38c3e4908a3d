//! Type nodes.
//!
//! Parsed types keep their own `ParenthesizedType` nodes, so parentheses are
//! only added where a synthesized operand would otherwise re-associate.

use super::DeclarationPrinter;
use dtsroll_parser::{NodeIndex, NodeKind};

/// Syntactic slot a type operand is printed into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Operand {
    /// `T[]`, `T[K]`, `T?`
    Postfix,
    /// `keyof T`
    Prefix,
    Union,
    Intersection,
    /// `T extends ...` check position.
    Check,
    /// `... extends T ? ...` position.
    Extends,
}

fn needs_parens(kind: &NodeKind, slot: Operand) -> bool {
    let loose = matches!(
        kind,
        NodeKind::FunctionType { .. }
            | NodeKind::ConstructorType { .. }
            | NodeKind::ConditionalType { .. }
    );
    match slot {
        Operand::Postfix => {
            loose
                || matches!(
                    kind,
                    NodeKind::UnionType { .. }
                        | NodeKind::IntersectionType { .. }
                        | NodeKind::TypeOperator { .. }
                        | NodeKind::InferType { .. }
                )
        }
        Operand::Prefix | Operand::Intersection => {
            loose || matches!(kind, NodeKind::UnionType { .. } | NodeKind::IntersectionType { .. })
        }
        Operand::Union | Operand::Check => loose,
        Operand::Extends => matches!(kind, NodeKind::ConditionalType { .. }),
    }
}

impl<'a> DeclarationPrinter<'a> {
    pub(super) fn emit_type(&mut self, ty: NodeIndex) {
        let Some(kind) = self.arena.kind(ty) else {
            return;
        };

        match kind {
            NodeKind::KeywordType { keyword } => self.write(keyword.as_str()),
            NodeKind::ThisType => self.write("this"),
            NodeKind::LiteralType { literal } => self.emit_expression(*literal),

            NodeKind::TypeReference {
                type_name,
                type_arguments,
            } => {
                self.emit_entity_name(*type_name);
                self.emit_type_arguments(type_arguments);
            }

            // Heritage clause entries
            NodeKind::ExpressionWithTypeArguments {
                expression,
                type_arguments,
            } => {
                self.emit_entity_name(*expression);
                self.emit_type_arguments(type_arguments);
            }

            NodeKind::ArrayType { element_type } => {
                self.emit_type_operand(*element_type, Operand::Postfix);
                self.write("[]");
            }

            NodeKind::TupleType { elements } => {
                self.write("[");
                for (i, &element) in elements.iter().enumerate() {
                    if i > 0 {
                        self.write(", ");
                    }
                    self.emit_type(element);
                }
                self.write("]");
            }

            NodeKind::NamedTupleMember {
                dot_dot_dot,
                name,
                question,
                type_node,
            } => {
                if *dot_dot_dot {
                    self.write("...");
                }
                self.emit_property_name(*name);
                if *question {
                    self.write("?");
                }
                self.write(": ");
                self.emit_type(*type_node);
            }

            NodeKind::OptionalType { type_node } => {
                self.emit_type_operand(*type_node, Operand::Postfix);
                self.write("?");
            }

            NodeKind::RestType { type_node } => {
                self.write("...");
                self.emit_type(*type_node);
            }

            NodeKind::UnionType { types } => self.emit_type_list(types, " | ", Operand::Union),
            NodeKind::IntersectionType { types } => {
                self.emit_type_list(types, " & ", Operand::Intersection)
            }

            NodeKind::FunctionType {
                type_parameters,
                parameters,
                return_type,
            } => {
                self.emit_type_parameters(type_parameters);
                self.emit_parameters(parameters);
                self.write(" => ");
                self.emit_type(*return_type);
            }

            NodeKind::ConstructorType {
                is_abstract,
                type_parameters,
                parameters,
                return_type,
            } => {
                if *is_abstract {
                    self.write("abstract ");
                }
                self.write("new ");
                self.emit_type_parameters(type_parameters);
                self.emit_parameters(parameters);
                self.write(" => ");
                self.emit_type(*return_type);
            }

            NodeKind::TypeLiteral { members } => {
                if members.is_empty() {
                    self.write("{}");
                    return;
                }
                self.write("{ ");
                for &member in members {
                    self.emit_type_member(member);
                    self.write(" ");
                }
                self.write("}");
            }

            NodeKind::ParenthesizedType { type_node } => {
                self.write("(");
                self.emit_type(*type_node);
                self.write(")");
            }

            NodeKind::TypeOperator {
                operator,
                type_node,
            } => {
                self.write(operator.as_str());
                self.write(" ");
                self.emit_type_operand(*type_node, Operand::Prefix);
            }

            NodeKind::IndexedAccessType {
                object_type,
                index_type,
            } => {
                self.emit_type_operand(*object_type, Operand::Postfix);
                self.write("[");
                self.emit_type(*index_type);
                self.write("]");
            }

            NodeKind::MappedType {
                readonly_token,
                type_parameter,
                name_type,
                question_token,
                type_node,
            } => {
                self.write("{ ");
                if let Some(modifier) = readonly_token {
                    self.write(modifier.prefix());
                    self.write("readonly ");
                }
                self.write("[");
                if let Some(NodeKind::TypeParameter {
                    name, constraint, ..
                }) = self.arena.kind(*type_parameter)
                {
                    self.emit_property_name(*name);
                    self.write(" in ");
                    self.emit_type(*constraint);
                }
                if name_type.is_some() {
                    self.write(" as ");
                    self.emit_type(*name_type);
                }
                self.write("]");
                if let Some(modifier) = question_token {
                    self.write(modifier.prefix());
                    self.write("?");
                }
                if type_node.is_some() {
                    self.write(": ");
                    self.emit_type(*type_node);
                }
                self.write("; }");
            }

            NodeKind::ConditionalType {
                check_type,
                extends_type,
                true_type,
                false_type,
            } => {
                self.emit_type_operand(*check_type, Operand::Check);
                self.write(" extends ");
                self.emit_type_operand(*extends_type, Operand::Extends);
                self.write(" ? ");
                self.emit_type(*true_type);
                self.write(" : ");
                self.emit_type(*false_type);
            }

            NodeKind::InferType { type_parameter } => {
                self.write("infer ");
                self.emit_type_parameter(*type_parameter);
            }

            NodeKind::TypeQuery {
                expr_name,
                type_arguments,
            } => {
                self.write("typeof ");
                self.emit_entity_name(*expr_name);
                self.emit_type_arguments(type_arguments);
            }

            NodeKind::ImportType {
                is_type_of,
                argument,
                qualifier,
                type_arguments,
            } => {
                if *is_type_of {
                    self.write("typeof ");
                }
                self.write("import(");
                self.emit_type(*argument);
                self.write(")");
                if qualifier.is_some() {
                    self.write(".");
                    self.emit_entity_name(*qualifier);
                }
                self.emit_type_arguments(type_arguments);
            }

            NodeKind::TypePredicate {
                asserts,
                parameter_name,
                type_node,
            } => {
                if *asserts {
                    self.write("asserts ");
                }
                self.emit_type(*parameter_name);
                if type_node.is_some() {
                    self.write(" is ");
                    self.emit_type(*type_node);
                }
            }

            NodeKind::TemplateLiteralType { head, spans } => {
                self.write("`");
                self.write(head);
                for &span in spans {
                    if let Some(NodeKind::TemplateLiteralTypeSpan {
                        type_node, literal, ..
                    }) = self.arena.kind(span)
                    {
                        self.write("${");
                        self.emit_type(*type_node);
                        self.write("}");
                        self.write(literal);
                    }
                }
                self.write("`");
            }

            // Names and literals standing in type position.
            _ => self.emit_expression(ty),
        }
    }

    pub(super) fn emit_type_arguments(&mut self, type_arguments: &[NodeIndex]) {
        if type_arguments.is_empty() {
            return;
        }
        self.write("<");
        for (i, &arg) in type_arguments.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.emit_type(arg);
        }
        self.write(">");
    }

    fn emit_type_list(&mut self, types: &[NodeIndex], separator: &str, slot: Operand) {
        for (i, &ty) in types.iter().enumerate() {
            if i > 0 {
                self.write(separator);
            }
            self.emit_type_operand(ty, slot);
        }
    }

    fn emit_type_operand(&mut self, ty: NodeIndex, slot: Operand) {
        let parens = self
            .arena
            .kind(ty)
            .is_some_and(|kind| needs_parens(kind, slot));
        if parens {
            self.write("(");
        }
        self.emit_type(ty);
        if parens {
            self.write(")");
        }
    }
}
