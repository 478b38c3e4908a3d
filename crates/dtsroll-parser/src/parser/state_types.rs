//! Parser state - type parsing

use super::state::ParserState;
use crate::node::{
    KeywordType, MappedModifier, ModifierFlags, NodeIndex, NodeKind, NodeList, TypeOperatorKind,
};
use crate::syntax_kind::SyntaxKind;
use dtsroll_common::diagnostics::{diagnostic_codes, diagnostic_messages};
use dtsroll_common::limits::MAX_TYPE_NESTING_DEPTH;

impl ParserState {
    // =========================================================================
    // Type parameters and arguments
    // =========================================================================

    /// `<T extends U = V, ...>`, or an empty list when absent.
    pub(crate) fn parse_type_parameters(&mut self) -> NodeList {
        let mut parameters = Vec::new();
        if !self.parse_optional(SyntaxKind::LessThanToken) {
            return parameters;
        }
        while !self.is_token(SyntaxKind::GreaterThanToken)
            && !self.is_token(SyntaxKind::EndOfFileToken)
        {
            let start = self.token_pos();
            let mut modifiers = ModifierFlags::empty();
            loop {
                let flag = match self.token() {
                    SyntaxKind::InKeyword => ModifierFlags::IN,
                    SyntaxKind::OutKeyword => ModifierFlags::OUT,
                    SyntaxKind::ConstKeyword => ModifierFlags::CONST,
                    _ => break,
                };
                if !self.look_ahead(|p| {
                    p.next_token();
                    p.is_identifier_or_keyword()
                }) {
                    break;
                }
                modifiers |= flag;
                self.next_token();
            }
            let name = self.parse_identifier();
            let constraint = if self.parse_optional(SyntaxKind::ExtendsKeyword) {
                self.parse_type()
            } else {
                NodeIndex::NONE
            };
            let default = if self.parse_optional(SyntaxKind::EqualsToken) {
                self.parse_type()
            } else {
                NodeIndex::NONE
            };
            parameters.push(self.finish_node(
                NodeKind::TypeParameter {
                    modifiers,
                    name,
                    constraint,
                    default,
                },
                start,
            ));
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.parse_expected(SyntaxKind::GreaterThanToken);
        parameters
    }

    /// `<A, B>` on the same line as the preceding name.
    pub(crate) fn parse_type_arguments(&mut self) -> NodeList {
        let mut arguments = Vec::new();
        if !self.is_token(SyntaxKind::LessThanToken) || self.has_preceding_line_break() {
            return arguments;
        }
        self.next_token();
        while !self.is_token(SyntaxKind::GreaterThanToken)
            && !self.is_token(SyntaxKind::EndOfFileToken)
        {
            let pos_before = self.token_pos();
            arguments.push(self.parse_type());
            if !self.parse_optional(SyntaxKind::CommaToken) || self.token_pos() == pos_before {
                break;
            }
        }
        self.parse_expected(SyntaxKind::GreaterThanToken);
        arguments
    }

    // =========================================================================
    // Types
    // =========================================================================

    /// Parse a type (handles predicates, function types, unions,
    /// intersections and conditionals).
    pub(crate) fn parse_type(&mut self) -> NodeIndex {
        if self.depth >= MAX_TYPE_NESTING_DEPTH {
            self.error_node_too_deep();
            return self.error_type_node();
        }
        self.depth += 1;
        let saved = self.disallow_conditional_types;
        self.disallow_conditional_types = false;
        let result = self.parse_type_worker();
        self.disallow_conditional_types = saved;
        self.depth -= 1;
        result
    }

    fn parse_type_worker(&mut self) -> NodeIndex {
        let start = self.token_pos();

        if let Some(predicate) = self.try_parse_type_predicate(start) {
            return predicate;
        }
        if let Some(function_type) = self.try_parse_function_type() {
            return function_type;
        }

        let check_type = self.parse_union_type();
        if self.disallow_conditional_types
            || self.has_preceding_line_break()
            || !self.is_token(SyntaxKind::ExtendsKeyword)
        {
            return check_type;
        }
        self.next_token();
        let extends_type = self.parse_conditional_extends_type();
        self.parse_expected(SyntaxKind::QuestionToken);
        let true_type = self.parse_type();
        self.parse_expected(SyntaxKind::ColonToken);
        let false_type = self.parse_type();
        self.finish_node(
            NodeKind::ConditionalType {
                check_type,
                extends_type,
                true_type,
                false_type,
            },
            start,
        )
    }

    fn parse_conditional_extends_type(&mut self) -> NodeIndex {
        self.depth += 1;
        let saved = self.disallow_conditional_types;
        self.disallow_conditional_types = true;
        let result = match self.try_parse_function_type() {
            Some(function_type) => function_type,
            None => self.parse_union_type(),
        };
        self.disallow_conditional_types = saved;
        self.depth -= 1;
        result
    }

    /// A node standing in for a missing type.
    pub(crate) fn error_type_node(&mut self) -> NodeIndex {
        let start = self.token_pos();
        self.arena.add(
            NodeKind::KeywordType {
                keyword: KeywordType::Any,
            },
            dtsroll_common::Span::new(start, start),
        )
    }

    /// `x is T`, `this is T`, `asserts x`, `asserts x is T`.
    fn try_parse_type_predicate(&mut self, start: u32) -> Option<NodeIndex> {
        let asserts = self.is_token(SyntaxKind::AssertsKeyword)
            && self.next_token_on_same_line(|p| {
                p.is_identifier_or_keyword() || p.is_token(SyntaxKind::ThisKeyword)
            });
        if asserts {
            self.next_token();
        } else {
            let is_predicate = (self.is_identifier_or_keyword()
                || self.is_token(SyntaxKind::ThisKeyword))
                && self.next_token_on_same_line(|p| p.is_token(SyntaxKind::IsKeyword));
            if !is_predicate {
                return None;
            }
        }

        let name_start = self.token_pos();
        let parameter_name = if self.is_token(SyntaxKind::ThisKeyword) {
            self.next_token();
            self.finish_node(NodeKind::ThisType, name_start)
        } else {
            self.parse_identifier_name()
        };
        let type_node = if !self.has_preceding_line_break()
            && self.parse_optional(SyntaxKind::IsKeyword)
        {
            self.parse_type()
        } else {
            NodeIndex::NONE
        };
        Some(self.finish_node(
            NodeKind::TypePredicate {
                asserts,
                parameter_name,
                type_node,
            },
            start,
        ))
    }

    fn is_start_of_function_type(&mut self) -> bool {
        if self.is_token(SyntaxKind::LessThanToken) {
            return true;
        }
        if !self.is_token(SyntaxKind::OpenParenToken) {
            return false;
        }
        self.look_ahead(|p| {
            p.next_token();
            if p.is_token(SyntaxKind::CloseParenToken) || p.is_token(SyntaxKind::DotDotDotToken) {
                return true;
            }
            if !p.skip_parameter_start() {
                return false;
            }
            match p.token() {
                SyntaxKind::ColonToken
                | SyntaxKind::CommaToken
                | SyntaxKind::QuestionToken
                | SyntaxKind::EqualsToken => true,
                SyntaxKind::CloseParenToken => {
                    p.next_token();
                    p.is_token(SyntaxKind::EqualsGreaterThanToken)
                }
                _ => false,
            }
        })
    }

    fn skip_parameter_start(&mut self) -> bool {
        while matches!(
            self.token(),
            SyntaxKind::PublicKeyword
                | SyntaxKind::PrivateKeyword
                | SyntaxKind::ProtectedKeyword
                | SyntaxKind::ReadonlyKeyword
        ) && self.look_ahead(|p| {
            p.next_token();
            p.is_identifier_or_keyword()
        }) {
            self.next_token();
        }
        if self.is_identifier_or_keyword() {
            self.next_token();
            return true;
        }
        match self.token() {
            SyntaxKind::OpenBraceToken => {
                self.scanner.skip_block();
                true
            }
            SyntaxKind::OpenBracketToken => {
                self.skip_balanced(SyntaxKind::OpenBracketToken, SyntaxKind::CloseBracketToken);
                true
            }
            _ => false,
        }
    }

    /// Function, constructor and abstract constructor types.
    fn try_parse_function_type(&mut self) -> Option<NodeIndex> {
        let start = self.token_pos();
        if self.is_start_of_function_type() {
            return Some(self.parse_function_type(start, false, false));
        }
        if self.is_token(SyntaxKind::NewKeyword) {
            return Some(self.parse_function_type(start, true, false));
        }
        if self.is_token(SyntaxKind::AbstractKeyword)
            && self.peek_token() == SyntaxKind::NewKeyword
        {
            self.next_token();
            return Some(self.parse_function_type(start, true, true));
        }
        None
    }

    fn parse_function_type(
        &mut self,
        start: u32,
        is_constructor: bool,
        is_abstract: bool,
    ) -> NodeIndex {
        if is_constructor {
            self.parse_expected(SyntaxKind::NewKeyword);
        }
        let type_parameters = self.parse_type_parameters();
        let parameters = self.parse_parameters();
        self.parse_expected(SyntaxKind::EqualsGreaterThanToken);
        let return_type = self.parse_type();
        let kind = if is_constructor {
            NodeKind::ConstructorType {
                is_abstract,
                type_parameters,
                parameters,
                return_type,
            }
        } else {
            NodeKind::FunctionType {
                type_parameters,
                parameters,
                return_type,
            }
        };
        self.finish_node(kind, start)
    }

    fn parse_union_type(&mut self) -> NodeIndex {
        let start = self.token_pos();
        let leading = self.parse_optional(SyntaxKind::BarToken);
        let first = self.parse_intersection_type();
        if !self.is_token(SyntaxKind::BarToken) {
            if leading {
                return self.finish_node(NodeKind::UnionType { types: vec![first] }, start);
            }
            return first;
        }
        let mut types = vec![first];
        while self.parse_optional(SyntaxKind::BarToken) {
            types.push(self.parse_intersection_type());
        }
        self.finish_node(NodeKind::UnionType { types }, start)
    }

    fn parse_intersection_type(&mut self) -> NodeIndex {
        let start = self.token_pos();
        self.parse_optional(SyntaxKind::AmpersandToken);
        let first = self.parse_type_operator();
        if !self.is_token(SyntaxKind::AmpersandToken) {
            return first;
        }
        let mut types = vec![first];
        while self.parse_optional(SyntaxKind::AmpersandToken) {
            types.push(self.parse_type_operator());
        }
        self.finish_node(NodeKind::IntersectionType { types }, start)
    }

    fn parse_type_operator(&mut self) -> NodeIndex {
        let start = self.token_pos();
        // A function type in a union/intersection member position.
        if let Some(function_type) = self.try_parse_function_type() {
            return function_type;
        }
        let operator = match self.token() {
            SyntaxKind::KeyOfKeyword => Some(TypeOperatorKind::KeyOf),
            SyntaxKind::UniqueKeyword => Some(TypeOperatorKind::Unique),
            SyntaxKind::ReadonlyKeyword => Some(TypeOperatorKind::Readonly),
            _ => None,
        };
        if let Some(operator) = operator {
            self.next_token();
            let type_node = self.parse_type_operator();
            return self.finish_node(NodeKind::TypeOperator { operator, type_node }, start);
        }
        if self.is_token(SyntaxKind::InferKeyword) {
            self.next_token();
            let type_parameter = self.parse_infer_type_parameter();
            return self.finish_node(NodeKind::InferType { type_parameter }, start);
        }
        self.parse_postfix_type()
    }

    /// `infer U` or `infer U extends C`. The constraint is dropped when it
    /// would swallow the `?` of an enclosing conditional type.
    fn parse_infer_type_parameter(&mut self) -> NodeIndex {
        let start = self.token_pos();
        let name = self.parse_identifier();
        let mut constraint = NodeIndex::NONE;
        if self.is_token(SyntaxKind::ExtendsKeyword) {
            let snapshot = self.snapshot();
            self.next_token();
            let saved = self.disallow_conditional_types;
            self.disallow_conditional_types = true;
            let candidate = self.parse_union_type();
            self.disallow_conditional_types = saved;
            if saved && self.is_token(SyntaxKind::QuestionToken) {
                self.restore(snapshot);
            } else {
                constraint = candidate;
            }
        }
        self.finish_node(
            NodeKind::TypeParameter {
                modifiers: ModifierFlags::empty(),
                name,
                constraint,
                default: NodeIndex::NONE,
            },
            start,
        )
    }

    fn parse_postfix_type(&mut self) -> NodeIndex {
        let start = self.token_pos();
        let mut type_node = self.parse_non_array_type();
        while !self.has_preceding_line_break() && self.is_token(SyntaxKind::OpenBracketToken) {
            self.next_token();
            if self.parse_optional(SyntaxKind::CloseBracketToken) {
                type_node = self.finish_node(
                    NodeKind::ArrayType {
                        element_type: type_node,
                    },
                    start,
                );
            } else {
                let index_type = self.parse_type();
                self.parse_expected(SyntaxKind::CloseBracketToken);
                type_node = self.finish_node(
                    NodeKind::IndexedAccessType {
                        object_type: type_node,
                        index_type,
                    },
                    start,
                );
            }
        }
        type_node
    }

    fn keyword_type(&self) -> Option<KeywordType> {
        let keyword = match self.token() {
            SyntaxKind::AnyKeyword => KeywordType::Any,
            SyntaxKind::UnknownKeyword => KeywordType::Unknown,
            SyntaxKind::NumberKeyword => KeywordType::Number,
            SyntaxKind::BigIntKeyword => KeywordType::BigInt,
            SyntaxKind::StringKeyword => KeywordType::String,
            SyntaxKind::BooleanKeyword => KeywordType::Boolean,
            SyntaxKind::SymbolKeyword => KeywordType::Symbol,
            SyntaxKind::ObjectKeyword => KeywordType::Object,
            SyntaxKind::VoidKeyword => KeywordType::Void,
            SyntaxKind::UndefinedKeyword => KeywordType::Undefined,
            SyntaxKind::NullKeyword => KeywordType::Null,
            SyntaxKind::NeverKeyword => KeywordType::Never,
            SyntaxKind::IntrinsicKeyword => KeywordType::Intrinsic,
            _ => return None,
        };
        Some(keyword)
    }

    fn parse_non_array_type(&mut self) -> NodeIndex {
        let start = self.token_pos();

        if let Some(keyword) = self.keyword_type() {
            // `string.x` is not a type, but `object.Foo` style names are
            // namespaces in some declaration files.
            if self.peek_token() != SyntaxKind::DotToken {
                self.next_token();
                return self.finish_node(NodeKind::KeywordType { keyword }, start);
            }
        }

        match self.token() {
            SyntaxKind::ThisKeyword => {
                self.next_token();
                self.finish_node(NodeKind::ThisType, start)
            }
            SyntaxKind::TrueKeyword | SyntaxKind::FalseKeyword => {
                let value = self.is_token(SyntaxKind::TrueKeyword);
                self.next_token();
                let literal = self.finish_node(NodeKind::BooleanLiteral { value }, start);
                self.finish_node(NodeKind::LiteralType { literal }, start)
            }
            SyntaxKind::StringLiteral => {
                let literal = self.parse_string_literal();
                self.finish_node(NodeKind::LiteralType { literal }, start)
            }
            SyntaxKind::NumericLiteral | SyntaxKind::BigIntLiteral | SyntaxKind::MinusToken => {
                let negative = self.parse_optional(SyntaxKind::MinusToken);
                let sign = if negative { "-" } else { "" };
                let text = format!("{sign}{}", self.scanner.token_value());
                let kind = if self.is_token(SyntaxKind::BigIntLiteral) {
                    NodeKind::BigIntLiteral { text }
                } else if self.is_token(SyntaxKind::NumericLiteral) {
                    NodeKind::NumericLiteral { text }
                } else {
                    self.error_type_expected();
                    return self.error_type_node();
                };
                self.next_token();
                let literal = self.finish_node(kind, start);
                self.finish_node(NodeKind::LiteralType { literal }, start)
            }
            SyntaxKind::NoSubstitutionTemplateLiteral => {
                let text = self.scanner.token_text().to_string();
                self.next_token();
                let literal = self.finish_node(NodeKind::TemplateLiteral { text }, start);
                self.finish_node(NodeKind::LiteralType { literal }, start)
            }
            SyntaxKind::TemplateHead => self.parse_template_literal_type(start),
            SyntaxKind::TypeOfKeyword => {
                self.next_token();
                if self.is_token(SyntaxKind::ImportKeyword) {
                    return self.parse_import_type(start, true);
                }
                let expr_name = self.parse_entity_name(true);
                let type_arguments = self.parse_type_arguments();
                self.finish_node(
                    NodeKind::TypeQuery {
                        expr_name,
                        type_arguments,
                    },
                    start,
                )
            }
            SyntaxKind::ImportKeyword => self.parse_import_type(start, false),
            SyntaxKind::OpenBraceToken => {
                if self.is_start_of_mapped_type() {
                    self.parse_mapped_type(start)
                } else {
                    let members = self.parse_type_member_block();
                    self.finish_node(NodeKind::TypeLiteral { members }, start)
                }
            }
            SyntaxKind::OpenBracketToken => self.parse_tuple_type(start),
            SyntaxKind::OpenParenToken => {
                self.next_token();
                let type_node = self.parse_type();
                self.parse_expected(SyntaxKind::CloseParenToken);
                self.finish_node(NodeKind::ParenthesizedType { type_node }, start)
            }
            _ if self.is_identifier_or_keyword() => {
                let type_name = self.parse_entity_name(true);
                let type_arguments = self.parse_type_arguments();
                self.finish_node(
                    NodeKind::TypeReference {
                        type_name,
                        type_arguments,
                    },
                    start,
                )
            }
            _ => {
                self.error_type_expected();
                self.error_type_node()
            }
        }
    }

    fn error_type_expected(&mut self) {
        self.error_at_token(
            diagnostic_messages::TYPE_EXPECTED,
            diagnostic_codes::TYPE_EXPECTED,
        );
    }

    /// `import("m")`, `import("m").A.B<T>`, `typeof import("m")`.
    fn parse_import_type(&mut self, start: u32, is_type_of: bool) -> NodeIndex {
        self.parse_expected(SyntaxKind::ImportKeyword);
        self.parse_expected(SyntaxKind::OpenParenToken);
        let argument = self.parse_string_literal();
        if self.parse_optional(SyntaxKind::CommaToken) && self.is_token(SyntaxKind::OpenBraceToken)
        {
            // import("m", { with: { ... } })
            self.last_end = self.scanner.skip_block();
        }
        self.parse_expected(SyntaxKind::CloseParenToken);
        let qualifier = if self.parse_optional(SyntaxKind::DotToken) {
            self.parse_entity_name(true)
        } else {
            NodeIndex::NONE
        };
        let type_arguments = self.parse_type_arguments();
        self.finish_node(
            NodeKind::ImportType {
                is_type_of,
                argument,
                qualifier,
                type_arguments,
            },
            start,
        )
    }

    fn parse_template_literal_type(&mut self, start: u32) -> NodeIndex {
        let head = self.scanner.token_value().to_string();
        self.next_token();
        let mut spans = Vec::new();
        loop {
            let span_start = self.token_pos();
            let type_node = self.parse_type();
            if !self.is_token(SyntaxKind::CloseBraceToken) {
                self.parse_expected(SyntaxKind::CloseBraceToken);
                break;
            }
            let kind = self.scanner.rescan_template_continuation();
            let literal = self.scanner.token_value().to_string();
            let is_tail = kind == SyntaxKind::TemplateTail;
            self.next_token();
            spans.push(self.finish_node(
                NodeKind::TemplateLiteralTypeSpan {
                    type_node,
                    literal,
                    is_tail,
                },
                span_start,
            ));
            if is_tail {
                break;
            }
        }
        self.finish_node(NodeKind::TemplateLiteralType { head, spans }, start)
    }

    fn is_start_of_mapped_type(&mut self) -> bool {
        self.look_ahead(|p| {
            p.next_token();
            if p.is_token(SyntaxKind::PlusToken) || p.is_token(SyntaxKind::MinusToken) {
                p.next_token();
                if !p.is_token(SyntaxKind::ReadonlyKeyword) {
                    return false;
                }
            }
            if p.is_token(SyntaxKind::ReadonlyKeyword) {
                p.next_token();
            }
            if !p.is_token(SyntaxKind::OpenBracketToken) {
                return false;
            }
            p.next_token();
            if !p.is_identifier_or_keyword() {
                return false;
            }
            p.next_token();
            p.is_token(SyntaxKind::InKeyword)
        })
    }

    fn parse_mapped_modifier(&mut self, keyword: SyntaxKind) -> Option<MappedModifier> {
        let sign = if self.parse_optional(SyntaxKind::PlusToken) {
            Some(MappedModifier::Plus)
        } else if self.parse_optional(SyntaxKind::MinusToken) {
            Some(MappedModifier::Minus)
        } else {
            None
        };
        if self.parse_optional(keyword) {
            Some(sign.unwrap_or(MappedModifier::Present))
        } else {
            if sign.is_some() {
                self.parse_expected(keyword);
            }
            sign
        }
    }

    /// `{ readonly [K in keyof T as N]?: T[K] }`
    fn parse_mapped_type(&mut self, start: u32) -> NodeIndex {
        self.parse_expected(SyntaxKind::OpenBraceToken);
        let readonly_token = self.parse_mapped_modifier(SyntaxKind::ReadonlyKeyword);
        self.parse_expected(SyntaxKind::OpenBracketToken);

        let param_start = self.token_pos();
        let name = self.parse_identifier_name();
        self.parse_expected(SyntaxKind::InKeyword);
        let constraint = self.parse_type();
        let type_parameter = self.finish_node(
            NodeKind::TypeParameter {
                modifiers: ModifierFlags::empty(),
                name,
                constraint,
                default: NodeIndex::NONE,
            },
            param_start,
        );
        let name_type = if self.parse_optional(SyntaxKind::AsKeyword) {
            self.parse_type()
        } else {
            NodeIndex::NONE
        };
        self.parse_expected(SyntaxKind::CloseBracketToken);

        let question_token = self.parse_mapped_modifier(SyntaxKind::QuestionToken);
        let type_node = self.parse_return_type_annotation();
        if !self.parse_optional(SyntaxKind::SemicolonToken) {
            self.parse_optional(SyntaxKind::CommaToken);
        }
        self.parse_expected(SyntaxKind::CloseBraceToken);
        self.finish_node(
            NodeKind::MappedType {
                readonly_token,
                type_parameter,
                name_type,
                question_token,
                type_node,
            },
            start,
        )
    }

    /// `[A, b?: B, ...C[]]`
    fn parse_tuple_type(&mut self, start: u32) -> NodeIndex {
        self.parse_expected(SyntaxKind::OpenBracketToken);
        let mut elements = Vec::new();
        while !self.is_token(SyntaxKind::CloseBracketToken)
            && !self.is_token(SyntaxKind::EndOfFileToken)
        {
            let pos_before = self.token_pos();
            elements.push(self.parse_tuple_element());
            if !self.parse_optional(SyntaxKind::CommaToken) || self.token_pos() == pos_before {
                break;
            }
        }
        self.parse_expected(SyntaxKind::CloseBracketToken);
        self.finish_node(NodeKind::TupleType { elements }, start)
    }

    fn parse_tuple_element(&mut self) -> NodeIndex {
        let start = self.token_pos();
        let is_named = self.look_ahead(|p| {
            p.parse_optional(SyntaxKind::DotDotDotToken);
            if !p.is_identifier_or_keyword() {
                return false;
            }
            p.next_token();
            p.parse_optional(SyntaxKind::QuestionToken);
            p.is_token(SyntaxKind::ColonToken)
        });
        if is_named {
            let dot_dot_dot = self.parse_optional(SyntaxKind::DotDotDotToken);
            let name = self.parse_identifier_name();
            let question = self.parse_optional(SyntaxKind::QuestionToken);
            self.parse_expected(SyntaxKind::ColonToken);
            let type_node = self.parse_type();
            return self.finish_node(
                NodeKind::NamedTupleMember {
                    dot_dot_dot,
                    name,
                    question,
                    type_node,
                },
                start,
            );
        }
        if self.parse_optional(SyntaxKind::DotDotDotToken) {
            let type_node = self.parse_type();
            return self.finish_node(NodeKind::RestType { type_node }, start);
        }
        let type_node = self.parse_type();
        if self.parse_optional(SyntaxKind::QuestionToken) {
            return self.finish_node(NodeKind::OptionalType { type_node }, start);
        }
        type_node
    }
}
