//! Parser state - class members and interface/type-literal members

use super::state::ParserState;
use crate::node::{ModifierFlags, NodeIndex, NodeKind, NodeList};
use crate::syntax_kind::SyntaxKind;

impl ParserState {
    // =========================================================================
    // Class members
    // =========================================================================

    pub(crate) fn parse_class_members(&mut self) -> NodeList {
        let mut members = Vec::new();
        if !self.parse_expected(SyntaxKind::OpenBraceToken) {
            return members;
        }
        while !self.is_token(SyntaxKind::CloseBraceToken)
            && !self.is_token(SyntaxKind::EndOfFileToken)
        {
            if self.parse_optional(SyntaxKind::SemicolonToken) {
                continue;
            }
            let pos_before = self.token_pos();
            let member = self.parse_class_member();
            if member.is_some() {
                members.push(member);
            }
            if self.token_pos() == pos_before {
                self.next_token();
            }
        }
        self.parse_expected(SyntaxKind::CloseBraceToken);
        members
    }

    /// True when the current token, used as a modifier, is followed by
    /// something that can start a member name.
    fn can_follow_member_modifier(&mut self) -> bool {
        self.look_ahead(|p| {
            p.next_token();
            if p.has_preceding_line_break() && !p.is_identifier_or_keyword() {
                return false;
            }
            p.is_identifier_or_keyword()
                || matches!(
                    p.token(),
                    SyntaxKind::StringLiteral
                        | SyntaxKind::NumericLiteral
                        | SyntaxKind::BigIntLiteral
                        | SyntaxKind::PrivateIdentifier
                        | SyntaxKind::OpenBracketToken
                        | SyntaxKind::AsteriskToken
                        | SyntaxKind::OpenBraceToken
                )
        })
    }

    fn parse_member_modifiers(&mut self, in_class: bool) -> ModifierFlags {
        let mut modifiers = ModifierFlags::empty();
        loop {
            let flag = match self.token() {
                SyntaxKind::PublicKeyword if in_class => ModifierFlags::PUBLIC,
                SyntaxKind::PrivateKeyword if in_class => ModifierFlags::PRIVATE,
                SyntaxKind::ProtectedKeyword if in_class => ModifierFlags::PROTECTED,
                SyntaxKind::StaticKeyword if in_class => ModifierFlags::STATIC,
                SyntaxKind::AbstractKeyword if in_class => ModifierFlags::ABSTRACT,
                SyntaxKind::OverrideKeyword if in_class => ModifierFlags::OVERRIDE,
                SyntaxKind::DeclareKeyword if in_class => ModifierFlags::DECLARE,
                SyntaxKind::AccessorKeyword if in_class => ModifierFlags::ACCESSOR,
                SyntaxKind::AsyncKeyword if in_class => ModifierFlags::ASYNC,
                SyntaxKind::ReadonlyKeyword => ModifierFlags::READONLY,
                _ => break,
            };
            if !self.can_follow_member_modifier() {
                break;
            }
            modifiers |= flag;
            self.next_token();
        }
        modifiers
    }

    fn parse_class_member(&mut self) -> NodeIndex {
        let jsdoc = self.scanner.token_jsdoc();
        let start = self.token_pos();
        self.skip_decorators();
        let modifiers = self.parse_member_modifiers(true);

        // static { ... }
        if modifiers.contains(ModifierFlags::STATIC) && self.is_token(SyntaxKind::OpenBraceToken)
        {
            self.last_end = self.scanner.skip_block();
            return NodeIndex::NONE;
        }

        let member = if self.is_index_signature_start() {
            self.parse_index_signature(start, modifiers)
        } else if self.is_constructor_start() {
            self.next_token();
            let parameters = self.parse_parameters();
            // Constructors never carry a return type, but tolerate one.
            self.parse_return_type_annotation();
            let has_body = self.parse_function_body();
            self.finish_node(
                NodeKind::Constructor {
                    modifiers,
                    parameters,
                    has_body,
                },
                start,
            )
        } else if let Some(accessor) = self.try_parse_accessor(start, modifiers, true) {
            accessor
        } else {
            self.parse_optional(SyntaxKind::AsteriskToken);
            let name = self.parse_property_name();
            let question = self.parse_optional(SyntaxKind::QuestionToken);
            if self.is_token(SyntaxKind::OpenParenToken) || self.is_token(SyntaxKind::LessThanToken)
            {
                let type_parameters = self.parse_type_parameters();
                let parameters = self.parse_parameters();
                let return_type = self.parse_return_type_annotation();
                let has_body = self.parse_function_body();
                self.finish_node(
                    NodeKind::MethodDeclaration {
                        modifiers,
                        name,
                        question,
                        type_parameters,
                        parameters,
                        return_type,
                        has_body,
                    },
                    start,
                )
            } else {
                let exclamation = self.parse_optional(SyntaxKind::ExclamationToken);
                let type_annotation = if self.parse_optional(SyntaxKind::ColonToken) {
                    self.parse_type()
                } else {
                    NodeIndex::NONE
                };
                let initializer = if self.parse_optional(SyntaxKind::EqualsToken) {
                    self.parse_expression()
                } else {
                    NodeIndex::NONE
                };
                self.parse_semicolon();
                self.finish_node(
                    NodeKind::PropertyDeclaration {
                        modifiers,
                        name,
                        question,
                        exclamation,
                        type_annotation,
                        initializer,
                    },
                    start,
                )
            }
        };
        self.attach_jsdoc(member, jsdoc);
        member
    }

    fn is_constructor_start(&mut self) -> bool {
        let is_name = self.is_token(SyntaxKind::ConstructorKeyword)
            || (self.is_token(SyntaxKind::StringLiteral)
                && self.scanner.token_value() == "constructor");
        is_name && self.peek_token() == SyntaxKind::OpenParenToken
    }

    /// `get x()` / `set x(v)`; `None` when `get`/`set` is itself the name.
    fn try_parse_accessor(
        &mut self,
        start: u32,
        modifiers: ModifierFlags,
        in_class: bool,
    ) -> Option<NodeIndex> {
        let is_get = match self.token() {
            SyntaxKind::GetKeyword => true,
            SyntaxKind::SetKeyword => false,
            _ => return None,
        };
        if !self.can_follow_member_modifier() {
            return None;
        }
        self.next_token();
        let name = self.parse_property_name();
        // Accessors cannot be generic; skip type parameters if present.
        self.parse_type_parameters();
        let parameters = self.parse_parameters();
        let node = if is_get {
            let return_type = self.parse_return_type_annotation();
            if in_class {
                self.parse_function_body();
            } else {
                self.parse_type_member_separator();
            }
            self.finish_node(
                NodeKind::GetAccessor {
                    modifiers,
                    name,
                    parameters,
                    return_type,
                },
                start,
            )
        } else {
            self.parse_return_type_annotation();
            if in_class {
                self.parse_function_body();
            } else {
                self.parse_type_member_separator();
            }
            self.finish_node(
                NodeKind::SetAccessor {
                    modifiers,
                    name,
                    parameters,
                },
                start,
            )
        };
        Some(node)
    }

    /// `[key: string]: T` as opposed to a computed property name.
    fn is_index_signature_start(&mut self) -> bool {
        if !self.is_token(SyntaxKind::OpenBracketToken) {
            return false;
        }
        self.look_ahead(|p| {
            p.next_token();
            if p.is_token(SyntaxKind::DotDotDotToken) || p.is_token(SyntaxKind::CloseBracketToken)
            {
                return true;
            }
            if !p.is_identifier_or_keyword() {
                return false;
            }
            p.next_token();
            matches!(
                p.token(),
                SyntaxKind::ColonToken | SyntaxKind::CommaToken | SyntaxKind::QuestionToken
            )
        })
    }

    fn parse_index_signature(&mut self, start: u32, modifiers: ModifierFlags) -> NodeIndex {
        self.parse_expected(SyntaxKind::OpenBracketToken);
        let mut parameters = Vec::new();
        while !self.is_token(SyntaxKind::CloseBracketToken)
            && !self.is_token(SyntaxKind::EndOfFileToken)
        {
            let param_start = self.token_pos();
            let name = self.parse_identifier_name();
            let type_annotation = if self.parse_optional(SyntaxKind::ColonToken) {
                self.parse_type()
            } else {
                NodeIndex::NONE
            };
            parameters.push(self.finish_node(
                NodeKind::Parameter {
                    modifiers: ModifierFlags::empty(),
                    dot_dot_dot: false,
                    name,
                    question: false,
                    type_annotation,
                    initializer: NodeIndex::NONE,
                },
                param_start,
            ));
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.parse_expected(SyntaxKind::CloseBracketToken);
        let type_annotation = self.parse_return_type_annotation();
        self.parse_type_member_separator();
        self.finish_node(
            NodeKind::IndexSignature {
                modifiers,
                parameters,
                type_annotation,
            },
            start,
        )
    }

    // =========================================================================
    // Type members (interfaces and type literals)
    // =========================================================================

    /// `{ member; member, ... }`
    pub(crate) fn parse_type_member_block(&mut self) -> NodeList {
        let mut members = Vec::new();
        if !self.parse_expected(SyntaxKind::OpenBraceToken) {
            return members;
        }
        while !self.is_token(SyntaxKind::CloseBraceToken)
            && !self.is_token(SyntaxKind::EndOfFileToken)
        {
            let pos_before = self.token_pos();
            let member = self.parse_type_member();
            if member.is_some() {
                members.push(member);
            }
            if self.token_pos() == pos_before {
                self.next_token();
            }
        }
        self.parse_expected(SyntaxKind::CloseBraceToken);
        members
    }

    /// Consume the `;` or `,` after a type member.
    fn parse_type_member_separator(&mut self) {
        if self.parse_optional(SyntaxKind::SemicolonToken)
            || self.parse_optional(SyntaxKind::CommaToken)
        {
            return;
        }
        self.parse_semicolon();
    }

    fn parse_type_member(&mut self) -> NodeIndex {
        let jsdoc = self.scanner.token_jsdoc();
        let start = self.token_pos();

        let member = if self.is_token(SyntaxKind::OpenParenToken)
            || self.is_token(SyntaxKind::LessThanToken)
        {
            let type_parameters = self.parse_type_parameters();
            let parameters = self.parse_parameters();
            let return_type = self.parse_return_type_annotation();
            self.parse_type_member_separator();
            self.finish_node(
                NodeKind::CallSignature {
                    type_parameters,
                    parameters,
                    return_type,
                },
                start,
            )
        } else if self.is_token(SyntaxKind::NewKeyword)
            && matches!(
                self.peek_token(),
                SyntaxKind::OpenParenToken | SyntaxKind::LessThanToken
            )
        {
            self.next_token();
            let type_parameters = self.parse_type_parameters();
            let parameters = self.parse_parameters();
            let return_type = self.parse_return_type_annotation();
            self.parse_type_member_separator();
            self.finish_node(
                NodeKind::ConstructSignature {
                    type_parameters,
                    parameters,
                    return_type,
                },
                start,
            )
        } else {
            let modifiers = self.parse_member_modifiers(false);
            if self.is_index_signature_start() {
                self.parse_index_signature(start, modifiers)
            } else if let Some(accessor) = self.try_parse_accessor(start, modifiers, false) {
                accessor
            } else {
                let name = self.parse_property_name();
                let question = self.parse_optional(SyntaxKind::QuestionToken);
                if self.is_token(SyntaxKind::OpenParenToken)
                    || self.is_token(SyntaxKind::LessThanToken)
                {
                    let type_parameters = self.parse_type_parameters();
                    let parameters = self.parse_parameters();
                    let return_type = self.parse_return_type_annotation();
                    self.parse_type_member_separator();
                    self.finish_node(
                        NodeKind::MethodSignature {
                            name,
                            question,
                            type_parameters,
                            parameters,
                            return_type,
                        },
                        start,
                    )
                } else {
                    let type_annotation = self.parse_return_type_annotation();
                    self.parse_type_member_separator();
                    self.finish_node(
                        NodeKind::PropertySignature {
                            modifiers,
                            name,
                            question,
                            type_annotation,
                        },
                        start,
                    )
                }
            }
        };
        self.attach_jsdoc(member, jsdoc);
        member
    }
}
