//! Parser state - statement and declaration parsing methods

use super::state::ParserState;
use crate::node::{
    HeritageToken, ModifierFlags, ModuleDeclarationKind, NodeIndex, NodeKind, NodeList,
    VariableKind,
};
use crate::syntax_kind::SyntaxKind;
use dtsroll_common::diagnostics::{diagnostic_codes, diagnostic_messages};
use dtsroll_common::limits::MAX_TYPE_NESTING_DEPTH;

impl ParserState {
    // =========================================================================
    // Source file and statement lists
    // =========================================================================

    /// Parse the whole file and return the `SourceFile` node.
    pub fn parse_source_file(&mut self) -> NodeIndex {
        self.next_token();
        let statements = self.parse_statement_list(false);
        self.collect_scanner_diagnostics();

        let end = self.scanner.source_text().len() as u32;
        let root = self.arena.add(
            NodeKind::SourceFile {
                statements,
                is_external_module: self.is_external_module,
            },
            dtsroll_common::Span::new(0, end),
        );
        self.arena.set_parents(root);
        tracing::trace!(
            file = %self.file_name,
            nodes = self.arena.len(),
            diagnostics = self.diagnostics.len(),
            "parsed source file"
        );
        root
    }

    /// Parse statements until EOF, or until `}` when `in_block`.
    pub(crate) fn parse_statement_list(&mut self, in_block: bool) -> NodeList {
        let mut statements = Vec::new();
        loop {
            if self.is_token(SyntaxKind::EndOfFileToken) {
                break;
            }
            if self.is_token(SyntaxKind::CloseBraceToken) {
                if in_block {
                    break;
                }
                self.error_at_token(
                    diagnostic_messages::DECLARATION_OR_STATEMENT_EXPECTED,
                    diagnostic_codes::DECLARATION_OR_STATEMENT_EXPECTED,
                );
                self.next_token();
                continue;
            }

            let pos_before = self.token_pos();
            let statement = self.parse_statement();
            if statement.is_some() {
                statements.push(statement);
            }
            if self.token_pos() == pos_before && !self.is_token(SyntaxKind::EndOfFileToken) {
                self.error_at_token(
                    diagnostic_messages::DECLARATION_OR_STATEMENT_EXPECTED,
                    diagnostic_codes::DECLARATION_OR_STATEMENT_EXPECTED,
                );
                self.next_token();
            }
        }
        statements
    }

    /// Parse one statement. Returns `NONE` for empty statements.
    pub(crate) fn parse_statement(&mut self) -> NodeIndex {
        let jsdoc = self.scanner.token_jsdoc();
        let start = self.token_pos();

        if self.parse_optional(SyntaxKind::SemicolonToken) {
            return NodeIndex::NONE;
        }
        self.skip_decorators();

        let statement = match self.token() {
            SyntaxKind::ImportKeyword => {
                let next = self.peek_token();
                if matches!(next, SyntaxKind::OpenParenToken | SyntaxKind::DotToken) {
                    self.parse_opaque_statement(start)
                } else {
                    self.parse_import_declaration(start, ModifierFlags::empty())
                }
            }
            SyntaxKind::ExportKeyword => self.parse_export(start),
            _ => {
                let modifiers = self.parse_statement_modifiers();
                match self.parse_declaration(start, modifiers) {
                    Some(declaration) => declaration,
                    None => self.parse_opaque_statement(start),
                }
            }
        };
        self.attach_jsdoc(statement, jsdoc);
        statement
    }

    /// Modifiers that may precede a top-level declaration.
    fn parse_statement_modifiers(&mut self) -> ModifierFlags {
        let mut modifiers = ModifierFlags::empty();
        loop {
            let flag = match self.token() {
                SyntaxKind::DeclareKeyword => ModifierFlags::DECLARE,
                SyntaxKind::AbstractKeyword => ModifierFlags::ABSTRACT,
                SyntaxKind::AsyncKeyword => ModifierFlags::ASYNC,
                SyntaxKind::ConstKeyword => {
                    if self.peek_token() == SyntaxKind::EnumKeyword {
                        ModifierFlags::CONST
                    } else {
                        break;
                    }
                }
                _ => break,
            };
            // `declare = 1` in a script is an expression, not a modifier.
            let is_modifier = self.next_token_on_same_line(|p| {
                p.is_identifier_or_keyword() || p.is_token(SyntaxKind::OpenBraceToken)
            });
            if !is_modifier {
                break;
            }
            modifiers |= flag;
            self.next_token();
        }
        modifiers
    }

    /// Parse a declaration after its modifiers, or `None` if the current
    /// token does not start one.
    pub(crate) fn parse_declaration(
        &mut self,
        start: u32,
        modifiers: ModifierFlags,
    ) -> Option<NodeIndex> {
        let node = match self.token() {
            SyntaxKind::VarKeyword | SyntaxKind::ConstKeyword => {
                self.parse_variable_statement(start, modifiers)
            }
            SyntaxKind::LetKeyword => {
                let is_declaration = self.next_token_on_same_line(|p| {
                    p.is_identifier()
                        || p.is_token(SyntaxKind::OpenBraceToken)
                        || p.is_token(SyntaxKind::OpenBracketToken)
                });
                if !is_declaration {
                    return None;
                }
                self.parse_variable_statement(start, modifiers)
            }
            SyntaxKind::FunctionKeyword => self.parse_function_declaration(start, modifiers),
            SyntaxKind::ClassKeyword => self.parse_class_declaration(start, modifiers),
            SyntaxKind::InterfaceKeyword => {
                if !self.next_token_on_same_line(|p| p.is_identifier()) {
                    return None;
                }
                self.parse_interface_declaration(start, modifiers)
            }
            SyntaxKind::TypeKeyword => {
                let is_alias = self.look_ahead(|p| {
                    p.next_token();
                    if p.has_preceding_line_break() || !p.is_identifier() {
                        return false;
                    }
                    p.next_token();
                    p.is_token(SyntaxKind::EqualsToken) || p.is_token(SyntaxKind::LessThanToken)
                });
                if !is_alias {
                    return None;
                }
                self.parse_type_alias_declaration(start, modifiers)
            }
            SyntaxKind::EnumKeyword => self.parse_enum_declaration(start, modifiers),
            SyntaxKind::NamespaceKeyword | SyntaxKind::ModuleKeyword => {
                let is_module = self.next_token_on_same_line(|p| {
                    p.is_identifier() || p.is_token(SyntaxKind::StringLiteral)
                });
                if !is_module {
                    return None;
                }
                self.parse_module_declaration(start, modifiers)
            }
            SyntaxKind::GlobalKeyword if modifiers.contains(ModifierFlags::DECLARE) => {
                self.parse_global_augmentation(start, modifiers)
            }
            SyntaxKind::GlobalKeyword => {
                if !self.next_token_on_same_line(|p| p.is_token(SyntaxKind::OpenBraceToken)) {
                    return None;
                }
                self.parse_global_augmentation(start, modifiers)
            }
            _ => return None,
        };
        Some(node)
    }

    /// Skip a statement the declaration surface does not model.
    pub(crate) fn parse_opaque_statement(&mut self, start: u32) -> NodeIndex {
        let mut depth = 0u32;
        let mut previous: Option<SyntaxKind> = None;
        loop {
            match self.token() {
                SyntaxKind::EndOfFileToken => break,
                SyntaxKind::SemicolonToken if depth == 0 => {
                    self.next_token();
                    break;
                }
                SyntaxKind::CloseBraceToken if depth == 0 => break,
                SyntaxKind::OpenBraceToken => {
                    self.last_end = self.scanner.skip_block();
                    previous = Some(SyntaxKind::CloseBraceToken);
                    if depth == 0 {
                        break;
                    }
                    continue;
                }
                SyntaxKind::OpenParenToken | SyntaxKind::OpenBracketToken => depth += 1,
                SyntaxKind::CloseParenToken | SyntaxKind::CloseBracketToken => {
                    depth = depth.saturating_sub(1);
                }
                SyntaxKind::TemplateHead => self.scanner.skip_template(),
                SyntaxKind::SlashToken | SyntaxKind::OperatorToken
                    if self.scanner.token_text().starts_with('/')
                        && regex_may_follow(previous) =>
                {
                    self.scanner.rescan_regex();
                }
                _ if previous.is_some()
                    && depth == 0
                    && self.has_preceding_line_break()
                    && self.is_declaration_start() =>
                {
                    break;
                }
                _ => {}
            }
            previous = Some(self.token());
            self.next_token();
        }
        self.finish_node(NodeKind::OpaqueStatement, start)
    }

    fn is_declaration_start(&self) -> bool {
        matches!(
            self.token(),
            SyntaxKind::ExportKeyword
                | SyntaxKind::ImportKeyword
                | SyntaxKind::FunctionKeyword
                | SyntaxKind::ClassKeyword
                | SyntaxKind::ConstKeyword
                | SyntaxKind::LetKeyword
                | SyntaxKind::VarKeyword
                | SyntaxKind::InterfaceKeyword
                | SyntaxKind::EnumKeyword
                | SyntaxKind::DeclareKeyword
                | SyntaxKind::NamespaceKeyword
                | SyntaxKind::AbstractKeyword
                | SyntaxKind::AtToken
        )
    }

    /// Skip `@decorator` and `@decorator(args)` sequences.
    pub(crate) fn skip_decorators(&mut self) {
        while self.parse_optional(SyntaxKind::AtToken) {
            while self.is_identifier_or_keyword() {
                self.next_token();
                if !self.parse_optional(SyntaxKind::DotToken) {
                    break;
                }
            }
            if self.is_token(SyntaxKind::OpenParenToken) {
                self.skip_balanced(SyntaxKind::OpenParenToken, SyntaxKind::CloseParenToken);
            }
        }
    }

    /// Skip a balanced `open ... close` token group starting at `open`.
    pub(crate) fn skip_balanced(&mut self, open: SyntaxKind, close: SyntaxKind) {
        let mut depth = 0u32;
        loop {
            let token = self.token();
            if token == SyntaxKind::EndOfFileToken {
                return;
            }
            if token == SyntaxKind::OpenBraceToken && open != SyntaxKind::OpenBraceToken {
                self.last_end = self.scanner.skip_block();
                continue;
            }
            if token == SyntaxKind::TemplateHead {
                self.scanner.skip_template();
            }
            if token == open {
                depth += 1;
            } else if token == close {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    self.next_token();
                    return;
                }
            }
            self.next_token();
        }
    }

    // =========================================================================
    // Expressions (only what declarations need)
    // =========================================================================

    fn is_expression_terminator(&self) -> bool {
        matches!(
            self.token(),
            SyntaxKind::CommaToken
                | SyntaxKind::SemicolonToken
                | SyntaxKind::CloseParenToken
                | SyntaxKind::CloseBracketToken
                | SyntaxKind::CloseBraceToken
                | SyntaxKind::EndOfFileToken
        ) || self.has_preceding_line_break()
    }

    /// Parse an initializer or exported expression. Literals and entity names
    /// become real nodes; anything else is kept as opaque source text.
    pub(crate) fn parse_expression(&mut self) -> NodeIndex {
        let start = self.token_pos();
        let simple = self.look_ahead(|p| {
            p.try_parse_simple_expression();
            p.is_expression_terminator()
        });
        if simple && let Some(node) = self.try_parse_simple_expression() {
            return node;
        }
        self.skip_expression();
        let text = self.source_slice(start, self.last_end);
        self.finish_node(NodeKind::OpaqueExpression { text }, start)
    }

    fn try_parse_simple_expression(&mut self) -> Option<NodeIndex> {
        let start = self.token_pos();
        let kind = match self.token() {
            SyntaxKind::StringLiteral => NodeKind::StringLiteral {
                text: self.scanner.token_value().to_string(),
            },
            SyntaxKind::NumericLiteral => NodeKind::NumericLiteral {
                text: self.scanner.token_value().to_string(),
            },
            SyntaxKind::BigIntLiteral => NodeKind::BigIntLiteral {
                text: self.scanner.token_value().to_string(),
            },
            SyntaxKind::NoSubstitutionTemplateLiteral => NodeKind::TemplateLiteral {
                text: self.scanner.token_text().to_string(),
            },
            SyntaxKind::TrueKeyword => NodeKind::BooleanLiteral { value: true },
            SyntaxKind::FalseKeyword => NodeKind::BooleanLiteral { value: false },
            SyntaxKind::NullKeyword => NodeKind::NullLiteral,
            SyntaxKind::MinusToken => {
                self.next_token();
                if !matches!(
                    self.token(),
                    SyntaxKind::NumericLiteral | SyntaxKind::BigIntLiteral
                ) {
                    return None;
                }
                let text = format!("-{}", self.scanner.token_value());
                let kind = if self.is_token(SyntaxKind::BigIntLiteral) {
                    NodeKind::BigIntLiteral { text }
                } else {
                    NodeKind::NumericLiteral { text }
                };
                self.next_token();
                return Some(self.finish_node(kind, start));
            }
            _ if self.is_identifier() || self.is_token(SyntaxKind::ThisKeyword) => {
                let mut expression = self.parse_identifier_name();
                while self.is_token(SyntaxKind::DotToken) {
                    self.next_token();
                    if !self.is_identifier_or_keyword() {
                        return None;
                    }
                    let name = self.parse_identifier_name();
                    expression = self.finish_node(
                        NodeKind::PropertyAccessExpression { expression, name },
                        start,
                    );
                }
                return Some(expression);
            }
            _ => return None,
        };
        self.next_token();
        Some(self.finish_node(kind, start))
    }

    /// Skip an expression at the token level.
    pub(crate) fn skip_expression(&mut self) {
        let mut depth = 0u32;
        let mut previous: Option<SyntaxKind> = None;
        loop {
            let token = self.token();
            match token {
                SyntaxKind::EndOfFileToken => return,
                SyntaxKind::CommaToken | SyntaxKind::SemicolonToken if depth == 0 => return,
                SyntaxKind::CloseParenToken
                | SyntaxKind::CloseBracketToken
                | SyntaxKind::CloseBraceToken
                    if depth == 0 =>
                {
                    return;
                }
                SyntaxKind::OpenParenToken | SyntaxKind::OpenBracketToken => depth += 1,
                SyntaxKind::CloseParenToken | SyntaxKind::CloseBracketToken => depth -= 1,
                SyntaxKind::OpenBraceToken => {
                    self.last_end = self.scanner.skip_block();
                    previous = Some(SyntaxKind::CloseBraceToken);
                    continue;
                }
                SyntaxKind::TemplateHead => self.scanner.skip_template(),
                SyntaxKind::SlashToken | SyntaxKind::OperatorToken
                    if self.scanner.token_text().starts_with('/')
                        && regex_may_follow(previous) =>
                {
                    self.scanner.rescan_regex();
                }
                _ if depth == 0
                    && previous.is_some()
                    && self.has_preceding_line_break()
                    && self.is_declaration_start() =>
                {
                    return;
                }
                _ => {}
            }
            previous = Some(self.token());
            self.next_token();
        }
    }

    // =========================================================================
    // Names
    // =========================================================================

    /// Parse an identifier in a binding position (keywords that are not
    /// reserved words are allowed).
    pub(crate) fn parse_identifier(&mut self) -> NodeIndex {
        if self.is_identifier() {
            return self.parse_identifier_name();
        }
        self.error_at_token(
            diagnostic_messages::IDENTIFIER_EXPECTED,
            diagnostic_codes::IDENTIFIER_EXPECTED,
        );
        let start = self.token_pos();
        self.finish_node(
            NodeKind::Identifier {
                text: String::new(),
            },
            start,
        )
    }

    /// Parse an identifier where any keyword is allowed (property names,
    /// qualified-name right sides, export specifiers).
    pub(crate) fn parse_identifier_name(&mut self) -> NodeIndex {
        let start = self.token_pos();
        if !self.is_identifier_or_keyword() && !self.is_token(SyntaxKind::ThisKeyword) {
            self.error_at_token(
                diagnostic_messages::IDENTIFIER_EXPECTED,
                diagnostic_codes::IDENTIFIER_EXPECTED,
            );
            return self.finish_node(
                NodeKind::Identifier {
                    text: String::new(),
                },
                start,
            );
        }
        let text = self.scanner.token_value().to_string();
        self.next_token();
        self.finish_node(NodeKind::Identifier { text }, start)
    }

    /// Identifier or string literal (module export names, ambient modules).
    fn parse_module_export_name(&mut self) -> NodeIndex {
        if self.is_token(SyntaxKind::StringLiteral) {
            self.parse_string_literal()
        } else {
            self.parse_identifier_name()
        }
    }

    pub(crate) fn parse_string_literal(&mut self) -> NodeIndex {
        let start = self.token_pos();
        if !self.is_token(SyntaxKind::StringLiteral) {
            self.parse_expected(SyntaxKind::StringLiteral);
            return self.finish_node(
                NodeKind::StringLiteral {
                    text: String::new(),
                },
                start,
            );
        }
        let text = self.scanner.token_value().to_string();
        self.next_token();
        self.finish_node(NodeKind::StringLiteral { text }, start)
    }

    /// Property name of a member: identifier, keyword, string, number,
    /// private name or computed name.
    pub(crate) fn parse_property_name(&mut self) -> NodeIndex {
        let start = self.token_pos();
        match self.token() {
            SyntaxKind::StringLiteral => self.parse_string_literal(),
            SyntaxKind::NumericLiteral | SyntaxKind::BigIntLiteral => {
                let text = self.scanner.token_value().to_string();
                self.next_token();
                self.finish_node(NodeKind::NumericLiteral { text }, start)
            }
            SyntaxKind::PrivateIdentifier => {
                let text = self.scanner.token_value().to_string();
                self.next_token();
                self.finish_node(NodeKind::PrivateIdentifier { text }, start)
            }
            SyntaxKind::OpenBracketToken => {
                self.next_token();
                let expression = self.parse_expression();
                self.parse_expected(SyntaxKind::CloseBracketToken);
                self.finish_node(NodeKind::ComputedPropertyName { expression }, start)
            }
            _ => self.parse_identifier_name(),
        }
    }

    /// Entity name `A.B.C` as identifiers and qualified names.
    pub(crate) fn parse_entity_name(&mut self, allow_reserved: bool) -> NodeIndex {
        let start = self.token_pos();
        let mut entity = if allow_reserved {
            self.parse_identifier_name()
        } else {
            self.parse_identifier()
        };
        while self.is_token(SyntaxKind::DotToken) {
            let is_name = self.look_ahead(|p| {
                p.next_token();
                p.is_identifier_or_keyword() || p.is_token(SyntaxKind::PrivateIdentifier)
            });
            if !is_name {
                break;
            }
            self.next_token();
            let right = self.parse_identifier_name();
            entity = self.finish_node(NodeKind::QualifiedName { left: entity, right }, start);
        }
        entity
    }

    /// Parameter name: identifier, or an opaque destructuring pattern.
    fn parse_parameter_name(&mut self) -> NodeIndex {
        let start = self.token_pos();
        match self.token() {
            SyntaxKind::OpenBraceToken => {
                self.last_end = self.scanner.skip_block();
                let text = self.source_slice(start, self.last_end);
                self.finish_node(NodeKind::OpaqueExpression { text }, start)
            }
            SyntaxKind::OpenBracketToken => {
                self.skip_balanced(SyntaxKind::OpenBracketToken, SyntaxKind::CloseBracketToken);
                let text = self.source_slice(start, self.last_end);
                self.finish_node(NodeKind::OpaqueExpression { text }, start)
            }
            SyntaxKind::ThisKeyword => self.parse_identifier_name(),
            _ => self.parse_identifier(),
        }
    }

    /// Variable name: identifier or destructuring pattern.
    fn parse_binding_name(&mut self) -> NodeIndex {
        match self.token() {
            SyntaxKind::OpenBraceToken => self.parse_object_binding_pattern(),
            SyntaxKind::OpenBracketToken => self.parse_array_binding_pattern(),
            _ => self.parse_identifier(),
        }
    }

    fn parse_object_binding_pattern(&mut self) -> NodeIndex {
        let start = self.token_pos();
        self.parse_expected(SyntaxKind::OpenBraceToken);
        let mut elements = Vec::new();
        while !self.is_token(SyntaxKind::CloseBraceToken) && !self.is_token(SyntaxKind::EndOfFileToken) {
            let element_start = self.token_pos();
            let dot_dot_dot = self.parse_optional(SyntaxKind::DotDotDotToken);
            let (property_name, name) = if dot_dot_dot {
                (NodeIndex::NONE, self.parse_identifier())
            } else {
                let key = self.parse_property_name();
                if self.parse_optional(SyntaxKind::ColonToken) {
                    (key, self.parse_binding_name())
                } else {
                    (NodeIndex::NONE, key)
                }
            };
            let initializer = self.parse_binding_initializer();
            elements.push(self.finish_node(
                NodeKind::BindingElement {
                    dot_dot_dot,
                    property_name,
                    name,
                    initializer,
                },
                element_start,
            ));
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.parse_expected(SyntaxKind::CloseBraceToken);
        self.finish_node(NodeKind::ObjectBindingPattern { elements }, start)
    }

    fn parse_array_binding_pattern(&mut self) -> NodeIndex {
        let start = self.token_pos();
        self.parse_expected(SyntaxKind::OpenBracketToken);
        let mut elements = Vec::new();
        while !self.is_token(SyntaxKind::CloseBracketToken) && !self.is_token(SyntaxKind::EndOfFileToken) {
            let element_start = self.token_pos();
            if self.parse_optional(SyntaxKind::CommaToken) {
                elements.push(self.finish_node(
                    NodeKind::BindingElement {
                        dot_dot_dot: false,
                        property_name: NodeIndex::NONE,
                        name: NodeIndex::NONE,
                        initializer: NodeIndex::NONE,
                    },
                    element_start,
                ));
                continue;
            }
            let dot_dot_dot = self.parse_optional(SyntaxKind::DotDotDotToken);
            let name = self.parse_binding_name();
            let initializer = self.parse_binding_initializer();
            elements.push(self.finish_node(
                NodeKind::BindingElement {
                    dot_dot_dot,
                    property_name: NodeIndex::NONE,
                    name,
                    initializer,
                },
                element_start,
            ));
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.parse_expected(SyntaxKind::CloseBracketToken);
        self.finish_node(NodeKind::ArrayBindingPattern { elements }, start)
    }

    fn parse_binding_initializer(&mut self) -> NodeIndex {
        if self.parse_optional(SyntaxKind::EqualsToken) {
            self.parse_expression()
        } else {
            NodeIndex::NONE
        }
    }

    /// Variable initializer. Object and array literals built only from
    /// literals become real nodes; other initializers parse as expressions.
    fn parse_variable_initializer(&mut self) -> NodeIndex {
        if matches!(
            self.token(),
            SyntaxKind::OpenBraceToken | SyntaxKind::OpenBracketToken
        ) {
            let literal = self.look_ahead(|p| {
                p.try_parse_literal_value().is_some() && p.is_expression_terminator()
            });
            if literal && let Some(node) = self.try_parse_literal_value() {
                return node;
            }
        }
        self.parse_expression()
    }

    fn try_parse_literal_value(&mut self) -> Option<NodeIndex> {
        match self.token() {
            SyntaxKind::OpenBraceToken => self.try_parse_object_literal(),
            SyntaxKind::OpenBracketToken => self.try_parse_array_literal(),
            _ => self.try_parse_simple_expression(),
        }
    }

    fn try_parse_object_literal(&mut self) -> Option<NodeIndex> {
        let start = self.token_pos();
        self.next_token();
        let mut properties = Vec::new();
        while !self.is_token(SyntaxKind::CloseBraceToken) {
            let is_name = self.is_identifier_or_keyword()
                || matches!(
                    self.token(),
                    SyntaxKind::StringLiteral | SyntaxKind::NumericLiteral
                );
            if !is_name {
                return None;
            }
            let property_start = self.token_pos();
            let name = self.parse_property_name();
            let initializer = if self.parse_optional(SyntaxKind::ColonToken) {
                self.try_parse_literal_value()?
            } else {
                NodeIndex::NONE
            };
            properties.push(self.finish_node(
                NodeKind::PropertyAssignment { name, initializer },
                property_start,
            ));
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        if !self.parse_optional(SyntaxKind::CloseBraceToken) {
            return None;
        }
        Some(self.finish_node(NodeKind::ObjectLiteralExpression { properties }, start))
    }

    fn try_parse_array_literal(&mut self) -> Option<NodeIndex> {
        let start = self.token_pos();
        self.next_token();
        let mut elements = Vec::new();
        while !self.is_token(SyntaxKind::CloseBracketToken) {
            if self.parse_optional(SyntaxKind::CommaToken) {
                elements.push(NodeIndex::NONE);
                continue;
            }
            elements.push(self.try_parse_literal_value()?);
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        if !self.parse_optional(SyntaxKind::CloseBracketToken) {
            return None;
        }
        Some(self.finish_node(NodeKind::ArrayLiteralExpression { elements }, start))
    }

    // =========================================================================
    // Imports and exports
    // =========================================================================

    pub(crate) fn parse_import_declaration(
        &mut self,
        start: u32,
        modifiers: ModifierFlags,
    ) -> NodeIndex {
        self.is_external_module = true;
        self.parse_expected(SyntaxKind::ImportKeyword);

        if self.is_token(SyntaxKind::StringLiteral) {
            let module_specifier = self.parse_string_literal();
            self.skip_import_attributes();
            self.parse_semicolon();
            return self.finish_node(
                NodeKind::ImportDeclaration {
                    import_clause: NodeIndex::NONE,
                    module_specifier,
                },
                start,
            );
        }

        let is_type_only = self.is_token(SyntaxKind::TypeKeyword)
            && self.look_ahead(|p| {
                p.next_token();
                match p.token() {
                    SyntaxKind::OpenBraceToken | SyntaxKind::AsteriskToken => true,
                    SyntaxKind::FromKeyword => {
                        p.next_token();
                        !p.is_token(SyntaxKind::StringLiteral)
                    }
                    _ => p.is_identifier(),
                }
            });
        if is_type_only {
            self.next_token();
        }

        // import x = require("m") / import x = A.B
        if self.is_identifier()
            && self.look_ahead(|p| {
                p.next_token();
                p.is_token(SyntaxKind::EqualsToken)
            })
        {
            return self.parse_import_equals_rest(start, modifiers, is_type_only);
        }

        let clause_start = self.token_pos();
        let mut name = NodeIndex::NONE;
        let mut named_bindings = NodeIndex::NONE;
        if self.is_identifier() {
            name = self.parse_identifier();
            if !self.parse_optional(SyntaxKind::CommaToken) {
                self.parse_expected_from();
                return self.finish_import(start, clause_start, is_type_only, name, named_bindings);
            }
        }
        if self.is_token(SyntaxKind::AsteriskToken) {
            let ns_start = self.token_pos();
            self.next_token();
            self.parse_expected(SyntaxKind::AsKeyword);
            let ns_name = self.parse_identifier();
            named_bindings = self.finish_node(NodeKind::NamespaceImport { name: ns_name }, ns_start);
        } else if self.is_token(SyntaxKind::OpenBraceToken) {
            let list_start = self.token_pos();
            let elements = self.parse_specifier_list(true);
            named_bindings = self.finish_node(NodeKind::NamedImports { elements }, list_start);
        } else {
            self.parse_expected(SyntaxKind::OpenBraceToken);
        }
        self.parse_expected_from();
        self.finish_import(start, clause_start, is_type_only, name, named_bindings)
    }

    fn parse_expected_from(&mut self) {
        self.parse_expected(SyntaxKind::FromKeyword);
    }

    fn finish_import(
        &mut self,
        start: u32,
        clause_start: u32,
        is_type_only: bool,
        name: NodeIndex,
        named_bindings: NodeIndex,
    ) -> NodeIndex {
        let import_clause = self.finish_node(
            NodeKind::ImportClause {
                is_type_only,
                name,
                named_bindings,
            },
            clause_start,
        );
        let module_specifier = self.parse_string_literal();
        self.skip_import_attributes();
        self.parse_semicolon();
        self.finish_node(
            NodeKind::ImportDeclaration {
                import_clause,
                module_specifier,
            },
            start,
        )
    }

    /// Skip `assert { ... }` / `with { ... }` import attributes.
    fn skip_import_attributes(&mut self) {
        let is_attributes = !self.has_preceding_line_break()
            && self.is_identifier_or_keyword()
            && matches!(self.scanner.token_value(), "assert" | "with")
            && self.peek_token() == SyntaxKind::OpenBraceToken;
        if is_attributes {
            self.next_token();
            self.last_end = self.scanner.skip_block();
        }
    }

    fn parse_import_equals_rest(
        &mut self,
        start: u32,
        modifiers: ModifierFlags,
        is_type_only: bool,
    ) -> NodeIndex {
        let name = self.parse_identifier();
        self.parse_expected(SyntaxKind::EqualsToken);
        let module_reference = if self.is_token(SyntaxKind::RequireKeyword)
            && self.peek_token() == SyntaxKind::OpenParenToken
        {
            let ref_start = self.token_pos();
            self.next_token();
            self.parse_expected(SyntaxKind::OpenParenToken);
            let expression = self.parse_string_literal();
            self.parse_expected(SyntaxKind::CloseParenToken);
            self.finish_node(NodeKind::ExternalModuleReference { expression }, ref_start)
        } else {
            self.parse_entity_name(false)
        };
        self.parse_semicolon();
        self.finish_node(
            NodeKind::ImportEqualsDeclaration {
                modifiers,
                is_type_only,
                name,
                module_reference,
            },
            start,
        )
    }

    /// `{ a, b as c, type d }` for imports or exports.
    fn parse_specifier_list(&mut self, is_import: bool) -> NodeList {
        let mut elements = Vec::new();
        self.parse_expected(SyntaxKind::OpenBraceToken);
        while !self.is_token(SyntaxKind::CloseBraceToken)
            && !self.is_token(SyntaxKind::EndOfFileToken)
        {
            let pos_before = self.token_pos();
            elements.push(self.parse_specifier(is_import));
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
            if self.token_pos() == pos_before {
                break;
            }
        }
        self.parse_expected(SyntaxKind::CloseBraceToken);
        elements
    }

    fn parse_specifier(&mut self, is_import: bool) -> NodeIndex {
        let start = self.token_pos();
        // `type x`, but `type as x` renames a binding called `type`.
        let is_type_only = self.is_token(SyntaxKind::TypeKeyword)
            && self.look_ahead(|p| {
                p.next_token();
                if p.is_token(SyntaxKind::AsKeyword) {
                    p.next_token();
                    return p.is_token(SyntaxKind::AsKeyword);
                }
                p.is_identifier_or_keyword() || p.is_token(SyntaxKind::StringLiteral)
            });
        if is_type_only {
            self.next_token();
        }
        let first = self.parse_module_export_name();
        let (property_name, name) = if self.parse_optional(SyntaxKind::AsKeyword) {
            (first, self.parse_module_export_name())
        } else {
            (NodeIndex::NONE, first)
        };
        let kind = if is_import {
            NodeKind::ImportSpecifier {
                is_type_only,
                property_name,
                name,
            }
        } else {
            NodeKind::ExportSpecifier {
                is_type_only,
                property_name,
                name,
            }
        };
        self.finish_node(kind, start)
    }

    fn parse_export(&mut self, start: u32) -> NodeIndex {
        self.is_external_module = true;
        self.next_token(); // export

        match self.token() {
            SyntaxKind::EqualsToken => {
                self.next_token();
                let expression = self.parse_expression();
                self.parse_semicolon();
                return self.finish_node(
                    NodeKind::ExportAssignment {
                        is_export_equals: true,
                        expression,
                    },
                    start,
                );
            }
            SyntaxKind::AsKeyword => {
                // export as namespace Foo;
                self.next_token();
                self.parse_expected(SyntaxKind::NamespaceKeyword);
                let name = self.parse_identifier();
                self.parse_semicolon();
                return self.finish_node(NodeKind::NamespaceExportDeclaration { name }, start);
            }
            SyntaxKind::AsteriskToken | SyntaxKind::OpenBraceToken => {
                return self.parse_export_declaration(start, false);
            }
            SyntaxKind::TypeKeyword => {
                let next = self.peek_token();
                if matches!(next, SyntaxKind::OpenBraceToken | SyntaxKind::AsteriskToken) {
                    self.next_token();
                    return self.parse_export_declaration(start, true);
                }
            }
            SyntaxKind::ImportKeyword => {
                return self.parse_import_declaration(start, ModifierFlags::EXPORT);
            }
            SyntaxKind::DefaultKeyword => {
                self.next_token();
                return self.parse_export_default(start);
            }
            _ => {}
        }

        self.skip_decorators();
        let modifiers = ModifierFlags::EXPORT | self.parse_statement_modifiers();
        match self.parse_declaration(start, modifiers) {
            Some(declaration) => declaration,
            None => {
                self.error_at_token(
                    diagnostic_messages::DECLARATION_OR_STATEMENT_EXPECTED,
                    diagnostic_codes::DECLARATION_OR_STATEMENT_EXPECTED,
                );
                self.parse_opaque_statement(start)
            }
        }
    }

    fn parse_export_default(&mut self, start: u32) -> NodeIndex {
        let modifiers = ModifierFlags::EXPORT | ModifierFlags::DEFAULT;
        let starts_declaration = match self.token() {
            SyntaxKind::FunctionKeyword | SyntaxKind::ClassKeyword => true,
            SyntaxKind::AbstractKeyword | SyntaxKind::AsyncKeyword | SyntaxKind::DeclareKeyword => {
                self.next_token_on_same_line(|p| {
                    p.is_token(SyntaxKind::ClassKeyword) || p.is_token(SyntaxKind::FunctionKeyword)
                })
            }
            SyntaxKind::InterfaceKeyword => self.next_token_on_same_line(|p| p.is_identifier()),
            SyntaxKind::AtToken => true,
            _ => false,
        };
        if starts_declaration {
            self.skip_decorators();
            let modifiers = modifiers | self.parse_statement_modifiers();
            if let Some(declaration) = self.parse_declaration(start, modifiers) {
                return declaration;
            }
        }
        let expression = self.parse_expression();
        self.parse_semicolon();
        self.finish_node(
            NodeKind::ExportAssignment {
                is_export_equals: false,
                expression,
            },
            start,
        )
    }

    /// `export * from`, `export * as ns from`, `export { ... } [from]`.
    fn parse_export_declaration(&mut self, start: u32, is_type_only: bool) -> NodeIndex {
        let mut export_clause = NodeIndex::NONE;
        let mut module_specifier = NodeIndex::NONE;
        if self.is_token(SyntaxKind::AsteriskToken) {
            let star_start = self.token_pos();
            self.next_token();
            if self.parse_optional(SyntaxKind::AsKeyword) {
                let name = self.parse_module_export_name();
                export_clause = self.finish_node(NodeKind::NamespaceExport { name }, star_start);
            }
            self.parse_expected_from();
            module_specifier = self.parse_string_literal();
        } else {
            let list_start = self.token_pos();
            let elements = self.parse_specifier_list(false);
            export_clause = self.finish_node(NodeKind::NamedExports { elements }, list_start);
            if self.parse_optional(SyntaxKind::FromKeyword) {
                module_specifier = self.parse_string_literal();
            }
        }
        self.skip_import_attributes();
        self.parse_semicolon();
        self.finish_node(
            NodeKind::ExportDeclaration {
                is_type_only,
                export_clause,
                module_specifier,
            },
            start,
        )
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    fn parse_variable_statement(&mut self, start: u32, modifiers: ModifierFlags) -> NodeIndex {
        let kind = match self.token() {
            SyntaxKind::ConstKeyword => VariableKind::Const,
            SyntaxKind::LetKeyword => VariableKind::Let,
            _ => VariableKind::Var,
        };
        self.next_token();

        let mut declarations = Vec::new();
        loop {
            let decl_start = self.token_pos();
            let name = self.parse_binding_name();
            let exclamation = self.parse_optional(SyntaxKind::ExclamationToken);
            let type_annotation = if self.parse_optional(SyntaxKind::ColonToken) {
                self.parse_type()
            } else {
                NodeIndex::NONE
            };
            let initializer = if self.parse_optional(SyntaxKind::EqualsToken) {
                self.parse_variable_initializer()
            } else {
                NodeIndex::NONE
            };
            declarations.push(self.finish_node(
                NodeKind::VariableDeclaration {
                    name,
                    exclamation,
                    type_annotation,
                    initializer,
                },
                decl_start,
            ));
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.parse_semicolon();
        self.finish_node(
            NodeKind::VariableStatement {
                modifiers,
                kind,
                declarations,
            },
            start,
        )
    }

    fn parse_function_declaration(&mut self, start: u32, modifiers: ModifierFlags) -> NodeIndex {
        self.parse_expected(SyntaxKind::FunctionKeyword);
        self.parse_optional(SyntaxKind::AsteriskToken);
        let name = if self.is_identifier() {
            self.parse_identifier()
        } else {
            if !modifiers.contains(ModifierFlags::DEFAULT) {
                self.parse_identifier();
            }
            NodeIndex::NONE
        };
        let type_parameters = self.parse_type_parameters();
        let parameters = self.parse_parameters();
        let return_type = self.parse_return_type_annotation();
        let has_body = self.parse_function_body();
        self.finish_node(
            NodeKind::FunctionDeclaration {
                modifiers,
                name,
                type_parameters,
                parameters,
                return_type,
                has_body,
            },
            start,
        )
    }

    /// Skip a `{ ... }` body or consume the `;` of a bodiless signature.
    /// Returns whether a body was present.
    pub(crate) fn parse_function_body(&mut self) -> bool {
        if self.is_token(SyntaxKind::OpenBraceToken) {
            self.last_end = self.scanner.skip_block();
            true
        } else {
            self.parse_semicolon();
            false
        }
    }

    fn parse_class_declaration(&mut self, start: u32, modifiers: ModifierFlags) -> NodeIndex {
        self.parse_expected(SyntaxKind::ClassKeyword);
        let name = if self.is_identifier()
            && !self.is_token(SyntaxKind::ImplementsKeyword)
            && !self.is_token(SyntaxKind::ExtendsKeyword)
        {
            self.parse_identifier()
        } else {
            NodeIndex::NONE
        };
        let type_parameters = self.parse_type_parameters();
        let heritage_clauses = self.parse_heritage_clauses();
        let members = self.parse_class_members();
        self.finish_node(
            NodeKind::ClassDeclaration {
                modifiers,
                name,
                type_parameters,
                heritage_clauses,
                members,
            },
            start,
        )
    }

    fn parse_interface_declaration(&mut self, start: u32, modifiers: ModifierFlags) -> NodeIndex {
        self.parse_expected(SyntaxKind::InterfaceKeyword);
        let name = self.parse_identifier();
        let type_parameters = self.parse_type_parameters();
        let heritage_clauses = self.parse_heritage_clauses();
        let members = self.parse_type_member_block();
        self.finish_node(
            NodeKind::InterfaceDeclaration {
                modifiers,
                name,
                type_parameters,
                heritage_clauses,
                members,
            },
            start,
        )
    }

    fn parse_heritage_clauses(&mut self) -> NodeList {
        let mut clauses = Vec::new();
        loop {
            let token = match self.token() {
                SyntaxKind::ExtendsKeyword => HeritageToken::Extends,
                SyntaxKind::ImplementsKeyword => HeritageToken::Implements,
                _ => break,
            };
            let start = self.token_pos();
            self.next_token();
            let mut types = Vec::new();
            loop {
                types.push(self.parse_expression_with_type_arguments());
                if !self.parse_optional(SyntaxKind::CommaToken) {
                    break;
                }
            }
            clauses.push(self.finish_node(NodeKind::HeritageClause { token, types }, start));
        }
        clauses
    }

    fn parse_expression_with_type_arguments(&mut self) -> NodeIndex {
        let start = self.token_pos();
        let mut expression = self.parse_identifier_name();
        while self.is_token(SyntaxKind::DotToken) {
            self.next_token();
            let name = self.parse_identifier_name();
            expression =
                self.finish_node(NodeKind::PropertyAccessExpression { expression, name }, start);
        }
        if self.is_token(SyntaxKind::OpenParenToken) {
            // `extends mixin(Base)`: keep the call as text.
            self.skip_balanced(SyntaxKind::OpenParenToken, SyntaxKind::CloseParenToken);
            let text = self.source_slice(start, self.last_end);
            expression = self.finish_node(NodeKind::OpaqueExpression { text }, start);
        }
        let type_arguments = self.parse_type_arguments();
        self.finish_node(
            NodeKind::ExpressionWithTypeArguments {
                expression,
                type_arguments,
            },
            start,
        )
    }

    fn parse_type_alias_declaration(&mut self, start: u32, modifiers: ModifierFlags) -> NodeIndex {
        self.parse_expected(SyntaxKind::TypeKeyword);
        let name = self.parse_identifier();
        let type_parameters = self.parse_type_parameters();
        self.parse_expected(SyntaxKind::EqualsToken);
        let type_node = self.parse_type();
        self.parse_semicolon();
        self.finish_node(
            NodeKind::TypeAliasDeclaration {
                modifiers,
                name,
                type_parameters,
                type_node,
            },
            start,
        )
    }

    fn parse_enum_declaration(&mut self, start: u32, modifiers: ModifierFlags) -> NodeIndex {
        self.parse_expected(SyntaxKind::EnumKeyword);
        let name = self.parse_identifier();
        let mut members = Vec::new();
        if self.parse_expected(SyntaxKind::OpenBraceToken) {
            while !self.is_token(SyntaxKind::CloseBraceToken)
                && !self.is_token(SyntaxKind::EndOfFileToken)
            {
                let jsdoc = self.scanner.token_jsdoc();
                let member_start = self.token_pos();
                let member_name = self.parse_property_name();
                let initializer = if self.parse_optional(SyntaxKind::EqualsToken) {
                    self.parse_expression()
                } else {
                    NodeIndex::NONE
                };
                let member = self.finish_node(
                    NodeKind::EnumMember {
                        name: member_name,
                        initializer,
                    },
                    member_start,
                );
                self.attach_jsdoc(member, jsdoc);
                members.push(member);
                if !self.parse_optional(SyntaxKind::CommaToken) {
                    break;
                }
            }
            self.parse_expected(SyntaxKind::CloseBraceToken);
        }
        self.finish_node(
            NodeKind::EnumDeclaration {
                modifiers,
                name,
                members,
            },
            start,
        )
    }

    fn parse_module_declaration(&mut self, start: u32, modifiers: ModifierFlags) -> NodeIndex {
        let kind = if self.is_token(SyntaxKind::NamespaceKeyword) {
            ModuleDeclarationKind::Namespace
        } else {
            ModuleDeclarationKind::Module
        };
        self.next_token();

        if self.is_token(SyntaxKind::StringLiteral) {
            let name = self.parse_string_literal();
            let body = if self.is_token(SyntaxKind::OpenBraceToken) {
                self.parse_module_block()
            } else {
                self.parse_semicolon();
                NodeIndex::NONE
            };
            return self.finish_node(
                NodeKind::ModuleDeclaration {
                    modifiers,
                    kind: ModuleDeclarationKind::Module,
                    name,
                    body,
                },
                start,
            );
        }
        self.parse_namespace_body(start, modifiers, kind)
    }

    /// `A.B.C { ... }`: each dotted segment becomes a nested declaration.
    fn parse_namespace_body(
        &mut self,
        start: u32,
        modifiers: ModifierFlags,
        kind: ModuleDeclarationKind,
    ) -> NodeIndex {
        let name = self.parse_identifier();
        let body = if self.is_token(SyntaxKind::DotToken) {
            self.next_token();
            let inner_start = self.token_pos();
            self.parse_namespace_body(inner_start, ModifierFlags::EXPORT, kind)
        } else {
            self.parse_module_block()
        };
        self.finish_node(
            NodeKind::ModuleDeclaration {
                modifiers,
                kind,
                name,
                body,
            },
            start,
        )
    }

    fn parse_global_augmentation(&mut self, start: u32, modifiers: ModifierFlags) -> NodeIndex {
        let name = self.parse_identifier_name();
        let body = self.parse_module_block();
        self.finish_node(
            NodeKind::ModuleDeclaration {
                modifiers,
                kind: ModuleDeclarationKind::Global,
                name,
                body,
            },
            start,
        )
    }

    fn parse_module_block(&mut self) -> NodeIndex {
        let start = self.token_pos();
        if self.depth >= MAX_TYPE_NESTING_DEPTH {
            self.error_node_too_deep();
            self.last_end = self.scanner.skip_block();
            return self.finish_node(NodeKind::ModuleBlock { statements: Vec::new() }, start);
        }
        self.depth += 1;
        // Imports and exports inside a module body do not make the file a module.
        let was_external_module = self.is_external_module;
        self.parse_expected(SyntaxKind::OpenBraceToken);
        let statements = self.parse_statement_list(true);
        self.parse_expected(SyntaxKind::CloseBraceToken);
        self.is_external_module = was_external_module;
        self.depth -= 1;
        self.finish_node(NodeKind::ModuleBlock { statements }, start)
    }

    // =========================================================================
    // Parameters
    // =========================================================================

    /// `(a: T, b?: U, ...rest: V[])`
    pub(crate) fn parse_parameters(&mut self) -> NodeList {
        let mut parameters = Vec::new();
        if !self.parse_expected(SyntaxKind::OpenParenToken) {
            return parameters;
        }
        while !self.is_token(SyntaxKind::CloseParenToken)
            && !self.is_token(SyntaxKind::EndOfFileToken)
        {
            let pos_before = self.token_pos();
            parameters.push(self.parse_parameter());
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
            if self.token_pos() == pos_before {
                break;
            }
        }
        self.parse_expected(SyntaxKind::CloseParenToken);
        parameters
    }

    fn parse_parameter(&mut self) -> NodeIndex {
        let jsdoc = self.scanner.token_jsdoc();
        let start = self.token_pos();
        self.skip_decorators();
        let mut modifiers = ModifierFlags::empty();
        loop {
            let flag = match self.token() {
                SyntaxKind::PublicKeyword => ModifierFlags::PUBLIC,
                SyntaxKind::PrivateKeyword => ModifierFlags::PRIVATE,
                SyntaxKind::ProtectedKeyword => ModifierFlags::PROTECTED,
                SyntaxKind::ReadonlyKeyword => ModifierFlags::READONLY,
                SyntaxKind::OverrideKeyword => ModifierFlags::OVERRIDE,
                _ => break,
            };
            let is_modifier = self.look_ahead(|p| {
                p.next_token();
                p.is_identifier_or_keyword()
                    || p.is_token(SyntaxKind::OpenBraceToken)
                    || p.is_token(SyntaxKind::OpenBracketToken)
                    || p.is_token(SyntaxKind::DotDotDotToken)
            });
            if !is_modifier {
                break;
            }
            modifiers |= flag;
            self.next_token();
        }
        let dot_dot_dot = self.parse_optional(SyntaxKind::DotDotDotToken);
        let name = self.parse_parameter_name();
        let question = self.parse_optional(SyntaxKind::QuestionToken);
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
        let parameter = self.finish_node(
            NodeKind::Parameter {
                modifiers,
                dot_dot_dot,
                name,
                question,
                type_annotation,
                initializer,
            },
            start,
        );
        self.attach_jsdoc(parameter, jsdoc);
        parameter
    }

    /// `: T` after a signature, or `NONE`.
    pub(crate) fn parse_return_type_annotation(&mut self) -> NodeIndex {
        if self.parse_optional(SyntaxKind::ColonToken) {
            self.parse_type()
        } else {
            NodeIndex::NONE
        }
    }
}

fn regex_may_follow(previous: Option<SyntaxKind>) -> bool {
    match previous {
        None => true,
        Some(kind) => !matches!(
            kind,
            SyntaxKind::Identifier
                | SyntaxKind::NumericLiteral
                | SyntaxKind::BigIntLiteral
                | SyntaxKind::StringLiteral
                | SyntaxKind::NoSubstitutionTemplateLiteral
                | SyntaxKind::RegularExpressionLiteral
                | SyntaxKind::CloseParenToken
                | SyntaxKind::CloseBracketToken
                | SyntaxKind::CloseBraceToken
                | SyntaxKind::ThisKeyword
                | SyntaxKind::TrueKeyword
                | SyntaxKind::FalseKeyword
                | SyntaxKind::NullKeyword
        ),
    }
}
