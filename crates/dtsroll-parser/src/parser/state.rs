//! Parser state - token handling, lookahead and diagnostics.

use crate::node::{NodeIndex, NodeKind};
use crate::node_arena::NodeArena;
use crate::scanner::{ScannerSnapshot, ScannerState};
use crate::syntax_kind::SyntaxKind;
use dtsroll_common::diagnostics::{
    Diagnostic, diagnostic_codes, diagnostic_messages, format_message,
};
use dtsroll_common::Span;

/// Saved parser position for speculative parsing.
pub(crate) struct ParserSnapshot {
    scanner: ScannerSnapshot,
    last_end: u32,
    diagnostics_len: usize,
}

/// Recursive-descent parser producing a [`NodeArena`].
///
/// ```
/// use dtsroll_parser::ParserState;
///
/// let mut parser = ParserState::new("a.ts".to_string(), "export type A = string;".to_string());
/// let root = parser.parse_source_file();
/// assert!(root.is_some());
/// assert!(parser.get_diagnostics().is_empty());
/// ```
pub struct ParserState {
    pub(crate) file_name: String,
    pub(crate) scanner: ScannerState,
    pub(crate) arena: NodeArena,
    pub(crate) diagnostics: Vec<Diagnostic>,
    /// End offset of the last consumed token.
    pub(crate) last_end: u32,
    /// Current type/namespace nesting depth.
    pub(crate) depth: u32,
    pub(crate) is_external_module: bool,
    /// Set while parsing the `extends` operand of a conditional type.
    pub(crate) disallow_conditional_types: bool,
}

impl ParserState {
    pub fn new(file_name: String, source_text: String) -> ParserState {
        let capacity = source_text.len() / 8;
        ParserState {
            file_name,
            scanner: ScannerState::new(source_text),
            arena: NodeArena::with_capacity(capacity),
            diagnostics: Vec::new(),
            last_end: 0,
            depth: 0,
            is_external_module: false,
            disallow_conditional_types: false,
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn get_arena(&self) -> &NodeArena {
        &self.arena
    }

    pub fn into_arena(self) -> NodeArena {
        self.arena
    }

    /// Consume the parser, returning the arena and all diagnostics.
    pub fn into_parts(self) -> (NodeArena, Vec<Diagnostic>) {
        (self.arena, self.diagnostics)
    }

    pub fn get_diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn source_text(&self) -> &str {
        self.scanner.source_text()
    }

    // =========================================================================
    // Tokens
    // =========================================================================

    #[inline]
    pub(crate) fn token(&self) -> SyntaxKind {
        self.scanner.token()
    }

    #[inline]
    pub(crate) fn is_token(&self, kind: SyntaxKind) -> bool {
        self.scanner.token() == kind
    }

    #[inline]
    pub(crate) fn token_pos(&self) -> u32 {
        self.scanner.token_start()
    }

    pub(crate) fn next_token(&mut self) -> SyntaxKind {
        self.last_end = self.scanner.token_end();
        self.scanner.scan()
    }

    pub(crate) fn parse_optional(&mut self, kind: SyntaxKind) -> bool {
        if self.is_token(kind) {
            self.next_token();
            true
        } else {
            false
        }
    }

    /// Consume `kind`, reporting TS1005 when it is missing.
    pub(crate) fn parse_expected(&mut self, kind: SyntaxKind) -> bool {
        if self.parse_optional(kind) {
            return true;
        }
        let message = format_message(diagnostic_messages::EXPECTED, &[kind.text()]);
        self.error_at_token(message, diagnostic_codes::EXPECTED);
        false
    }

    /// Statement terminator: `;`, or an ASI boundary.
    pub(crate) fn parse_semicolon(&mut self) {
        if self.parse_optional(SyntaxKind::SemicolonToken) {
            return;
        }
        if self.is_token(SyntaxKind::CloseBraceToken)
            || self.is_token(SyntaxKind::EndOfFileToken)
            || self.scanner.has_preceding_line_break()
        {
            return;
        }
        self.parse_expected(SyntaxKind::SemicolonToken);
    }

    pub(crate) fn is_identifier(&self) -> bool {
        let token = self.token();
        token == SyntaxKind::Identifier || (token.is_keyword() && !token.is_reserved_word())
    }

    pub(crate) fn is_identifier_or_keyword(&self) -> bool {
        self.token() == SyntaxKind::Identifier || self.token().is_keyword()
    }

    pub(crate) fn has_preceding_line_break(&self) -> bool {
        self.scanner.has_preceding_line_break()
    }

    // =========================================================================
    // Lookahead
    // =========================================================================

    pub(crate) fn snapshot(&self) -> ParserSnapshot {
        ParserSnapshot {
            scanner: self.scanner.save_state(),
            last_end: self.last_end,
            diagnostics_len: self.diagnostics.len(),
        }
    }

    pub(crate) fn restore(&mut self, snapshot: ParserSnapshot) {
        self.scanner.restore_state(snapshot.scanner);
        self.last_end = snapshot.last_end;
        self.diagnostics.truncate(snapshot.diagnostics_len);
    }

    /// Run `f` and rewind the token stream afterwards.
    pub(crate) fn look_ahead<T>(&mut self, f: impl FnOnce(&mut ParserState) -> T) -> T {
        let snapshot = self.snapshot();
        let result = f(self);
        self.restore(snapshot);
        result
    }

    /// Kind of the token after the current one.
    pub(crate) fn peek_token(&mut self) -> SyntaxKind {
        self.look_ahead(|p| p.next_token())
    }

    /// True when the next token is on the same line and satisfies `pred`.
    pub(crate) fn next_token_on_same_line(&mut self, pred: impl FnOnce(&ParserState) -> bool) -> bool {
        self.look_ahead(|p| {
            p.next_token();
            !p.has_preceding_line_break() && pred(p)
        })
    }

    // =========================================================================
    // Nodes and diagnostics
    // =========================================================================

    /// Add a node spanning from `start` to the end of the last consumed token.
    pub(crate) fn finish_node(&mut self, kind: NodeKind, start: u32) -> NodeIndex {
        let end = self.last_end.max(start);
        self.arena.add(kind, Span::new(start, end))
    }

    pub(crate) fn attach_jsdoc(&mut self, node: NodeIndex, jsdoc: Option<Span>) {
        if let Some(span) = jsdoc
            && node.is_some()
        {
            let text = span.text(self.scanner.source_text()).to_string();
            self.arena.set_jsdoc(node, text);
        }
    }

    pub(crate) fn error_at_token(&mut self, message: impl Into<String>, code: u32) {
        let start = self.token_pos();
        let end = self.scanner.token_end().max(start);
        // One diagnostic per position keeps error recovery from cascading.
        if self.diagnostics.last().is_some_and(|d| d.start == start) {
            return;
        }
        self.diagnostics.push(Diagnostic::error(
            self.file_name.clone(),
            Span::new(start, end),
            message,
            code,
        ));
    }

    pub(crate) fn error_node_too_deep(&mut self) {
        self.error_at_token(
            diagnostic_messages::NESTING_TOO_DEEP,
            diagnostic_codes::NESTING_TOO_DEEP,
        );
    }

    pub(crate) fn source_slice(&self, start: u32, end: u32) -> String {
        Span::new(start, end).text(self.scanner.source_text()).to_string()
    }

    /// Move scanner diagnostics into the parse diagnostics.
    pub(crate) fn collect_scanner_diagnostics(&mut self) {
        for diag in self.scanner.diagnostics() {
            self.diagnostics.push(Diagnostic::error(
                self.file_name.clone(),
                Span::new(diag.start, diag.start + diag.length),
                diag.message,
                diag.code,
            ));
        }
        self.diagnostics.sort_by_key(|d| d.start);
    }
}
