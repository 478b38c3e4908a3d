//! Tokenizer for TypeScript and JavaScript source text.
//!
//! The scanner produces one token at a time on demand. Besides the usual
//! tokens it tracks two pieces of trivia the parser needs: whether a line
//! break preceded the current token (for ASI-style statement boundaries) and
//! the last `/** ... */` comment seen before it (JSDoc attachment).
//!
//! Function bodies and initializers are never parsed; `skip_block` and
//! `skip_template` jump over them at the character level, which is
//! tolerant of regular expression literals and nested template strings.

use crate::syntax_kind::{SyntaxKind, text_to_keyword};
use dtsroll_common::Span;
use dtsroll_common::diagnostics::{diagnostic_codes, diagnostic_messages};

/// A lexical error found while scanning.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScannerDiagnostic {
    pub start: u32,
    pub length: u32,
    pub message: &'static str,
    pub code: u32,
}

/// Saved scanner position for speculative parsing.
#[derive(Clone, Debug)]
pub struct ScannerSnapshot {
    pos: usize,
    token: SyntaxKind,
    token_start: usize,
    token_value: String,
    preceding_line_break: bool,
    token_jsdoc: Option<Span>,
    diagnostics_len: usize,
}

pub struct ScannerState {
    text: String,
    pos: usize,
    token: SyntaxKind,
    token_start: usize,
    token_value: String,
    preceding_line_break: bool,
    token_jsdoc: Option<Span>,
    diagnostics: Vec<ScannerDiagnostic>,
}

const REGEX_PRECEDING_WORDS: &[&str] = &[
    "return", "typeof", "case", "do", "else", "in", "of", "new", "delete", "void", "throw",
    "yield", "await",
];

impl ScannerState {
    pub fn new(text: String) -> ScannerState {
        // Skip a byte order mark.
        let pos = if text.starts_with('\u{feff}') { 3 } else { 0 };
        ScannerState {
            text,
            pos,
            token: SyntaxKind::Unknown,
            token_start: pos,
            token_value: String::new(),
            preceding_line_break: false,
            token_jsdoc: None,
            diagnostics: Vec::new(),
        }
    }

    pub fn source_text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }

    #[inline]
    pub fn token(&self) -> SyntaxKind {
        self.token
    }

    #[inline]
    pub fn token_start(&self) -> u32 {
        self.token_start as u32
    }

    /// End offset of the current token.
    #[inline]
    pub fn token_end(&self) -> u32 {
        self.pos as u32
    }

    /// Identifier text, cooked string literal value, numeric source text, or
    /// raw template chunk of the current token.
    pub fn token_value(&self) -> &str {
        &self.token_value
    }

    pub fn token_text(&self) -> &str {
        self.text.get(self.token_start..self.pos).unwrap_or("")
    }

    pub fn has_preceding_line_break(&self) -> bool {
        self.preceding_line_break
    }

    /// The JSDoc comment directly preceding the current token.
    pub fn token_jsdoc(&self) -> Option<Span> {
        self.token_jsdoc
    }

    pub fn diagnostics(&self) -> &[ScannerDiagnostic] {
        &self.diagnostics
    }

    pub fn save_state(&self) -> ScannerSnapshot {
        ScannerSnapshot {
            pos: self.pos,
            token: self.token,
            token_start: self.token_start,
            token_value: self.token_value.clone(),
            preceding_line_break: self.preceding_line_break,
            token_jsdoc: self.token_jsdoc,
            diagnostics_len: self.diagnostics.len(),
        }
    }

    pub fn restore_state(&mut self, snapshot: ScannerSnapshot) {
        self.pos = snapshot.pos;
        self.token = snapshot.token;
        self.token_start = snapshot.token_start;
        self.token_value = snapshot.token_value;
        self.preceding_line_break = snapshot.preceding_line_break;
        self.token_jsdoc = snapshot.token_jsdoc;
        self.diagnostics.truncate(snapshot.diagnostics_len);
    }

    fn byte(&self, at: usize) -> u8 {
        self.text.as_bytes().get(at).copied().unwrap_or(0)
    }

    fn error(&mut self, start: usize, end: usize, message: &'static str, code: u32) {
        self.diagnostics.push(ScannerDiagnostic {
            start: start as u32,
            length: end.saturating_sub(start) as u32,
            message,
            code,
        });
    }

    // =========================================================================
    // Trivia
    // =========================================================================

    fn skip_trivia(&mut self) {
        self.preceding_line_break = false;
        self.token_jsdoc = None;
        let len = self.text.len();
        while self.pos < len {
            match self.byte(self.pos) {
                b'\n' | b'\r' => {
                    self.preceding_line_break = true;
                    self.pos += 1;
                }
                b' ' | b'\t' | 0x0b | 0x0c => self.pos += 1,
                b'/' if self.byte(self.pos + 1) == b'/' => {
                    while self.pos < len && !matches!(self.byte(self.pos), b'\n' | b'\r') {
                        self.pos += 1;
                    }
                }
                b'/' if self.byte(self.pos + 1) == b'*' => {
                    let start = self.pos;
                    let is_jsdoc =
                        self.byte(self.pos + 2) == b'*' && self.byte(self.pos + 3) != b'/';
                    match self.text[self.pos + 2..].find("*/") {
                        Some(offset) => {
                            let end = self.pos + 2 + offset + 2;
                            if self.text[start..end].contains('\n') {
                                self.preceding_line_break = true;
                            }
                            self.pos = end;
                            if is_jsdoc {
                                self.token_jsdoc = Some(Span::new(start as u32, end as u32));
                            }
                        }
                        None => {
                            self.pos = len;
                            self.error(
                                start,
                                len,
                                diagnostic_messages::ASTERISK_SLASH_EXPECTED,
                                diagnostic_codes::ASTERISK_SLASH_EXPECTED,
                            );
                        }
                    }
                }
                b'#' if self.pos == 0 && self.byte(1) == b'!' => {
                    while self.pos < len && !matches!(self.byte(self.pos), b'\n' | b'\r') {
                        self.pos += 1;
                    }
                }
                0xc2 if self.byte(self.pos + 1) == 0xa0 => self.pos += 2,
                _ => break,
            }
        }
    }

    // =========================================================================
    // Tokens
    // =========================================================================

    /// Advance to the next token.
    pub fn scan(&mut self) -> SyntaxKind {
        self.skip_trivia();
        self.token_start = self.pos;
        self.token_value.clear();

        if self.pos >= self.text.len() {
            self.token = SyntaxKind::EndOfFileToken;
            return self.token;
        }

        let ch = self.byte(self.pos);
        self.token = match ch {
            b'{' => self.single(SyntaxKind::OpenBraceToken),
            b'}' => self.single(SyntaxKind::CloseBraceToken),
            b'(' => self.single(SyntaxKind::OpenParenToken),
            b')' => self.single(SyntaxKind::CloseParenToken),
            b'[' => self.single(SyntaxKind::OpenBracketToken),
            b']' => self.single(SyntaxKind::CloseBracketToken),
            b';' => self.single(SyntaxKind::SemicolonToken),
            b',' => self.single(SyntaxKind::CommaToken),
            b':' => self.single(SyntaxKind::ColonToken),
            b'@' => self.single(SyntaxKind::AtToken),
            b'<' => self.single(SyntaxKind::LessThanToken),
            b'>' => self.single(SyntaxKind::GreaterThanToken),
            b'.' => {
                if self.byte(self.pos + 1).is_ascii_digit() {
                    self.scan_number()
                } else if self.byte(self.pos + 1) == b'.' && self.byte(self.pos + 2) == b'.' {
                    self.pos += 3;
                    SyntaxKind::DotDotDotToken
                } else {
                    self.single(SyntaxKind::DotToken)
                }
            }
            b'=' => match self.byte(self.pos + 1) {
                b'>' => {
                    self.pos += 2;
                    SyntaxKind::EqualsGreaterThanToken
                }
                b'=' => self.operator(),
                _ => self.single(SyntaxKind::EqualsToken),
            },
            b'?' => match self.byte(self.pos + 1) {
                b'.' if !self.byte(self.pos + 2).is_ascii_digit() => {
                    self.pos += 2;
                    SyntaxKind::QuestionDotToken
                }
                b'?' => self.operator(),
                _ => self.single(SyntaxKind::QuestionToken),
            },
            b'|' | b'&' | b'+' | b'-' | b'*' | b'!' | b'%' | b'^' | b'~' => {
                let next = self.byte(self.pos + 1);
                let compound = next == b'='
                    || (next == ch && matches!(ch, b'|' | b'&' | b'+' | b'-' | b'*'));
                if compound {
                    self.operator()
                } else {
                    self.single(match ch {
                        b'|' => SyntaxKind::BarToken,
                        b'&' => SyntaxKind::AmpersandToken,
                        b'+' => SyntaxKind::PlusToken,
                        b'-' => SyntaxKind::MinusToken,
                        b'*' => SyntaxKind::AsteriskToken,
                        b'!' => SyntaxKind::ExclamationToken,
                        _ => SyntaxKind::OperatorToken,
                    })
                }
            }
            b'/' => {
                if self.byte(self.pos + 1) == b'=' {
                    self.operator()
                } else {
                    self.single(SyntaxKind::SlashToken)
                }
            }
            b'"' | b'\'' => self.scan_string(ch),
            b'`' => {
                self.pos += 1;
                self.scan_template_chunk(true)
            }
            b'#' => {
                self.pos += 1;
                if is_identifier_start(self.byte(self.pos)) {
                    self.scan_identifier_tail();
                    self.token_value = self.text[self.token_start..self.pos].to_string();
                    SyntaxKind::PrivateIdentifier
                } else {
                    SyntaxKind::HashToken
                }
            }
            b'0'..=b'9' => self.scan_number(),
            _ if is_identifier_start(ch) || ch == b'\\' => {
                self.scan_identifier_tail();
                self.token_value = self.text[self.token_start..self.pos].to_string();
                text_to_keyword(&self.token_value).unwrap_or(SyntaxKind::Identifier)
            }
            _ => {
                // Advance by a whole character to stay on a UTF-8 boundary.
                let width = self.text[self.pos..]
                    .chars()
                    .next()
                    .map(char::len_utf8)
                    .unwrap_or(1);
                self.pos += width;
                SyntaxKind::Unknown
            }
        };
        self.token
    }

    fn single(&mut self, kind: SyntaxKind) -> SyntaxKind {
        self.pos += 1;
        kind
    }

    fn operator(&mut self) -> SyntaxKind {
        if self.byte(self.pos) == b'/' {
            self.pos += 1;
        }
        while matches!(
            self.byte(self.pos),
            b'=' | b'!' | b'&' | b'|' | b'+' | b'-' | b'*' | b'%' | b'^' | b'~' | b'?'
        ) && self.pos - self.token_start < 4
        {
            // `a ===-1`: a sign after `=` starts the operand.
            let sign_after_equals = self.pos > self.token_start + 1
                && matches!(self.byte(self.pos), b'+' | b'-' | b'!' | b'~')
                && self.byte(self.pos - 1) == b'=';
            if sign_after_equals {
                break;
            }
            self.pos += 1;
        }
        self.token_value = self.text[self.token_start..self.pos].to_string();
        SyntaxKind::OperatorToken
    }

    fn scan_identifier_tail(&mut self) {
        while self.pos < self.text.len() {
            let b = self.byte(self.pos);
            if is_identifier_part(b) {
                self.pos += 1;
            } else if b == b'\\' && self.byte(self.pos + 1) == b'u' {
                // Unicode escape inside an identifier; keep the raw spelling.
                self.pos += 2;
                if self.byte(self.pos) == b'{' {
                    while self.pos < self.text.len() && self.byte(self.pos) != b'}' {
                        self.pos += 1;
                    }
                    self.pos += 1;
                } else {
                    self.pos += 4;
                }
                self.pos = self.pos.min(self.text.len());
            } else {
                break;
            }
        }
    }

    fn scan_number(&mut self) -> SyntaxKind {
        let start = self.pos;
        let first = self.byte(self.pos);
        let prefixed = first == b'0'
            && matches!(
                self.byte(self.pos + 1),
                b'x' | b'X' | b'o' | b'O' | b'b' | b'B'
            );
        if prefixed {
            self.pos += 2;
            while self.byte(self.pos).is_ascii_hexdigit() || self.byte(self.pos) == b'_' {
                self.pos += 1;
            }
        } else {
            while self.byte(self.pos).is_ascii_digit() || self.byte(self.pos) == b'_' {
                self.pos += 1;
            }
            if self.byte(self.pos) == b'.' {
                self.pos += 1;
                while self.byte(self.pos).is_ascii_digit() || self.byte(self.pos) == b'_' {
                    self.pos += 1;
                }
            }
            if matches!(self.byte(self.pos), b'e' | b'E') {
                let mut look = self.pos + 1;
                if matches!(self.byte(look), b'+' | b'-') {
                    look += 1;
                }
                if self.byte(look).is_ascii_digit() {
                    self.pos = look;
                    while self.byte(self.pos).is_ascii_digit() || self.byte(self.pos) == b'_' {
                        self.pos += 1;
                    }
                }
            }
        }
        if self.byte(self.pos) == b'n' {
            self.token_value = self.text[start..self.pos + 1].to_string();
            self.pos += 1;
            return SyntaxKind::BigIntLiteral;
        }
        self.token_value = self.text[start..self.pos].to_string();
        SyntaxKind::NumericLiteral
    }

    fn scan_string(&mut self, quote: u8) -> SyntaxKind {
        let start = self.pos;
        self.pos += 1;
        let mut value = String::new();
        loop {
            if self.pos >= self.text.len() {
                self.error(
                    start,
                    self.pos,
                    diagnostic_messages::UNTERMINATED_STRING_LITERAL,
                    diagnostic_codes::UNTERMINATED_STRING_LITERAL,
                );
                break;
            }
            let b = self.byte(self.pos);
            if b == quote {
                self.pos += 1;
                break;
            }
            match b {
                b'\n' | b'\r' => {
                    self.error(
                        start,
                        self.pos,
                        diagnostic_messages::UNTERMINATED_STRING_LITERAL,
                        diagnostic_codes::UNTERMINATED_STRING_LITERAL,
                    );
                    break;
                }
                b'\\' => self.scan_escape(&mut value),
                _ => {
                    let ch = self.text[self.pos..].chars().next().unwrap_or('\0');
                    value.push(ch);
                    self.pos += ch.len_utf8();
                }
            }
        }
        self.token_value = value;
        SyntaxKind::StringLiteral
    }

    fn scan_escape(&mut self, value: &mut String) {
        self.pos += 1;
        let b = self.byte(self.pos);
        self.pos += 1;
        match b {
            b'n' => value.push('\n'),
            b't' => value.push('\t'),
            b'r' => value.push('\r'),
            b'b' => value.push('\u{8}'),
            b'f' => value.push('\u{c}'),
            b'v' => value.push('\u{b}'),
            b'0' if !self.byte(self.pos).is_ascii_digit() => value.push('\0'),
            b'x' => {
                let hex = self.text.get(self.pos..self.pos + 2).unwrap_or("");
                if let Some(ch) = u32::from_str_radix(hex, 16).ok().and_then(char::from_u32) {
                    value.push(ch);
                    self.pos += 2;
                }
            }
            b'u' => {
                let (digits, consumed) = if self.byte(self.pos) == b'{' {
                    let rest = &self.text[self.pos + 1..];
                    let close = rest.find('}').unwrap_or(rest.len());
                    (&rest[..close], close + 2)
                } else {
                    (self.text.get(self.pos..self.pos + 4).unwrap_or(""), 4)
                };
                if let Some(ch) = u32::from_str_radix(digits, 16).ok().and_then(char::from_u32) {
                    value.push(ch);
                    self.pos = (self.pos + consumed).min(self.text.len());
                }
            }
            // Line continuation.
            b'\r' => {
                if self.byte(self.pos) == b'\n' {
                    self.pos += 1;
                }
            }
            b'\n' => {}
            _ => {
                self.pos -= 1;
                let ch = self.text[self.pos..].chars().next().unwrap_or('\\');
                value.push(ch);
                self.pos += ch.len_utf8();
            }
        }
    }

    /// Scan a template chunk starting after "`" (head) or "}" (continuation).
    /// The token value holds the raw, unescaped chunk text.
    fn scan_template_chunk(&mut self, is_head: bool) -> SyntaxKind {
        let chunk_start = self.pos;
        loop {
            if self.pos >= self.text.len() {
                self.error(
                    self.token_start,
                    self.pos,
                    diagnostic_messages::UNTERMINATED_TEMPLATE_LITERAL,
                    diagnostic_codes::UNTERMINATED_TEMPLATE_LITERAL,
                );
                self.token_value = self.text[chunk_start..].to_string();
                return if is_head {
                    SyntaxKind::NoSubstitutionTemplateLiteral
                } else {
                    SyntaxKind::TemplateTail
                };
            }
            match self.byte(self.pos) {
                b'`' => {
                    self.token_value = self.text[chunk_start..self.pos].to_string();
                    self.pos += 1;
                    return if is_head {
                        SyntaxKind::NoSubstitutionTemplateLiteral
                    } else {
                        SyntaxKind::TemplateTail
                    };
                }
                b'$' if self.byte(self.pos + 1) == b'{' => {
                    self.token_value = self.text[chunk_start..self.pos].to_string();
                    self.pos += 2;
                    return if is_head {
                        SyntaxKind::TemplateHead
                    } else {
                        SyntaxKind::TemplateMiddle
                    };
                }
                b'\\' => self.pos = (self.pos + 2).min(self.text.len()),
                _ => self.pos += 1,
            }
        }
    }

    /// Re-scan the current `}` token as the continuation of a template.
    pub fn rescan_template_continuation(&mut self) -> SyntaxKind {
        self.pos = self.token_start + 1;
        self.token = self.scan_template_chunk(false);
        self.token
    }

    /// Re-scan the current `/` or `/=` token as a regular expression literal.
    pub fn rescan_regex(&mut self) -> SyntaxKind {
        self.pos = self.token_start + 1;
        self.skip_regex_body();
        self.token_value = self.text[self.token_start..self.pos].to_string();
        self.token = SyntaxKind::RegularExpressionLiteral;
        self.token
    }

    // =========================================================================
    // Raw skipping
    // =========================================================================

    /// Skip from the current `{` token to its matching `}` without producing
    /// tokens, then scan the following token. Returns the end offset of the
    /// skipped block.
    pub fn skip_block(&mut self) -> u32 {
        self.pos = self.token_start + 1;
        if !self.skip_braces_raw() {
            self.error(
                self.token_start,
                self.text.len(),
                diagnostic_messages::EXPECTED,
                diagnostic_codes::EXPECTED,
            );
        }
        let end = self.pos as u32;
        self.scan();
        end
    }

    /// Skip the rest of a template literal whose head is the current token,
    /// turning it into a single `NoSubstitutionTemplateLiteral` token.
    pub fn skip_template(&mut self) {
        if self.token != SyntaxKind::TemplateHead {
            return;
        }
        // pos sits just after `${`.
        self.skip_braces_raw();
        self.skip_template_raw();
        self.token_value = self.text[self.token_start..self.pos].to_string();
        self.token = SyntaxKind::NoSubstitutionTemplateLiteral;
    }

    /// Skip to the `}` closing an already-open brace. Returns false at EOF.
    fn skip_braces_raw(&mut self) -> bool {
        let mut depth = 1usize;
        let mut prev: u8 = b'{';
        let mut prev_word_start: Option<usize> = None;
        let len = self.text.len();
        while self.pos < len {
            let b = self.byte(self.pos);
            match b {
                b'{' => {
                    depth += 1;
                    self.pos += 1;
                }
                b'}' => {
                    depth -= 1;
                    self.pos += 1;
                    if depth == 0 {
                        return true;
                    }
                }
                b'"' | b'\'' => {
                    self.pos += 1;
                    while self.pos < len {
                        let c = self.byte(self.pos);
                        if c == b'\\' {
                            self.pos += 2;
                        } else {
                            self.pos += 1;
                            if c == b || c == b'\n' {
                                break;
                            }
                        }
                    }
                }
                b'`' => {
                    self.pos += 1;
                    self.skip_template_raw();
                }
                b'/' if self.byte(self.pos + 1) == b'/' => {
                    while self.pos < len && self.byte(self.pos) != b'\n' {
                        self.pos += 1;
                    }
                    continue;
                }
                b'/' if self.byte(self.pos + 1) == b'*' => {
                    match self.text[self.pos + 2..].find("*/") {
                        Some(offset) => self.pos += offset + 4,
                        None => self.pos = len,
                    }
                    continue;
                }
                b'/' if self.regex_allowed_after(prev, prev_word_start) => {
                    self.pos += 1;
                    self.skip_regex_body();
                }
                _ if b.is_ascii_whitespace() => {
                    self.pos += 1;
                    continue;
                }
                _ if is_identifier_part(b) => {
                    let start = self.pos;
                    while self.pos < len && is_identifier_part(self.byte(self.pos)) {
                        self.pos += 1;
                    }
                    prev = self.byte(self.pos - 1);
                    prev_word_start = Some(start);
                    continue;
                }
                _ => self.pos += 1,
            }
            prev = b;
            prev_word_start = None;
        }
        self.pos = self.pos.min(len);
        false
    }

    /// Skip template text after the opening backtick through the closing one.
    fn skip_template_raw(&mut self) {
        let len = self.text.len();
        while self.pos < len {
            match self.byte(self.pos) {
                b'\\' => self.pos += 2,
                b'`' => {
                    self.pos += 1;
                    return;
                }
                b'$' if self.byte(self.pos + 1) == b'{' => {
                    self.pos += 2;
                    self.skip_braces_raw();
                }
                _ => self.pos += 1,
            }
        }
        self.pos = self.pos.min(len);
    }

    fn regex_allowed_after(&self, prev: u8, prev_word_start: Option<usize>) -> bool {
        if let Some(start) = prev_word_start {
            let word = &self.text[start..self.pos.min(self.text.len())];
            return REGEX_PRECEDING_WORDS.contains(&word.trim_end());
        }
        matches!(
            prev,
            b'(' | b',' | b'=' | b':' | b'[' | b'!' | b'&' | b'|' | b'?' | b'{' | b'}' | b';'
                | b'+' | b'-' | b'*' | b'%' | b'<' | b'>' | b'~' | b'^'
        )
    }

    /// Skip a regex body starting after the opening `/`, including flags.
    fn skip_regex_body(&mut self) {
        let len = self.text.len();
        let mut in_class = false;
        while self.pos < len {
            match self.byte(self.pos) {
                b'\\' => self.pos += 2,
                b'[' => {
                    in_class = true;
                    self.pos += 1;
                }
                b']' => {
                    in_class = false;
                    self.pos += 1;
                }
                b'/' if !in_class => {
                    self.pos += 1;
                    break;
                }
                b'\n' | b'\r' => break,
                _ => self.pos += 1,
            }
        }
        while self.pos < len && is_identifier_part(self.byte(self.pos)) {
            self.pos += 1;
        }
        self.pos = self.pos.min(len);
    }
}

#[inline]
fn is_identifier_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b'$' || b >= 0x80
}

#[inline]
fn is_identifier_part(b: u8) -> bool {
    is_identifier_start(b) || b.is_ascii_digit()
}

/// True when `text` can be written as a bare identifier.
pub fn is_identifier_text(text: &str) -> bool {
    let bytes = text.as_bytes();
    match bytes.first() {
        Some(&first) if is_identifier_start(first) => {
            bytes[1..].iter().all(|&b| is_identifier_part(b))
        }
        _ => false,
    }
}
