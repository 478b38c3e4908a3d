//! Diagnostic Infrastructure
//!
//! Diagnostics are plain data: a file name, a byte range, a message and a
//! TypeScript-compatible code. Rendering (colors, line/column, snippets) is
//! left to the reporter in the CLI crate.

use crate::span::Span;
use std::fmt;

// =============================================================================
// Diagnostic Category
// =============================================================================

/// The category of a diagnostic, mirroring tsc's `DiagnosticCategory`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DiagnosticCategory {
    Warning,
    Error,
    Suggestion,
    Message,
}

impl DiagnosticCategory {
    pub fn name(&self) -> &'static str {
        match self {
            DiagnosticCategory::Warning => "warning",
            DiagnosticCategory::Error => "error",
            DiagnosticCategory::Suggestion => "suggestion",
            DiagnosticCategory::Message => "message",
        }
    }
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Diagnostic
// =============================================================================

/// A diagnostic message with location, category, and code.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    /// The file containing the diagnostic; empty for global diagnostics.
    pub file: String,
    /// Byte offset of the start of the diagnostic.
    pub start: u32,
    /// Byte length of the diagnostic range.
    pub length: u32,
    pub message_text: String,
    pub category: DiagnosticCategory,
    /// The diagnostic code (e.g. 2307 for TS2307).
    pub code: u32,
}

impl Diagnostic {
    pub fn error(file: impl Into<String>, span: Span, message: impl Into<String>, code: u32) -> Self {
        Diagnostic {
            file: file.into(),
            start: span.start,
            length: span.len(),
            message_text: message.into(),
            category: DiagnosticCategory::Error,
            code,
        }
    }

    /// A diagnostic that is not attached to a location in any file.
    pub fn global(message: impl Into<String>, code: u32) -> Self {
        Diagnostic {
            file: String::new(),
            start: 0,
            length: 0,
            message_text: message.into(),
            category: DiagnosticCategory::Error,
            code,
        }
    }

    pub fn is_error(&self) -> bool {
        self.category == DiagnosticCategory::Error
    }

    pub fn span(&self) -> Span {
        Span::new(self.start, self.start + self.length)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.file.is_empty() {
            write!(f, "{} TS{}: {}", self.category, self.code, self.message_text)
        } else {
            write!(
                f,
                "{}@{}: {} TS{}: {}",
                self.file, self.start, self.category, self.code, self.message_text
            )
        }
    }
}

/// Substitute `{0}`, `{1}`, ... placeholders in a message template.
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{i}}}"), arg);
    }
    result
}

// =============================================================================
// Diagnostic codes and messages
// =============================================================================

/// TypeScript-compatible diagnostic codes used by dtsroll.
pub mod diagnostic_codes {
    pub const UNTERMINATED_STRING_LITERAL: u32 = 1002;
    pub const EXPECTED: u32 = 1005;
    pub const ASTERISK_SLASH_EXPECTED: u32 = 1010;
    pub const IDENTIFIER_EXPECTED: u32 = 1003;
    pub const EXPRESSION_EXPECTED: u32 = 1109;
    pub const TYPE_EXPECTED: u32 = 1110;
    pub const DECLARATION_OR_STATEMENT_EXPECTED: u32 = 1128;
    pub const UNTERMINATED_TEMPLATE_LITERAL: u32 = 1160;
    pub const DUPLICATE_IDENTIFIER: u32 = 2300;
    pub const MODULE_HAS_NO_EXPORTED_MEMBER: u32 = 2305;
    pub const CANNOT_FIND_MODULE: u32 = 2307;
    pub const CANNOT_READ_FILE: u32 = 5083;
    pub const FILE_NOT_FOUND: u32 = 6053;
    pub const NESTING_TOO_DEEP: u32 = 2589;
}

/// Message templates for the codes above.
pub mod diagnostic_messages {
    pub const UNTERMINATED_STRING_LITERAL: &str = "Unterminated string literal.";
    pub const EXPECTED: &str = "'{0}' expected.";
    pub const ASTERISK_SLASH_EXPECTED: &str = "'*/' expected.";
    pub const IDENTIFIER_EXPECTED: &str = "Identifier expected.";
    pub const EXPRESSION_EXPECTED: &str = "Expression expected.";
    pub const TYPE_EXPECTED: &str = "Type expected.";
    pub const DECLARATION_OR_STATEMENT_EXPECTED: &str = "Declaration or statement expected.";
    pub const UNTERMINATED_TEMPLATE_LITERAL: &str = "Unterminated template literal.";
    pub const DUPLICATE_IDENTIFIER: &str = "Duplicate identifier '{0}'.";
    pub const MODULE_HAS_NO_EXPORTED_MEMBER: &str = "Module '\"{0}\"' has no exported member '{1}'.";
    pub const CANNOT_FIND_MODULE: &str =
        "Cannot find module '{0}' or its corresponding type declarations.";
    pub const CANNOT_READ_FILE: &str = "Cannot read file '{0}'.";
    pub const FILE_NOT_FOUND: &str = "File '{0}' not found.";
    pub const NESTING_TOO_DEEP: &str = "Type is nested too deeply to be parsed.";
}
