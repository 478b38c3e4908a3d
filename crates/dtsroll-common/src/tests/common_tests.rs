use crate::common::{ModuleResolutionKind, ScriptTarget, quote_string_literal};
use crate::diagnostics::{Diagnostic, diagnostic_codes, diagnostic_messages, format_message};
use crate::span::Span;

#[test]
fn test_script_target_parse() {
    assert_eq!(ScriptTarget::parse("ES6"), Some(ScriptTarget::ES2015));
    assert_eq!(ScriptTarget::parse("esnext"), Some(ScriptTarget::ESNext));
    assert_eq!(ScriptTarget::parse("es1999"), None);
    assert_eq!(ScriptTarget::default(), ScriptTarget::ESNext);
    assert_eq!(ScriptTarget::ES2020.as_str(), "es2020");
}

#[test]
fn test_module_resolution_parse() {
    assert_eq!(
        ModuleResolutionKind::parse("NodeJs"),
        Some(ModuleResolutionKind::Node10)
    );
    assert_eq!(
        ModuleResolutionKind::parse("classic"),
        Some(ModuleResolutionKind::Classic)
    );
    assert!(!ModuleResolutionKind::Classic.uses_node_modules());
    assert!(ModuleResolutionKind::Bundler.uses_node_modules());
}

#[test]
fn test_format_message_substitutes_placeholders() {
    let text = format_message(
        diagnostic_messages::MODULE_HAS_NO_EXPORTED_MEMBER,
        &["./a", "missing"],
    );
    assert_eq!(text, "Module '\"./a\"' has no exported member 'missing'.");
}

#[test]
fn test_diagnostic_error_carries_span() {
    let diag = Diagnostic::error(
        "a.ts",
        Span::new(4, 9),
        "Duplicate identifier 'x'.",
        diagnostic_codes::DUPLICATE_IDENTIFIER,
    );
    assert!(diag.is_error());
    assert_eq!(diag.length, 5);
    assert_eq!(diag.span(), Span::new(4, 9));
    assert_eq!(
        diag.to_string(),
        "a.ts@4: error TS2300: Duplicate identifier 'x'."
    );
}

#[test]
fn test_quote_string_literal_escapes() {
    assert_eq!(quote_string_literal("abc"), "\"abc\"");
    assert_eq!(quote_string_literal("a\"b"), "\"a\\\"b\"");
    assert_eq!(quote_string_literal("line\nbreak\\"), "\"line\\nbreak\\\\\"");
    assert_eq!(quote_string_literal("\u{1}"), "\"\\u0001\"");
}
