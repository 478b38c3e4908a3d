use crate::scanner::{ScannerState, is_identifier_text};
use crate::syntax_kind::SyntaxKind;

fn scan_all(source: &str) -> Vec<SyntaxKind> {
    let mut scanner = ScannerState::new(source.to_string());
    let mut kinds = Vec::new();
    loop {
        let kind = scanner.scan();
        if kind == SyntaxKind::EndOfFileToken {
            break;
        }
        kinds.push(kind);
    }
    kinds
}

#[test]
fn test_scan_keywords_and_punctuation() {
    assert_eq!(
        scan_all("export declare function f<T>(): T;"),
        vec![
            SyntaxKind::ExportKeyword,
            SyntaxKind::DeclareKeyword,
            SyntaxKind::FunctionKeyword,
            SyntaxKind::Identifier,
            SyntaxKind::LessThanToken,
            SyntaxKind::Identifier,
            SyntaxKind::GreaterThanToken,
            SyntaxKind::OpenParenToken,
            SyntaxKind::CloseParenToken,
            SyntaxKind::ColonToken,
            SyntaxKind::Identifier,
            SyntaxKind::SemicolonToken,
        ]
    );
}

#[test]
fn test_nested_generics_close_with_single_tokens() {
    let kinds = scan_all("A<B<C>>");
    assert_eq!(
        &kinds[kinds.len() - 2..],
        &[SyntaxKind::GreaterThanToken, SyntaxKind::GreaterThanToken]
    );
}

#[test]
fn test_string_literal_is_cooked() {
    let mut scanner = ScannerState::new(r#"'a\'b\n'"#.to_string());
    assert_eq!(scanner.scan(), SyntaxKind::StringLiteral);
    assert_eq!(scanner.token_value(), "a'b\n");
}

#[test]
fn test_unterminated_string_reports_diagnostic() {
    let mut scanner = ScannerState::new("\"abc\nx".to_string());
    scanner.scan();
    assert_eq!(scanner.diagnostics().len(), 1);
    assert_eq!(scanner.diagnostics()[0].code, 1002);
}

#[test]
fn test_numbers_and_bigints() {
    let mut scanner = ScannerState::new("0x1F 1_000.5e3 10n".to_string());
    assert_eq!(scanner.scan(), SyntaxKind::NumericLiteral);
    assert_eq!(scanner.token_value(), "0x1F");
    assert_eq!(scanner.scan(), SyntaxKind::NumericLiteral);
    assert_eq!(scanner.token_value(), "1_000.5e3");
    assert_eq!(scanner.scan(), SyntaxKind::BigIntLiteral);
    assert_eq!(scanner.token_value(), "10n");
}

#[test]
fn test_jsdoc_attaches_to_next_token_only() {
    let mut scanner = ScannerState::new("/** doc */ a /* plain */ b".to_string());
    scanner.scan();
    assert!(scanner.token_jsdoc().is_some());
    scanner.scan();
    assert!(scanner.token_jsdoc().is_none());
}

#[test]
fn test_line_break_tracking() {
    let mut scanner = ScannerState::new("a\nb c".to_string());
    scanner.scan();
    scanner.scan();
    assert!(scanner.has_preceding_line_break());
    scanner.scan();
    assert!(!scanner.has_preceding_line_break());
}

#[test]
fn test_skip_block_handles_strings_templates_and_regex() {
    let source = "{ const a = '}'; const b = `${ {x: 1} }}`; const r = /}/g; } after";
    let mut scanner = ScannerState::new(source.to_string());
    assert_eq!(scanner.scan(), SyntaxKind::OpenBraceToken);
    scanner.skip_block();
    assert_eq!(scanner.token(), SyntaxKind::Identifier);
    assert_eq!(scanner.token_value(), "after");
}

#[test]
fn test_template_rescanning() {
    let mut scanner = ScannerState::new("`a${T}b${U}c`".to_string());
    assert_eq!(scanner.scan(), SyntaxKind::TemplateHead);
    assert_eq!(scanner.token_value(), "a");
    assert_eq!(scanner.scan(), SyntaxKind::Identifier);
    assert_eq!(scanner.scan(), SyntaxKind::CloseBraceToken);
    assert_eq!(scanner.rescan_template_continuation(), SyntaxKind::TemplateMiddle);
    assert_eq!(scanner.token_value(), "b");
    scanner.scan();
    scanner.scan();
    assert_eq!(scanner.rescan_template_continuation(), SyntaxKind::TemplateTail);
    assert_eq!(scanner.token_value(), "c");
}

#[test]
fn test_save_and_restore_state() {
    let mut scanner = ScannerState::new("a b".to_string());
    scanner.scan();
    let snapshot = scanner.save_state();
    scanner.scan();
    assert_eq!(scanner.token_value(), "b");
    scanner.restore_state(snapshot);
    assert_eq!(scanner.token_value(), "a");
}

#[test]
fn test_is_identifier_text() {
    assert!(is_identifier_text("_foo$1"));
    assert!(!is_identifier_text("1foo"));
    assert!(!is_identifier_text("a-b"));
    assert!(!is_identifier_text(""));
}
