use crate::reporter::Reporter;
use dtsroll_common::{Diagnostic, Span};

const SOURCE: &str = "export const a = 1;\nimport { b } from \"./missing\";\n";

fn missing_module() -> Diagnostic {
    let start = SOURCE.find("\"./missing\"").expect("specifier") as u32;
    Diagnostic::error(
        "/src/index.ts",
        Span::new(start, start + 11),
        "Cannot find module './missing' or its corresponding type declarations.",
        2307,
    )
}

#[test]
fn plain_format_matches_tsc() {
    let mut reporter = Reporter::new(false);
    reporter.add_source("/src/index.ts", SOURCE);
    assert_eq!(
        reporter.format_diagnostic(&missing_module()),
        "/src/index.ts(2,19): error TS2307: Cannot find module './missing' or its corresponding type declarations."
    );
}

#[test]
fn global_diagnostics_have_no_location() {
    let mut reporter = Reporter::new(false);
    let diagnostic = Diagnostic::global("File '/types/missing.d.ts' not found.", 6053);
    assert_eq!(
        reporter.format_diagnostic(&diagnostic),
        "error TS6053: File '/types/missing.d.ts' not found."
    );
}

#[test]
fn render_puts_one_diagnostic_per_line() {
    let mut reporter = Reporter::new(false);
    reporter.add_source("/src/index.ts", SOURCE);
    let rendered = reporter.render(&[missing_module(), Diagnostic::global("Oops.", 0)]);
    let lines: Vec<&str> = rendered.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("/src/index.ts(2,19): error TS2307"));
    assert_eq!(lines[1], "error: Oops.");
    assert!(rendered.ends_with('\n'));
}

#[test]
fn pretty_format_uses_colon_location_and_snippet() {
    colored::control::set_override(false);
    let mut reporter = Reporter::new(true);
    reporter.add_source("/src/index.ts", SOURCE);
    let formatted = reporter.format_diagnostic(&missing_module());
    assert!(
        formatted.starts_with("/src/index.ts:2:19 - error TS2307: Cannot find module"),
        "{formatted}"
    );
    assert!(formatted.contains("import { b } from \"./missing\";"), "{formatted}");
    assert!(formatted.contains(&format!("{}~~~~~~~~~~~", " ".repeat(18))), "{formatted}");

    let rendered = reporter.render(&[missing_module()]);
    assert!(rendered.trim_end().ends_with("Found 1 error."), "{rendered}");
}

#[test]
fn unreadable_file_falls_back_to_path() {
    let mut reporter = Reporter::new(false);
    let diagnostic = Diagnostic::error("/nowhere/x.ts", Span::new(0, 1), "Bad.", 1005);
    assert_eq!(reporter.format_diagnostic(&diagnostic), "/nowhere/x.ts: error TS1005: Bad.");
}
