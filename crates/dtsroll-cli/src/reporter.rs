use colored::Colorize;
use dtsroll_common::{Diagnostic, DiagnosticCategory, LineMap};
use rustc_hash::FxHashMap;
use std::path::Path;

/// Renders diagnostics the way tsc does.
///
/// Plain mode prints `file(line,col): error TS2307: message`; pretty mode
/// prints a colored `file:line:col - error TS2307: message` followed by the
/// offending source line.
pub struct Reporter {
    pretty: bool,
    sources: FxHashMap<String, String>,
    line_maps: FxHashMap<String, LineMap>,
}

impl Reporter {
    pub fn new(pretty: bool) -> Self {
        Reporter {
            pretty,
            sources: FxHashMap::default(),
            line_maps: FxHashMap::default(),
        }
    }

    /// Use `text` for `file` instead of reading it from disk.
    pub fn add_source(&mut self, file: &str, text: &str) {
        self.sources.insert(file.to_string(), text.to_string());
        self.line_maps.remove(file);
    }

    /// All diagnostics, one per line, with a trailing newline.
    pub fn render(&mut self, diagnostics: &[Diagnostic]) -> String {
        let mut out = String::new();
        for diagnostic in diagnostics {
            out.push_str(&self.format_diagnostic(diagnostic));
            out.push('\n');
        }
        if self.pretty
            && let Some(summary) = self.format_summary(diagnostics)
        {
            out.push('\n');
            out.push_str(&summary);
            out.push('\n');
        }
        out
    }

    pub fn format_diagnostic(&mut self, diagnostic: &Diagnostic) -> String {
        let position = self.position_for(&diagnostic.file, diagnostic.start);
        let category = self.format_category(diagnostic.category);
        let code = self.format_code(diagnostic.code);

        let mut output = String::new();
        if !diagnostic.file.is_empty() {
            let location = match (position, self.pretty) {
                (Some((line, column)), true) => format!("{}:{line}:{column}", diagnostic.file),
                (Some((line, column)), false) => format!("{}({line},{column})", diagnostic.file),
                (None, _) => diagnostic.file.clone(),
            };
            if self.pretty {
                output.push_str(&location.cyan().to_string());
                output.push_str(" - ");
            } else {
                output.push_str(&location);
                output.push_str(": ");
            }
        }
        output.push_str(&category);
        if !code.is_empty() {
            output.push(' ');
            output.push_str(&code);
        }
        output.push_str(": ");
        output.push_str(&diagnostic.message_text);

        if self.pretty
            && let Some(snippet) =
                self.format_snippet(&diagnostic.file, diagnostic.start, diagnostic.length)
        {
            output.push_str(&snippet);
        }
        output
    }

    fn format_summary(&self, diagnostics: &[Diagnostic]) -> Option<String> {
        let errors = diagnostics
            .iter()
            .filter(|diagnostic| diagnostic.category == DiagnosticCategory::Error)
            .count();
        match errors {
            0 => None,
            1 => Some("Found 1 error.".to_string()),
            n => Some(format!("Found {n} errors.")),
        }
    }

    /// The source line with the span underlined.
    ///   2   import { a } from "./missing";
    ///                         ~~~~~~~~~~~
    fn format_snippet(&mut self, file: &str, start: u32, length: u32) -> Option<String> {
        if file.is_empty() || length == 0 {
            return None;
        }
        let (line, column) = self.position_for(file, start)?;
        let source = self.sources.get(file)?;
        let line_text = source.lines().nth((line - 1) as usize)?;

        let mut underline = String::new();
        for (offset, ch) in line_text.chars().enumerate() {
            let offset = offset as u32;
            let width = if ch == '\t' { 4 } else { 1 };
            if offset < column - 1 {
                underline.push_str(&" ".repeat(width));
            } else if offset < column - 1 + length {
                underline.push_str(&"~".repeat(width));
            } else {
                break;
            }
        }
        if !underline.contains('~') {
            underline.push('~');
        }

        Some(format!(
            "\n\n{} {line_text}\n{} {}\n",
            format!("{line:>3}").black().on_white(),
            " ".repeat(3).on_white(),
            underline.red()
        ))
    }

    /// One-based line and column.
    fn position_for(&mut self, file: &str, offset: u32) -> Option<(u32, u32)> {
        if file.is_empty() {
            return None;
        }
        self.ensure_source(file)?;
        let source = self.sources.get(file)?;
        let line_map = self
            .line_maps
            .entry(file.to_string())
            .or_insert_with(|| LineMap::build(source));
        let position = line_map.offset_to_position(offset, source);
        Some((position.line + 1, position.character + 1))
    }

    fn ensure_source(&mut self, file: &str) -> Option<()> {
        if !self.sources.contains_key(file) {
            let contents = std::fs::read_to_string(Path::new(file)).ok()?;
            self.sources.insert(file.to_string(), contents);
        }
        Some(())
    }

    fn format_category(&self, category: DiagnosticCategory) -> String {
        let label = category.name();
        if !self.pretty {
            return label.to_string();
        }
        match category {
            DiagnosticCategory::Error => label.red().bold().to_string(),
            DiagnosticCategory::Warning => label.yellow().bold().to_string(),
            DiagnosticCategory::Suggestion => label.blue().bold().to_string(),
            DiagnosticCategory::Message => label.cyan().bold().to_string(),
        }
    }

    fn format_code(&self, code: u32) -> String {
        if code == 0 {
            return String::new();
        }
        let label = format!("TS{code}");
        if self.pretty {
            label.bright_black().to_string()
        } else {
            label
        }
    }
}
