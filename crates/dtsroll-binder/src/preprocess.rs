//! Source preprocessing passes.
//!
//! Loosely-typed sources can be rewritten before parsing by an ordered list
//! of text-to-text passes. Each pass is independent: it sees the output of
//! the previous one and knows nothing about the others.

use crate::host::{CompilerHost, is_loosely_typed};
use crate::jsdoc_passes::{
    ImportExtensionPass, JsDocAccessPass, JsDocEnumPass, JsDocFunctionPass, JsDocNamespacePass,
    JsDocVariablePass,
};
use dtsroll_common::JsDoc;
use std::fmt;
use std::fmt::Write as _;

/// One text-to-text rewrite applied to source files before parsing.
pub trait SourcePass {
    fn name(&self) -> &str;

    /// Whether the pass runs for `path`. Defaults to JavaScript-family files.
    fn applies_to(&self, path: &str) -> bool {
        is_loosely_typed(path)
    }

    fn transform(&self, path: &str, text: &str) -> String;
}

impl<F> SourcePass for F
where
    F: Fn(&str, &str) -> String,
{
    fn name(&self) -> &str {
        "closure"
    }

    fn transform(&self, path: &str, text: &str) -> String {
        self(path, text)
    }
}

/// Ordered list of passes.
#[derive(Default)]
pub struct Preprocessor {
    passes: Vec<Box<dyn SourcePass>>,
}

impl fmt::Debug for Preprocessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.pass_names()).finish()
    }
}

impl Preprocessor {
    pub fn new() -> Preprocessor {
        Preprocessor::default()
    }

    /// Every built-in JSDoc pass. Statement-replacing passes run before the
    /// ones that annotate declarations in place.
    pub fn jsdoc() -> Preprocessor {
        Preprocessor::new()
            .with_pass(JsDocTypedefPass)
            .with_pass(JsDocEnumPass)
            .with_pass(JsDocNamespacePass)
            .with_pass(JsDocFunctionPass)
            .with_pass(JsDocVariablePass)
            .with_pass(JsDocAccessPass)
            .with_pass(ImportExtensionPass)
    }

    pub fn with_pass(mut self, pass: impl SourcePass + 'static) -> Preprocessor {
        self.add_pass(pass);
        self
    }

    pub fn add_pass(&mut self, pass: impl SourcePass + 'static) {
        self.passes.push(Box::new(pass));
    }

    pub fn len(&self) -> usize {
        self.passes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    pub fn pass_names(&self) -> Vec<&str> {
        self.passes.iter().map(|pass| pass.name()).collect()
    }

    /// Run every applicable pass over `text`, in order.
    pub fn run(&self, path: &str, text: String) -> String {
        let mut text = text;
        for pass in &self.passes {
            if !pass.applies_to(path) {
                continue;
            }
            tracing::debug!(pass = pass.name(), file = path, "running source pass");
            text = pass.transform(path, &text);
        }
        text
    }
}

/// Host decorator that preprocesses every file it reads.
#[derive(Debug)]
pub struct PreprocessedHost<H> {
    inner: H,
    preprocessor: Preprocessor,
}

impl<H: CompilerHost> PreprocessedHost<H> {
    pub fn new(inner: H, preprocessor: Preprocessor) -> PreprocessedHost<H> {
        PreprocessedHost {
            inner,
            preprocessor,
        }
    }

    pub fn inner(&self) -> &H {
        &self.inner
    }
}

impl<H: CompilerHost> CompilerHost for PreprocessedHost<H> {
    fn read_file(&self, path: &str) -> Option<String> {
        let text = self.inner.read_file(path)?;
        Some(self.preprocessor.run(path, text))
    }

    fn file_exists(&self, path: &str) -> bool {
        self.inner.file_exists(path)
    }
}

// =============================================================================
// Built-in passes
// =============================================================================

/// Turns `@typedef` comments into exported type aliases appended to the file.
///
/// ```text
/// /**
///  * A point.
///  * @typedef {Object} Point
///  * @property {number} x
///  * @property {number} [y]
///  */
/// ```
/// becomes
/// ```text
/// /** A point. */
/// export type Point = { x: number; y?: number; };
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct JsDocTypedefPass;

impl SourcePass for JsDocTypedefPass {
    fn name(&self) -> &str {
        "jsdoc-typedef"
    }

    fn transform(&self, _path: &str, text: &str) -> String {
        let mut aliases = String::new();
        for comment in doc_comments(text) {
            let doc = JsDoc::parse(comment);
            let Some(typedef) = doc.tags_named("typedef").next() else {
                continue;
            };
            let Some(name) = typedef.param_name.as_deref() else {
                continue;
            };
            let properties: Vec<_> = doc
                .tags
                .iter()
                .filter(|tag| matches!(tag.name.as_str(), "property" | "prop"))
                .filter(|tag| tag.param_name.is_some())
                .collect();
            let type_text = if properties.is_empty() {
                typedef
                    .type_expression
                    .as_deref()
                    .map(jsdoc_type_to_ts)
                    .unwrap_or_else(|| "Object".to_string())
            } else {
                let mut literal = String::from("{ ");
                for property in properties {
                    let type_expression = property.type_expression.as_deref().unwrap_or("*");
                    let optional = property.is_bracketed || type_expression.ends_with('=');
                    let _ = write!(
                        literal,
                        "{}{}: {}; ",
                        property.param_name.as_deref().unwrap_or_default(),
                        if optional { "?" } else { "" },
                        jsdoc_type_to_ts(type_expression)
                    );
                }
                literal.push('}');
                literal
            };
            aliases.push('\n');
            if let Some(description) = doc.description.as_deref() {
                let _ = writeln!(aliases, "/** {} */", description.replace('\n', " "));
            }
            let _ = writeln!(aliases, "export type {name} = {type_text};");
        }
        if aliases.is_empty() {
            return text.to_string();
        }
        format!("{text}\n{aliases}")
    }
}

/// Raw `/** ... */` comments of a source text, in order.
fn doc_comments(text: &str) -> Vec<&str> {
    doc_comment_spans(text)
        .into_iter()
        .map(|(start, end)| &text[start..end])
        .collect()
}

/// Byte ranges of the `/** ... */` comments of a source text, in order.
pub(crate) fn doc_comment_spans(text: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut offset = 0;
    while let Some(start) = text[offset..].find("/**") {
        let from = offset + start + 3;
        let Some(len) = text[from..].find("*/") else {
            break;
        };
        let end = from + len + 2;
        spans.push((offset + start, end));
        offset = end;
    }
    spans
}

/// Closure-compiler type syntax to TypeScript (`*`, `?T`, `T=`, `Array.<T>`).
pub fn jsdoc_type_to_ts(type_expression: &str) -> String {
    let mut text = type_expression.trim();
    if let Some(stripped) = text.strip_suffix('=') {
        text = stripped.trim_end();
    }
    if let Some(stripped) = text.strip_prefix('!') {
        text = stripped;
    }
    match text {
        "*" | "" => return "any".to_string(),
        "?" => return "unknown".to_string(),
        _ => {}
    }
    let converted = text.replace(".<", "<");
    match converted.strip_prefix('?') {
        Some(inner) => format!("{inner} | null"),
        None => converted,
    }
}
