//! JSDoc-driven source passes for loosely-typed files.
//!
//! Each pass finds the declaration that follows a `/** ... */` comment and
//! rewrites its header, so the parser sees TypeScript syntax where the
//! comment stated it. Declarations that already carry the syntax, and
//! shapes a pass does not recognize, are left as written.

use crate::preprocess::{SourcePass, doc_comment_spans, jsdoc_type_to_ts};
use dtsroll_common::{JsDoc, JsDocTag};
use std::fmt::Write as _;
use tracing::trace;

/// Parameter and return types from `@param` and `@returns` tags.
///
/// ```text
/// /** @param {number} x @param {string} [label] @returns {string} */
/// export function f(x, label) {}
/// ```
/// becomes `export function f(x: number, label?: string): string {}`.
/// `@async` without a return tag returns `Promise<any>`. A variable holding
/// a function expression or an arrow function gets a function type.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsDocFunctionPass;

impl SourcePass for JsDocFunctionPass {
    fn name(&self) -> &str {
        "jsdoc-function"
    }

    fn transform(&self, _path: &str, text: &str) -> String {
        let mut edits = Vec::new();
        for (start, end) in doc_comment_spans(text) {
            let doc = JsDoc::parse(&text[start..end]);
            let documents_signature = doc
                .tags
                .iter()
                .any(|tag| is_param_tag(tag) || is_return_tag(tag) || tag.name == "async");
            let documents_type = doc
                .tags
                .iter()
                .any(|tag| matches!(tag.name.as_str(), "typedef" | "callback"));
            if documents_signature && !documents_type {
                function_edits(text, end, &doc, &mut edits);
            }
        }
        trace!(pass = self.name(), edits = edits.len(), "rewrote signatures");
        apply_edits(text, edits)
    }
}

/// `@type` on variables, and `@const`/`@constant`/`@kind const` turning
/// `let` and `var` into `const`.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsDocVariablePass;

impl SourcePass for JsDocVariablePass {
    fn name(&self) -> &str {
        "jsdoc-variable"
    }

    fn transform(&self, _path: &str, text: &str) -> String {
        let mut edits = Vec::new();
        for (start, end) in doc_comment_spans(text) {
            let doc = JsDoc::parse(&text[start..end]);
            let declared_type = doc
                .tags_named("type")
                .find_map(|tag| tag.type_expression.as_deref());
            let constant = doc.tags.iter().any(is_constant_tag);
            if declared_type.is_none() && !constant {
                continue;
            }

            let mut cursor = Cursor::new(text, end);
            cursor.eat_keyword("export");
            let keyword_start = cursor.offset();
            let Some(keyword) = cursor.variable_keyword() else {
                continue;
            };
            if constant && keyword != "const" {
                edits.push(Edit::replace(keyword_start, keyword_start + keyword.len(), "const"));
            }
            if let Some(declared_type) = declared_type
                && cursor.word().is_some()
            {
                let name_end = cursor.pos;
                if cursor.peek() != Some(':') {
                    let annotation = format!(": {}", jsdoc_type_to_ts(declared_type));
                    edits.push(Edit::insert(name_end, annotation));
                }
            }
        }
        trace!(pass = self.name(), edits = edits.len(), "rewrote variables");
        apply_edits(text, edits)
    }
}

/// `@enum` object literals become enum declarations.
///
/// `/** @enum {number} */ export const Color = { Red: 1, Blue: 2 };`
/// becomes `export enum Color { Red = 1, Blue = 2 }`.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsDocEnumPass;

impl SourcePass for JsDocEnumPass {
    fn name(&self) -> &str {
        "jsdoc-enum"
    }

    fn transform(&self, _path: &str, text: &str) -> String {
        let mut edits = Vec::new();
        for (start, end) in doc_comment_spans(text) {
            let doc = JsDoc::parse(&text[start..end]);
            if doc.tags_named("enum").next().is_none() {
                continue;
            }
            let Some(literal) = ObjectDeclaration::after(text, end) else {
                continue;
            };
            let mut members = Vec::new();
            for &(item_start, item_end) in &literal.properties {
                let Some((key, value)) = text[item_start..item_end].split_once(':') else {
                    members.clear();
                    break;
                };
                let (key, value) = (key.trim(), value.trim());
                if !is_identifier(key) && !is_quoted(key) || value.is_empty() {
                    members.clear();
                    break;
                }
                members.push(format!("{key} = {value}"));
            }
            if members.len() != literal.properties.len() {
                continue;
            }
            let body = if members.is_empty() {
                "{}".to_string()
            } else {
                format!("{{ {} }}", members.join(", "))
            };
            let replacement = format!("enum {} {body}", literal.name);
            edits.push(Edit::replace(literal.start, literal.end, replacement));
        }
        trace!(pass = self.name(), edits = edits.len(), "rewrote enums");
        apply_edits(text, edits)
    }
}

/// `@namespace` object literals become ambient namespaces whose members
/// are the literal's properties and methods.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsDocNamespacePass;

impl SourcePass for JsDocNamespacePass {
    fn name(&self) -> &str {
        "jsdoc-namespace"
    }

    fn transform(&self, _path: &str, text: &str) -> String {
        let mut edits = Vec::new();
        for (start, end) in doc_comment_spans(text) {
            let doc = JsDoc::parse(&text[start..end]);
            if doc.tags_named("namespace").next().is_none() {
                continue;
            }
            let Some(literal) = ObjectDeclaration::after(text, end) else {
                continue;
            };
            let members: Option<Vec<String>> = literal
                .properties
                .iter()
                .map(|&(item_start, item_end)| namespace_member(&text[item_start..item_end]))
                .collect();
            let Some(members) = members else {
                continue;
            };
            let mut replacement = format!("declare namespace {} {{\n", literal.name);
            for member in members {
                let _ = writeln!(replacement, "    {member}");
            }
            replacement.push('}');
            edits.push(Edit::replace(literal.start, literal.end, replacement));
        }
        trace!(pass = self.name(), edits = edits.len(), "rewrote namespaces");
        apply_edits(text, edits)
    }
}

/// Class and member modifiers from `@private`, `@protected`,
/// `@access private|protected`, `@readonly` and `@abstract`/`@virtual`.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsDocAccessPass;

impl SourcePass for JsDocAccessPass {
    fn name(&self) -> &str {
        "jsdoc-access"
    }

    fn transform(&self, _path: &str, text: &str) -> String {
        let mut edits = Vec::new();
        for (start, end) in doc_comment_spans(text) {
            let doc = JsDoc::parse(&text[start..end]);
            let has_tag = |name: &str| doc.tags_named(name).next().is_some();

            let mut cursor = Cursor::new(text, end);
            cursor.eat_keyword("export");
            cursor.eat_keyword("default");
            let mut class = cursor;
            let class_start = class.offset();
            if class.eat_keyword("class") {
                if has_tag("abstract") || has_tag("virtual") {
                    edits.push(Edit::insert(class_start, "abstract "));
                }
                continue;
            }

            let access = if has_tag("private") {
                Some("private")
            } else if has_tag("protected") {
                Some("protected")
            } else {
                doc.tags_named("access")
                    .filter_map(|tag| tag.comment.as_deref())
                    .map(|value| value.trim().to_ascii_lowercase())
                    .find_map(|value| match value.as_str() {
                        "private" => Some("private"),
                        "protected" => Some("protected"),
                        _ => None,
                    })
            };
            let readonly = has_tag("readonly");
            if access.is_none() && !readonly {
                continue;
            }
            let Some(member) = ClassMember::after(text, end) else {
                continue;
            };
            if let Some(access) = access
                && !member.has_accessibility
            {
                edits.push(Edit::insert(member.start, format!("{access} ")));
            }
            if readonly && !member.is_method {
                edits.push(Edit::insert(member.name_start, "readonly "));
            }
        }
        trace!(pass = self.name(), edits = edits.len(), "rewrote modifiers");
        apply_edits(text, edits)
    }
}

/// Drops script extensions from relative import and export specifiers:
/// `from "./util.js"` becomes `from "./util"`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImportExtensionPass;

const SCRIPT_EXTENSIONS: &[&str] = &[".js", ".jsx", ".mjs", ".cjs", ".ts", ".tsx", ".mts", ".cts"];

impl SourcePass for ImportExtensionPass {
    fn name(&self) -> &str {
        "import-extension"
    }

    fn transform(&self, _path: &str, text: &str) -> String {
        let mut edits = Vec::new();
        for keyword in ["from", "import"] {
            for (index, _) in text.match_indices(keyword) {
                let before = text[..index].chars().next_back();
                let after = text[index + keyword.len()..].chars().next();
                if before.is_some_and(is_word_char) || after.is_some_and(is_word_char) {
                    continue;
                }
                let mut cursor = Cursor::new(text, index + keyword.len());
                cursor.eat("(");
                let quote_at = cursor.offset();
                let Some(quote) = cursor.peek().filter(|c| matches!(*c, '"' | '\'')) else {
                    continue;
                };
                let Some(len) = text[quote_at + 1..].find(quote) else {
                    continue;
                };
                let specifier = &text[quote_at + 1..quote_at + 1 + len];
                if !specifier.starts_with("./") && !specifier.starts_with("../") {
                    continue;
                }
                if let Some(extension) = SCRIPT_EXTENSIONS
                    .iter()
                    .find(|extension| specifier.ends_with(**extension))
                {
                    let end = quote_at + 1 + len;
                    edits.push(Edit::replace(end - extension.len(), end, ""));
                }
            }
        }
        trace!(pass = self.name(), edits = edits.len(), "rewrote specifiers");
        apply_edits(text, edits)
    }
}

// =============================================================================
// Signatures
// =============================================================================

fn is_param_tag(tag: &JsDocTag) -> bool {
    matches!(tag.name.as_str(), "param" | "arg" | "argument")
}

fn is_return_tag(tag: &JsDocTag) -> bool {
    matches!(tag.name.as_str(), "returns" | "return")
}

fn is_constant_tag(tag: &JsDocTag) -> bool {
    match tag.name.as_str() {
        "const" | "constant" => true,
        "kind" => tag
            .comment
            .as_deref()
            .is_some_and(|kind| matches!(kind.trim().to_ascii_lowercase().as_str(), "const" | "constant")),
        _ => false,
    }
}

fn return_type(doc: &JsDoc) -> Option<String> {
    if let Some(returns) = doc
        .tags
        .iter()
        .filter(|tag| is_return_tag(tag))
        .find_map(|tag| tag.type_expression.as_deref())
    {
        return Some(jsdoc_type_to_ts(returns));
    }
    doc.tags_named("async")
        .next()
        .map(|_| "Promise<any>".to_string())
}

/// `...T` in a rest parameter tag is an array of `T`.
fn parameter_type(type_expression: &str) -> String {
    match type_expression.trim().strip_prefix("...") {
        Some(element) => {
            let element = jsdoc_type_to_ts(element);
            if element.contains(['|', '&', ' ']) {
                format!("({element})[]")
            } else {
                format!("{element}[]")
            }
        }
        None => jsdoc_type_to_ts(type_expression),
    }
}

fn function_edits(text: &str, from: usize, doc: &JsDoc, edits: &mut Vec<Edit>) {
    let mut cursor = Cursor::new(text, from);
    cursor.eat_keyword("export");
    cursor.eat_keyword("default");
    let mut variable = cursor;
    if variable.variable_keyword().is_some() {
        variable_function_edits(text, variable, doc, edits);
        return;
    }

    let mut has_return = true;
    if cursor.eat_keyword("async") || cursor.eat_keyword("function") {
        let mut lookahead = cursor;
        if lookahead.eat_keyword("function") {
            cursor = lookahead;
        }
        cursor.eat("*");
        if cursor.peek() != Some('(') {
            cursor.word();
        }
    } else {
        let Some(member) = ClassMember::after(text, from) else {
            return;
        };
        if !member.is_method {
            return;
        }
        has_return = !member.is_setter && member.name != "constructor";
        cursor = Cursor::new(text, member.name_end);
    }
    if cursor.peek() != Some('(') {
        return;
    }
    let open = cursor.offset();
    let Some(close) = matching_close(text, open) else {
        return;
    };
    for (start, end) in split_items(text, open + 1, close) {
        let Some(parameter) = SimpleParameter::parse(&text[start..end]) else {
            continue;
        };
        if let Some(typed) = parameter.in_declaration(doc) {
            edits.push(Edit::replace(start, end, typed));
        }
    }
    if has_return
        && Cursor::new(text, close + 1).peek() != Some(':')
        && let Some(return_type) = return_type(doc)
    {
        edits.push(Edit::insert(close + 1, format!(": {return_type}")));
    }
}

/// `const f = function (x) {}` or `const f = (x) => x` gets a function type
/// annotation built from the tags.
fn variable_function_edits(text: &str, mut cursor: Cursor<'_>, doc: &JsDoc, edits: &mut Vec<Edit>) {
    if cursor.word().is_none() {
        return;
    }
    let name_end = cursor.pos;
    if !cursor.eat("=") || cursor.peek() == Some('=') {
        return;
    }
    cursor.eat_keyword("async");
    let (start, end) = if cursor.eat_keyword("function") {
        cursor.eat("*");
        if cursor.peek() != Some('(') {
            cursor.word();
        }
        if cursor.peek() != Some('(') {
            return;
        }
        let open = cursor.offset();
        let Some(close) = matching_close(text, open) else {
            return;
        };
        (open + 1, close)
    } else if cursor.peek() == Some('(') {
        let open = cursor.offset();
        let Some(close) = matching_close(text, open) else {
            return;
        };
        if !Cursor::new(text, close + 1).eat("=>") {
            return;
        }
        (open + 1, close)
    } else {
        let start = cursor.offset();
        let Some(parameter) = cursor.word() else {
            return;
        };
        if !cursor.eat("=>") {
            return;
        }
        (start, start + parameter.len())
    };

    let mut parameters = Vec::new();
    for (item_start, item_end) in split_items(text, start, end) {
        let Some(parameter) = SimpleParameter::parse(&text[item_start..item_end]) else {
            return;
        };
        parameters.push(parameter.in_function_type(doc));
    }
    let returns = return_type(doc).unwrap_or_else(|| "any".to_string());
    let annotation = format!(": ({}) => {returns}", parameters.join(", "));
    edits.push(Edit::insert(name_end, annotation));
}

/// A parameter written as `name`, `...name` or `name = default`.
struct SimpleParameter<'a> {
    rest: bool,
    name: &'a str,
    default: Option<&'a str>,
}

impl<'a> SimpleParameter<'a> {
    fn parse(text: &'a str) -> Option<SimpleParameter<'a>> {
        let (rest, body) = match text.strip_prefix("...") {
            Some(body) => (true, body.trim_start()),
            None => (false, text),
        };
        let name_len = body.find(|c: char| !is_word_char(c)).unwrap_or(body.len());
        if name_len == 0 {
            return None;
        }
        let (name, tail) = body.split_at(name_len);
        let tail = tail.trim_start();
        let default = match tail.strip_prefix('=') {
            Some(value) => Some(value.trim()),
            None if tail.is_empty() => None,
            None => return None,
        };
        Some(SimpleParameter {
            rest,
            name,
            default,
        })
    }

    fn tag<'d>(&self, doc: &'d JsDoc) -> Option<&'d JsDocTag> {
        doc.tags
            .iter()
            .filter(|tag| is_param_tag(tag))
            .find(|tag| tag.param_name.as_deref() == Some(self.name))
    }

    /// The parameter with its tag's type, or `None` when undocumented.
    fn in_declaration(&self, doc: &JsDoc) -> Option<String> {
        let tag = self.tag(doc)?;
        let mut out = String::new();
        if self.rest {
            out.push_str("...");
        }
        out.push_str(self.name);
        if !self.rest && self.default.is_none() && is_optional_tag(tag) {
            out.push('?');
        }
        if let Some(type_expression) = tag.type_expression.as_deref() {
            let _ = write!(out, ": {}", parameter_type(type_expression));
        }
        if let Some(default) = self.default {
            let _ = write!(out, " = {default}");
        }
        Some(out)
    }

    fn in_function_type(&self, doc: &JsDoc) -> String {
        let tag = self.tag(doc);
        let mut out = String::new();
        if self.rest {
            out.push_str("...");
        }
        out.push_str(self.name);
        let optional = self.default.is_some() || tag.is_some_and(is_optional_tag);
        if !self.rest && optional {
            out.push('?');
        }
        if let Some(type_expression) = tag.and_then(|tag| tag.type_expression.as_deref()) {
            let _ = write!(out, ": {}", parameter_type(type_expression));
        }
        out
    }
}

fn is_optional_tag(tag: &JsDocTag) -> bool {
    tag.is_bracketed
        || tag
            .type_expression
            .as_deref()
            .is_some_and(|type_expression| type_expression.trim_end().ends_with('='))
}

// =============================================================================
// Declaration shapes
// =============================================================================

/// `[export] const Name = { ... };` with the byte range from the keyword
/// through the semicolon.
struct ObjectDeclaration<'a> {
    start: usize,
    end: usize,
    name: &'a str,
    /// Trimmed ranges of the literal's comma-separated items.
    properties: Vec<(usize, usize)>,
}

impl<'a> ObjectDeclaration<'a> {
    fn after(text: &'a str, from: usize) -> Option<ObjectDeclaration<'a>> {
        let mut cursor = Cursor::new(text, from);
        cursor.eat_keyword("export");
        let start = cursor.offset();
        cursor.variable_keyword()?;
        let name = cursor.word()?;
        if !cursor.eat("=") || cursor.peek() != Some('{') {
            return None;
        }
        let open = cursor.offset();
        let close = matching_close(text, open)?;
        let mut after = Cursor::new(text, close + 1);
        if after.peek() == Some(',') {
            return None;
        }
        let end = if after.eat(";") { after.pos } else { close + 1 };
        Some(ObjectDeclaration {
            start,
            end,
            name,
            properties: split_items(text, open + 1, close),
        })
    }
}

fn namespace_member(property: &str) -> Option<String> {
    let (is_async, body) = match property.strip_prefix("async") {
        Some(body) if body.starts_with(char::is_whitespace) => (true, body.trim_start()),
        _ => (false, property),
    };
    let name_len = body.find(|c: char| !is_word_char(c)).unwrap_or(body.len());
    let (name, tail) = body.split_at(name_len);
    if !is_identifier(name) {
        return None;
    }
    let tail = tail.trim_start();
    if tail.starts_with('(') {
        let prefix = if is_async { "export async function" } else { "export function" };
        return Some(format!("{prefix} {body}"));
    }
    if is_async {
        return None;
    }
    match tail.strip_prefix(':') {
        Some(value) => Some(format!("export const {name} = {};", value.trim())),
        None if tail.is_empty() => Some(format!("export const {name} = {name};")),
        None => None,
    }
}

/// A class member header: modifiers, then a name followed by `(`, `=`, `;`
/// or a line break.
struct ClassMember<'a> {
    start: usize,
    name: &'a str,
    name_start: usize,
    name_end: usize,
    has_accessibility: bool,
    is_method: bool,
    is_setter: bool,
}

const MEMBER_MODIFIERS: &[&str] = &[
    "static",
    "async",
    "get",
    "set",
    "public",
    "private",
    "protected",
    "readonly",
    "override",
];

const STATEMENT_KEYWORDS: &[&str] = &[
    "function", "class", "const", "let", "var", "if", "for", "while", "switch", "return",
    "catch", "with", "import", "export", "new", "typeof", "throw", "do",
];

impl<'a> ClassMember<'a> {
    fn after(text: &'a str, from: usize) -> Option<ClassMember<'a>> {
        let mut cursor = Cursor::new(text, from);
        let start = cursor.offset();
        let mut modifiers = Vec::new();
        loop {
            cursor.eat("*");
            if cursor.peek() == Some('#') {
                return None;
            }
            let name_start = cursor.offset();
            let word = cursor.word()?;
            if STATEMENT_KEYWORDS.contains(&word) {
                return None;
            }
            let name_end = cursor.pos;
            let line_ends = text[name_end..]
                .chars()
                .take_while(|c| c.is_whitespace())
                .any(|c| c == '\n');
            let next = cursor.peek();
            let ends_name = match next {
                Some('=') => !text[cursor.pos..].starts_with("=>"),
                Some('(' | ';') | None => true,
                _ => line_ends,
            };
            if ends_name {
                if !modifiers.iter().all(|modifier| MEMBER_MODIFIERS.contains(modifier)) {
                    return None;
                }
                return Some(ClassMember {
                    start,
                    name: word,
                    name_start,
                    name_end,
                    has_accessibility: modifiers
                        .iter()
                        .any(|modifier| matches!(*modifier, "public" | "private" | "protected")),
                    is_method: next == Some('('),
                    is_setter: modifiers.contains(&"set"),
                });
            }
            modifiers.push(word);
        }
    }
}

// =============================================================================
// Text helpers
// =============================================================================

/// Replacement of `start..end` in the source text.
#[derive(Debug)]
struct Edit {
    start: usize,
    end: usize,
    text: String,
}

impl Edit {
    fn insert(at: usize, text: impl Into<String>) -> Edit {
        Edit::replace(at, at, text)
    }

    fn replace(start: usize, end: usize, text: impl Into<String>) -> Edit {
        Edit {
            start,
            end,
            text: text.into(),
        }
    }
}

/// Apply non-overlapping edits; an edit overlapping an earlier one is
/// dropped.
fn apply_edits(text: &str, mut edits: Vec<Edit>) -> String {
    if edits.is_empty() {
        return text.to_string();
    }
    edits.sort_by_key(|edit| (edit.start, edit.end));
    let mut out = String::with_capacity(text.len() + edits.len() * 16);
    let mut cursor = 0;
    for edit in edits {
        if edit.start < cursor {
            continue;
        }
        out.push_str(&text[cursor..edit.start]);
        out.push_str(&edit.text);
        cursor = edit.end;
    }
    out.push_str(&text[cursor..]);
    out
}

/// Token-level reader that skips whitespace and comments.
#[derive(Clone, Copy)]
struct Cursor<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str, pos: usize) -> Cursor<'a> {
        Cursor { text, pos }
    }

    fn skip_trivia(&mut self) {
        loop {
            let rest = &self.text[self.pos..];
            let trimmed = rest.trim_start();
            self.pos += rest.len() - trimmed.len();
            if trimmed.starts_with("//") {
                self.pos += trimmed.find('\n').unwrap_or(trimmed.len());
            } else if let Some(comment) = trimmed.strip_prefix("/*") {
                match comment.find("*/") {
                    Some(len) => self.pos += len + 4,
                    None => self.pos = self.text.len(),
                }
            } else {
                return;
            }
        }
    }

    /// Position of the next token.
    fn offset(&mut self) -> usize {
        self.skip_trivia();
        self.pos
    }

    fn peek(&mut self) -> Option<char> {
        self.skip_trivia();
        self.text[self.pos..].chars().next()
    }

    fn eat(&mut self, token: &str) -> bool {
        self.skip_trivia();
        if self.text[self.pos..].starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    fn word(&mut self) -> Option<&'a str> {
        self.skip_trivia();
        let rest = &self.text[self.pos..];
        let len = rest.find(|c: char| !is_word_char(c)).unwrap_or(rest.len());
        if len == 0 || rest.starts_with(|c: char| c.is_ascii_digit()) {
            return None;
        }
        self.pos += len;
        Some(&rest[..len])
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        let mut lookahead = *self;
        if lookahead.word() == Some(keyword) {
            *self = lookahead;
            true
        } else {
            false
        }
    }

    fn variable_keyword(&mut self) -> Option<&'static str> {
        ["const", "let", "var"]
            .into_iter()
            .find(|keyword| self.eat_keyword(keyword))
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

fn is_identifier(text: &str) -> bool {
    !text.is_empty()
        && !text.starts_with(|c: char| c.is_ascii_digit())
        && text.chars().all(is_word_char)
}

fn is_quoted(text: &str) -> bool {
    text.len() >= 2
        && (text.starts_with('"') && text.ends_with('"')
            || text.starts_with('\'') && text.ends_with('\''))
}

/// Index of the bracket closing the one at `open`.
fn matching_close(text: &str, open: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut i = open;
    while i < bytes.len() {
        match bytes[i] {
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            quote @ (b'"' | b'\'' | b'`') => i = closing_quote(bytes, i, quote),
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i += 2;
                while i + 1 < bytes.len() && !(bytes[i] == b'*' && bytes[i + 1] == b'/') {
                    i += 1;
                }
                i += 1;
            }
            _ => {}
        }
        i += 1;
    }
    None
}

fn closing_quote(bytes: &[u8], open: usize, quote: u8) -> usize {
    let mut i = open + 1;
    while i < bytes.len() && bytes[i] != quote {
        if bytes[i] == b'\\' {
            i += 1;
        }
        i += 1;
    }
    i
}

/// Trimmed, non-empty ranges of the comma-separated items in `start..end`.
fn split_items(text: &str, start: usize, end: usize) -> Vec<(usize, usize)> {
    let bytes = text.as_bytes();
    let mut items = Vec::new();
    let mut push = |from: usize, to: usize| {
        let item = &text[from..to];
        let leading = item.len() - item.trim_start().len();
        let trimmed = item.trim();
        if !trimmed.is_empty() {
            items.push((from + leading, from + leading + trimmed.len()));
        }
    };
    let mut item_start = start;
    let mut i = start;
    while i < end {
        match bytes[i] {
            b'(' | b'[' | b'{' => i = matching_close(text, i).unwrap_or(end),
            quote @ (b'"' | b'\'' | b'`') => i = closing_quote(bytes, i, quote),
            b',' => {
                push(item_start, i);
                item_start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    push(item_start, end.min(text.len()));
    items
}
