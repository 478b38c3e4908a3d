//! JSDoc comment parsing.
//!
//! The scanner attaches the raw text of the `/** ... */` comment preceding a
//! declaration to that declaration. This module turns the raw text into a
//! description plus a list of block tags, which is what the doc accessors and
//! report renderers consume.

use memchr::memmem;

/// A single block tag such as `@param name description`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct JsDocTag {
    /// Tag name without the `@`.
    pub name: String,
    /// `{...}` type expression following the tag, without braces.
    pub type_expression: Option<String>,
    /// Parameter name for `@param`/`@arg`/`@argument`/`@property` tags.
    pub param_name: Option<String>,
    /// The name was written `[name]` or `[name=default]`.
    pub is_bracketed: bool,
    /// Remaining tag text, or `None` when the tag has no comment.
    pub comment: Option<String>,
}

/// A parsed JSDoc comment.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct JsDoc {
    pub description: Option<String>,
    pub tags: Vec<JsDocTag>,
}

impl JsDoc {
    /// Parse the raw text of a `/** ... */` comment.
    pub fn parse(raw: &str) -> JsDoc {
        let body = strip_delimiters(raw);
        let lines: Vec<&str> = body.lines().map(strip_line_prefix).collect();

        let mut description_lines: Vec<&str> = Vec::new();
        let mut tags: Vec<(String, Vec<String>)> = Vec::new();

        for line in lines {
            let in_example = tags.last().is_some_and(|(name, _)| name == "example");
            let segments = if in_example && !line.trim_start().starts_with('@') {
                vec![line]
            } else {
                split_inline_tags(line)
            };
            for segment in segments {
                let trimmed = segment.trim_start();
                if let Some(rest) = trimmed.strip_prefix('@') {
                    let name_end = rest
                        .find(|c: char| c.is_whitespace())
                        .unwrap_or(rest.len());
                    let name = rest[..name_end].to_string();
                    let first = rest[name_end..].trim().to_string();
                    tags.push((name, vec![first]));
                } else if let Some((_, body)) = tags.last_mut() {
                    body.push(segment.to_string());
                } else {
                    description_lines.push(segment);
                }
            }
        }

        let description = join_trimmed(description_lines.iter().map(|s| s.to_string()));
        let tags = tags
            .into_iter()
            .map(|(name, body)| parse_tag(name, body))
            .collect();

        JsDoc { description, tags }
    }

    pub fn tags_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a JsDocTag> + 'a {
        self.tags.iter().filter(move |tag| tag.name == name)
    }

    pub fn param_description(&self, param: &str) -> Option<&str> {
        self.tags
            .iter()
            .filter(|tag| matches!(tag.name.as_str(), "param" | "arg" | "argument"))
            .find(|tag| tag.param_name.as_deref() == Some(param))
            .and_then(|tag| tag.comment.as_deref())
    }

    pub fn return_description(&self) -> Option<&str> {
        self.tags
            .iter()
            .find(|tag| matches!(tag.name.as_str(), "returns" | "return"))
            .and_then(|tag| tag.comment.as_deref())
    }

    pub fn examples(&self) -> Vec<&str> {
        self.tags_named("example")
            .filter_map(|tag| tag.comment.as_deref())
            .collect()
    }

    pub fn see_links(&self) -> Vec<&str> {
        self.tags_named("see")
            .filter_map(|tag| tag.comment.as_deref())
            .collect()
    }
}

fn strip_delimiters(raw: &str) -> &str {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix("/**") {
        text = rest;
    } else if let Some(rest) = text.strip_prefix("/*") {
        text = rest;
    }
    if let Some(end) = memmem::rfind(text.as_bytes(), b"*/") {
        text = &text[..end];
    }
    text
}

/// Remove the leading ` * ` decoration of a comment line.
fn strip_line_prefix(line: &str) -> &str {
    let trimmed = line.trim_start();
    match trimmed.strip_prefix('*') {
        Some(rest) => rest.strip_prefix(' ').unwrap_or(rest),
        None => trimmed,
    }
}

/// Split a line before every `@tag` that follows whitespace outside braces,
/// so `@param {number} x @returns {string}` yields two tags.
fn split_inline_tags(line: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut depth = 0usize;
    let mut previous = ' ';
    for (i, ch) in line.char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            '@' if depth == 0 && previous.is_whitespace() && i > start => {
                if !line[start..i].trim().is_empty() {
                    segments.push(&line[start..i]);
                }
                start = i;
            }
            _ => {}
        }
        previous = ch;
    }
    segments.push(&line[start..]);
    segments
}

fn join_trimmed(lines: impl Iterator<Item = String>) -> Option<String> {
    let joined = lines.collect::<Vec<_>>().join("\n");
    let trimmed = joined.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn parse_tag(name: String, body: Vec<String>) -> JsDocTag {
    // Examples keep their layout; everything else is normalized.
    if name == "example" {
        let text = body.join("\n");
        let comment = if text.trim().is_empty() {
            None
        } else {
            Some(text.trim_matches('\n').trim_end().to_string())
        };
        return JsDocTag {
            name,
            comment,
            ..JsDocTag::default()
        };
    }

    let mut text = body.join("\n").trim().to_string();
    let mut type_expression = None;
    if text.starts_with('{') {
        if let Some(close) = matching_brace(&text) {
            type_expression = Some(text[1..close].trim().to_string());
            text = text[close + 1..].trim_start().to_string();
        }
    }

    let mut param_name = None;
    let mut is_bracketed = false;
    if matches!(
        name.as_str(),
        "param" | "arg" | "argument" | "property" | "prop" | "typedef" | "template"
    ) {
        let end = text.find(char::is_whitespace).unwrap_or(text.len());
        let raw_name = &text[..end];
        is_bracketed = raw_name.starts_with('[');
        let cleaned = raw_name
            .trim_start_matches('[')
            .trim_end_matches(']')
            .split('=')
            .next()
            .unwrap_or_default()
            .to_string();
        if !cleaned.is_empty() {
            param_name = Some(cleaned);
        }
        text = text[end..].trim_start().to_string();
        if let Some(rest) = text.strip_prefix('-') {
            text = rest.trim_start().to_string();
        }
    }

    JsDocTag {
        name,
        type_expression,
        param_name,
        is_bracketed,
        comment: if text.is_empty() { None } else { Some(text) },
    }
}

fn matching_brace(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, ch) in text.char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}
