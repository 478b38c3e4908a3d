//! Compiler enums shared between the binder, the bundler and the CLI.

/// ECMAScript target version.
///
/// The bundler never lowers syntax, so the target only affects which
/// declaration files a host chooses to load; it is carried for fidelity with
/// tsconfig files.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ScriptTarget {
    ES3,
    ES5,
    ES2015,
    ES2016,
    ES2017,
    ES2018,
    ES2019,
    ES2020,
    ES2021,
    ES2022,
    ES2023,
    #[default]
    ESNext,
}

impl ScriptTarget {
    /// Parse a tsconfig/CLI spelling (`"es2020"`, `"ES6"`, `"esnext"`).
    pub fn parse(value: &str) -> Option<ScriptTarget> {
        let target = match value.trim().to_ascii_lowercase().as_str() {
            "es3" => ScriptTarget::ES3,
            "es5" => ScriptTarget::ES5,
            "es6" | "es2015" => ScriptTarget::ES2015,
            "es2016" => ScriptTarget::ES2016,
            "es2017" => ScriptTarget::ES2017,
            "es2018" => ScriptTarget::ES2018,
            "es2019" => ScriptTarget::ES2019,
            "es2020" => ScriptTarget::ES2020,
            "es2021" => ScriptTarget::ES2021,
            "es2022" => ScriptTarget::ES2022,
            "es2023" => ScriptTarget::ES2023,
            "esnext" | "latest" => ScriptTarget::ESNext,
            _ => return None,
        };
        Some(target)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScriptTarget::ES3 => "es3",
            ScriptTarget::ES5 => "es5",
            ScriptTarget::ES2015 => "es2015",
            ScriptTarget::ES2016 => "es2016",
            ScriptTarget::ES2017 => "es2017",
            ScriptTarget::ES2018 => "es2018",
            ScriptTarget::ES2019 => "es2019",
            ScriptTarget::ES2020 => "es2020",
            ScriptTarget::ES2021 => "es2021",
            ScriptTarget::ES2022 => "es2022",
            ScriptTarget::ES2023 => "es2023",
            ScriptTarget::ESNext => "esnext",
        }
    }
}

/// Module resolution strategy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ModuleResolutionKind {
    /// Legacy TypeScript resolution: bare specifiers are looked up as files
    /// in the importing directory and its ancestors.
    Classic,
    /// Node.js CommonJS-style resolution with `node_modules` lookup.
    #[default]
    Node10,
    /// `Node10` lookup that also reads the package.json `exports` map.
    Bundler,
}

impl ModuleResolutionKind {
    pub fn parse(value: &str) -> Option<ModuleResolutionKind> {
        let kind = match value.trim().to_ascii_lowercase().as_str() {
            "classic" => ModuleResolutionKind::Classic,
            "node" | "node10" | "nodejs" | "node16" | "nodenext" => ModuleResolutionKind::Node10,
            "bundler" => ModuleResolutionKind::Bundler,
            _ => return None,
        };
        Some(kind)
    }

    pub fn uses_node_modules(&self) -> bool {
        !matches!(self, ModuleResolutionKind::Classic)
    }
}

/// Print a cooked string value as a double-quoted literal.
pub fn quote_string_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{0008}' => out.push_str("\\b"),
            '\u{000C}' => out.push_str("\\f"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04X}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
