//! Compiler hosts: where source text comes from.

use rustc_hash::FxHashMap;

/// File access used by program loading and module resolution. Paths are
/// normalized, `/`-separated strings.
pub trait CompilerHost {
    fn read_file(&self, path: &str) -> Option<String>;

    fn file_exists(&self, path: &str) -> bool;
}

impl<H: CompilerHost + ?Sized> CompilerHost for &H {
    fn read_file(&self, path: &str) -> Option<String> {
        (**self).read_file(path)
    }

    fn file_exists(&self, path: &str) -> bool {
        (**self).file_exists(path)
    }
}

/// In-memory host for tests and embedding.
///
/// ```
/// use dtsroll_binder::{CompilerHost, MemoryHost};
///
/// let host = MemoryHost::new().with_file("/src/index.ts", "export const x = 1;");
/// assert!(host.file_exists("/src/index.ts"));
/// assert!(host.file_exists("/src/./index.ts"));
/// ```
#[derive(Clone, Debug, Default)]
pub struct MemoryHost {
    files: FxHashMap<String, String>,
}

impl MemoryHost {
    pub fn new() -> MemoryHost {
        MemoryHost::default()
    }

    pub fn with_file(mut self, path: &str, text: &str) -> MemoryHost {
        self.add_file(path, text);
        self
    }

    pub fn add_file(&mut self, path: &str, text: &str) {
        self.files.insert(normalize_path(path), text.to_string());
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl CompilerHost for MemoryHost {
    fn read_file(&self, path: &str) -> Option<String> {
        self.files.get(&normalize_path(path)).cloned()
    }

    fn file_exists(&self, path: &str) -> bool {
        self.files.contains_key(&normalize_path(path))
    }
}

// =============================================================================
// Path helpers
// =============================================================================

/// Collapse `.`/`..` segments and repeated separators; backslashes become `/`.
pub fn normalize_path(path: &str) -> String {
    let path = path.replace('\\', "/");
    let is_absolute = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if parts.last().is_some_and(|last| *last != "..") {
                    parts.pop();
                } else if !is_absolute {
                    parts.push("..");
                }
            }
            _ => parts.push(segment),
        }
    }
    let joined = parts.join("/");
    if is_absolute {
        format!("/{joined}")
    } else if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}

/// Directory part of a normalized path (`"/a/b.ts"` -> `"/a"`).
pub fn parent_dir(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) => "/",
        Some(index) => &path[..index],
        None => ".",
    }
}

pub fn join_path(dir: &str, relative: &str) -> String {
    if relative.starts_with('/') {
        return normalize_path(relative);
    }
    normalize_path(&format!("{dir}/{relative}"))
}

/// JavaScript-family files that go through the preprocessing passes.
pub fn is_loosely_typed(path: &str) -> bool {
    [".js", ".jsx", ".mjs", ".cjs"]
        .iter()
        .any(|ext| path.ends_with(ext))
}

pub fn is_declaration_file(path: &str) -> bool {
    [".d.ts", ".d.mts", ".d.cts"]
        .iter()
        .any(|ext| path.ends_with(ext))
}
