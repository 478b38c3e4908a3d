//! Compiler options consumed by program loading.

use dtsroll_common::{ModuleResolutionKind, ScriptTarget};

/// Options that affect how a program is loaded and bound.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompilerOptions {
    pub target: ScriptTarget,
    pub module_resolution: ModuleResolutionKind,
    /// Resolve and load `.js`/`.jsx` sources.
    pub allow_js: bool,
    /// Declaration emission requested; bundling always implies it.
    pub declaration: bool,
    /// Refuse to produce output when any error diagnostic exists.
    pub no_emit_on_error: bool,
    /// Extra root files loaded after the entry graph (global scripts,
    /// ambient module declarations).
    pub files: Vec<String>,
    pub out_file: Option<String>,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        CompilerOptions {
            target: ScriptTarget::default(),
            module_resolution: ModuleResolutionKind::default(),
            allow_js: true,
            declaration: true,
            no_emit_on_error: true,
            files: Vec::new(),
            out_file: None,
        }
    }
}

impl CompilerOptions {
    pub fn with_module_resolution(mut self, kind: ModuleResolutionKind) -> CompilerOptions {
        self.module_resolution = kind;
        self
    }

    pub fn with_files(mut self, files: impl IntoIterator<Item = impl Into<String>>) -> CompilerOptions {
        self.files = files.into_iter().map(Into::into).collect();
        self
    }
}
