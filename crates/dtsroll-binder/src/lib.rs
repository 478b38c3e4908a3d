//! Program loading, module resolution and symbol binding for dtsroll.
//!
//! [`Program::create`] walks the module graph from an entry file, parses
//! every file, binds declarations into one program-wide [`SymbolArena`] and
//! resolves identifiers. [`SemanticModel`] is the read-only query surface
//! the bundler consumes.

pub mod host;
pub use host::{CompilerHost, MemoryHost, normalize_path};

pub mod preprocess;
pub use preprocess::{JsDocTypedefPass, PreprocessedHost, Preprocessor, SourcePass};

pub mod jsdoc_passes;
pub use jsdoc_passes::{
    ImportExtensionPass, JsDocAccessPass, JsDocEnumPass, JsDocFunctionPass, JsDocNamespacePass,
    JsDocVariablePass,
};

pub mod options;
pub use options::CompilerOptions;

pub mod module_resolver;
pub use module_resolver::{
    ExternalModuleEntry, ModuleResolver, ResolutionFailure, ResolvedModule,
};

pub mod symbols;
pub use symbols::{
    AliasTarget, FileId, NodeRef, Symbol, SymbolArena, SymbolFlags, SymbolId, SymbolTable,
};

pub mod state;
pub use state::BinderState;

pub mod name_resolver;
pub use name_resolver::{Meaning, NameResolver};

pub mod program;
pub use program::{FileOrigin, ModuleTarget, Program, ProgramError, SourceFile};

pub mod semantic;
pub use semantic::{DeclaredType, ModuleExport, SemanticModel};

#[cfg(test)]
#[path = "tests/host_tests.rs"]
mod host_tests;
#[cfg(test)]
#[path = "tests/symbols_tests.rs"]
mod symbols_tests;
#[cfg(test)]
#[path = "tests/module_resolver_tests.rs"]
mod module_resolver_tests;
#[cfg(test)]
#[path = "tests/preprocess_tests.rs"]
mod preprocess_tests;
#[cfg(test)]
#[path = "tests/jsdoc_passes_tests.rs"]
mod jsdoc_passes_tests;
