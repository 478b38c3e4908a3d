//! Scanner, arena AST and parser for the dtsroll declaration bundler.
//!
//! The parser covers the declaration surface of TypeScript: imports, exports,
//! declarations with their signatures, and the full type grammar. Function
//! bodies and initializers are skipped, so loosely-typed sources parse into
//! the same shape as declaration files.

pub mod syntax_kind;
pub use syntax_kind::SyntaxKind;

pub mod scanner;
pub use scanner::{ScannerState, is_identifier_text};

pub mod node;
pub use node::{
    HeritageToken, KeywordType, MappedModifier, ModifierFlags, ModuleDeclarationKind, Node,
    NodeIndex, NodeKind, NodeList, TypeOperatorKind, VariableKind,
};

pub mod node_arena;
pub use node_arena::{BindingKey, NodeArena};

pub mod parser;
pub use parser::ParserState;

#[cfg(test)]
#[path = "tests/scanner_tests.rs"]
mod scanner_tests;
#[cfg(test)]
#[path = "tests/node_tests.rs"]
mod node_tests;
