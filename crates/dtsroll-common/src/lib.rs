//! Common types and utilities for the dtsroll declaration bundler.
//!
//! This crate provides foundational types used across all dtsroll crates:
//! - Source spans (`Span`)
//! - Line maps for turning byte offsets into line/column positions
//! - Diagnostics and TypeScript-compatible diagnostic codes
//! - Compiler enums (`ScriptTarget`, `ModuleResolutionKind`)
//! - Limits and thresholds for recursive algorithms
//! - JSDoc comment parsing

pub mod common;
pub use common::{ModuleResolutionKind, ScriptTarget, quote_string_literal};

pub mod span;
pub use span::Span;

pub mod position;
pub use position::{LineMap, Position};

pub mod diagnostics;
pub use diagnostics::{
    Diagnostic, DiagnosticCategory, diagnostic_codes, diagnostic_messages, format_message,
};

pub mod limits;

pub mod comments;
pub use comments::{JsDoc, JsDocTag};

#[cfg(test)]
#[path = "tests/position_tests.rs"]
mod position_tests;
#[cfg(test)]
#[path = "tests/comments_tests.rs"]
mod comments_tests;
#[cfg(test)]
#[path = "tests/common_tests.rs"]
mod common_tests;
