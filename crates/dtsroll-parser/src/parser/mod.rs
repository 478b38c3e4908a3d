//! Recursive-descent parser for the declaration surface of TypeScript and
//! JavaScript sources.

mod state;
mod state_statements;
mod state_statements_class_members;
mod state_types;

pub use state::ParserState;
