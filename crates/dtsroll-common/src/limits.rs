//! Centralized limits and thresholds.
//!
//! Every recursive walk over user input is bounded either by a visited set or
//! by one of these constants. Keeping them here avoids duplicated magic
//! numbers with inconsistent values across crates.

// =============================================================================
// Recursion Depth Limits
// =============================================================================

/// Maximum nesting depth the parser accepts for types and namespaces.
///
/// ```typescript
/// type Deep = Array<Array<Array<Array</* ... hundreds of levels ... */>>>>;
/// ```
///
/// Past this depth the parser reports a diagnostic and stops descending.
pub const MAX_TYPE_NESTING_DEPTH: u32 = 256;

/// Maximum number of hops followed when resolving an alias chain.
///
/// ```typescript
/// // a.ts
/// export { x as y } from "./b";
/// // b.ts
/// export { x } from "./c";
/// // ...
/// ```
///
/// Alias walks also keep a visited set, so this only bounds pathological
/// but acyclic chains.
pub const MAX_ALIAS_CHAIN_DEPTH: usize = 64;

/// Maximum depth of synthesized namespace nesting (`export * as ns` inside a
/// module that is itself re-exported as a namespace).
pub const MAX_NAMESPACE_REEXPORT_DEPTH: usize = 32;

// =============================================================================
// Operation Counts
// =============================================================================

/// Maximum number of ancestor directories searched for `node_modules`.
pub const MAX_NODE_MODULES_WALK: usize = 64;

/// Maximum number of files a single program will load.
pub const MAX_PROGRAM_FILES: usize = 100_000;
