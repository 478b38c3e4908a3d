//! Declaration printer for the dtsroll declaration bundler.
//!
//! Serializes arena statements back to `.d.ts` text. The printer is faithful
//! to the modifiers it finds on each node; callers that need ambient output
//! (`declare`, no `export`) rewrite the modifiers before printing.

pub mod declaration_printer;
pub use declaration_printer::{DeclarationPrinter, PrinterOptions, is_overload_implementation};

#[cfg(test)]
#[path = "tests/declaration_printer_tests.rs"]
mod declaration_printer_tests;
#[cfg(test)]
#[path = "tests/type_printer_tests.rs"]
mod type_printer_tests;
