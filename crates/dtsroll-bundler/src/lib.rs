//! Declaration bundling for dtsroll.
//!
//! Turns the export surface of one entry module into a single
//! self-contained declaration file:
//!
//! 1. [`collector`] walks everything reachable from the entry's exports and
//!    records each use site of each symbol.
//! 2. [`planner`] decides how each export is exposed and which modules
//!    become synthesized namespaces.
//! 3. [`renamer`] gives every top-level symbol one collision-free name.
//! 4. [`working_tree`] copies the kept declarations into an owned arena and
//!    [`assembler`] rewrites and lays them out.
//!
//! ```no_run
//! use dtsroll_binder::{CompilerOptions, MemoryHost};
//!
//! let host = MemoryHost::new().with_file(
//!     "/src/index.ts",
//!     "export function add(a: number, b: number): number { return a + b; }",
//! );
//! let output = dtsroll_bundler::bundle("/src/index.ts", &CompilerOptions::default(), &host)?;
//! assert_eq!(
//!     output.text,
//!     "declare function add(a: number, b: number): number;\nexport { add };\n"
//! );
//! # Ok::<(), dtsroll_bundler::BundleError>(())
//! ```

pub mod error;
pub use error::BundleError;

pub mod collector;
pub use collector::{
    Collection, Collector, ExternalImport, Reference, ReferenceKind, Target, collect,
    emitted_declarations, resolve_target,
};

pub mod planner;
pub use planner::{
    ExportOutcome, NamespaceMember, Plan, PlannedExport, SkipReason, SynthesizedNamespace, plan,
};

pub mod renamer;
pub use renamer::{NameOwner, NameTable, Renames, rename};

pub mod working_tree;
pub use working_tree::WorkingTree;

pub mod assembler;
pub use assembler::assemble;

pub mod docs;
pub use docs::DocAccessor;

use dtsroll_binder::{CompilerHost, CompilerOptions, Program, SemanticModel};
use dtsroll_emitter::{DeclarationPrinter, PrinterOptions};
use dtsroll_parser::NodeIndex;
use tracing::{info, info_span};

/// Name of the bundle file when the caller does not choose one.
pub const DEFAULT_BUNDLE_FILE_NAME: &str = "bundle.d.ts";

#[derive(Clone, Copy, Debug)]
pub struct BundleOptions {
    /// Carry `/** ... */` comments of kept declarations into the bundle.
    pub preserve_jsdoc: bool,
}

impl Default for BundleOptions {
    fn default() -> Self {
        BundleOptions {
            preserve_jsdoc: true,
        }
    }
}

/// The bundle and the intermediate results that produced it.
#[derive(Debug)]
pub struct BundleOutput {
    pub file_name: String,
    pub collection: Collection,
    pub plan: Plan,
    pub renames: Renames,
    pub tree: WorkingTree,
    /// `SourceFile` node of the bundle in `tree.arena`.
    pub root: NodeIndex,
    /// Printed statements, in order.
    pub statements: Vec<String>,
    pub text: String,
}

/// Load `entry` through `host` and bundle its exports.
pub fn bundle(
    entry: &str,
    options: &CompilerOptions,
    host: &dyn CompilerHost,
) -> Result<BundleOutput, BundleError> {
    let program = Program::create(entry, options, host)?;
    bundle_program(&program, &BundleOptions::default())
}

/// Bundle the entry module of an already loaded program.
pub fn bundle_program(program: &Program, options: &BundleOptions) -> Result<BundleOutput, BundleError> {
    if program.has_errors() {
        return Err(BundleError::EmitSkipped {
            diagnostics: program.error_diagnostics().cloned().collect(),
        });
    }
    let model = SemanticModel::new(program);
    let entry_path = program
        .file(program.entry)
        .map(|file| file.path.clone())
        .unwrap_or_default();
    let Some(module) = model.module_of_file(program.entry) else {
        return Err(BundleError::EntryNotAModule { path: entry_path });
    };
    let _span = info_span!("bundle", entry = %entry_path).entered();
    let exports = model.exports_of(module);

    let collection = {
        let _span = info_span!("collect").entered();
        collect(model, &exports)
    };
    let plan = {
        let _span = info_span!("plan").entered();
        planner::plan(model, &exports, &collection)
    };
    let renames = {
        let _span = info_span!("rename").entered();
        rename(model, &collection, &plan)
    };
    let mut tree = WorkingTree::build(model, &collection);
    let root = {
        let _span = info_span!("assemble").entered();
        assemble(model, &collection, &plan, &renames, &mut tree)
    };

    let printer_options = PrinterOptions {
        preserve_jsdoc: options.preserve_jsdoc,
    };
    let statements = match tree.arena.kind(root) {
        Some(dtsroll_parser::NodeKind::SourceFile { statements, .. }) => {
            DeclarationPrinter::with_options(&tree.arena, printer_options).print_statements(statements)
        }
        _ => Vec::new(),
    };
    let mut text = statements.join("\n");
    text.push('\n');

    info!(
        exports = exports.len(),
        declarations = collection.kept.len(),
        externals = collection.externals.len(),
        namespaces = plan.namespaces.len(),
        "bundle assembled"
    );
    Ok(BundleOutput {
        file_name: DEFAULT_BUNDLE_FILE_NAME.to_string(),
        collection,
        plan,
        renames,
        tree,
        root,
        statements,
        text,
    })
}

#[cfg(test)]
#[path = "tests/renamer_tests.rs"]
mod renamer_tests;
#[cfg(test)]
#[path = "tests/collector_tests.rs"]
mod collector_tests;
#[cfg(test)]
#[path = "tests/working_tree_tests.rs"]
mod working_tree_tests;
