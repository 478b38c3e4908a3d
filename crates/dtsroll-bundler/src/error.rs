//! Bundler errors.

use dtsroll_binder::ProgramError;
use dtsroll_common::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BundleError {
    /// Loading, parsing or binding reported errors; no output is produced.
    #[error("emit skipped: {} error(s) reported", diagnostics.len())]
    EmitSkipped { diagnostics: Vec<Diagnostic> },

    #[error("entry file not found: {path}")]
    EntryNotFound { path: String },

    /// The entry is a script, so it has no export list to bundle.
    #[error("entry file is not a module: {path}")]
    EntryNotAModule { path: String },
}

impl From<ProgramError> for BundleError {
    fn from(err: ProgramError) -> Self {
        match err {
            ProgramError::EntryNotFound { path } => BundleError::EntryNotFound { path },
        }
    }
}
