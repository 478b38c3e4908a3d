//! One bundling run: resolve configuration, load the program, bundle and
//! write the result.

use anyhow::{Context, Result};
use dtsroll_binder::{PreprocessedHost, Preprocessor, Program};
use dtsroll_bundler::{BundleError, BundleOptions, bundle_program};
use dtsroll_common::Diagnostic;
use std::path::{Path, PathBuf};
use tracing::{info, info_span};

use crate::args::CliArgs;
use crate::config::{ResolvedConfig, resolve_config};
use crate::fs::DiskHost;

#[derive(Debug)]
pub struct RunResult {
    pub config: ResolvedConfig,
    /// Every file the program loaded, in load order.
    pub files_read: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
    /// The bundle text; `None` when errors skipped the emit.
    pub bundle: Option<String>,
    /// Path the bundle was written to; `None` for `--stdout` or a skipped emit.
    pub written: Option<PathBuf>,
}

impl RunResult {
    pub fn emit_skipped(&self) -> bool {
        self.bundle.is_none()
    }
}

pub fn run(args: &CliArgs, cwd: &Path) -> Result<RunResult> {
    let config = resolve_config(args, cwd)?;
    let _span = info_span!("run", entry = %config.entry).entered();

    let host = PreprocessedHost::new(DiskHost, Preprocessor::jsdoc());
    let program = Program::create(&config.entry, &config.options, &host)
        .with_context(|| format!("failed to load {}", config.entry))?;
    let files_read = program.files.iter().map(|file| file.path.clone()).collect();
    let diagnostics = program.diagnostics.clone();

    let options = BundleOptions {
        preserve_jsdoc: config.preserve_jsdoc,
    };
    let text = match bundle_program(&program, &options) {
        Ok(output) => output.text,
        Err(BundleError::EmitSkipped { diagnostics }) => {
            info!(errors = diagnostics.len(), "emit skipped");
            return Ok(RunResult {
                config,
                files_read,
                diagnostics,
                bundle: None,
                written: None,
            });
        }
        Err(err) => return Err(err).context("bundling failed"),
    };

    let written = if args.stdout {
        None
    } else {
        write_bundle(&config.output, &text)?;
        info!(path = %config.output.display(), bytes = text.len(), "bundle written");
        Some(config.output.clone())
    };

    Ok(RunResult {
        config,
        files_read,
        diagnostics,
        bundle: Some(text),
        written,
    })
}

fn write_bundle(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    std::fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))
}
