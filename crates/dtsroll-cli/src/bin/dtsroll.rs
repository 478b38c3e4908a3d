#![allow(clippy::print_stderr)]

use anyhow::{Context, Result};
use clap::Parser;
use std::io::{IsTerminal, Write};

use dtsroll_cli::args::CliArgs;
use dtsroll_cli::reporter::Reporter;
use dtsroll_cli::{driver, tracing_config};

/// Errors were reported and no bundle was written.
const EXIT_DIAGNOSTICS_OUTPUTS_SKIPPED: i32 = 1;

fn main() -> Result<()> {
    tracing_config::init_tracing();

    let args = CliArgs::parse();
    let cwd = std::env::current_dir().context("failed to resolve current directory")?;
    let result = driver::run(&args, &cwd)?;

    if args.list_files {
        for file in &result.files_read {
            println!("{file}");
        }
    }

    if !result.diagnostics.is_empty() {
        let pretty = args
            .pretty
            .unwrap_or_else(|| std::io::stderr().is_terminal());
        let mut reporter = Reporter::new(pretty);
        eprint!("{}", reporter.render(&result.diagnostics));
    }

    if result.emit_skipped() {
        std::process::exit(EXIT_DIAGNOSTICS_OUTPUTS_SKIPPED);
    }

    if args.stdout
        && let Some(text) = &result.bundle
    {
        let mut stdout = std::io::stdout().lock();
        stdout
            .write_all(text.as_bytes())
            .context("failed to write bundle to stdout")?;
    }
    Ok(())
}
