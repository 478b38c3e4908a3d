use clap::{Parser, ValueEnum};
use dtsroll_common::{ModuleResolutionKind, ScriptTarget};
use std::path::PathBuf;

/// CLI arguments for the dtsroll binary.
#[derive(Parser, Debug)]
#[command(
    name = "dtsroll",
    version,
    about = "Roll a TypeScript project's public declarations into one .d.ts file"
)]
pub struct CliArgs {
    /// Entry module. Defaults to the first file listed in tsconfig.json.
    pub entry: Option<PathBuf>,

    /// Path to tsconfig.json or a directory containing it.
    #[arg(short = 'p', long = "project")]
    pub project: Option<PathBuf>,

    /// Bundle file to write.
    #[arg(short = 'o', long = "outFile", alias = "out-file")]
    pub out_file: Option<PathBuf>,

    /// Language version the sources are written against.
    #[arg(short = 't', long, value_enum, ignore_case = true)]
    pub target: Option<Target>,

    /// Specify how module specifiers are looked up.
    #[arg(long = "moduleResolution", alias = "module-resolution", value_enum, ignore_case = true)]
    pub module_resolution: Option<ModuleResolution>,

    /// Resolve and load JavaScript sources.
    #[arg(long = "allowJs", alias = "allow-js", num_args = 0..=1, default_missing_value = "true")]
    pub allow_js: Option<bool>,

    /// Print the bundle to stdout instead of writing a file.
    #[arg(long)]
    pub stdout: bool,

    /// Print the names of all files read.
    #[arg(long = "listFiles", alias = "list-files")]
    pub list_files: bool,

    /// Colored, `file:line:col` diagnostics. Defaults to on for terminals.
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub pretty: Option<bool>,

    /// Leave `/** ... */` comments out of the bundle.
    #[arg(long = "noJsDoc", alias = "no-js-doc")]
    pub no_jsdoc: bool,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum Target {
    Es3,
    Es5,
    #[value(alias = "es6")]
    Es2015,
    Es2016,
    Es2017,
    Es2018,
    Es2019,
    Es2020,
    Es2021,
    Es2022,
    Es2023,
    #[value(name = "esnext", alias = "es-next")]
    EsNext,
}

impl Target {
    pub fn to_script_target(self) -> ScriptTarget {
        match self {
            Target::Es3 => ScriptTarget::ES3,
            Target::Es5 => ScriptTarget::ES5,
            Target::Es2015 => ScriptTarget::ES2015,
            Target::Es2016 => ScriptTarget::ES2016,
            Target::Es2017 => ScriptTarget::ES2017,
            Target::Es2018 => ScriptTarget::ES2018,
            Target::Es2019 => ScriptTarget::ES2019,
            Target::Es2020 => ScriptTarget::ES2020,
            Target::Es2021 => ScriptTarget::ES2021,
            Target::Es2022 => ScriptTarget::ES2022,
            Target::Es2023 => ScriptTarget::ES2023,
            Target::EsNext => ScriptTarget::ESNext,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum ModuleResolution {
    Classic,
    #[value(name = "node10", alias = "node")]
    Node10,
    Bundler,
}

impl ModuleResolution {
    pub fn to_module_resolution_kind(self) -> ModuleResolutionKind {
        match self {
            ModuleResolution::Classic => ModuleResolutionKind::Classic,
            ModuleResolution::Node10 => ModuleResolutionKind::Node10,
            ModuleResolution::Bundler => ModuleResolutionKind::Bundler,
        }
    }
}
