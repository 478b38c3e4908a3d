//! tsconfig.json discovery and option resolution.
//!
//! Command-line flags override tsconfig values, which override the
//! defaults of [`CompilerOptions`]. Paths written in a tsconfig are
//! relative to the file that declares them.

use anyhow::{Context, Result, anyhow, bail};
use dtsroll_binder::CompilerOptions;
use dtsroll_binder::host::parent_dir;
use dtsroll_bundler::DEFAULT_BUNDLE_FILE_NAME;
use dtsroll_common::limits::MAX_NODE_MODULES_WALK;
use dtsroll_common::{ModuleResolutionKind, ScriptTarget};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};

use crate::args::CliArgs;
use crate::fs::host_path;

pub const TSCONFIG_FILE_NAME: &str = "tsconfig.json";

/// Accepts `true` as well as `"true"` for boolean options.
fn deserialize_bool_or_string<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrString {
        Bool(bool),
        String(String),
    }

    match Option::<BoolOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(BoolOrString::Bool(b)) => Ok(Some(b)),
        Some(BoolOrString::String(s)) => match s.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(Some(true)),
            "false" | "0" | "no" | "off" => Ok(Some(false)),
            _ => Err(Error::custom(format!(
                "invalid boolean value: '{s}'. Expected true, false, 'true', or 'false'"
            ))),
        },
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TsConfig {
    #[serde(default)]
    pub extends: Option<String>,
    #[serde(default)]
    pub compiler_options: Option<TsCompilerOptions>,
    #[serde(default)]
    pub files: Option<Vec<String>>,
}

/// The `compilerOptions` the bundler reads; everything else is ignored.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TsCompilerOptions {
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub module_resolution: Option<String>,
    #[serde(default, deserialize_with = "deserialize_bool_or_string")]
    pub allow_js: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_bool_or_string")]
    pub declaration: Option<bool>,
    #[serde(default)]
    pub declaration_dir: Option<String>,
    #[serde(default)]
    pub out_file: Option<String>,
}

impl TsConfig {
    /// Make the paths this file declares absolute.
    fn anchor(&mut self, dir: &Path) {
        let absolute = |path: &str| host_path(dir, Path::new(path));
        if let Some(files) = self.files.as_mut() {
            for file in files.iter_mut() {
                *file = absolute(file);
            }
        }
        if let Some(options) = self.compiler_options.as_mut() {
            options.declaration_dir = options.declaration_dir.as_deref().map(absolute);
            options.out_file = options.out_file.as_deref().map(absolute);
        }
    }
}

pub fn parse_tsconfig(source: &str) -> Result<TsConfig> {
    let stripped = strip_jsonc(source);
    let normalized = remove_trailing_commas(&stripped);
    let config = serde_json::from_str(&normalized).context("failed to parse tsconfig JSON")?;
    Ok(config)
}

/// Load `path`, following `extends`.
pub fn load_tsconfig(path: &Path) -> Result<TsConfig> {
    let mut visited = FxHashSet::default();
    load_tsconfig_inner(path, &mut visited)
}

fn load_tsconfig_inner(path: &Path, visited: &mut FxHashSet<PathBuf>) -> Result<TsConfig> {
    let canonical = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    if !visited.insert(canonical.clone()) {
        bail!("tsconfig extends cycle detected at {}", canonical.display());
    }

    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read tsconfig: {}", path.display()))?;
    let mut config = parse_tsconfig(&source)
        .with_context(|| format!("failed to parse tsconfig: {}", path.display()))?;
    let dir = path
        .parent()
        .ok_or_else(|| anyhow!("tsconfig has no parent directory"))?;
    config.anchor(dir);

    if let Some(extends) = config.extends.take() {
        let mut base_path = dir.join(&extends);
        if base_path.extension().is_none() {
            base_path.set_extension("json");
        }
        let base = load_tsconfig_inner(&base_path, visited)?;
        config = merge_configs(base, config);
    }

    visited.remove(&canonical);
    Ok(config)
}

fn merge_configs(base: TsConfig, mut child: TsConfig) -> TsConfig {
    let compiler_options = match (base.compiler_options, child.compiler_options.take()) {
        (Some(base), Some(child)) => Some(TsCompilerOptions {
            target: child.target.or(base.target),
            module_resolution: child.module_resolution.or(base.module_resolution),
            allow_js: child.allow_js.or(base.allow_js),
            declaration: child.declaration.or(base.declaration),
            declaration_dir: child.declaration_dir.or(base.declaration_dir),
            out_file: child.out_file.or(base.out_file),
        }),
        (base, child) => child.or(base),
    };
    TsConfig {
        extends: None,
        compiler_options,
        files: child.files.or(base.files),
    }
}

/// `tsconfig.json` in `start` or the nearest ancestor directory.
pub fn find_tsconfig(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .take(MAX_NODE_MODULES_WALK)
        .map(|dir| dir.join(TSCONFIG_FILE_NAME))
        .find(|candidate| candidate.is_file())
}

/// An explicit `--project` (file or directory), else discovery from
/// `search_from`.
pub fn resolve_tsconfig_path(
    cwd: &Path,
    project: Option<&Path>,
    search_from: &Path,
) -> Result<Option<PathBuf>> {
    let Some(project) = project else {
        return Ok(find_tsconfig(search_from));
    };
    let mut candidate = if project.is_absolute() {
        project.to_path_buf()
    } else {
        cwd.join(project)
    };
    if candidate.is_dir() {
        candidate = candidate.join(TSCONFIG_FILE_NAME);
    }
    if !candidate.is_file() {
        bail!("tsconfig not found at {}", candidate.display());
    }
    Ok(Some(candidate))
}

/// Everything one bundling run needs.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub config_path: Option<PathBuf>,
    /// Host path of the entry module.
    pub entry: String,
    pub options: CompilerOptions,
    /// Where the bundle is written unless printing to stdout.
    pub output: PathBuf,
    pub preserve_jsdoc: bool,
}

pub fn resolve_config(args: &CliArgs, cwd: &Path) -> Result<ResolvedConfig> {
    let cli_entry = args.entry.as_deref().map(|entry| host_path(cwd, entry));
    let search_from = match cli_entry.as_deref() {
        Some(entry) => PathBuf::from(parent_dir(entry)),
        None => cwd.to_path_buf(),
    };
    let config_path = resolve_tsconfig_path(cwd, args.project.as_deref(), &search_from)?;
    let config = match config_path.as_deref() {
        Some(path) => load_tsconfig(path)?,
        None => TsConfig::default(),
    };
    tracing::debug!(config = ?config_path, "tsconfig resolved");

    let ts_options = config.compiler_options.unwrap_or_default();
    let mut options = compiler_options_from(&ts_options)?;
    apply_cli_overrides(&mut options, args);

    let mut files = config.files.unwrap_or_default();
    let entry = match cli_entry {
        Some(entry) => entry,
        None if !files.is_empty() => files.remove(0),
        None => bail!(
            "no entry file: pass one on the command line or list it under \"files\" in {TSCONFIG_FILE_NAME}"
        ),
    };
    files.retain(|file| *file != entry);
    options.files = files;

    let output = match (&args.out_file, &ts_options.out_file, &ts_options.declaration_dir) {
        (Some(out_file), _, _) => PathBuf::from(host_path(cwd, out_file)),
        (None, Some(out_file), _) => PathBuf::from(out_file),
        (None, None, Some(dir)) => Path::new(dir).join(DEFAULT_BUNDLE_FILE_NAME),
        (None, None, None) => Path::new(parent_dir(&entry)).join(DEFAULT_BUNDLE_FILE_NAME),
    };
    options.out_file = Some(output.to_string_lossy().into_owned());

    Ok(ResolvedConfig {
        config_path,
        entry,
        options,
        output,
        preserve_jsdoc: !args.no_jsdoc,
    })
}

pub fn compiler_options_from(ts_options: &TsCompilerOptions) -> Result<CompilerOptions> {
    let mut options = CompilerOptions::default();
    if let Some(target) = ts_options.target.as_deref() {
        options.target = ScriptTarget::parse(target)
            .ok_or_else(|| anyhow!("unsupported compilerOptions.target '{target}'"))?;
    }
    if let Some(kind) = ts_options.module_resolution.as_deref() {
        options.module_resolution = ModuleResolutionKind::parse(kind)
            .ok_or_else(|| anyhow!("unsupported compilerOptions.moduleResolution '{kind}'"))?;
    }
    if let Some(allow_js) = ts_options.allow_js {
        options.allow_js = allow_js;
    }
    if let Some(declaration) = ts_options.declaration {
        options.declaration = declaration;
    }
    Ok(options)
}

pub fn apply_cli_overrides(options: &mut CompilerOptions, args: &CliArgs) {
    if let Some(target) = args.target {
        options.target = target.to_script_target();
    }
    if let Some(module_resolution) = args.module_resolution {
        options.module_resolution = module_resolution.to_module_resolution_kind();
    }
    if let Some(allow_js) = args.allow_js {
        options.allow_js = allow_js;
    }
}

fn strip_jsonc(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;
    let mut escape = false;
    let mut in_line_comment = false;
    let mut in_block_comment = false;

    while let Some(ch) = chars.next() {
        if in_line_comment {
            if ch == '\n' {
                in_line_comment = false;
                out.push(ch);
            }
            continue;
        }
        if in_block_comment {
            if ch == '*' && chars.peek() == Some(&'/') {
                chars.next();
                in_block_comment = false;
            } else if ch == '\n' {
                out.push(ch);
            }
            continue;
        }
        if in_string {
            out.push(ch);
            if escape {
                escape = false;
            } else if ch == '\\' {
                escape = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match (ch, chars.peek()) {
            ('"', _) => {
                in_string = true;
                out.push(ch);
            }
            ('/', Some('/')) => {
                chars.next();
                in_line_comment = true;
            }
            ('/', Some('*')) => {
                chars.next();
                in_block_comment = true;
            }
            _ => out.push(ch),
        }
    }
    out
}

fn remove_trailing_commas(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;
    let mut escape = false;

    while let Some(ch) = chars.next() {
        if in_string {
            out.push(ch);
            if escape {
                escape = false;
            } else if ch == '\\' {
                escape = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        if ch == '"' {
            in_string = true;
            out.push(ch);
            continue;
        }
        if ch == ',' {
            let mut lookahead = chars.clone();
            while lookahead.peek().is_some_and(|next| next.is_whitespace()) {
                lookahead.next();
            }
            if matches!(lookahead.peek(), Some('}' | ']')) {
                continue;
            }
        }
        out.push(ch);
    }
    out
}
