//! Module resolution.
//!
//! Implements the resolution strategies dtsroll supports:
//! - Node10 (`node_modules` lookup with `package.json` `types`/`typings`/`main`)
//! - Bundler (Node10 plus the `exports` map with the `types`/`import`/`default` conditions)
//! - Classic (ancestor-directory lookup of `<specifier>.ts`/`.d.ts`)
//!
//! Relative specifiers resolve the same way under every strategy. Resolution
//! goes through a [`CompilerHost`], so it works against the disk and against
//! in-memory file sets alike.

use crate::host::{CompilerHost, join_path, normalize_path, parent_dir};
use dtsroll_common::diagnostics::{
    Diagnostic, diagnostic_codes, diagnostic_messages, format_message,
};
use dtsroll_common::limits::MAX_NODE_MODULES_WALK;
use dtsroll_common::{ModuleResolutionKind, Span};
use indexmap::IndexMap;
use rustc_hash::FxHashMap;

/// Result of module resolution
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedModule {
    /// Normalized path of the resolved file
    pub resolved_path: String,
    /// The file lives under a `node_modules` directory
    pub is_external: bool,
    /// Package name when resolved from `node_modules`
    pub package_name: Option<String>,
    /// Subpath inside the package (`lib/sub` -> `sub`)
    pub subpath: Option<String>,
}

/// Where an external symbol's declaration physically lives; used to
/// synthesize `import { x } from "pkg/subpath"`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ExternalModuleEntry {
    pub package_name: String,
    pub subpath: Option<String>,
}

impl ExternalModuleEntry {
    pub fn new(package_name: impl Into<String>, subpath: Option<String>) -> ExternalModuleEntry {
        ExternalModuleEntry {
            package_name: package_name.into(),
            subpath,
        }
    }

    /// The module specifier an import of this entry uses.
    pub fn specifier(&self) -> String {
        match &self.subpath {
            Some(subpath) if !subpath.is_empty() => format!("{}/{}", self.package_name, subpath),
            _ => self.package_name.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolutionFailure {
    /// No file matched the specifier
    NotFound {
        specifier: String,
        containing_file: String,
        span: Span,
    },
    /// Empty or otherwise unusable specifier
    InvalidSpecifier {
        specifier: String,
        containing_file: String,
        span: Span,
    },
}

impl ResolutionFailure {
    /// Every failure surfaces as TS2307.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let (specifier, containing_file, span) = match self {
            ResolutionFailure::NotFound {
                specifier,
                containing_file,
                span,
            }
            | ResolutionFailure::InvalidSpecifier {
                specifier,
                containing_file,
                span,
            } => (specifier, containing_file, *span),
        };
        Diagnostic::error(
            containing_file.clone(),
            span,
            format_message(diagnostic_messages::CANNOT_FIND_MODULE, &[specifier]),
            diagnostic_codes::CANNOT_FIND_MODULE,
        )
    }

    pub fn specifier(&self) -> &str {
        match self {
            ResolutionFailure::NotFound { specifier, .. }
            | ResolutionFailure::InvalidSpecifier { specifier, .. } => specifier,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ResolutionFailure::NotFound { .. })
    }
}

/// Module resolver with a per-directory cache.
#[derive(Debug)]
pub struct ModuleResolver {
    resolution_kind: ModuleResolutionKind,
    allow_js: bool,
    cache: FxHashMap<(String, String), Result<ResolvedModule, ResolutionFailure>>,
}

impl ModuleResolver {
    pub fn new(resolution_kind: ModuleResolutionKind, allow_js: bool) -> ModuleResolver {
        ModuleResolver {
            resolution_kind,
            allow_js,
            cache: FxHashMap::default(),
        }
    }

    pub fn resolution_kind(&self) -> ModuleResolutionKind {
        self.resolution_kind
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Resolve `specifier` as imported from `containing_file`.
    pub fn resolve(
        &mut self,
        specifier: &str,
        containing_file: &str,
        specifier_span: Span,
        host: &dyn CompilerHost,
    ) -> Result<ResolvedModule, ResolutionFailure> {
        let containing_dir = parent_dir(containing_file).to_string();
        let cache_key = (containing_dir.clone(), specifier.to_string());
        if let Some(cached) = self.cache.get(&cache_key) {
            return cached.clone();
        }
        let result = self
            .resolve_uncached(specifier, &containing_dir, host)
            .ok_or_else(|| {
                if specifier.trim().is_empty() {
                    ResolutionFailure::InvalidSpecifier {
                        specifier: specifier.to_string(),
                        containing_file: containing_file.to_string(),
                        span: specifier_span,
                    }
                } else {
                    ResolutionFailure::NotFound {
                        specifier: specifier.to_string(),
                        containing_file: containing_file.to_string(),
                        span: specifier_span,
                    }
                }
            });
        tracing::trace!(specifier, containing_file, ok = result.is_ok(), "resolved module");
        self.cache.insert(cache_key, result.clone());
        result
    }

    fn resolve_uncached(
        &self,
        specifier: &str,
        containing_dir: &str,
        host: &dyn CompilerHost,
    ) -> Option<ResolvedModule> {
        if specifier.trim().is_empty() {
            return None;
        }
        if is_relative_specifier(specifier) {
            let candidate = join_path(containing_dir, specifier);
            let resolved_path = self.try_file_or_directory(&candidate, host)?;
            return Some(module_at_path(resolved_path));
        }
        match self.resolution_kind {
            ModuleResolutionKind::Classic => self.resolve_classic(specifier, containing_dir, host),
            ModuleResolutionKind::Node10 | ModuleResolutionKind::Bundler => {
                self.resolve_bare_specifier(specifier, containing_dir, host)
            }
        }
    }

    /// Classic: `<dir>/<specifier>.ts|.tsx|.d.ts` in the containing directory
    /// and each ancestor.
    fn resolve_classic(
        &self,
        specifier: &str,
        containing_dir: &str,
        host: &dyn CompilerHost,
    ) -> Option<ResolvedModule> {
        let mut current = containing_dir.to_string();
        for _ in 0..MAX_NODE_MODULES_WALK {
            let candidate = join_path(&current, specifier);
            if let Some(resolved_path) = self.try_file(&candidate, host) {
                return Some(module_at_path(resolved_path));
            }
            let parent = parent_dir(&current).to_string();
            if parent == current {
                break;
            }
            current = parent;
        }
        None
    }

    fn resolve_bare_specifier(
        &self,
        specifier: &str,
        containing_dir: &str,
        host: &dyn CompilerHost,
    ) -> Option<ResolvedModule> {
        let (package_name, subpath) = parse_package_specifier(specifier);
        let types_package = format!("@types/{}", mangle_scoped_package_name(&package_name));

        // Walk up the directory tree looking for node_modules
        let mut current = containing_dir.to_string();
        for _ in 0..MAX_NODE_MODULES_WALK {
            let node_modules = join_path(&current, "node_modules");
            for package_dir_name in [package_name.as_str(), types_package.as_str()] {
                let package_dir = join_path(&node_modules, package_dir_name);
                if let Some(resolved_path) =
                    self.resolve_package(&package_dir, subpath.as_deref(), host)
                {
                    return Some(ResolvedModule {
                        resolved_path,
                        is_external: true,
                        package_name: Some(package_name.clone()),
                        subpath: subpath.clone(),
                    });
                }
            }
            let parent = parent_dir(&current).to_string();
            if parent == current {
                break;
            }
            current = parent;
        }
        None
    }

    fn resolve_package(
        &self,
        package_dir: &str,
        subpath: Option<&str>,
        host: &dyn CompilerHost,
    ) -> Option<String> {
        let package_json = read_package_json(&join_path(package_dir, "package.json"), host);

        if self.resolution_kind == ModuleResolutionKind::Bundler {
            let export_key = match subpath {
                Some(subpath) => format!("./{subpath}"),
                None => ".".to_string(),
            };
            if let Some(target) = package_json
                .as_ref()
                .and_then(|pj| pj.exports.as_ref())
                .and_then(|exports| exports.resolve(&export_key))
            {
                return self.try_file(&join_path(package_dir, target), host);
            }
        }

        match subpath {
            Some(subpath) => self.try_file_or_directory(&join_path(package_dir, subpath), host),
            None => {
                if let Some(resolved) = package_json
                    .as_ref()
                    .and_then(|pj| self.try_package_entry(package_dir, pj, host))
                {
                    return Some(resolved);
                }
                self.try_file(&join_path(package_dir, "index"), host)
            }
        }
    }

    /// `types`, `typings`, then `main` of a package.json.
    fn try_package_entry(
        &self,
        package_dir: &str,
        package_json: &PackageJson,
        host: &dyn CompilerHost,
    ) -> Option<String> {
        [&package_json.types, &package_json.typings, &package_json.main]
            .into_iter()
            .flatten()
            .find_map(|entry| self.try_file_or_directory(&join_path(package_dir, entry), host))
    }

    /// Try `path` as a file, then as a directory with a package.json or index.
    fn try_file_or_directory(&self, path: &str, host: &dyn CompilerHost) -> Option<String> {
        if let Some(resolved) = self.try_file(path, host) {
            return Some(resolved);
        }
        if let Some(package_json) = read_package_json(&join_path(path, "package.json"), host)
            && let Some(resolved) = self.try_package_entry(path, &package_json, host)
        {
            return Some(resolved);
        }
        self.try_file(&join_path(path, "index"), host)
    }

    fn try_file(&self, path: &str, host: &dyn CompilerHost) -> Option<String> {
        if TS_EXTENSIONS.iter().any(|ext| path.ends_with(ext)) {
            return host.file_exists(path).then(|| normalize_path(path));
        }
        if let Some((stem, replacements)) = js_extension_substitution(path) {
            for ext in replacements {
                let candidate = format!("{stem}{ext}");
                if host.file_exists(&candidate) {
                    return Some(normalize_path(&candidate));
                }
            }
            if self.allow_js && host.file_exists(path) {
                return Some(normalize_path(path));
            }
            return None;
        }
        self.extension_candidates()
            .iter()
            .map(|ext| format!("{path}{ext}"))
            .find(|candidate| host.file_exists(candidate))
            .map(|candidate| normalize_path(&candidate))
    }

    fn extension_candidates(&self) -> &'static [&'static str] {
        match (self.resolution_kind, self.allow_js) {
            (ModuleResolutionKind::Classic, _) => &CLASSIC_EXTENSION_CANDIDATES,
            (_, true) => &JS_EXTENSION_CANDIDATES,
            (_, false) => &TS_EXTENSION_CANDIDATES,
        }
    }
}

const TS_EXTENSIONS: [&str; 5] = [".ts", ".tsx", ".mts", ".cts", ".d.ts"];
const TS_EXTENSION_CANDIDATES: [&str; 3] = [".ts", ".tsx", ".d.ts"];
const JS_EXTENSION_CANDIDATES: [&str; 5] = [".ts", ".tsx", ".d.ts", ".js", ".jsx"];
const CLASSIC_EXTENSION_CANDIDATES: [&str; 3] = TS_EXTENSION_CANDIDATES;

/// `./x.js` may name `./x.ts` or `./x.d.ts` on disk.
fn js_extension_substitution(path: &str) -> Option<(&str, &'static [&'static str])> {
    const SUBSTITUTIONS: [(&str, &[&str]); 4] = [
        (".js", &[".ts", ".tsx", ".d.ts"]),
        (".jsx", &[".tsx", ".d.ts"]),
        (".mjs", &[".mts", ".d.mts"]),
        (".cjs", &[".cts", ".d.cts"]),
    ];
    SUBSTITUTIONS
        .iter()
        .find_map(|(ext, replacements)| path.strip_suffix(ext).map(|stem| (stem, *replacements)))
}

fn module_at_path(resolved_path: String) -> ResolvedModule {
    match external_entry_for_path(&resolved_path) {
        Some(entry) => ResolvedModule {
            resolved_path,
            is_external: true,
            package_name: Some(entry.package_name),
            subpath: entry.subpath,
        },
        None => ResolvedModule {
            resolved_path,
            is_external: false,
            package_name: None,
            subpath: None,
        },
    }
}

pub fn is_relative_specifier(specifier: &str) -> bool {
    specifier == "."
        || specifier == ".."
        || specifier.starts_with("./")
        || specifier.starts_with("../")
        || specifier.starts_with('/')
}

/// Parse a package specifier into package name and subpath
pub fn parse_package_specifier(specifier: &str) -> (String, Option<String>) {
    let split_at = if specifier.starts_with('@') {
        // @scope/pkg[/subpath]
        specifier
            .find('/')
            .and_then(|scope_end| specifier[scope_end + 1..].find('/').map(|i| scope_end + 1 + i))
    } else {
        specifier.find('/')
    };
    match split_at {
        Some(index) if index + 1 < specifier.len() => (
            specifier[..index].to_string(),
            Some(specifier[index + 1..].to_string()),
        ),
        Some(index) => (specifier[..index].to_string(), None),
        None => (specifier.to_string(), None),
    }
}

/// `@scope/pkg` -> `scope__pkg`, the `@types` directory name.
pub fn mangle_scoped_package_name(package_name: &str) -> String {
    match package_name.strip_prefix('@') {
        Some(scoped) => scoped.replacen('/', "__", 1),
        None => package_name.to_string(),
    }
}

fn unmangle_types_package_name(name: &str) -> String {
    match name.split_once("__") {
        Some((scope, package)) => format!("@{scope}/{package}"),
        None => name.to_string(),
    }
}

/// Package and subpath of a file under `node_modules`, or `None` for files
/// outside any package.
pub fn external_entry_for_path(path: &str) -> Option<ExternalModuleEntry> {
    let start = path.rfind("/node_modules/")? + "/node_modules/".len();
    let rest = &path[start..];
    let mut segments = rest.split('/');
    let first = segments.next()?;
    let package_name = if first == "@types" {
        unmangle_types_package_name(segments.next()?)
    } else if first.starts_with('@') {
        format!("{first}/{}", segments.next()?)
    } else {
        first.to_string()
    };
    let remainder: Vec<&str> = segments.collect();
    let mut subpath = remainder.join("/");
    for ext in [".d.ts", ".d.mts", ".d.cts", ".ts", ".tsx", ".js", ".jsx", ".mjs", ".cjs"] {
        if let Some(stripped) = subpath.strip_suffix(ext) {
            subpath = stripped.to_string();
            break;
        }
    }
    if subpath == "index" {
        subpath.clear();
    } else if let Some(stripped) = subpath.strip_suffix("/index") {
        subpath = stripped.to_string();
    }
    Some(ExternalModuleEntry {
        package_name,
        subpath: (!subpath.is_empty()).then_some(subpath),
    })
}

fn read_package_json(path: &str, host: &dyn CompilerHost) -> Option<PackageJson> {
    let content = host.read_file(path)?;
    match serde_json::from_str(&content) {
        Ok(package_json) => Some(package_json),
        Err(err) => {
            tracing::warn!(path, %err, "ignoring unreadable package.json");
            None
        }
    }
}

/// Simplified package.json structure for resolution
#[derive(Clone, Debug, Default, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageJson {
    pub name: Option<String>,
    pub version: Option<String>,
    pub main: Option<String>,
    pub types: Option<String>,
    pub typings: Option<String>,
    pub exports: Option<PackageExports>,
}

/// The `exports` field: a string, a subpath map, or a condition map.
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(untagged)]
pub enum PackageExports {
    String(String),
    Map(IndexMap<String, PackageExports>),
}

/// Conditions honored when reading `exports`, matched in map order.
const EXPORT_CONDITIONS: [&str; 3] = ["types", "import", "default"];

impl PackageExports {
    /// Target path for `key` (`"."` or `"./sub"`).
    pub fn resolve(&self, key: &str) -> Option<&str> {
        match self {
            PackageExports::String(target) => (key == ".").then_some(target.as_str()),
            PackageExports::Map(map) => {
                if map.keys().any(|k| k.starts_with('.')) {
                    map.get(key)?.resolve_conditions()
                } else if key == "." {
                    self.resolve_conditions()
                } else {
                    None
                }
            }
        }
    }

    fn resolve_conditions(&self) -> Option<&str> {
        match self {
            PackageExports::String(target) => Some(target),
            PackageExports::Map(map) => map
                .iter()
                .filter(|(condition, _)| EXPORT_CONDITIONS.contains(&condition.as_str()))
                .find_map(|(_, value)| value.resolve_conditions()),
        }
    }
}
