//! Program loading.
//!
//! A [`Program`] is every file reachable from one entry point: parsed into
//! per-file arenas, bound into one symbol arena, with module specifiers
//! resolved to files or ambient modules and identifiers resolved to symbols.

use crate::host::{CompilerHost, normalize_path};
use crate::module_resolver::{
    ExternalModuleEntry, ModuleResolver, ResolutionFailure, parse_package_specifier,
};
use crate::name_resolver::NameResolver;
use crate::options::CompilerOptions;
use crate::semantic::SemanticModel;
use crate::state::BinderState;
use crate::symbols::{FileId, Symbol, SymbolArena, SymbolId, SymbolTable};
use dtsroll_common::diagnostics::{
    Diagnostic, diagnostic_codes, diagnostic_messages, format_message,
};
use dtsroll_common::limits::MAX_PROGRAM_FILES;
use dtsroll_common::{LineMap, Position, Span};
use dtsroll_parser::{NodeArena, NodeIndex, NodeKind, ParserState};
use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;

/// How a file entered the program.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FileOrigin {
    /// Reached from the entry point, outside `node_modules`.
    Local,
    /// Under `node_modules` (or declared as an ambient module).
    External,
    /// An extra root not reached from the entry (global scripts, typings).
    Ambient,
}

/// What a module specifier in a file resolved to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModuleTarget {
    File(FileId),
    Ambient(SymbolId),
}

#[derive(Debug)]
pub struct SourceFile {
    pub id: FileId,
    pub path: String,
    pub text: String,
    pub arena: NodeArena,
    pub root: NodeIndex,
    pub origin: FileOrigin,
    pub is_external_module: bool,
    /// Module symbol of an external module file.
    pub symbol: Option<SymbolId>,
    /// Declaration node -> symbol
    pub node_symbols: FxHashMap<NodeIndex, SymbolId>,
    /// Identifier node -> referenced symbol
    pub resolved: FxHashMap<NodeIndex, SymbolId>,
    pub resolved_modules: FxHashMap<String, ModuleTarget>,
    pub line_map: LineMap,
}

impl SourceFile {
    pub fn position_of(&self, offset: u32) -> Position {
        self.line_map.offset_to_position(offset, &self.text)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProgramError {
    #[error("entry file '{path}' not found")]
    EntryNotFound { path: String },
}

#[derive(Debug)]
pub struct Program {
    pub options: CompilerOptions,
    pub files: Vec<SourceFile>,
    pub file_ids: FxHashMap<String, FileId>,
    pub symbols: SymbolArena,
    pub globals: SymbolTable,
    /// `declare module "x"` blocks by module name
    pub ambient_modules: SymbolTable,
    /// `export * from` specifiers per module symbol, in source order
    pub export_stars: FxHashMap<SymbolId, Vec<String>>,
    /// Packages of external files, keyed by resolved path or ambient module name
    pub external_modules: IndexMap<String, ExternalModuleEntry>,
    pub diagnostics: Vec<Diagnostic>,
    pub entry: FileId,
}

impl Program {
    /// Load, bind and resolve every file reachable from `entry`, then the
    /// extra roots in `options.files`.
    pub fn create(
        entry: &str,
        options: &CompilerOptions,
        host: &dyn CompilerHost,
    ) -> Result<Program, ProgramError> {
        let _span = tracing::info_span!("load_program", entry).entered();
        let entry_path = normalize_path(entry);
        if !host.file_exists(&entry_path) {
            return Err(ProgramError::EntryNotFound { path: entry_path });
        }

        let mut loader = Loader::new(options, host);
        loader.enqueue(entry_path.clone(), FileOrigin::Local);
        loader.drain();
        for root in &options.files {
            let root = normalize_path(root);
            if !host.file_exists(&root) {
                loader.diagnostics.push(Diagnostic::global(
                    format_message(diagnostic_messages::FILE_NOT_FOUND, &[&root]),
                    diagnostic_codes::FILE_NOT_FOUND,
                ));
                continue;
            }
            loader.enqueue(root, FileOrigin::Ambient);
        }
        loader.drain();

        let Some(&entry_id) = loader.file_ids.get(&entry_path) else {
            return Err(ProgramError::EntryNotFound { path: entry_path });
        };
        let mut program = loader.finish(options, entry_id);
        let export_diagnostics = SemanticModel::new(&program).validate_imports();
        program.diagnostics.extend(export_diagnostics);

        tracing::info!(
            files = program.files.len(),
            symbols = program.symbols.len(),
            diagnostics = program.diagnostics.len(),
            "program loaded"
        );
        Ok(program)
    }

    pub fn file(&self, id: FileId) -> Option<&SourceFile> {
        self.files.get(id.0 as usize)
    }

    pub fn file_by_path(&self, path: &str) -> Option<&SourceFile> {
        let id = self.file_ids.get(&normalize_path(path))?;
        self.file(*id)
    }

    pub fn entry_file(&self) -> Option<&SourceFile> {
        self.file(self.entry)
    }

    pub fn symbol(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id)
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn error_diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }

    pub fn files_with_origin(&self, origin: FileOrigin) -> impl Iterator<Item = &SourceFile> {
        self.files.iter().filter(move |file| file.origin == origin)
    }
}

/// Breadth-first file loader.
struct Loader<'h> {
    host: &'h dyn CompilerHost,
    resolver: ModuleResolver,
    files: Vec<SourceFile>,
    file_ids: FxHashMap<String, FileId>,
    queued: FxHashSet<String>,
    queue: VecDeque<(String, FileOrigin)>,
    /// (importing file, specifier, resolved path)
    resolved_paths: Vec<(FileId, String, String)>,
    /// Specifiers with no file on disk; may still name an ambient module
    /// (`"virtual"`, `"*.css"`).
    unresolved: Vec<(FileId, ResolutionFailure)>,
    external_modules: IndexMap<String, ExternalModuleEntry>,
    diagnostics: Vec<Diagnostic>,
}

impl<'h> Loader<'h> {
    fn new(options: &CompilerOptions, host: &'h dyn CompilerHost) -> Loader<'h> {
        Loader {
            host,
            resolver: ModuleResolver::new(options.module_resolution, options.allow_js),
            files: Vec::new(),
            file_ids: FxHashMap::default(),
            queued: FxHashSet::default(),
            queue: VecDeque::new(),
            resolved_paths: Vec::new(),
            unresolved: Vec::new(),
            external_modules: IndexMap::new(),
            diagnostics: Vec::new(),
        }
    }

    fn enqueue(&mut self, path: String, origin: FileOrigin) {
        if self.queued.insert(path.clone()) {
            self.queue.push_back((path, origin));
        }
    }

    fn drain(&mut self) {
        while let Some((path, origin)) = self.queue.pop_front() {
            if self.files.len() >= MAX_PROGRAM_FILES {
                tracing::warn!(limit = MAX_PROGRAM_FILES, "file limit reached, not loading more files");
                self.queue.clear();
                return;
            }
            self.load(path, origin);
        }
    }

    fn load(&mut self, path: String, origin: FileOrigin) {
        let Some(text) = self.host.read_file(&path) else {
            self.diagnostics.push(Diagnostic::global(
                format_message(diagnostic_messages::CANNOT_READ_FILE, &[&path]),
                diagnostic_codes::CANNOT_READ_FILE,
            ));
            return;
        };
        let origin = if path.contains("/node_modules/") {
            FileOrigin::External
        } else {
            origin
        };

        let mut parser = ParserState::new(path.clone(), text.clone());
        let root = parser.parse_source_file();
        let (arena, parse_diagnostics) = parser.into_parts();
        self.diagnostics.extend(parse_diagnostics);

        let id = FileId(self.files.len() as u32);
        let is_external_module = matches!(
            arena.kind(root),
            Some(NodeKind::SourceFile {
                is_external_module: true,
                ..
            })
        );
        let specifiers = collect_module_specifiers(&arena);
        tracing::debug!(file = %path, ?origin, imports = specifiers.len(), "loaded file");

        self.file_ids.insert(path.clone(), id);
        self.files.push(SourceFile {
            id,
            line_map: LineMap::build(&text),
            path: path.clone(),
            text,
            arena,
            root,
            origin,
            is_external_module,
            symbol: None,
            node_symbols: FxHashMap::default(),
            resolved: FxHashMap::default(),
            resolved_modules: FxHashMap::default(),
        });

        let child_origin = match origin {
            FileOrigin::Ambient => FileOrigin::Ambient,
            FileOrigin::Local | FileOrigin::External => FileOrigin::Local,
        };
        for (specifier, span) in specifiers {
            match self.resolver.resolve(&specifier, &path, span, self.host) {
                Ok(module) => {
                    if module.is_external
                        && let Some(package_name) = module.package_name.clone()
                    {
                        self.external_modules
                            .entry(module.resolved_path.clone())
                            .or_insert_with(|| {
                                ExternalModuleEntry::new(package_name, module.subpath.clone())
                            });
                    }
                    self.enqueue(module.resolved_path.clone(), child_origin);
                    self.resolved_paths.push((id, specifier, module.resolved_path));
                }
                Err(failure) => self.unresolved.push((id, failure)),
            }
        }
    }

    /// Bind every file, link module specifiers and resolve names.
    fn finish(self, options: &CompilerOptions, entry: FileId) -> Program {
        let Loader {
            mut files,
            file_ids,
            resolved_paths,
            unresolved,
            mut external_modules,
            mut diagnostics,
            ..
        } = self;
        let mut symbols = SymbolArena::new();
        let mut globals = SymbolTable::new();
        let mut ambient_modules = SymbolTable::new();
        let mut export_stars = FxHashMap::default();

        {
            let _span = tracing::debug_span!("bind").entered();
            for file in files.iter_mut() {
                let mut binder = BinderState::new(
                    file.id,
                    &file.path,
                    &file.arena,
                    &mut symbols,
                    &mut globals,
                    &mut ambient_modules,
                    &mut export_stars,
                );
                let file_symbol = binder.bind_source_file(file.root);
                let (node_symbols, bind_diagnostics) = binder.finish();
                file.symbol = file_symbol;
                file.node_symbols = node_symbols;
                diagnostics.extend(bind_diagnostics);
            }
        }

        for (file, specifier, path) in resolved_paths {
            if let (Some(&target), Some(source)) = (file_ids.get(&path), files.get_mut(file.0 as usize)) {
                source
                    .resolved_modules
                    .insert(specifier, ModuleTarget::File(target));
            }
        }
        for (file, failure) in unresolved {
            let specifier = failure.specifier();
            match find_ambient_module(&ambient_modules, specifier) {
                Some(module) => {
                    if let Some(source) = files.get_mut(file.0 as usize) {
                        source
                            .resolved_modules
                            .insert(specifier.to_string(), ModuleTarget::Ambient(module));
                    }
                    // Keyed by the declared name so `"*.css"` maps to the first
                    // specifier it matched.
                    let module_name = symbols
                        .get(module)
                        .map_or(specifier, |symbol| symbol.name.trim_matches('"'))
                        .to_string();
                    external_modules
                        .entry(module_name)
                        .or_insert_with(|| {
                            let (package_name, subpath) = parse_package_specifier(specifier);
                            ExternalModuleEntry::new(package_name, subpath)
                        });
                }
                None => diagnostics.push(failure.to_diagnostic()),
            }
        }

        {
            let _span = tracing::debug_span!("resolve_names").entered();
            for file in files.iter_mut() {
                let resolver = NameResolver::new(
                    file.id,
                    &file.arena,
                    &mut symbols,
                    &globals,
                    &mut file.node_symbols,
                );
                file.resolved = resolver.resolve_file(file.root, file.symbol);
            }
        }

        Program {
            options: options.clone(),
            files,
            file_ids,
            symbols,
            globals,
            ambient_modules,
            export_stars,
            external_modules,
            diagnostics,
            entry,
        }
    }
}

/// Exact ambient module name, else the `*` pattern with the longest prefix.
pub fn find_ambient_module(ambient_modules: &SymbolTable, specifier: &str) -> Option<SymbolId> {
    if let Some(module) = ambient_modules.get(specifier) {
        return Some(module);
    }
    ambient_modules
        .iter()
        .filter_map(|(pattern, module)| {
            let (prefix, suffix) = pattern.split_once('*')?;
            let matches = specifier.len() >= prefix.len() + suffix.len()
                && specifier.starts_with(prefix)
                && specifier.ends_with(suffix);
            matches.then_some((prefix.len(), module))
        })
        .max_by_key(|(prefix_len, _)| *prefix_len)
        .map(|(_, module)| module)
}

/// Module specifiers of imports, exports, `require()` references and
/// import types, in node order.
fn collect_module_specifiers(arena: &NodeArena) -> Vec<(String, Span)> {
    let mut specifiers = Vec::new();
    for node in &arena.nodes {
        let specifier = match &node.kind {
            NodeKind::ImportDeclaration {
                module_specifier, ..
            }
            | NodeKind::ExportDeclaration {
                module_specifier, ..
            } => *module_specifier,
            NodeKind::ExternalModuleReference { expression } => *expression,
            NodeKind::ImportType { argument, .. } => *argument,
            _ => continue,
        };
        if let Some(NodeKind::StringLiteral { text }) = arena.kind(specifier) {
            specifiers.push((text.clone(), arena.span(specifier)));
        }
    }
    specifiers
}
