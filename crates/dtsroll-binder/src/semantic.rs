//! Semantic model adapter.
//!
//! The only view of a [`Program`] the bundler consumes: module exports,
//! one-hop alias resolution, declarations and declared types, plus the
//! forwarding helpers the collector needs to classify symbols. The model
//! holds no state and never panics; anything it cannot resolve is `None`.

use crate::module_resolver::{ExternalModuleEntry, external_entry_for_path, parse_package_specifier};
use crate::program::{FileOrigin, ModuleTarget, Program, SourceFile};
use crate::symbols::{AliasTarget, FileId, NodeRef, Symbol, SymbolFlags, SymbolId};
use dtsroll_common::diagnostics::{
    Diagnostic, diagnostic_codes, diagnostic_messages, format_message,
};
use dtsroll_common::limits::MAX_ALIAS_CHAIN_DEPTH;
use dtsroll_common::quote_string_literal;
use dtsroll_parser::{
    BindingKey, KeywordType, ModifierFlags, ModuleDeclarationKind, Node, NodeArena, NodeIndex,
    NodeKind, VariableKind,
};
use rustc_hash::FxHashSet;
use smallvec::SmallVec;

/// One entry of a module's export list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModuleExport {
    pub name: String,
    pub symbol: SymbolId,
}

/// The type a declaration states or implies.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeclaredType {
    /// An explicit annotation (or return type, or alias body).
    Annotation(NodeRef),
    /// Literal type text from a literal initializer (`"a"`, `1`, `true`).
    Literal(String),
    /// Widened keyword type from a literal initializer.
    Keyword(KeywordType),
    /// A destructured slot of an annotated declarator: `T["a"][0]`.
    Member {
        annotation: NodeRef,
        path: Vec<BindingKey>,
    },
    Unknown,
}

#[derive(Clone, Copy)]
pub struct SemanticModel<'p> {
    program: &'p Program,
}

impl<'p> SemanticModel<'p> {
    pub fn new(program: &'p Program) -> SemanticModel<'p> {
        SemanticModel { program }
    }

    pub fn program(&self) -> &'p Program {
        self.program
    }

    pub fn symbol(&self, id: SymbolId) -> Option<&'p Symbol> {
        self.program.symbols.get(id)
    }

    pub fn file(&self, id: FileId) -> Option<&'p SourceFile> {
        self.program.file(id)
    }

    pub fn arena(&self, file: FileId) -> Option<&'p NodeArena> {
        self.file(file).map(|file| &file.arena)
    }

    pub fn node(&self, node: NodeRef) -> Option<&'p Node> {
        self.arena(node.file)?.get(node.node)
    }

    // =========================================================================
    // Modules and exports
    // =========================================================================

    /// Module symbol of an external module file.
    pub fn module_of_file(&self, file: FileId) -> Option<SymbolId> {
        self.file(file)?.symbol
    }

    /// Module symbol a specifier written in `file` refers to.
    pub fn resolve_module_from(&self, file: FileId, specifier: &str) -> Option<SymbolId> {
        match self.file(file)?.resolved_modules.get(specifier)? {
            ModuleTarget::File(target) => self.module_of_file(*target),
            ModuleTarget::Ambient(module) => Some(*module),
        }
    }

    /// Own exports in declaration order, then the exports of each
    /// `export * from` target in order. `default` is never re-exported by
    /// `export *`, and names already present are not overridden.
    pub fn exports_of(&self, module: SymbolId) -> Vec<ModuleExport> {
        let mut exports = Vec::new();
        let mut seen = FxHashSet::default();
        let mut visited = FxHashSet::default();
        self.collect_exports(module, true, &mut exports, &mut seen, &mut visited);
        exports
    }

    fn collect_exports(
        &self,
        module: SymbolId,
        is_root: bool,
        exports: &mut Vec<ModuleExport>,
        seen: &mut FxHashSet<String>,
        visited: &mut FxHashSet<SymbolId>,
    ) {
        if !visited.insert(module) {
            return;
        }
        let Some(symbol) = self.symbol(module) else {
            return;
        };
        for (name, id) in symbol.exports.iter() {
            if !is_root && (name == "default" || name == "export=") {
                continue;
            }
            if seen.insert(name.to_string()) {
                exports.push(ModuleExport {
                    name: name.to_string(),
                    symbol: id,
                });
            }
        }
        for specifier in self.export_stars_of(module) {
            if let Some(target) = self.resolve_module_from(symbol.file, specifier) {
                self.collect_exports(target, false, exports, seen, visited);
            }
        }
    }

    fn export_stars_of(&self, module: SymbolId) -> &'p [String] {
        self.program
            .export_stars
            .get(&module)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// The export `name` of `module`, following `export *`.
    pub fn export_named(&self, module: SymbolId, name: &str) -> Option<SymbolId> {
        let mut visited = FxHashSet::default();
        self.export_named_inner(module, name, &mut visited)
    }

    fn export_named_inner(
        &self,
        module: SymbolId,
        name: &str,
        visited: &mut FxHashSet<SymbolId>,
    ) -> Option<SymbolId> {
        if !visited.insert(module) {
            return None;
        }
        let symbol = self.symbol(module)?;
        if let Some(found) = symbol.exports.get(name) {
            return Some(found);
        }
        if name == "default" || name == "export=" {
            return None;
        }
        self.export_stars_of(module).iter().find_map(|specifier| {
            let target = self.resolve_module_from(symbol.file, specifier)?;
            self.export_named_inner(target, name, visited)
        })
    }

    // =========================================================================
    // Aliases
    // =========================================================================

    /// One hop of alias resolution. `None` for non-aliases and for aliases
    /// whose target cannot be found.
    pub fn alias_target_of(&self, symbol: SymbolId) -> Option<SymbolId> {
        let alias_symbol = self.symbol(symbol)?;
        match alias_symbol.alias.as_ref()? {
            AliasTarget::Local { entity } => self.resolve_entity(*entity),
            AliasTarget::ModuleExport {
                specifier,
                export_name,
            } => {
                let module = self.resolve_module_from(alias_symbol.file, specifier)?;
                self.export_named(module, export_name).or_else(|| {
                    // default import of an `export =` module
                    (export_name == "default")
                        .then(|| self.export_named(module, "export="))
                        .flatten()
                })
            }
            AliasTarget::Module { specifier } => {
                let module = self.resolve_module_from(alias_symbol.file, specifier)?;
                Some(self.export_named(module, "export=").unwrap_or(module))
            }
        }
    }

    /// Follow aliases to a non-alias symbol.
    pub fn resolve_alias(&self, symbol: SymbolId) -> Option<SymbolId> {
        let mut current = symbol;
        let mut visited = FxHashSet::default();
        for _ in 0..MAX_ALIAS_CHAIN_DEPTH {
            let data = self.symbol(current)?;
            if !data.is_alias() {
                return Some(current);
            }
            if !visited.insert(current) {
                return None;
            }
            current = self.alias_target_of(current)?;
        }
        None
    }

    /// The module an import/export specifier alias points into.
    pub fn alias_module_of(&self, symbol: SymbolId) -> Option<SymbolId> {
        let alias_symbol = self.symbol(symbol)?;
        match alias_symbol.alias.as_ref()? {
            AliasTarget::ModuleExport { specifier, .. } | AliasTarget::Module { specifier } => {
                self.resolve_module_from(alias_symbol.file, specifier)
            }
            AliasTarget::Local { .. } => None,
        }
    }

    /// Exported member `name` of a module, namespace or enum (after aliases).
    pub fn member_of(&self, container: SymbolId, name: &str) -> Option<SymbolId> {
        let container = self.resolve_alias(container)?;
        let symbol = self.symbol(container)?;
        if symbol.is_module() {
            self.export_named(container, name)
        } else {
            symbol.exports.get(name)
        }
    }

    /// Symbol named by an entity name (`A`, `A.B.C`, `a.b`) at `entity`.
    pub fn resolve_entity(&self, entity: NodeRef) -> Option<SymbolId> {
        let file = self.file(entity.file)?;
        let parts = entity_name_parts(&file.arena, entity.node);
        let (first, rest) = parts.split_first()?;
        let mut current = file.resolved.get(first).copied()?;
        for &part in rest {
            let name = file.arena.identifier_text(part)?;
            current = self.member_of(current, name)?;
        }
        Some(current)
    }

    /// Symbol an `import("m").A.B` type names; the module itself without a
    /// qualifier.
    pub fn resolve_import_type(&self, node: NodeRef) -> Option<SymbolId> {
        let arena = self.arena(node.file)?;
        let Some(NodeKind::ImportType {
            argument,
            qualifier,
            ..
        }) = arena.kind(node.node)
        else {
            return None;
        };
        let specifier = arena.identifier_text(*argument)?;
        let mut current = self.resolve_module_from(node.file, specifier)?;
        for part in entity_name_parts(arena, *qualifier) {
            current = self.member_of(current, arena.identifier_text(part)?)?;
        }
        Some(current)
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    pub fn declarations_of(&self, symbol: SymbolId) -> &'p [NodeRef] {
        self.symbol(symbol)
            .map(|symbol| symbol.declarations.as_slice())
            .unwrap_or_default()
    }

    /// Symbol declared by `node`, or referenced by it when it is an identifier.
    pub fn symbol_at(&self, node: NodeRef) -> Option<SymbolId> {
        let file = self.file(node.file)?;
        file.resolved
            .get(&node.node)
            .or_else(|| file.node_symbols.get(&node.node))
            .copied()
    }

    pub fn declared_symbol(&self, node: NodeRef) -> Option<SymbolId> {
        self.file(node.file)?.node_symbols.get(&node.node).copied()
    }

    /// The outermost namespace enclosing a namespace member, below the file
    /// or ambient module. `None` when `symbol` is already top-level.
    pub fn top_level_container_of(&self, symbol: SymbolId) -> Option<SymbolId> {
        let mut current = symbol;
        let mut depth = 0;
        while let Some(parent) = self.symbol(current)?.parent {
            let parent_symbol = self.symbol(parent)?;
            if parent_symbol.is_module() || depth > MAX_ALIAS_CHAIN_DEPTH {
                break;
            }
            current = parent;
            depth += 1;
        }
        (current != symbol).then_some(current)
    }

    /// The declared or literal-implied type of a declaration.
    pub fn type_of(&self, declaration: NodeRef) -> DeclaredType {
        let Some(arena) = self.arena(declaration.file) else {
            return DeclaredType::Unknown;
        };
        let Some(kind) = arena.kind(declaration.node) else {
            return DeclaredType::Unknown;
        };
        let (annotation, initializer, keeps_literal) = match kind {
            NodeKind::VariableDeclaration {
                type_annotation,
                initializer,
                ..
            } => {
                let is_const = matches!(
                    arena.kind(arena.parent(declaration.node)),
                    Some(NodeKind::VariableStatement {
                        kind: VariableKind::Const,
                        ..
                    })
                );
                (*type_annotation, *initializer, is_const)
            }
            NodeKind::Parameter {
                type_annotation,
                initializer,
                ..
            } => (*type_annotation, *initializer, false),
            NodeKind::PropertyDeclaration {
                modifiers,
                type_annotation,
                initializer,
                ..
            } => (
                *type_annotation,
                *initializer,
                modifiers.contains(ModifierFlags::READONLY),
            ),
            NodeKind::PropertySignature {
                type_annotation, ..
            } => (*type_annotation, NodeIndex::NONE, false),
            NodeKind::FunctionDeclaration { return_type, .. }
            | NodeKind::MethodDeclaration { return_type, .. }
            | NodeKind::MethodSignature { return_type, .. }
            | NodeKind::GetAccessor { return_type, .. } => (*return_type, NodeIndex::NONE, false),
            NodeKind::TypeAliasDeclaration { type_node, .. } => (*type_node, NodeIndex::NONE, false),
            NodeKind::ExportAssignment { expression, .. } => (NodeIndex::NONE, *expression, true),
            NodeKind::EnumMember { initializer, .. } => (NodeIndex::NONE, *initializer, true),
            NodeKind::BindingElement { initializer, .. } => {
                return binding_element_type(arena, declaration, *initializer);
            }
            _ => return DeclaredType::Unknown,
        };
        if annotation.is_some() {
            return DeclaredType::Annotation(NodeRef::new(declaration.file, annotation));
        }
        literal_type(arena, initializer, keeps_literal)
    }

    // =========================================================================
    // Origins
    // =========================================================================

    /// Local, external or ambient, by the declaring file and any enclosing
    /// `declare module "x"` / `declare global` block.
    pub fn origin_of(&self, symbol: SymbolId) -> FileOrigin {
        let Some(data) = self.symbol(symbol) else {
            return FileOrigin::Ambient;
        };
        if data.has_flags(SymbolFlags::AMBIENT_MODULE) {
            return FileOrigin::External;
        }
        let Some(declaration) = data.first_declaration() else {
            return self
                .file(data.file)
                .map_or(FileOrigin::Ambient, |file| file.origin);
        };
        let Some(file) = self.file(declaration.file) else {
            return FileOrigin::Ambient;
        };
        let arena = &file.arena;
        let mut current = arena.parent(declaration.node);
        while current.is_some() {
            if let Some(NodeKind::ModuleDeclaration { kind, name, .. }) = arena.kind(current) {
                if *kind == ModuleDeclarationKind::Global {
                    return FileOrigin::Ambient;
                }
                if matches!(arena.kind(*name), Some(NodeKind::StringLiteral { .. })) {
                    return FileOrigin::External;
                }
            }
            current = arena.parent(current);
        }
        file.origin
    }

    /// Package an external symbol is imported from.
    pub fn external_entry_of(&self, symbol: SymbolId) -> Option<ExternalModuleEntry> {
        if let Some(module_name) = self.enclosing_ambient_module_name(symbol) {
            return Some(
                self.program
                    .external_modules
                    .get(module_name)
                    .cloned()
                    .unwrap_or_else(|| {
                        let (package_name, subpath) = parse_package_specifier(module_name);
                        ExternalModuleEntry::new(package_name, subpath)
                    }),
            );
        }
        let declaration = self.symbol(symbol)?.first_declaration()?;
        let file = self.file(declaration.file)?;
        self.program
            .external_modules
            .get(&file.path)
            .cloned()
            .or_else(|| external_entry_for_path(&file.path))
    }

    /// Name of the `declare module "x"` block `symbol` is or lives in.
    fn enclosing_ambient_module_name(&self, symbol: SymbolId) -> Option<&'p str> {
        let mut current = Some(symbol);
        let mut depth = 0;
        while let Some(id) = current {
            let data = self.symbol(id)?;
            if data.has_flags(SymbolFlags::AMBIENT_MODULE) {
                return Some(data.name.trim_matches('"'));
            }
            depth += 1;
            if depth > MAX_ALIAS_CHAIN_DEPTH {
                return None;
            }
            current = data.parent;
        }
        None
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// TS2305 for every named import or re-export whose module resolved but
    /// does not export the name.
    pub fn validate_imports(&self) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        for symbol in self.program.symbols.iter() {
            let Some(AliasTarget::ModuleExport {
                specifier,
                export_name,
            }) = &symbol.alias
            else {
                continue;
            };
            let Some(module) = self.resolve_module_from(symbol.file, specifier) else {
                continue;
            };
            if self.alias_target_of(symbol.id).is_some() {
                continue;
            }
            let Some(declaration) = symbol.first_declaration() else {
                continue;
            };
            let Some(file) = self.file(declaration.file) else {
                continue;
            };
            tracing::debug!(module = ?module, specifier, export_name, "missing export");
            diagnostics.push(Diagnostic::error(
                file.path.clone(),
                file.arena.span(declaration.node),
                format_message(
                    diagnostic_messages::MODULE_HAS_NO_EXPORTED_MEMBER,
                    &[specifier, export_name],
                ),
                diagnostic_codes::MODULE_HAS_NO_EXPORTED_MEMBER,
            ));
        }
        diagnostics
    }
}

/// Identifier nodes of an entity name, leftmost first.
pub fn entity_name_parts(arena: &NodeArena, node: NodeIndex) -> SmallVec<[NodeIndex; 4]> {
    let mut parts = SmallVec::new();
    let mut current = node;
    loop {
        match arena.kind(current) {
            Some(NodeKind::Identifier { .. }) => {
                parts.push(current);
                break;
            }
            Some(NodeKind::QualifiedName { left, right })
            | Some(NodeKind::PropertyAccessExpression {
                expression: left,
                name: right,
            }) => {
                parts.push(*right);
                current = *left;
            }
            _ => break,
        }
    }
    parts.reverse();
    parts
}

/// Destructured names take the annotation's member type, else the widened
/// type of the matching literal in the initializer, else of their default.
fn binding_element_type(arena: &NodeArena, element: NodeRef, default: NodeIndex) -> DeclaredType {
    let Some(NodeKind::VariableDeclaration {
        type_annotation,
        initializer,
        ..
    }) = arena.kind(arena.binding_root(element.node))
    else {
        return DeclaredType::Unknown;
    };
    let Some(path) = arena.binding_path(element.node) else {
        return DeclaredType::Unknown;
    };
    if type_annotation.is_some() {
        return DeclaredType::Member {
            annotation: NodeRef::new(element.file, *type_annotation),
            path,
        };
    }
    let mut value = *initializer;
    for key in &path {
        value = match (arena.kind(value), key) {
            (Some(NodeKind::ObjectLiteralExpression { properties }), BindingKey::Property(name)) => {
                properties
                    .iter()
                    .find_map(|&property| match arena.kind(property) {
                        Some(NodeKind::PropertyAssignment {
                            name: key,
                            initializer,
                        }) if arena.identifier_text(*key) == Some(name.as_str()) => Some(*initializer),
                        _ => None,
                    })
                    .unwrap_or(NodeIndex::NONE)
            }
            (Some(NodeKind::ArrayLiteralExpression { elements }), BindingKey::Index(index)) => {
                elements.get(*index).copied().unwrap_or(NodeIndex::NONE)
            }
            _ => NodeIndex::NONE,
        };
    }
    let value = if value.is_some() { value } else { default };
    literal_type(arena, value, false)
}

fn literal_type(arena: &NodeArena, initializer: NodeIndex, keeps_literal: bool) -> DeclaredType {
    let widened = |keyword| {
        if keeps_literal {
            None
        } else {
            Some(DeclaredType::Keyword(keyword))
        }
    };
    match arena.kind(initializer) {
        Some(NodeKind::StringLiteral { text }) => widened(KeywordType::String)
            .unwrap_or_else(|| DeclaredType::Literal(quote_string_literal(text))),
        Some(NodeKind::NumericLiteral { text }) => {
            widened(KeywordType::Number).unwrap_or_else(|| DeclaredType::Literal(text.clone()))
        }
        Some(NodeKind::BigIntLiteral { text }) => {
            widened(KeywordType::BigInt).unwrap_or_else(|| DeclaredType::Literal(text.clone()))
        }
        Some(NodeKind::BooleanLiteral { value }) => widened(KeywordType::Boolean)
            .unwrap_or_else(|| DeclaredType::Literal(value.to_string())),
        Some(NodeKind::TemplateLiteral { text }) => {
            widened(KeywordType::String).unwrap_or_else(|| DeclaredType::Literal(text.clone()))
        }
        Some(NodeKind::NullLiteral) => DeclaredType::Keyword(if keeps_literal {
            KeywordType::Null
        } else {
            KeywordType::Any
        }),
        Some(NodeKind::Identifier { text }) if text == "undefined" => {
            DeclaredType::Keyword(if keeps_literal {
                KeywordType::Undefined
            } else {
                KeywordType::Any
            })
        }
        _ => DeclaredType::Unknown,
    }
}
