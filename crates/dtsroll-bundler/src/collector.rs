//! Reference collector.
//!
//! A depth-first walk seeded by the entry module's exports. Every symbol
//! reached is classified once (the visited set is keyed by symbol identity),
//! local declarations are walked through their type positions, and every
//! name that resolves to a symbol is recorded as a [`Reference`] so the
//! assembler can rewrite it after renaming.
//!
//! Aliases never become bundle entries: [`resolve_target`] follows them hop
//! by hop to the declaration they stand for. The first hop that crosses into
//! an external module decides how that declaration is imported.

use dtsroll_binder::module_resolver::{is_relative_specifier, parse_package_specifier};
use dtsroll_binder::semantic::entity_name_parts;
use dtsroll_binder::{
    AliasTarget, DeclaredType, ExternalModuleEntry, FileId, FileOrigin, ModuleExport, NodeRef,
    SemanticModel, Symbol, SymbolFlags, SymbolId,
};
use dtsroll_common::limits::MAX_ALIAS_CHAIN_DEPTH;
use dtsroll_emitter::is_overload_implementation;
use dtsroll_parser::{ModifierFlags, NodeArena, NodeIndex, NodeKind};
use indexmap::{IndexMap, IndexSet};
use rustc_hash::FxHashSet;
use smallvec::{SmallVec, smallvec};
use tracing::{debug, trace, warn};

// =============================================================================
// Targets
// =============================================================================

/// What a symbol stands for once aliases are followed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Target {
    /// A declaration in a project file.
    Local(SymbolId),
    /// A project module used as a value (`import * as ns`, `export * as ns`).
    Module {
        module: SymbolId,
        local_name: Option<String>,
    },
    External(ExternalImport),
    /// A global or unresolvable declaration; written names are left alone.
    Ambient,
}

/// An external declaration (or external module) the bundle imports.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExternalImport {
    pub symbol: SymbolId,
    pub specifier: String,
    /// `None` imports the whole module as a namespace.
    pub imported_name: Option<String>,
    /// Name of the first alias on the way, used for default and namespace
    /// imports.
    pub local_name: Option<String>,
}

impl ExternalImport {
    pub fn is_namespace(&self) -> bool {
        self.imported_name.is_none()
    }

    pub fn is_default(&self) -> bool {
        self.imported_name.as_deref() == Some("default")
    }

    /// Name the import would like to bind.
    pub fn suggested_name(&self) -> String {
        match self.imported_name.as_deref() {
            Some(name) if name != "default" => name.to_string(),
            _ => self
                .local_name
                .clone()
                .unwrap_or_else(|| identifier_from_path(&self.specifier)),
        }
    }
}

/// Import coordinates already decided before the alias walk starts.
#[derive(Clone, Debug)]
struct ImportHint {
    specifier: String,
    imported_name: Option<String>,
}

/// Follow `symbol` through aliases and classify where it ends up. `None`
/// when an alias cannot be resolved or the chain loops.
pub fn resolve_target(model: SemanticModel<'_>, symbol: SymbolId) -> Option<Target> {
    resolve_target_with(model, symbol, None)
}

fn resolve_target_with(
    model: SemanticModel<'_>,
    symbol: SymbolId,
    hint: Option<ImportHint>,
) -> Option<Target> {
    let mut current = symbol;
    let mut import = hint;
    let mut local_name: Option<String> = None;
    let mut visited = FxHashSet::default();

    for _ in 0..MAX_ALIAS_CHAIN_DEPTH {
        let data = model.symbol(current)?;
        if data.is_module() {
            return Some(module_target(model, current, import, local_name));
        }
        if !data.is_alias() {
            return Some(declaration_target(model, data, import, local_name));
        }
        if !visited.insert(current) {
            debug!(symbol = %data.name, "alias cycle");
            return None;
        }
        if local_name.is_none() {
            local_name = Some(data.name.clone());
        }
        if import.is_none() {
            import = external_hop(model, current);
        }
        current = model.alias_target_of(current)?;
    }

    warn!(symbol = symbol.0, "alias chain too long");
    None
}

/// Import coordinates of an alias whose specifier enters an external module.
fn external_hop(model: SemanticModel<'_>, alias: SymbolId) -> Option<ImportHint> {
    let module = model.alias_module_of(alias)?;
    if model.origin_of(module) != FileOrigin::External {
        return None;
    }
    let (specifier, imported_name) = match model.symbol(alias)?.alias.as_ref()? {
        AliasTarget::ModuleExport {
            specifier,
            export_name,
        } => (specifier, Some(export_name.clone())),
        AliasTarget::Module { specifier } => (specifier, None),
        AliasTarget::Local { .. } => return None,
    };
    let specifier = if is_relative_specifier(specifier) {
        model.external_entry_of(module)?.specifier()
    } else {
        specifier.clone()
    };
    Some(ImportHint {
        specifier,
        imported_name,
    })
}

fn module_target(
    model: SemanticModel<'_>,
    module: SymbolId,
    import: Option<ImportHint>,
    local_name: Option<String>,
) -> Target {
    match model.origin_of(module) {
        FileOrigin::Local => Target::Module { module, local_name },
        FileOrigin::Ambient => Target::Ambient,
        FileOrigin::External => {
            let import = import.or_else(|| {
                Some(ImportHint {
                    specifier: model.external_entry_of(module)?.specifier(),
                    imported_name: None,
                })
            });
            match import {
                Some(import) => Target::External(ExternalImport {
                    symbol: module,
                    specifier: import.specifier,
                    imported_name: import.imported_name,
                    local_name,
                }),
                None => Target::Ambient,
            }
        }
    }
}

fn declaration_target(
    model: SemanticModel<'_>,
    symbol: &Symbol,
    import: Option<ImportHint>,
    local_name: Option<String>,
) -> Target {
    match model.origin_of(symbol.id) {
        FileOrigin::Local => Target::Local(symbol.id),
        FileOrigin::Ambient => Target::Ambient,
        FileOrigin::External => {
            let import = import.or_else(|| {
                Some(ImportHint {
                    specifier: model.external_entry_of(symbol.id)?.specifier(),
                    imported_name: Some(symbol.name.clone()),
                })
            });
            match import {
                Some(import) => Target::External(ExternalImport {
                    symbol: symbol.id,
                    specifier: import.specifier,
                    imported_name: import.imported_name,
                    local_name,
                }),
                None => {
                    debug!(symbol = %symbol.name, "external declaration outside any package");
                    Target::Ambient
                }
            }
        }
    }
}

/// Declarations of `symbol` that produce a statement in the bundle.
/// Function implementations are dropped when overloads exist, and an
/// `export default <expr>` only counts when its type is known.
pub fn emitted_declarations(model: SemanticModel<'_>, symbol: SymbolId) -> Vec<NodeRef> {
    model
        .declarations_of(symbol)
        .iter()
        .copied()
        .filter(|&declaration| is_emitted(model, declaration))
        .collect()
}

fn is_emitted(model: SemanticModel<'_>, declaration: NodeRef) -> bool {
    let Some(arena) = model.arena(declaration.file) else {
        return false;
    };
    match arena.kind(declaration.node) {
        Some(NodeKind::ExportAssignment { .. }) => {
            !matches!(model.type_of(declaration), DeclaredType::Unknown)
        }
        Some(NodeKind::FunctionDeclaration { .. }) => {
            let siblings = match arena.kind(arena.parent(declaration.node)) {
                Some(
                    NodeKind::SourceFile { statements, .. } | NodeKind::ModuleBlock { statements },
                ) => statements.as_slice(),
                _ => &[],
            };
            !is_overload_implementation(arena, siblings, declaration.node)
        }
        Some(kind) => {
            kind.is_declaration_statement()
                || matches!(
                    kind,
                    NodeKind::VariableDeclaration { .. } | NodeKind::BindingElement { .. }
                )
        }
        None => false,
    }
}

// =============================================================================
// References
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReferenceKind {
    /// An identifier, alone or as the left end of a qualified name.
    Identifier,
    /// `ns.X` through a module namespace; the node covers `ns.X`.
    QualifiedName,
    /// `import("m").A.B`; the first `depth` qualifier parts name the target.
    ImportType { depth: usize },
}

/// A use site of a symbol in a kept declaration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Reference {
    pub node: NodeRef,
    pub kind: ReferenceKind,
}

/// Everything the walk discovered.
#[derive(Debug, Default)]
pub struct Collection {
    /// Symbols that get their own declaration statements, in discovery order.
    pub kept: Vec<SymbolId>,
    kept_set: FxHashSet<SymbolId>,
    /// Canonical target -> use sites.
    pub references: IndexMap<SymbolId, Vec<Reference>>,
    /// External imports, one per imported symbol.
    pub externals: IndexMap<SymbolId, ExternalImport>,
    /// Packages imported from, keyed by specifier.
    pub external_modules: IndexMap<String, ExternalModuleEntry>,
    /// Project modules used as a whole, with a suggested namespace name.
    pub namespaces: IndexMap<SymbolId, String>,
    /// Names of ambient and unresolved references; the bundle must not
    /// shadow them.
    pub reserved: IndexSet<String>,
    /// Symbols reached that have nothing to emit.
    pub skipped: FxHashSet<SymbolId>,
    /// Node shapes the walk did not know how to traverse.
    pub unhandled: usize,
}

impl Collection {
    pub fn is_kept(&self, symbol: SymbolId) -> bool {
        self.kept_set.contains(&symbol)
    }

    pub fn references_to(&self, symbol: SymbolId) -> &[Reference] {
        self.references
            .get(&symbol)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// How the walk proceeds below one node.
#[derive(Debug)]
pub(crate) enum Walk<'a> {
    Leaf,
    Children(SmallVec<[NodeIndex; 8]>),
    /// A class or namespace body; overload implementations are skipped.
    Members {
        head: SmallVec<[NodeIndex; 8]>,
        members: &'a [NodeIndex],
    },
    /// A name in reference position, followed by its type arguments.
    Entity {
        name: NodeIndex,
        then: &'a [NodeIndex],
    },
    ImportType {
        type_arguments: &'a [NodeIndex],
    },
    Unhandled(&'static str),
}

/// Dispatch table for the walk.
pub(crate) fn classify(arena: &NodeArena, node: NodeIndex) -> Walk<'_> {
    let Some(kind) = arena.kind(node) else {
        return Walk::Leaf;
    };
    // Private members print without types.
    let private_modifier = kind.modifiers().contains(ModifierFlags::PRIVATE)
        && !matches!(kind, NodeKind::Parameter { .. });
    if private_modifier
        || matches!(arena.kind(kind.name()), Some(NodeKind::PrivateIdentifier { .. }))
    {
        return Walk::Leaf;
    }

    match kind {
        NodeKind::Identifier { .. }
        | NodeKind::PrivateIdentifier { .. }
        | NodeKind::StringLiteral { .. }
        | NodeKind::NumericLiteral { .. }
        | NodeKind::BigIntLiteral { .. }
        | NodeKind::BooleanLiteral { .. }
        | NodeKind::NullLiteral
        | NodeKind::TemplateLiteral { .. }
        | NodeKind::OpaqueExpression { .. }
        | NodeKind::ObjectLiteralExpression { .. }
        | NodeKind::PropertyAssignment { .. }
        | NodeKind::ArrayLiteralExpression { .. }
        | NodeKind::ObjectBindingPattern { .. }
        | NodeKind::ArrayBindingPattern { .. }
        | NodeKind::OpaqueStatement
        | NodeKind::KeywordType { .. }
        | NodeKind::ThisType
        | NodeKind::LiteralType { .. }
        | NodeKind::EnumDeclaration { .. }
        | NodeKind::ExportDeclaration { .. }
        | NodeKind::ExportAssignment { .. }
        | NodeKind::NamespaceExportDeclaration { .. } => Walk::Leaf,

        NodeKind::TypeReference {
            type_name,
            type_arguments,
        } => Walk::Entity {
            name: *type_name,
            then: type_arguments,
        },
        NodeKind::ExpressionWithTypeArguments {
            expression,
            type_arguments,
        } => Walk::Entity {
            name: *expression,
            then: type_arguments,
        },
        NodeKind::TypeQuery {
            expr_name,
            type_arguments,
        } => Walk::Entity {
            name: *expr_name,
            then: type_arguments,
        },
        NodeKind::ComputedPropertyName { expression } => match arena.kind(*expression) {
            Some(NodeKind::Identifier { .. } | NodeKind::PropertyAccessExpression { .. }) => {
                Walk::Entity {
                    name: *expression,
                    then: &[],
                }
            }
            _ => Walk::Leaf,
        },
        NodeKind::ImportEqualsDeclaration {
            module_reference, ..
        } => match arena.kind(*module_reference) {
            Some(NodeKind::ExternalModuleReference { .. }) => {
                Walk::Unhandled("ExternalModuleReference")
            }
            _ => Walk::Entity {
                name: *module_reference,
                then: &[],
            },
        },
        NodeKind::ImportType { type_arguments, .. } => Walk::ImportType { type_arguments },

        NodeKind::ClassDeclaration {
            type_parameters,
            heritage_clauses,
            members,
            ..
        } => Walk::Members {
            head: type_parameters
                .iter()
                .chain(heritage_clauses)
                .copied()
                .collect(),
            members,
        },
        NodeKind::ModuleBlock { statements } => Walk::Members {
            head: SmallVec::new(),
            members: statements,
        },
        NodeKind::ModuleDeclaration { body, .. } => Walk::Children(smallvec![*body]),

        // Initializers never reach the output.
        NodeKind::VariableDeclaration {
            type_annotation, ..
        }
        | NodeKind::Parameter {
            type_annotation, ..
        } => Walk::Children(smallvec![*type_annotation]),
        // Destructured names are typed through the declarator's annotation.
        NodeKind::BindingElement { .. } => match arena.kind(arena.binding_root(node)) {
            Some(NodeKind::VariableDeclaration {
                type_annotation, ..
            }) => Walk::Children(smallvec![*type_annotation]),
            _ => Walk::Leaf,
        },
        NodeKind::PropertyDeclaration {
            name,
            type_annotation,
            ..
        } => Walk::Children(smallvec![*name, *type_annotation]),

        NodeKind::VariableStatement { .. }
        | NodeKind::FunctionDeclaration { .. }
        | NodeKind::InterfaceDeclaration { .. }
        | NodeKind::TypeAliasDeclaration { .. }
        | NodeKind::MethodDeclaration { .. }
        | NodeKind::Constructor { .. }
        | NodeKind::GetAccessor { .. }
        | NodeKind::SetAccessor { .. }
        | NodeKind::IndexSignature { .. }
        | NodeKind::PropertySignature { .. }
        | NodeKind::MethodSignature { .. }
        | NodeKind::CallSignature { .. }
        | NodeKind::ConstructSignature { .. }
        | NodeKind::TypeParameter { .. }
        | NodeKind::HeritageClause { .. }
        | NodeKind::ArrayType { .. }
        | NodeKind::TupleType { .. }
        | NodeKind::NamedTupleMember { .. }
        | NodeKind::OptionalType { .. }
        | NodeKind::RestType { .. }
        | NodeKind::UnionType { .. }
        | NodeKind::IntersectionType { .. }
        | NodeKind::FunctionType { .. }
        | NodeKind::ConstructorType { .. }
        | NodeKind::TypeLiteral { .. }
        | NodeKind::ParenthesizedType { .. }
        | NodeKind::TypeOperator { .. }
        | NodeKind::IndexedAccessType { .. }
        | NodeKind::MappedType { .. }
        | NodeKind::ConditionalType { .. }
        | NodeKind::InferType { .. }
        | NodeKind::TypePredicate { .. }
        | NodeKind::TemplateLiteralType { .. }
        | NodeKind::TemplateLiteralTypeSpan { .. } => Walk::Children(kind.children()),

        NodeKind::SourceFile { .. }
        | NodeKind::QualifiedName { .. }
        | NodeKind::PropertyAccessExpression { .. }
        | NodeKind::EnumMember { .. }
        | NodeKind::ImportDeclaration { .. }
        | NodeKind::ImportClause { .. }
        | NodeKind::NamespaceImport { .. }
        | NodeKind::NamedImports { .. }
        | NodeKind::ImportSpecifier { .. }
        | NodeKind::ExternalModuleReference { .. }
        | NodeKind::NamedExports { .. }
        | NodeKind::NamespaceExport { .. }
        | NodeKind::ExportSpecifier { .. } => Walk::Unhandled(kind.kind_name()),
    }
}

/// Nodes covering growing prefixes of an entity name: `A`, `A.B`, `A.B.C`.
pub(crate) fn entity_prefixes(arena: &NodeArena, node: NodeIndex) -> SmallVec<[NodeIndex; 4]> {
    let mut prefixes = SmallVec::new();
    let mut current = node;
    loop {
        match arena.kind(current) {
            Some(NodeKind::Identifier { .. }) => {
                prefixes.push(current);
                break;
            }
            Some(
                NodeKind::QualifiedName { left, .. }
                | NodeKind::PropertyAccessExpression {
                    expression: left, ..
                },
            ) => {
                prefixes.push(current);
                current = *left;
            }
            _ => {
                prefixes.clear();
                break;
            }
        }
    }
    prefixes.reverse();
    prefixes
}

/// An identifier-safe name for a module path or specifier:
/// `/src/utils/index.ts` -> `utils`, `@scope/pkg-name` -> `pkg_name`.
pub(crate) fn identifier_from_path(path: &str) -> String {
    let trimmed = path.trim_matches('"');
    let mut segments = trimmed.rsplit('/').filter(|segment| !segment.is_empty());
    let mut stem = segments.next().unwrap_or("ns");
    stem = stem.split('.').next().unwrap_or(stem);
    if stem == "index" {
        stem = segments.next().unwrap_or(stem);
    }
    let mut name: String = stem
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '$' { c } else { '_' })
        .collect();
    if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, '_');
    }
    name
}

fn is_namespace_member_name(name: &str) -> bool {
    name != "default" && name != "export="
}

// =============================================================================
// Collector
// =============================================================================

pub struct Collector<'p> {
    model: SemanticModel<'p>,
    visited: FxHashSet<SymbolId>,
    collection: Collection,
}

/// Collect everything reachable from `exports`.
pub fn collect(model: SemanticModel<'_>, exports: &[ModuleExport]) -> Collection {
    let mut collector = Collector::new(model);
    for export in exports {
        trace!(name = %export.name, "seeding export");
        collector.visit_symbol(export.symbol);
    }
    collector.finish()
}

impl<'p> Collector<'p> {
    pub fn new(model: SemanticModel<'p>) -> Collector<'p> {
        Collector {
            model,
            visited: FxHashSet::default(),
            collection: Collection::default(),
        }
    }

    pub fn finish(self) -> Collection {
        debug!(
            kept = self.collection.kept.len(),
            externals = self.collection.externals.len(),
            namespaces = self.collection.namespaces.len(),
            unhandled = self.collection.unhandled,
            "collection finished"
        );
        self.collection
    }

    pub fn visit_symbol(&mut self, symbol: SymbolId) {
        match resolve_target(self.model, symbol) {
            Some(target) => self.visit_target(target),
            None => debug!(symbol = symbol.0, "unresolvable alias; nothing to collect"),
        }
    }

    fn visit_target(&mut self, target: Target) {
        match target {
            Target::Local(symbol) => self.visit_local(symbol),
            Target::Module { module, local_name } => self.visit_module(module, local_name),
            Target::External(import) => self.add_external(import),
            Target::Ambient => {}
        }
    }

    fn visit_local(&mut self, symbol: SymbolId) {
        let model = self.model;
        // Namespace members travel with their namespace.
        let owner = model.top_level_container_of(symbol).unwrap_or(symbol);
        if !self.visited.insert(owner) {
            return;
        }
        let name = model.symbol(owner).map_or("", |data| data.name.as_str());
        let declarations = emitted_declarations(model, owner);
        if declarations.is_empty() {
            warn!(symbol = name, "no emittable declaration; skipped");
            self.collection.skipped.insert(owner);
            return;
        }
        debug!(symbol = name, declarations = declarations.len(), "keeping");
        self.collection.kept.push(owner);
        self.collection.kept_set.insert(owner);
        for declaration in declarations {
            self.walk(declaration.file, declaration.node, owner);
        }
    }

    fn visit_module(&mut self, module: SymbolId, local_name: Option<String>) {
        let model = self.model;
        if !self.visited.insert(module) {
            return;
        }
        let name = local_name.unwrap_or_else(|| {
            model
                .symbol(module)
                .map_or_else(|| "ns".to_string(), |data| identifier_from_path(&data.name))
        });
        debug!(namespace = %name, "flattening module");
        self.collection.namespaces.insert(module, name);
        for export in model.exports_of(module) {
            if is_namespace_member_name(&export.name) {
                self.visit_symbol(export.symbol);
            }
        }
    }

    fn add_external(&mut self, import: ExternalImport) {
        if self.collection.externals.contains_key(&import.symbol) {
            return;
        }
        debug!(specifier = %import.specifier, name = ?import.imported_name, "external import");
        self.collection
            .external_modules
            .entry(import.specifier.clone())
            .or_insert_with(|| {
                let (package_name, subpath) = parse_package_specifier(&import.specifier);
                ExternalModuleEntry::new(package_name, subpath)
            });
        self.collection.externals.insert(import.symbol, import);
    }

    // =========================================================================
    // Syntax walk
    // =========================================================================

    fn walk(&mut self, file: FileId, node: NodeIndex, owner: SymbolId) {
        let Some(arena) = self.model.arena(file) else {
            return;
        };
        match classify(arena, node) {
            Walk::Leaf => {}
            Walk::Children(children) => {
                for child in children {
                    self.walk(file, child, owner);
                }
            }
            Walk::Members { head, members } => {
                for child in head {
                    self.walk(file, child, owner);
                }
                for &member in members {
                    if !is_overload_implementation(arena, members, member) {
                        self.walk(file, member, owner);
                    }
                }
            }
            Walk::Entity { name, then } => {
                self.walk_entity(NodeRef::new(file, name), owner);
                for &child in then {
                    self.walk(file, child, owner);
                }
            }
            Walk::ImportType { type_arguments } => {
                self.walk_import_type(NodeRef::new(file, node), owner);
                for &child in type_arguments {
                    self.walk(file, child, owner);
                }
            }
            Walk::Unhandled(kind) => {
                warn!(kind, node = node.0, "unhandled node shape; references below are skipped");
                self.collection.unhandled += 1;
            }
        }
    }

    fn walk_entity(&mut self, entity: NodeRef, owner: SymbolId) {
        let model = self.model;
        let (Some(file), Some(arena)) = (model.file(entity.file), model.arena(entity.file)) else {
            return;
        };
        let parts = entity_name_parts(arena, entity.node);
        let prefixes = entity_prefixes(arena, entity.node);
        let Some(&first_part) = parts.first() else {
            return;
        };
        if prefixes.len() != parts.len() {
            return;
        }
        let Some(&first) = file.resolved.get(&first_part) else {
            self.reserve_written_name(entity.file, first_part);
            return;
        };
        if model
            .symbol(first)
            .is_some_and(|data| data.has_flags(SymbolFlags::TYPE_PARAMETER | SymbolFlags::PARAMETER))
        {
            return;
        }

        let mut chain: SmallVec<[SymbolId; 4]> = smallvec![first];
        let mut names: SmallVec<[&str; 4]> = SmallVec::new();
        for &part in &parts {
            names.push(arena.identifier_text(part).unwrap_or_default());
        }
        for name in &names[1..] {
            let Some(&container) = chain.last() else {
                break;
            };
            match model.member_of(container, name) {
                Some(member) => chain.push(member),
                None => break,
            }
        }

        let (index, hint) = self.split_chain(&chain, &names);
        let kind = if index == 0 {
            ReferenceKind::Identifier
        } else {
            ReferenceKind::QualifiedName
        };
        let node = NodeRef::new(entity.file, prefixes[index]);
        self.record(node, kind, chain[index], hint, owner);
    }

    fn walk_import_type(&mut self, node: NodeRef, owner: SymbolId) {
        let model = self.model;
        let Some(arena) = model.arena(node.file) else {
            return;
        };
        let Some(NodeKind::ImportType {
            argument,
            qualifier,
            ..
        }) = arena.kind(node.node)
        else {
            return;
        };
        let Some(specifier) = arena.identifier_text(*argument) else {
            return;
        };
        let Some(module) = model.resolve_module_from(node.file, specifier) else {
            debug!(specifier, "import type of an unresolved module");
            return;
        };

        let mut names: SmallVec<[&str; 4]> = smallvec![specifier];
        if qualifier.is_some() {
            for part in entity_name_parts(arena, *qualifier) {
                names.push(arena.identifier_text(part).unwrap_or_default());
            }
        }
        let mut chain: SmallVec<[SymbolId; 4]> = smallvec![module];
        for name in &names[1..] {
            let Some(&container) = chain.last() else {
                break;
            };
            match model.member_of(container, name) {
                Some(member) => chain.push(member),
                None => break,
            }
        }

        let (index, hint) = self.split_chain(&chain, &names);
        self.record(node, ReferenceKind::ImportType { depth: index }, chain[index], hint, owner);
    }

    /// Pick the symbol a name chain refers to. Module namespaces are looked
    /// through: in `ns.A.B` with `ns` a module, the reference is to `A`.
    fn split_chain(&self, chain: &[SymbolId], names: &[&str]) -> (usize, Option<ImportHint>) {
        let model = self.model;
        let is_module = |symbol: SymbolId| {
            model
                .resolve_alias(symbol)
                .and_then(|target| model.symbol(target))
                .is_some_and(Symbol::is_module)
        };
        let Some(module_index) = chain.iter().rposition(|&symbol| is_module(symbol)) else {
            return (0, None);
        };
        if module_index + 1 == chain.len() {
            return (module_index, None);
        }
        match resolve_target(model, chain[module_index]) {
            Some(Target::Module { .. }) => (module_index + 1, None),
            Some(Target::External(import)) if import.is_namespace() => {
                let hint = ImportHint {
                    specifier: import.specifier,
                    imported_name: names.get(module_index + 1).map(|name| name.to_string()),
                };
                (module_index + 1, Some(hint))
            }
            // A named import of a namespace stays a reference to that name.
            _ => (module_index, None),
        }
    }

    fn record(
        &mut self,
        node: NodeRef,
        kind: ReferenceKind,
        symbol: SymbolId,
        hint: Option<ImportHint>,
        owner: SymbolId,
    ) {
        let Some(target) = resolve_target_with(self.model, symbol, hint) else {
            debug!(symbol = symbol.0, "unresolvable alias; reference left as written");
            return;
        };
        let key = match &target {
            Target::Local(local) => *local,
            Target::Module { module, .. } => *module,
            Target::External(import) => import.symbol,
            Target::Ambient => {
                let leftmost = self
                    .model
                    .arena(node.file)
                    .map_or(NodeIndex::NONE, |arena| arena.leftmost_identifier(node.node));
                self.reserve_written_name(node.file, leftmost);
                return;
            }
        };
        self.visit_target(target);

        // Members named from inside their own namespace keep their short name.
        if self.model.top_level_container_of(key) == Some(owner) {
            return;
        }
        // Destructured names walk their shared annotation once each.
        let references = self.collection.references.entry(key).or_default();
        if !references.iter().any(|reference| reference.node == node) {
            references.push(Reference { node, kind });
        }
    }

    fn reserve_written_name(&mut self, file: FileId, identifier: NodeIndex) {
        if let Some(text) = self
            .model
            .arena(file)
            .and_then(|arena| arena.identifier_text(identifier))
        {
            self.collection.reserved.insert(text.to_string());
        }
    }
}
