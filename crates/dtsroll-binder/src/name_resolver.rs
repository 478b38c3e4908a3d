//! Name resolution - links identifiers in entity-name positions to symbols.
//!
//! Runs per file once every file is bound. Scopes are searched innermost
//! first: type parameters, parameters, mapped and `infer` parameters,
//! enclosing namespaces, the file (or ambient module) and finally the
//! program globals. Only the leftmost identifier of a qualified name is
//! recorded; members are looked up through the semantic model.
//! Names that resolve nowhere stay unresolved without a diagnostic.

use crate::symbols::{FileId, NodeRef, SymbolArena, SymbolFlags, SymbolId, SymbolTable};
use dtsroll_parser::{HeritageToken, ModuleDeclarationKind, NodeArena, NodeIndex, NodeKind};
use rustc_hash::FxHashMap;

/// Which declaration spaces a name lookup accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Meaning {
    Type,
    Value,
    Namespace,
    Any,
}

impl Meaning {
    pub fn flags(self) -> SymbolFlags {
        match self {
            Meaning::Type => SymbolFlags::TYPE | SymbolFlags::ALIAS,
            Meaning::Value => SymbolFlags::VALUE | SymbolFlags::ALIAS,
            Meaning::Namespace => SymbolFlags::NAMESPACE | SymbolFlags::ALIAS,
            Meaning::Any => SymbolFlags::all(),
        }
    }

    /// Meaning of `A` in `A.B.C` when the whole name has `self` meaning.
    fn for_qualifier(self) -> Meaning {
        match self {
            Meaning::Type | Meaning::Namespace => Meaning::Namespace,
            Meaning::Value => Meaning::Value,
            Meaning::Any => Meaning::Any,
        }
    }
}

enum Scope {
    Names(FxHashMap<String, SymbolId>),
    /// Locals of a file, ambient module or namespace symbol.
    Container(SymbolId),
}

pub struct NameResolver<'a> {
    file: FileId,
    arena: &'a NodeArena,
    symbols: &'a mut SymbolArena,
    globals: &'a SymbolTable,
    node_symbols: &'a mut FxHashMap<NodeIndex, SymbolId>,
    /// Identifier -> symbol
    resolved: FxHashMap<NodeIndex, SymbolId>,
    scopes: Vec<Scope>,
    /// Scope indices receiving `infer` declarations, one per open conditional type.
    infer_scopes: Vec<usize>,
}

impl<'a> NameResolver<'a> {
    pub fn new(
        file: FileId,
        arena: &'a NodeArena,
        symbols: &'a mut SymbolArena,
        globals: &'a SymbolTable,
        node_symbols: &'a mut FxHashMap<NodeIndex, SymbolId>,
    ) -> NameResolver<'a> {
        NameResolver {
            file,
            arena,
            symbols,
            globals,
            node_symbols,
            resolved: FxHashMap::default(),
            scopes: Vec::new(),
            infer_scopes: Vec::new(),
        }
    }

    /// Resolve every reference in the file and return the identifier map.
    pub fn resolve_file(
        mut self,
        root: NodeIndex,
        file_symbol: Option<SymbolId>,
    ) -> FxHashMap<NodeIndex, SymbolId> {
        if let Some(file_symbol) = file_symbol {
            self.scopes.push(Scope::Container(file_symbol));
        }
        self.visit(root);
        self.resolved
    }

    fn lookup(&self, name: &str, meaning: Meaning) -> Option<SymbolId> {
        let accepts = |id: SymbolId| {
            self.symbols
                .get(id)
                .is_some_and(|symbol| symbol.flags.intersects(meaning.flags()))
        };
        for scope in self.scopes.iter().rev() {
            let found = match scope {
                Scope::Names(names) => names.get(name).copied(),
                Scope::Container(container) => self
                    .symbols
                    .get(*container)
                    .and_then(|symbol| symbol.locals.get(name)),
            };
            if let Some(id) = found
                && accepts(id)
            {
                return Some(id);
            }
        }
        self.globals.get(name).filter(|&id| accepts(id))
    }

    /// Record the symbol of an entity name (`A`, `A.B.C`, `a.b`).
    fn resolve_entity(&mut self, node: NodeIndex, meaning: Meaning) {
        let arena = self.arena;
        let (identifier, meaning) = match arena.kind(node) {
            Some(NodeKind::Identifier { .. }) => (node, meaning),
            Some(NodeKind::QualifiedName { .. } | NodeKind::PropertyAccessExpression { .. }) => {
                (arena.leftmost_identifier(node), meaning.for_qualifier())
            }
            _ => return,
        };
        let Some(text) = arena.identifier_text(identifier) else {
            return;
        };
        if let Some(symbol) = self.lookup(text, meaning) {
            self.resolved.insert(identifier, symbol);
        }
    }

    fn push_names(&mut self) -> usize {
        self.scopes.push(Scope::Names(FxHashMap::default()));
        self.scopes.len() - 1
    }

    /// Create a type-parameter or parameter symbol visible in `scope_index`.
    fn declare_scoped(&mut self, scope_index: usize, declaration: NodeIndex, flags: SymbolFlags) {
        let arena = self.arena;
        let name_node = arena
            .kind(declaration)
            .map_or(NodeIndex::NONE, |kind| kind.name());
        let Some(NodeKind::Identifier { text }) = arena.kind(name_node) else {
            return;
        };
        let id = self.symbols.alloc(flags, text.clone(), self.file);
        if let Some(symbol) = self.symbols.get_mut(id) {
            symbol.declarations.push(NodeRef::new(self.file, declaration));
        }
        self.node_symbols.insert(declaration, id);
        if let Some(Scope::Names(names)) = self.scopes.get_mut(scope_index) {
            names.insert(text.clone(), id);
        }
    }

    fn declare_type_parameters(&mut self, scope_index: usize, type_parameters: &[NodeIndex]) {
        for &type_parameter in type_parameters {
            self.declare_scoped(scope_index, type_parameter, SymbolFlags::TYPE_PARAMETER);
        }
    }

    fn visit_all(&mut self, nodes: &[NodeIndex]) {
        for &node in nodes {
            self.visit(node);
        }
    }

    fn visit_computed_name(&mut self, name: NodeIndex) {
        if let Some(NodeKind::ComputedPropertyName { expression }) = self.arena.kind(name) {
            self.resolve_entity(*expression, Meaning::Value);
        }
    }

    fn visit_signature(
        &mut self,
        name: NodeIndex,
        type_parameters: &[NodeIndex],
        parameters: &[NodeIndex],
        return_type: NodeIndex,
    ) {
        self.visit_computed_name(name);
        let scope = self.push_names();
        self.declare_type_parameters(scope, type_parameters);
        for &parameter in parameters {
            self.declare_scoped(scope, parameter, SymbolFlags::PARAMETER);
        }
        self.visit_all(type_parameters);
        self.visit_all(parameters);
        self.visit(return_type);
        self.scopes.pop();
    }

    fn visit_heritage(&mut self, heritage_clauses: &[NodeIndex], is_class: bool) {
        let arena = self.arena;
        for &clause in heritage_clauses {
            let Some(NodeKind::HeritageClause { token, types }) = arena.kind(clause) else {
                continue;
            };
            let meaning = if is_class && *token == HeritageToken::Extends {
                Meaning::Value
            } else {
                Meaning::Type
            };
            for &heritage_type in types {
                if let Some(NodeKind::ExpressionWithTypeArguments {
                    expression,
                    type_arguments,
                }) = arena.kind(heritage_type)
                {
                    self.resolve_entity(*expression, meaning);
                    self.visit_all(type_arguments);
                }
            }
        }
    }

    fn visit(&mut self, node: NodeIndex) {
        let arena = self.arena;
        let Some(kind) = arena.kind(node) else {
            return;
        };
        match kind {
            NodeKind::ModuleDeclaration {
                kind: module_kind,
                body,
                ..
            } => {
                let container = self.node_symbols.get(&node).copied();
                match (module_kind, container) {
                    (ModuleDeclarationKind::Global, _) | (_, None) => self.visit(*body),
                    (_, Some(container)) => {
                        self.scopes.push(Scope::Container(container));
                        self.visit(*body);
                        self.scopes.pop();
                    }
                }
            }
            NodeKind::FunctionDeclaration {
                name,
                type_parameters,
                parameters,
                return_type,
                ..
            }
            | NodeKind::MethodDeclaration {
                name,
                type_parameters,
                parameters,
                return_type,
                ..
            }
            | NodeKind::MethodSignature {
                name,
                type_parameters,
                parameters,
                return_type,
                ..
            } => self.visit_signature(*name, type_parameters, parameters, *return_type),
            NodeKind::CallSignature {
                type_parameters,
                parameters,
                return_type,
            }
            | NodeKind::ConstructSignature {
                type_parameters,
                parameters,
                return_type,
            }
            | NodeKind::FunctionType {
                type_parameters,
                parameters,
                return_type,
            }
            | NodeKind::ConstructorType {
                type_parameters,
                parameters,
                return_type,
                ..
            } => self.visit_signature(NodeIndex::NONE, type_parameters, parameters, *return_type),
            NodeKind::Constructor { parameters, .. } => {
                self.visit_signature(NodeIndex::NONE, &[], parameters, NodeIndex::NONE)
            }
            NodeKind::GetAccessor {
                name,
                parameters,
                return_type,
                ..
            } => self.visit_signature(*name, &[], parameters, *return_type),
            NodeKind::SetAccessor {
                name, parameters, ..
            } => self.visit_signature(*name, &[], parameters, NodeIndex::NONE),
            NodeKind::IndexSignature {
                parameters,
                type_annotation,
                ..
            } => self.visit_signature(NodeIndex::NONE, &[], parameters, *type_annotation),
            NodeKind::ClassDeclaration {
                type_parameters,
                heritage_clauses,
                members,
                ..
            }
            | NodeKind::InterfaceDeclaration {
                type_parameters,
                heritage_clauses,
                members,
                ..
            } => {
                let is_class = matches!(kind, NodeKind::ClassDeclaration { .. });
                let scope = self.push_names();
                self.declare_type_parameters(scope, type_parameters);
                self.visit_all(type_parameters);
                self.visit_heritage(heritage_clauses, is_class);
                self.visit_all(members);
                self.scopes.pop();
            }
            NodeKind::TypeAliasDeclaration {
                type_parameters,
                type_node,
                ..
            } => {
                let scope = self.push_names();
                self.declare_type_parameters(scope, type_parameters);
                self.visit_all(type_parameters);
                self.visit(*type_node);
                self.scopes.pop();
            }
            NodeKind::TypeParameter {
                constraint,
                default,
                ..
            } => {
                self.visit(*constraint);
                self.visit(*default);
            }
            NodeKind::Parameter {
                type_annotation, ..
            }
            | NodeKind::VariableDeclaration {
                type_annotation, ..
            } => self.visit(*type_annotation),
            NodeKind::PropertyDeclaration {
                name,
                type_annotation,
                ..
            }
            | NodeKind::PropertySignature {
                name,
                type_annotation,
                ..
            } => {
                self.visit_computed_name(*name);
                self.visit(*type_annotation);
            }
            NodeKind::TypeReference {
                type_name,
                type_arguments,
            } => {
                self.resolve_entity(*type_name, Meaning::Type);
                self.visit_all(type_arguments);
            }
            NodeKind::TypeQuery {
                expr_name,
                type_arguments,
            } => {
                self.resolve_entity(*expr_name, Meaning::Value);
                self.visit_all(type_arguments);
            }
            NodeKind::ImportType { type_arguments, .. } => self.visit_all(type_arguments),
            NodeKind::ComputedPropertyName { expression } => {
                self.resolve_entity(*expression, Meaning::Value)
            }
            NodeKind::MappedType {
                type_parameter,
                name_type,
                type_node,
                ..
            } => {
                let scope = self.push_names();
                self.declare_scoped(scope, *type_parameter, SymbolFlags::TYPE_PARAMETER);
                self.visit(*type_parameter);
                self.visit(*name_type);
                self.visit(*type_node);
                self.scopes.pop();
            }
            NodeKind::ConditionalType {
                check_type,
                extends_type,
                true_type,
                false_type,
            } => {
                self.visit(*check_type);
                let scope = self.push_names();
                self.infer_scopes.push(scope);
                self.visit(*extends_type);
                self.infer_scopes.pop();
                self.visit(*true_type);
                self.scopes.pop();
                self.visit(*false_type);
            }
            NodeKind::InferType { type_parameter } => {
                if let Some(&scope) = self.infer_scopes.last() {
                    self.declare_scoped(scope, *type_parameter, SymbolFlags::TYPE_PARAMETER);
                }
                self.visit(*type_parameter);
            }
            NodeKind::TypePredicate { type_node, .. } => self.visit(*type_node),
            NodeKind::ExportDeclaration {
                export_clause,
                module_specifier,
                ..
            } => {
                if module_specifier.is_some() {
                    return;
                }
                if let Some(NodeKind::NamedExports { elements }) = arena.kind(*export_clause) {
                    for &element in elements {
                        if let Some(NodeKind::ExportSpecifier {
                            property_name,
                            name,
                            ..
                        }) = arena.kind(element)
                        {
                            let local = if property_name.is_some() {
                                *property_name
                            } else {
                                *name
                            };
                            self.resolve_entity(local, Meaning::Any);
                        }
                    }
                }
            }
            NodeKind::ExportAssignment { expression, .. } => {
                self.resolve_entity(*expression, Meaning::Any)
            }
            NodeKind::ImportEqualsDeclaration {
                module_reference, ..
            } => self.resolve_entity(*module_reference, Meaning::Any),
            NodeKind::ImportDeclaration { .. }
            | NodeKind::EnumMember { .. }
            | NodeKind::Identifier { .. }
            | NodeKind::OpaqueExpression { .. }
            | NodeKind::OpaqueStatement => {}
            _ => kind.for_each_child(|child| self.visit(child)),
        }
    }
}
