//! Binder state - declares symbols for one file into the program-wide tables.
//!
//! Module files get a `SOURCE_FILE` symbol whose `locals` hold every top-level
//! declaration and import, and whose `exports` hold what the file exports.
//! Script files and `declare global` blocks bind into the shared global table.
//! Every import and export specifier becomes an `ALIAS` symbol with a typed
//! [`AliasTarget`]; nothing is resolved across files here.

use crate::host::is_declaration_file;
use crate::symbols::{
    AliasTarget, FileId, NodeRef, SymbolArena, SymbolFlags, SymbolId, SymbolTable,
    can_merge_flags,
};
use dtsroll_common::diagnostics::{
    Diagnostic, diagnostic_codes, diagnostic_messages, format_message,
};
use dtsroll_parser::{
    ModifierFlags, ModuleDeclarationKind, NodeArena, NodeIndex, NodeKind, VariableKind,
};
use rustc_hash::FxHashMap;

/// Where the declarations of a statement list go.
#[derive(Clone, Copy, Debug)]
enum Container {
    /// A file, ambient module or namespace symbol.
    Module {
        symbol: SymbolId,
        /// Every declaration counts as exported (ambient bodies without
        /// explicit export declarations).
        implicit_exports: bool,
    },
    /// The program-wide global scope.
    Global,
}

impl Container {
    fn implicit_exports(self) -> bool {
        matches!(
            self,
            Container::Module {
                implicit_exports: true,
                ..
            }
        )
    }

    fn symbol(self) -> Option<SymbolId> {
        match self {
            Container::Module { symbol, .. } => Some(symbol),
            Container::Global => None,
        }
    }
}

pub struct BinderState<'a> {
    file: FileId,
    file_name: &'a str,
    arena: &'a NodeArena,
    symbols: &'a mut SymbolArena,
    globals: &'a mut SymbolTable,
    ambient_modules: &'a mut SymbolTable,
    export_stars: &'a mut FxHashMap<SymbolId, Vec<String>>,
    /// Declaration node -> symbol
    node_symbols: FxHashMap<NodeIndex, SymbolId>,
    diagnostics: Vec<Diagnostic>,
    in_ambient_context: bool,
}

impl<'a> BinderState<'a> {
    pub fn new(
        file: FileId,
        file_name: &'a str,
        arena: &'a NodeArena,
        symbols: &'a mut SymbolArena,
        globals: &'a mut SymbolTable,
        ambient_modules: &'a mut SymbolTable,
        export_stars: &'a mut FxHashMap<SymbolId, Vec<String>>,
    ) -> BinderState<'a> {
        BinderState {
            file,
            file_name,
            arena,
            symbols,
            globals,
            ambient_modules,
            export_stars,
            node_symbols: FxHashMap::default(),
            diagnostics: Vec::new(),
            in_ambient_context: false,
        }
    }

    /// Consume the binder, returning the declaration map and diagnostics.
    pub fn finish(self) -> (FxHashMap<NodeIndex, SymbolId>, Vec<Diagnostic>) {
        (self.node_symbols, self.diagnostics)
    }

    /// Bind a whole file. Returns the module symbol for external modules.
    pub fn bind_source_file(&mut self, root: NodeIndex) -> Option<SymbolId> {
        let arena = self.arena;
        let Some(NodeKind::SourceFile {
            statements,
            is_external_module,
        }) = arena.kind(root)
        else {
            return None;
        };
        self.in_ambient_context = is_declaration_file(self.file_name);

        let file_symbol = if *is_external_module {
            let symbol = self.symbols.alloc(
                SymbolFlags::SOURCE_FILE,
                format!("\"{}\"", self.file_name),
                self.file,
            );
            self.add_declaration(symbol, root);
            self.node_symbols.insert(root, symbol);
            let implicit_exports = self.in_ambient_context && !has_explicit_exports(arena, statements);
            self.bind_statements(
                statements,
                Container::Module {
                    symbol,
                    implicit_exports,
                },
            );
            Some(symbol)
        } else {
            self.bind_statements(statements, Container::Global);
            None
        };

        tracing::debug!(
            file = self.file_name,
            symbols = self.node_symbols.len(),
            is_module = file_symbol.is_some(),
            "bound source file"
        );
        file_symbol
    }

    fn bind_statements(&mut self, statements: &[NodeIndex], container: Container) {
        for &statement in statements {
            self.bind_statement(statement, container);
        }
    }

    fn bind_statement(&mut self, statement: NodeIndex, container: Container) {
        let arena = self.arena;
        let Some(node) = arena.get(statement) else {
            return;
        };
        let modifiers = node.kind.modifiers();
        match &node.kind {
            NodeKind::VariableStatement {
                kind, declarations, ..
            } => {
                let flags = match kind {
                    VariableKind::Var => SymbolFlags::FUNCTION_SCOPED_VARIABLE,
                    VariableKind::Let | VariableKind::Const => SymbolFlags::BLOCK_SCOPED_VARIABLE,
                };
                let exported =
                    modifiers.contains(ModifierFlags::EXPORT) || container.implicit_exports();
                let mut bindings = Vec::new();
                for &declaration in declarations {
                    collect_bindings(arena, declaration, &mut bindings);
                }
                for (declaration, text) in bindings {
                    self.declare(container, text, flags, declaration, exported.then_some(text));
                }
            }
            NodeKind::FunctionDeclaration { name, .. } => {
                self.bind_named_declaration(container, statement, *name, SymbolFlags::FUNCTION, modifiers);
            }
            NodeKind::ClassDeclaration { name, .. } => {
                self.bind_named_declaration(container, statement, *name, SymbolFlags::CLASS, modifiers);
            }
            NodeKind::InterfaceDeclaration { name, .. } => {
                self.bind_named_declaration(container, statement, *name, SymbolFlags::INTERFACE, modifiers);
            }
            NodeKind::TypeAliasDeclaration { name, .. } => {
                self.bind_named_declaration(container, statement, *name, SymbolFlags::TYPE_ALIAS, modifiers);
            }
            NodeKind::EnumDeclaration { name, members, .. } => {
                let flags = if modifiers.contains(ModifierFlags::CONST) {
                    SymbolFlags::CONST_ENUM
                } else {
                    SymbolFlags::REGULAR_ENUM
                };
                if let Some(symbol) =
                    self.bind_named_declaration(container, statement, *name, flags, modifiers)
                {
                    self.bind_enum_members(symbol, members);
                }
            }
            NodeKind::ModuleDeclaration {
                kind, name, body, ..
            } => self.bind_module_declaration(container, statement, *kind, *name, *body, modifiers),
            NodeKind::ImportDeclaration {
                import_clause,
                module_specifier,
            } => self.bind_import_declaration(container, *import_clause, *module_specifier),
            NodeKind::ImportEqualsDeclaration {
                is_type_only,
                name,
                module_reference,
                ..
            } => {
                let Some(local_name) = arena.identifier_text(*name) else {
                    return;
                };
                let target = match arena.kind(*module_reference) {
                    Some(NodeKind::ExternalModuleReference { expression }) => {
                        let Some(specifier) = arena.identifier_text(*expression) else {
                            return;
                        };
                        AliasTarget::Module {
                            specifier: specifier.to_string(),
                        }
                    }
                    _ => AliasTarget::Local {
                        entity: NodeRef::new(self.file, *module_reference),
                    },
                };
                let exported =
                    modifiers.contains(ModifierFlags::EXPORT) || container.implicit_exports();
                self.declare_alias(
                    container,
                    local_name,
                    statement,
                    target,
                    *is_type_only,
                    true,
                    exported.then_some(local_name),
                );
            }
            NodeKind::ExportDeclaration {
                is_type_only,
                export_clause,
                module_specifier,
            } => self.bind_export_declaration(
                container,
                *is_type_only,
                *export_clause,
                *module_specifier,
            ),
            NodeKind::ExportAssignment {
                is_export_equals,
                expression,
            } => {
                let export_name = if *is_export_equals { "export=" } else { "default" };
                match arena.kind(*expression) {
                    Some(NodeKind::Identifier { .. } | NodeKind::PropertyAccessExpression { .. }) => {
                        self.declare_alias(
                            container,
                            export_name,
                            statement,
                            AliasTarget::Local {
                                entity: NodeRef::new(self.file, *expression),
                            },
                            false,
                            false,
                            Some(export_name),
                        );
                    }
                    _ => {
                        // `export default 42`: a synthetic variable typed by the expression.
                        let symbol = self.symbols.alloc(
                            SymbolFlags::BLOCK_SCOPED_VARIABLE,
                            export_name.to_string(),
                            self.file,
                        );
                        self.add_declaration(symbol, statement);
                        self.set_parent(symbol, container);
                        self.node_symbols.insert(statement, symbol);
                        self.set_export(container, export_name, symbol, statement);
                    }
                }
            }
            NodeKind::NamespaceExportDeclaration { .. } => {
                tracing::trace!(file = self.file_name, "ignoring UMD namespace export");
            }
            _ => {}
        }
    }

    /// Functions, classes, interfaces, type aliases, enums and namespaces.
    fn bind_named_declaration(
        &mut self,
        container: Container,
        declaration: NodeIndex,
        name: NodeIndex,
        flags: SymbolFlags,
        modifiers: ModifierFlags,
    ) -> Option<SymbolId> {
        let is_default =
            modifiers.contains(ModifierFlags::EXPORT) && modifiers.contains(ModifierFlags::DEFAULT);
        let exported = modifiers.contains(ModifierFlags::EXPORT) || container.implicit_exports();
        let arena = self.arena;
        match arena.identifier_text(name) {
            Some(text) => {
                let export_name = if is_default {
                    Some("default")
                } else if exported {
                    Some(text)
                } else {
                    None
                };
                Some(self.declare(container, text, flags, declaration, export_name))
            }
            None if is_default => {
                // export default function () {}
                let symbol = self.symbols.alloc(flags, "default".to_string(), self.file);
                self.add_declaration(symbol, declaration);
                self.set_parent(symbol, container);
                self.node_symbols.insert(declaration, symbol);
                self.set_export(container, "default", symbol, declaration);
                Some(symbol)
            }
            None => None,
        }
    }

    fn bind_enum_members(&mut self, enum_symbol: SymbolId, members: &[NodeIndex]) {
        let arena = self.arena;
        for &member in members {
            let Some(NodeKind::EnumMember { name, .. }) = arena.kind(member) else {
                continue;
            };
            let Some(text) = arena.identifier_text(*name) else {
                continue;
            };
            let existing = self
                .symbols
                .get(enum_symbol)
                .and_then(|symbol| symbol.exports.get(text));
            let symbol = match existing {
                Some(existing) => {
                    self.add_declaration(existing, member);
                    existing
                }
                None => {
                    let symbol = self
                        .symbols
                        .alloc(SymbolFlags::ENUM_MEMBER, text.to_string(), self.file);
                    self.add_declaration(symbol, member);
                    if let Some(enum_symbol_data) = self.symbols.get_mut(enum_symbol) {
                        enum_symbol_data.exports.set(text.to_string(), symbol);
                    }
                    if let Some(member_symbol) = self.symbols.get_mut(symbol) {
                        member_symbol.parent = Some(enum_symbol);
                    }
                    symbol
                }
            };
            self.node_symbols.insert(member, symbol);
        }
    }

    fn bind_module_declaration(
        &mut self,
        container: Container,
        declaration: NodeIndex,
        kind: ModuleDeclarationKind,
        name: NodeIndex,
        body: NodeIndex,
        modifiers: ModifierFlags,
    ) {
        let arena = self.arena;
        let was_ambient = self.in_ambient_context;
        if modifiers.contains(ModifierFlags::DECLARE) {
            self.in_ambient_context = true;
        }

        match (kind, arena.kind(name)) {
            (ModuleDeclarationKind::Global, _) => {
                self.in_ambient_context = true;
                if let Some(NodeKind::ModuleBlock { statements }) = arena.kind(body) {
                    self.bind_statements(statements, Container::Global);
                }
            }
            (_, Some(NodeKind::StringLiteral { text })) => {
                let symbol = match self.ambient_modules.get(text) {
                    Some(existing) => {
                        self.add_declaration(existing, declaration);
                        existing
                    }
                    None => {
                        let symbol = self.symbols.alloc(
                            SymbolFlags::AMBIENT_MODULE,
                            format!("\"{text}\""),
                            self.file,
                        );
                        self.add_declaration(symbol, declaration);
                        self.ambient_modules.set(text.clone(), symbol);
                        symbol
                    }
                };
                self.node_symbols.insert(declaration, symbol);
                self.in_ambient_context = true;
                if let Some(NodeKind::ModuleBlock { statements }) = arena.kind(body) {
                    let implicit_exports = !has_explicit_exports(arena, statements);
                    self.bind_statements(
                        statements,
                        Container::Module {
                            symbol,
                            implicit_exports,
                        },
                    );
                }
            }
            _ => {
                let flags = if is_instantiated(arena, declaration) {
                    SymbolFlags::VALUE_MODULE
                } else {
                    SymbolFlags::NAMESPACE_MODULE
                };
                if let Some(symbol) =
                    self.bind_named_declaration(container, declaration, name, flags, modifiers)
                {
                    match arena.kind(body) {
                        Some(NodeKind::ModuleBlock { statements }) => {
                            let implicit_exports = self.in_ambient_context
                                && !has_explicit_exports(arena, statements);
                            self.bind_statements(
                                statements,
                                Container::Module {
                                    symbol,
                                    implicit_exports,
                                },
                            );
                        }
                        // namespace A.B {}: the inner declaration carries `export`
                        Some(NodeKind::ModuleDeclaration { .. }) => self.bind_statement(
                            body,
                            Container::Module {
                                symbol,
                                implicit_exports: false,
                            },
                        ),
                        _ => {}
                    }
                }
            }
        }
        self.in_ambient_context = was_ambient;
    }

    fn bind_import_declaration(
        &mut self,
        container: Container,
        import_clause: NodeIndex,
        module_specifier: NodeIndex,
    ) {
        let arena = self.arena;
        let Some(specifier) = arena.identifier_text(module_specifier) else {
            return;
        };
        let Some(NodeKind::ImportClause {
            is_type_only,
            name,
            named_bindings,
        }) = arena.kind(import_clause)
        else {
            // import "x";
            return;
        };

        if let Some(local_name) = arena.identifier_text(*name) {
            self.declare_alias(
                container,
                local_name,
                import_clause,
                AliasTarget::ModuleExport {
                    specifier: specifier.to_string(),
                    export_name: "default".to_string(),
                },
                *is_type_only,
                true,
                None,
            );
        }

        match arena.kind(*named_bindings) {
            Some(NodeKind::NamespaceImport { name }) => {
                if let Some(local_name) = arena.identifier_text(*name) {
                    self.declare_alias(
                        container,
                        local_name,
                        *named_bindings,
                        AliasTarget::Module {
                            specifier: specifier.to_string(),
                        },
                        *is_type_only,
                        true,
                        None,
                    );
                }
            }
            Some(NodeKind::NamedImports { elements }) => {
                for &element in elements {
                    let Some(NodeKind::ImportSpecifier {
                        is_type_only: specifier_type_only,
                        property_name,
                        name,
                    }) = arena.kind(element)
                    else {
                        continue;
                    };
                    let Some(local_name) = arena.identifier_text(*name) else {
                        continue;
                    };
                    let imported_name = arena.identifier_text(*property_name).unwrap_or(local_name);
                    self.declare_alias(
                        container,
                        local_name,
                        element,
                        AliasTarget::ModuleExport {
                            specifier: specifier.to_string(),
                            export_name: imported_name.to_string(),
                        },
                        *is_type_only || *specifier_type_only,
                        true,
                        None,
                    );
                }
            }
            _ => {}
        }
    }

    fn bind_export_declaration(
        &mut self,
        container: Container,
        is_type_only: bool,
        export_clause: NodeIndex,
        module_specifier: NodeIndex,
    ) {
        let arena = self.arena;
        let specifier = arena.identifier_text(module_specifier);
        match arena.kind(export_clause) {
            None => {
                // export * from "m"
                if let (Some(specifier), Some(module)) = (specifier, container.symbol()) {
                    self.export_stars
                        .entry(module)
                        .or_default()
                        .push(specifier.to_string());
                }
            }
            Some(NodeKind::NamespaceExport { name }) => {
                let (Some(specifier), Some(export_name)) = (specifier, arena.identifier_text(*name))
                else {
                    return;
                };
                self.declare_alias(
                    container,
                    export_name,
                    export_clause,
                    AliasTarget::Module {
                        specifier: specifier.to_string(),
                    },
                    is_type_only,
                    false,
                    Some(export_name),
                );
            }
            Some(NodeKind::NamedExports { elements }) => {
                for &element in elements {
                    let Some(NodeKind::ExportSpecifier {
                        is_type_only: specifier_type_only,
                        property_name,
                        name,
                    }) = arena.kind(element)
                    else {
                        continue;
                    };
                    let Some(export_name) = arena.identifier_text(*name) else {
                        continue;
                    };
                    let local_node = if property_name.is_some() {
                        *property_name
                    } else {
                        *name
                    };
                    let target = match specifier {
                        Some(specifier) => AliasTarget::ModuleExport {
                            specifier: specifier.to_string(),
                            export_name: arena
                                .identifier_text(local_node)
                                .unwrap_or(export_name)
                                .to_string(),
                        },
                        None => AliasTarget::Local {
                            entity: NodeRef::new(self.file, local_node),
                        },
                    };
                    self.declare_alias(
                        container,
                        export_name,
                        element,
                        target,
                        is_type_only || *specifier_type_only,
                        false,
                        Some(export_name),
                    );
                }
            }
            _ => {}
        }
    }

    // =========================================================================
    // Symbol tables
    // =========================================================================

    fn lookup_local(&self, container: Container, name: &str) -> Option<SymbolId> {
        match container {
            Container::Module { symbol, .. } => self
                .symbols
                .get(symbol)
                .and_then(|symbol| symbol.locals.get(name)),
            Container::Global => self.globals.get(name),
        }
    }

    fn insert_local(&mut self, container: Container, name: &str, id: SymbolId) {
        match container {
            Container::Module { symbol, .. } => {
                if let Some(symbol) = self.symbols.get_mut(symbol) {
                    symbol.locals.set(name.to_string(), id);
                }
            }
            Container::Global => self.globals.set(name.to_string(), id),
        }
    }

    /// Declare `name` in `container`, merging with an existing compatible
    /// declaration. Conflicts report TS2300 and keep the existing symbol.
    fn declare(
        &mut self,
        container: Container,
        name: &str,
        flags: SymbolFlags,
        declaration: NodeIndex,
        export_name: Option<&str>,
    ) -> SymbolId {
        let id = match self.lookup_local(container, name) {
            Some(existing) => {
                let existing_flags = self
                    .symbols
                    .get(existing)
                    .map_or(SymbolFlags::empty(), |symbol| symbol.flags);
                if can_merge_flags(existing_flags, flags) {
                    if let Some(symbol) = self.symbols.get_mut(existing) {
                        symbol.flags |= flags;
                    }
                    self.add_declaration(existing, declaration);
                } else {
                    self.report_duplicate(declaration, name);
                }
                existing
            }
            None => {
                let id = self.symbols.alloc(flags, name.to_string(), self.file);
                self.add_declaration(id, declaration);
                self.set_parent(id, container);
                self.insert_local(container, name, id);
                id
            }
        };
        self.node_symbols.insert(declaration, id);
        if let Some(export_name) = export_name {
            self.set_export(container, export_name, id, declaration);
        }
        id
    }

    /// Declare an alias symbol. Local aliases (imports) are visible by name in
    /// the container; export specifiers only appear in its exports.
    fn declare_alias(
        &mut self,
        container: Container,
        name: &str,
        declaration: NodeIndex,
        target: AliasTarget,
        is_type_only: bool,
        is_local: bool,
        export_name: Option<&str>,
    ) {
        if is_local && let Some(existing) = self.lookup_local(container, name) {
            self.report_duplicate(declaration, name);
            self.node_symbols.insert(declaration, existing);
            return;
        }
        let id = self
            .symbols
            .alloc(SymbolFlags::ALIAS, name.to_string(), self.file);
        self.add_declaration(id, declaration);
        self.set_parent(id, container);
        if let Some(symbol) = self.symbols.get_mut(id) {
            symbol.alias = Some(target);
            symbol.is_type_only = is_type_only;
        }
        self.node_symbols.insert(declaration, id);
        if is_local {
            self.insert_local(container, name, id);
        }
        if let Some(export_name) = export_name {
            self.set_export(container, export_name, id, declaration);
        }
    }

    fn set_export(&mut self, container: Container, name: &str, id: SymbolId, declaration: NodeIndex) {
        let Container::Module { symbol, .. } = container else {
            return;
        };
        let existing = self
            .symbols
            .get(symbol)
            .and_then(|symbol| symbol.exports.get(name));
        match existing {
            Some(existing) if existing != id => self.report_duplicate(declaration, name),
            Some(_) => {}
            None => {
                if let Some(symbol) = self.symbols.get_mut(symbol) {
                    symbol.exports.set(name.to_string(), id);
                }
            }
        }
    }

    fn add_declaration(&mut self, id: SymbolId, declaration: NodeIndex) {
        let node_ref = NodeRef::new(self.file, declaration);
        if let Some(symbol) = self.symbols.get_mut(id)
            && !symbol.declarations.contains(&node_ref)
        {
            symbol.declarations.push(node_ref);
        }
    }

    fn set_parent(&mut self, id: SymbolId, container: Container) {
        if let Some(symbol) = self.symbols.get_mut(id) {
            symbol.parent = container.symbol();
        }
    }

    fn report_duplicate(&mut self, declaration: NodeIndex, name: &str) {
        let name_node = self
            .arena
            .kind(declaration)
            .map_or(NodeIndex::NONE, |kind| kind.name());
        let span = if name_node.is_some() {
            self.arena.span(name_node)
        } else {
            self.arena.span(declaration)
        };
        self.diagnostics.push(Diagnostic::error(
            self.file_name,
            span,
            format_message(diagnostic_messages::DUPLICATE_IDENTIFIER, &[name]),
            diagnostic_codes::DUPLICATE_IDENTIFIER,
        ));
    }
}

/// A module body with `export {}`, `export * from` or `export =`/`export default <expr>`
/// exports only what it marks; otherwise ambient bodies export everything.
fn has_explicit_exports(arena: &NodeArena, statements: &[NodeIndex]) -> bool {
    statements.iter().any(|&statement| {
        matches!(
            arena.kind(statement),
            Some(NodeKind::ExportDeclaration { .. } | NodeKind::ExportAssignment { .. })
        )
    })
}

/// Whether a namespace declaration contains values (and so exists at runtime).
pub fn is_instantiated(arena: &NodeArena, declaration: NodeIndex) -> bool {
    let Some(NodeKind::ModuleDeclaration { body, .. }) = arena.kind(declaration) else {
        return false;
    };
    match arena.kind(*body) {
        Some(NodeKind::ModuleBlock { statements }) => statements.iter().any(|&statement| {
            match arena.kind(statement) {
                Some(NodeKind::VariableStatement { .. })
                | Some(NodeKind::FunctionDeclaration { .. })
                | Some(NodeKind::ClassDeclaration { .. })
                | Some(NodeKind::ExportAssignment { .. }) => true,
                Some(NodeKind::EnumDeclaration { modifiers, .. }) => {
                    !modifiers.contains(ModifierFlags::CONST)
                }
                Some(NodeKind::ModuleDeclaration { .. }) => is_instantiated(arena, statement),
                _ => false,
            }
        }),
        Some(NodeKind::ModuleDeclaration { .. }) => is_instantiated(arena, *body),
        _ => false,
    }
}

/// Each name a variable declarator introduces, with the node that declares
/// it: the declarator itself, or a `BindingElement` of its pattern.
fn collect_bindings<'a>(arena: &'a NodeArena, node: NodeIndex, out: &mut Vec<(NodeIndex, &'a str)>) {
    let name = arena.kind(node).map_or(NodeIndex::NONE, NodeKind::name);
    match arena.kind(name) {
        Some(NodeKind::Identifier { text }) => out.push((node, text)),
        Some(NodeKind::ObjectBindingPattern { elements } | NodeKind::ArrayBindingPattern { elements }) => {
            for &element in elements {
                collect_bindings(arena, element, out);
            }
        }
        _ => {}
    }
}
