//! Bundle assembly.
//!
//! Rewrites the working tree in place and lays out the bundle's statements:
//!
//! ```typescript
//! import { Dep } from "dep";            // external imports, by specifier
//! declare class Widget { dep: Dep; }    // kept declarations
//! declare function make(): utils.Opts;
//! export { Widget, make, utils };       // the export statement
//! declare namespace utils {             // synthesized namespaces
//!     export interface Opts {}
//! }
//! ```

use crate::collector::{Collection, ReferenceKind};
use crate::planner::{ExportOutcome, NamespaceMember, Plan};
use crate::renamer::Renames;
use crate::working_tree::WorkingTree;
use dtsroll_binder::semantic::entity_name_parts;
use dtsroll_binder::{SemanticModel, SymbolId};
use dtsroll_common::Span;
use dtsroll_parser::{ModifierFlags, ModuleDeclarationKind, NodeIndex, NodeKind};
use indexmap::IndexMap;
use tracing::{debug, warn};

pub struct Assembler<'a, 'p> {
    model: SemanticModel<'p>,
    collection: &'a Collection,
    plan: &'a Plan,
    renames: &'a Renames,
    tree: &'a mut WorkingTree,
}

/// Rewrite `tree` and return the root `SourceFile` of the bundle.
pub fn assemble(
    model: SemanticModel<'_>,
    collection: &Collection,
    plan: &Plan,
    renames: &Renames,
    tree: &mut WorkingTree,
) -> NodeIndex {
    let mut assembler = Assembler {
        model,
        collection,
        plan,
        renames,
        tree,
    };
    assembler.rewrite_references();
    assembler.rename_declarations();
    assembler.rewrite_modifiers();
    let statements = assembler.layout();
    let root = assembler.tree.arena.add(
        NodeKind::SourceFile {
            statements,
            is_external_module: true,
        },
        Span::DUMMY,
    );
    assembler.tree.arena.set_parents(root);
    root
}

impl Assembler<'_, '_> {
    // =========================================================================
    // Rewriting
    // =========================================================================

    fn rewrite_references(&mut self) {
        let (model, collection, renames) = (self.model, self.collection, self.renames);
        for (&target, references) in &collection.references {
            let Some(text) = renames.text_of(model, target) else {
                debug!(symbol = target.0, "referenced symbol has no bundle name");
                continue;
            };
            for reference in references {
                for copy in self.tree.copies_of(reference.node).to_vec() {
                    match reference.kind {
                        ReferenceKind::Identifier | ReferenceKind::QualifiedName => {
                            self.tree.set_entity_name(copy, &text)
                        }
                        ReferenceKind::ImportType { depth } => {
                            self.rewrite_import_type(copy, &text, depth)
                        }
                    }
                }
            }
        }
    }

    /// `import("./m").A.B<T>` -> `A_1.B<T>`; `typeof import("./m")` -> `typeof m`.
    fn rewrite_import_type(&mut self, node: NodeIndex, text: &str, depth: usize) {
        let Some(NodeKind::ImportType {
            is_type_of,
            qualifier,
            type_arguments,
            ..
        }) = self.tree.arena.kind(node).cloned()
        else {
            return;
        };
        let mut dotted = text.to_string();
        if qualifier.is_some() {
            for part in entity_name_parts(&self.tree.arena, qualifier).into_iter().skip(depth) {
                if let Some(name) = self.tree.arena.identifier_text(part) {
                    dotted.push('.');
                    dotted.push_str(name);
                }
            }
        }
        let entity = self.tree.entity_name(&dotted);
        let kind = if is_type_of {
            NodeKind::TypeQuery {
                expr_name: entity,
                type_arguments,
            }
        } else {
            NodeKind::TypeReference {
                type_name: entity,
                type_arguments,
            }
        };
        self.tree.arena.replace(node, kind);
    }

    fn rename_declarations(&mut self) {
        let (collection, plan, renames) = (self.collection, self.plan, self.renames);
        for &symbol in &collection.kept {
            let name = match plan.moved.get(&symbol) {
                Some((_, member)) => member.clone(),
                None => match renames.name_of(symbol) {
                    Some(name) => name.to_string(),
                    None => continue,
                },
            };
            for statement in self.tree.statements_of(symbol).to_vec() {
                self.rename_statement(statement, &name);
            }
        }
    }

    fn rename_statement(&mut self, statement: NodeIndex, name: &str) {
        let name_nodes: Vec<NodeIndex> = match self.tree.arena.kind(statement) {
            Some(NodeKind::VariableStatement { declarations, .. }) => declarations
                .iter()
                .filter_map(|&declarator| self.tree.arena.kind(declarator).map(NodeKind::name))
                .collect(),
            Some(kind) => vec![kind.name()],
            None => Vec::new(),
        };
        for node in name_nodes {
            if matches!(self.tree.arena.kind(node), Some(NodeKind::Identifier { .. })) {
                self.tree.arena.replace(
                    node,
                    NodeKind::Identifier {
                        text: name.to_string(),
                    },
                );
            }
        }
    }

    fn rewrite_modifiers(&mut self) {
        let (collection, plan) = (self.collection, self.plan);
        for &symbol in &collection.kept {
            let moved = plan.is_moved(symbol);
            for statement in self.tree.statements_of(symbol).to_vec() {
                let Some(node) = self.tree.arena.get_mut(statement) else {
                    continue;
                };
                let declaration_only = matches!(
                    node.kind,
                    NodeKind::InterfaceDeclaration { .. } | NodeKind::TypeAliasDeclaration { .. }
                );
                if let Some(modifiers) = node.kind.modifiers_mut() {
                    modifiers.remove(ModifierFlags::EXPORT | ModifierFlags::DEFAULT);
                    if moved {
                        modifiers.remove(ModifierFlags::DECLARE);
                        modifiers.insert(ModifierFlags::EXPORT);
                    } else if !declaration_only {
                        modifiers.insert(ModifierFlags::DECLARE);
                    }
                }
                self.strip_nested_declare(statement);
            }
        }
    }

    /// Bodies of namespaces are already ambient.
    fn strip_nested_declare(&mut self, statement: NodeIndex) {
        let mut pending = vec![statement];
        while let Some(node) = pending.pop() {
            let body_statements = match self.tree.arena.kind(node) {
                Some(NodeKind::ModuleDeclaration { body, .. }) => {
                    pending.push(*body);
                    continue;
                }
                Some(NodeKind::ModuleBlock { statements }) => statements.clone(),
                _ => continue,
            };
            for inner in body_statements {
                if let Some(modifiers) = self
                    .tree
                    .arena
                    .get_mut(inner)
                    .and_then(|node| node.kind.modifiers_mut())
                {
                    modifiers.remove(ModifierFlags::DECLARE);
                }
                pending.push(inner);
            }
        }
    }

    // =========================================================================
    // Layout
    // =========================================================================

    fn layout(&mut self) -> Vec<NodeIndex> {
        let (collection, plan) = (self.collection, self.plan);
        let mut statements = self.imports();
        for &symbol in &collection.kept {
            if !plan.is_moved(symbol) {
                statements.extend_from_slice(self.tree.statements_of(symbol));
            }
        }
        statements.extend(self.exports());
        for module in plan.top_level_namespaces().map(|namespace| namespace.module) {
            if let Some(declaration) = self.namespace_declaration(module, None, 0) {
                statements.push(declaration);
            }
        }
        statements
    }

    fn imports(&mut self) -> Vec<NodeIndex> {
        let (collection, renames) = (self.collection, self.renames);
        let mut by_specifier: IndexMap<&str, Vec<SymbolId>> = IndexMap::new();
        for (symbol, import) in &collection.externals {
            by_specifier
                .entry(import.specifier.as_str())
                .or_default()
                .push(*symbol);
        }
        by_specifier.sort_keys();

        let mut statements = Vec::new();
        for (specifier, symbols) in by_specifier {
            let mut default_name = NodeIndex::NONE;
            let mut named = Vec::new();
            let mut namespaces = Vec::new();
            for symbol in symbols {
                let (Some(import), Some(local)) =
                    (collection.externals.get(&symbol), renames.name_of(symbol))
                else {
                    continue;
                };
                match import.imported_name.as_deref() {
                    None => namespaces.push(local),
                    Some("default") if default_name.is_none() => {
                        default_name = self.tree.identifier(local);
                    }
                    Some(imported) => named.push(self.import_specifier(imported, local)),
                }
            }

            if default_name.is_some() || !named.is_empty() {
                let named_bindings = if named.is_empty() {
                    NodeIndex::NONE
                } else {
                    self.add(NodeKind::NamedImports { elements: named })
                };
                statements.push(self.import_declaration(specifier, default_name, named_bindings));
            }
            for local in namespaces {
                let name = self.tree.identifier(local);
                let named_bindings = self.add(NodeKind::NamespaceImport { name });
                statements.push(self.import_declaration(specifier, NodeIndex::NONE, named_bindings));
            }
        }
        statements
    }

    fn import_declaration(&mut self, specifier: &str, name: NodeIndex, named_bindings: NodeIndex) -> NodeIndex {
        let import_clause = self.add(NodeKind::ImportClause {
            is_type_only: false,
            name,
            named_bindings,
        });
        let module_specifier = self.add(NodeKind::StringLiteral {
            text: specifier.to_string(),
        });
        self.add(NodeKind::ImportDeclaration {
            import_clause,
            module_specifier,
        })
    }

    fn exports(&mut self) -> Vec<NodeIndex> {
        let (model, plan, renames) = (self.model, self.plan, self.renames);
        let mut specifiers = Vec::new();
        let mut statements = Vec::new();
        let mut export_equals = None;

        for planned in &plan.exports {
            let target = match planned.outcome {
                ExportOutcome::Direct { symbol }
                | ExportOutcome::External { symbol }
                | ExportOutcome::ExternalModule { symbol }
                | ExportOutcome::Member { symbol } => symbol,
                ExportOutcome::Namespace { module } => module,
                ExportOutcome::Skipped(_) => continue,
            };
            let Some(text) = renames.text_of(model, target) else {
                warn!(name = %planned.name, "export target has no bundle name");
                continue;
            };
            if planned.name == "export=" {
                let expression = self.tree.entity_name(&text);
                export_equals = Some(self.add(NodeKind::ExportAssignment {
                    is_export_equals: true,
                    expression,
                }));
            } else if !text.contains('.') {
                specifiers.push(self.export_specifier(&text, &planned.name));
            } else if planned.name == "default" {
                let expression = self.tree.entity_name(&text);
                statements.push(self.add(NodeKind::ExportAssignment {
                    is_export_equals: false,
                    expression,
                }));
            } else {
                let name = self.tree.identifier(&planned.name);
                let module_reference = self.tree.entity_name(&text);
                statements.push(self.add(NodeKind::ImportEqualsDeclaration {
                    modifiers: ModifierFlags::EXPORT,
                    is_type_only: false,
                    name,
                    module_reference,
                }));
            }
        }

        if !specifiers.is_empty() || (statements.is_empty() && export_equals.is_none()) {
            // An empty list keeps the bundle a module.
            let export_clause = self.add(NodeKind::NamedExports {
                elements: specifiers,
            });
            statements.insert(
                0,
                self.add(NodeKind::ExportDeclaration {
                    is_type_only: false,
                    export_clause,
                    module_specifier: NodeIndex::NONE,
                }),
            );
        }
        statements.extend(export_equals);
        statements
    }

    fn namespace_declaration(&mut self, module: SymbolId, member_name: Option<&str>, depth: usize) -> Option<NodeIndex> {
        let (model, plan, renames) = (self.model, self.plan, self.renames);
        let namespace = plan.namespace(module)?;
        let name_text = match member_name {
            Some(name) => name.to_string(),
            None => renames.name_of(module)?.to_string(),
        };

        let mut body = Vec::new();
        let mut reexposed = Vec::new();
        for (name, member) in &namespace.members {
            match *member {
                NamespaceMember::Moved(symbol) => {
                    body.extend_from_slice(self.tree.statements_of(symbol));
                }
                NamespaceMember::Reexposed(symbol) => {
                    let Some(text) = renames.text_of(model, symbol) else {
                        continue;
                    };
                    reexposed.push(self.export_specifier(&text, name));
                }
                NamespaceMember::Qualified(symbol) => {
                    let Some(text) = renames.text_of(model, symbol) else {
                        continue;
                    };
                    let name = self.tree.identifier(name);
                    let module_reference = self.tree.entity_name(&text);
                    body.push(self.add(NodeKind::ImportEqualsDeclaration {
                        modifiers: ModifierFlags::EXPORT,
                        is_type_only: false,
                        name,
                        module_reference,
                    }));
                }
                NamespaceMember::Nested(inner) => {
                    if let Some(nested) = self.namespace_declaration(inner, Some(name), depth + 1) {
                        body.push(nested);
                    }
                }
            }
        }
        if !reexposed.is_empty() {
            let export_clause = self.add(NodeKind::NamedExports { elements: reexposed });
            body.push(self.add(NodeKind::ExportDeclaration {
                is_type_only: false,
                export_clause,
                module_specifier: NodeIndex::NONE,
            }));
        }

        let modifiers = if depth == 0 {
            ModifierFlags::DECLARE
        } else {
            ModifierFlags::EXPORT
        };
        let name = self.tree.identifier(&name_text);
        let block = self.add(NodeKind::ModuleBlock { statements: body });
        Some(self.add(NodeKind::ModuleDeclaration {
            modifiers,
            kind: ModuleDeclarationKind::Namespace,
            name,
            body: block,
        }))
    }

    /// `imported as local`, or `imported` when both agree.
    fn import_specifier(&mut self, imported: &str, local: &str) -> NodeIndex {
        let (property_name, name) = self.specifier_names(imported, local);
        self.add(NodeKind::ImportSpecifier {
            is_type_only: false,
            property_name,
            name,
        })
    }

    /// `local as exported`, or `local` when both agree.
    fn export_specifier(&mut self, local: &str, exported: &str) -> NodeIndex {
        let (property_name, name) = self.specifier_names(local, exported);
        self.add(NodeKind::ExportSpecifier {
            is_type_only: false,
            property_name,
            name,
        })
    }

    fn specifier_names(&mut self, property_name: &str, name: &str) -> (NodeIndex, NodeIndex) {
        let property_node = if property_name == name {
            NodeIndex::NONE
        } else {
            self.tree.identifier(property_name)
        };
        (property_node, self.tree.identifier(name))
    }

    fn add(&mut self, kind: NodeKind) -> NodeIndex {
        self.tree.arena.add(kind, Span::DUMMY)
    }
}
