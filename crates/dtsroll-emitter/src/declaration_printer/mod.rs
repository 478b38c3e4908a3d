//! Declaration (.d.ts) printer.
//!
//! Prints declaration statements from a [`NodeArena`] as declaration-file
//! text.
//!
//! ```typescript
//! // working tree after bundling
//! declare function add(a: number, b: number): number;
//! declare class Calculator {
//!     private value;
//!     add(n: number): this;
//! }
//! export { add, Calculator };
//! ```
//!
//! Bodies are never printed: functions and methods end in `;`, and overload
//! implementations are dropped when overload signatures exist. Modifiers are
//! printed exactly as the node carries them.

mod helpers;
mod members;
mod types;

pub use helpers::is_overload_implementation;

use dtsroll_parser::{ModifierFlags, ModuleDeclarationKind, NodeArena, NodeIndex, NodeKind, VariableKind};
use tracing::trace;

/// Printer switches.
#[derive(Clone, Copy, Debug)]
pub struct PrinterOptions {
    /// Print the `/** ... */` comment attached to declarations and members.
    pub preserve_jsdoc: bool,
}

impl Default for PrinterOptions {
    fn default() -> Self {
        PrinterOptions {
            preserve_jsdoc: true,
        }
    }
}

/// Declaration printer over one arena.
pub struct DeclarationPrinter<'a> {
    arena: &'a NodeArena,
    options: PrinterOptions,
    output: String,
    indent_level: u32,
}

impl<'a> DeclarationPrinter<'a> {
    pub fn new(arena: &'a NodeArena) -> Self {
        Self::with_options(arena, PrinterOptions::default())
    }

    pub fn with_options(arena: &'a NodeArena, options: PrinterOptions) -> Self {
        DeclarationPrinter {
            arena,
            options,
            output: String::with_capacity(1024),
            indent_level: 0,
        }
    }

    /// Print every statement of a source file, each followed by a newline.
    pub fn print_source_file(&mut self, root: NodeIndex) -> String {
        let arena = self.arena;
        let statements = match arena.kind(root) {
            Some(NodeKind::SourceFile { statements, .. }) => statements.as_slice(),
            _ => &[],
        };
        let mut text = String::new();
        for statement in self.print_statements(statements) {
            text.push_str(&statement);
            text.push('\n');
        }
        text
    }

    /// Print a statement list, one string per printed statement. Overload
    /// implementations and statements with no declaration content produce
    /// nothing.
    pub fn print_statements(&mut self, statements: &[NodeIndex]) -> Vec<String> {
        let arena = self.arena;
        statements
            .iter()
            .filter(|&&stmt| !helpers::is_overload_implementation(arena, statements, stmt))
            .map(|&stmt| self.print_statement(stmt))
            .filter(|text| !text.is_empty())
            .collect()
    }

    /// Print one statement without a trailing newline.
    pub fn print_statement(&mut self, stmt: NodeIndex) -> String {
        self.reset_writer();
        self.emit_statement(stmt);
        self.take_output()
    }

    /// Print a type node.
    pub fn print_type(&mut self, type_node: NodeIndex) -> String {
        self.reset_writer();
        self.emit_type(type_node);
        self.take_output()
    }

    fn emit_statement(&mut self, stmt: NodeIndex) {
        let Some(kind) = self.arena.kind(stmt) else {
            return;
        };
        if matches!(kind, NodeKind::OpaqueStatement) {
            return;
        }
        self.emit_jsdoc(stmt);

        match kind {
            NodeKind::FunctionDeclaration { .. } => self.emit_function_declaration(stmt),
            NodeKind::ClassDeclaration { .. } => self.emit_class_declaration(stmt),
            NodeKind::InterfaceDeclaration { .. } => self.emit_interface_declaration(stmt),
            NodeKind::TypeAliasDeclaration { .. } => self.emit_type_alias_declaration(stmt),
            NodeKind::EnumDeclaration { .. } => self.emit_enum_declaration(stmt),
            NodeKind::VariableStatement { .. } => self.emit_variable_statement(stmt),
            NodeKind::ModuleDeclaration { .. } => self.emit_module_declaration(stmt),
            NodeKind::ImportDeclaration { .. } => self.emit_import_declaration(stmt),
            NodeKind::ImportEqualsDeclaration { .. } => self.emit_import_equals_declaration(stmt),
            NodeKind::ExportDeclaration { .. } => self.emit_export_declaration(stmt),
            NodeKind::ExportAssignment { .. } => self.emit_export_assignment(stmt),
            NodeKind::NamespaceExportDeclaration { name } => {
                self.write_indent();
                self.write("export as namespace ");
                self.emit_entity_name(*name);
                self.write(";");
                self.write_line();
            }
            other => trace!(kind = other.kind_name(), "statement kind not printed"),
        }
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    fn emit_function_declaration(&mut self, func: NodeIndex) {
        let Some(NodeKind::FunctionDeclaration {
            modifiers,
            name,
            type_parameters,
            parameters,
            return_type,
            ..
        }) = self.arena.kind(func)
        else {
            return;
        };

        self.write_indent();
        self.emit_statement_modifiers(*modifiers);
        // Anonymous default exports print as `function (...)`.
        self.write("function ");
        if name.is_some() {
            self.emit_property_name(*name);
        }
        self.emit_type_parameters(type_parameters);
        self.emit_parameters(parameters);
        self.emit_return_type(*return_type);
        self.write(";");
        self.write_line();
    }

    fn emit_class_declaration(&mut self, class: NodeIndex) {
        let Some(NodeKind::ClassDeclaration {
            modifiers,
            name,
            type_parameters,
            heritage_clauses,
            members,
        }) = self.arena.kind(class)
        else {
            return;
        };

        self.write_indent();
        self.emit_statement_modifiers(*modifiers);
        if modifiers.contains(ModifierFlags::ABSTRACT) {
            self.write("abstract ");
        }
        self.write("class");
        if name.is_some() {
            self.write(" ");
            self.emit_property_name(*name);
        }
        self.emit_type_parameters(type_parameters);
        self.emit_heritage_clauses(heritage_clauses);
        self.write(" {");
        self.write_line();
        self.increase_indent();
        self.emit_class_members(members);
        self.decrease_indent();
        self.write_indent();
        self.write("}");
        self.write_line();
    }

    fn emit_interface_declaration(&mut self, iface: NodeIndex) {
        let Some(NodeKind::InterfaceDeclaration {
            modifiers,
            name,
            type_parameters,
            heritage_clauses,
            members,
        }) = self.arena.kind(iface)
        else {
            return;
        };

        self.write_indent();
        self.emit_statement_modifiers(*modifiers);
        self.write("interface ");
        self.emit_property_name(*name);
        self.emit_type_parameters(type_parameters);
        self.emit_heritage_clauses(heritage_clauses);
        self.write(" {");
        self.write_line();
        self.increase_indent();
        for &member in members {
            self.emit_jsdoc(member);
            self.write_indent();
            self.emit_type_member(member);
            self.write_line();
        }
        self.decrease_indent();
        self.write_indent();
        self.write("}");
        self.write_line();
    }

    fn emit_type_alias_declaration(&mut self, alias: NodeIndex) {
        let Some(NodeKind::TypeAliasDeclaration {
            modifiers,
            name,
            type_parameters,
            type_node,
        }) = self.arena.kind(alias)
        else {
            return;
        };

        self.write_indent();
        self.emit_statement_modifiers(*modifiers);
        self.write("type ");
        self.emit_property_name(*name);
        self.emit_type_parameters(type_parameters);
        self.write(" = ");
        self.emit_type(*type_node);
        self.write(";");
        self.write_line();
    }

    fn emit_enum_declaration(&mut self, enum_decl: NodeIndex) {
        let Some(NodeKind::EnumDeclaration {
            modifiers,
            name,
            members,
        }) = self.arena.kind(enum_decl)
        else {
            return;
        };

        self.write_indent();
        self.emit_statement_modifiers(*modifiers);
        if modifiers.contains(ModifierFlags::CONST) {
            self.write("const ");
        }
        self.write("enum ");
        self.emit_property_name(*name);
        self.write(" {");
        self.write_line();
        self.increase_indent();
        for (i, &member) in members.iter().enumerate() {
            let Some(NodeKind::EnumMember { name, initializer }) = self.arena.kind(member) else {
                continue;
            };
            self.emit_jsdoc(member);
            self.write_indent();
            self.emit_property_name(*name);
            if initializer.is_some() {
                self.write(" = ");
                self.emit_expression(*initializer);
            }
            if i + 1 < members.len() {
                self.write(",");
            }
            self.write_line();
        }
        self.decrease_indent();
        self.write_indent();
        self.write("}");
        self.write_line();
    }

    fn emit_variable_statement(&mut self, stmt: NodeIndex) {
        let Some(NodeKind::VariableStatement {
            modifiers,
            kind,
            declarations,
        }) = self.arena.kind(stmt)
        else {
            return;
        };

        self.write_indent();
        self.emit_statement_modifiers(*modifiers);
        self.write(kind.as_str());
        self.write(" ");
        for (i, &decl) in declarations.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.emit_variable_declaration(decl, *kind);
        }
        self.write(";");
        self.write_line();
    }

    fn emit_variable_declaration(&mut self, decl: NodeIndex, kind: VariableKind) {
        let Some(NodeKind::VariableDeclaration {
            name,
            type_annotation,
            initializer,
            ..
        }) = self.arena.kind(decl)
        else {
            return;
        };

        self.emit_binding_name(*name);
        if type_annotation.is_some() {
            self.write(": ");
            self.emit_type(*type_annotation);
        } else if kind == VariableKind::Const && helpers::is_literal_expression(self.arena, *initializer) {
            self.write(" = ");
            self.emit_expression(*initializer);
        }
    }

    fn emit_module_declaration(&mut self, module: NodeIndex) {
        let Some(NodeKind::ModuleDeclaration {
            modifiers,
            kind,
            name,
            body,
        }) = self.arena.kind(module)
        else {
            return;
        };

        self.write_indent();
        self.emit_statement_modifiers(*modifiers);
        match kind {
            ModuleDeclarationKind::Global => self.write("global"),
            ModuleDeclarationKind::Namespace => {
                self.write("namespace ");
                self.emit_property_name(*name);
            }
            ModuleDeclarationKind::Module => {
                self.write("module ");
                self.emit_property_name(*name);
            }
        }

        // `namespace A.B.C {}` nests declarations through the body.
        let mut body = *body;
        while let Some(NodeKind::ModuleDeclaration {
            name: inner_name,
            body: inner_body,
            ..
        }) = self.arena.kind(body)
        {
            self.write(".");
            self.emit_property_name(*inner_name);
            body = *inner_body;
        }

        let Some(NodeKind::ModuleBlock { statements }) = self.arena.kind(body) else {
            self.write(";");
            self.write_line();
            return;
        };

        self.write(" {");
        self.write_line();
        self.increase_indent();
        let arena = self.arena;
        for &stmt in statements {
            if !helpers::is_overload_implementation(arena, statements, stmt) {
                self.emit_statement(stmt);
            }
        }
        self.decrease_indent();
        self.write_indent();
        self.write("}");
        self.write_line();
    }

    // =========================================================================
    // Imports and exports
    // =========================================================================

    fn emit_import_declaration(&mut self, import: NodeIndex) {
        let Some(NodeKind::ImportDeclaration {
            import_clause,
            module_specifier,
        }) = self.arena.kind(import)
        else {
            return;
        };

        self.write_indent();
        self.write("import ");
        if let Some(NodeKind::ImportClause {
            is_type_only,
            name,
            named_bindings,
        }) = self.arena.kind(*import_clause)
        {
            if *is_type_only {
                self.write("type ");
            }
            if name.is_some() {
                self.emit_property_name(*name);
                if named_bindings.is_some() {
                    self.write(", ");
                }
            }
            match self.arena.kind(*named_bindings) {
                Some(NodeKind::NamespaceImport { name }) => {
                    self.write("* as ");
                    self.emit_property_name(*name);
                }
                Some(NodeKind::NamedImports { elements }) => self.emit_named_bindings(elements),
                _ => {}
            }
            self.write(" from ");
        }
        self.emit_expression(*module_specifier);
        self.write(";");
        self.write_line();
    }

    fn emit_import_equals_declaration(&mut self, import: NodeIndex) {
        let Some(NodeKind::ImportEqualsDeclaration {
            modifiers,
            is_type_only,
            name,
            module_reference,
        }) = self.arena.kind(import)
        else {
            return;
        };

        self.write_indent();
        if modifiers.contains(ModifierFlags::EXPORT) {
            self.write("export ");
        }
        self.write("import ");
        if *is_type_only {
            self.write("type ");
        }
        self.emit_property_name(*name);
        self.write(" = ");
        match self.arena.kind(*module_reference) {
            Some(NodeKind::ExternalModuleReference { expression }) => {
                self.write("require(");
                self.emit_expression(*expression);
                self.write(")");
            }
            _ => self.emit_entity_name(*module_reference),
        }
        self.write(";");
        self.write_line();
    }

    fn emit_export_declaration(&mut self, export: NodeIndex) {
        let Some(NodeKind::ExportDeclaration {
            is_type_only,
            export_clause,
            module_specifier,
        }) = self.arena.kind(export)
        else {
            return;
        };

        self.write_indent();
        self.write("export ");
        if *is_type_only {
            self.write("type ");
        }
        match self.arena.kind(*export_clause) {
            Some(NodeKind::NamedExports { elements }) => self.emit_named_bindings(elements),
            Some(NodeKind::NamespaceExport { name }) => {
                self.write("* as ");
                self.emit_property_name(*name);
            }
            _ => self.write("*"),
        }
        if module_specifier.is_some() {
            self.write(" from ");
            self.emit_expression(*module_specifier);
        }
        self.write(";");
        self.write_line();
    }

    /// `{ a, b as c, type D }` for import and export specifier lists.
    fn emit_named_bindings(&mut self, elements: &[NodeIndex]) {
        if elements.is_empty() {
            self.write("{}");
            return;
        }
        self.write("{ ");
        for (i, &element) in elements.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            let (is_type_only, property_name, name) = match self.arena.kind(element) {
                Some(NodeKind::ImportSpecifier {
                    is_type_only,
                    property_name,
                    name,
                })
                | Some(NodeKind::ExportSpecifier {
                    is_type_only,
                    property_name,
                    name,
                }) => (*is_type_only, *property_name, *name),
                _ => continue,
            };
            if is_type_only {
                self.write("type ");
            }
            if property_name.is_some() {
                self.emit_property_name(property_name);
                self.write(" as ");
            }
            self.emit_property_name(name);
        }
        self.write(" }");
    }

    fn emit_export_assignment(&mut self, assignment: NodeIndex) {
        let Some(NodeKind::ExportAssignment {
            is_export_equals,
            expression,
        }) = self.arena.kind(assignment)
        else {
            return;
        };

        self.write_indent();
        self.write(if *is_export_equals {
            "export = "
        } else {
            "export default "
        });
        self.emit_expression(*expression);
        self.write(";");
        self.write_line();
    }

    /// `export default declare` in source order, as carried by the node.
    fn emit_statement_modifiers(&mut self, modifiers: ModifierFlags) {
        if modifiers.contains(ModifierFlags::EXPORT) {
            self.write("export ");
        }
        if modifiers.contains(ModifierFlags::DEFAULT) {
            self.write("default ");
        }
        if modifiers.contains(ModifierFlags::DECLARE) {
            self.write("declare ");
        }
    }
}
