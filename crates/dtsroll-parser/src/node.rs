//! AST node definitions.
//!
//! Nodes live in a [`NodeArena`](crate::NodeArena) and refer to each other by
//! [`NodeIndex`]. `NodeKind` is a closed sum type: every consumer matches on it
//! exhaustively, and source the declaration surface does not model is kept as
//! `OpaqueExpression`/`OpaqueStatement` so nothing is silently dropped.

use bitflags::bitflags;
use dtsroll_common::Span;

/// Index of a node in its arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(pub u32);

impl NodeIndex {
    pub const NONE: NodeIndex = NodeIndex(u32::MAX);

    #[inline]
    pub fn is_none(self) -> bool {
        self == NodeIndex::NONE
    }

    #[inline]
    pub fn is_some(self) -> bool {
        self != NodeIndex::NONE
    }
}

impl Default for NodeIndex {
    fn default() -> Self {
        NodeIndex::NONE
    }
}

pub type NodeList = Vec<NodeIndex>;

bitflags! {
    /// Declaration and member modifiers.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ModifierFlags: u32 {
        const EXPORT    = 1 << 0;
        const DEFAULT   = 1 << 1;
        const DECLARE   = 1 << 2;
        const CONST     = 1 << 3;
        const STATIC    = 1 << 4;
        const READONLY  = 1 << 5;
        const PUBLIC    = 1 << 6;
        const PRIVATE   = 1 << 7;
        const PROTECTED = 1 << 8;
        const ABSTRACT  = 1 << 9;
        const ASYNC     = 1 << 10;
        const OVERRIDE  = 1 << 11;
        const ACCESSOR  = 1 << 12;
        const IN        = 1 << 13;
        const OUT       = 1 << 14;

        const ACCESSIBILITY = Self::PUBLIC.bits() | Self::PRIVATE.bits() | Self::PROTECTED.bits();
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VariableKind {
    Var,
    Let,
    Const,
}

impl VariableKind {
    pub fn as_str(self) -> &'static str {
        match self {
            VariableKind::Var => "var",
            VariableKind::Let => "let",
            VariableKind::Const => "const",
        }
    }
}

/// Primitive keyword types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeywordType {
    Any,
    Unknown,
    Number,
    BigInt,
    String,
    Boolean,
    Symbol,
    Object,
    Void,
    Undefined,
    Null,
    Never,
    Intrinsic,
}

impl KeywordType {
    pub fn as_str(self) -> &'static str {
        match self {
            KeywordType::Any => "any",
            KeywordType::Unknown => "unknown",
            KeywordType::Number => "number",
            KeywordType::BigInt => "bigint",
            KeywordType::String => "string",
            KeywordType::Boolean => "boolean",
            KeywordType::Symbol => "symbol",
            KeywordType::Object => "object",
            KeywordType::Void => "void",
            KeywordType::Undefined => "undefined",
            KeywordType::Null => "null",
            KeywordType::Never => "never",
            KeywordType::Intrinsic => "intrinsic",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeOperatorKind {
    KeyOf,
    Unique,
    Readonly,
}

impl TypeOperatorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TypeOperatorKind::KeyOf => "keyof",
            TypeOperatorKind::Unique => "unique",
            TypeOperatorKind::Readonly => "readonly",
        }
    }
}

/// `readonly`/`?` modifier on a mapped type, with its optional `+`/`-` sign.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MappedModifier {
    Present,
    Plus,
    Minus,
}

impl MappedModifier {
    pub fn prefix(self) -> &'static str {
        match self {
            MappedModifier::Present => "",
            MappedModifier::Plus => "+",
            MappedModifier::Minus => "-",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HeritageToken {
    Extends,
    Implements,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ModuleDeclarationKind {
    /// `namespace A {}`
    Namespace,
    /// `module A {}` or `module "a" {}`
    Module,
    /// `declare global {}`
    Global,
}

/// A node in the arena.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
    pub parent: NodeIndex,
}

#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    SourceFile {
        statements: NodeList,
        /// The file has at least one top-level import or export.
        is_external_module: bool,
    },

    // =========================================================================
    // Names and expressions
    // =========================================================================
    Identifier {
        text: String,
    },
    PrivateIdentifier {
        text: String,
    },
    QualifiedName {
        left: NodeIndex,
        right: NodeIndex,
    },
    ComputedPropertyName {
        expression: NodeIndex,
    },
    /// Cooked string value; printers re-quote it.
    StringLiteral {
        text: String,
    },
    NumericLiteral {
        text: String,
    },
    BigIntLiteral {
        text: String,
    },
    BooleanLiteral {
        value: bool,
    },
    NullLiteral,
    /// Raw template text including the backticks.
    TemplateLiteral {
        text: String,
    },
    PropertyAccessExpression {
        expression: NodeIndex,
        name: NodeIndex,
    },
    /// Expression kept only as source text (initializers, call arguments).
    OpaqueExpression {
        text: String,
    },
    /// Only built for variable initializers made of literals.
    ObjectLiteralExpression {
        properties: NodeList,
    },
    /// `name: value`, or shorthand `name` with a `NONE` initializer.
    PropertyAssignment {
        name: NodeIndex,
        initializer: NodeIndex,
    },
    ArrayLiteralExpression {
        elements: NodeList,
    },

    // =========================================================================
    // Statements and declarations
    // =========================================================================
    VariableStatement {
        modifiers: ModifierFlags,
        kind: VariableKind,
        declarations: NodeList,
    },
    VariableDeclaration {
        name: NodeIndex,
        exclamation: bool,
        type_annotation: NodeIndex,
        initializer: NodeIndex,
    },
    ObjectBindingPattern {
        elements: NodeList,
    },
    ArrayBindingPattern {
        elements: NodeList,
    },
    /// One pattern slot. An array hole has a `NONE` name.
    BindingElement {
        dot_dot_dot: bool,
        property_name: NodeIndex,
        name: NodeIndex,
        initializer: NodeIndex,
    },
    FunctionDeclaration {
        modifiers: ModifierFlags,
        /// `NONE` for `export default function () {}`.
        name: NodeIndex,
        type_parameters: NodeList,
        parameters: NodeList,
        return_type: NodeIndex,
        has_body: bool,
    },
    ClassDeclaration {
        modifiers: ModifierFlags,
        name: NodeIndex,
        type_parameters: NodeList,
        heritage_clauses: NodeList,
        members: NodeList,
    },
    InterfaceDeclaration {
        modifiers: ModifierFlags,
        name: NodeIndex,
        type_parameters: NodeList,
        heritage_clauses: NodeList,
        members: NodeList,
    },
    TypeAliasDeclaration {
        modifiers: ModifierFlags,
        name: NodeIndex,
        type_parameters: NodeList,
        type_node: NodeIndex,
    },
    EnumDeclaration {
        modifiers: ModifierFlags,
        name: NodeIndex,
        members: NodeList,
    },
    EnumMember {
        name: NodeIndex,
        initializer: NodeIndex,
    },
    ModuleDeclaration {
        modifiers: ModifierFlags,
        kind: ModuleDeclarationKind,
        /// Identifier, or a string literal for ambient external modules.
        name: NodeIndex,
        /// A `ModuleBlock`, a nested `ModuleDeclaration` for dotted names, or
        /// `NONE` for shorthand `declare module "x";`.
        body: NodeIndex,
    },
    ModuleBlock {
        statements: NodeList,
    },
    ImportDeclaration {
        /// `NONE` for side-effect imports (`import "x";`).
        import_clause: NodeIndex,
        module_specifier: NodeIndex,
    },
    ImportClause {
        is_type_only: bool,
        /// Default import binding.
        name: NodeIndex,
        /// `NamespaceImport` or `NamedImports`.
        named_bindings: NodeIndex,
    },
    NamespaceImport {
        name: NodeIndex,
    },
    NamedImports {
        elements: NodeList,
    },
    ImportSpecifier {
        is_type_only: bool,
        property_name: NodeIndex,
        name: NodeIndex,
    },
    ImportEqualsDeclaration {
        modifiers: ModifierFlags,
        is_type_only: bool,
        name: NodeIndex,
        /// An entity name or `ExternalModuleReference`.
        module_reference: NodeIndex,
    },
    ExternalModuleReference {
        expression: NodeIndex,
    },
    ExportDeclaration {
        is_type_only: bool,
        /// `NamedExports`, `NamespaceExport`, or `NONE` for `export *`.
        export_clause: NodeIndex,
        module_specifier: NodeIndex,
    },
    NamedExports {
        elements: NodeList,
    },
    NamespaceExport {
        name: NodeIndex,
    },
    ExportSpecifier {
        is_type_only: bool,
        property_name: NodeIndex,
        name: NodeIndex,
    },
    ExportAssignment {
        is_export_equals: bool,
        expression: NodeIndex,
    },
    /// `export as namespace Name;`
    NamespaceExportDeclaration {
        name: NodeIndex,
    },
    /// A statement with no declaration content (control flow, expressions).
    OpaqueStatement,

    // =========================================================================
    // Members and signatures
    // =========================================================================
    PropertyDeclaration {
        modifiers: ModifierFlags,
        name: NodeIndex,
        question: bool,
        exclamation: bool,
        type_annotation: NodeIndex,
        initializer: NodeIndex,
    },
    MethodDeclaration {
        modifiers: ModifierFlags,
        name: NodeIndex,
        question: bool,
        type_parameters: NodeList,
        parameters: NodeList,
        return_type: NodeIndex,
        has_body: bool,
    },
    Constructor {
        modifiers: ModifierFlags,
        parameters: NodeList,
        has_body: bool,
    },
    GetAccessor {
        modifiers: ModifierFlags,
        name: NodeIndex,
        parameters: NodeList,
        return_type: NodeIndex,
    },
    SetAccessor {
        modifiers: ModifierFlags,
        name: NodeIndex,
        parameters: NodeList,
    },
    IndexSignature {
        modifiers: ModifierFlags,
        parameters: NodeList,
        type_annotation: NodeIndex,
    },
    PropertySignature {
        modifiers: ModifierFlags,
        name: NodeIndex,
        question: bool,
        type_annotation: NodeIndex,
    },
    MethodSignature {
        name: NodeIndex,
        question: bool,
        type_parameters: NodeList,
        parameters: NodeList,
        return_type: NodeIndex,
    },
    CallSignature {
        type_parameters: NodeList,
        parameters: NodeList,
        return_type: NodeIndex,
    },
    ConstructSignature {
        type_parameters: NodeList,
        parameters: NodeList,
        return_type: NodeIndex,
    },
    Parameter {
        modifiers: ModifierFlags,
        dot_dot_dot: bool,
        /// Identifier, `this`, or an opaque binding pattern.
        name: NodeIndex,
        question: bool,
        type_annotation: NodeIndex,
        initializer: NodeIndex,
    },
    TypeParameter {
        modifiers: ModifierFlags,
        name: NodeIndex,
        constraint: NodeIndex,
        default: NodeIndex,
    },
    HeritageClause {
        token: HeritageToken,
        types: NodeList,
    },
    ExpressionWithTypeArguments {
        expression: NodeIndex,
        type_arguments: NodeList,
    },

    // =========================================================================
    // Types
    // =========================================================================
    KeywordType {
        keyword: KeywordType,
    },
    ThisType,
    LiteralType {
        literal: NodeIndex,
    },
    TypeReference {
        type_name: NodeIndex,
        type_arguments: NodeList,
    },
    ArrayType {
        element_type: NodeIndex,
    },
    TupleType {
        elements: NodeList,
    },
    NamedTupleMember {
        dot_dot_dot: bool,
        name: NodeIndex,
        question: bool,
        type_node: NodeIndex,
    },
    OptionalType {
        type_node: NodeIndex,
    },
    RestType {
        type_node: NodeIndex,
    },
    UnionType {
        types: NodeList,
    },
    IntersectionType {
        types: NodeList,
    },
    FunctionType {
        type_parameters: NodeList,
        parameters: NodeList,
        return_type: NodeIndex,
    },
    ConstructorType {
        is_abstract: bool,
        type_parameters: NodeList,
        parameters: NodeList,
        return_type: NodeIndex,
    },
    TypeLiteral {
        members: NodeList,
    },
    ParenthesizedType {
        type_node: NodeIndex,
    },
    TypeOperator {
        operator: TypeOperatorKind,
        type_node: NodeIndex,
    },
    IndexedAccessType {
        object_type: NodeIndex,
        index_type: NodeIndex,
    },
    MappedType {
        readonly_token: Option<MappedModifier>,
        type_parameter: NodeIndex,
        name_type: NodeIndex,
        question_token: Option<MappedModifier>,
        type_node: NodeIndex,
    },
    ConditionalType {
        check_type: NodeIndex,
        extends_type: NodeIndex,
        true_type: NodeIndex,
        false_type: NodeIndex,
    },
    InferType {
        type_parameter: NodeIndex,
    },
    TypeQuery {
        expr_name: NodeIndex,
        type_arguments: NodeList,
    },
    ImportType {
        is_type_of: bool,
        /// String literal module specifier.
        argument: NodeIndex,
        qualifier: NodeIndex,
        type_arguments: NodeList,
    },
    TypePredicate {
        asserts: bool,
        /// Identifier or `ThisType`.
        parameter_name: NodeIndex,
        type_node: NodeIndex,
    },
    /// Raw head text plus `TemplateLiteralTypeSpan`s.
    TemplateLiteralType {
        head: String,
        spans: NodeList,
    },
    TemplateLiteralTypeSpan {
        type_node: NodeIndex,
        /// Raw text following the substitution.
        literal: String,
        is_tail: bool,
    },
}

/// Visit each child index of a node kind in source order. The same arm list
/// serves `&NodeKind` and `&mut NodeKind`.
macro_rules! each_child {
    ($kind:expr, $visit:ident) => {
        match $kind {
            NodeKind::SourceFile { statements, .. } | NodeKind::ModuleBlock { statements } => {
                for n in statements {
                    $visit(n);
                }
            }
            NodeKind::Identifier { .. }
            | NodeKind::PrivateIdentifier { .. }
            | NodeKind::StringLiteral { .. }
            | NodeKind::NumericLiteral { .. }
            | NodeKind::BigIntLiteral { .. }
            | NodeKind::BooleanLiteral { .. }
            | NodeKind::NullLiteral
            | NodeKind::TemplateLiteral { .. }
            | NodeKind::OpaqueExpression { .. }
            | NodeKind::OpaqueStatement
            | NodeKind::KeywordType { .. }
            | NodeKind::ThisType => {}
            NodeKind::QualifiedName { left, right } => {
                $visit(left);
                $visit(right);
            }
            NodeKind::ComputedPropertyName { expression }
            | NodeKind::ExternalModuleReference { expression }
            | NodeKind::ExportAssignment { expression, .. } => $visit(expression),
            NodeKind::PropertyAccessExpression { expression, name } => {
                $visit(expression);
                $visit(name);
            }
            NodeKind::ObjectLiteralExpression { properties: elements }
            | NodeKind::ArrayLiteralExpression { elements }
            | NodeKind::ObjectBindingPattern { elements }
            | NodeKind::ArrayBindingPattern { elements } => {
                for n in elements {
                    $visit(n);
                }
            }
            NodeKind::PropertyAssignment { name, initializer } => {
                $visit(name);
                $visit(initializer);
            }
            NodeKind::BindingElement {
                property_name,
                name,
                initializer,
                ..
            } => {
                $visit(property_name);
                $visit(name);
                $visit(initializer);
            }
            NodeKind::VariableStatement { declarations, .. } => {
                for n in declarations {
                    $visit(n);
                }
            }
            NodeKind::VariableDeclaration {
                name,
                type_annotation,
                initializer,
                ..
            } => {
                $visit(name);
                $visit(type_annotation);
                $visit(initializer);
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
            } => {
                $visit(name);
                for n in type_parameters {
                    $visit(n);
                }
                for n in parameters {
                    $visit(n);
                }
                $visit(return_type);
            }
            NodeKind::ClassDeclaration {
                name,
                type_parameters,
                heritage_clauses,
                members,
                ..
            }
            | NodeKind::InterfaceDeclaration {
                name,
                type_parameters,
                heritage_clauses,
                members,
                ..
            } => {
                $visit(name);
                for n in type_parameters {
                    $visit(n);
                }
                for n in heritage_clauses {
                    $visit(n);
                }
                for n in members {
                    $visit(n);
                }
            }
            NodeKind::TypeAliasDeclaration {
                name,
                type_parameters,
                type_node,
                ..
            } => {
                $visit(name);
                for n in type_parameters {
                    $visit(n);
                }
                $visit(type_node);
            }
            NodeKind::EnumDeclaration { name, members, .. } => {
                $visit(name);
                for n in members {
                    $visit(n);
                }
            }
            NodeKind::EnumMember { name, initializer } => {
                $visit(name);
                $visit(initializer);
            }
            NodeKind::ModuleDeclaration { name, body, .. } => {
                $visit(name);
                $visit(body);
            }
            NodeKind::ImportDeclaration {
                import_clause,
                module_specifier,
            } => {
                $visit(import_clause);
                $visit(module_specifier);
            }
            NodeKind::ImportClause {
                name,
                named_bindings,
                ..
            } => {
                $visit(name);
                $visit(named_bindings);
            }
            NodeKind::NamespaceImport { name }
            | NodeKind::NamespaceExport { name }
            | NodeKind::NamespaceExportDeclaration { name } => $visit(name),
            NodeKind::NamedImports { elements } | NodeKind::NamedExports { elements } => {
                for n in elements {
                    $visit(n);
                }
            }
            NodeKind::ImportSpecifier {
                property_name,
                name,
                ..
            }
            | NodeKind::ExportSpecifier {
                property_name,
                name,
                ..
            } => {
                $visit(property_name);
                $visit(name);
            }
            NodeKind::ImportEqualsDeclaration {
                name,
                module_reference,
                ..
            } => {
                $visit(name);
                $visit(module_reference);
            }
            NodeKind::ExportDeclaration {
                export_clause,
                module_specifier,
                ..
            } => {
                $visit(export_clause);
                $visit(module_specifier);
            }
            NodeKind::PropertyDeclaration {
                name,
                type_annotation,
                initializer,
                ..
            } => {
                $visit(name);
                $visit(type_annotation);
                $visit(initializer);
            }
            NodeKind::Constructor { parameters, .. } => {
                for n in parameters {
                    $visit(n);
                }
            }
            NodeKind::SetAccessor {
                name, parameters, ..
            } => {
                $visit(name);
                for n in parameters {
                    $visit(n);
                }
            }
            NodeKind::GetAccessor {
                name,
                parameters,
                return_type,
                ..
            } => {
                $visit(name);
                for n in parameters {
                    $visit(n);
                }
                $visit(return_type);
            }
            NodeKind::IndexSignature {
                parameters,
                type_annotation,
                ..
            } => {
                for n in parameters {
                    $visit(n);
                }
                $visit(type_annotation);
            }
            NodeKind::PropertySignature {
                name,
                type_annotation,
                ..
            } => {
                $visit(name);
                $visit(type_annotation);
            }
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
            } => {
                for n in type_parameters {
                    $visit(n);
                }
                for n in parameters {
                    $visit(n);
                }
                $visit(return_type);
            }
            NodeKind::Parameter {
                name,
                type_annotation,
                initializer,
                ..
            } => {
                $visit(name);
                $visit(type_annotation);
                $visit(initializer);
            }
            NodeKind::TypeParameter {
                name,
                constraint,
                default,
                ..
            } => {
                $visit(name);
                $visit(constraint);
                $visit(default);
            }
            NodeKind::HeritageClause { types, .. } => {
                for n in types {
                    $visit(n);
                }
            }
            NodeKind::ExpressionWithTypeArguments {
                expression,
                type_arguments,
            } => {
                $visit(expression);
                for n in type_arguments {
                    $visit(n);
                }
            }
            NodeKind::LiteralType { literal } => $visit(literal),
            NodeKind::TypeReference {
                type_name,
                type_arguments,
            } => {
                $visit(type_name);
                for n in type_arguments {
                    $visit(n);
                }
            }
            NodeKind::ArrayType { element_type } => $visit(element_type),
            NodeKind::TupleType { elements } => {
                for n in elements {
                    $visit(n);
                }
            }
            NodeKind::NamedTupleMember {
                name, type_node, ..
            } => {
                $visit(name);
                $visit(type_node);
            }
            NodeKind::OptionalType { type_node }
            | NodeKind::RestType { type_node }
            | NodeKind::ParenthesizedType { type_node }
            | NodeKind::TypeOperator { type_node, .. }
            | NodeKind::TemplateLiteralTypeSpan { type_node, .. } => $visit(type_node),
            NodeKind::UnionType { types } | NodeKind::IntersectionType { types } => {
                for n in types {
                    $visit(n);
                }
            }
            NodeKind::TypeLiteral { members } => {
                for n in members {
                    $visit(n);
                }
            }
            NodeKind::IndexedAccessType {
                object_type,
                index_type,
            } => {
                $visit(object_type);
                $visit(index_type);
            }
            NodeKind::MappedType {
                type_parameter,
                name_type,
                type_node,
                ..
            } => {
                $visit(type_parameter);
                $visit(name_type);
                $visit(type_node);
            }
            NodeKind::ConditionalType {
                check_type,
                extends_type,
                true_type,
                false_type,
            } => {
                $visit(check_type);
                $visit(extends_type);
                $visit(true_type);
                $visit(false_type);
            }
            NodeKind::InferType { type_parameter } => $visit(type_parameter),
            NodeKind::TypeQuery {
                expr_name,
                type_arguments,
            } => {
                $visit(expr_name);
                for n in type_arguments {
                    $visit(n);
                }
            }
            NodeKind::ImportType {
                argument,
                qualifier,
                type_arguments,
                ..
            } => {
                $visit(argument);
                $visit(qualifier);
                for n in type_arguments {
                    $visit(n);
                }
            }
            NodeKind::TypePredicate {
                parameter_name,
                type_node,
                ..
            } => {
                $visit(parameter_name);
                $visit(type_node);
            }
            NodeKind::TemplateLiteralType { spans, .. } => {
                for n in spans {
                    $visit(n);
                }
            }
        }
    };
}

impl NodeKind {
    /// Call `f` for every present child, in source order.
    pub fn for_each_child(&self, mut f: impl FnMut(NodeIndex)) {
        let mut visit = |n: &NodeIndex| {
            if n.is_some() {
                f(*n);
            }
        };
        each_child!(self, visit);
    }

    /// Call `f` with a mutable reference to every present child slot.
    pub fn for_each_child_mut(&mut self, mut f: impl FnMut(&mut NodeIndex)) {
        let mut visit = |n: &mut NodeIndex| {
            if n.is_some() {
                f(n);
            }
        };
        each_child!(self, visit);
    }

    pub fn children(&self) -> smallvec::SmallVec<[NodeIndex; 8]> {
        let mut out = smallvec::SmallVec::new();
        self.for_each_child(|n| out.push(n));
        out
    }

    /// Modifiers of a declaration or member; empty for other kinds.
    pub fn modifiers(&self) -> ModifierFlags {
        match self {
            NodeKind::VariableStatement { modifiers, .. }
            | NodeKind::FunctionDeclaration { modifiers, .. }
            | NodeKind::ClassDeclaration { modifiers, .. }
            | NodeKind::InterfaceDeclaration { modifiers, .. }
            | NodeKind::TypeAliasDeclaration { modifiers, .. }
            | NodeKind::EnumDeclaration { modifiers, .. }
            | NodeKind::ModuleDeclaration { modifiers, .. }
            | NodeKind::ImportEqualsDeclaration { modifiers, .. }
            | NodeKind::PropertyDeclaration { modifiers, .. }
            | NodeKind::MethodDeclaration { modifiers, .. }
            | NodeKind::Constructor { modifiers, .. }
            | NodeKind::GetAccessor { modifiers, .. }
            | NodeKind::SetAccessor { modifiers, .. }
            | NodeKind::IndexSignature { modifiers, .. }
            | NodeKind::PropertySignature { modifiers, .. }
            | NodeKind::Parameter { modifiers, .. }
            | NodeKind::TypeParameter { modifiers, .. } => *modifiers,
            _ => ModifierFlags::empty(),
        }
    }

    /// Mutable modifiers, for kinds that carry them.
    pub fn modifiers_mut(&mut self) -> Option<&mut ModifierFlags> {
        match self {
            NodeKind::VariableStatement { modifiers, .. }
            | NodeKind::FunctionDeclaration { modifiers, .. }
            | NodeKind::ClassDeclaration { modifiers, .. }
            | NodeKind::InterfaceDeclaration { modifiers, .. }
            | NodeKind::TypeAliasDeclaration { modifiers, .. }
            | NodeKind::EnumDeclaration { modifiers, .. }
            | NodeKind::ModuleDeclaration { modifiers, .. }
            | NodeKind::ImportEqualsDeclaration { modifiers, .. }
            | NodeKind::PropertyDeclaration { modifiers, .. }
            | NodeKind::MethodDeclaration { modifiers, .. }
            | NodeKind::Constructor { modifiers, .. }
            | NodeKind::GetAccessor { modifiers, .. }
            | NodeKind::SetAccessor { modifiers, .. }
            | NodeKind::IndexSignature { modifiers, .. }
            | NodeKind::PropertySignature { modifiers, .. }
            | NodeKind::Parameter { modifiers, .. }
            | NodeKind::TypeParameter { modifiers, .. } => Some(modifiers),
            _ => None,
        }
    }

    /// The declared name node of a named declaration.
    pub fn name(&self) -> NodeIndex {
        match self {
            NodeKind::VariableDeclaration { name, .. }
            | NodeKind::BindingElement { name, .. }
            | NodeKind::FunctionDeclaration { name, .. }
            | NodeKind::ClassDeclaration { name, .. }
            | NodeKind::InterfaceDeclaration { name, .. }
            | NodeKind::TypeAliasDeclaration { name, .. }
            | NodeKind::EnumDeclaration { name, .. }
            | NodeKind::EnumMember { name, .. }
            | NodeKind::ModuleDeclaration { name, .. }
            | NodeKind::ImportEqualsDeclaration { name, .. }
            | NodeKind::NamespaceImport { name }
            | NodeKind::NamespaceExport { name }
            | NodeKind::ImportSpecifier { name, .. }
            | NodeKind::ExportSpecifier { name, .. }
            | NodeKind::PropertyDeclaration { name, .. }
            | NodeKind::MethodDeclaration { name, .. }
            | NodeKind::GetAccessor { name, .. }
            | NodeKind::SetAccessor { name, .. }
            | NodeKind::PropertySignature { name, .. }
            | NodeKind::MethodSignature { name, .. }
            | NodeKind::Parameter { name, .. }
            | NodeKind::TypeParameter { name, .. }
            | NodeKind::NamedTupleMember { name, .. }
            | NodeKind::ImportClause { name, .. } => *name,
            _ => NodeIndex::NONE,
        }
    }

    /// Short kind name for logs.
    pub fn kind_name(&self) -> &'static str {
        match self {
            NodeKind::SourceFile { .. } => "SourceFile",
            NodeKind::Identifier { .. } => "Identifier",
            NodeKind::PrivateIdentifier { .. } => "PrivateIdentifier",
            NodeKind::QualifiedName { .. } => "QualifiedName",
            NodeKind::ComputedPropertyName { .. } => "ComputedPropertyName",
            NodeKind::StringLiteral { .. } => "StringLiteral",
            NodeKind::NumericLiteral { .. } => "NumericLiteral",
            NodeKind::BigIntLiteral { .. } => "BigIntLiteral",
            NodeKind::BooleanLiteral { .. } => "BooleanLiteral",
            NodeKind::NullLiteral => "NullLiteral",
            NodeKind::TemplateLiteral { .. } => "TemplateLiteral",
            NodeKind::PropertyAccessExpression { .. } => "PropertyAccessExpression",
            NodeKind::OpaqueExpression { .. } => "OpaqueExpression",
            NodeKind::ObjectLiteralExpression { .. } => "ObjectLiteralExpression",
            NodeKind::PropertyAssignment { .. } => "PropertyAssignment",
            NodeKind::ArrayLiteralExpression { .. } => "ArrayLiteralExpression",
            NodeKind::VariableStatement { .. } => "VariableStatement",
            NodeKind::VariableDeclaration { .. } => "VariableDeclaration",
            NodeKind::ObjectBindingPattern { .. } => "ObjectBindingPattern",
            NodeKind::ArrayBindingPattern { .. } => "ArrayBindingPattern",
            NodeKind::BindingElement { .. } => "BindingElement",
            NodeKind::FunctionDeclaration { .. } => "FunctionDeclaration",
            NodeKind::ClassDeclaration { .. } => "ClassDeclaration",
            NodeKind::InterfaceDeclaration { .. } => "InterfaceDeclaration",
            NodeKind::TypeAliasDeclaration { .. } => "TypeAliasDeclaration",
            NodeKind::EnumDeclaration { .. } => "EnumDeclaration",
            NodeKind::EnumMember { .. } => "EnumMember",
            NodeKind::ModuleDeclaration { .. } => "ModuleDeclaration",
            NodeKind::ModuleBlock { .. } => "ModuleBlock",
            NodeKind::ImportDeclaration { .. } => "ImportDeclaration",
            NodeKind::ImportClause { .. } => "ImportClause",
            NodeKind::NamespaceImport { .. } => "NamespaceImport",
            NodeKind::NamedImports { .. } => "NamedImports",
            NodeKind::ImportSpecifier { .. } => "ImportSpecifier",
            NodeKind::ImportEqualsDeclaration { .. } => "ImportEqualsDeclaration",
            NodeKind::ExternalModuleReference { .. } => "ExternalModuleReference",
            NodeKind::ExportDeclaration { .. } => "ExportDeclaration",
            NodeKind::NamedExports { .. } => "NamedExports",
            NodeKind::NamespaceExport { .. } => "NamespaceExport",
            NodeKind::ExportSpecifier { .. } => "ExportSpecifier",
            NodeKind::ExportAssignment { .. } => "ExportAssignment",
            NodeKind::NamespaceExportDeclaration { .. } => "NamespaceExportDeclaration",
            NodeKind::OpaqueStatement => "OpaqueStatement",
            NodeKind::PropertyDeclaration { .. } => "PropertyDeclaration",
            NodeKind::MethodDeclaration { .. } => "MethodDeclaration",
            NodeKind::Constructor { .. } => "Constructor",
            NodeKind::GetAccessor { .. } => "GetAccessor",
            NodeKind::SetAccessor { .. } => "SetAccessor",
            NodeKind::IndexSignature { .. } => "IndexSignature",
            NodeKind::PropertySignature { .. } => "PropertySignature",
            NodeKind::MethodSignature { .. } => "MethodSignature",
            NodeKind::CallSignature { .. } => "CallSignature",
            NodeKind::ConstructSignature { .. } => "ConstructSignature",
            NodeKind::Parameter { .. } => "Parameter",
            NodeKind::TypeParameter { .. } => "TypeParameter",
            NodeKind::HeritageClause { .. } => "HeritageClause",
            NodeKind::ExpressionWithTypeArguments { .. } => "ExpressionWithTypeArguments",
            NodeKind::KeywordType { .. } => "KeywordType",
            NodeKind::ThisType => "ThisType",
            NodeKind::LiteralType { .. } => "LiteralType",
            NodeKind::TypeReference { .. } => "TypeReference",
            NodeKind::ArrayType { .. } => "ArrayType",
            NodeKind::TupleType { .. } => "TupleType",
            NodeKind::NamedTupleMember { .. } => "NamedTupleMember",
            NodeKind::OptionalType { .. } => "OptionalType",
            NodeKind::RestType { .. } => "RestType",
            NodeKind::UnionType { .. } => "UnionType",
            NodeKind::IntersectionType { .. } => "IntersectionType",
            NodeKind::FunctionType { .. } => "FunctionType",
            NodeKind::ConstructorType { .. } => "ConstructorType",
            NodeKind::TypeLiteral { .. } => "TypeLiteral",
            NodeKind::ParenthesizedType { .. } => "ParenthesizedType",
            NodeKind::TypeOperator { .. } => "TypeOperator",
            NodeKind::IndexedAccessType { .. } => "IndexedAccessType",
            NodeKind::MappedType { .. } => "MappedType",
            NodeKind::ConditionalType { .. } => "ConditionalType",
            NodeKind::InferType { .. } => "InferType",
            NodeKind::TypeQuery { .. } => "TypeQuery",
            NodeKind::ImportType { .. } => "ImportType",
            NodeKind::TypePredicate { .. } => "TypePredicate",
            NodeKind::TemplateLiteralType { .. } => "TemplateLiteralType",
            NodeKind::TemplateLiteralTypeSpan { .. } => "TemplateLiteralTypeSpan",
        }
    }

    pub fn is_declaration_statement(&self) -> bool {
        matches!(
            self,
            NodeKind::VariableStatement { .. }
                | NodeKind::FunctionDeclaration { .. }
                | NodeKind::ClassDeclaration { .. }
                | NodeKind::InterfaceDeclaration { .. }
                | NodeKind::TypeAliasDeclaration { .. }
                | NodeKind::EnumDeclaration { .. }
                | NodeKind::ModuleDeclaration { .. }
        )
    }
}
