//! Symbols, symbol flags and the program-wide symbol arena.

use bitflags::bitflags;
use dtsroll_parser::NodeIndex;
use indexmap::IndexMap;
use smallvec::SmallVec;

/// Identity of a symbol. Sequential in allocation order; symbols are never
/// compared by name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(pub u32);

/// Index of a file in its [`Program`](crate::Program).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(pub u32);

/// A node in a specific file's arena. `NodeIndex` values are only meaningful
/// together with the arena they came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeRef {
    pub file: FileId,
    pub node: NodeIndex,
}

impl NodeRef {
    pub fn new(file: FileId, node: NodeIndex) -> NodeRef {
        NodeRef { file, node }
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct SymbolFlags: u32 {
        const FUNCTION_SCOPED_VARIABLE = 1 << 0;
        const BLOCK_SCOPED_VARIABLE    = 1 << 1;
        const PROPERTY                 = 1 << 2;
        const ENUM_MEMBER              = 1 << 3;
        const FUNCTION                 = 1 << 4;
        const CLASS                    = 1 << 5;
        const INTERFACE                = 1 << 6;
        const CONST_ENUM               = 1 << 7;
        const REGULAR_ENUM             = 1 << 8;
        const VALUE_MODULE             = 1 << 9;
        const NAMESPACE_MODULE         = 1 << 10;
        const METHOD                   = 1 << 11;
        const TYPE_PARAMETER           = 1 << 12;
        const TYPE_ALIAS               = 1 << 13;
        const ALIAS                    = 1 << 14;
        const PARAMETER                = 1 << 15;
        /// The symbol of an external module file.
        const SOURCE_FILE              = 1 << 16;
        /// A string-named `declare module "x" {}` block.
        const AMBIENT_MODULE           = 1 << 17;

        const VARIABLE = Self::FUNCTION_SCOPED_VARIABLE.bits() | Self::BLOCK_SCOPED_VARIABLE.bits();
        const ENUM = Self::CONST_ENUM.bits() | Self::REGULAR_ENUM.bits();
        const MODULE = Self::VALUE_MODULE.bits() | Self::NAMESPACE_MODULE.bits();
        const VALUE = Self::VARIABLE.bits()
            | Self::PROPERTY.bits()
            | Self::ENUM_MEMBER.bits()
            | Self::FUNCTION.bits()
            | Self::CLASS.bits()
            | Self::ENUM.bits()
            | Self::VALUE_MODULE.bits()
            | Self::METHOD.bits()
            | Self::PARAMETER.bits();
        const TYPE = Self::CLASS.bits()
            | Self::INTERFACE.bits()
            | Self::ENUM.bits()
            | Self::ENUM_MEMBER.bits()
            | Self::TYPE_PARAMETER.bits()
            | Self::TYPE_ALIAS.bits();
        const NAMESPACE = Self::MODULE.bits() | Self::ENUM.bits();
    }
}

impl SymbolFlags {
    /// Flags an existing declaration may not carry when a declaration with
    /// `self` flags is merged into it.
    pub fn excludes(self) -> SymbolFlags {
        let mut excludes = SymbolFlags::empty();
        if self.contains(SymbolFlags::FUNCTION_SCOPED_VARIABLE) {
            excludes |= SymbolFlags::VALUE - SymbolFlags::FUNCTION_SCOPED_VARIABLE;
        }
        if self.intersects(SymbolFlags::BLOCK_SCOPED_VARIABLE | SymbolFlags::PARAMETER) {
            excludes |= SymbolFlags::VALUE;
        }
        if self.contains(SymbolFlags::FUNCTION) {
            excludes |= SymbolFlags::VALUE
                - (SymbolFlags::FUNCTION | SymbolFlags::VALUE_MODULE | SymbolFlags::CLASS);
        }
        if self.contains(SymbolFlags::CLASS) {
            excludes |= (SymbolFlags::VALUE | SymbolFlags::TYPE)
                - (SymbolFlags::VALUE_MODULE | SymbolFlags::INTERFACE | SymbolFlags::FUNCTION);
        }
        if self.contains(SymbolFlags::INTERFACE) {
            excludes |= SymbolFlags::TYPE - (SymbolFlags::INTERFACE | SymbolFlags::CLASS);
        }
        if self.contains(SymbolFlags::REGULAR_ENUM) {
            excludes |= (SymbolFlags::VALUE | SymbolFlags::TYPE)
                - (SymbolFlags::REGULAR_ENUM | SymbolFlags::VALUE_MODULE);
        }
        if self.contains(SymbolFlags::CONST_ENUM) {
            excludes |= (SymbolFlags::VALUE | SymbolFlags::TYPE) - SymbolFlags::CONST_ENUM;
        }
        if self.contains(SymbolFlags::VALUE_MODULE) {
            excludes |= SymbolFlags::VALUE
                - (SymbolFlags::FUNCTION
                    | SymbolFlags::CLASS
                    | SymbolFlags::REGULAR_ENUM
                    | SymbolFlags::VALUE_MODULE);
        }
        if self.contains(SymbolFlags::TYPE_ALIAS) {
            excludes |= SymbolFlags::TYPE;
        }
        excludes
    }
}

/// Whether a declaration with `new` flags merges into a symbol that already
/// has `existing` flags. Aliases never merge with anything.
pub fn can_merge_flags(existing: SymbolFlags, new: SymbolFlags) -> bool {
    if existing.contains(SymbolFlags::ALIAS) || new.contains(SymbolFlags::ALIAS) {
        return false;
    }
    !existing.intersects(new.excludes())
}

/// What an alias symbol stands for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AliasTarget {
    /// A name in the declaring file: `export { x }`, `export default x`,
    /// `import x = A.B`.
    Local { entity: NodeRef },
    /// A named export of another module: `import { a } from "m"`,
    /// `export { a as b } from "m"`, or `default` for default imports.
    ModuleExport {
        specifier: String,
        export_name: String,
    },
    /// A whole module: `import * as ns from "m"`, `export * as ns from "m"`,
    /// `import x = require("m")`.
    Module { specifier: String },
}

/// Insertion-ordered name table.
#[derive(Clone, Debug, Default)]
pub struct SymbolTable {
    entries: IndexMap<String, SymbolId>,
}

impl SymbolTable {
    pub fn new() -> SymbolTable {
        SymbolTable::default()
    }

    pub fn get(&self, name: &str) -> Option<SymbolId> {
        self.entries.get(name).copied()
    }

    pub fn set(&mut self, name: String, id: SymbolId) {
        self.entries.insert(name, id);
    }

    pub fn has(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, SymbolId)> {
        self.entries.iter().map(|(name, id)| (name.as_str(), *id))
    }
}

#[derive(Clone, Debug)]
pub struct Symbol {
    pub id: SymbolId,
    pub name: String,
    pub flags: SymbolFlags,
    /// Declaration nodes in binding order.
    pub declarations: SmallVec<[NodeRef; 2]>,
    /// Exported members of a module, namespace or enum.
    pub exports: SymbolTable,
    /// Everything declared directly inside a module or namespace body.
    pub locals: SymbolTable,
    /// Containing namespace or module symbol.
    pub parent: Option<SymbolId>,
    /// File of the first declaration.
    pub file: FileId,
    pub alias: Option<AliasTarget>,
    pub is_type_only: bool,
}

impl Symbol {
    pub fn has_flags(&self, flags: SymbolFlags) -> bool {
        self.flags.intersects(flags)
    }

    pub fn first_declaration(&self) -> Option<NodeRef> {
        self.declarations.first().copied()
    }

    pub fn is_alias(&self) -> bool {
        self.flags.contains(SymbolFlags::ALIAS)
    }

    /// File or ambient module symbol.
    pub fn is_module(&self) -> bool {
        self.has_flags(SymbolFlags::SOURCE_FILE | SymbolFlags::AMBIENT_MODULE)
    }
}

/// Arena owning every symbol of a program.
#[derive(Clone, Debug, Default)]
pub struct SymbolArena {
    symbols: Vec<Symbol>,
}

impl SymbolArena {
    pub fn new() -> SymbolArena {
        SymbolArena::default()
    }

    pub fn alloc(&mut self, flags: SymbolFlags, name: String, file: FileId) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(Symbol {
            id,
            name,
            flags,
            declarations: SmallVec::new(),
            exports: SymbolTable::new(),
            locals: SymbolTable::new(),
            parent: None,
            file,
            alias: None,
            is_type_only: false,
        });
        id
    }

    pub fn get(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id.0 as usize)
    }

    pub fn get_mut(&mut self, id: SymbolId) -> Option<&mut Symbol> {
        self.symbols.get_mut(id.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter()
    }
}
