//! Collision-resolving renamer.
//!
//! Every name in the bundle's top-level scope is owned by exactly one
//! symbol or reserved for a name the bundle must not shadow. The table only
//! grows; assigning a symbol that already has a name returns that name.

use crate::collector::Collection;
use crate::planner::{NamespaceMember, Plan};
use dtsroll_binder::{SemanticModel, SymbolId};
use dtsroll_common::limits::MAX_NAMESPACE_REEXPORT_DEPTH;
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NameOwner {
    Symbol(SymbolId),
    /// Ambient or unresolved names, and names declared inside synthesized
    /// namespaces.
    Reserved,
}

/// The collected-name table.
#[derive(Debug, Default)]
pub struct NameTable {
    names: IndexMap<String, NameOwner>,
    assigned: FxHashMap<SymbolId, String>,
}

impl NameTable {
    pub fn new() -> NameTable {
        NameTable::default()
    }

    pub fn reserve(&mut self, name: &str) {
        self.names
            .entry(name.to_string())
            .or_insert(NameOwner::Reserved);
    }

    /// Give `symbol` a unique name, starting from `preferred`. Idempotent.
    pub fn assign_name(&mut self, symbol: SymbolId, preferred: &str) -> String {
        if let Some(existing) = self.assigned.get(&symbol) {
            return existing.clone();
        }
        let mut candidate = preferred.to_string();
        while self.names.contains_key(&candidate) {
            candidate = next_candidate(&candidate);
        }
        if candidate != preferred {
            debug!(preferred, assigned = %candidate, "renamed to avoid a collision");
        }
        self.names
            .insert(candidate.clone(), NameOwner::Symbol(symbol));
        self.assigned.insert(symbol, candidate.clone());
        candidate
    }

    pub fn name_of(&self, symbol: SymbolId) -> Option<&str> {
        self.assigned.get(&symbol).map(String::as_str)
    }

    pub fn owner_of(&self, name: &str) -> Option<NameOwner> {
        self.names.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Names in assignment order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, NameOwner)> {
        self.names.iter().map(|(name, owner)| (name.as_str(), *owner))
    }
}

/// `A` -> `A_1`, `A_1` -> `A_2`.
pub(crate) fn next_candidate(name: &str) -> String {
    if let Some((base, suffix)) = name.rsplit_once('_')
        && !base.is_empty()
        && let Ok(n) = suffix.parse::<u32>()
    {
        return format!("{base}_{}", n + 1);
    }
    format!("{name}_1")
}

/// Preferred bundle name for a declared symbol name.
pub(crate) fn preferred_name(name: &str) -> &str {
    match name {
        "default" => "__default",
        "export=" => "__export",
        _ => name,
    }
}

/// Final names for everything the bundle mentions.
#[derive(Debug, Default)]
pub struct Renames {
    pub table: NameTable,
    moved: FxHashMap<SymbolId, (SymbolId, String)>,
    nested: FxHashMap<SymbolId, (SymbolId, String)>,
}

impl Renames {
    /// Text that names `symbol` in the bundle: a top-level name, or a
    /// dotted path through a namespace.
    pub fn text_of(&self, model: SemanticModel<'_>, symbol: SymbolId) -> Option<String> {
        self.text_at(model, symbol, 0)
    }

    fn text_at(&self, model: SemanticModel<'_>, symbol: SymbolId, depth: usize) -> Option<String> {
        if depth > MAX_NAMESPACE_REEXPORT_DEPTH {
            return None;
        }
        if let Some(name) = self.table.name_of(symbol) {
            return Some(name.to_string());
        }
        if let Some((namespace, name)) = self.moved.get(&symbol).or_else(|| self.nested.get(&symbol)) {
            let outer = self.text_at(model, *namespace, depth + 1)?;
            return Some(format!("{outer}.{name}"));
        }
        // A member of a kept namespace declaration.
        let data = model.symbol(symbol)?;
        let parent = model.symbol(data.parent?)?;
        if parent.is_module() {
            return None;
        }
        let outer = self.text_at(model, parent.id, depth + 1)?;
        Some(format!("{outer}.{}", data.name))
    }

    pub fn name_of(&self, symbol: SymbolId) -> Option<&str> {
        self.table.name_of(symbol)
    }
}

pub fn rename(model: SemanticModel<'_>, collection: &Collection, plan: &Plan) -> Renames {
    let mut table = NameTable::new();

    for name in &collection.reserved {
        table.reserve(name);
    }
    // Names bound inside namespace bodies would shadow top-level names there.
    for namespace in plan.namespaces.values() {
        for (name, member) in &namespace.members {
            if !matches!(member, NamespaceMember::Reexposed(_)) {
                table.reserve(name);
            }
        }
    }

    for &symbol in &collection.kept {
        if plan.is_moved(symbol) {
            continue;
        }
        let Some(data) = model.symbol(symbol) else {
            continue;
        };
        let name = table.assign_name(symbol, preferred_name(&data.name));
        trace!(symbol = symbol.0, %name, "declaration named");
    }

    for namespace in plan.top_level_namespaces() {
        table.assign_name(namespace.module, &namespace.suggested_name);
    }

    let mut externals: Vec<_> = collection.externals.values().collect();
    externals.sort_by(|a, b| a.specifier.cmp(&b.specifier));
    for import in externals {
        table.assign_name(import.symbol, &import.suggested_name());
    }

    debug!(names = table.len(), "renaming finished");
    Renames {
        table,
        moved: plan.moved.clone(),
        nested: plan.nested.clone(),
    }
}
