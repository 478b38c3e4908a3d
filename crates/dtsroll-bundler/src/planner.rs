//! Export planning.
//!
//! Decides, for every entry export, how the bundle exposes it, and turns
//! project modules used as values into synthesized `declare namespace`
//! blocks. A namespace member is either moved into the namespace body, or,
//! when its declaration already lives at the top level, re-exposed by name.

use crate::collector::{Collection, Target, resolve_target};
use dtsroll_binder::{ModuleExport, SemanticModel, SymbolId};
use dtsroll_common::limits::MAX_NAMESPACE_REEXPORT_DEPTH;
use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// An alias on the way could not be resolved.
    Unresolved,
    /// The export names a global declaration.
    Ambient,
    /// The declaration has nothing that can be printed.
    NotEmittable,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportOutcome {
    /// A kept top-level declaration.
    Direct { symbol: SymbolId },
    /// A project module exposed as a namespace.
    Namespace { module: SymbolId },
    /// An external declaration, exported through a named import.
    External { symbol: SymbolId },
    /// A whole external module, exported through `import * as x`.
    ExternalModule { symbol: SymbolId },
    /// A member of a kept namespace declaration.
    Member { symbol: SymbolId },
    Skipped(SkipReason),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlannedExport {
    pub name: String,
    pub outcome: ExportOutcome,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NamespaceMember {
    /// The declaration is printed inside the namespace body.
    Moved(SymbolId),
    /// A top-level declaration or import, listed in the namespace's
    /// `export { X as name }`.
    Reexposed(SymbolId),
    /// Reached through a qualified name: `export import name = A.B;`.
    Qualified(SymbolId),
    /// A module namespace declared inside this one.
    Nested(SymbolId),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SynthesizedNamespace {
    pub module: SymbolId,
    pub suggested_name: String,
    pub members: Vec<(String, NamespaceMember)>,
    /// Enclosing namespace; `None` at the top level.
    pub parent: Option<SymbolId>,
}

#[derive(Debug, Default)]
pub struct Plan {
    pub exports: Vec<PlannedExport>,
    pub namespaces: IndexMap<SymbolId, SynthesizedNamespace>,
    /// Moved declaration -> (namespace module, member name)
    pub moved: FxHashMap<SymbolId, (SymbolId, String)>,
    /// Nested namespace module -> (parent module, member name)
    pub nested: FxHashMap<SymbolId, (SymbolId, String)>,
    direct: FxHashSet<SymbolId>,
}

impl Plan {
    pub fn is_direct(&self, symbol: SymbolId) -> bool {
        self.direct.contains(&symbol)
    }

    pub fn is_moved(&self, symbol: SymbolId) -> bool {
        self.moved.contains_key(&symbol)
    }

    /// Top-level namespaces in planning order.
    pub fn top_level_namespaces(&self) -> impl Iterator<Item = &SynthesizedNamespace> {
        self.namespaces.values().filter(|namespace| namespace.parent.is_none())
    }

    pub fn namespace(&self, module: SymbolId) -> Option<&SynthesizedNamespace> {
        self.namespaces.get(&module)
    }

    /// Moved declarations of a namespace, in member order.
    pub fn moved_into(&self, module: SymbolId) -> impl Iterator<Item = SymbolId> + '_ {
        self.namespaces
            .get(&module)
            .into_iter()
            .flat_map(|namespace| namespace.members.iter())
            .filter_map(|(_, member)| match member {
                NamespaceMember::Moved(symbol) => Some(*symbol),
                _ => None,
            })
    }
}

pub fn plan(model: SemanticModel<'_>, exports: &[ModuleExport], collection: &Collection) -> Plan {
    let mut planner = Planner {
        model,
        collection,
        plan: Plan::default(),
    };
    planner.plan_exports(exports);
    planner.synthesize_namespaces(exports);
    debug!(
        exports = planner.plan.exports.len(),
        namespaces = planner.plan.namespaces.len(),
        moved = planner.plan.moved.len(),
        "plan finished"
    );
    planner.plan
}

struct Planner<'p, 'c> {
    model: SemanticModel<'p>,
    collection: &'c Collection,
    plan: Plan,
}

impl Planner<'_, '_> {
    fn plan_exports(&mut self, exports: &[ModuleExport]) {
        for export in exports {
            let outcome = self.outcome_of(export);
            if let ExportOutcome::Direct { symbol } = outcome {
                self.plan.direct.insert(symbol);
            }
            if let ExportOutcome::Skipped(reason) = outcome {
                warn!(name = %export.name, ?reason, "export skipped");
            }
            self.plan.exports.push(PlannedExport {
                name: export.name.clone(),
                outcome,
            });
        }
    }

    fn outcome_of(&self, export: &ModuleExport) -> ExportOutcome {
        match resolve_target(self.model, export.symbol) {
            None => ExportOutcome::Skipped(SkipReason::Unresolved),
            Some(Target::Ambient) => ExportOutcome::Skipped(SkipReason::Ambient),
            Some(Target::Module { module, .. }) => ExportOutcome::Namespace { module },
            Some(Target::External(import)) if import.is_namespace() => {
                ExportOutcome::ExternalModule {
                    symbol: import.symbol,
                }
            }
            Some(Target::External(import)) => ExportOutcome::External {
                symbol: import.symbol,
            },
            Some(Target::Local(symbol)) => match self.model.top_level_container_of(symbol) {
                Some(owner) if self.collection.is_kept(owner) => ExportOutcome::Member { symbol },
                Some(_) => ExportOutcome::Skipped(SkipReason::NotEmittable),
                None if self.collection.is_kept(symbol) => ExportOutcome::Direct { symbol },
                None => ExportOutcome::Skipped(SkipReason::NotEmittable),
            },
        }
    }

    fn synthesize_namespaces(&mut self, exports: &[ModuleExport]) {
        let mut entry = Vec::new();
        for (export, planned) in exports.iter().zip(&self.plan.exports) {
            if let ExportOutcome::Namespace { module } = planned.outcome {
                let suggested = if matches!(export.name.as_str(), "default" | "export=") {
                    self.suggested_name_of(module)
                } else {
                    export.name.clone()
                };
                entry.push((module, suggested));
            }
        }
        // Entry namespaces first, so modules they re-export nest inside them.
        self.claim_top_level(entry);
        let referenced: Vec<_> = self
            .collection
            .namespaces
            .iter()
            .map(|(module, name)| (*module, name.clone()))
            .collect();
        self.claim_top_level(referenced);
    }

    fn claim_top_level(&mut self, modules: Vec<(SymbolId, String)>) {
        let mut claimed = Vec::new();
        for (module, suggested_name) in modules {
            if self.plan.namespaces.contains_key(&module) {
                continue;
            }
            self.plan.namespaces.insert(
                module,
                SynthesizedNamespace {
                    module,
                    suggested_name,
                    members: Vec::new(),
                    parent: None,
                },
            );
            claimed.push(module);
        }
        for module in claimed {
            self.fill_members(module, 0);
        }
    }

    fn suggested_name_of(&self, module: SymbolId) -> String {
        self.collection.namespaces.get(&module).cloned().unwrap_or_else(|| {
            self.model
                .symbol(module)
                .map_or_else(|| "ns".to_string(), |data| {
                    crate::collector::identifier_from_path(&data.name)
                })
        })
    }

    fn fill_members(&mut self, module: SymbolId, depth: usize) {
        if depth >= MAX_NAMESPACE_REEXPORT_DEPTH {
            warn!(module = module.0, "namespace nesting too deep; members dropped");
            return;
        }
        let mut members = Vec::new();
        let mut nested = Vec::new();
        for export in self.model.exports_of(module) {
            if matches!(export.name.as_str(), "default" | "export=") {
                continue;
            }
            let member = match resolve_target(self.model, export.symbol) {
                None | Some(Target::Ambient) => None,
                Some(Target::External(import)) => Some(NamespaceMember::Reexposed(import.symbol)),
                Some(Target::Local(symbol)) => self.place_local(module, symbol, &export.name),
                Some(Target::Module { module: inner, .. }) => {
                    if self.plan.namespaces.contains_key(&inner) {
                        Some(NamespaceMember::Qualified(inner))
                    } else {
                        self.plan.namespaces.insert(
                            inner,
                            SynthesizedNamespace {
                                module: inner,
                                suggested_name: export.name.clone(),
                                members: Vec::new(),
                                parent: Some(module),
                            },
                        );
                        self.plan.nested.insert(inner, (module, export.name.clone()));
                        nested.push(inner);
                        Some(NamespaceMember::Nested(inner))
                    }
                }
            };
            match member {
                Some(member) => members.push((export.name, member)),
                None => debug!(name = %export.name, "namespace member has no declaration"),
            }
        }
        if let Some(namespace) = self.plan.namespaces.get_mut(&module) {
            namespace.members = members;
        }
        for inner in nested {
            self.fill_members(inner, depth + 1);
        }
    }

    fn place_local(&mut self, module: SymbolId, symbol: SymbolId, name: &str) -> Option<NamespaceMember> {
        if let Some(owner) = self.model.top_level_container_of(symbol) {
            return self
                .collection
                .is_kept(owner)
                .then_some(NamespaceMember::Qualified(symbol));
        }
        if !self.collection.is_kept(symbol) {
            return None;
        }
        if self.plan.is_moved(symbol) {
            return Some(NamespaceMember::Qualified(symbol));
        }
        if self.plan.is_direct(symbol) {
            return Some(NamespaceMember::Reexposed(symbol));
        }
        self.plan.moved.insert(symbol, (module, name.to_string()));
        Some(NamespaceMember::Moved(symbol))
    }
}
