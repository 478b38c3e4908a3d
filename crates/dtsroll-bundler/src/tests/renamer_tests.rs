use crate::renamer::{NameOwner, NameTable, next_candidate, preferred_name};
use dtsroll_binder::SymbolId;

#[test]
fn test_assign_name_is_idempotent() {
    let mut table = NameTable::new();
    let a = SymbolId(1);
    assert_eq!(table.assign_name(a, "A"), "A");
    assert_eq!(table.assign_name(a, "A"), "A");
    // A different preferred name does not rename an owned symbol.
    assert_eq!(table.assign_name(a, "Other"), "A");
    assert_eq!(table.len(), 1);
}

#[test]
fn test_collisions_get_numeric_suffixes() {
    let mut table = NameTable::new();
    assert_eq!(table.assign_name(SymbolId(1), "A"), "A");
    assert_eq!(table.assign_name(SymbolId(2), "A"), "A_1");
    assert_eq!(table.assign_name(SymbolId(3), "A"), "A_2");
    assert_eq!(table.owner_of("A_1"), Some(NameOwner::Symbol(SymbolId(2))));
    assert_eq!(table.name_of(SymbolId(3)), Some("A_2"));
}

#[test]
fn test_reserved_names_are_never_assigned() {
    let mut table = NameTable::new();
    table.reserve("Promise");
    assert_eq!(table.assign_name(SymbolId(7), "Promise"), "Promise_1");
    assert_eq!(table.owner_of("Promise"), Some(NameOwner::Reserved));
    // Reserving an owned name keeps the owner.
    table.reserve("Promise_1");
    assert_eq!(table.owner_of("Promise_1"), Some(NameOwner::Symbol(SymbolId(7))));
}

#[test]
fn test_table_iterates_in_assignment_order() {
    let mut table = NameTable::new();
    table.assign_name(SymbolId(2), "b");
    table.reserve("z");
    table.assign_name(SymbolId(1), "a");
    let names: Vec<&str> = table.iter().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["b", "z", "a"]);
}

#[test]
fn test_next_candidate() {
    assert_eq!(next_candidate("A"), "A_1");
    assert_eq!(next_candidate("A_1"), "A_2");
    assert_eq!(next_candidate("A_9"), "A_10");
    assert_eq!(next_candidate("snake_case"), "snake_case_1");
    assert_eq!(next_candidate("_1"), "_1_1");
}

#[test]
fn test_preferred_names_for_default_exports() {
    assert_eq!(preferred_name("default"), "__default");
    assert_eq!(preferred_name("export="), "__export");
    assert_eq!(preferred_name("Widget"), "Widget");
}
