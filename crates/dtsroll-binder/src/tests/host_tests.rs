use crate::host::{
    CompilerHost, MemoryHost, is_declaration_file, is_loosely_typed, join_path, normalize_path,
    parent_dir,
};

#[test]
fn test_normalize_path_collapses_segments() {
    assert_eq!(normalize_path("/a/./b/../c.ts"), "/a/c.ts");
    assert_eq!(normalize_path("a//b"), "a/b");
    assert_eq!(normalize_path("C:\\src\\x.ts"), "C:/src/x.ts");
    assert_eq!(normalize_path("../x"), "../x");
    assert_eq!(normalize_path("./"), ".");
}

#[test]
fn test_parent_dir_and_join() {
    assert_eq!(parent_dir("/src/index.ts"), "/src");
    assert_eq!(parent_dir("/index.ts"), "/");
    assert_eq!(parent_dir("index.ts"), ".");
    assert_eq!(join_path("/src/lib", "../util.ts"), "/src/util.ts");
    assert_eq!(join_path("/src", "/abs.ts"), "/abs.ts");
}

#[test]
fn test_file_kind_predicates() {
    assert!(is_declaration_file("/x/index.d.ts"));
    assert!(!is_declaration_file("/x/index.ts"));
    assert!(is_loosely_typed("/x/a.mjs"));
    assert!(!is_loosely_typed("/x/a.ts"));
}

#[test]
fn test_memory_host_normalizes_lookups() {
    let mut host = MemoryHost::new();
    host.add_file("/src/../lib/a.ts", "export {};");
    assert_eq!(host.len(), 1);
    assert!(host.file_exists("/lib/a.ts"));
    assert_eq!(host.read_file("/lib/./a.ts").as_deref(), Some("export {};"));
    assert_eq!(host.read_file("/lib/b.ts"), None);
}
