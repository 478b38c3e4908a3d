//! Program loading: module graph walk, file origins and load-time diagnostics.

use dtsroll_binder::{
    CompilerOptions, FileOrigin, MemoryHost, ModuleTarget, Program, ProgramError,
};
use dtsroll_common::diagnostics::diagnostic_codes;

fn host(files: &[(&str, &str)]) -> MemoryHost {
    let mut host = MemoryHost::new();
    for (path, text) in files {
        host.add_file(path, text);
    }
    host
}

fn load_with(files: &[(&str, &str)], options: &CompilerOptions) -> Program {
    Program::create("/src/index.ts", options, &host(files)).expect("entry exists")
}

fn load(files: &[(&str, &str)]) -> Program {
    load_with(files, &CompilerOptions::default())
}

fn codes(program: &Program) -> Vec<u32> {
    program.diagnostics.iter().map(|d| d.code).collect()
}

#[test]
fn test_loads_relative_imports() {
    let program = load(&[
        ("/src/index.ts", "import { add } from \"./math\";\nexport { add };\n"),
        (
            "/src/math.ts",
            "export function add(a: number, b: number): number { return a + b; }\n",
        ),
    ]);
    assert!(codes(&program).is_empty(), "{:?}", program.diagnostics);
    assert_eq!(program.files.len(), 2);
    assert!(program.files.iter().all(|file| file.origin == FileOrigin::Local));
    let entry = program.entry_file().expect("entry");
    assert_eq!(entry.path, "/src/index.ts");
    let math = program.file_by_path("/src/math.ts").expect("math loaded");
    assert_eq!(
        entry.resolved_modules.get("./math"),
        Some(&ModuleTarget::File(math.id))
    );
}

#[test]
fn test_missing_entry_is_an_error() {
    let result = Program::create("/src/nope.ts", &CompilerOptions::default(), &MemoryHost::new());
    assert!(matches!(result, Err(ProgramError::EntryNotFound { .. })));
}

#[test]
fn test_unresolved_relative_import_reports_2307() {
    let program = load(&[("/src/index.ts", "import { a } from \"./missing\";\nexport { a };\n")]);
    assert!(codes(&program).contains(&diagnostic_codes::CANNOT_FIND_MODULE));
    assert!(program.has_errors());
}

#[test]
fn test_unresolved_package_reports_2307() {
    let program = load(&[("/src/index.ts", "export { a } from \"nowhere\";\n")]);
    assert_eq!(codes(&program), vec![diagnostic_codes::CANNOT_FIND_MODULE]);
}

#[test]
fn test_missing_named_export_reports_2305() {
    let program = load(&[
        ("/src/index.ts", "import { b } from \"./a\";\nexport { b };\n"),
        ("/src/a.ts", "export const a = 1;\n"),
    ]);
    assert_eq!(
        codes(&program),
        vec![diagnostic_codes::MODULE_HAS_NO_EXPORTED_MEMBER]
    );
    let diag = &program.diagnostics[0];
    assert_eq!(diag.file, "/src/index.ts");
    assert!(diag.message_text.contains("'b'"), "{}", diag.message_text);
}

#[test]
fn test_duplicate_declaration_reports_2300() {
    let program = load(&[("/src/index.ts", "export const a = 1;\nexport const a = 2;\n")]);
    assert!(codes(&program).contains(&diagnostic_codes::DUPLICATE_IDENTIFIER));
}

#[test]
fn test_node_modules_files_are_external() {
    let program = load(&[
        (
            "/src/index.ts",
            "import { Dep } from \"dep\";\nexport declare function use(d: Dep): void;\n",
        ),
        ("/node_modules/dep/index.d.ts", "export interface Dep { a: number }\n"),
    ]);
    assert!(codes(&program).is_empty(), "{:?}", program.diagnostics);
    let dep = program
        .file_by_path("/node_modules/dep/index.d.ts")
        .expect("dep loaded");
    assert_eq!(dep.origin, FileOrigin::External);
    let entry = program
        .external_modules
        .get("/node_modules/dep/index.d.ts")
        .expect("package recorded");
    assert_eq!(entry.package_name, "dep");
    assert_eq!(entry.subpath, None);
}

#[test]
fn test_ambient_module_satisfies_bare_import() {
    let options = CompilerOptions::default().with_files(["/types/virtual.d.ts"]);
    let program = load_with(
        &[
            ("/src/index.ts", "import { V } from \"virtual\";\nexport type W = V;\n"),
            (
                "/types/virtual.d.ts",
                "declare module \"virtual\" {\n    export interface V { a: string }\n}\n",
            ),
        ],
        &options,
    );
    assert!(codes(&program).is_empty(), "{:?}", program.diagnostics);
    let ambient = program.ambient_modules.get("virtual").expect("declared");
    let entry = program.entry_file().expect("entry");
    assert_eq!(
        entry.resolved_modules.get("virtual"),
        Some(&ModuleTarget::Ambient(ambient))
    );
    let globals = program
        .file_by_path("/types/virtual.d.ts")
        .expect("root loaded");
    assert_eq!(globals.origin, FileOrigin::Ambient);
    assert!(!globals.is_external_module);
}

#[test]
fn test_ambient_pattern_matches_relative_specifier() {
    let options = CompilerOptions::default().with_files(["/types/css.d.ts"]);
    let program = load_with(
        &[
            ("/src/index.ts", "import styles from \"./app.css\";\nexport { styles };\n"),
            (
                "/types/css.d.ts",
                "declare module \"*.css\" {\n    const classes: { [key: string]: string };\n    export default classes;\n}\n",
            ),
        ],
        &options,
    );
    assert!(codes(&program).is_empty(), "{:?}", program.diagnostics);
    assert!(matches!(
        program.entry_file().and_then(|file| file.resolved_modules.get("./app.css")),
        Some(ModuleTarget::Ambient(_))
    ));
}

#[test]
fn test_missing_root_file_reports_6053() {
    let options = CompilerOptions::default().with_files(["/types/missing.d.ts"]);
    let program = load_with(&[("/src/index.ts", "export const a = 1;\n")], &options);
    assert_eq!(codes(&program), vec![diagnostic_codes::FILE_NOT_FOUND]);
}

#[test]
fn test_script_declarations_bind_into_globals() {
    let options = CompilerOptions::default().with_files(["/types/globals.d.ts"]);
    let program = load_with(
        &[
            ("/src/index.ts", "export declare function run(): Greeter;\n"),
            ("/types/globals.d.ts", "declare interface Greeter { greet(): void }\n"),
        ],
        &options,
    );
    assert!(codes(&program).is_empty(), "{:?}", program.diagnostics);
    let greeter = program.globals.get("Greeter").expect("global interface");
    let entry = program.entry_file().expect("entry");
    assert!(entry.resolved.values().any(|symbol| *symbol == greeter));
}

#[test]
fn test_import_cycle_loads_each_file_once() {
    let program = load(&[
        (
            "/src/index.ts",
            "import { B } from \"./b\";\nexport interface A { b: B }\n",
        ),
        (
            "/src/b.ts",
            "import { A } from \"./index\";\nexport interface B { a: A }\n",
        ),
    ]);
    assert!(codes(&program).is_empty(), "{:?}", program.diagnostics);
    assert_eq!(program.files.len(), 2);
}

#[test]
fn test_position_of_uses_zero_based_lines() {
    let program = load(&[("/src/index.ts", "export const a = 1;\nexport const b = 2;\n")]);
    let entry = program.entry_file().expect("entry");
    let position = entry.position_of(20);
    assert_eq!((position.line, position.character), (1, 0));
}
