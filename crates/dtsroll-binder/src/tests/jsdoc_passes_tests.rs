use crate::jsdoc_passes::{
    ImportExtensionPass, JsDocAccessPass, JsDocEnumPass, JsDocFunctionPass, JsDocNamespacePass,
    JsDocVariablePass,
};
use crate::preprocess::{Preprocessor, SourcePass};

fn run(pass: impl SourcePass + 'static, source: &str) -> String {
    Preprocessor::new()
        .with_pass(pass)
        .run("/src/a.js", source.to_string())
}

#[test]
fn test_function_tags_type_parameters_and_return() {
    let out = run(
        JsDocFunctionPass,
        "/** @param {number} x @returns {string} */\nexport function f(x) {\n    return String(x);\n}\n",
    );
    assert_eq!(
        out,
        "/** @param {number} x @returns {string} */\nexport function f(x: number): string {\n    return String(x);\n}\n"
    );
}

#[test]
fn test_bracketed_rest_and_async_parameters() {
    let out = run(
        JsDocFunctionPass,
        "/**\n * @param {string} a\n * @param {number} [b]\n * @param {...boolean} rest\n * @async\n */\nfunction g(a, b, ...rest) {}\n",
    );
    assert!(
        out.ends_with("function g(a: string, b?: number, ...rest: boolean[]): Promise<any> {}\n"),
        "{out}"
    );
}

#[test]
fn test_defaults_are_kept_and_not_marked_optional() {
    let out = run(JsDocFunctionPass, "/** @param {number=} n */\nfunction h(n = 1) {}\n");
    assert_eq!(out, "/** @param {number=} n */\nfunction h(n: number = 1) {}\n");
}

#[test]
fn test_function_valued_variable_gets_function_type() {
    let out = run(
        JsDocFunctionPass,
        "/** @param {number} x @returns {number} */\nexport const double = (x) => x * 2;\n",
    );
    assert!(
        out.ends_with("export const double: (x: number) => number = (x) => x * 2;\n"),
        "{out}"
    );
}

#[test]
fn test_class_methods_and_setters() {
    let out = run(
        JsDocFunctionPass,
        "class C {\n    /** @param {string} s @returns {void} */\n    set value(s) {}\n    /** @returns {number} */\n    static count() { return 0; }\n}\n",
    );
    assert!(out.contains("set value(s: string) {}"), "{out}");
    assert!(out.contains("static count(): number { return 0; }"), "{out}");
}

#[test]
fn test_callback_comments_do_not_touch_the_next_function() {
    let source = "/**\n * @callback Handler\n * @param {string} e\n */\nfunction on(e) {}\n";
    assert_eq!(run(JsDocFunctionPass, source), source);
}

#[test]
fn test_variable_type_and_const_tags() {
    let out = run(
        JsDocVariablePass,
        "/** @type {Array.<string>} */\nlet names = [];\n/** @const */\nvar LIMIT = 10;\n",
    );
    assert_eq!(
        out,
        "/** @type {Array.<string>} */\nlet names: Array<string> = [];\n/** @const */\nconst LIMIT = 10;\n"
    );
}

#[test]
fn test_annotated_variables_are_left_alone() {
    let source = "/** @type {number} */\nlet n: number = 1;\n";
    assert_eq!(run(JsDocVariablePass, source), source);
}

#[test]
fn test_enum_object_becomes_enum() {
    let out = run(
        JsDocEnumPass,
        "/** @enum {number} */\nexport const Color = {\n    Red: 1,\n    Blue: 2,\n};\nexport const other = 1;\n",
    );
    assert_eq!(
        out,
        "/** @enum {number} */\nexport enum Color { Red = 1, Blue = 2 }\nexport const other = 1;\n"
    );
}

#[test]
fn test_enum_with_shorthand_member_is_skipped() {
    let source = "/** @enum */\nconst E = { a };\n";
    assert_eq!(run(JsDocEnumPass, source), source);
}

#[test]
fn test_namespace_object_becomes_namespace() {
    let out = run(
        JsDocNamespacePass,
        "/** @namespace */\nexport const util = {\n    version: \"1.0\",\n    helper,\n    add(a, b) { return a + b; },\n};\n",
    );
    assert_eq!(
        out,
        "/** @namespace */\nexport declare namespace util {\n    export const version = \"1.0\";\n    export const helper = helper;\n    export function add(a, b) { return a + b; }\n}\n"
    );
}

#[test]
fn test_access_tags_become_modifiers() {
    let out = run(
        JsDocAccessPass,
        "/** @abstract */\nexport class Shape {\n    /** @private */\n    cache = null;\n    /** @protected @readonly */\n    static sides = 0;\n    /** @access private */\n    draw() {}\n    /** @private */\n    #secret = 1;\n}\n",
    );
    assert!(out.contains("export abstract class Shape {"), "{out}");
    assert!(out.contains("private cache = null;"), "{out}");
    assert!(out.contains("protected static readonly sides = 0;"), "{out}");
    assert!(out.contains("private draw() {}"), "{out}");
    assert!(out.contains("    #secret = 1;"), "{out}");
}

#[test]
fn test_access_tags_skip_plain_functions() {
    let source = "/** @private */\nfunction helper() {}\n";
    assert_eq!(run(JsDocAccessPass, source), source);
}

#[test]
fn test_relative_specifiers_lose_script_extensions() {
    let out = run(
        ImportExtensionPass,
        "import { a } from \"./a.js\";\nexport * from '../b.mjs';\nimport \"./side.cjs\";\nexport { c } from \"pkg/c.js\";\nconst d = import(\"./d.jsx\");\n",
    );
    assert_eq!(
        out,
        "import { a } from \"./a\";\nexport * from '../b';\nimport \"./side\";\nexport { c } from \"pkg/c.js\";\nconst d = import(\"./d\");\n"
    );
}

#[test]
fn test_jsdoc_passes_skip_typed_sources() {
    let source = "/** @param {number} x */\nexport function f(x) {}\n";
    let out = Preprocessor::jsdoc().run("/src/a.ts", source.to_string());
    assert_eq!(out, source);
}

#[test]
fn test_jsdoc_preprocessor_lists_every_pass() {
    assert_eq!(
        Preprocessor::jsdoc().pass_names(),
        vec![
            "jsdoc-typedef",
            "jsdoc-enum",
            "jsdoc-namespace",
            "jsdoc-function",
            "jsdoc-variable",
            "jsdoc-access",
            "import-extension",
        ]
    );
}
