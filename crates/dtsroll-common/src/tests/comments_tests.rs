use crate::comments::JsDoc;

#[test]
fn test_parse_description_only() {
    let doc = JsDoc::parse("/** Adds two numbers. */");
    assert_eq!(doc.description.as_deref(), Some("Adds two numbers."));
    assert!(doc.tags.is_empty());
}

#[test]
fn test_parse_multiline_description_and_tags() {
    let doc = JsDoc::parse(
        "/**\n * Adds two numbers.\n * Second line.\n *\n * @param a - first operand\n * @param {number} b second operand\n * @returns the sum\n */",
    );
    assert_eq!(
        doc.description.as_deref(),
        Some("Adds two numbers.\nSecond line.")
    );
    assert_eq!(doc.param_description("a"), Some("first operand"));
    assert_eq!(doc.param_description("b"), Some("second operand"));
    assert_eq!(doc.return_description(), Some("the sum"));
    let b = doc.tags.iter().find(|t| t.param_name.as_deref() == Some("b"));
    assert_eq!(b.and_then(|t| t.type_expression.as_deref()), Some("number"));
}

#[test]
fn test_optional_param_with_default() {
    let doc = JsDoc::parse("/** @param [count=1] how many */");
    assert_eq!(doc.param_description("count"), Some("how many"));
    assert!(doc.tags[0].is_bracketed);
}

#[test]
fn test_examples_keep_layout() {
    let doc = JsDoc::parse("/**\n * @example\n * add(1, 2);\n *   // => 3\n */");
    assert_eq!(doc.examples(), vec!["add(1, 2);\n  // => 3"]);
}

#[test]
fn test_see_links_and_missing_comment() {
    let doc = JsDoc::parse("/**\n * @see https://example.com/docs\n * @deprecated\n */");
    assert_eq!(doc.see_links(), vec!["https://example.com/docs"]);
    let deprecated = doc.tags_named("deprecated").next();
    assert!(deprecated.is_some_and(|t| t.comment.is_none()));
    assert_eq!(doc.description, None);
}

#[test]
fn test_inline_tags_split_on_one_line() {
    let doc = JsDoc::parse("/** Converts. @param {number} x @returns {string} {@link Other} text */");
    assert_eq!(doc.description.as_deref(), Some("Converts."));
    let names: Vec<&str> = doc.tags.iter().map(|tag| tag.name.as_str()).collect();
    assert_eq!(names, ["param", "returns"]);
    assert_eq!(doc.tags[0].param_name.as_deref(), Some("x"));
    assert_eq!(doc.tags[1].type_expression.as_deref(), Some("string"));
    assert_eq!(doc.return_description(), Some("{@link Other} text"));
}
