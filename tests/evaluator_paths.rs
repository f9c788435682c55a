use openrosa_xpath::model::simple::{doc, elem, text, SimpleNode};
use openrosa_xpath::{Node, ResultKind, XPathEvaluator, XPathNode};

fn sample() -> SimpleNode {
    doc()
        .child(
            elem("r")
                .child(elem("a").child(text("1")))
                .child(elem("b").child(text("x")))
                .child(elem("a").child(text("2"))),
        )
        .build()
}

fn root_of(document: &SimpleNode) -> SimpleNode {
    document.children()[0].clone()
}

fn snapshot_names(
    engine: &XPathEvaluator<SimpleNode>,
    ctx: &SimpleNode,
    src: &str,
) -> Vec<String> {
    let result = engine
        .evaluate(src, ctx, None, ResultKind::OrderedNodeSnapshot)
        .unwrap();
    (0..result.snapshot_length().unwrap())
        .map(|i| {
            result
                .snapshot_item(i)
                .unwrap()
                .unwrap()
                .raw_name()
                .unwrap_or_default()
        })
        .collect()
}

#[test]
fn absolute_path_starts_at_document() {
    let document = sample();
    let leaf_ctx = root_of(&document); // context element, not the document
    let engine = XPathEvaluator::new();
    assert_eq!(snapshot_names(&engine, &leaf_ctx, "/r/a"), vec!["a", "a"]);
    assert_eq!(snapshot_names(&engine, &leaf_ctx, "//a"), vec!["a", "a"]);
}

#[test]
fn bare_slash_is_the_root() {
    let document = sample();
    let root = root_of(&document);
    let engine = XPathEvaluator::new();
    let result = engine
        .evaluate("/", &root, None, ResultKind::OrderedNodeSnapshot)
        .unwrap();
    assert_eq!(result.snapshot_length().unwrap(), 1);
    let node = result.snapshot_item(0).unwrap().unwrap();
    assert!(matches!(node, Node::Tree(n) if n == &document));
}

#[test]
fn union_is_document_ordered_and_distinct() {
    let document = sample();
    let root = root_of(&document);
    let engine = XPathEvaluator::new();
    // b comes between the two a elements in document order
    assert_eq!(snapshot_names(&engine, &root, "a | b"), vec!["a", "b", "a"]);
    assert_eq!(snapshot_names(&engine, &root, "b | a"), vec!["a", "b", "a"]);
    // overlapping operands stay duplicate-free
    assert_eq!(
        snapshot_names(&engine, &root, "a | child::*"),
        vec!["a", "b", "a"]
    );
}

#[test]
fn count_over_union() {
    let document = doc()
        .child(elem("r").child(elem("a")).child(elem("b")).child(elem("a")))
        .build();
    let root = root_of(&document);
    let engine = XPathEvaluator::new();
    let n = engine
        .evaluate("count(a | b)", &root, None, ResultKind::Number)
        .unwrap()
        .number_value()
        .unwrap();
    assert_eq!(n, 3.0);
    let name = engine
        .evaluate("name(a[1])", &root, None, ResultKind::String)
        .unwrap()
        .string_value()
        .unwrap()
        .to_string();
    assert_eq!(name, "a");
}

#[test]
fn path_composition_merges_per_node_results() {
    let document = sample();
    let root = root_of(&document);
    let engine = XPathEvaluator::new();
    // every child contributes its text children; result is doc-ordered
    let result = engine
        .evaluate("*/text()", &root, None, ResultKind::OrderedNodeSnapshot)
        .unwrap();
    let values: Vec<String> = (0..result.snapshot_length().unwrap())
        .map(|i| result.snapshot_item(i).unwrap().unwrap().string_value())
        .collect();
    assert_eq!(values, vec!["1", "x", "2"]);
}

#[test]
fn union_requires_node_sets() {
    let document = sample();
    let root = root_of(&document);
    let engine = XPathEvaluator::new();
    let err = engine
        .evaluate("1 | a", &root, None, ResultKind::Any)
        .unwrap_err();
    assert_eq!(err.code, openrosa_xpath::ErrorCode::Type);
}

#[test]
fn path_left_side_must_be_a_node_set() {
    let document = sample();
    let root = root_of(&document);
    let engine = XPathEvaluator::new();
    let err = engine
        .evaluate("count(a)/b", &root, None, ResultKind::Any)
        .unwrap_err();
    assert_eq!(err.code, openrosa_xpath::ErrorCode::Type);
}
