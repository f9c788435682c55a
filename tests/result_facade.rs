use openrosa_xpath::model::simple::{doc, elem, text, SimpleNode};
use openrosa_xpath::{ErrorCode, ResultKind, XPathEvaluator, XPathNode};

fn sample() -> SimpleNode {
    doc()
        .child(
            elem("r")
                .child(elem("a").child(text("1")))
                .child(elem("a").child(text("2"))),
        )
        .build()
}

fn root_of(document: &SimpleNode) -> SimpleNode {
    document.children()[0].clone()
}

#[test]
fn result_kind_codes_round_trip() {
    for code in 0..=9 {
        let kind = ResultKind::from_code(code).unwrap();
        assert_eq!(kind.code(), code);
    }
    assert!(ResultKind::from_code(10).is_none());
}

#[test]
fn any_picks_a_kind_from_the_value() {
    let document = sample();
    let root = root_of(&document);
    let engine = XPathEvaluator::new();
    let kinds = [
        ("a", ResultKind::UnorderedNodeIterator),
        ("1 + 1", ResultKind::Number),
        ("'s'", ResultKind::String),
        ("true()", ResultKind::Boolean),
        ("today()", ResultKind::String),
    ];
    for (src, expected) in kinds {
        let result = engine.evaluate(src, &root, None, ResultKind::Any).unwrap();
        assert_eq!(result.result_type(), expected, "for {}", src);
    }
}

#[test]
fn iterator_cursor_walks_to_the_end() {
    let document = sample();
    let root = root_of(&document);
    let engine = XPathEvaluator::new();
    let mut result = engine
        .evaluate("a", &root, None, ResultKind::OrderedNodeIterator)
        .unwrap();
    let mut seen = Vec::new();
    while let Some(node) = result.iterate_next().unwrap() {
        seen.push(node.string_value());
    }
    assert_eq!(seen, vec!["1", "2"]);
    assert!(result.iterate_next().unwrap().is_none());
    assert!(!result.invalid_iterator_state());
}

#[test]
fn snapshot_accessors() {
    let document = sample();
    let root = root_of(&document);
    let engine = XPathEvaluator::new();
    let result = engine
        .evaluate("a", &root, None, ResultKind::OrderedNodeSnapshot)
        .unwrap();
    assert_eq!(result.snapshot_length().unwrap(), 2);
    assert!(result.snapshot_item(0).unwrap().is_some());
    assert!(result.snapshot_item(5).unwrap().is_none());
}

#[test]
fn single_node_kinds_take_the_first_match() {
    let document = sample();
    let root = root_of(&document);
    let engine = XPathEvaluator::new();
    let result = engine
        .evaluate("a", &root, None, ResultKind::FirstOrderedNode)
        .unwrap();
    let node = result.single_node_value().unwrap().unwrap();
    assert_eq!(node.string_value(), "1");

    let empty = engine
        .evaluate("missing", &root, None, ResultKind::FirstOrderedNode)
        .unwrap();
    assert!(empty.single_node_value().unwrap().is_none());
}

#[test]
fn wrong_kind_accessors_raise_type_err() {
    let document = sample();
    let root = root_of(&document);
    let engine = XPathEvaluator::new();
    let mut result = engine
        .evaluate("count(a)", &root, None, ResultKind::Number)
        .unwrap();
    assert_eq!(result.number_value().unwrap(), 2.0);
    assert_eq!(result.string_value().unwrap_err().code, ErrorCode::Type);
    assert_eq!(result.boolean_value().unwrap_err().code, ErrorCode::Type);
    assert_eq!(result.iterate_next().unwrap_err().code, ErrorCode::Type);
    assert_eq!(result.snapshot_length().unwrap_err().code, ErrorCode::Type);
    assert_eq!(
        result.single_node_value().unwrap_err().code,
        ErrorCode::Type
    );
}

#[test]
fn primitive_results_cannot_become_node_sets() {
    let document = sample();
    let root = root_of(&document);
    let engine = XPathEvaluator::new();
    let err = engine
        .evaluate("count(a)", &root, None, ResultKind::OrderedNodeSnapshot)
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::Type);
    assert_eq!(err.code.dom_code(), Some(52));
}

#[test]
fn node_sets_convert_to_every_primitive_kind() {
    let document = sample();
    let root = root_of(&document);
    let engine = XPathEvaluator::new();
    let n = engine
        .evaluate("a", &root, None, ResultKind::Number)
        .unwrap();
    assert_eq!(n.number_value().unwrap(), 1.0);
    let s = engine
        .evaluate("a", &root, None, ResultKind::String)
        .unwrap();
    assert_eq!(s.string_value().unwrap(), "1");
    let b = engine
        .evaluate("missing", &root, None, ResultKind::Boolean)
        .unwrap();
    assert!(!b.boolean_value().unwrap());
}
