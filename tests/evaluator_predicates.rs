use openrosa_xpath::model::simple::{doc, elem, text, SimpleNode};
use openrosa_xpath::{ResultKind, XPathEvaluator, XPathNode};

fn sample() -> SimpleNode {
    doc()
        .child(
            elem("r")
                .child(elem("a").child(text("1")))
                .child(elem("a").child(text("2")))
                .child(elem("a").child(text("3")))
                .child(elem("a").child(text("4"))),
        )
        .build()
}

fn root_of(document: &SimpleNode) -> SimpleNode {
    document.children()[0].clone()
}

fn values(engine: &XPathEvaluator<SimpleNode>, ctx: &SimpleNode, src: &str) -> Vec<String> {
    let result = engine
        .evaluate(src, ctx, None, ResultKind::OrderedNodeSnapshot)
        .unwrap();
    (0..result.snapshot_length().unwrap())
        .map(|i| result.snapshot_item(i).unwrap().unwrap().string_value())
        .collect()
}

#[test]
fn numeric_predicate_selects_by_proximity_position() {
    let document = sample();
    let root = root_of(&document);
    let engine = XPathEvaluator::new();
    assert_eq!(values(&engine, &root, "a[2]"), vec!["2"]);
    assert_eq!(values(&engine, &root, "a[position() = 3]"), vec!["3"]);
    assert_eq!(values(&engine, &root, "a[last()]"), vec!["4"]);
}

#[test]
fn reverse_axis_counts_from_the_far_end() {
    let document = sample();
    let root = root_of(&document);
    let engine = XPathEvaluator::new();
    // nearest preceding sibling first
    assert_eq!(
        values(&engine, &root, "a[4]/preceding-sibling::a[1]"),
        vec!["3"]
    );
    assert_eq!(
        values(&engine, &root, "a[4]/preceding-sibling::a[3]"),
        vec!["1"]
    );
    let leaf = root.children()[0].clone();
    assert_eq!(
        values(&engine, &leaf, "ancestor::node()[1]/a[1]"),
        vec!["1"]
    );
}

#[test]
fn boolean_predicates_filter() {
    let document = sample();
    let root = root_of(&document);
    let engine = XPathEvaluator::new();
    assert_eq!(values(&engine, &root, "a[. > 2]"), vec!["3", "4"]);
    assert_eq!(values(&engine, &root, "a[false()]"), Vec::<String>::new());
    assert_eq!(values(&engine, &root, "a[text()]").len(), 4);
}

#[test]
fn predicates_chain_with_renumbered_positions() {
    let document = sample();
    let root = root_of(&document);
    let engine = XPathEvaluator::new();
    // first filter keeps 3 and 4, second picks the first of those
    assert_eq!(values(&engine, &root, "a[. > 2][1]"), vec!["3"]);
    assert_eq!(values(&engine, &root, "a[. > 2][2]"), vec!["4"]);
}

#[test]
fn predicate_over_filter_expression() {
    let document = sample();
    let root = root_of(&document);
    let engine = XPathEvaluator::new();
    assert_eq!(values(&engine, &root, "(a | a[1])[2]"), vec!["2"]);
}

#[test]
fn scenario_count_with_comparison_predicate() {
    let document = doc()
        .child(
            elem("r")
                .child(elem("a").child(text("1")))
                .child(elem("a").child(text("2")))
                .child(elem("a").child(text("3"))),
        )
        .build();
    let root = root_of(&document);
    let engine = XPathEvaluator::new();
    let n = engine
        .evaluate("count(a[. > 1])", &root, None, ResultKind::Number)
        .unwrap()
        .number_value()
        .unwrap();
    assert_eq!(n, 2.0);
}
