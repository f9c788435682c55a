use openrosa_xpath::model::simple::{doc, elem, text, SimpleNode};
use openrosa_xpath::{ResultKind, XPathEvaluator};

fn context() -> SimpleNode {
    doc().child(elem("r").child(text("8"))).build()
}

fn num(engine: &XPathEvaluator<SimpleNode>, ctx: &SimpleNode, src: &str) -> f64 {
    engine
        .evaluate(src, ctx, None, ResultKind::Number)
        .unwrap()
        .number_value()
        .unwrap()
}

fn truth(engine: &XPathEvaluator<SimpleNode>, ctx: &SimpleNode, src: &str) -> bool {
    engine
        .evaluate(src, ctx, None, ResultKind::Boolean)
        .unwrap()
        .boolean_value()
        .unwrap()
}

#[test]
fn basic_arithmetic() {
    let ctx = context();
    let engine = XPathEvaluator::new();
    assert_eq!(num(&engine, &ctx, "1 + 2 * 3"), 7.0);
    assert_eq!(num(&engine, &ctx, "(1 + 2) * 3"), 9.0);
    assert_eq!(num(&engine, &ctx, "7 mod 3"), 1.0);
    assert_eq!(num(&engine, &ctx, "-7 mod 3"), -1.0);
    assert_eq!(num(&engine, &ctx, "10 div 4"), 2.5);
    assert_eq!(num(&engine, &ctx, "-(3)"), -3.0);
    assert_eq!(num(&engine, &ctx, "1 - -2"), 3.0);
}

#[test]
fn division_follows_ieee754() {
    let ctx = context();
    let engine = XPathEvaluator::new();
    assert_eq!(num(&engine, &ctx, "1 div 0"), f64::INFINITY);
    assert_eq!(num(&engine, &ctx, "-1 div 0"), f64::NEG_INFINITY);
    assert!(num(&engine, &ctx, "0 div 0").is_nan());
    assert!(num(&engine, &ctx, "0 mod 0").is_nan());
}

#[test]
fn strings_coerce_to_numbers_in_arithmetic() {
    let ctx = context();
    let engine = XPathEvaluator::new();
    assert_eq!(num(&engine, &ctx, "'2' + '3'"), 5.0);
    assert!(num(&engine, &ctx, "'two' + 1").is_nan());
}

#[test]
fn node_sets_coerce_through_their_first_node() {
    let document = doc()
        .child(elem("r").child(elem("n").child(text("4"))))
        .build();
    let root = {
        use openrosa_xpath::XPathNode;
        document.children()[0].clone()
    };
    let engine = XPathEvaluator::new();
    assert_eq!(num(&engine, &root, "n + 1"), 5.0);
}

#[test]
fn or_and_short_circuit() {
    let ctx = context();
    let engine = XPathEvaluator::new();
    // the right side would raise "unknown function" if evaluated
    assert!(truth(&engine, &ctx, "true() or unknownfn()"));
    assert!(!truth(&engine, &ctx, "false() and unknownfn()"));
    assert!(engine
        .evaluate("false() or unknownfn()", &ctx, None, ResultKind::Boolean)
        .is_err());
}

#[test]
fn boolean_round_trips() {
    let ctx = context();
    let engine = XPathEvaluator::new();
    assert!(truth(&engine, &ctx, "not(not(true()))"));
    assert!(!truth(&engine, &ctx, "not(not(false()))"));
    assert!(truth(&engine, &ctx, "boolean(number(true())) = true()"));
    assert!(truth(&engine, &ctx, "boolean(number(false())) = false()"));
}
