use rstest::rstest;

use openrosa_xpath::model::simple::{attr, doc, elem, text, SimpleNode};
use openrosa_xpath::{ResultKind, XPathEvaluator};

fn context() -> SimpleNode {
    doc().child(elem("r").child(text("  hi  "))).build()
}

fn string(engine: &XPathEvaluator<SimpleNode>, ctx: &SimpleNode, src: &str) -> String {
    engine
        .evaluate(src, ctx, None, ResultKind::String)
        .unwrap()
        .string_value()
        .unwrap()
        .to_string()
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

#[rstest]
#[case("concat('a', 'b', 'c')", "abc")]
#[case("concat('solo')", "solo")]
#[case("concat(1, '-', 2)", "1-2")]
#[case("substring('12345', 2, 3)", "234")]
#[case("substring('12345', 1.5, 2.6)", "234")]
#[case("substring('12345', 0, 3)", "12")]
#[case("substring('12345', 2)", "2345")]
#[case("substring-before('1999/04/01', '/')", "1999")]
#[case("substring-after('1999/04/01', '/')", "04/01")]
#[case("normalize-space('  a   b  ')", "a b")]
#[case("translate('bar', 'abc', 'ABC')", "BAr")]
#[case("translate('--aaa--', 'abc-', 'ABC')", "AAA")]
#[case("string(12)", "12")]
#[case("string(12.5)", "12.5")]
#[case("string(true())", "true")]
#[case("substr('hello', 1, 3)", "el")]
#[case("substr('hello', -2)", "lo")]
#[case("substr('hello', 0, -1)", "hell")]
fn string_functions(#[case] src: &str, #[case] expected: &str) {
    let ctx = context();
    let engine = XPathEvaluator::new();
    assert_eq!(string(&engine, &ctx, src), expected);
}

#[rstest]
#[case("starts-with('hello', 'he')", true)]
#[case("starts-with('hello', 'lo')", false)]
#[case("ends-with('hello', 'lo')", true)]
#[case("contains('hello', 'ell')", true)]
#[case("contains('hello', 'xyz')", false)]
fn string_predicates(#[case] src: &str, #[case] expected: bool) {
    let ctx = context();
    let engine = XPathEvaluator::new();
    assert_eq!(truth(&engine, &ctx, src), expected);
}

#[test]
fn string_defaults_to_context_node() {
    let ctx = context();
    let engine = XPathEvaluator::new();
    assert_eq!(string(&engine, &ctx, "string()"), "  hi  ");
    assert_eq!(num(&engine, &ctx, "string-length()"), 6.0);
    assert_eq!(string(&engine, &ctx, "normalize-space()"), "hi");
}

#[rstest]
#[case("floor(2.7)", 2.0)]
#[case("ceiling(2.1)", 3.0)]
#[case("round(2.5)", 3.0)]
#[case("round(-2.5)", -2.0)]
#[case("round(1.2345, 2)", 1.23)]
#[case("round(1678, -2)", 1700.0)]
#[case("int(-1.7)", -1.0)]
#[case("int(7.9)", 7.0)]
#[case("abs(-4.5)", 4.5)]
#[case("string-length('héllo')", 5.0)]
fn numeric_functions(#[case] src: &str, #[case] expected: f64) {
    let ctx = context();
    let engine = XPathEvaluator::new();
    assert_eq!(num(&engine, &ctx, src), expected);
}

#[test]
fn math_extensions() {
    let ctx = context();
    let engine = XPathEvaluator::new();
    assert_eq!(num(&engine, &ctx, "pow(2, 10)"), 1024.0);
    assert_eq!(num(&engine, &ctx, "sqrt(81)"), 9.0);
    assert!((num(&engine, &ctx, "pi()") - std::f64::consts::PI).abs() < 1e-12);
    assert!((num(&engine, &ctx, "sin(0)")).abs() < 1e-12);
    assert!((num(&engine, &ctx, "cos(0)") - 1.0).abs() < 1e-12);
    assert!((num(&engine, &ctx, "exp(0)") - 1.0).abs() < 1e-12);
    assert!((num(&engine, &ctx, "exp10(3)") - 1000.0).abs() < 1e-9);
    assert!((num(&engine, &ctx, "log(exp(1))") - 1.0).abs() < 1e-12);
    assert!((num(&engine, &ctx, "log10(1000)") - 3.0).abs() < 1e-12);
    assert!((num(&engine, &ctx, "atan2(1, 1)") - std::f64::consts::FRAC_PI_4).abs() < 1e-12);
}

#[test]
fn canonical_number_strings_round_trip() {
    let ctx = context();
    let engine = XPathEvaluator::new();
    for n in ["5", "-5", "0.5", "-0.125", "1000000", "0"] {
        let src = format!("string(number(string(number({}))))", n);
        assert_eq!(string(&engine, &ctx, &src), n);
    }
    assert_eq!(string(&engine, &ctx, "string(1 div 0)"), "Infinity");
    assert_eq!(string(&engine, &ctx, "string(-1 div 0)"), "-Infinity");
    assert_eq!(string(&engine, &ctx, "string(0 div 0)"), "NaN");
}

#[test]
fn lang_matches_ranges_case_insensitively() {
    let document = doc()
        .child(
            elem("root")
                .attr(attr("xml:lang", "en-US"))
                .child(elem("leaf").child(text("x"))),
        )
        .build();
    let leaf = {
        use openrosa_xpath::XPathNode;
        document.children()[0].children()[0].clone()
    };
    let engine = XPathEvaluator::new();
    assert!(truth(&engine, &leaf, "lang('en')"));
    assert!(truth(&engine, &leaf, "lang('EN-us')"));
    assert!(!truth(&engine, &leaf, "lang('fr')"));
}

#[test]
fn case_insensitive_name_matching_by_default() {
    let document = doc()
        .child(elem("Root").child(elem("Item").child(text("v"))))
        .build();
    let root = {
        use openrosa_xpath::XPathNode;
        document.children()[0].clone()
    };
    let engine = XPathEvaluator::new();
    assert_eq!(num(&engine, &root, "count(item)"), 1.0);
    assert_eq!(num(&engine, &root, "count(ITEM)"), 1.0);

    let mut strict = XPathEvaluator::new();
    strict.options_mut().case_sensitive = true;
    let n = strict
        .evaluate("count(item)", &root, None, ResultKind::Number)
        .unwrap()
        .number_value()
        .unwrap();
    assert_eq!(n, 0.0);
}
