use proptest::prelude::*;

use openrosa_xpath::model::simple::{doc, elem, text, SimpleNode};
use openrosa_xpath::value::{number_to_string, string_to_number};
use openrosa_xpath::{ResultKind, XPathEvaluator, XPathNode};

fn context() -> SimpleNode {
    doc().child(elem("r")).build()
}

proptest! {
    // string(number(string(number n))) == string(n)
    #[test]
    fn canonical_number_string_is_idempotent(n in proptest::num::f64::NORMAL) {
        let once = number_to_string(n);
        let twice = number_to_string(string_to_number(&once));
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn double_negation_is_identity(b in any::<bool>()) {
        let ctx = context();
        let engine = XPathEvaluator::new();
        let src = format!("not(not({}))", if b { "true()" } else { "false()" });
        let out = engine
            .evaluate(&src, &ctx, None, ResultKind::Boolean)
            .unwrap()
            .boolean_value()
            .unwrap();
        prop_assert_eq!(out, b);
    }

    #[test]
    fn boolean_number_round_trip(b in any::<bool>()) {
        let ctx = context();
        let engine = XPathEvaluator::new();
        let src = format!("boolean(number({}()))", if b { "true" } else { "false" });
        let out = engine
            .evaluate(&src, &ctx, None, ResultKind::Boolean)
            .unwrap()
            .boolean_value()
            .unwrap();
        prop_assert_eq!(out, b);
    }

    // unions over arbitrary child subsets stay document-ordered and distinct
    #[test]
    fn union_is_ordered_and_distinct(values in proptest::collection::vec(0u8..5, 1..6)) {
        let mut r = elem("r");
        for v in &values {
            r = r.child(elem(match *v {
                0 => "a",
                1 => "b",
                2 => "c",
                3 => "d",
                _ => "e",
            }));
        }
        let document = doc().child(r).build();
        let root = document.children()[0].clone();
        let engine = XPathEvaluator::new();
        let result = engine
            .evaluate("a | b | c | a | b", &root, None, ResultKind::OrderedNodeSnapshot)
            .unwrap();
        let len = result.snapshot_length().unwrap();
        // distinct: no node appears twice
        for i in 0..len {
            for j in (i + 1)..len {
                let x = result.snapshot_item(i).unwrap().unwrap();
                let y = result.snapshot_item(j).unwrap().unwrap();
                prop_assert_ne!(x, y);
            }
        }
        // ordered: members appear in the same order as the full child list
        let all = engine
            .evaluate("*", &root, None, ResultKind::OrderedNodeSnapshot)
            .unwrap();
        let mut last_index = None;
        for i in 0..len {
            let node = result.snapshot_item(i).unwrap().unwrap();
            let index = (0..all.snapshot_length().unwrap())
                .find(|&j| all.snapshot_item(j).unwrap().unwrap() == node);
            prop_assert!(index.is_some());
            if let (Some(prev), Some(cur)) = (last_index, index) {
                prop_assert!(cur > prev);
            }
            last_index = index;
        }
    }

    // expressions without side-effecting functions evaluate deterministically
    #[test]
    fn evaluation_is_deterministic(a in -1000i32..1000, b in 1i32..100) {
        let document = doc()
            .child(elem("r").child(elem("n").child(text("7"))))
            .build();
        let root = document.children()[0].clone();
        let engine = XPathEvaluator::new();
        let src = format!("n * {} + {} mod n", a, b);
        let first = engine
            .evaluate(&src, &root, None, ResultKind::Number)
            .unwrap()
            .number_value()
            .unwrap();
        let second = engine
            .evaluate(&src, &root, None, ResultKind::Number)
            .unwrap()
            .number_value()
            .unwrap();
        prop_assert_eq!(first, second);
    }
}
