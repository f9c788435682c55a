use openrosa_xpath::model::simple::{attr, comment, doc, elem, pi, text, SimpleNode};
use openrosa_xpath::{Node, ResultKind, XPathEvaluator, XPathNode};

// <doc>
//   <root>
//     <a id="1"><b>one</b><c/></a>
//     <?skip me?>
//     <b>two</b>
//     <!-- note -->
//     <a id="2"/>
//   </root>
// </doc>
fn sample() -> SimpleNode {
    doc()
        .child(
            elem("root")
                .child(
                    elem("a")
                        .attr(attr("id", "1"))
                        .child(elem("b").child(text("one")))
                        .child(elem("c")),
                )
                .child(pi("skip", "me"))
                .child(elem("b").child(text("two")))
                .child(comment("note"))
                .child(elem("a").attr(attr("id", "2"))),
        )
        .build()
}

fn root_of(document: &SimpleNode) -> SimpleNode {
    document.children()[0].clone()
}

fn names(engine: &XPathEvaluator<SimpleNode>, ctx: &SimpleNode, src: &str) -> Vec<String> {
    let result = engine
        .evaluate(src, ctx, None, ResultKind::OrderedNodeSnapshot)
        .unwrap();
    let mut out = Vec::new();
    for i in 0..result.snapshot_length().unwrap() {
        let node = result.snapshot_item(i).unwrap().unwrap();
        out.push(node.raw_name().unwrap_or_default());
    }
    out
}

#[test]
fn child_axis_selects_elements_in_order() {
    let document = sample();
    let root = root_of(&document);
    let engine = XPathEvaluator::new();
    assert_eq!(names(&engine, &root, "child::*"), vec!["a", "b", "a"]);
    assert_eq!(names(&engine, &root, "a"), vec!["a", "a"]);
}

#[test]
fn descendant_axis_is_preorder() {
    let document = sample();
    let root = root_of(&document);
    let engine = XPathEvaluator::new();
    assert_eq!(
        names(&engine, &root, "descendant::*"),
        vec!["a", "b", "c", "b", "a"]
    );
}

#[test]
fn descendant_or_self_includes_context() {
    let document = sample();
    let root = root_of(&document);
    let engine = XPathEvaluator::new();
    assert_eq!(
        names(&engine, &root, "descendant-or-self::*"),
        vec!["root", "a", "b", "c", "b", "a"]
    );
}

#[test]
fn parent_and_ancestor_axes() {
    let document = sample();
    let root = root_of(&document);
    let engine = XPathEvaluator::new();
    assert_eq!(names(&engine, &root, "a/b/.."), vec!["a"]);
    // document root has no name; ancestor list is [root, <doc>]
    let result = engine
        .evaluate(
            "a/b/ancestor::node()",
            &root,
            None,
            ResultKind::OrderedNodeSnapshot,
        )
        .unwrap();
    assert_eq!(result.snapshot_length().unwrap(), 3);
}

#[test]
fn sibling_axes() {
    let document = sample();
    let root = root_of(&document);
    let engine = XPathEvaluator::new();
    assert_eq!(
        names(&engine, &root, "a[1]/following-sibling::*"),
        vec!["b", "a"]
    );
    assert_eq!(
        names(&engine, &root, "b/preceding-sibling::*"),
        vec!["a"]
    );
}

#[test]
fn following_axis_excludes_descendants() {
    let document = sample();
    let root = root_of(&document);
    let engine = XPathEvaluator::new();
    // following of the first <b> (inside a): c, then root's b, then a
    assert_eq!(
        names(&engine, &root, "a/b/following::*"),
        vec!["c", "b", "a"]
    );
}

#[test]
fn preceding_axis_excludes_ancestors() {
    let document = sample();
    let root = root_of(&document);
    let engine = XPathEvaluator::new();
    // preceding of root's second a, document order after sorting
    assert_eq!(
        names(&engine, &root, "a[2]/preceding::*"),
        vec!["a", "b", "c", "b"]
    );
}

#[test]
fn attribute_axis() {
    let document = sample();
    let root = root_of(&document);
    let engine = XPathEvaluator::new();
    let result = engine
        .evaluate("a/@id", &root, None, ResultKind::OrderedNodeSnapshot)
        .unwrap();
    assert_eq!(result.snapshot_length().unwrap(), 2);
    let values: Vec<String> = (0..2)
        .map(|i| {
            result
                .snapshot_item(i)
                .unwrap()
                .unwrap()
                .string_value()
        })
        .collect();
    assert_eq!(values, vec!["1", "2"]);
}

#[test]
fn self_axis_with_name_test() {
    let document = sample();
    let root = root_of(&document);
    let engine = XPathEvaluator::new();
    assert_eq!(names(&engine, &root, "self::root"), vec!["root"]);
    assert!(names(&engine, &root, "self::other").is_empty());
}

#[test]
fn node_tests_filter_kinds() {
    let document = sample();
    let root = root_of(&document);
    let engine = XPathEvaluator::new();
    let count = |src: &str| {
        engine
            .evaluate(src, &root, None, ResultKind::Number)
            .unwrap()
            .number_value()
            .unwrap()
    };
    assert_eq!(count("count(child::node())"), 5.0);
    assert_eq!(count("count(comment())"), 1.0);
    assert_eq!(count("count(processing-instruction())"), 1.0);
    assert_eq!(count("count(processing-instruction('skip'))"), 1.0);
    assert_eq!(count("count(processing-instruction('other'))"), 0.0);
    assert_eq!(count("count(a/b/text())"), 1.0);
}

#[test]
fn attribute_nodes_sort_before_children() {
    let document = sample();
    let root = root_of(&document);
    let engine = XPathEvaluator::new();
    let result = engine
        .evaluate(
            "a[1]/@id | a[1]/b",
            &root,
            None,
            ResultKind::OrderedNodeSnapshot,
        )
        .unwrap();
    assert_eq!(result.snapshot_length().unwrap(), 2);
    let first = result.snapshot_item(0).unwrap().unwrap();
    assert!(matches!(first, Node::Tree(n) if n.kind() == openrosa_xpath::NodeKind::Attribute));
}
