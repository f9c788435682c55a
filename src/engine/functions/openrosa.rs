//! XForms/OpenRosa form-engine extensions: multi-select helpers,
//! checklists, conditionals and the deterministic node-set shuffle.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::engine::node_set::{DocOrder, NodeSet};
use crate::engine::runtime::{CallCtx, Error, FunctionRegistry, Param};
use crate::model::XPathNode;
use crate::value::{Kind, Value};

pub(super) fn register<N: XPathNode>(r: &mut FunctionRegistry<N>) {
    super::add(
        r,
        "selected",
        &[Param::required(Kind::String), Param::required(Kind::String)],
        Kind::Boolean,
        selected_fn,
    );
    super::add(
        r,
        "selected-at",
        &[Param::required(Kind::String), Param::required(Kind::Number)],
        Kind::String,
        selected_at_fn,
    );
    super::add(
        r,
        "count-selected",
        &[Param::required(Kind::NodeSet)],
        Kind::Number,
        count_selected_fn,
    );
    super::add(
        r,
        "count-non-empty",
        &[Param::required(Kind::NodeSet)],
        Kind::Number,
        count_non_empty_fn,
    );
    super::add(
        r,
        "checklist",
        &[
            Param::required(Kind::Number),
            Param::required(Kind::Number),
            Param::variadic(Kind::Any),
        ],
        Kind::Boolean,
        checklist_fn,
    );
    super::add(
        r,
        "weighted-checklist",
        &[
            Param::required(Kind::Number),
            Param::required(Kind::Number),
            Param::variadic(Kind::Any),
        ],
        Kind::Boolean,
        weighted_checklist_fn,
    );
    super::add(
        r,
        "boolean-from-string",
        &[Param::required(Kind::String)],
        Kind::Boolean,
        |_, args: &[Value<N>]| Ok(Value::Boolean(string_truth(&args[0].to_xpath_string()))),
    );
    super::add(
        r,
        "if",
        &[
            Param::required(Kind::Boolean),
            Param::required(Kind::Any),
            Param::required(Kind::Any),
        ],
        Kind::Any,
        if_fn,
    );
    super::add(
        r,
        "coalesce",
        &[Param::required(Kind::Any), Param::required(Kind::Any)],
        Kind::String,
        coalesce_fn,
    );
    super::add(
        r,
        "once",
        &[Param::required(Kind::Any)],
        Kind::String,
        once_fn,
    );
    super::add(
        r,
        "randomize",
        &[
            Param::required(Kind::NodeSet),
            Param::optional(Kind::Number),
        ],
        Kind::NodeSet,
        randomize_fn,
    );
}

/// XForms boolean lexical form: `"true"` (any case) or `"1"`.
fn string_truth(s: &str) -> bool {
    s == "1" || s.to_lowercase() == "true"
}

fn selected_fn<N: XPathNode>(_ctx: &CallCtx<'_, N>, args: &[Value<N>]) -> Result<Value<N>, Error> {
    let haystack = args[0].to_xpath_string();
    let needle = args[1].to_xpath_string();
    let needle = needle.trim();
    Ok(Value::Boolean(
        super::tokens(&haystack).iter().any(|t| *t == needle),
    ))
}

fn selected_at_fn<N: XPathNode>(
    _ctx: &CallCtx<'_, N>,
    args: &[Value<N>],
) -> Result<Value<N>, Error> {
    let haystack = args[0].to_xpath_string();
    let index = args[1].to_number();
    let out = if index.is_nan() || index < 0.0 {
        String::new()
    } else {
        super::tokens(&haystack)
            .get(index.trunc() as usize)
            .map(|t| t.to_string())
            .unwrap_or_default()
    };
    Ok(Value::String(out))
}

fn count_selected_fn<N: XPathNode>(
    _ctx: &CallCtx<'_, N>,
    args: &[Value<N>],
) -> Result<Value<N>, Error> {
    let ns = args[0].as_node_set()?;
    let count = ns
        .first_in_document_order()
        .map(|n| super::tokens(&n.string_value()).len())
        .unwrap_or(0);
    Ok(Value::Number(count as f64))
}

fn count_non_empty_fn<N: XPathNode>(
    _ctx: &CallCtx<'_, N>,
    args: &[Value<N>],
) -> Result<Value<N>, Error> {
    let ns = args[0].as_node_set()?;
    let count = ns.iter().filter(|n| !n.string_value().is_empty()).count();
    Ok(Value::Number(count as f64))
}

/// One answer's contribution to a checklist count. Booleans, numbers and
/// dates count by their truth value; strings and node-set members are
/// XForms yes/no answers, so their content (not string length) decides.
fn answer_truths<N: XPathNode>(v: &Value<N>) -> Vec<bool> {
    match v {
        Value::Boolean(_) | Value::Number(_) | Value::Date(_) => vec![v.to_boolean()],
        Value::String(s) => vec![string_truth(s)],
        Value::NodeSet(ns) => ns
            .iter()
            .map(|n| string_truth(&n.string_value()))
            .collect(),
    }
}

fn within_bounds(count: f64, min: f64, max: f64) -> bool {
    (min < 0.0 || count >= min) && (max < 0.0 || count <= max)
}

fn checklist_fn<N: XPathNode>(_ctx: &CallCtx<'_, N>, args: &[Value<N>]) -> Result<Value<N>, Error> {
    let min = args[0].to_number();
    let max = args[1].to_number();
    let count = args[2..]
        .iter()
        .flat_map(answer_truths)
        .filter(|t| *t)
        .count() as f64;
    Ok(Value::Boolean(within_bounds(count, min, max)))
}

/// Pairs of (answer, weight) after the bounds; node-set answers may carry
/// a node-set of per-answer weights or a single weight for all.
fn weighted_checklist_fn<N: XPathNode>(
    _ctx: &CallCtx<'_, N>,
    args: &[Value<N>],
) -> Result<Value<N>, Error> {
    let min = args[0].to_number();
    let max = args[1].to_number();
    let rest = &args[2..];
    if rest.len() % 2 != 0 {
        return Err(Error::evaluation(
            "weighted-checklist requires value/weight pairs",
        ));
    }
    let mut total = 0.0;
    for pair in rest.chunks(2) {
        let answers = answer_truths(&pair[0]);
        let weights: Vec<f64> = match &pair[1] {
            Value::NodeSet(ns) => ns
                .iter()
                .map(|n| Value::<N>::String(n.string_value()).to_number())
                .collect(),
            other => vec![other.to_number()],
        };
        if weights.len() == 1 {
            for truth in &answers {
                if *truth {
                    total += weights[0];
                }
            }
        } else if weights.len() == answers.len() {
            for (truth, w) in answers.iter().zip(&weights) {
                if *truth {
                    total += w;
                }
            }
        } else {
            return Err(Error::evaluation(
                "weighted-checklist values and weights differ in length",
            ));
        }
    }
    Ok(Value::Boolean(within_bounds(total, min, max)))
}

fn if_fn<N: XPathNode>(_ctx: &CallCtx<'_, N>, args: &[Value<N>]) -> Result<Value<N>, Error> {
    Ok(if args[0].to_boolean() {
        args[1].clone()
    } else {
        args[2].clone()
    })
}

fn coalesce_fn<N: XPathNode>(_ctx: &CallCtx<'_, N>, args: &[Value<N>]) -> Result<Value<N>, Error> {
    let first = args[0].to_xpath_string();
    Ok(Value::String(if first.is_empty() {
        args[1].to_xpath_string()
    } else {
        first
    }))
}

/// The context node's current value when non-empty, otherwise the argument
/// (with `"NaN"` mapped to the empty string).
fn once_fn<N: XPathNode>(ctx: &CallCtx<'_, N>, args: &[Value<N>]) -> Result<Value<N>, Error> {
    let current = ctx.node.string_value();
    if !current.is_empty() {
        return Ok(Value::String(current));
    }
    let fresh = args[0].to_xpath_string();
    Ok(Value::String(if fresh == "NaN" {
        String::new()
    } else {
        fresh
    }))
}

/// Shuffle a node-set: deterministically for a given seed, uniformly
/// otherwise. The result keeps the document-order tag of its input shape
/// even though its members are permuted.
fn randomize_fn<N: XPathNode>(_ctx: &CallCtx<'_, N>, args: &[Value<N>]) -> Result<Value<N>, Error> {
    let mut set = args[0].as_node_set()?.clone();
    set.sort_document_order()?;
    let mut nodes = set.into_nodes();
    match args.get(1) {
        Some(seed) => {
            let mut rng = StdRng::seed_from_u64(seed.to_number().trunc() as i64 as u64);
            nodes.shuffle(&mut rng);
        }
        None => {
            let mut rng = rand::rng();
            nodes.shuffle(&mut rng);
        }
    }
    Ok(Value::NodeSet(NodeSet::from_nodes(
        nodes,
        DocOrder::Document,
    )))
}
