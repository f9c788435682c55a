use std::collections::HashSet;

use crate::engine::evaluator::xforms_position;
use crate::engine::node::Node;
use crate::engine::node_set::{DocOrder, NodeSet};
use crate::engine::runtime::{CallCtx, Error, FunctionRegistry, Options, Param};
use crate::model::{NodeKind, XPathNode};
use crate::value::{Kind, Value};

pub(super) fn register<N: XPathNode>(r: &mut FunctionRegistry<N>) {
    super::add(r, "last", &[], Kind::Number, last_fn);
    super::add(
        r,
        "position",
        &[Param::optional(Kind::NodeSet)],
        Kind::Number,
        position_fn,
    );
    super::add(
        r,
        "count",
        &[Param::required(Kind::NodeSet)],
        Kind::Number,
        count_fn,
    );
    super::add(r, "id", &[Param::required(Kind::Any)], Kind::NodeSet, id_fn);
    super::add(
        r,
        "local-name",
        &[Param::optional(Kind::NodeSet)],
        Kind::String,
        local_name_fn,
    );
    super::add(
        r,
        "namespace-uri",
        &[Param::optional(Kind::NodeSet)],
        Kind::String,
        namespace_uri_fn,
    );
    super::add(
        r,
        "name",
        &[Param::optional(Kind::NodeSet)],
        Kind::String,
        name_fn,
    );
}

fn last_fn<N: XPathNode>(ctx: &CallCtx<'_, N>, _args: &[Value<N>]) -> Result<Value<N>, Error> {
    Ok(Value::Number(ctx.size as f64))
}

/// With no argument, the context position. With a single-node argument,
/// the XForms reading: the node's 1-based index among preceding siblings
/// of the same tag name.
fn position_fn<N: XPathNode>(ctx: &CallCtx<'_, N>, args: &[Value<N>]) -> Result<Value<N>, Error> {
    match args.first() {
        None => Ok(Value::Number(ctx.position as f64)),
        Some(v) => {
            let ns = v.as_node_set()?;
            if ns.len() != 1 {
                return Err(Error::evaluation(
                    "position() requires a single-node argument",
                ));
            }
            let n = xforms_position(&ns.nodes()[0], ctx.options)?;
            Ok(Value::Number(n))
        }
    }
}

fn count_fn<N: XPathNode>(_ctx: &CallCtx<'_, N>, args: &[Value<N>]) -> Result<Value<N>, Error> {
    Ok(Value::Number(args[0].as_node_set()?.len() as f64))
}

/// Elements of the context document whose unique-id attribute (per the
/// `unique_ids` option) equals one of the whitespace-separated tokens of
/// the argument. Node-set arguments contribute the tokens of every member.
fn id_fn<N: XPathNode>(ctx: &CallCtx<'_, N>, args: &[Value<N>]) -> Result<Value<N>, Error> {
    let mut wanted: HashSet<String> = HashSet::new();
    match &args[0] {
        Value::NodeSet(ns) => {
            for node in ns.iter() {
                for t in super::tokens(&node.string_value()) {
                    wanted.insert(t.to_string());
                }
            }
        }
        other => {
            for t in super::tokens(&other.to_xpath_string()) {
                wanted.insert(t.to_string());
            }
        }
    }
    let mut out = NodeSet::new(DocOrder::Document);
    if wanted.is_empty() {
        return Ok(Value::NodeSet(out));
    }
    let mut stack = vec![ctx.node.document_root()];
    while let Some(node) = stack.pop() {
        if node.kind() == NodeKind::Element {
            if let Some(idv) = unique_id_value(&node, ctx.options)? {
                if wanted.contains(&idv) {
                    out.push(node.clone());
                }
            }
        }
        // preserve pre-order: push children reversed
        let mut children = node.children();
        children.reverse();
        stack.extend(children);
    }
    Ok(Value::NodeSet(out))
}

/// The unique-id attribute value of an element, per the `unique_ids`
/// option: either an attribute in a registered namespace with the mapped
/// local name (`xml:id`), or an un-prefixed attribute with the mapped name
/// on an element whose own namespace is registered (XHTML `id`).
fn unique_id_value<N: XPathNode>(
    el: &Node<N>,
    options: &Options,
) -> Result<Option<String>, Error> {
    let el_ns = el.expanded_name(options)?.and_then(|e| e.ns_uri);
    for a in el.attributes() {
        let Some(expanded) = a.expanded_name(options)? else {
            continue;
        };
        match &expanded.ns_uri {
            Some(uri) => {
                if options.unique_ids.get(uri) == Some(&expanded.local) {
                    return Ok(Some(a.string_value()));
                }
            }
            None => {
                if let Some(el_uri) = &el_ns {
                    if options.unique_ids.get(el_uri) == Some(&expanded.local) {
                        return Ok(Some(a.string_value()));
                    }
                }
            }
        }
    }
    Ok(None)
}

fn target_node<'a, N: XPathNode>(
    ctx: &'a CallCtx<'_, N>,
    args: &'a [Value<N>],
) -> Result<Option<&'a Node<N>>, Error> {
    match args.first() {
        None => Ok(Some(ctx.node)),
        Some(v) => Ok(v.as_node_set()?.first_in_document_order()),
    }
}

fn local_name_fn<N: XPathNode>(ctx: &CallCtx<'_, N>, args: &[Value<N>]) -> Result<Value<N>, Error> {
    let Some(node) = target_node(ctx, args)? else {
        return Ok(Value::String(String::new()));
    };
    let local = node
        .expanded_name(ctx.options)?
        .map(|e| e.local)
        .unwrap_or_default();
    Ok(Value::String(local))
}

fn namespace_uri_fn<N: XPathNode>(
    ctx: &CallCtx<'_, N>,
    args: &[Value<N>],
) -> Result<Value<N>, Error> {
    let Some(node) = target_node(ctx, args)? else {
        return Ok(Value::String(String::new()));
    };
    let uri = node
        .expanded_name(ctx.options)?
        .and_then(|e| e.ns_uri)
        .unwrap_or_default();
    Ok(Value::String(uri))
}

fn name_fn<N: XPathNode>(ctx: &CallCtx<'_, N>, args: &[Value<N>]) -> Result<Value<N>, Error> {
    let Some(node) = target_node(ctx, args)? else {
        return Ok(Value::String(String::new()));
    };
    Ok(Value::String(node.raw_name().unwrap_or_default()))
}
