//! The AST walker: axes, node tests, predicates, path composition,
//! operators and function dispatch.

use std::collections::HashMap;

use crate::engine::compare;
use crate::engine::node::Node;
use crate::engine::node_set::{DocOrder, NodeSet};
use crate::engine::runtime::{CallCtx, Error, FunctionKey, FunctionRegistry, Options};
use crate::model::{NodeKind, XPathNode};
use crate::parser::ast::{ArithOp, Axis, Expr, NameTest, NodeTest};
use crate::value::Value;

/// Evaluation environment shared by every context of one walk.
pub(crate) struct Environment<'a, N: XPathNode> {
    pub functions: &'a FunctionRegistry<N>,
    pub variables: &'a HashMap<String, Value<N>>,
    /// Prefix → URI map pre-resolved at expression creation.
    pub namespaces: &'a HashMap<String, String>,
    pub options: &'a Options,
}

/// (node, position, size) over a borrowed environment.
pub(crate) struct Context<'a, N: XPathNode> {
    pub node: Node<N>,
    pub position: usize,
    pub size: usize,
    pub env: &'a Environment<'a, N>,
}

impl<'a, N: XPathNode> Context<'a, N> {
    fn at(&self, node: Node<N>, position: usize, size: usize) -> Context<'a, N> {
        Context {
            node,
            position,
            size,
            env: self.env,
        }
    }
}

pub(crate) fn eval<N: XPathNode>(ctx: &Context<'_, N>, expr: &Expr) -> Result<Value<N>, Error> {
    match expr {
        Expr::Number(n) => Ok(Value::Number(*n)),
        Expr::Literal(s) => Ok(Value::String(s.clone())),
        Expr::VarRef(name) => {
            let key = name.lexical();
            ctx.env
                .variables
                .get(&key)
                .cloned()
                .ok_or_else(|| Error::evaluation(format!("no binding for variable ${}", key)))
        }
        Expr::Or(l, r) => {
            if eval(ctx, l)?.to_boolean() {
                Ok(Value::Boolean(true))
            } else {
                Ok(Value::Boolean(eval(ctx, r)?.to_boolean()))
            }
        }
        Expr::And(l, r) => {
            if !eval(ctx, l)?.to_boolean() {
                Ok(Value::Boolean(false))
            } else {
                Ok(Value::Boolean(eval(ctx, r)?.to_boolean()))
            }
        }
        Expr::Compare { op, left, right } => {
            let l = eval(ctx, left)?;
            let r = eval(ctx, right)?;
            Ok(Value::Boolean(compare::compare(&l, &r, *op)?))
        }
        Expr::Arith { op, left, right } => {
            let l = eval(ctx, left)?.to_number();
            let r = eval(ctx, right)?.to_number();
            let out = match op {
                ArithOp::Add => l + r,
                ArithOp::Sub => l - r,
                ArithOp::Mul => l * r,
                ArithOp::Div => l / r,
                ArithOp::Mod => l % r,
            };
            Ok(Value::Number(out))
        }
        Expr::Neg(inner) => Ok(Value::Number(-eval(ctx, inner)?.to_number())),
        Expr::Union(l, r) => {
            let mut left = eval(ctx, l)?
                .to_node_set()
                .map_err(|_| Error::type_err("operands of '|' must be node-sets"))?;
            let mut right = eval(ctx, r)?
                .to_node_set()
                .map_err(|_| Error::type_err("operands of '|' must be node-sets"))?;
            left.sort_document_order()?;
            right.sort_document_order()?;
            left.append(right)?;
            Ok(Value::NodeSet(left))
        }
        Expr::Root => {
            let mut set = NodeSet::new(DocOrder::Document);
            set.push(ctx.node.document_root());
            Ok(Value::NodeSet(set))
        }
        Expr::Path { left, right } => {
            let base = eval(ctx, left)?;
            let base = base
                .to_node_set()
                .map_err(|_| Error::type_err("left side of '/' must be a node-set"))?;
            let mut acc = NodeSet::new(DocOrder::Document);
            let size = base.len();
            for (i, node) in base.into_nodes().into_iter().enumerate() {
                let sub = ctx.at(node, i + 1, size);
                let step = eval(&sub, right)?;
                let mut step = step
                    .to_node_set()
                    .map_err(|_| Error::type_err("right side of '/' must be a node-set"))?;
                step.sort_document_order()?;
                acc.append(step)?;
            }
            Ok(Value::NodeSet(acc))
        }
        Expr::Step {
            axis,
            test,
            predicates,
        } => {
            let candidates = axis_nodes(&ctx.node, *axis, ctx.env.options);
            let mut kept = Vec::new();
            for node in candidates {
                if node_test(&node, *axis, test, ctx.env)? {
                    kept.push(node);
                }
            }
            let order = if axis.is_reverse() {
                DocOrder::ReverseDocument
            } else {
                DocOrder::Document
            };
            let set = NodeSet::from_nodes(kept, order);
            let filtered = apply_predicates(set, predicates, ctx.env)?;
            Ok(Value::NodeSet(filtered))
        }
        Expr::Filter { base, predicates } => {
            let mut set = eval(ctx, base)?
                .to_node_set()
                .map_err(|_| Error::type_err("predicates apply only to node-sets"))?;
            set.sort_document_order()?;
            let filtered = apply_predicates(set, predicates, ctx.env)?;
            Ok(Value::NodeSet(filtered))
        }
        Expr::FunctionCall { name, args } => call_function(ctx, name, args),
    }
}

/// Predicate loop: proximity positions follow the set's stored order (the
/// axis direction); a numeric predicate keeps the node at that position,
/// anything else filters by effective boolean.
fn apply_predicates<N: XPathNode>(
    mut set: NodeSet<N>,
    predicates: &[Expr],
    env: &Environment<'_, N>,
) -> Result<NodeSet<N>, Error> {
    for predicate in predicates {
        let size = set.len();
        let order = set.order();
        let mut kept = Vec::new();
        for (i, node) in set.nodes().iter().enumerate() {
            let ctx = Context {
                node: node.clone(),
                position: i + 1,
                size,
                env,
            };
            let v = eval(&ctx, predicate)?;
            let keep = match v {
                Value::Number(n) => n == (i + 1) as f64,
                other => other.to_boolean(),
            };
            if keep {
                kept.push(node.clone());
            }
        }
        set = NodeSet::from_nodes(kept, order);
    }
    Ok(set)
}

// ===== Axes =====

fn axis_nodes<N: XPathNode>(node: &Node<N>, axis: Axis, options: &Options) -> Vec<Node<N>> {
    match axis {
        Axis::SelfAxis => vec![node.clone()],
        Axis::Child => node.children(),
        Axis::Attribute => node.attributes(),
        Axis::Namespace => node
            .namespaces(options)
            .into_iter()
            .map(Node::Namespace)
            .collect(),
        Axis::Parent => node.parent().into_iter().collect(),
        Axis::Ancestor => ancestors(node),
        Axis::AncestorOrSelf => {
            let mut out = vec![node.clone()];
            out.extend(ancestors(node));
            out
        }
        Axis::Descendant => {
            let mut out = Vec::new();
            descend(node, &mut out);
            out
        }
        Axis::DescendantOrSelf => {
            let mut out = vec![node.clone()];
            descend(node, &mut out);
            out
        }
        Axis::FollowingSibling => siblings(node, false),
        Axis::PrecedingSibling => siblings(node, true),
        Axis::Following => {
            let mut out = Vec::new();
            let mut anchor = Some(node.clone());
            while let Some(a) = anchor {
                for sib in siblings(&a, false) {
                    out.push(sib.clone());
                    descend(&sib, &mut out);
                }
                anchor = a.parent();
            }
            out
        }
        Axis::Preceding => {
            // Reverse document order: nearest preceding node first. A
            // preceding sibling contributes its subtree in reverse
            // pre-order (deepest-last node nearest).
            let mut out = Vec::new();
            let mut anchor = Some(node.clone());
            while let Some(a) = anchor {
                for sib in siblings(&a, true) {
                    let mut subtree = vec![sib.clone()];
                    descend(&sib, &mut subtree);
                    subtree.reverse();
                    out.extend(subtree);
                }
                anchor = a.parent();
            }
            out
        }
    }
}

fn ancestors<N: XPathNode>(node: &Node<N>) -> Vec<Node<N>> {
    let mut out = Vec::new();
    let mut cur = node.parent();
    while let Some(p) = cur {
        cur = p.parent();
        out.push(p);
    }
    out
}

fn descend<N: XPathNode>(node: &Node<N>, out: &mut Vec<Node<N>>) {
    for c in node.children() {
        out.push(c.clone());
        descend(&c, out);
    }
}

/// Siblings after (or, reversed, before) `node` among its parent's
/// children. Attribute and namespace nodes have no siblings.
fn siblings<N: XPathNode>(node: &Node<N>, preceding: bool) -> Vec<Node<N>> {
    let Some(parent) = node.parent() else {
        return Vec::new();
    };
    let children = parent.children();
    let Some(idx) = children.iter().position(|c| c == node) else {
        return Vec::new();
    };
    if preceding {
        children[..idx].iter().rev().cloned().collect()
    } else {
        children[idx + 1..].to_vec()
    }
}

// ===== Node tests =====

fn principal_kind(axis: Axis) -> NodeKind {
    match axis {
        Axis::Attribute => NodeKind::Attribute,
        Axis::Namespace => NodeKind::Namespace,
        _ => NodeKind::Element,
    }
}

fn node_test<N: XPathNode>(
    node: &Node<N>,
    axis: Axis,
    test: &NodeTest,
    env: &Environment<'_, N>,
) -> Result<bool, Error> {
    match test {
        NodeTest::AnyNode => Ok(true),
        NodeTest::Text => Ok(matches!(node.kind(), NodeKind::Text | NodeKind::CData)),
        NodeTest::Comment => Ok(node.kind() == NodeKind::Comment),
        NodeTest::ProcessingInstruction(target) => {
            if node.kind() != NodeKind::ProcessingInstruction {
                return Ok(false);
            }
            match target {
                None => Ok(true),
                Some(t) => Ok(node
                    .raw_name()
                    .is_some_and(|name| env.options.names_equal(&name, t))),
            }
        }
        NodeTest::Name(NameTest { prefix, local }) => {
            if node.kind() != principal_kind(axis) {
                return Ok(false);
            }
            if prefix.is_none() && local.is_none() {
                return Ok(true);
            }
            let Some(expanded) = node.expanded_name(env.options)? else {
                return Ok(false);
            };
            let test_ns = match prefix {
                Some(p) => Some(env.namespaces.get(p).cloned().ok_or_else(|| {
                    Error::namespace(format!("unresolved namespace prefix '{}'", p))
                })?),
                None => None,
            };
            if expanded.ns_uri != test_ns {
                return Ok(false);
            }
            match local {
                None => Ok(true),
                Some(l) => Ok(env.options.names_equal(&expanded.local, l)),
            }
        }
    }
}

// ===== Function dispatch =====

fn call_function<N: XPathNode>(
    ctx: &Context<'_, N>,
    name: &crate::parser::ast::RawQName,
    args: &[Expr],
) -> Result<Value<N>, Error> {
    let ns_uri = match &name.prefix {
        Some(p) => Some(ctx.env.namespaces.get(p).cloned().ok_or_else(|| {
            Error::namespace(format!("unresolved namespace prefix '{}'", p))
        })?),
        None => None,
    };
    let key = FunctionKey {
        ns_uri,
        local: name.local.clone(),
    };
    let def = ctx
        .env
        .functions
        .get(&key)
        .ok_or_else(|| Error::evaluation(format!("function {} does not exist", name.lexical())))?;

    let min = def.min_arity();
    if args.len() < min {
        return Err(Error::evaluation(format!(
            "function {} expects at least {} argument{}, got {}",
            name.lexical(),
            min,
            if min == 1 { "" } else { "s" },
            args.len()
        )));
    }
    if let Some(max) = def.max_arity() {
        if args.len() > max {
            return Err(Error::evaluation(format!(
                "function {} expects at most {} argument{}, got {}",
                name.lexical(),
                max,
                if max == 1 { "" } else { "s" },
                args.len()
            )));
        }
    }

    let mut values = Vec::with_capacity(args.len());
    for (i, arg) in args.iter().enumerate() {
        let v = eval(ctx, arg)?;
        let expected = def.param_kind(i);
        if !v.can_convert_to(expected) {
            return Err(Error::type_err(format!(
                "argument {} of {}: unable to convert {} to {}",
                i + 1,
                name.lexical(),
                v.kind().name(),
                expected.name()
            )));
        }
        values.push(v);
    }

    let call_ctx = CallCtx {
        node: &ctx.node,
        position: ctx.position,
        size: ctx.size,
        options: ctx.env.options,
    };
    let out = (def.call)(&call_ctx, &values)?;
    if !out.can_convert_to(def.ret) {
        return Err(Error::type_err(format!(
            "function {} returned {}, which cannot convert to its declared {}",
            name.lexical(),
            out.kind().name(),
            def.ret.name()
        )));
    }
    Ok(out)
}

/// Same-name preceding-sibling count used by the XForms overload of
/// `position()`.
pub(crate) fn xforms_position<N: XPathNode>(
    node: &Node<N>,
    options: &Options,
) -> Result<f64, Error> {
    let Some(name) = node.raw_name() else {
        return Err(Error::evaluation(
            "position() requires an element node argument",
        ));
    };
    let mut index = 1usize;
    for sib in siblings(node, true) {
        if sib.kind() == NodeKind::Element
            && sib
                .raw_name()
                .is_some_and(|n| options.names_equal(&n, &name))
        {
            index += 1;
        }
    }
    Ok(index as f64)
}
