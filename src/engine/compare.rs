//! Cross-kind comparison with node-set existential semantics and date
//! coercion.
//!
//! Node-set operands compare through their per-node string values (date
//! strings promoted); the result is true when some pair satisfies the
//! operator. Between primitives, equality picks the stronger kind
//! (boolean, then number/date, then string) while relational operators
//! always compare as IEEE-754 numbers.

use crate::engine::runtime::Error;
use crate::model::XPathNode;
use crate::parser::ast::CompareOp;
use crate::temporal;
use crate::value::Value;

pub fn compare<N: XPathNode>(
    left: &Value<N>,
    right: &Value<N>,
    op: CompareOp,
) -> Result<bool, Error> {
    match (left, right) {
        (Value::NodeSet(l), Value::NodeSet(r)) => {
            let rvals = r.string_values();
            for lv in l.string_values() {
                for rv in &rvals {
                    if compare_primitive(&lv, rv, op)? {
                        return Ok(true);
                    }
                }
            }
            Ok(false)
        }
        (Value::NodeSet(ns), other) => node_set_vs_primitive(ns, other, op),
        (other, Value::NodeSet(ns)) => node_set_vs_primitive(ns, other, op.flip()),
        (l, r) => compare_primitive(l, r, op),
    }
}

/// `op` is oriented node-set-first: `ns op other`.
fn node_set_vs_primitive<N: XPathNode>(
    ns: &crate::engine::node_set::NodeSet<N>,
    other: &Value<N>,
    op: CompareOp,
) -> Result<bool, Error> {
    match other {
        Value::Number(n) => {
            for node in ns.iter() {
                let v = Value::<N>::String(node.string_value()).to_number();
                if numeric_op(v, *n, op) {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        Value::Date(_) => {
            let rhs = other.to_number();
            for node in ns.iter() {
                let lhs = match temporal::parse_date(&node.string_value()) {
                    Some(dt) => temporal::days_since_epoch(&dt),
                    None => f64::NAN,
                };
                if numeric_op(lhs, rhs, op) {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        Value::String(s) if temporal::is_date_string(s) => {
            let coerced = Value::<N>::Date(temporal::parse_date(s));
            node_set_vs_primitive(ns, &coerced, op)
        }
        Value::String(s) => {
            for node in ns.iter() {
                let text = node.string_value();
                let hit = match op {
                    CompareOp::Eq => text == *s,
                    CompareOp::Ne => text != *s,
                    _ => numeric_op(
                        Value::<N>::String(text).to_number(),
                        Value::<N>::String(s.clone()).to_number(),
                        op,
                    ),
                };
                if hit {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        Value::Boolean(b) => {
            let l = !ns.is_empty();
            Ok(match op {
                CompareOp::Eq => l == *b,
                CompareOp::Ne => l != *b,
                _ => numeric_op(
                    if l { 1.0 } else { 0.0 },
                    if *b { 1.0 } else { 0.0 },
                    op,
                ),
            })
        }
        Value::NodeSet(_) => Err(Error::internal(
            "node-set operand routed to primitive comparison",
        )),
    }
}

/// Comparison between two non-node-set values.
fn compare_primitive<N: XPathNode>(
    l: &Value<N>,
    r: &Value<N>,
    op: CompareOp,
) -> Result<bool, Error> {
    match op {
        CompareOp::Eq | CompareOp::Ne => {
            let eq = if matches!(l, Value::Boolean(_)) || matches!(r, Value::Boolean(_)) {
                l.to_boolean() == r.to_boolean()
            } else if matches!(l, Value::Number(_)) || matches!(r, Value::Number(_)) {
                l.to_number() == r.to_number()
            } else if matches!(l, Value::Date(_))
                || matches!(r, Value::Date(_))
                || l.is_date_string()
                || r.is_date_string()
            {
                // days since epoch on both sides
                l.to_number() == r.to_number()
            } else {
                l.to_xpath_string() == r.to_xpath_string()
            };
            Ok(if op == CompareOp::Eq { eq } else { !eq })
        }
        _ => Ok(numeric_op(l.to_number(), r.to_number(), op)),
    }
}

fn numeric_op(a: f64, b: f64, op: CompareOp) -> bool {
    match op {
        CompareOp::Eq => a == b,
        CompareOp::Ne => a != b,
        CompareOp::Lt => a < b,
        CompareOp::Le => a <= b,
        CompareOp::Gt => a > b,
        CompareOp::Ge => a >= b,
    }
}
