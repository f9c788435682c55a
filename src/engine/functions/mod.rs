//! The function library: XPath 1.0 core plus the ODK/XForms extensions.
//!
//! Every entry declares its parameters and return kind; arity and
//! convertibility are enforced centrally by the evaluator's dispatch, so
//! implementations only deal with values they are allowed to receive.

pub(crate) mod boolean;
pub(crate) mod datetime;
pub(crate) mod geo;
pub(crate) mod node_set;
pub(crate) mod numeric;
pub(crate) mod openrosa;
pub(crate) mod string;

use crate::engine::runtime::{
    CallCtx, Error, FuncDef, FunctionKey, FunctionRegistry, Param,
};
use crate::model::XPathNode;
use crate::value::{Kind, Value};

pub(crate) fn register_all<N: XPathNode>(r: &mut FunctionRegistry<N>) {
    boolean::register(r);
    datetime::register(r);
    geo::register(r);
    node_set::register(r);
    numeric::register(r);
    openrosa::register(r);
    string::register(r);
}

/// Register a default-namespace function.
fn add<N: XPathNode>(
    r: &mut FunctionRegistry<N>,
    name: &str,
    params: &[Param],
    ret: Kind,
    f: impl Fn(&CallCtx<'_, N>, &[Value<N>]) -> Result<Value<N>, Error> + 'static,
) {
    r.register(
        FunctionKey::local(name),
        FuncDef::new(params.to_vec(), ret, f),
    );
}

/// Flatten arguments into strings, expanding node-set arguments into one
/// string per member node (the `concat`/`join`/`min`/`max` convention).
fn expand_to_strings<N: XPathNode>(args: &[Value<N>]) -> Vec<String> {
    let mut out = Vec::new();
    for arg in args {
        match arg {
            Value::NodeSet(ns) => out.extend(ns.iter().map(|n| n.string_value())),
            other => out.push(other.to_xpath_string()),
        }
    }
    out
}

/// Whitespace-delimited tokens of a multi-select value.
fn tokens(s: &str) -> Vec<&str> {
    s.split_whitespace().collect()
}
