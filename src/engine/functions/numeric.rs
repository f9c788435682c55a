use rand::Rng;

use crate::engine::runtime::{CallCtx, Error, FunctionRegistry, Param};
use crate::model::XPathNode;
use crate::value::{string_to_number, Kind, Value};

pub(super) fn register<N: XPathNode>(r: &mut FunctionRegistry<N>) {
    super::add(
        r,
        "number",
        &[Param::optional(Kind::Any)],
        Kind::Number,
        number_fn,
    );
    super::add(
        r,
        "sum",
        &[Param::required(Kind::NodeSet)],
        Kind::Number,
        sum_fn,
    );
    super::add(
        r,
        "floor",
        &[Param::required(Kind::Number)],
        Kind::Number,
        |_, args| Ok(Value::Number(args[0].to_number().floor())),
    );
    super::add(
        r,
        "ceiling",
        &[Param::required(Kind::Number)],
        Kind::Number,
        |_, args| Ok(Value::Number(args[0].to_number().ceil())),
    );
    super::add(
        r,
        "round",
        &[Param::required(Kind::Number), Param::optional(Kind::Number)],
        Kind::Number,
        round_fn,
    );
    super::add(
        r,
        "abs",
        &[Param::required(Kind::Number)],
        Kind::Number,
        |_, args| Ok(Value::Number(args[0].to_number().abs())),
    );
    super::add(
        r,
        "int",
        &[Param::required(Kind::Number)],
        Kind::Number,
        |_, args| Ok(Value::Number(args[0].to_number().trunc())),
    );
    super::add(
        r,
        "min",
        &[Param::variadic(Kind::Any)],
        Kind::Number,
        |_, args| Ok(Value::Number(fold_numbers(args, f64::min))),
    );
    super::add(
        r,
        "max",
        &[Param::variadic(Kind::Any)],
        Kind::Number,
        |_, args| Ok(Value::Number(fold_numbers(args, f64::max))),
    );
    super::add(r, "random", &[], Kind::Number, random_fn);
    super::add(r, "pi", &[], Kind::Number, |_, _| {
        Ok(Value::Number(std::f64::consts::PI))
    });
    unary(r, "sin", f64::sin);
    unary(r, "cos", f64::cos);
    unary(r, "tan", f64::tan);
    unary(r, "asin", f64::asin);
    unary(r, "acos", f64::acos);
    unary(r, "atan", f64::atan);
    unary(r, "log", f64::ln);
    unary(r, "log10", f64::log10);
    unary(r, "exp", f64::exp);
    unary(r, "exp10", |v| 10f64.powf(v));
    unary(r, "sqrt", f64::sqrt);
    super::add(
        r,
        "atan2",
        &[Param::required(Kind::Number), Param::required(Kind::Number)],
        Kind::Number,
        |_, args| Ok(Value::Number(args[0].to_number().atan2(args[1].to_number()))),
    );
    super::add(
        r,
        "pow",
        &[Param::required(Kind::Number), Param::required(Kind::Number)],
        Kind::Number,
        |_, args| Ok(Value::Number(args[0].to_number().powf(args[1].to_number()))),
    );
}

fn unary<N: XPathNode>(r: &mut FunctionRegistry<N>, name: &str, f: fn(f64) -> f64) {
    super::add(
        r,
        name,
        &[Param::required(Kind::Number)],
        Kind::Number,
        move |_, args: &[Value<N>]| Ok(Value::Number(f(args[0].to_number()))),
    );
}

fn number_fn<N: XPathNode>(ctx: &CallCtx<'_, N>, args: &[Value<N>]) -> Result<Value<N>, Error> {
    let n = match args.first() {
        Some(v) => v.to_number(),
        None => string_to_number(&ctx.node.string_value()),
    };
    Ok(Value::Number(n))
}

fn sum_fn<N: XPathNode>(_ctx: &CallCtx<'_, N>, args: &[Value<N>]) -> Result<Value<N>, Error> {
    let ns = args[0].as_node_set()?;
    let total = ns
        .iter()
        .map(|n| string_to_number(&n.string_value()))
        .sum::<f64>();
    Ok(Value::Number(total))
}

/// `round` as JavaScript rounds: half-up towards positive infinity.
pub(super) fn js_round(x: f64) -> f64 {
    if x.is_nan() || x.is_infinite() {
        x
    } else {
        (x + 0.5).floor()
    }
}

fn round_fn<N: XPathNode>(_ctx: &CallCtx<'_, N>, args: &[Value<N>]) -> Result<Value<N>, Error> {
    let n = args[0].to_number();
    let places = args.get(1).map(|v| js_round(v.to_number())).unwrap_or(0.0);
    if places == 0.0 {
        return Ok(Value::Number(js_round(n)));
    }
    if !places.is_finite() {
        return Ok(Value::Number(f64::NAN));
    }
    let factor = 10f64.powi(places as i32);
    Ok(Value::Number(js_round(n * factor) / factor))
}

fn fold_numbers<N: XPathNode>(args: &[Value<N>], pick: fn(f64, f64) -> f64) -> f64 {
    let mut best: Option<f64> = None;
    for s in numeric_items(args) {
        if s.is_nan() {
            return f64::NAN;
        }
        best = Some(match best {
            Some(b) => pick(b, s),
            None => s,
        });
    }
    best.unwrap_or(f64::NAN)
}

/// Arguments flattened to numbers, node-sets contributing one number per
/// member node.
fn numeric_items<N: XPathNode>(args: &[Value<N>]) -> Vec<f64> {
    let mut out = Vec::new();
    for arg in args {
        match arg {
            Value::NodeSet(ns) => {
                out.extend(ns.iter().map(|n| string_to_number(&n.string_value())))
            }
            other => out.push(other.to_number()),
        }
    }
    out
}

/// Uniform in [0, 1) with 15-digit precision.
fn random_fn<N: XPathNode>(_ctx: &CallCtx<'_, N>, _args: &[Value<N>]) -> Result<Value<N>, Error> {
    let r: f64 = rand::rng().random();
    Ok(Value::Number((r * 1e15).round() / 1e15))
}
