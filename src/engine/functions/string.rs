use regex::Regex;
use uuid::Uuid;

use crate::engine::runtime::{CallCtx, Error, FunctionRegistry, Param};
use crate::model::XPathNode;
use crate::value::{Kind, Value};

use super::numeric::js_round;

pub(super) fn register<N: XPathNode>(r: &mut FunctionRegistry<N>) {
    super::add(
        r,
        "string",
        &[Param::optional(Kind::Any)],
        Kind::String,
        string_fn,
    );
    super::add(
        r,
        "concat",
        &[Param::variadic(Kind::String)],
        Kind::String,
        concat_fn,
    );
    binary_string(r, "starts-with", Kind::Boolean, |a, b| {
        Value::Boolean(a.starts_with(b))
    });
    binary_string(r, "ends-with", Kind::Boolean, |a, b| {
        Value::Boolean(a.ends_with(b))
    });
    binary_string(r, "contains", Kind::Boolean, |a, b| {
        Value::Boolean(a.contains(b))
    });
    binary_string(r, "substring-before", Kind::String, |a, b| {
        Value::String(a.find(b).map(|i| a[..i].to_string()).unwrap_or_default())
    });
    binary_string(r, "substring-after", Kind::String, |a, b| {
        Value::String(
            a.find(b)
                .map(|i| a[i + b.len()..].to_string())
                .unwrap_or_default(),
        )
    });
    super::add(
        r,
        "substring",
        &[
            Param::required(Kind::String),
            Param::required(Kind::Number),
            Param::optional(Kind::Number),
        ],
        Kind::String,
        substring_fn,
    );
    super::add(
        r,
        "substr",
        &[
            Param::required(Kind::String),
            Param::required(Kind::Number),
            Param::optional(Kind::Number),
        ],
        Kind::String,
        substr_fn,
    );
    super::add(
        r,
        "string-length",
        &[Param::optional(Kind::String)],
        Kind::Number,
        string_length_fn,
    );
    super::add(
        r,
        "normalize-space",
        &[Param::optional(Kind::String)],
        Kind::String,
        normalize_space_fn,
    );
    super::add(
        r,
        "translate",
        &[
            Param::required(Kind::String),
            Param::required(Kind::String),
            Param::required(Kind::String),
        ],
        Kind::String,
        translate_fn,
    );
    super::add(
        r,
        "join",
        &[
            Param::required(Kind::String),
            Param::variadic_optional(Kind::Any),
        ],
        Kind::String,
        join_fn,
    );
    super::add(
        r,
        "regex",
        &[Param::required(Kind::String), Param::required(Kind::String)],
        Kind::Boolean,
        regex_fn,
    );
    super::add(r, "uuid", &[], Kind::String, |_, _| {
        Ok(Value::String(Uuid::new_v4().to_string()))
    });
}

fn binary_string<N: XPathNode>(
    r: &mut FunctionRegistry<N>,
    name: &str,
    ret: Kind,
    f: fn(&str, &str) -> Value<N>,
) {
    super::add(
        r,
        name,
        &[Param::required(Kind::String), Param::required(Kind::String)],
        ret,
        move |_, args: &[Value<N>]| {
            Ok(f(&args[0].to_xpath_string(), &args[1].to_xpath_string()))
        },
    );
}

fn string_fn<N: XPathNode>(ctx: &CallCtx<'_, N>, args: &[Value<N>]) -> Result<Value<N>, Error> {
    let s = match args.first() {
        Some(v) => v.to_xpath_string(),
        None => ctx.node.string_value(),
    };
    Ok(Value::String(s))
}

/// Unlike XPath 1.0 `concat`, node-set arguments are joined through their
/// per-node string values and a single argument is allowed.
fn concat_fn<N: XPathNode>(_ctx: &CallCtx<'_, N>, args: &[Value<N>]) -> Result<Value<N>, Error> {
    Ok(Value::String(super::expand_to_strings(args).concat()))
}

/// XPath 1.0 `substring`: 1-based positions, operand rounding, NaN-aware.
fn substring_fn<N: XPathNode>(_ctx: &CallCtx<'_, N>, args: &[Value<N>]) -> Result<Value<N>, Error> {
    let s = args[0].to_xpath_string();
    let start = js_round(args[1].to_number());
    let end = match args.get(2) {
        Some(len) => start + js_round(len.to_number()),
        None => f64::INFINITY,
    };
    if start.is_nan() || end.is_nan() {
        return Ok(Value::String(String::new()));
    }
    let out: String = s
        .chars()
        .enumerate()
        .filter(|(i, _)| {
            let p = (*i + 1) as f64;
            p >= start && p < end
        })
        .map(|(_, c)| c)
        .collect();
    Ok(Value::String(out))
}

/// `substr`: zero-based half-open character range with JavaScript `slice`
/// semantics (negative indices count from the end).
fn substr_fn<N: XPathNode>(_ctx: &CallCtx<'_, N>, args: &[Value<N>]) -> Result<Value<N>, Error> {
    let s = args[0].to_xpath_string();
    let chars: Vec<char> = s.chars().collect();
    let len = chars.len() as i64;
    let clamp = |v: f64| -> i64 {
        let v = if v.is_nan() { 0.0 } else { v.trunc() };
        let v = v as i64;
        if v < 0 {
            (len + v).max(0)
        } else {
            v.min(len)
        }
    };
    let start = clamp(args[1].to_number());
    let end = match args.get(2) {
        Some(v) => clamp(v.to_number()),
        None => len,
    };
    if end <= start {
        return Ok(Value::String(String::new()));
    }
    Ok(Value::String(
        chars[start as usize..end as usize].iter().collect(),
    ))
}

fn string_length_fn<N: XPathNode>(
    ctx: &CallCtx<'_, N>,
    args: &[Value<N>],
) -> Result<Value<N>, Error> {
    let s = match args.first() {
        Some(v) => v.to_xpath_string(),
        None => ctx.node.string_value(),
    };
    Ok(Value::Number(s.chars().count() as f64))
}

fn normalize_space_fn<N: XPathNode>(
    ctx: &CallCtx<'_, N>,
    args: &[Value<N>],
) -> Result<Value<N>, Error> {
    let s = match args.first() {
        Some(v) => v.to_xpath_string(),
        None => ctx.node.string_value(),
    };
    Ok(Value::String(
        s.split_whitespace().collect::<Vec<_>>().join(" "),
    ))
}

fn translate_fn<N: XPathNode>(_ctx: &CallCtx<'_, N>, args: &[Value<N>]) -> Result<Value<N>, Error> {
    let s = args[0].to_xpath_string();
    let from: Vec<char> = args[1].to_xpath_string().chars().collect();
    let to: Vec<char> = args[2].to_xpath_string().chars().collect();
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match from.iter().position(|&f| f == c) {
            None => out.push(c),
            Some(i) => {
                if let Some(&r) = to.get(i) {
                    out.push(r);
                }
                // dropped when `from` is longer than `to`
            }
        }
    }
    Ok(Value::String(out))
}

fn join_fn<N: XPathNode>(_ctx: &CallCtx<'_, N>, args: &[Value<N>]) -> Result<Value<N>, Error> {
    let sep = args[0].to_xpath_string();
    let items = super::expand_to_strings(&args[1..]);
    Ok(Value::String(items.join(&sep)))
}

fn regex_fn<N: XPathNode>(_ctx: &CallCtx<'_, N>, args: &[Value<N>]) -> Result<Value<N>, Error> {
    let value = args[0].to_xpath_string();
    let pattern = args[1].to_xpath_string();
    let re = Regex::new(&pattern)
        .map_err(|e| Error::evaluation(format!("invalid regular expression: {}", e)))?;
    Ok(Value::Boolean(re.is_match(&value)))
}
