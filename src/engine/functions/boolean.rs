use crate::engine::runtime::{CallCtx, Error, FunctionRegistry, Param};
use crate::model::{NodeKind, XPathNode};
use crate::value::{Kind, Value};

pub(super) fn register<N: XPathNode>(r: &mut FunctionRegistry<N>) {
    super::add(
        r,
        "boolean",
        &[Param::required(Kind::Any)],
        Kind::Boolean,
        boolean_fn,
    );
    super::add(
        r,
        "not",
        &[Param::required(Kind::Boolean)],
        Kind::Boolean,
        not_fn,
    );
    super::add(r, "true", &[], Kind::Boolean, true_fn);
    super::add(r, "false", &[], Kind::Boolean, false_fn);
    super::add(
        r,
        "lang",
        &[Param::required(Kind::String)],
        Kind::Boolean,
        lang_fn,
    );
}

fn boolean_fn<N: XPathNode>(
    _ctx: &CallCtx<'_, N>,
    args: &[Value<N>],
) -> Result<Value<N>, Error> {
    Ok(Value::Boolean(args[0].to_boolean()))
}

fn not_fn<N: XPathNode>(_ctx: &CallCtx<'_, N>, args: &[Value<N>]) -> Result<Value<N>, Error> {
    Ok(Value::Boolean(!args[0].to_boolean()))
}

fn true_fn<N: XPathNode>(_ctx: &CallCtx<'_, N>, _args: &[Value<N>]) -> Result<Value<N>, Error> {
    Ok(Value::Boolean(true))
}

fn false_fn<N: XPathNode>(_ctx: &CallCtx<'_, N>, _args: &[Value<N>]) -> Result<Value<N>, Error> {
    Ok(Value::Boolean(false))
}

/// `xml:lang` in scope at the context node, matched exactly or as a
/// language-range prefix, case-insensitively.
fn lang_fn<N: XPathNode>(ctx: &CallCtx<'_, N>, args: &[Value<N>]) -> Result<Value<N>, Error> {
    let wanted = args[0].to_xpath_string().to_lowercase();
    let mut cursor = Some(ctx.node.clone());
    while let Some(node) = cursor {
        if node.kind() == NodeKind::Element {
            for a in node.attributes() {
                let is_lang = a
                    .raw_name()
                    .is_some_and(|n| n.eq_ignore_ascii_case("xml:lang"));
                if is_lang {
                    let declared = a.string_value().to_lowercase();
                    let hit = declared == wanted
                        || declared.starts_with(&format!("{}-", wanted));
                    return Ok(Value::Boolean(hit));
                }
            }
        }
        cursor = node.parent();
    }
    Ok(Value::Boolean(false))
}
