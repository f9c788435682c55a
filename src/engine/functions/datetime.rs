use crate::engine::runtime::{CallCtx, Error, FunctionRegistry, Param};
use crate::model::XPathNode;
use crate::temporal;
use crate::value::{Kind, Value};

pub(super) fn register<N: XPathNode>(r: &mut FunctionRegistry<N>) {
    super::add(
        r,
        "date",
        &[Param::required(Kind::Date)],
        Kind::Date,
        date_fn,
    );
    super::add(
        r,
        "date-time",
        &[Param::required(Kind::Date)],
        Kind::Date,
        date_fn,
    );
    super::add(r, "today", &[], Kind::Date, |_, _| {
        Ok(Value::Date(Some(temporal::today())))
    });
    super::add(r, "now", &[], Kind::Date, |_, _| {
        Ok(Value::Date(Some(temporal::now())))
    });
    super::add(
        r,
        "decimal-date-time",
        &[Param::required(Kind::Date)],
        Kind::Number,
        decimal_date_time_fn,
    );
    super::add(
        r,
        "decimal-time",
        &[Param::required(Kind::String)],
        Kind::Number,
        decimal_time_fn,
    );
    super::add(
        r,
        "format-date",
        &[Param::required(Kind::Date), Param::required(Kind::String)],
        Kind::String,
        format_date_fn,
    );
    super::add(
        r,
        "format-date-time",
        &[Param::required(Kind::Date), Param::required(Kind::String)],
        Kind::String,
        format_date_fn,
    );
}

fn date_fn<N: XPathNode>(_ctx: &CallCtx<'_, N>, args: &[Value<N>]) -> Result<Value<N>, Error> {
    Ok(Value::Date(args[0].to_date()?))
}

/// Fractional days since the epoch, to three decimal places.
fn decimal_date_time_fn<N: XPathNode>(
    _ctx: &CallCtx<'_, N>,
    args: &[Value<N>],
) -> Result<Value<N>, Error> {
    let n = match args[0].to_date()? {
        Some(dt) => temporal::round_to_places(temporal::days_since_epoch(&dt), 3),
        None => f64::NAN,
    };
    Ok(Value::Number(n))
}

fn decimal_time_fn<N: XPathNode>(
    _ctx: &CallCtx<'_, N>,
    args: &[Value<N>],
) -> Result<Value<N>, Error> {
    Ok(Value::Number(temporal::decimal_time(
        &args[0].to_xpath_string(),
    )))
}

fn format_date_fn<N: XPathNode>(
    ctx: &CallCtx<'_, N>,
    args: &[Value<N>],
) -> Result<Value<N>, Error> {
    let fmt = args[1].to_xpath_string();
    let out = match args[0].to_date()? {
        Some(dt) => temporal::format_date(&dt, &fmt, &ctx.options.locale),
        None => String::new(),
    };
    Ok(Value::String(out))
}
