//! Geographic helpers behind `area()` and `distance()`.
//!
//! Input is a `;`-joined geopoint list: a node-set of individual points, a
//! single node holding a whole geoshape/geotrace, or a plain string. A
//! geopoint is `lat lon [alt [accuracy]]` with latitude in [-90, 90] and
//! longitude in [-180, 180]; any malformed point makes the result NaN.

use crate::engine::runtime::{CallCtx, Error, FunctionRegistry, Param};
use crate::model::XPathNode;
use crate::value::{Kind, Value};

const EARTH_RADIUS_M: f64 = 6_378_100.0;

pub(super) fn register<N: XPathNode>(r: &mut FunctionRegistry<N>) {
    super::add(r, "area", &[Param::required(Kind::Any)], Kind::Number, area_fn);
    super::add(
        r,
        "distance",
        &[Param::required(Kind::Any)],
        Kind::Number,
        distance_fn,
    );
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct GeoPoint {
    lat: f64,
    lon: f64,
}

fn parse_point(s: &str) -> Option<GeoPoint> {
    let fields: Vec<&str> = s.split_whitespace().collect();
    if fields.len() < 2 || fields.len() > 4 {
        return None;
    }
    let mut nums = Vec::with_capacity(fields.len());
    for f in fields {
        nums.push(f.parse::<f64>().ok()?);
    }
    let (lat, lon) = (nums[0], nums[1]);
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return None;
    }
    Some(GeoPoint { lat, lon })
}

/// Split the argument into geopoint strings and parse them. `None` when
/// any point is malformed.
fn collect_points<N: XPathNode>(v: &Value<N>) -> Option<Vec<GeoPoint>> {
    let fragments: Vec<String> = match v {
        Value::NodeSet(ns) if ns.len() > 1 => ns.iter().map(|n| n.string_value()).collect(),
        other => other
            .to_xpath_string()
            .split(';')
            .map(str::to_string)
            .collect(),
    };
    let mut points = Vec::new();
    for frag in fragments {
        let t = frag.trim();
        if t.is_empty() {
            continue;
        }
        points.push(parse_point(t)?);
    }
    Some(points)
}

fn haversine_m(a: GeoPoint, b: GeoPoint) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let dphi = (b.lat - a.lat).to_radians();
    let dlambda = (b.lon - a.lon).to_radians();
    let h = (dphi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().min(1.0).asin()
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Sum of leg lengths along the trace, in metres.
fn distance_fn<N: XPathNode>(_ctx: &CallCtx<'_, N>, args: &[Value<N>]) -> Result<Value<N>, Error> {
    let Some(points) = collect_points(&args[0]) else {
        return Ok(Value::Number(f64::NAN));
    };
    if points.len() < 2 {
        return Err(Error::evaluation("distance requires at least two geopoints"));
    }
    let total: f64 = points.windows(2).map(|w| haversine_m(w[0], w[1])).sum();
    Ok(Value::Number(round2(total)))
}

/// Spherical polygon area of the shape, in square metres. The ring is
/// closed implicitly when the last point differs from the first.
fn area_fn<N: XPathNode>(_ctx: &CallCtx<'_, N>, args: &[Value<N>]) -> Result<Value<N>, Error> {
    let Some(mut points) = collect_points(&args[0]) else {
        return Ok(Value::Number(f64::NAN));
    };
    if points.len() < 3 {
        return Ok(Value::Number(0.0));
    }
    if points.first() != points.last() {
        if let Some(&first) = points.first() {
            points.push(first);
        }
    }
    let mut total = 0.0;
    for w in points.windows(2) {
        let (p1, p2) = (w[0], w[1]);
        total += (p2.lon - p1.lon).to_radians()
            * (2.0 + p1.lat.to_radians().sin() + p2.lat.to_radians().sin());
    }
    let area = (total * EARTH_RADIUS_M * EARTH_RADIUS_M / 2.0).abs();
    Ok(Value::Number(round2(area)))
}
