//! Date handling: parsing, serialisation, date-string detection and the
//! clock-fraction computation behind `decimal-time`.
//!
//! A *date string* is a string that is not purely numeric, starts with a
//! `YYYY-MM-DD` (or slash-separated) date and parses to a valid instant.
//! Such strings are transparently promoted to dates by comparisons, by
//! node-set `string_values` and by the string→number conversion — and
//! nowhere else.

use chrono::{
    DateTime, Datelike, FixedOffset, Local, NaiveDate, NaiveDateTime, TimeZone, Timelike,
};
use once_cell::sync::Lazy;
use regex::Regex;

pub const MILLIS_PER_DAY: f64 = 86_400_000.0;

static DATE_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}[-/]\d{1,2}[-/]\d{1,2}([T ].+)?$").expect("static regex"));

static BARE_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})[-/](\d{1,2})[-/](\d{1,2})$").expect("static regex"));

static NUMERIC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?(\d+(\.\d*)?|\.\d+)$").expect("static regex"));

static CLOCK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{2}):(\d{2}):(\d{2})(?:\.(\d{1,3}))?([+-])(\d{2}):(\d{2})$")
        .expect("static regex")
});

/// XPath 1.0 number lexical form: optional sign, digits, optional fraction.
/// No exponent, no hex, no `Infinity`.
pub fn is_numeric(s: &str) -> bool {
    NUMERIC_RE.is_match(s)
}

pub fn is_date_string(s: &str) -> bool {
    let t = s.trim();
    !is_numeric(t) && DATE_PREFIX_RE.is_match(t) && parse_date(t).is_some()
}

/// Parse a date or date-time string to an instant.
///
/// Bare dates are anchored to *local* midnight with the offset retained, so
/// comparing a stored `2012-02-03` with `today()` does not drift across DST
/// boundaries. Date-times without an offset are interpreted in local time;
/// an explicit offset (or `Z`) is preserved.
pub fn parse_date(s: &str) -> Option<DateTime<FixedOffset>> {
    let t = s.trim();
    if let Some(c) = BARE_DATE_RE.captures(t) {
        let y: i32 = c[1].parse().ok()?;
        let m: u32 = c[2].parse().ok()?;
        let d: u32 = c[3].parse().ok()?;
        let date = NaiveDate::from_ymd_opt(y, m, d)?;
        let naive = date.and_hms_opt(0, 0, 0)?;
        return local_instant(naive);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(t) {
        return Some(dt);
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(t, fmt) {
            return local_instant(naive);
        }
    }
    None
}

fn local_instant(naive: NaiveDateTime) -> Option<DateTime<FixedOffset>> {
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.fixed_offset())
}

/// The canonical numeric form of a date: fractional days since the epoch.
pub fn days_since_epoch(dt: &DateTime<FixedOffset>) -> f64 {
    dt.timestamp_millis() as f64 / MILLIS_PER_DAY
}

/// Inverse of [`days_since_epoch`]; `None` when the value is not a finite
/// representable instant.
pub fn date_from_days(days: f64) -> Option<DateTime<FixedOffset>> {
    if !days.is_finite() {
        return None;
    }
    let millis = days * MILLIS_PER_DAY;
    if millis < i64::MIN as f64 || millis > i64::MAX as f64 {
        return None;
    }
    DateTime::from_timestamp_millis(millis as i64)
        .map(|utc| utc.with_timezone(&Local).fixed_offset())
}

/// ISO-local serialisation with offset: `2017-03-15T00:00:00.000-07:00`.
pub fn to_iso_local_string(dt: &DateTime<FixedOffset>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%.3f%:z").to_string()
}

/// Local midnight of the current day.
pub fn today() -> DateTime<FixedOffset> {
    let now = Local::now();
    now.date_naive()
        .and_hms_opt(0, 0, 0)
        .and_then(local_instant)
        .unwrap_or_else(|| now.fixed_offset())
}

/// The current instant with the local offset.
pub fn now() -> DateTime<FixedOffset> {
    Local::now().fixed_offset()
}

pub fn round_to_places(x: f64, places: u32) -> f64 {
    let f = 10f64.powi(places as i32);
    (x * f).round() / f
}

/// Fraction of a day named by a `HH:MM:SS(.sss)?±HH:MM` clock string, to
/// three decimal places. NaN when malformed or out of range.
pub fn decimal_time(s: &str) -> f64 {
    let Some(c) = CLOCK_RE.captures(s.trim()) else {
        return f64::NAN;
    };
    let h: u32 = c[1].parse().unwrap_or(99);
    let m: u32 = c[2].parse().unwrap_or(99);
    let sec: u32 = c[3].parse().unwrap_or(99);
    let millis: u32 = c
        .get(4)
        .map(|f| {
            let raw = f.as_str();
            let padded = format!("{:0<3}", raw);
            padded.parse().unwrap_or(0)
        })
        .unwrap_or(0);
    let off_h: u32 = c[6].parse().unwrap_or(99);
    let off_m: u32 = c[7].parse().unwrap_or(99);
    if h >= 24 || m >= 60 || sec >= 60 || off_h > 14 || off_m >= 60 {
        return f64::NAN;
    }
    let seconds = f64::from(h) * 3600.0 + f64::from(m) * 60.0 + f64::from(sec)
        + f64::from(millis) / 1000.0;
    round_to_places(seconds / 86_400.0, 3)
}

/// Names used by `format-date`'s `%b` and `%a` directives.
#[derive(Debug, Clone)]
pub struct Locale {
    pub short_months: [String; 12],
    pub short_days: [String; 7],
}

impl Default for Locale {
    fn default() -> Self {
        fn own(xs: [&str; 12]) -> [String; 12] {
            xs.map(str::to_string)
        }
        Locale {
            short_months: own([
                "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
            ]),
            short_days: [
                "Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat",
            ]
            .map(str::to_string),
        }
    }
}

/// `format-date` directive expansion. Unknown directives pass through
/// verbatim, `%` included.
pub fn format_date(dt: &DateTime<FixedOffset>, fmt: &str, locale: &Locale) -> String {
    let mut out = String::with_capacity(fmt.len());
    let mut chars = fmt.chars();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('Y') => out.push_str(&format!("{:04}", dt.year())),
            Some('y') => out.push_str(&format!("{:02}", dt.year().rem_euclid(100))),
            Some('m') => out.push_str(&format!("{:02}", dt.month())),
            Some('n') => out.push_str(&dt.month().to_string()),
            Some('b') => out.push_str(&locale.short_months[dt.month0() as usize]),
            Some('d') => out.push_str(&format!("{:02}", dt.day())),
            Some('e') => out.push_str(&dt.day().to_string()),
            Some('H') => out.push_str(&format!("{:02}", dt.hour())),
            Some('h') => out.push_str(&dt.hour().to_string()),
            Some('M') => out.push_str(&format!("{:02}", dt.minute())),
            Some('S') => out.push_str(&format!("{:02}", dt.second())),
            Some('3') => out.push_str(&format!("{:03}", dt.timestamp_subsec_millis())),
            Some('a') => {
                out.push_str(&locale.short_days[dt.weekday().num_days_from_sunday() as usize])
            }
            Some(other) => {
                out.push('%');
                out.push(other);
            }
            None => out.push('%'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_strings_require_a_date_shape() {
        assert!(is_date_string("2012-02-03"));
        assert!(is_date_string("2012/2/3"));
        assert!(is_date_string("2012-02-03T10:20:30Z"));
        assert!(!is_date_string("2012"));
        assert!(!is_date_string("12.5"));
        assert!(!is_date_string("hello"));
        assert!(!is_date_string("2012-13-40"));
    }

    #[test]
    fn bare_dates_anchor_to_local_midnight() {
        let dt = parse_date("2017-03-15").unwrap();
        assert_eq!(dt.hour(), 0);
        assert_eq!(dt.minute(), 0);
        assert_eq!((dt.year(), dt.month(), dt.day()), (2017, 3, 15));
    }

    #[test]
    fn decimal_time_fractions() {
        assert_eq!(decimal_time("00:00:00.000+00:00"), 0.0);
        assert_eq!(decimal_time("12:00:00.000+00:00"), 0.5);
        assert_eq!(decimal_time("06:00:00.000-07:00"), 0.25);
        assert!(decimal_time("24:00:00.000+00:00").is_nan());
        assert!(decimal_time("12:00").is_nan());
        assert!(decimal_time("12:00:00.000+15:00").is_nan());
    }

    #[test]
    fn format_date_directives() {
        let dt = parse_date("2017-03-05").unwrap();
        let locale = Locale::default();
        assert_eq!(format_date(&dt, "%Y/%m/%d", &locale), "2017/03/05");
        assert_eq!(format_date(&dt, "%e %b %Y", &locale), "5 Mar 2017");
        assert_eq!(format_date(&dt, "%a", &locale), "Sun");
        assert_eq!(format_date(&dt, "100%", &locale), "100%");
    }

    #[test]
    fn epoch_days_round_trip() {
        let dt = parse_date("1970-01-02T00:00:00Z").unwrap();
        assert_eq!(days_since_epoch(&dt), 1.0);
        let back = date_from_days(1.0).unwrap();
        assert_eq!(back.timestamp_millis(), dt.timestamp_millis());
    }
}
