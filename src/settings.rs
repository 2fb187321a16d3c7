//! Process-wide value converters for temporal types.
//!
//! Dates and timestamps are stored as ISO-8601 text. On the way back out, a column's declared
//! type selects a converter: `DATE` columns become [`Value::Date`], `TIMESTAMP` and `DATETIME`
//! columns become [`Value::Timestamp`]. Legacy timestamp columns holding epoch seconds are
//! accepted too.

use std::collections::HashMap;
use std::sync::{Once, PoisonError, RwLock};

use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike};
use lazy_static::lazy_static;

use crate::types::Value;

/// Read-side converter: receives the raw stored value, returns the converted value or `None`
/// to keep the raw one.
pub type Converter = fn(&Value) -> Option<Value>;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const TIMESTAMP_FRACTION_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

const TIMESTAMP_READ_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

lazy_static! {
    static ref CONVERTERS: RwLock<HashMap<String, Converter>> = RwLock::new(HashMap::new());
}

static INIT: Once = Once::new();

/// Register the default temporal converters. Safe to call any number of times.
pub fn init() {
    INIT.call_once(|| {
        register_converter("DATE", convert_date);
        register_converter("TIMESTAMP", convert_timestamp);
        register_converter("DATETIME", convert_timestamp);
        tracing::debug!("registered default temporal converters");
    });
}

/// Register a read-side converter for columns declared with `decl_type`.
///
/// Keys are matched case-insensitively on the first word of the declared type, so `timestamp`,
/// `TIMESTAMP(6)` and `TIMESTAMP WITH TIME ZONE` all resolve to `TIMESTAMP`.
pub fn register_converter(decl_type: &str, converter: Converter) {
    let key = normalize_decl_type(decl_type);
    let mut map = CONVERTERS.write().unwrap_or_else(PoisonError::into_inner);
    map.insert(key, converter);
}

/// Look up the converter for a declared column type.
#[must_use]
pub fn converter_for(decl_type: &str) -> Option<Converter> {
    let key = normalize_decl_type(decl_type);
    let map = CONVERTERS.read().unwrap_or_else(PoisonError::into_inner);
    map.get(&key).copied()
}

/// Apply an optional converter, falling back to the raw value.
#[must_use]
pub fn convert(raw: Value, converter: Option<Converter>) -> Value {
    match converter {
        Some(convert) if !raw.is_null() => convert(&raw).unwrap_or(raw),
        _ => raw,
    }
}

fn normalize_decl_type(decl_type: &str) -> String {
    decl_type
        .trim()
        .split(|c: char| c.is_whitespace() || c == '(')
        .next()
        .unwrap_or_default()
        .to_ascii_uppercase()
}

#[must_use]
pub fn adapt_date(date: &NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Microseconds are written only when present, matching what `CURRENT_TIMESTAMP` produces
/// for whole seconds.
#[must_use]
pub fn adapt_timestamp(ts: &NaiveDateTime) -> String {
    if ts.nanosecond() == 0 {
        ts.format(TIMESTAMP_FORMAT).to_string()
    } else {
        ts.format(TIMESTAMP_FRACTION_FORMAT).to_string()
    }
}

#[must_use]
pub fn convert_date(raw: &Value) -> Option<Value> {
    match raw {
        Value::Text(text) => NaiveDate::parse_from_str(text.trim(), DATE_FORMAT)
            .ok()
            .map(Value::Date),
        _ => None,
    }
}

#[must_use]
pub fn convert_timestamp(raw: &Value) -> Option<Value> {
    let parsed = match raw {
        Value::Text(text) => parse_timestamp_text(text.trim()),
        Value::Int(secs) => DateTime::from_timestamp(*secs, 0).map(|dt| dt.naive_utc()),
        Value::Float(secs) => from_fractional_epoch(*secs),
        _ => None,
    };
    parsed.map(Value::Timestamp)
}

fn parse_timestamp_text(text: &str) -> Option<NaiveDateTime> {
    TIMESTAMP_READ_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, DATE_FORMAT)
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn from_fractional_epoch(secs: f64) -> Option<NaiveDateTime> {
    if !secs.is_finite() {
        return None;
    }
    let whole = secs.floor();
    // Round to microseconds; that is all the text representation keeps.
    let micros = ((secs - whole) * 1_000_000.0).round() as u32;
    let (whole, micros) = if micros >= 1_000_000 {
        (whole + 1.0, 0)
    } else {
        (whole, micros)
    };
    DateTime::from_timestamp(whole as i64, micros * 1_000).map(|dt| dt.naive_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(h: u32, m: u32, s: u32, micro: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 17)
            .unwrap()
            .and_hms_micro_opt(h, m, s, micro)
            .unwrap()
    }

    #[test]
    fn init_is_idempotent() {
        init();
        let first = converter_for("timestamp").map(|f| f as usize);
        init();
        init();
        assert_eq!(converter_for("TIMESTAMP").map(|f| f as usize), first);
        assert!(converter_for("DATE").is_some());
        assert!(converter_for("datetime").is_some());
    }

    #[test]
    fn decl_type_is_normalized() {
        init();
        assert!(converter_for("TIMESTAMP(6)").is_some());
        assert!(converter_for(" timestamp with time zone").is_some());
        assert!(converter_for("TEXT").is_none());
    }

    #[test]
    fn timestamps_round_trip_through_text() {
        let original = ts(13, 45, 30, 123_456);
        let stored = adapt_timestamp(&original);
        assert_eq!(stored, "2024-05-17 13:45:30.123456");
        assert_eq!(
            convert_timestamp(&Value::Text(stored)),
            Some(Value::Timestamp(original))
        );
    }

    #[test]
    fn whole_seconds_have_no_fraction() {
        assert_eq!(adapt_timestamp(&ts(8, 0, 1, 0)), "2024-05-17 08:00:01");
    }

    #[test]
    fn accepts_t_separator_and_epoch_seconds() {
        assert_eq!(
            convert_timestamp(&Value::Text("2024-05-17T13:45:30".into())),
            Some(Value::Timestamp(ts(13, 45, 30, 0)))
        );
        let epoch = ts(13, 45, 30, 0).and_utc().timestamp();
        assert_eq!(
            convert_timestamp(&Value::Int(epoch)),
            Some(Value::Timestamp(ts(13, 45, 30, 0)))
        );
        #[allow(clippy::cast_precision_loss)]
        let fractional = epoch as f64 + 0.5;
        assert_eq!(
            convert_timestamp(&Value::Float(fractional)),
            Some(Value::Timestamp(ts(13, 45, 30, 500_000)))
        );
    }

    #[test]
    fn unparseable_values_stay_raw() {
        let raw = Value::Text("not a date".into());
        assert_eq!(convert(raw.clone(), Some(convert_date)), raw);
        assert_eq!(convert(Value::Null, Some(convert_timestamp)), Value::Null);
    }

    #[test]
    fn dates_round_trip() {
        let date = NaiveDate::from_ymd_opt(1999, 12, 31).unwrap();
        let stored = adapt_date(&date);
        assert_eq!(stored, "1999-12-31");
        assert_eq!(convert_date(&Value::Text(stored)), Some(Value::Date(date)));
    }
}
