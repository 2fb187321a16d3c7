use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use serde_json::Value as JsonValue;

/// Values bound as query arguments or read back from a row.
///
/// Build argument lists with the [`args!`](crate::args) macro, which routes every element
/// through `Value::from`:
/// ```rust
/// use postgreslite::{Value, args};
///
/// let params = args![1, "alice", true, None::<i64>];
/// assert_eq!(params[1], Value::Text("alice".into()));
/// assert!(params[3].is_null());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// NULL value
    Null,
    /// Integer value (64-bit)
    Int(i64),
    /// Floating point value (64-bit)
    Float(f64),
    /// Text/string value
    Text(String),
    /// Binary data
    Blob(Vec<u8>),
    /// Boolean value, stored as 0/1
    Bool(bool),
    /// Calendar date, stored as ISO-8601 text
    Date(NaiveDate),
    /// Naive timestamp, stored as ISO-8601 text with a space separator
    Timestamp(NaiveDateTime),
    /// JSON value, stored as its serialized text
    Json(JsonValue),
}

impl Value {
    /// Check if this value is NULL
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        if let Value::Int(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(value) => Some(*value),
            #[allow(clippy::cast_precision_loss)]
            Value::Int(value) => Some(*value as f64),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let Value::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_blob(&self) -> Option<&[u8]> {
        if let Value::Blob(bytes) = self {
            Some(bytes)
        } else {
            None
        }
    }

    /// Booleans come back from storage as integers; 0 and 1 are accepted as well.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(value) => Some(*value),
            Value::Int(0) => Some(false),
            Value::Int(1) => Some(true),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(date) => Some(*date),
            Value::Timestamp(ts) => Some(ts.date()),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            Value::Timestamp(ts) => Some(*ts),
            Value::Date(date) => date.and_hms_opt(0, 0, 0),
            _ => None,
        }
    }
}

impl From<rusqlite::types::Value> for Value {
    fn from(value: rusqlite::types::Value) -> Self {
        match value {
            rusqlite::types::Value::Null => Value::Null,
            rusqlite::types::Value::Integer(i) => Value::Int(i),
            rusqlite::types::Value::Real(f) => Value::Float(f),
            rusqlite::types::Value::Text(s) => Value::Text(s),
            rusqlite::types::Value::Blob(b) => Value::Blob(b),
        }
    }
}

macro_rules! impl_from_for_value {
    ($($ty:ty => $variant:ident via $conv:expr),+ $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::$variant($conv(value))
                }
            }
        )+
    };
}

impl_from_for_value! {
    i64 => Int via std::convert::identity,
    i32 => Int via i64::from,
    i16 => Int via i64::from,
    u32 => Int via i64::from,
    f64 => Float via std::convert::identity,
    f32 => Float via f64::from,
    bool => Bool via std::convert::identity,
    String => Text via std::convert::identity,
    &str => Text via str::to_owned,
    &String => Text via String::clone,
    Vec<u8> => Blob via std::convert::identity,
    &[u8] => Blob via <[u8]>::to_vec,
    NaiveDate => Date via std::convert::identity,
    NaiveDateTime => Timestamp via std::convert::identity,
    JsonValue => Json via std::convert::identity,
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// Build a `Vec<Value>` argument list from heterogeneous Rust values.
///
/// ```rust
/// use postgreslite::args;
///
/// let params = args!["AlexFlipnote", 86_477_779_717_066_752_i64];
/// assert_eq!(params.len(), 2);
/// ```
#[macro_export]
macro_rules! args {
    () => {
        ::std::vec::Vec::<$crate::Value>::new()
    };
    ($($arg:expr),+ $(,)?) => {
        ::std::vec![$($crate::Value::from($arg)),+]
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_maps_to_null() {
        assert_eq!(Value::from(None::<&str>), Value::Null);
        assert_eq!(Value::from(Some(3_i32)), Value::Int(3));
    }

    #[test]
    fn bool_accessor_accepts_stored_integers() {
        assert_eq!(Value::Int(1).as_bool(), Some(true));
        assert_eq!(Value::Int(0).as_bool(), Some(false));
        assert_eq!(Value::Int(2).as_bool(), None);
    }

    #[test]
    fn serializes_untagged() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 17).unwrap();
        let json = serde_json::to_value(vec![
            Value::Null,
            Value::Int(7),
            Value::Text("x".into()),
            Value::Date(date),
        ])
        .unwrap();
        assert_eq!(json, serde_json::json!([null, 7, "x", "2024-05-17"]));
    }
}
