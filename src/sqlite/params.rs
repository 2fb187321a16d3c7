use rusqlite::ToSql;
use rusqlite::types::{ToSqlOutput, Value as SqlValue, ValueRef};
use serde_json::Value as JsonValue;

use crate::settings::{adapt_date, adapt_timestamp};
use crate::types::Value;

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Owned(SqlValue::Null),
            Value::Int(i) => ToSqlOutput::Owned(SqlValue::Integer(*i)),
            Value::Float(f) => ToSqlOutput::Owned(SqlValue::Real(*f)),
            Value::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            Value::Blob(bytes) => ToSqlOutput::Borrowed(ValueRef::Blob(bytes)),
            Value::Bool(b) => ToSqlOutput::Owned(SqlValue::Integer(i64::from(*b))),
            Value::Date(date) => ToSqlOutput::Owned(SqlValue::Text(adapt_date(date))),
            Value::Timestamp(ts) => ToSqlOutput::Owned(SqlValue::Text(adapt_timestamp(ts))),
            Value::Json(json) => ToSqlOutput::Owned(SqlValue::Text(json_text(json))),
        })
    }
}

fn json_text(json: &JsonValue) -> String {
    json.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn temporal_values_bind_as_iso_text() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let value = Value::Date(date);
        let out = value.to_sql().unwrap();
        assert_eq!(out, ToSqlOutput::Owned(SqlValue::Text("2024-01-02".into())));

        let ts = date.and_hms_opt(3, 4, 5).unwrap();
        let value = Value::Timestamp(ts);
        let out = value.to_sql().unwrap();
        assert_eq!(
            out,
            ToSqlOutput::Owned(SqlValue::Text("2024-01-02 03:04:05".into()))
        );
    }

    #[test]
    fn bools_bind_as_integers() {
        let out = Value::Bool(true).to_sql().unwrap();
        assert_eq!(out, ToSqlOutput::Owned(SqlValue::Integer(1)));
    }
}
