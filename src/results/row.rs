use std::sync::Arc;

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value as JsonValue;

use crate::types::Value;

/// A row from a query result.
///
/// Behaves like an ordered mapping from column name to value: column names are shared across
/// every row of a result set and iterate in the statement's declared column order.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    columns: Arc<Vec<String>>,
    values: Vec<Value>,
}

impl Record {
    #[must_use]
    pub fn new(columns: Arc<Vec<String>>, values: Vec<Value>) -> Self {
        Self { columns, values }
    }

    /// Get a value by column name.
    ///
    /// When a result carries the same column name twice (e.g. `SELECT a.id, b.id`), the last one
    /// wins, as it would when inserting into a map.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .rposition(|name| name == column)
            .and_then(|idx| self.values.get(idx))
    }

    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    #[must_use]
    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Render the record as a JSON object, keys in column order.
    ///
    /// # Errors
    /// Returns the serializer error if a value cannot be represented in JSON.
    pub fn to_json(&self) -> Result<JsonValue, serde_json::Error> {
        serde_json::to_value(self)
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> Record {
        Record::new(
            Arc::new(vec!["id".into(), "name".into(), "id".into()]),
            vec![Value::Int(1), Value::Text("a".into()), Value::Int(2)],
        )
    }

    #[test]
    fn lookup_by_name_and_index() {
        let rec = record();
        assert_eq!(rec.get("name"), Some(&Value::Text("a".into())));
        assert_eq!(rec.get("id"), Some(&Value::Int(2)));
        assert_eq!(rec.get_by_index(0), Some(&Value::Int(1)));
        assert!(rec.get("missing").is_none());
    }

    #[test]
    fn iterates_in_column_order() {
        let record = record();
        let names: Vec<&str> = record.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["id", "name", "id"]);
    }
}
