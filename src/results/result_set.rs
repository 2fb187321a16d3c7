use std::sync::Arc;

use crate::types::Value;

use super::row::Record;

/// Buffered outcome of one statement: the records it returned, its column names, and what the
/// engine reported about affected rows.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    verb: String,
    columns: Arc<Vec<String>>,
    records: Vec<Record>,
    rows_affected: i64,
}

impl ResultSet {
    /// Create an empty result set for a statement whose leading keyword is `verb`.
    #[must_use]
    pub fn new(verb: impl Into<String>, columns: Arc<Vec<String>>) -> Self {
        Self {
            verb: verb.into(),
            columns,
            records: Vec::new(),
            rows_affected: -1,
        }
    }

    pub fn push_values(&mut self, values: Vec<Value>) {
        self.records
            .push(Record::new(Arc::clone(&self.columns), values));
    }

    /// Record the engine's affected-row count; `-1` means "not reported".
    pub fn set_rows_affected(&mut self, rows_affected: i64) {
        self.rows_affected = rows_affected;
    }

    /// Uppercased first token of the statement.
    #[must_use]
    pub fn verb(&self) -> &str {
        &self.verb
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    #[must_use]
    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    #[must_use]
    pub fn first(&self) -> Option<&Record> {
        self.records.first()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn rows_affected(&self) -> i64 {
        self.rows_affected
    }

    /// Count reported in the status tag: rows returned for `SELECT`, otherwise the affected
    /// row count floored at zero.
    #[must_use]
    pub fn status_count(&self) -> u64 {
        if self.verb == "SELECT" {
            self.records.len() as u64
        } else {
            u64::try_from(self.rows_affected).unwrap_or(0)
        }
    }

    /// asyncpg-style status tag, e.g. `SELECT 3` or `INSERT 1`.
    #[must_use]
    pub fn status(&self) -> String {
        format!("{} {}", self.verb, self.status_count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_counts_returned_rows() {
        let mut rs = ResultSet::new("SELECT", Arc::new(vec!["x".into()]));
        for i in 0..3 {
            rs.push_values(vec![Value::Int(i)]);
        }
        rs.set_rows_affected(-1);
        assert_eq!(rs.status(), "SELECT 3");
    }

    #[test]
    fn unreported_counts_floor_to_zero() {
        let rs = ResultSet::new("CREATE", Arc::new(Vec::new()));
        assert_eq!(rs.rows_affected(), -1);
        assert_eq!(rs.status(), "CREATE 0");
    }

    #[test]
    fn dml_uses_affected_rows() {
        let mut rs = ResultSet::new("UPDATE", Arc::new(Vec::new()));
        rs.set_rows_affected(4);
        assert_eq!(rs.status(), "UPDATE 4");
    }
}
