use std::sync::Arc;

use rusqlite::types::Value as SqlValue;
use rusqlite::{Statement, params_from_iter};

use crate::error::Result;
use crate::results::ResultSet;
use crate::settings::{self, Converter};
use crate::types::Value;

/// Verbs whose statements report an affected-row count.
const DML_VERBS: &[&str] = &["INSERT", "UPDATE", "DELETE", "REPLACE"];

/// Uppercased first whitespace-delimited token of `query`.
#[must_use]
pub fn statement_verb(query: &str) -> String {
    query
        .split_whitespace()
        .next()
        .map(str::to_uppercase)
        .unwrap_or_default()
}

/// A statement reports its change count when its verb is DML, or when it is a common table
/// expression that writes (`WITH ... INSERT/UPDATE/DELETE`).
fn is_dml(stmt: &Statement<'_>, verb: &str) -> bool {
    DML_VERBS.contains(&verb) || (verb == "WITH" && !stmt.readonly())
}

/// Run a prepared statement and buffer everything it produced.
///
/// Statements without result columns are stepped once and report the engine's change count
/// (DML only; everything else reports `-1`). Statements with result columns have every row
/// materialized, each value passed through the converter registered for its column's declared
/// type.
///
/// # Errors
/// Returns [`PostgresLiteError::StorageEngineError`](crate::PostgresLiteError::StorageEngineError)
/// if binding, stepping, or reading a row fails.
pub fn build_result_set(stmt: &mut Statement<'_>, params: &[Value], verb: String) -> Result<ResultSet> {
    let dml = is_dml(stmt, &verb);

    if stmt.column_count() == 0 {
        let changes = stmt.execute(params_from_iter(params.iter()))?;
        let mut result_set = ResultSet::new(verb, Arc::new(Vec::new()));
        result_set.set_rows_affected(if dml {
            i64::try_from(changes).unwrap_or(i64::MAX)
        } else {
            -1
        });
        return Ok(result_set);
    }

    let column_names: Vec<String> = stmt
        .column_names()
        .iter()
        .map(std::string::ToString::to_string)
        .collect();
    let converters: Vec<Option<Converter>> = stmt
        .columns()
        .iter()
        .map(|column| column.decl_type().and_then(settings::converter_for))
        .collect();

    let mut result_set = ResultSet::new(verb, Arc::new(column_names));
    let mut rows = stmt.query(params_from_iter(params.iter()))?;
    while let Some(row) = rows.next()? {
        let mut values = Vec::with_capacity(converters.len());
        for (idx, converter) in converters.iter().enumerate() {
            let raw: SqlValue = row.get(idx)?;
            values.push(settings::convert(Value::from(raw), *converter));
        }
        result_set.push_values(values);
    }

    // INSERT ... RETURNING and friends: one returned row per changed row.
    let returned = i64::try_from(result_set.len()).unwrap_or(i64::MAX);
    result_set.set_rows_affected(if dml { returned } else { -1 });
    Ok(result_set)
}
