use rusqlite::Connection;

use crate::error::Result;
use crate::results::ResultSet;
use crate::translation::{self, TranslatedStatement};
use crate::types::Value;

use super::query::{build_result_set, statement_verb};

/// Translate and run one statement against `conn`.
///
/// # Errors
/// Returns [`PostgresLiteError::ParameterError`](crate::PostgresLiteError::ParameterError) if
/// placeholder translation fails, or
/// [`PostgresLiteError::StorageEngineError`](crate::PostgresLiteError::StorageEngineError) for
/// any failure reported by SQLite.
pub fn run_statement(
    conn: &Connection,
    query: &str,
    args: &[Value],
    translate: bool,
) -> Result<ResultSet> {
    let statement = if translate {
        translation::translate(query, args)?
    } else {
        TranslatedStatement::passthrough(query, args)
    };
    let mut stmt = conn.prepare(&statement.query)?;
    build_result_set(&mut stmt, &statement.args, statement_verb(query))
}

/// Run a multi-statement script inside one transaction.
///
/// # Errors
/// Returns [`PostgresLiteError::StorageEngineError`](crate::PostgresLiteError::StorageEngineError)
/// if any statement fails; the transaction is rolled back in that case.
pub fn execute_batch(conn: &Connection, script: &str) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(script)?;
    tx.commit()?;
    Ok(())
}
