use std::fs;
use std::path::Path;

use rusqlite::Connection;

use crate::error::{PostgresLiteError, Result};
use crate::results::{Record, ResultSet};
use crate::sqlite::executor::{execute_batch, run_statement};
use crate::types::Value;

use super::{first_record, first_value};

/// Synchronous pool over one connection.
///
/// Not `Sync`: the connection must not be shared between threads without external locking.
/// Use [`AsyncPool`](super::AsyncPool) when many tasks need the same database.
#[derive(Debug)]
pub struct Pool {
    conn: Connection,
    translate: bool,
}

impl Pool {
    pub(crate) fn new(conn: Connection, translate: bool) -> Self {
        Self { conn, translate }
    }

    fn run(&self, query: &str, args: &[Value]) -> Result<ResultSet> {
        run_statement(&self.conn, query, args, self.translate)
    }

    /// Execute a statement and return its status tag, e.g. `INSERT 1`.
    ///
    /// # Errors
    /// Returns [`PostgresLiteError::StorageEngineError`] for any SQLite failure and
    /// [`PostgresLiteError::ParameterError`] for unresolvable `$N` placeholders.
    pub fn execute(&self, query: &str, args: &[Value]) -> Result<String> {
        Ok(self.run(query, args)?.status())
    }

    /// Fetch every row.
    ///
    /// # Errors
    /// Same as [`Pool::execute`].
    pub fn fetch(&self, query: &str, args: &[Value]) -> Result<Vec<Record>> {
        Ok(self.run(query, args)?.into_records())
    }

    /// Fetch the first row, if any.
    ///
    /// # Errors
    /// Same as [`Pool::execute`].
    pub fn fetchrow(&self, query: &str, args: &[Value]) -> Result<Option<Record>> {
        Ok(first_record(self.run(query, args)?))
    }

    /// Fetch the first column of the first row, if any.
    ///
    /// # Errors
    /// Same as [`Pool::execute`].
    pub fn fetchval(&self, query: &str, args: &[Value]) -> Result<Option<Value>> {
        Ok(first_value(self.run(query, args)?))
    }

    /// Read `path` and execute its contents as one statement.
    ///
    /// # Errors
    /// Returns [`PostgresLiteError::Io`] if the file cannot be read, otherwise the same as
    /// [`Pool::execute`].
    pub fn run_from_file(&self, path: impl AsRef<Path>, args: &[Value]) -> Result<String> {
        let query = fs::read_to_string(path)?;
        self.execute(&query, args)
    }

    /// Run a multi-statement script inside one transaction.
    ///
    /// # Errors
    /// Returns [`PostgresLiteError::StorageEngineError`] if any statement fails.
    pub fn execute_batch(&self, script: &str) -> Result<()> {
        execute_batch(&self.conn, script)
    }

    /// Close the connection.
    ///
    /// # Errors
    /// Returns [`PostgresLiteError::StorageEngineError`] if SQLite refuses to close.
    pub fn close(self) -> Result<()> {
        self.conn
            .close()
            .map_err(|(_, err)| PostgresLiteError::from(err))
    }
}
