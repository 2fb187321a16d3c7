use std::time::Duration;

use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::error::{PostgresLiteError, Result};
use crate::pool::{AsyncPool, Pool};
use crate::settings;

use super::worker::WorkQueue;

/// Path that opens a private in-memory database instead of a file.
pub const MEMORY_MARKER: &str = ":memory:";

/// Extension every file-backed database path must carry.
pub const DB_EXTENSION: &str = ".db";

/// Options for opening a database and the pools built on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolOptions {
    /// `":memory:"` or a filesystem path ending in `.db`.
    pub db_path: String,
    /// Rewrite `$N` placeholders into native `?` placeholders.
    #[serde(default = "default_translation")]
    pub translate_placeholders: bool,
    /// Bound on jobs waiting in an async pool's queue; `None` means unbounded.
    #[serde(default)]
    pub queue_capacity: Option<usize>,
    /// How long SQLite waits on a locked database before failing.
    #[serde(default)]
    pub busy_timeout_ms: Option<u64>,
    /// Switch file-backed databases to write-ahead logging.
    #[serde(default)]
    pub wal: bool,
}

fn default_translation() -> bool {
    true
}

impl PoolOptions {
    #[must_use]
    pub fn new(db_path: impl Into<String>) -> Self {
        Self {
            db_path: db_path.into(),
            translate_placeholders: default_translation(),
            queue_capacity: None,
            busy_timeout_ms: None,
            wal: false,
        }
    }

    #[must_use]
    pub fn is_memory(&self) -> bool {
        self.db_path == MEMORY_MARKER
    }

    /// Check the path and option values.
    ///
    /// # Errors
    /// Returns [`PostgresLiteError::InvalidConfiguration`] for an empty path, a path without the
    /// `.db` extension, or a zero queue capacity.
    pub fn validate(&self) -> Result<()> {
        if self.db_path.is_empty() {
            return Err(PostgresLiteError::InvalidConfiguration(
                "database path cannot be empty".into(),
            ));
        }
        if !self.is_memory() && !self.db_path.ends_with(DB_EXTENSION) {
            return Err(PostgresLiteError::InvalidConfiguration(format!(
                "database filename must end with '{DB_EXTENSION}' (got '{}')",
                self.db_path
            )));
        }
        if self.queue_capacity == Some(0) {
            return Err(PostgresLiteError::InvalidConfiguration(
                "queue capacity must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Entry point: a validated database location plus options, from which pools are opened.
///
/// ```rust
/// use postgreslite::PostgresLite;
///
/// let db = PostgresLite::new(":memory:")?;
/// let pool = db.connect()?;
/// assert_eq!(pool.execute("CREATE TABLE t (x INTEGER)", &[])?, "CREATE 0");
/// # Ok::<(), postgreslite::PostgresLiteError>(())
/// ```
#[derive(Debug, Clone)]
pub struct PostgresLite {
    options: PoolOptions,
}

impl PostgresLite {
    /// Use `db_path` with default options.
    ///
    /// # Errors
    /// Returns [`PostgresLiteError::InvalidConfiguration`] if the path is not `":memory:"` and
    /// does not end in `.db`.
    pub fn new(db_path: impl Into<String>) -> Result<Self> {
        Self::from_options(PoolOptions::new(db_path))
    }

    /// Use fully specified options, e.g. deserialized from a config file.
    ///
    /// # Errors
    /// Returns [`PostgresLiteError::InvalidConfiguration`] if validation fails.
    pub fn from_options(options: PoolOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self { options })
    }

    #[must_use]
    pub fn builder(db_path: impl Into<String>) -> PostgresLiteBuilder {
        PostgresLiteBuilder::new(db_path)
    }

    #[must_use]
    pub fn options(&self) -> &PoolOptions {
        &self.options
    }

    /// Open a synchronous pool that executes directly on the calling thread.
    ///
    /// # Errors
    /// Returns [`PostgresLiteError::StorageEngineError`] if SQLite cannot open the database.
    pub fn connect(&self) -> Result<Pool> {
        let conn = open_connection(&self.options)?;
        Ok(Pool::new(conn, self.options.translate_placeholders))
    }

    /// Open an asynchronous pool whose jobs run one at a time on a dedicated worker thread.
    ///
    /// # Errors
    /// Returns [`PostgresLiteError::StorageEngineError`] if SQLite cannot open the database, or
    /// [`PostgresLiteError::ConnectionError`] if the worker thread cannot be spawned.
    pub fn connect_async(&self) -> Result<AsyncPool> {
        let conn = open_connection(&self.options)?;
        let queue = WorkQueue::spawn(
            conn,
            self.options.translate_placeholders,
            self.options.queue_capacity,
        )?;
        Ok(AsyncPool::new(queue))
    }
}

/// Fluent builder for [`PostgresLite`].
#[derive(Debug, Clone)]
pub struct PostgresLiteBuilder {
    opts: PoolOptions,
}

impl PostgresLiteBuilder {
    #[must_use]
    pub fn new(db_path: impl Into<String>) -> Self {
        Self {
            opts: PoolOptions::new(db_path),
        }
    }

    #[must_use]
    pub fn translation(mut self, translate_placeholders: bool) -> Self {
        self.opts.translate_placeholders = translate_placeholders;
        self
    }

    #[must_use]
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.opts.queue_capacity = Some(capacity);
        self
    }

    #[must_use]
    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.opts.busy_timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    #[must_use]
    pub fn wal(mut self, wal: bool) -> Self {
        self.opts.wal = wal;
        self
    }

    #[must_use]
    pub fn finish(self) -> PoolOptions {
        self.opts
    }

    /// Validate the options and build a [`PostgresLite`].
    ///
    /// # Errors
    /// Returns [`PostgresLiteError::InvalidConfiguration`] if validation fails.
    pub fn build(self) -> Result<PostgresLite> {
        PostgresLite::from_options(self.finish())
    }
}

/// Register converters (once per process) and open the connection described by `opts`.
pub(crate) fn open_connection(opts: &PoolOptions) -> Result<Connection> {
    settings::init();

    let conn = if opts.is_memory() {
        tracing::info!("opening in-memory database");
        Connection::open_in_memory()?
    } else {
        tracing::info!(path = %opts.db_path, "opening database");
        Connection::open(&opts.db_path)?
    };

    if let Some(ms) = opts.busy_timeout_ms {
        conn.busy_timeout(Duration::from_millis(ms))?;
    }
    if opts.wal && !opts.is_memory() {
        let mode: String = conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
        tracing::debug!(journal_mode = %mode, "journal mode set");
    }
    Ok(conn)
}
