use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::error::Result;
use crate::results::{Record, ResultSet};
use crate::sqlite::worker::{JobMode, PendingJob, QueueState, WorkQueue};
use crate::types::Value;

use super::{first_record, first_value};

/// Asynchronous pool: one connection, one worker thread, one FIFO queue.
///
/// Cloning is cheap and every clone feeds the same queue, so jobs from all clones execute in
/// the order they were admitted:
/// ```rust
/// use postgreslite::{PostgresLite, args};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), postgreslite::PostgresLiteError> {
/// let pool = PostgresLite::new(":memory:")?.connect_async()?;
/// pool.execute("CREATE TABLE users (name TEXT UNIQUE NOT NULL)", &[]).await?;
/// let status = pool
///     .execute("INSERT INTO users (name) VALUES ($1)", &args!["AlexFlipnote"])
///     .await?;
/// assert_eq!(status, "INSERT 1");
/// pool.close().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct AsyncPool {
    queue: Arc<WorkQueue>,
}

impl AsyncPool {
    pub(crate) fn new(queue: WorkQueue) -> Self {
        Self {
            queue: Arc::new(queue),
        }
    }

    /// Admit a statement without waiting for it to run.
    ///
    /// # Errors
    /// Returns [`PostgresLiteError::QueueClosed`](crate::PostgresLiteError::QueueClosed) after
    /// `close()`.
    pub async fn enqueue(&self, query: &str, args: &[Value]) -> Result<PendingJob> {
        self.queue
            .enqueue(query.to_owned(), args.to_vec(), JobMode::Statement)
            .await
    }

    async fn run(&self, query: &str, args: &[Value]) -> Result<ResultSet> {
        self.enqueue(query, args).await?.wait().await
    }

    /// Execute a statement and return its status tag, e.g. `INSERT 1`.
    ///
    /// # Errors
    /// Returns the job's storage or parameter error, or
    /// [`PostgresLiteError::QueueClosed`](crate::PostgresLiteError::QueueClosed) after `close()`.
    pub async fn execute(&self, query: &str, args: &[Value]) -> Result<String> {
        Ok(self.run(query, args).await?.status())
    }

    /// Fetch every row.
    ///
    /// # Errors
    /// Same as [`AsyncPool::execute`].
    pub async fn fetch(&self, query: &str, args: &[Value]) -> Result<Vec<Record>> {
        Ok(self.run(query, args).await?.into_records())
    }

    /// Fetch the first row, if any.
    ///
    /// # Errors
    /// Same as [`AsyncPool::execute`].
    pub async fn fetchrow(&self, query: &str, args: &[Value]) -> Result<Option<Record>> {
        Ok(first_record(self.run(query, args).await?))
    }

    /// Fetch the first column of the first row, if any.
    ///
    /// # Errors
    /// Same as [`AsyncPool::execute`].
    pub async fn fetchval(&self, query: &str, args: &[Value]) -> Result<Option<Value>> {
        Ok(first_value(self.run(query, args).await?))
    }

    /// Read `path` and execute its contents as one statement.
    ///
    /// # Errors
    /// Returns [`PostgresLiteError::Io`](crate::PostgresLiteError::Io) if the file cannot be
    /// read, otherwise the same as [`AsyncPool::execute`].
    pub async fn run_from_file(&self, path: impl AsRef<Path>, args: &[Value]) -> Result<String> {
        let query = tokio::fs::read_to_string(path).await?;
        self.execute(&query, args).await
    }

    /// Run a multi-statement script inside one transaction, as a single job.
    ///
    /// # Errors
    /// Same as [`AsyncPool::execute`].
    pub async fn execute_batch(&self, script: &str) -> Result<()> {
        self.queue
            .enqueue(script.to_owned(), Vec::new(), JobMode::Batch)
            .await?
            .wait()
            .await
            .map(|_| ())
    }

    /// Stop accepting jobs, wait for the queue to drain, then release the connection.
    ///
    /// # Errors
    /// Returns [`PostgresLiteError::QueueClosed`](crate::PostgresLiteError::QueueClosed) if the
    /// pool was already closed (through any clone).
    pub async fn close(&self) -> Result<()> {
        self.queue.close().await
    }

    /// Jobs admitted but not yet resolved, including the one executing.
    #[must_use]
    pub fn pending_job_count(&self) -> usize {
        self.queue.pending()
    }

    #[must_use]
    pub fn state(&self) -> QueueState {
        self.queue.state()
    }
}

impl fmt::Debug for AsyncPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncPool").field("queue", &self.queue).finish()
    }
}
