use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;

use rusqlite::Connection;
use tokio::sync::oneshot;

use crate::error::{PostgresLiteError, Result};
use crate::results::ResultSet;
use crate::types::Value;

use super::channel::{Job, JobMode, QueueSender, queue};
use super::dispatcher::{WorkerContext, run_worker};

static NEXT_WORKER_ID: AtomicU64 = AtomicU64::new(1);

/// Lifecycle of a work queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueState {
    /// No pending or in-flight jobs; the worker is parked.
    Idle,
    /// At least one job is waiting or executing.
    Draining,
    /// `close()` has been called; no further jobs are accepted.
    Closed,
}

/// Handle to an admitted job. Await [`PendingJob::wait`] for its result.
#[derive(Debug)]
pub struct PendingJob {
    id: u64,
    slot: oneshot::Receiver<Result<ResultSet>>,
}

impl PendingJob {
    /// Position in its pool's queue, starting at 1. Jobs execute in ascending id order.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Wait for the worker to resolve this job.
    ///
    /// # Errors
    /// Returns the job's own error, or [`PostgresLiteError::ConnectionError`] if the worker
    /// thread disappeared without resolving it.
    pub async fn wait(self) -> Result<ResultSet> {
        let id = self.id;
        self.slot.await.map_err(|_| {
            PostgresLiteError::ConnectionError(format!(
                "worker dropped job {id} without resolving it"
            ))
        })?
    }
}

/// The queue plus the worker thread draining it.
///
/// The connection lives on the worker thread; producers only ever touch the sending half of
/// the queue.
pub struct WorkQueue {
    worker_id: u64,
    sender: Mutex<Option<QueueSender>>,
    pending: Arc<AtomicUsize>,
    closed: AtomicBool,
    next_job_id: AtomicU64,
    admission: Mutex<()>,
    finished: Mutex<Option<oneshot::Receiver<Result<()>>>>,
}

impl WorkQueue {
    /// Move `conn` onto a new worker thread and return the queue feeding it.
    ///
    /// # Errors
    /// Returns [`PostgresLiteError::ConnectionError`] if the thread cannot be spawned.
    pub fn spawn(conn: Connection, translate: bool, capacity: Option<usize>) -> Result<Self> {
        let (sender, receiver) = queue(capacity);
        let (finished_tx, finished_rx) = oneshot::channel();
        let pending = Arc::new(AtomicUsize::new(0));
        let worker_id = NEXT_WORKER_ID.fetch_add(1, Ordering::Relaxed);

        let ctx = WorkerContext {
            conn,
            receiver,
            pending: Arc::clone(&pending),
            translate,
            finished: finished_tx,
        };
        thread::Builder::new()
            .name(format!("postgreslite-worker-{worker_id}"))
            .spawn(move || run_worker(ctx))
            .map_err(|err| {
                PostgresLiteError::ConnectionError(format!(
                    "failed to spawn worker thread: {err}"
                ))
            })?;
        tracing::debug!(worker = worker_id, bounded = capacity.is_some(), "worker started");

        Ok(Self {
            worker_id,
            sender: Mutex::new(Some(sender)),
            pending,
            closed: AtomicBool::new(false),
            next_job_id: AtomicU64::new(1),
            admission: Mutex::new(()),
            finished: Mutex::new(Some(finished_rx)),
        })
    }

    /// Admit a job at the tail of the queue.
    ///
    /// With an unbounded queue this never suspends. With a bounded queue it waits for a free
    /// slot; cancelling the returned future while it waits admits nothing.
    ///
    /// # Errors
    /// Returns [`PostgresLiteError::QueueClosed`] once `close()` has been called.
    pub async fn enqueue(&self, query: String, args: Vec<Value>, mode: JobMode) -> Result<PendingJob> {
        let sender = self
            .sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(PostgresLiteError::QueueClosed)?;
        let permit = sender.reserve().await.ok_or(PostgresLiteError::QueueClosed)?;

        let (respond_to, slot) = oneshot::channel();
        // Numbering and sending happen under one lock so ids follow queue order.
        let id = {
            let _admission = self.admission.lock().unwrap_or_else(PoisonError::into_inner);
            let id = self.next_job_id.fetch_add(1, Ordering::SeqCst);
            let job = Job {
                id,
                query,
                args,
                mode,
                respond_to,
            };
            self.pending.fetch_add(1, Ordering::SeqCst);
            if permit.send(job).is_err() {
                self.pending.fetch_sub(1, Ordering::SeqCst);
                return Err(PostgresLiteError::QueueClosed);
            }
            id
        };
        Ok(PendingJob { id, slot })
    }

    /// Pending plus in-flight jobs.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn state(&self) -> QueueState {
        if self.closed.load(Ordering::SeqCst) {
            QueueState::Closed
        } else if self.pending() == 0 {
            QueueState::Idle
        } else {
            QueueState::Draining
        }
    }

    /// Stop admitting jobs, wait for every admitted job to finish, then release the connection.
    ///
    /// Jobs already in flight are not aborted; a job that never completes keeps this waiting.
    ///
    /// # Errors
    /// Returns [`PostgresLiteError::QueueClosed`] if the queue was already closed, or the error
    /// SQLite reported while closing the connection.
    pub async fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Err(PostgresLiteError::QueueClosed);
        }
        tracing::info!(worker = self.worker_id, pending = self.pending(), "closing pool");

        // Dropping the last sender lets the worker exit once the queue is empty.
        drop(
            self.sender
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take(),
        );

        let finished = self
            .finished
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match finished {
            Some(rx) => rx.await.map_err(|_| {
                PostgresLiteError::ConnectionError(
                    "worker exited without acknowledging shutdown".into(),
                )
            })?,
            None => Ok(()),
        }
    }
}

impl fmt::Debug for WorkQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkQueue")
            .field("worker_id", &self.worker_id)
            .field("pending", &self.pending())
            .field("state", &self.state())
            .finish()
    }
}
