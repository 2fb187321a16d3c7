use tokio::sync::mpsc;
use tokio::sync::oneshot;

use crate::error::Result;
use crate::results::ResultSet;
use crate::types::Value;

/// How the worker should run a job's query text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobMode {
    /// One statement with bound arguments.
    Statement,
    /// A multi-statement script run inside one transaction; arguments are ignored.
    Batch,
}

pub(super) type ResultSlot = oneshot::Sender<Result<ResultSet>>;

pub(super) struct Job {
    pub(super) id: u64,
    pub(super) query: String,
    pub(super) args: Vec<Value>,
    pub(super) mode: JobMode,
    pub(super) respond_to: ResultSlot,
}

/// Sending half of the work queue.
#[derive(Clone)]
pub(super) enum QueueSender {
    Unbounded(mpsc::UnboundedSender<Job>),
    Bounded(mpsc::Sender<Job>),
}

impl QueueSender {
    /// Wait for room at the tail of the queue. Only a bounded queue ever suspends here; dropping
    /// the future before it resolves leaves the queue untouched.
    /// `None` once the worker is gone.
    pub(super) async fn reserve(&self) -> Option<QueuePermit<'_>> {
        match self {
            QueueSender::Unbounded(tx) => (!tx.is_closed()).then_some(QueuePermit::Unbounded(tx)),
            QueueSender::Bounded(tx) => tx.reserve().await.ok().map(QueuePermit::Bounded),
        }
    }
}

/// A reserved place in the queue; sending through it never suspends.
pub(super) enum QueuePermit<'a> {
    Unbounded(&'a mpsc::UnboundedSender<Job>),
    Bounded(mpsc::Permit<'a, Job>),
}

impl QueuePermit<'_> {
    /// Append `job` to the tail of the queue. Hands the job back if the worker is gone.
    pub(super) fn send(self, job: Job) -> Result<(), Job> {
        match self {
            QueuePermit::Unbounded(tx) => tx.send(job).map_err(|err| err.0),
            QueuePermit::Bounded(permit) => {
                permit.send(job);
                Ok(())
            }
        }
    }
}

/// Receiving half of the work queue, drained by the worker thread.
pub(super) enum QueueReceiver {
    Unbounded(mpsc::UnboundedReceiver<Job>),
    Bounded(mpsc::Receiver<Job>),
}

impl QueueReceiver {
    /// Park the worker thread until the next job arrives; `None` once every sender is gone and
    /// the queue is empty.
    pub(super) fn blocking_recv(&mut self) -> Option<Job> {
        match self {
            QueueReceiver::Unbounded(rx) => rx.blocking_recv(),
            QueueReceiver::Bounded(rx) => rx.blocking_recv(),
        }
    }
}

pub(super) fn queue(capacity: Option<usize>) -> (QueueSender, QueueReceiver) {
    match capacity {
        Some(cap) => {
            let (tx, rx) = mpsc::channel(cap);
            (QueueSender::Bounded(tx), QueueReceiver::Bounded(rx))
        }
        None => {
            let (tx, rx) = mpsc::unbounded_channel();
            (QueueSender::Unbounded(tx), QueueReceiver::Unbounded(rx))
        }
    }
}
