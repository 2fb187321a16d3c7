use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use rusqlite::Connection;
use tokio::sync::oneshot;

use crate::error::{PostgresLiteError, Result};
use crate::results::ResultSet;
use crate::sqlite::executor::{execute_batch, run_statement};
use crate::sqlite::query::statement_verb;
use crate::types::Value;

use super::channel::{Job, JobMode, QueueReceiver};

pub(super) struct WorkerContext {
    pub(super) conn: Connection,
    pub(super) receiver: QueueReceiver,
    pub(super) pending: Arc<AtomicUsize>,
    pub(super) translate: bool,
    pub(super) finished: oneshot::Sender<Result<()>>,
}

/// Worker loop: pop the head job, run it, resolve its slot, repeat until every sender is gone.
/// Then close the connection and report how that went.
pub(super) fn run_worker(ctx: WorkerContext) {
    let WorkerContext {
        conn,
        mut receiver,
        pending,
        translate,
        finished,
    } = ctx;

    while let Some(job) = receiver.blocking_recv() {
        let Job {
            id,
            query,
            args,
            mode,
            respond_to,
        } = job;

        tracing::debug!(job = id, verb = %statement_verb(&query), "executing job");
        let outcome = run_job_isolated(&conn, &query, &args, mode, translate);
        if let Err(err) = &outcome {
            tracing::debug!(job = id, error = %err, "job failed");
        }

        pending.fetch_sub(1, Ordering::SeqCst);
        if respond_to.send(outcome).is_err() {
            tracing::debug!(job = id, "caller stopped waiting; dropping result");
        }
    }

    let closed = conn.close().map_err(|(_, err)| PostgresLiteError::from(err));
    match &closed {
        Ok(()) => tracing::info!("worker drained queue and closed connection"),
        Err(err) => tracing::warn!(error = %err, "closing connection failed"),
    }
    let _ = finished.send(closed);
}

/// Run one job, turning a panic into an error for that job's slot so the loop keeps going.
fn run_job_isolated(
    conn: &Connection,
    query: &str,
    args: &[Value],
    mode: JobMode,
    translate: bool,
) -> Result<ResultSet> {
    panic::catch_unwind(AssertUnwindSafe(|| run_job(conn, query, args, mode, translate)))
        .unwrap_or_else(|payload| {
            let message = panic_message(payload.as_ref());
            tracing::error!(panic = %message, "job panicked on worker");
            Err(PostgresLiteError::WorkerPanic(message))
        })
}

fn run_job(
    conn: &Connection,
    query: &str,
    args: &[Value],
    mode: JobMode,
    translate: bool,
) -> Result<ResultSet> {
    match mode {
        JobMode::Statement => run_statement(conn, query, args, translate),
        JobMode::Batch => {
            execute_batch(conn, query)?;
            Ok(ResultSet::new(statement_verb(query), Arc::default()))
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload_of(f: impl FnOnce() + panic::UnwindSafe) -> Box<dyn Any + Send> {
        match panic::catch_unwind(f) {
            Ok(()) => Box::new("no panic"),
            Err(payload) => payload,
        }
    }

    #[test]
    fn panic_payloads_become_messages() {
        let payload = payload_of(|| panic!("boom {}", 1));
        assert_eq!(panic_message(payload.as_ref()), "boom 1");
        let payload = payload_of(|| panic!("static"));
        assert_eq!(panic_message(payload.as_ref()), "static");
    }

    #[test]
    fn failing_jobs_resolve_with_their_error() {
        crate::settings::init();
        let conn = Connection::open_in_memory().unwrap();
        let err = run_job_isolated(&conn, "SELECT * FROM missing", &[], JobMode::Statement, true)
            .unwrap_err();
        assert!(matches!(err, PostgresLiteError::StorageEngineError(_)));

        let rs = run_job_isolated(
            &conn,
            "CREATE TABLE t (x INTEGER); INSERT INTO t VALUES (1);",
            &[],
            JobMode::Batch,
            true,
        )
        .unwrap();
        assert_eq!(rs.status(), "CREATE 0");
    }
}
