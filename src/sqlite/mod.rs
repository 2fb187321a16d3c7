// SQLite module - everything that touches the rusqlite connection
//
// - config: options, validation, and opening connections
// - params: binding `Value`s as statement parameters
// - query: running a statement and buffering its result
// - executor: translation plus execution entry points shared by both pools
// - worker: the single-consumer work queue behind `AsyncPool`

pub mod config;
pub mod executor;
pub mod params;
pub mod query;
pub mod worker;

pub use config::{DB_EXTENSION, MEMORY_MARKER, PoolOptions, PostgresLite, PostgresLiteBuilder};
pub use executor::{execute_batch, run_statement};
pub use query::{build_result_set, statement_verb};
pub use worker::{PendingJob, QueueState};
