//! Public pool surfaces.
//!
//! - [`Pool`]: synchronous; every call runs on the caller's thread against the owned connection.
//! - [`AsyncPool`]: asynchronous; every call becomes a job on the pool's work queue and resolves
//!   once the worker thread has run it.

mod async_pool;
mod sync_pool;

pub use async_pool::AsyncPool;
pub use sync_pool::Pool;

use crate::results::{Record, ResultSet};
use crate::types::Value;

fn first_record(result_set: ResultSet) -> Option<Record> {
    result_set.into_records().into_iter().next()
}

fn first_value(result_set: ResultSet) -> Option<Value> {
    first_record(result_set).and_then(|record| record.into_values().into_iter().next())
}
