//! Convenient imports for common functionality.

pub use crate::args;
pub use crate::error::{PostgresLiteError, Result};
pub use crate::pool::{AsyncPool, Pool};
pub use crate::results::{Record, ResultSet};
pub use crate::sqlite::{PendingJob, PoolOptions, PostgresLite, QueueState};
pub use crate::types::Value;
