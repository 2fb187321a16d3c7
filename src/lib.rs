//! asyncpg-style pools over a single embedded SQLite connection.
//!
//! Queries may use asyncpg's `$1, $2, ...` placeholders (reused and in any order) or SQLite's
//! native `?`. [`Pool`] runs statements directly on the calling thread. [`AsyncPool`] funnels
//! every call through one FIFO work queue drained by a dedicated worker thread that owns the
//! connection, so concurrent tasks never touch SQLite at the same time and statements run in
//! the order they were submitted.
//!
//! ```rust
//! use postgreslite::prelude::*;
//!
//! let pool = PostgresLite::new(":memory:")?.connect()?;
//! pool.execute("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT, old_name TEXT)", &[])?;
//! pool.execute(
//!     "INSERT INTO users (name, old_name) VALUES ($1, $1)",
//!     &args!["AlexFlipnote"],
//! )?;
//! let row = pool.fetchrow("SELECT * FROM users", &[])?.expect("one row");
//! assert_eq!(row.get("old_name"), Some(&Value::Text("AlexFlipnote".into())));
//! # Ok::<(), PostgresLiteError>(())
//! ```

pub mod error;
pub mod pool;
pub mod prelude;
pub mod results;
pub mod settings;
pub mod sqlite;
pub mod translation;
pub mod types;

pub use error::{PostgresLiteError, Result};
pub use pool::{AsyncPool, Pool};
pub use results::{Record, ResultSet};
pub use sqlite::{PendingJob, PoolOptions, PostgresLite, PostgresLiteBuilder, QueueState};
pub use translation::{PlaceholderDialect, TranslatedStatement, detect_dialect, translate};
pub use types::Value;
