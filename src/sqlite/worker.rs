//! Single-consumer work queue: many producers, one dedicated thread owning the connection.

mod channel;
mod dispatcher;
mod manager;

pub use channel::JobMode;
pub use manager::{PendingJob, QueueState, WorkQueue};
