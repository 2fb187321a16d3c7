use thiserror::Error;

#[derive(Debug, Error)]
pub enum PostgresLiteError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error(transparent)]
    StorageEngineError(#[from] rusqlite::Error),

    #[error("Pool is closed; no further jobs are accepted")]
    QueueClosed,

    #[error("Parameter error: {0}")]
    ParameterError(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Worker panicked while executing job: {0}")]
    WorkerPanic(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),
}

pub type Result<T, E = PostgresLiteError> = std::result::Result<T, E>;
