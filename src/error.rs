use thiserror::Error;

/// Errors produced by counter storage and configuration.
#[derive(Error, Debug)]
pub enum CounterError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("storage error: {0}")]
    Storage(String),
}

pub type Result<T, E = CounterError> = std::result::Result<T, E>;
