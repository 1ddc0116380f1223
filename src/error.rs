use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("iteration count must be positive, got {0}")]
    InvalidIterations(i64),

    #[error("invalid tuning: {0}")]
    InvalidTuning(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
