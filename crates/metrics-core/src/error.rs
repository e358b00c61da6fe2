use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetricsError {
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Invalid range: {0}")]
    InvalidRange(String),

    #[error("Deserialize error: {0}")]
    Deserialize(#[from] serde_json::Error),
}

pub type MetricsResult<T> = Result<T, MetricsError>;
