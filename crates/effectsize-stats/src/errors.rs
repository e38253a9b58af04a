use thiserror::Error;

/// Errors emitted by the statistics routines and the report engine.
#[derive(Debug, Error)]
pub enum StatsError {
    #[error(transparent)]
    Table(#[from] effectsize_core::Error),
    #[error("insufficient data: {0}")]
    InsufficientData(String),
    #[error("singular model: {0}")]
    SingularModel(String),
    #[error("invalid formula: {0}")]
    Formula(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for statistics operations.
pub type Result<T> = std::result::Result<T, StatsError>;
