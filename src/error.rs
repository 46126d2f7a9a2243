//! Error types for the spambench harness

use thiserror::Error;

/// Result type alias for spambench operations
pub type Result<T> = std::result::Result<T, SpambenchError>;

/// Main error type for the benchmark harness
#[derive(Error, Debug)]
pub enum SpambenchError {
    /// A data file row that cannot become part of a Dataset. Load-time, fatal.
    #[error("Malformed row {row}: {reason}")]
    MalformedRow { row: usize, reason: String },

    /// Bad partitioning configuration or a degenerate class. Fatal.
    #[error("Invalid split: {0}")]
    InvalidSplit(String),

    /// A fitted transform applied to data of the wrong width. Fatal.
    #[error("Column mismatch: transform fitted for {expected} features, input has {actual}")]
    ColumnMismatch { expected: usize, actual: usize },

    /// One model's grid search produced no valid fit. Recoverable at the
    /// harness boundary: the failure is reported, other models still run.
    #[error("Training failed for model '{model}': {reason}")]
    TrainingFailed { model: String, reason: String },

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Invalid parameter: {name} = {value}, {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Computation error: {0}")]
    ComputationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<csv::Error> for SpambenchError {
    fn from(err: csv::Error) -> Self {
        SpambenchError::ValidationError(err.to_string())
    }
}

impl From<serde_json::Error> for SpambenchError {
    fn from(err: serde_json::Error) -> Self {
        SpambenchError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for SpambenchError {
    fn from(err: ndarray::ShapeError) -> Self {
        SpambenchError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}
