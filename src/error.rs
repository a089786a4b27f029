//! Error types for the trendcast pipeline.

use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, TrendcastError>;

/// Errors that can occur while loading data, configuring a run, or
/// fitting/predicting with a trend model.
#[derive(Error, Debug)]
pub enum TrendcastError {
    /// The upload could not be parsed as tabular data.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// The upload has no header row at all.
    #[error("empty upload: no header row found")]
    EmptyUpload,

    /// A required column is absent from the header.
    #[error("missing required column '{column}'")]
    MissingColumn { column: &'static str },

    /// A date cell failed calendar-date parsing. Fatal to the whole load.
    #[error("row {row}: unparseable date '{value}'")]
    InvalidDate { row: usize, value: String },

    /// A value cell is not numeric. Fatal to the whole load.
    #[error("row {row}: unparseable value '{value}'")]
    InvalidValue { row: usize, value: String },

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Input series is empty.
    #[error("empty input data")]
    EmptyData,

    /// Insufficient data points for the operation.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Model has not been fitted yet.
    #[error("model must be fitted before prediction")]
    FitRequired,

    /// Computation error (e.g., numerical issues in the model).
    #[error("computation error: {0}")]
    ComputationError(String),

    /// Filesystem error during export.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
