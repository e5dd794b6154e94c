//! Error types for temporal feature computation

use thiserror::Error;

/// Result type alias for feature operations
pub type Result<T> = std::result::Result<T, FeatureError>;

/// Main error type for feature computation
#[derive(Error, Debug)]
pub enum FeatureError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Feature not found: {0}")]
    FeatureNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid parameter: {name} = {value}, {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    /// A categorical column has more distinct values than the encoder accepts.
    #[error("Column '{column}' has {found} categories, at most {limit} are allowed")]
    CardinalityExceeded {
        column: String,
        found: usize,
        limit: usize,
    },

    /// An outcome code outside {0, 1, 2} in a sequential pass.
    #[error("Invalid outcome at row {row}: {value} (expected 0, 1 or 2)")]
    InvalidOutcome { row: usize, value: String },

    #[error("Column '{column}' contains {count} missing values")]
    MissingValues { column: String, count: usize },

    /// A resampled group produced no checkpoints.
    #[error("Group {group} produced no checkpoints")]
    EmptySegment { group: String },
}

impl FeatureError {
    pub(crate) fn invalid_parameter(
        name: &str,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        FeatureError::InvalidParameter {
            name: name.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<polars::error::PolarsError> for FeatureError {
    fn from(err: polars::error::PolarsError) -> Self {
        FeatureError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for FeatureError {
    fn from(err: serde_json::Error) -> Self {
        FeatureError::SerializationError(err.to_string())
    }
}
