use minhash::MinHashError;
use thiserror::Error;

/// Errors raised by [`crate::MinHashEncoder`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncoderError {
    #[error(transparent)]
    Config(#[from] MinHashError),

    #[error(
        "invalid config: unknown handle_missing {value:?}; expected one of \"error\", \"zero_impute\""
    )]
    UnknownMissingPolicy { value: String },

    #[error("invalid config: n_jobs must be a positive integer, -1 or \"all\" (got {value})")]
    InvalidJobs { value: String },

    #[error("invalid config: batch_per_job must be >= 1 (got {batch_per_job})")]
    InvalidBatchPerJob { batch_per_job: usize },

    #[error("invalid config: cache_capacity must be >= 1 (got {capacity})")]
    InvalidCacheCapacity { capacity: usize },

    #[error("failed to build worker pool: {0}")]
    ThreadPool(String),

    #[error(
        "found missing values in input data (first at row {row}, column {column}); set handle_missing=zero_impute to encode them"
    )]
    MissingValues { column: usize, row: usize },

    #[error("value is missing; set handle_missing=zero_impute to encode it")]
    MissingValue,

    #[error("input is not rectangular: row {row} has {found} cells, expected {expected}")]
    InputShape {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("input is not rectangular: column {column} has {found} rows, expected {expected}")]
    ColumnLength {
        column: usize,
        expected: usize,
        found: usize,
    },

    #[error("expected {expected} column names, got {found}")]
    FeatureNames { expected: usize, found: usize },
}
