use thiserror::Error;

/// Errors raised while loading and aggregating post records
#[derive(Debug, Error)]
pub enum Error {
    /// A field could not be converted to its typed value.
    #[error("Failed to parse '{value}' in column '{column}' at row {row}: {reason}")]
    Parse {
        row: usize,
        column: String,
        value: String,
        reason: String,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Column '{0}' not found")]
    MissingColumn(String),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
