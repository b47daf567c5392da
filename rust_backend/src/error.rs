//! Error types for loading, validating and combining sources.

use polars::prelude::PolarsError;

/// Result type for combination operations
pub type CombineResult<T> = Result<T, CombineError>;

/// Error type for combination operations.
///
/// Every variant is terminal for the current combination attempt and is meant
/// to be shown to the user as-is. None of them invalidates the session.
#[derive(Debug, thiserror::Error)]
pub enum CombineError {
    #[error("Unsupported file format for '{file_name}': '{extension}' (expected csv, xlsx or xls)")]
    UnsupportedFormat {
        file_name: String,
        extension: String,
    },

    #[error("Failed to parse '{source_name}': {message}")]
    Parse {
        source_name: String,
        message: String,
    },

    #[error("'{source_name}' is missing required column '{column}'")]
    MissingRequiredColumn { source_name: String, column: String },

    #[error("'{source_name}' has columns outside the expected schema: {}", columns.join(", "))]
    UnexpectedColumns {
        source_name: String,
        columns: Vec<String>,
    },

    #[error("'{source_name}' does not contain the key column '{key_column}'")]
    MissingKeyColumn {
        source_name: String,
        key_column: String,
    },

    #[error("Too many sources: {provided} files uploaded, at most {max} allowed")]
    TooManySources { provided: usize, max: usize },

    #[error("Not enough sources: {provided} files uploaded, at least {min} required")]
    NotEnoughSources { provided: usize, min: usize },

    #[error("Source '{0}' was uploaded more than once")]
    DuplicateSourceName(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Data frame error: {0}")]
    Polars(#[from] PolarsError),
}

impl CombineError {
    pub(crate) fn parse(source_name: impl Into<String>, message: impl ToString) -> Self {
        CombineError::Parse {
            source_name: source_name.into(),
            message: message.to_string(),
        }
    }
}
