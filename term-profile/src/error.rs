//! Error types for feature profiling.

use thiserror::Error;

/// Result type for profiling operations.
pub type Result<T> = std::result::Result<T, ProfileError>;

/// Errors that can occur while ingesting or profiling datasets.
#[derive(Error, Debug)]
pub enum ProfileError {
    /// A column holds data that cannot be profiled as its declared feature kind.
    #[error("Invalid column data for declared type in '{column}': expected {expected}, found {found}")]
    InvalidColumnData {
        /// Name of the offending column
        column: String,
        /// What the declared feature kind requires
        expected: String,
        /// What was actually found
        found: String,
    },

    /// A resolved feature column is absent from one of the datasets.
    #[error("Column '{column}' not found in {dataset} dataset")]
    ColumnNotFound { column: String, dataset: String },

    /// Record batches do not share a schema.
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    /// DataFusion query execution error.
    #[error("Query execution failed: {0}")]
    DataFusion(#[from] datafusion::error::DataFusionError),

    /// Arrow computation error.
    #[error("Arrow computation failed: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Invalid configuration or column mapping.
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Writing formatted output failed.
    #[error("Formatting failed: {0}")]
    Format(#[from] std::fmt::Error),
}

impl ProfileError {
    /// Creates an invalid column data error.
    pub fn invalid_column_data(
        column: impl Into<String>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::InvalidColumnData {
            column: column.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Creates a column-not-found error for the named dataset side.
    pub fn column_not_found(column: impl Into<String>, dataset: impl Into<String>) -> Self {
        Self::ColumnNotFound {
            column: column.into(),
            dataset: dataset.into(),
        }
    }

    /// Creates an invalid configuration error with the given message.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
}

/// Converts serde_json errors to ProfileError.
impl From<serde_json::Error> for ProfileError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_column_data_message() {
        let err = ProfileError::invalid_column_data("age", "numeric column", "Utf8");
        assert_eq!(
            err.to_string(),
            "Invalid column data for declared type in 'age': expected numeric column, found Utf8"
        );
    }

    #[test]
    fn test_serde_error_conversion() {
        let err: ProfileError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, ProfileError::Serialization(_)));
    }
}
