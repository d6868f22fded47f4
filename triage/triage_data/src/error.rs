use std::io;
use thiserror::Error;
use triage_schema::SchemaError;

/// Errors raised while generating, storing or preprocessing datasets
#[derive(Debug, Error)]
pub enum DataError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("line {line}: {source}")]
    Row {
        line: usize,
        #[source]
        source: SchemaError,
    },
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("dataset is empty")]
    EmptyDataset,
    #[error("expected {expected} values per row, found {found}")]
    ShapeMismatch { expected: usize, found: usize },
    #[error("scaler has not been fitted")]
    ScalerNotFitted,
    #[error("scaler is already fitted")]
    ScalerAlreadyFitted,
    #[error("invalid split: {0}")]
    InvalidSplit(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("invalid artifact: {0}")]
    InvalidArtifact(String),
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DataError {
    pub(crate) fn io(context: impl Into<String>, source: io::Error) -> Self {
        DataError::Io {
            context: context.into(),
            source,
        }
    }

    /// True for column-layout failures, whether raised directly or while
    /// reading a row.
    pub fn is_schema_mismatch(&self) -> bool {
        matches!(
            self,
            DataError::Schema(SchemaError::SchemaMismatch(_))
                | DataError::Row {
                    source: SchemaError::SchemaMismatch(_),
                    ..
                }
        )
    }
}
