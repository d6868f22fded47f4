use std::io;
use thiserror::Error;

/// Errors raised while building, training, evaluating or persisting a model
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("shape mismatch: expected {expected}, found {found}")]
    ShapeMismatch { expected: usize, found: usize },
    #[error("no training data")]
    EmptyDataset,
    #[error("label {label} is outside the {classes} known classes")]
    LabelOutOfRange { label: usize, classes: usize },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("invalid model artifact: {0}")]
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

impl ModelError {
    pub(crate) fn io(context: impl Into<String>, source: io::Error) -> Self {
        ModelError::Io {
            context: context.into(),
            source,
        }
    }
}
