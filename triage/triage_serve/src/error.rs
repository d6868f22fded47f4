use thiserror::Error;
use triage_data::DataError;
use triage_model::ModelError;
use triage_schema::SchemaError;

#[derive(Debug, Error)]
pub enum ServeError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Data(#[from] DataError),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("incompatible model: {0}")]
    IncompatibleModel(String),
}

impl ServeError {
    pub fn is_schema_mismatch(&self) -> bool {
        match self {
            ServeError::Schema(SchemaError::SchemaMismatch(_)) => true,
            ServeError::Data(e) => e.is_schema_mismatch(),
            _ => false,
        }
    }
}
