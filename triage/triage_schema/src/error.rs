use thiserror::Error;

use crate::schema::ColumnDiff;

/// Errors raised when data does not fit the triage feature schema
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    #[error("schema mismatch: {0}")]
    SchemaMismatch(ColumnDiff),
    #[error("triage label {0} is outside the range 1-5")]
    LabelOutOfRange(i64),
    #[error("{column} = {value} is outside the allowed range {min}..={max}")]
    ValueOutOfRange {
        column: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("symptom flag {column} must be 0 or 1, found {value}")]
    InvalidFlag { column: &'static str, value: f64 },
}
