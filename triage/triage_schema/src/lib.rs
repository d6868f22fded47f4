//! Feature schema for the synthetic triage pipeline.
//!
//! Every stage of the pipeline (generation, the CSV dataset, preprocessing,
//! training and inference) agrees on one ordered list of fifteen input
//! columns: five vitals followed by ten symptom flags. [`FeatureSchema`]
//! makes that order an explicit, checkable contract so a reordered or
//! truncated column list fails with [`SchemaError::SchemaMismatch`] instead
//! of silently misaligning features.
//!
//! ```
//! use triage_schema::{FeatureSchema, PatientRecord, Symptom, FEATURE_COLUMNS};
//!
//! let record = PatientRecord::nominal().with_symptom(Symptom::ChestPain);
//! let features = record.feature_vector();
//! assert_eq!(features.len(), FEATURE_COLUMNS.len());
//!
//! let schema = FeatureSchema::standard();
//! assert!(schema.verify(&FEATURE_COLUMNS).is_ok());
//! assert!(schema.verify(&["heart_rate", "age"]).is_err());
//! ```

pub mod error;
pub mod level;
pub mod record;
pub mod schema;

pub use error::SchemaError;
pub use level::{presentation_label, TriageLevel, CLASS_COUNT};
pub use record::{PatientRecord, Symptoms};
pub use schema::{
    dataset_header, ColumnDiff, FeatureSchema, Symptom, Vital, VitalDomain, FEATURE_COLUMNS,
    FEATURE_COUNT, LABEL_COLUMN, NUMERIC_FEATURES, SYMPTOM_FEATURES,
};
