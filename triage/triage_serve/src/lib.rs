//! Single-sample triage inference.
//!
//! [`InferenceService`] owns a loaded [`triage_model::ModelArtifact`] and the
//! [`triage_data::FeatureScaler`] fitted with it. It never refits anything:
//! incoming records are scaled with the stored statistics, classified, and
//! mapped from class index back to a [`triage_schema::TriageLevel`].

pub mod error;
pub mod prediction;
pub mod service;

pub use error::ServeError;
pub use prediction::TriagePrediction;
pub use service::InferenceService;
