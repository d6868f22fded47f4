use std::path::Path;

use triage_data::{preprocess_record, DataError, FeatureScaler};
use triage_model::{argmax, Classifier, ModelArtifact};
use triage_schema::{FeatureSchema, PatientRecord, TriageLevel, CLASS_COUNT, NUMERIC_FEATURES};

use crate::error::ServeError;
use crate::prediction::TriagePrediction;

/// Read-only pairing of a trained model with the scaler fitted alongside it.
///
/// Construction checks that both artifacts agree with the standard feature
/// schema; after that every prediction goes through the same
/// scale-then-classify path the model was evaluated with.
#[derive(Debug, Clone)]
pub struct InferenceService {
    model: ModelArtifact,
    scaler: FeatureScaler,
}

impl InferenceService {
    pub fn new(model: ModelArtifact, scaler: FeatureScaler) -> Result<Self, ServeError> {
        FeatureSchema::standard().verify(&model.metadata.feature_columns)?;
        if model.class_count() != CLASS_COUNT {
            return Err(ServeError::IncompatibleModel(format!(
                "model predicts {} classes, triage has {CLASS_COUNT}",
                model.class_count()
            )));
        }
        if !scaler.is_fitted() {
            return Err(DataError::ScalerNotFitted.into());
        }
        FeatureSchema::from_columns(&NUMERIC_FEATURES).verify(scaler.columns())?;
        Ok(Self { model, scaler })
    }

    pub fn load(
        model_path: impl AsRef<Path>,
        scaler_path: impl AsRef<Path>,
    ) -> Result<Self, ServeError> {
        let model = ModelArtifact::load(model_path)?;
        let scaler = FeatureScaler::load(scaler_path)?;
        let service = Self::new(model, scaler)?;
        log::info!(
            "inference service ready: model {} v{}",
            service.model.metadata.name,
            service.model.metadata.version
        );
        Ok(service)
    }

    pub fn model(&self) -> &ModelArtifact {
        &self.model
    }

    pub fn scaler(&self) -> &FeatureScaler {
        &self.scaler
    }

    pub fn predict_triage(&self, record: &PatientRecord) -> Result<TriagePrediction, ServeError> {
        if let Err(e) = record.validate() {
            log::warn!("input outside the training domain: {e}");
        }
        let features = preprocess_record(&self.scaler, record)?;
        let probabilities = self.model.predict_proba(&features)?;
        let class_index = argmax(&probabilities);
        let level = TriageLevel::from_class_index(class_index)?;
        log::debug!("probabilities {probabilities:?} -> class {class_index}");
        Ok(TriagePrediction {
            probabilities,
            class_index,
            level,
            label: level.presentation_label(),
        })
    }

    /// Predicts from a raw row whose columns are named explicitly.
    pub fn predict_named<S: AsRef<str>>(
        &self,
        columns: &[S],
        values: &[f64],
    ) -> Result<TriagePrediction, ServeError> {
        let record = PatientRecord::from_named(columns, values)?;
        self.predict_triage(&record)
    }

    pub fn predict_batch<'a>(
        &self,
        records: impl IntoIterator<Item = &'a PatientRecord>,
    ) -> Result<Vec<TriagePrediction>, ServeError> {
        records
            .into_iter()
            .map(|r| self.predict_triage(r))
            .collect()
    }
}
