//! Shared fixtures for the end-to-end tests under `tests/`.

use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::SeedableRng;

use triage_data::{fit_pipeline, generate_dataset, Dataset, PreparedData, SplitConfig};
use triage_model::{train_classifier, ModelArtifact, ModelMetadata, TrainedModel, TrainingConfig};
use triage_schema::{PatientRecord, Symptom, CLASS_COUNT};
use triage_serve::ServeError;

pub const FIXTURE_SEED: u64 = 2024;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn seeded_dataset(records: usize) -> Dataset {
    let mut rng = StdRng::seed_from_u64(FIXTURE_SEED);
    generate_dataset(records, &mut rng).expect("records > 0")
}

pub fn prepared(records: usize) -> PreparedData {
    fit_pipeline(&seeded_dataset(records), &SplitConfig::default()).expect("fit pipeline")
}

pub fn train(prepared: &PreparedData, config: &TrainingConfig) -> TrainedModel {
    train_classifier(&prepared.train_features, &prepared.train_labels, config).expect("train")
}

/// Saves model and scaler under `dir`, returning their paths.
pub fn save_artifacts(
    dir: &Path,
    model: &TrainedModel,
    prepared: &PreparedData,
) -> Result<(PathBuf, PathBuf), ServeError> {
    let meta = ModelMetadata::new("triage_mlp", model.network.architecture(), CLASS_COUNT)
        .with_feature_columns(prepared.schema.columns())
        .with_epochs(model.history.len());
    let artifact = ModelArtifact::new(meta, model.network.clone())?;
    let model_path = dir.join("triage_model.json");
    let scaler_path = dir.join("scaler.json");
    artifact.save(&model_path)?;
    prepared.scaler.save(&scaler_path)?;
    Ok((model_path, scaler_path))
}

pub fn chest_pain_patient() -> PatientRecord {
    PatientRecord {
        age: 65,
        heart_rate: 120,
        systolic_bp: 160,
        temperature: 37.1,
        oxygen_saturation: 95,
        symptoms: Default::default(),
    }
    .with_symptom(Symptom::ChestPain)
    .with_symptom(Symptom::Fatigue)
}
