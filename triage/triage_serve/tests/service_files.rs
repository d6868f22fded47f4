use rand::{rngs::StdRng, SeedableRng};
use triage_data::{fit_pipeline, generate_dataset, SplitConfig};
use triage_model::{train_classifier, ModelArtifact, ModelMetadata, TrainingConfig};
use triage_schema::{PatientRecord, CLASS_COUNT};
use triage_serve::{InferenceService, ServeError};

fn write_artifacts(dir: &std::path::Path) -> (std::path::PathBuf, std::path::PathBuf) {
    let mut rng = StdRng::seed_from_u64(8);
    let dataset = generate_dataset(400, &mut rng).expect("generate");
    let prepared = fit_pipeline(&dataset, &SplitConfig::default()).expect("prepare");
    let config = TrainingConfig {
        epochs: 2,
        hidden_layers: vec![32, 16],
        ..Default::default()
    };
    let model =
        train_classifier(&prepared.train_features, &prepared.train_labels, &config).expect("train");
    let metadata = ModelMetadata::new("triage", model.network.architecture(), CLASS_COUNT);
    let artifact = ModelArtifact::new(metadata, model.network).expect("artifact");

    let model_path = dir.join("triage_model.json");
    let scaler_path = dir.join("scaler.json");
    artifact.save(&model_path).expect("save model");
    prepared.scaler.save(&scaler_path).expect("save scaler");
    (model_path, scaler_path)
}

#[test]
fn loads_saved_artifacts_and_predicts() {
    let _ = env_logger::builder().is_test(true).try_init();
    let tmp = tempfile::tempdir().expect("tmpdir");
    let (model_path, scaler_path) = write_artifacts(tmp.path());

    let service = InferenceService::load(&model_path, &scaler_path).expect("load");
    let prediction = service
        .predict_triage(&PatientRecord::nominal())
        .expect("predict");
    let total: f64 = prediction.probabilities.iter().sum();
    assert!((total - 1.0).abs() < 1e-9);

    let json = serde_json::to_value(&prediction).expect("json");
    assert_eq!(json["level"], prediction.level.raw());
    assert_eq!(json["label"], prediction.label);
}

#[test]
fn reloading_gives_identical_predictions() {
    let tmp = tempfile::tempdir().expect("tmpdir");
    let (model_path, scaler_path) = write_artifacts(tmp.path());
    let a = InferenceService::load(&model_path, &scaler_path).expect("first load");
    let b = InferenceService::load(&model_path, &scaler_path).expect("second load");
    let record = PatientRecord::nominal();
    assert_eq!(
        a.predict_triage(&record).expect("a"),
        b.predict_triage(&record).expect("b")
    );
}

#[test]
fn swapped_artifact_paths_fail_to_load() {
    let tmp = tempfile::tempdir().expect("tmpdir");
    let (model_path, scaler_path) = write_artifacts(tmp.path());
    let err = InferenceService::load(&scaler_path, &model_path).unwrap_err();
    assert!(matches!(err, ServeError::Model(_)));
}
