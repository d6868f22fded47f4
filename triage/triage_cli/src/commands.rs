use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use triage_data::{
    fit_pipeline, load_dataset, save_dataset, DataError, DatasetSummary, PreparedData,
};
use triage_model::{
    agreement_rate, evaluate, train_classifier, Classifier, ConfusionMatrix, Evaluation,
    ModelArtifact, ModelError, ModelMetadata, TrainingHistory,
};
use triage_rules::{assess, TriageAssessment};
use triage_schema::{FeatureSchema, PatientRecord, SchemaError, Symptom, CLASS_COUNT};
use triage_serve::{InferenceService, ServeError, TriagePrediction};

use crate::config::{config_template, ConfigError, PipelineConfig};

pub const MODEL_NAME: &str = "triage_mlp";

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Data(#[from] DataError),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Serve(#[from] ServeError),
    #[error("invalid record: {0}")]
    Schema(#[from] SchemaError),
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid record: {0}")]
    Record(#[from] serde_json::Error),
    #[error("{0}")]
    InvalidInput(String),
}

impl CliError {
    /// 2 for bad input or configuration, 1 for pipeline failures
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(_)
            | CliError::Record(_)
            | CliError::Schema(_)
            | CliError::InvalidInput(_) => 2,
            _ => 1,
        }
    }
}

/// 65-year-old with chest pain and fatigue, tachycardic and hypertensive
pub fn sample_patient() -> PatientRecord {
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

/// Reads a JSON object keyed by the fifteen feature columns. Missing or
/// unknown keys are a schema mismatch.
pub fn read_record(path: &Path) -> Result<PatientRecord, CliError> {
    let text = fs::read_to_string(path).map_err(|source| CliError::Io {
        context: format!("reading {}", path.display()),
        source,
    })?;
    let fields: serde_json::Map<String, serde_json::Value> = serde_json::from_str(&text)?;
    FeatureSchema::standard().verify_names(fields.keys())?;
    Ok(serde_json::from_value(serde_json::Value::Object(fields))?)
}

/// Generates a dataset per `[generation]` and writes it to the dataset path.
pub fn generate(config: &PipelineConfig) -> Result<DatasetSummary, CliError> {
    let dataset = config.generation.generate()?;
    save_dataset(&dataset, &config.artifacts.dataset)?;
    Ok(dataset.summary())
}

pub fn summarize(path: &Path) -> Result<DatasetSummary, CliError> {
    Ok(load_dataset(path)?.summary())
}

#[derive(Debug, Clone)]
pub struct TrainReport {
    pub train_rows: usize,
    pub test_rows: usize,
    pub history: TrainingHistory,
    pub evaluation: Evaluation,
    pub rule_agreement: f64,
    pub confusion: ConfusionMatrix,
    pub model_path: PathBuf,
    pub scaler_path: PathBuf,
}

impl fmt::Display for TrainReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "trained on {} rows, tested on {}",
            self.train_rows, self.test_rows
        )?;
        for epoch in &self.history.epochs {
            writeln!(f, "  {epoch}")?;
        }
        writeln!(f, "test {}", self.evaluation)?;
        writeln!(
            f,
            "agreement with rule engine: {:.1}%",
            self.rule_agreement * 100.0
        )?;
        writeln!(f, "confusion matrix (class index = level - 1):")?;
        writeln!(f, "{}", self.confusion)?;
        writeln!(f, "model saved to {}", self.model_path.display())?;
        write!(f, "scaler saved to {}", self.scaler_path.display())
    }
}

/// Loads the dataset, fits the pipeline, trains, evaluates and saves both
/// artifacts.
pub fn train(config: &PipelineConfig) -> Result<TrainReport, CliError> {
    let dataset = load_dataset(&config.artifacts.dataset)?;
    let prepared = fit_pipeline(&dataset, &config.split)?;
    train_prepared(config, &prepared)
}

pub fn train_prepared(
    config: &PipelineConfig,
    prepared: &PreparedData,
) -> Result<TrainReport, CliError> {
    let model = train_classifier(
        &prepared.train_features,
        &prepared.train_labels,
        &config.training,
    )?;
    let evaluation = evaluate(&model, &prepared.test_features, &prepared.test_labels)?;
    let predicted = model.predict_classes(&prepared.test_features)?;
    let confusion =
        ConfusionMatrix::from_predictions(&prepared.test_labels, &predicted, CLASS_COUNT)?;
    let rule_agreement = agreement_rate(&predicted, &prepared.test_labels)?;

    let metadata = ModelMetadata::new(MODEL_NAME, model.network.architecture(), CLASS_COUNT)
        .with_feature_columns(prepared.schema.columns())
        .with_epochs(model.history.len())
        .with_evaluation(evaluation)
        .with_description("Synthetic triage classifier trained on rule-engine labels")
        .with_tag("seed", config.training.seed.to_string());
    let artifact = ModelArtifact::new(metadata, model.network.clone())?;
    artifact.save(&config.artifacts.model)?;
    prepared.scaler.save(&config.artifacts.scaler)?;

    Ok(TrainReport {
        train_rows: prepared.train_len(),
        test_rows: prepared.test_len(),
        history: model.history,
        evaluation,
        rule_agreement,
        confusion,
        model_path: config.artifacts.model.clone(),
        scaler_path: config.artifacts.scaler.clone(),
    })
}

/// Model prediction next to the rule engine's reference assessment
#[derive(Debug, Clone, Serialize)]
pub struct PredictReport {
    pub record: PatientRecord,
    pub prediction: TriagePrediction,
    pub reference: TriageAssessment,
}

impl fmt::Display for PredictReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "probabilities:")?;
        for (i, p) in self.prediction.probabilities.iter().enumerate() {
            writeln!(f, "  level {}: {:.4}", i + 1, p)?;
        }
        writeln!(f, "predicted class: {}", self.prediction.class_index)?;
        writeln!(f, "predicted triage: {}", self.prediction.label)?;
        write!(f, "rule engine: {}", self.reference)
    }
}

pub fn predict(
    model_path: &Path,
    scaler_path: &Path,
    record: PatientRecord,
) -> Result<PredictReport, CliError> {
    let service = InferenceService::load(model_path, scaler_path)?;
    let prediction = service.predict_triage(&record)?;
    Ok(PredictReport {
        record,
        prediction,
        reference: assess(&record),
    })
}

/// Generate, train and predict the sample patient in one go.
pub fn run(config: &PipelineConfig) -> Result<(DatasetSummary, TrainReport, PredictReport), CliError> {
    let summary = generate(config)?;
    let report = train(config)?;
    let prediction = predict(
        &config.artifacts.model,
        &config.artifacts.scaler,
        sample_patient(),
    )?;
    Ok((summary, report, prediction))
}

/// Writes the config template, refusing to clobber an existing file.
pub fn init_config(path: &Path, force: bool) -> Result<(), CliError> {
    if path.exists() && !force {
        return Err(CliError::InvalidInput(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }
    fs::write(path, config_template()).map_err(|source| CliError::Io {
        context: format!("writing {}", path.display()),
        source,
    })?;
    log::info!("wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ArtifactPaths;
    use triage_schema::TriageLevel;

    fn quick_config(dir: &Path) -> PipelineConfig {
        let mut cfg = PipelineConfig::default();
        cfg.generation.records = 300;
        cfg.generation.seed = Some(1);
        cfg.training.epochs = 2;
        cfg.training.hidden_layers = vec![16];
        cfg.artifacts = ArtifactPaths::in_dir(dir);
        cfg
    }

    #[test]
    fn sample_patient_is_emergent_by_rules() {
        let a = assess(&sample_patient());
        assert_eq!(a.score, 4);
        assert_eq!(a.level, TriageLevel::Emergent);
    }

    #[test]
    fn generate_train_predict() {
        let tmp = tempfile::tempdir().expect("tmpdir");
        let cfg = quick_config(tmp.path());
        let (summary, report, prediction) = run(&cfg).expect("run");
        assert_eq!(summary.records, 300);
        assert_eq!(report.train_rows + report.test_rows, 300);
        assert_eq!(report.history.len(), 2);
        assert!(cfg.artifacts.model.is_file());
        assert!(cfg.artifacts.scaler.is_file());
        assert_eq!(prediction.reference.level, TriageLevel::Emergent);
        assert!(report.to_string().contains("confusion matrix"));
        assert!(prediction.to_string().contains("predicted triage"));
    }

    #[test]
    fn predict_without_artifacts_is_pipeline_error() {
        let tmp = tempfile::tempdir().expect("tmpdir");
        let err = predict(
            &tmp.path().join("m.json"),
            &tmp.path().join("s.json"),
            sample_patient(),
        )
        .unwrap_err();
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn init_config_does_not_clobber() {
        let tmp = tempfile::tempdir().expect("tmpdir");
        let path = tmp.path().join("triage.toml");
        init_config(&path, false).expect("first write");
        let err = init_config(&path, false).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        init_config(&path, true).expect("forced");
        PipelineConfig::load(&path).expect("template loads");
    }

    #[test]
    fn record_json_errors_are_input_errors() {
        let tmp = tempfile::tempdir().expect("tmpdir");
        let path = tmp.path().join("r.json");
        fs::write(&path, r#"{"age": 30}"#).expect("write");
        let err = read_record(&path).unwrap_err();
        assert_eq!(err.exit_code(), 2);

        fs::write(&path, "[1, 2]").expect("write");
        assert!(matches!(read_record(&path), Err(CliError::Record(_))));
    }

    #[test]
    fn record_json_round_trips_through_file() {
        let tmp = tempfile::tempdir().expect("tmpdir");
        let path = tmp.path().join("patient.json");
        fs::write(&path, serde_json::to_string(&sample_patient()).expect("json")).expect("write");
        assert_eq!(read_record(&path).expect("read"), sample_patient());
    }

    #[test]
    fn record_with_missing_or_misspelled_flag_is_schema_mismatch() {
        let tmp = tempfile::tempdir().expect("tmpdir");
        let path = tmp.path().join("patient.json");
        let mut fields = serde_json::to_value(sample_patient()).expect("json");
        let map = fields.as_object_mut().expect("object");
        map.remove("shortness_of_breath");
        fs::write(&path, fields.to_string()).expect("write");
        let err = read_record(&path).unwrap_err();
        match &err {
            CliError::Schema(SchemaError::SchemaMismatch(diff)) => {
                assert_eq!(diff.missing(), vec!["shortness_of_breath"]);
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(err.exit_code(), 2);

        let map = fields.as_object_mut().expect("object");
        map.insert("shortnes_of_breath".into(), 1.into());
        map.insert("triage_level".into(), 1.into());
        fs::write(&path, fields.to_string()).expect("write");
        match read_record(&path).unwrap_err() {
            CliError::Schema(SchemaError::SchemaMismatch(diff)) => {
                assert_eq!(diff.missing(), vec!["shortness_of_breath"]);
                assert_eq!(diff.unexpected().len(), 2);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}
