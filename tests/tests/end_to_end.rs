use approx::assert_abs_diff_eq;
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;

use triage_data::{generate_record, preprocess_record};
use triage_model::{agreement_rate, evaluate, Classifier, TrainingConfig};
use triage_rules::assess;
use triage_schema::{TriageLevel, CLASS_COUNT};
use triage_serve::InferenceService;

use tests::{
    chest_pain_patient, init_logging, prepared, save_artifacts, seeded_dataset, train,
    FIXTURE_SEED,
};

#[test]
fn trained_model_reproduces_rule_labels() {
    init_logging();
    let prep = prepared(3000);
    assert_eq!(prep.train_len() + prep.test_len(), 3000);
    assert!((590..=610).contains(&prep.test_len()), "{}", prep.test_len());

    let model = train(&prep, &TrainingConfig::default());
    assert_eq!(model.history.len(), 20);
    let first = model.history.epochs[0].loss;
    let last = model.history.last().expect("epochs").loss;
    assert!(last < first, "loss did not fall: {first} -> {last}");

    let eval = evaluate(&model, &prep.test_features, &prep.test_labels).unwrap();
    assert!(eval.loss.is_finite());
    let predicted = model.predict_classes(&prep.test_features).unwrap();
    let agreement = agreement_rate(&predicted, &prep.test_labels).unwrap();
    assert_abs_diff_eq!(agreement, eval.accuracy, epsilon = 1e-12);

    let mut counts = [0usize; CLASS_COUNT];
    for &label in &prep.test_labels {
        counts[label] += 1;
    }
    let majority = counts.iter().copied().max().unwrap_or(0) as f64 / prep.test_len() as f64;
    assert!(
        agreement > majority + 0.1,
        "agreement {agreement} is not well above the majority-class rate {majority}"
    );

    // Fresh raw records through the inference path, scored against the rules
    let mut rng = StdRng::seed_from_u64(FIXTURE_SEED + 1);
    let fresh: Vec<_> = (0..500).map(|_| generate_record(&mut rng, 0.3)).collect();
    let mut agree = 0;
    for record in &fresh {
        let features = preprocess_record(&prep.scaler, record).unwrap();
        let level = TriageLevel::from_class_index(model.predict_class(&features).unwrap()).unwrap();
        if level == assess(record).level {
            agree += 1;
        }
    }
    let fresh_agreement = agree as f64 / fresh.len() as f64;
    assert!(
        fresh_agreement > majority + 0.1,
        "agreement on fresh records {fresh_agreement}, majority rate {majority}"
    );
}

#[test]
fn saved_artifacts_serve_identical_predictions() {
    init_logging();
    let prep = prepared(800);
    let cfg = TrainingConfig {
        epochs: 3,
        hidden_layers: vec![32, 16],
        ..Default::default()
    };
    let model = train(&prep, &cfg);

    let tmp = tempfile::tempdir().expect("tmpdir");
    let (model_path, scaler_path) = save_artifacts(tmp.path(), &model, &prep).unwrap();
    let service = InferenceService::load(&model_path, &scaler_path).unwrap();
    assert_eq!(service.model().metadata.epochs_trained, 3);

    let patient = chest_pain_patient();
    let served = service.predict_triage(&patient).unwrap();
    assert_eq!(served.probabilities.len(), CLASS_COUNT);
    assert_abs_diff_eq!(served.probabilities.iter().sum::<f64>(), 1.0, epsilon = 1e-9);

    let features = preprocess_record(&prep.scaler, &patient).unwrap();
    assert_eq!(served.probabilities, model.predict_proba(&features).unwrap());

    let reloaded = InferenceService::load(&model_path, &scaler_path).unwrap();
    assert_eq!(reloaded.predict_triage(&patient).unwrap(), served);
}

#[test]
fn every_generated_label_matches_the_rule_engine() {
    let dataset = seeded_dataset(1000);
    for row in dataset.iter() {
        assert_eq!(row.level, assess(&row.record).level);
    }
    assert!(dataset.level_counts().iter().all(|&c| c > 0));

    let reference = assess(&chest_pain_patient());
    assert_eq!(reference.score, 4);
    assert_eq!(reference.level, TriageLevel::Emergent);
}
