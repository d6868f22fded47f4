//! Synthetic patient generation.
//!
//! Vitals are drawn uniformly from their schema domains and each symptom is
//! an independent Bernoulli trial. Labels are not sampled: every record is
//! ground-truthed by the rule engine, so the dataset encodes exactly the
//! function the classifier is later asked to approximate.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use triage_schema::{PatientRecord, Symptom, Symptoms};

use crate::dataset::{Dataset, LabeledRecord};
use crate::error::DataError;

pub const DEFAULT_SYMPTOM_PROBABILITY: f64 = 0.3;
pub const DEFAULT_RECORDS: usize = 5000;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub records: usize,
    pub symptom_probability: f64,
    /// Seed for reproducible datasets; `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            records: DEFAULT_RECORDS,
            symptom_probability: DEFAULT_SYMPTOM_PROBABILITY,
            seed: None,
        }
    }
}

impl GeneratorConfig {
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    pub fn generate(&self) -> Result<Dataset, DataError> {
        let mut rng = self.rng();
        generate_with_probability(self.records, self.symptom_probability, &mut rng)
    }
}

/// Draws one record; temperature is rounded to one decimal place.
pub fn generate_record<R: Rng + ?Sized>(rng: &mut R, symptom_probability: f64) -> PatientRecord {
    let age = rng.gen_range(1..=94);
    let heart_rate = rng.gen_range(50..=179);
    let systolic_bp = rng.gen_range(80..=199);
    let temperature = (rng.gen_range(36.0..40.5) * 10.0_f64).round() / 10.0;
    let oxygen_saturation = rng.gen_range(85..=100);

    let mut symptoms = Symptoms::default();
    for symptom in Symptom::ALL {
        symptoms.set(symptom, rng.gen_bool(symptom_probability));
    }

    PatientRecord {
        age,
        heart_rate,
        systolic_bp,
        temperature,
        oxygen_saturation,
        symptoms,
    }
}

/// Generates `n` labeled records with the default symptom probability.
pub fn generate_dataset<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Result<Dataset, DataError> {
    generate_with_probability(n, DEFAULT_SYMPTOM_PROBABILITY, rng)
}

pub fn generate_with_probability<R: Rng + ?Sized>(
    n: usize,
    symptom_probability: f64,
    rng: &mut R,
) -> Result<Dataset, DataError> {
    if n == 0 {
        return Err(DataError::EmptyDataset);
    }
    if !(0.0..=1.0).contains(&symptom_probability) {
        return Err(DataError::InvalidConfig(format!(
            "symptom probability {symptom_probability} is not within [0, 1]"
        )));
    }
    let dataset: Dataset = (0..n)
        .map(|_| LabeledRecord::from_rules(generate_record(rng, symptom_probability)))
        .collect();
    log::info!(
        "generated {} synthetic records (symptom probability {symptom_probability})",
        dataset.len()
    );
    log::debug!("level counts: {:?}", dataset.level_counts());
    Ok(dataset)
}
