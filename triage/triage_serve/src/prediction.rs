use serde::Serialize;
use std::fmt;

use triage_schema::TriageLevel;

/// Classifier output for one patient, mapped back to a triage level
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriagePrediction {
    /// One probability per class index, summing to 1
    pub probabilities: Vec<f64>,
    pub class_index: usize,
    pub level: TriageLevel,
    pub label: &'static str,
}

impl TriagePrediction {
    /// Probability of the predicted class
    pub fn confidence(&self) -> f64 {
        self.probabilities
            .get(self.class_index)
            .copied()
            .unwrap_or(0.0)
    }
}

impl fmt::Display for TriagePrediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (p = {:.3})", self.label, self.confidence())
    }
}
