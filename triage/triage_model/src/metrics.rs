//! Evaluation metrics for multi-class predictions

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::backend::{argmax, Classifier};
use crate::error::ModelError;

/// Probability floor/ceiling inside the log of the cross-entropy
pub const PROBABILITY_CLAMP: f64 = 1e-7;

/// Sparse categorical cross-entropy of one prediction
pub fn cross_entropy(probabilities: &[f64], label: usize) -> f64 {
    let p = probabilities
        .get(label)
        .copied()
        .unwrap_or(0.0)
        .clamp(PROBABILITY_CLAMP, 1.0 - PROBABILITY_CLAMP);
    -p.ln()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub loss: f64,
    pub accuracy: f64,
    pub samples: usize,
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "loss {:.4}, accuracy {:.4} ({} samples)",
            self.loss, self.accuracy, self.samples
        )
    }
}

/// Mean cross-entropy and accuracy of `model` on labeled rows.
pub fn evaluate<C: Classifier + ?Sized>(
    model: &C,
    features: &[Vec<f64>],
    labels: &[usize],
) -> Result<Evaluation, ModelError> {
    if features.len() != labels.len() {
        return Err(ModelError::ShapeMismatch {
            expected: features.len(),
            found: labels.len(),
        });
    }
    if features.is_empty() {
        return Err(ModelError::EmptyDataset);
    }
    let classes = model.class_count();
    let mut loss = 0.0;
    let mut correct = 0usize;
    for (x, &y) in features.iter().zip(labels) {
        if y >= classes {
            return Err(ModelError::LabelOutOfRange { label: y, classes });
        }
        let p = model.predict_proba(x)?;
        loss += cross_entropy(&p, y);
        if argmax(&p) == y {
            correct += 1;
        }
    }
    let n = features.len() as f64;
    Ok(Evaluation {
        loss: loss / n,
        accuracy: correct as f64 / n,
        samples: features.len(),
    })
}

/// Fraction of positions where two label sequences agree
pub fn agreement_rate(predicted: &[usize], reference: &[usize]) -> Result<f64, ModelError> {
    if predicted.len() != reference.len() {
        return Err(ModelError::ShapeMismatch {
            expected: reference.len(),
            found: predicted.len(),
        });
    }
    if predicted.is_empty() {
        return Err(ModelError::EmptyDataset);
    }
    let same = predicted
        .iter()
        .zip(reference)
        .filter(|(a, b)| a == b)
        .count();
    Ok(same as f64 / predicted.len() as f64)
}

/// Square confusion matrix; rows are actual classes, columns predicted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    counts: Vec<Vec<usize>>,
}

impl ConfusionMatrix {
    pub fn new(classes: usize) -> Self {
        Self {
            counts: vec![vec![0; classes]; classes],
        }
    }

    pub fn from_predictions(
        actual: &[usize],
        predicted: &[usize],
        classes: usize,
    ) -> Result<Self, ModelError> {
        if actual.len() != predicted.len() {
            return Err(ModelError::ShapeMismatch {
                expected: actual.len(),
                found: predicted.len(),
            });
        }
        let mut m = Self::new(classes);
        for (&a, &p) in actual.iter().zip(predicted) {
            m.record(a, p)?;
        }
        Ok(m)
    }

    pub fn record(&mut self, actual: usize, predicted: usize) -> Result<(), ModelError> {
        let classes = self.classes();
        for label in [actual, predicted] {
            if label >= classes {
                return Err(ModelError::LabelOutOfRange { label, classes });
            }
        }
        self.counts[actual][predicted] += 1;
        Ok(())
    }

    pub fn classes(&self) -> usize {
        self.counts.len()
    }

    pub fn get(&self, actual: usize, predicted: usize) -> usize {
        self.counts
            .get(actual)
            .and_then(|row| row.get(predicted))
            .copied()
            .unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        let diag: usize = (0..self.classes()).map(|i| self.counts[i][i]).sum();
        diag as f64 / total as f64
    }

    /// Share of actual `class` rows predicted as `class`
    pub fn recall(&self, class: usize) -> f64 {
        let Some(row) = self.counts.get(class) else {
            return 0.0;
        };
        let denom: usize = row.iter().sum();
        if denom == 0 {
            0.0
        } else {
            row[class] as f64 / denom as f64
        }
    }

    pub fn precision(&self, class: usize) -> f64 {
        if class >= self.classes() {
            return 0.0;
        }
        let denom: usize = self.counts.iter().map(|row| row[class]).sum();
        if denom == 0 {
            0.0
        } else {
            self.counts[class][class] as f64 / denom as f64
        }
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "actual\\pred")?;
        for p in 0..self.classes() {
            write!(f, " {:>6}", p)?;
        }
        for (a, row) in self.counts.iter().enumerate() {
            write!(f, "\n{:>11}", a)?;
            for c in row {
                write!(f, " {:>6}", c)?;
            }
        }
        Ok(())
    }
}
