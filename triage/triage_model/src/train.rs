//! Mini-batch training loop.
//!
//! The tail `validation_split` of the training rows is held out once before
//! the first epoch and only ever evaluated. The remaining rows are reshuffled
//! every epoch and consumed in batches of `batch_size`; each batch averages
//! the per-sample cross-entropy gradients and takes one Adam step.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::backend::{argmax, check_width, Classifier};
use crate::error::ModelError;
use crate::metrics::{cross_entropy, evaluate, Evaluation};
use crate::network::FeedForwardNet;
use crate::optimizer::{Adam, AdamConfig, DEFAULT_LEARNING_RATE};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub epochs: usize,
    pub batch_size: usize,
    pub validation_split: f64,
    pub learning_rate: f64,
    pub hidden_layers: Vec<usize>,
    pub classes: usize,
    pub seed: u64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            epochs: 20,
            batch_size: 32,
            validation_split: 0.2,
            learning_rate: DEFAULT_LEARNING_RATE,
            hidden_layers: vec![128, 64],
            classes: triage_schema::CLASS_COUNT,
            seed: 42,
        }
    }
}

impl TrainingConfig {
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.epochs == 0 {
            return Err(ModelError::InvalidConfig("epochs must be positive".into()));
        }
        if self.batch_size == 0 {
            return Err(ModelError::InvalidConfig(
                "batch size must be positive".into(),
            ));
        }
        if !(0.0..1.0).contains(&self.validation_split) {
            return Err(ModelError::InvalidConfig(format!(
                "validation split {} is not within [0, 1)",
                self.validation_split
            )));
        }
        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return Err(ModelError::InvalidConfig(format!(
                "learning rate {} must be positive",
                self.learning_rate
            )));
        }
        if self.classes < 2 {
            return Err(ModelError::InvalidConfig(
                "at least two classes are required".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpochMetrics {
    pub epoch: usize,
    pub loss: f64,
    pub accuracy: f64,
    pub val_loss: Option<f64>,
    pub val_accuracy: Option<f64>,
}

impl fmt::Display for EpochMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "epoch {:>3}: loss {:.4} accuracy {:.4}",
            self.epoch, self.loss, self.accuracy
        )?;
        if let (Some(l), Some(a)) = (self.val_loss, self.val_accuracy) {
            write!(f, " - val_loss {l:.4} val_accuracy {a:.4}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingHistory {
    pub epochs: Vec<EpochMetrics>,
}

impl TrainingHistory {
    pub fn last(&self) -> Option<&EpochMetrics> {
        self.epochs.last()
    }

    pub fn len(&self) -> usize {
        self.epochs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.epochs.is_empty()
    }
}

/// Network plus how it got there
#[derive(Debug, Clone)]
pub struct TrainedModel {
    pub network: FeedForwardNet,
    pub history: TrainingHistory,
    pub config: TrainingConfig,
}

impl Classifier for TrainedModel {
    fn input_width(&self) -> usize {
        self.network.input_width()
    }

    fn class_count(&self) -> usize {
        self.network.class_count()
    }

    fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>, ModelError> {
        self.network.predict_proba(features)
    }

    fn backend_name(&self) -> &str {
        self.network.backend_name()
    }
}

/// Trains a fresh network on `features`/`labels` (class indices).
pub fn train_classifier(
    features: &[Vec<f64>],
    labels: &[usize],
    config: &TrainingConfig,
) -> Result<TrainedModel, ModelError> {
    config.validate()?;
    if features.len() != labels.len() {
        return Err(ModelError::ShapeMismatch {
            expected: features.len(),
            found: labels.len(),
        });
    }
    let Some(first) = features.first() else {
        return Err(ModelError::EmptyDataset);
    };
    let width = first.len();
    for row in features {
        check_width(width, row.len())?;
    }
    if let Some(&label) = labels.iter().find(|&&l| l >= config.classes) {
        return Err(ModelError::LabelOutOfRange {
            label,
            classes: config.classes,
        });
    }

    let split_at = ((features.len() as f64) * (1.0 - config.validation_split)) as usize;
    if split_at == 0 {
        return Err(ModelError::EmptyDataset);
    }
    let (fit_x, val_x) = features.split_at(split_at);
    let (fit_y, val_y) = labels.split_at(split_at);

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut network = FeedForwardNet::new(width, &config.hidden_layers, config.classes, &mut rng)?;
    let mut adam = Adam::new(AdamConfig {
        learning_rate: config.learning_rate,
        ..AdamConfig::default()
    });
    log::info!(
        "training {:?} on {} rows ({} held out for validation)",
        network.architecture(),
        fit_x.len(),
        val_x.len()
    );

    let mut grads = network.empty_gradients();
    let mut order: Vec<usize> = (0..fit_x.len()).collect();
    let mut history = TrainingHistory::default();

    for epoch in 1..=config.epochs {
        order.shuffle(&mut rng);
        let mut loss_sum = 0.0;
        let mut correct = 0usize;
        for batch in order.chunks(config.batch_size) {
            for g in grads.iter_mut() {
                g.reset();
            }
            for &i in batch {
                let p = network.accumulate_gradients(&fit_x[i], fit_y[i], &mut grads);
                loss_sum += cross_entropy(&p, fit_y[i]);
                if argmax(&p) == fit_y[i] {
                    correct += 1;
                }
            }
            let scale = 1.0 / batch.len() as f64;
            for g in grads.iter_mut() {
                g.scale(scale);
            }
            adam.step(network.layers_mut(), &grads);
        }

        let n = fit_x.len() as f64;
        let val: Option<Evaluation> = if val_x.is_empty() {
            None
        } else {
            Some(evaluate(&network, val_x, val_y)?)
        };
        let metrics = EpochMetrics {
            epoch,
            loss: loss_sum / n,
            accuracy: correct as f64 / n,
            val_loss: val.map(|v| v.loss),
            val_accuracy: val.map(|v| v.accuracy),
        };
        log::info!("{metrics}");
        history.epochs.push(metrics);
    }
    log::debug!("{} optimizer steps", adam.steps());

    Ok(TrainedModel {
        network,
        history,
        config: config.clone(),
    })
}
