use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    Relu,
    Softmax,
}

impl Activation {
    pub fn apply(self, z: &mut [f64]) {
        match self {
            Activation::Relu => {
                for v in z.iter_mut() {
                    if *v < 0.0 {
                        *v = 0.0;
                    }
                }
            }
            Activation::Softmax => softmax_in_place(z),
        }
    }
}

/// Numerically stable softmax; shifts by the max logit before exponentiating.
pub fn softmax_in_place(z: &mut [f64]) {
    let max = z.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mut sum = 0.0;
    for v in z.iter_mut() {
        *v = (*v - max).exp();
        sum += *v;
    }
    for v in z.iter_mut() {
        *v /= sum;
    }
}

/// Fully connected layer `y = act(W x + b)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseLayer {
    inputs: usize,
    outputs: usize,
    /// Row-major, `outputs x inputs`
    weights: Vec<f64>,
    biases: Vec<f64>,
    activation: Activation,
}

impl DenseLayer {
    /// Glorot-uniform weights, zero biases.
    pub fn glorot<R: Rng + ?Sized>(
        inputs: usize,
        outputs: usize,
        activation: Activation,
        rng: &mut R,
    ) -> Self {
        let limit = (6.0 / (inputs + outputs) as f64).sqrt();
        let weights = (0..inputs * outputs)
            .map(|_| rng.gen_range(-limit..limit))
            .collect();
        Self {
            inputs,
            outputs,
            weights,
            biases: vec![0.0; outputs],
            activation,
        }
    }

    pub fn from_parts(
        inputs: usize,
        outputs: usize,
        weights: Vec<f64>,
        biases: Vec<f64>,
        activation: Activation,
    ) -> Result<Self, ModelError> {
        let layer = Self {
            inputs,
            outputs,
            weights,
            biases,
            activation,
        };
        layer.validate()?;
        Ok(layer)
    }

    pub(crate) fn validate(&self) -> Result<(), ModelError> {
        if self.inputs == 0 || self.outputs == 0 {
            return Err(ModelError::InvalidArtifact(
                "layer with zero inputs or outputs".into(),
            ));
        }
        if self.weights.len() != self.inputs * self.outputs {
            return Err(ModelError::InvalidArtifact(format!(
                "{}x{} layer carries {} weights",
                self.outputs,
                self.inputs,
                self.weights.len()
            )));
        }
        if self.biases.len() != self.outputs {
            return Err(ModelError::InvalidArtifact(format!(
                "layer with {} outputs carries {} biases",
                self.outputs,
                self.biases.len()
            )));
        }
        if self
            .weights
            .iter()
            .chain(&self.biases)
            .any(|v| !v.is_finite())
        {
            return Err(ModelError::InvalidArtifact(
                "non-finite parameter".into(),
            ));
        }
        Ok(())
    }

    pub fn inputs(&self) -> usize {
        self.inputs
    }

    pub fn outputs(&self) -> usize {
        self.outputs
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn biases(&self) -> &[f64] {
        &self.biases
    }

    pub fn activation(&self) -> Activation {
        self.activation
    }

    pub fn parameter_count(&self) -> usize {
        self.weights.len() + self.biases.len()
    }

    pub(crate) fn params_mut(&mut self) -> (&mut [f64], &mut [f64]) {
        (&mut self.weights, &mut self.biases)
    }

    /// Caller guarantees `x.len() == self.inputs()`.
    pub fn forward(&self, x: &[f64]) -> Vec<f64> {
        let mut z: Vec<f64> = self
            .weights
            .chunks_exact(self.inputs)
            .zip(&self.biases)
            .map(|(row, b)| row.iter().zip(x).map(|(w, v)| w * v).sum::<f64>() + b)
            .collect();
        self.activation.apply(&mut z);
        z
    }
}

/// Accumulated loss gradient for one layer's parameters
#[derive(Debug, Clone, PartialEq)]
pub struct LayerGradients {
    pub weights: Vec<f64>,
    pub biases: Vec<f64>,
}

impl LayerGradients {
    pub fn zeros_like(layer: &DenseLayer) -> Self {
        Self {
            weights: vec![0.0; layer.weights.len()],
            biases: vec![0.0; layer.biases.len()],
        }
    }

    pub fn reset(&mut self) {
        self.weights.iter_mut().for_each(|g| *g = 0.0);
        self.biases.iter_mut().for_each(|g| *g = 0.0);
    }

    pub fn scale(&mut self, factor: f64) {
        self.weights.iter_mut().for_each(|g| *g *= factor);
        self.biases.iter_mut().for_each(|g| *g *= factor);
    }
}
