use serde::{Deserialize, Serialize};

use crate::layer::{DenseLayer, LayerGradients};

pub const DEFAULT_LEARNING_RATE: f64 = 0.001;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdamConfig {
    pub learning_rate: f64,
    pub beta1: f64,
    pub beta2: f64,
    pub epsilon: f64,
}

impl Default for AdamConfig {
    fn default() -> Self {
        Self {
            learning_rate: DEFAULT_LEARNING_RATE,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-7,
        }
    }
}

#[derive(Debug, Clone)]
struct Moments {
    m_w: Vec<f64>,
    v_w: Vec<f64>,
    m_b: Vec<f64>,
    v_b: Vec<f64>,
}

impl Moments {
    fn zeros_like(layer: &DenseLayer) -> Self {
        Self {
            m_w: vec![0.0; layer.weights().len()],
            v_w: vec![0.0; layer.weights().len()],
            m_b: vec![0.0; layer.biases().len()],
            v_b: vec![0.0; layer.biases().len()],
        }
    }
}

/// Adam with bias correction folded into the step size.
#[derive(Debug, Clone)]
pub struct Adam {
    config: AdamConfig,
    steps: u64,
    moments: Vec<Moments>,
}

impl Adam {
    pub fn new(config: AdamConfig) -> Self {
        Self {
            config,
            steps: 0,
            moments: Vec::new(),
        }
    }

    pub fn config(&self) -> &AdamConfig {
        &self.config
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Applies one update; `grads` must line up with `layers`.
    pub fn step(&mut self, layers: &mut [DenseLayer], grads: &[LayerGradients]) {
        if self.moments.len() != layers.len() {
            self.moments = layers.iter().map(Moments::zeros_like).collect();
        }
        self.steps += 1;
        let AdamConfig {
            learning_rate,
            beta1,
            beta2,
            epsilon,
        } = self.config;
        let t = self.steps as i32;
        let lr_t = learning_rate * (1.0 - beta2.powi(t)).sqrt() / (1.0 - beta1.powi(t));

        for ((layer, g), m) in layers.iter_mut().zip(grads).zip(&mut self.moments) {
            let (w, b) = layer.params_mut();
            update(w, &g.weights, &mut m.m_w, &mut m.v_w, lr_t, beta1, beta2, epsilon);
            update(b, &g.biases, &mut m.m_b, &mut m.v_b, lr_t, beta1, beta2, epsilon);
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn update(
    params: &mut [f64],
    grads: &[f64],
    m: &mut [f64],
    v: &mut [f64],
    lr_t: f64,
    beta1: f64,
    beta2: f64,
    epsilon: f64,
) {
    for (((p, &g), m), v) in params.iter_mut().zip(grads).zip(m).zip(v) {
        *m = beta1 * *m + (1.0 - beta1) * g;
        *v = beta2 * *v + (1.0 - beta2) * g * g;
        *p -= lr_t * *m / (v.sqrt() + epsilon);
    }
}
