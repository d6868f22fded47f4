use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::backend::{check_width, Classifier};
use crate::error::ModelError;
use crate::layer::{Activation, DenseLayer, LayerGradients};

/// Stack of dense layers: ReLU on every hidden layer, softmax on the output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedForwardNet {
    layers: Vec<DenseLayer>,
}

impl FeedForwardNet {
    pub fn new<R: Rng + ?Sized>(
        inputs: usize,
        hidden: &[usize],
        classes: usize,
        rng: &mut R,
    ) -> Result<Self, ModelError> {
        if inputs == 0 || classes < 2 || hidden.contains(&0) {
            return Err(ModelError::InvalidConfig(format!(
                "cannot build network {inputs} -> {hidden:?} -> {classes}"
            )));
        }
        let mut layers = Vec::with_capacity(hidden.len() + 1);
        let mut width = inputs;
        for &h in hidden {
            layers.push(DenseLayer::glorot(width, h, Activation::Relu, rng));
            width = h;
        }
        layers.push(DenseLayer::glorot(width, classes, Activation::Softmax, rng));
        Ok(Self { layers })
    }

    pub fn from_layers(layers: Vec<DenseLayer>) -> Result<Self, ModelError> {
        let net = Self { layers };
        net.validate()?;
        Ok(net)
    }

    /// Checks layer shapes chain together and activations are placed correctly.
    pub fn validate(&self) -> Result<(), ModelError> {
        let Some(last) = self.layers.last() else {
            return Err(ModelError::InvalidArtifact("network has no layers".into()));
        };
        for layer in &self.layers {
            layer.validate()?;
        }
        for pair in self.layers.windows(2) {
            if pair[0].outputs() != pair[1].inputs() {
                return Err(ModelError::InvalidArtifact(format!(
                    "layer of width {} feeds a layer expecting {}",
                    pair[0].outputs(),
                    pair[1].inputs()
                )));
            }
        }
        let hidden = &self.layers[..self.layers.len() - 1];
        if hidden.iter().any(|l| l.activation() != Activation::Relu)
            || last.activation() != Activation::Softmax
        {
            return Err(ModelError::InvalidArtifact(
                "expected relu hidden layers and a softmax output".into(),
            ));
        }
        Ok(())
    }

    pub fn layers(&self) -> &[DenseLayer] {
        &self.layers
    }

    pub(crate) fn layers_mut(&mut self) -> &mut [DenseLayer] {
        &mut self.layers
    }

    /// Layer widths from input to output, e.g. `[15, 128, 64, 5]`
    pub fn architecture(&self) -> Vec<usize> {
        let mut sizes = Vec::with_capacity(self.layers.len() + 1);
        if let Some(first) = self.layers.first() {
            sizes.push(first.inputs());
        }
        sizes.extend(self.layers.iter().map(|l| l.outputs()));
        sizes
    }

    pub fn parameter_count(&self) -> usize {
        self.layers.iter().map(|l| l.parameter_count()).sum()
    }

    pub fn empty_gradients(&self) -> Vec<LayerGradients> {
        self.layers.iter().map(LayerGradients::zeros_like).collect()
    }

    /// Output probabilities; `x` must already have the input width.
    pub fn forward(&self, x: &[f64]) -> Vec<f64> {
        let mut a = x.to_vec();
        for layer in &self.layers {
            a = layer.forward(&a);
        }
        a
    }

    // activations[0] is the input, the last entry the softmax output
    fn forward_trace(&self, x: &[f64]) -> Vec<Vec<f64>> {
        let mut acts = Vec::with_capacity(self.layers.len() + 1);
        acts.push(x.to_vec());
        for layer in &self.layers {
            let next = layer.forward(&acts[acts.len() - 1]);
            acts.push(next);
        }
        acts
    }

    /// Adds the cross-entropy gradient for one sample to `grads` and returns
    /// the sample's output probabilities.
    pub(crate) fn accumulate_gradients(
        &self,
        x: &[f64],
        label: usize,
        grads: &mut [LayerGradients],
    ) -> Vec<f64> {
        let acts = self.forward_trace(x);
        let depth = self.layers.len();
        let probs = acts[depth].clone();

        // softmax + cross-entropy: dL/dz = p - onehot
        let mut delta = probs.clone();
        delta[label] -= 1.0;

        for l in (0..depth).rev() {
            let layer = &self.layers[l];
            let input = &acts[l];
            let n_in = layer.inputs();
            let g = &mut grads[l];
            for (o, &d) in delta.iter().enumerate() {
                if d == 0.0 {
                    continue;
                }
                g.biases[o] += d;
                let row = &mut g.weights[o * n_in..(o + 1) * n_in];
                for (gw, &a) in row.iter_mut().zip(input) {
                    *gw += d * a;
                }
            }
            if l == 0 {
                break;
            }
            let mut prev = vec![0.0; n_in];
            for (row, &d) in layer.weights().chunks_exact(n_in).zip(&delta) {
                if d == 0.0 {
                    continue;
                }
                for (p, &w) in prev.iter_mut().zip(row) {
                    *p += w * d;
                }
            }
            // ReLU derivative, read off the stored activation
            for (p, &a) in prev.iter_mut().zip(input) {
                if a <= 0.0 {
                    *p = 0.0;
                }
            }
            delta = prev;
        }
        probs
    }
}

impl Classifier for FeedForwardNet {
    fn input_width(&self) -> usize {
        self.layers.first().map_or(0, |l| l.inputs())
    }

    fn class_count(&self) -> usize {
        self.layers.last().map_or(0, |l| l.outputs())
    }

    fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>, ModelError> {
        check_width(self.input_width(), features.len())?;
        Ok(self.forward(features))
    }

    fn backend_name(&self) -> &str {
        "dense-feedforward"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn net() -> FeedForwardNet {
        let mut rng = StdRng::seed_from_u64(42);
        FeedForwardNet::new(15, &[128, 64], 5, &mut rng).unwrap()
    }

    fn loss(net: &FeedForwardNet, x: &[f64], label: usize) -> f64 {
        -net.forward(x)[label].ln()
    }

    #[test]
    fn triage_architecture() {
        let n = net();
        assert_eq!(n.architecture(), vec![15, 128, 64, 5]);
        assert_eq!(n.parameter_count(), 15 * 128 + 128 + 128 * 64 + 64 + 64 * 5 + 5);
        assert_eq!(n.input_width(), 15);
        assert_eq!(n.class_count(), 5);
        n.validate().unwrap();
    }

    #[test]
    fn probabilities_are_a_distribution() {
        let n = net();
        let x: Vec<f64> = (0..15).map(|i| (i as f64 - 7.0) / 3.0).collect();
        let p = n.predict_proba(&x).unwrap();
        assert_eq!(p.len(), 5);
        assert!(p.iter().all(|v| *v >= 0.0));
        assert_abs_diff_eq!(p.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn wrong_width_is_rejected() {
        assert!(matches!(
            net().predict_proba(&[1.0; 14]),
            Err(ModelError::ShapeMismatch {
                expected: 15,
                found: 14
            })
        ));
    }

    #[test]
    fn bad_architecture_is_config_error() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(
            FeedForwardNet::new(15, &[0], 5, &mut rng),
            Err(ModelError::InvalidConfig(_))
        ));
        assert!(matches!(
            FeedForwardNet::new(15, &[8], 1, &mut rng),
            Err(ModelError::InvalidConfig(_))
        ));
    }

    #[test]
    fn gradients_match_finite_differences() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut n = FeedForwardNet::new(4, &[6, 5], 3, &mut rng).unwrap();
        let x = [0.3, -1.2, 0.8, 1.0];
        let label = 2;
        let mut grads = n.empty_gradients();
        n.accumulate_gradients(&x, label, &mut grads);

        let h = 1e-6;
        for (l, idx) in [(0usize, 3usize), (1, 7), (2, 4)] {
            let analytic = grads[l].weights[idx];
            let (w, _) = n.layers_mut()[l].params_mut();
            let orig = w[idx];
            w[idx] = orig + h;
            let up = loss(&n, &x, label);
            let (w, _) = n.layers_mut()[l].params_mut();
            w[idx] = orig - h;
            let down = loss(&n, &x, label);
            let (w, _) = n.layers_mut()[l].params_mut();
            w[idx] = orig;
            let numeric = (up - down) / (2.0 * h);
            assert_abs_diff_eq!(analytic, numeric, epsilon = 1e-5);
        }

        let analytic_b = grads[2].biases[0];
        let (_, b) = n.layers_mut()[2].params_mut();
        b[0] += h;
        let up = loss(&n, &x, label);
        let (_, b) = n.layers_mut()[2].params_mut();
        b[0] -= 2.0 * h;
        let down = loss(&n, &x, label);
        assert_abs_diff_eq!(analytic_b, (up - down) / (2.0 * h), epsilon = 1e-5);
    }

    #[test]
    fn from_layers_rejects_broken_chain() {
        let mut rng = StdRng::seed_from_u64(2);
        let a = DenseLayer::glorot(3, 4, Activation::Relu, &mut rng);
        let b = DenseLayer::glorot(5, 2, Activation::Softmax, &mut rng);
        assert!(matches!(
            FeedForwardNet::from_layers(vec![a.clone(), b]),
            Err(ModelError::InvalidArtifact(_))
        ));
        let relu_out = DenseLayer::glorot(4, 2, Activation::Relu, &mut rng);
        assert!(FeedForwardNet::from_layers(vec![a, relu_out]).is_err());
        assert!(FeedForwardNet::from_layers(vec![]).is_err());
    }
}
