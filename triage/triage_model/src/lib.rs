//! Feed-forward triage classifier.
//!
//! A small dense network (ReLU hidden layers, softmax output) trained with
//! Adam on sparse categorical cross-entropy. Everything the serving side
//! needs sits behind the [`Classifier`] trait; [`ModelArtifact`] persists a
//! trained network together with the feature columns it expects.
//!
//! ```
//! use triage_model::{train_classifier, Classifier, TrainingConfig};
//!
//! let features = vec![vec![0.0, 1.0], vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 0.0]];
//! let labels = vec![0, 1, 0, 1];
//! let config = TrainingConfig {
//!     epochs: 2,
//!     hidden_layers: vec![4],
//!     classes: 2,
//!     validation_split: 0.0,
//!     ..Default::default()
//! };
//! let model = train_classifier(&features, &labels, &config).unwrap();
//! let p = model.predict_proba(&[0.0, 1.0]).unwrap();
//! assert!((p.iter().sum::<f64>() - 1.0).abs() < 1e-9);
//! ```

pub mod artifact;
pub mod backend;
pub mod error;
pub mod layer;
pub mod metadata;
pub mod metrics;
pub mod network;
pub mod optimizer;
pub mod train;

pub use artifact::ModelArtifact;
pub use backend::{argmax, Classifier};
pub use error::ModelError;
pub use layer::{softmax_in_place, Activation, DenseLayer, LayerGradients};
pub use metadata::{ModelMetadata, ModelVersion};
pub use metrics::{agreement_rate, cross_entropy, evaluate, ConfusionMatrix, Evaluation};
pub use network::FeedForwardNet;
pub use optimizer::{Adam, AdamConfig};
pub use train::{train_classifier, EpochMetrics, TrainedModel, TrainingConfig, TrainingHistory};
