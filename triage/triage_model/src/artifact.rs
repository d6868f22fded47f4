use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::backend::Classifier;
use crate::error::ModelError;
use crate::metadata::ModelMetadata;
use crate::network::FeedForwardNet;

/// Persisted model: metadata and network in a single JSON document.
///
/// Loading re-validates the network shape against the metadata, so a
/// hand-edited or truncated file fails instead of producing garbage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub metadata: ModelMetadata,
    pub network: FeedForwardNet,
}

impl ModelArtifact {
    pub fn new(metadata: ModelMetadata, network: FeedForwardNet) -> Result<Self, ModelError> {
        let artifact = Self { metadata, network };
        artifact.validate()?;
        Ok(artifact)
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        self.network.validate()?;
        if self.network.input_width() != self.metadata.feature_columns.len() {
            return Err(ModelError::InvalidArtifact(format!(
                "network takes {} inputs but metadata names {} feature columns",
                self.network.input_width(),
                self.metadata.feature_columns.len()
            )));
        }
        if self.network.class_count() != self.metadata.class_count {
            return Err(ModelError::InvalidArtifact(format!(
                "network has {} outputs but metadata declares {} classes",
                self.network.class_count(),
                self.metadata.class_count
            )));
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, ModelError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(s: &str) -> Result<Self, ModelError> {
        let artifact: Self = serde_json::from_str(s)?;
        artifact.validate()?;
        Ok(artifact)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ModelError> {
        let path = path.as_ref();
        fs::write(path, self.to_json()?)
            .map_err(|e| ModelError::io(format!("writing {}", path.display()), e))?;
        log::info!(
            "saved model {} v{} to {}",
            self.metadata.name,
            self.metadata.version,
            path.display()
        );
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| ModelError::io(format!("reading {}", path.display()), e))?;
        let artifact = Self::from_json(&text)?;
        log::debug!(
            "loaded model {} ({:?}, {} parameters)",
            artifact.metadata.name,
            artifact.network.architecture(),
            artifact.network.parameter_count()
        );
        Ok(artifact)
    }
}

impl Classifier for ModelArtifact {
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

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn artifact() -> ModelArtifact {
        let mut rng = StdRng::seed_from_u64(5);
        let net = FeedForwardNet::new(15, &[8], 5, &mut rng).unwrap();
        let meta = ModelMetadata::new("triage", net.architecture(), 5);
        ModelArtifact::new(meta, net).unwrap()
    }

    #[test]
    fn json_reload_is_exact() {
        let a = artifact();
        let back = ModelArtifact::from_json(&a.to_json().unwrap()).unwrap();
        assert_eq!(back, a);
        let x = [0.25; 15];
        assert_eq!(
            back.predict_proba(&x).unwrap(),
            a.predict_proba(&x).unwrap()
        );
    }

    #[test]
    fn metadata_must_match_network() {
        let a = artifact();
        let narrow = a.metadata.clone().with_feature_columns(&["age", "heart_rate"]);
        assert!(matches!(
            ModelArtifact::new(narrow, a.network.clone()),
            Err(ModelError::InvalidArtifact(_))
        ));
        let mut wrong_classes = a.metadata.clone();
        wrong_classes.class_count = 3;
        assert!(ModelArtifact::new(wrong_classes, a.network).is_err());
    }

    #[test]
    fn truncated_json_is_serialization_error() {
        let json = artifact().to_json().unwrap();
        assert!(matches!(
            ModelArtifact::from_json(&json[..json.len() / 2]),
            Err(ModelError::Serialization(_))
        ));
    }
}
