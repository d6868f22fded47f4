//! Model metadata and versioning structures

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use triage_schema::FEATURE_COLUMNS;

use crate::metrics::Evaluation;

/// Semantic version for models
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ModelVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl ModelVersion {
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl Default for ModelVersion {
    fn default() -> Self {
        Self::new(1, 0, 0)
    }
}

impl std::fmt::Display for ModelVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Everything about a trained model except its weights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub name: String,
    pub version: ModelVersion,
    /// Input columns in the order the network consumes them
    pub feature_columns: Vec<String>,
    pub class_count: usize,
    /// Layer widths from input to output
    pub architecture: Vec<usize>,
    /// Creation timestamp (RFC 3339)
    pub created_at: String,
    pub epochs_trained: usize,
    pub description: Option<String>,
    /// Held-out evaluation recorded at save time
    pub evaluation: Option<Evaluation>,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

impl ModelMetadata {
    pub fn new(name: impl Into<String>, architecture: Vec<usize>, class_count: usize) -> Self {
        Self {
            name: name.into(),
            version: ModelVersion::default(),
            feature_columns: FEATURE_COLUMNS.iter().map(|c| c.to_string()).collect(),
            class_count,
            architecture,
            created_at: chrono::Utc::now().to_rfc3339(),
            epochs_trained: 0,
            description: None,
            evaluation: None,
            tags: BTreeMap::new(),
        }
    }

    pub fn with_feature_columns<S: AsRef<str>>(mut self, columns: &[S]) -> Self {
        self.feature_columns = columns.iter().map(|c| c.as_ref().to_string()).collect();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs_trained = epochs;
        self
    }

    pub fn with_evaluation(mut self, evaluation: Evaluation) -> Self {
        self.evaluation = Some(evaluation);
        self
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_display_and_order() {
        assert_eq!(ModelVersion::default().to_string(), "1.0.0");
        assert_eq!(ModelVersion::new(1, 2, 3).to_string(), "1.2.3");
        assert!(ModelVersion::new(1, 10, 0) > ModelVersion::new(1, 9, 9));
    }

    #[test]
    fn defaults_to_triage_schema() {
        let m = ModelMetadata::new("triage", vec![15, 128, 64, 5], 5)
            .with_tag("dataset", "synthetic")
            .with_epochs(20);
        assert_eq!(m.feature_columns.len(), 15);
        assert_eq!(m.feature_columns[0], "age");
        assert_eq!(m.tags["dataset"], "synthetic");
        assert!(chrono::DateTime::parse_from_rfc3339(&m.created_at).is_ok());
    }
}
