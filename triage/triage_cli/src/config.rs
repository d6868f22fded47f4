use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use triage_data::{GeneratorConfig, SplitConfig};
use triage_model::TrainingConfig;
use triage_schema::CLASS_COUNT;

pub const DEFAULT_CONFIG_FILE: &str = "triage.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("cannot render config: {0}")]
    Render(#[from] toml::ser::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Where the pipeline reads and writes its durable files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactPaths {
    pub dataset: PathBuf,
    pub model: PathBuf,
    pub scaler: PathBuf,
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self {
            dataset: PathBuf::from("triage_data.csv"),
            model: PathBuf::from("triage_model.json"),
            scaler: PathBuf::from("scaler.json"),
        }
    }
}

impl ArtifactPaths {
    /// Default file names placed under `dir`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        let d = Self::default();
        Self {
            dataset: dir.join(d.dataset),
            model: dir.join(d.model),
            scaler: dir.join(d.scaler),
        }
    }
}

/// Contents of `triage.toml`; every section and field is optional.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub generation: GeneratorConfig,
    pub split: SplitConfig,
    pub training: TrainingConfig,
    pub artifacts: ArtifactPaths,
}

impl PipelineConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        log::debug!("loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Explicit file if given, else `triage.toml` when present, else defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::load(path),
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => Self::load(DEFAULT_CONFIG_FILE),
            None => Ok(Self::default()),
        }
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.generation.records == 0 {
            return Err(ConfigError::Invalid(
                "generation.records must be positive".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.generation.symptom_probability) {
            return Err(ConfigError::Invalid(format!(
                "generation.symptom_probability {} is not within [0, 1]",
                self.generation.symptom_probability
            )));
        }
        self.split
            .validate()
            .map_err(|e| ConfigError::Invalid(format!("split: {e}")))?;
        self.training
            .validate()
            .map_err(|e| ConfigError::Invalid(format!("training: {e}")))?;
        if self.training.classes != CLASS_COUNT {
            return Err(ConfigError::Invalid(format!(
                "training.classes must be {CLASS_COUNT}, one per triage level"
            )));
        }
        Ok(())
    }
}

/// Commented starter file written by `triage init-config`
pub fn config_template() -> String {
    let d = PipelineConfig::default();
    let mut out = String::new();
    out.push_str("# Synthetic triage pipeline configuration\n");
    out.push_str("\n[generation]\n");
    out.push_str(&format!("records = {}\n", d.generation.records));
    out.push_str(&format!(
        "symptom_probability = {}\n",
        d.generation.symptom_probability
    ));
    out.push_str("# Fix the seed for a reproducible dataset; omit to draw from entropy\n");
    out.push_str("# seed = 7\n");
    out.push_str("\n[split]\n");
    out.push_str(&format!("test_fraction = {}\n", d.split.test_fraction));
    out.push_str(&format!("seed = {}\n", d.split.seed));
    out.push_str("\n[training]\n");
    out.push_str(&format!("epochs = {}\n", d.training.epochs));
    out.push_str(&format!("batch_size = {}\n", d.training.batch_size));
    out.push_str(&format!(
        "validation_split = {}\n",
        d.training.validation_split
    ));
    out.push_str(&format!("learning_rate = {}\n", d.training.learning_rate));
    out.push_str(&format!("hidden_layers = {:?}\n", d.training.hidden_layers));
    out.push_str(&format!("seed = {}\n", d.training.seed));
    out.push_str("\n[artifacts]\n");
    out.push_str(&format!("dataset = {:?}\n", d.artifacts.dataset.display().to_string()));
    out.push_str(&format!("model = {:?}\n", d.artifacts.model.display().to_string()));
    out.push_str(&format!("scaler = {:?}\n", d.artifacts.scaler.display().to_string()));
    out
}
