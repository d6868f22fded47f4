//! Ordered column schema and value domains

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::SchemaError;

/// Number of model input columns
pub const FEATURE_COUNT: usize = 15;

/// Numeric vitals, in schema order. These are the only scaled columns.
pub const NUMERIC_FEATURES: [&str; 5] = [
    "age",
    "heart_rate",
    "systolic_bp",
    "temperature",
    "oxygen_saturation",
];

/// Binary symptom flags, in schema order
pub const SYMPTOM_FEATURES: [&str; 10] = [
    "fever",
    "cough",
    "shortness_of_breath",
    "chest_pain",
    "headache",
    "sore_throat",
    "fatigue",
    "nausea",
    "abdominal_pain",
    "dizziness",
];

/// All input columns: vitals first, then symptoms
pub const FEATURE_COLUMNS: [&str; FEATURE_COUNT] = [
    "age",
    "heart_rate",
    "systolic_bp",
    "temperature",
    "oxygen_saturation",
    "fever",
    "cough",
    "shortness_of_breath",
    "chest_pain",
    "headache",
    "sore_throat",
    "fatigue",
    "nausea",
    "abdominal_pain",
    "dizziness",
];

/// Name of the ground-truth column appended after the features in dataset files
pub const LABEL_COLUMN: &str = "triage_level";

/// Inclusive value domain of a vital sign
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VitalDomain {
    pub min: f64,
    pub max: f64,
    /// Whether values are whole numbers
    pub integer: bool,
}

impl VitalDomain {
    pub fn contains(&self, value: f64) -> bool {
        value.is_finite() && value >= self.min && value <= self.max
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Vital {
    Age,
    HeartRate,
    SystolicBp,
    Temperature,
    OxygenSaturation,
}

impl Vital {
    pub const ALL: [Vital; 5] = [
        Vital::Age,
        Vital::HeartRate,
        Vital::SystolicBp,
        Vital::Temperature,
        Vital::OxygenSaturation,
    ];

    pub fn column(self) -> &'static str {
        NUMERIC_FEATURES[self as usize]
    }

    /// Range the synthetic generator draws from
    pub fn domain(self) -> VitalDomain {
        let (min, max, integer) = match self {
            Vital::Age => (1.0, 94.0, true),
            Vital::HeartRate => (50.0, 179.0, true),
            Vital::SystolicBp => (80.0, 199.0, true),
            Vital::Temperature => (36.0, 40.5, false),
            Vital::OxygenSaturation => (85.0, 100.0, true),
        };
        VitalDomain { min, max, integer }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Symptom {
    Fever,
    Cough,
    ShortnessOfBreath,
    ChestPain,
    Headache,
    SoreThroat,
    Fatigue,
    Nausea,
    AbdominalPain,
    Dizziness,
}

impl Symptom {
    pub const ALL: [Symptom; 10] = [
        Symptom::Fever,
        Symptom::Cough,
        Symptom::ShortnessOfBreath,
        Symptom::ChestPain,
        Symptom::Headache,
        Symptom::SoreThroat,
        Symptom::Fatigue,
        Symptom::Nausea,
        Symptom::AbdominalPain,
        Symptom::Dizziness,
    ];

    pub fn column(self) -> &'static str {
        SYMPTOM_FEATURES[self as usize]
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Difference between an expected and a presented column list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDiff {
    pub expected: Vec<String>,
    pub found: Vec<String>,
}

impl ColumnDiff {
    /// Expected columns absent from `found`
    pub fn missing(&self) -> Vec<&str> {
        self.expected
            .iter()
            .filter(|c| !self.found.contains(c))
            .map(String::as_str)
            .collect()
    }

    /// Presented columns the schema does not know
    pub fn unexpected(&self) -> Vec<&str> {
        self.found
            .iter()
            .filter(|c| !self.expected.contains(c))
            .map(String::as_str)
            .collect()
    }

    /// First position where both lists name known columns but disagree
    pub fn first_misplaced(&self) -> Option<(usize, &str, &str)> {
        self.expected
            .iter()
            .zip(self.found.iter())
            .enumerate()
            .find(|(_, (e, f))| e != f)
            .map(|(i, (e, f))| (i, e.as_str(), f.as_str()))
    }
}

impl fmt::Display for ColumnDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let missing = self.missing();
        let unexpected = self.unexpected();
        let mut parts = Vec::new();
        if !missing.is_empty() {
            parts.push(format!("missing columns [{}]", missing.join(", ")));
        }
        if !unexpected.is_empty() {
            parts.push(format!("unexpected columns [{}]", unexpected.join(", ")));
        }
        if self.found.len() != self.expected.len() && parts.is_empty() {
            // Same set of names but with duplicates
            parts.push(format!(
                "expected {} columns, found {}",
                self.expected.len(),
                self.found.len()
            ));
        }
        if parts.is_empty() {
            if let Some((pos, expected, found)) = self.first_misplaced() {
                parts.push(format!(
                    "columns reordered: expected `{expected}` at position {pos}, found `{found}`"
                ));
            }
        }
        write!(f, "{}", parts.join("; "))
    }
}

/// Explicit ordered column contract shared by scaler, model and inference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSchema {
    columns: Vec<String>,
}

impl FeatureSchema {
    /// The fifteen-column triage schema
    pub fn standard() -> Self {
        Self::from_columns(&FEATURE_COLUMNS)
    }

    pub fn from_columns<S: AsRef<str>>(columns: &[S]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.as_ref().to_string()).collect(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Fails unless `found` names exactly these columns in exactly this order.
    pub fn verify<S: AsRef<str>>(&self, found: &[S]) -> Result<(), SchemaError> {
        let matches = found.len() == self.columns.len()
            && self
                .columns
                .iter()
                .zip(found.iter())
                .all(|(e, f)| e == f.as_ref());
        if matches {
            Ok(())
        } else {
            Err(SchemaError::SchemaMismatch(ColumnDiff {
                expected: self.columns.clone(),
                found: found.iter().map(|c| c.as_ref().to_string()).collect(),
            }))
        }
    }

    /// Order-insensitive check for keyed input such as a JSON object: every
    /// column must be named exactly once and nothing else may appear.
    pub fn verify_names<I, S>(&self, found: I) -> Result<(), SchemaError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let found: Vec<String> = found.into_iter().map(|c| c.as_ref().to_string()).collect();
        let complete = found.len() == self.columns.len()
            && self.columns.iter().all(|c| found.contains(c));
        if complete {
            Ok(())
        } else {
            Err(SchemaError::SchemaMismatch(ColumnDiff {
                expected: self.columns.clone(),
                found,
            }))
        }
    }
}

impl Default for FeatureSchema {
    fn default() -> Self {
        Self::standard()
    }
}

/// Header of a dataset file: the feature columns followed by the label column
pub fn dataset_header() -> Vec<&'static str> {
    let mut header = FEATURE_COLUMNS.to_vec();
    header.push(LABEL_COLUMN);
    header
}
