//! Dataset to model-ready matrices.
//!
//! Splits before scaling so the scaler only ever sees training rows, then
//! standardizes the numeric vitals of both partitions in place. Symptom
//! flags pass through untouched.

use triage_schema::{
    ColumnDiff, FeatureSchema, PatientRecord, SchemaError, FEATURE_COLUMNS, NUMERIC_FEATURES,
};

use crate::dataset::Dataset;
use crate::error::DataError;
use crate::scaler::FeatureScaler;
use crate::split::{stratified_split, SplitConfig};

/// Dense row-major matrix with named columns
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    columns: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl FeatureMatrix {
    pub fn new<S: AsRef<str>>(columns: &[S], rows: Vec<Vec<f64>>) -> Result<Self, DataError> {
        let width = columns.len();
        if let Some(bad) = rows.iter().find(|r| r.len() != width) {
            return Err(DataError::ShapeMismatch {
                expected: width,
                found: bad.len(),
            });
        }
        Ok(Self {
            columns: columns.iter().map(|c| c.as_ref().to_string()).collect(),
            rows,
        })
    }

    /// Raw feature vectors in standard schema order
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a PatientRecord>) -> Self {
        Self {
            columns: FEATURE_COLUMNS.iter().map(|c| c.to_string()).collect(),
            rows: records
                .into_iter()
                .map(|r| r.feature_vector().to_vec())
                .collect(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Vec<f64>> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Projects the named columns, in the order given.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<FeatureMatrix, DataError> {
        let schema = FeatureSchema::from_columns(&self.columns);
        let mut idx = Vec::with_capacity(names.len());
        for name in names {
            match schema.position(name.as_ref()) {
                Some(i) => idx.push(i),
                None => {
                    return Err(SchemaError::SchemaMismatch(ColumnDiff {
                        expected: self.columns.clone(),
                        found: names.iter().map(|n| n.as_ref().to_string()).collect(),
                    })
                    .into())
                }
            }
        }
        let rows = self
            .rows
            .iter()
            .map(|r| idx.iter().map(|&i| r[i]).collect())
            .collect();
        FeatureMatrix::new(names, rows)
    }
}

/// Model-ready partitions plus the scaler fitted on the training side
#[derive(Debug, Clone)]
pub struct PreparedData {
    pub train_features: Vec<Vec<f64>>,
    pub train_labels: Vec<usize>,
    pub test_features: Vec<Vec<f64>>,
    pub test_labels: Vec<usize>,
    pub scaler: FeatureScaler,
    pub schema: FeatureSchema,
}

impl PreparedData {
    pub fn train_len(&self) -> usize {
        self.train_features.len()
    }

    pub fn test_len(&self) -> usize {
        self.test_features.len()
    }
}

/// Raw triage levels (1..=5) to zero-based class indices
pub fn reindex_labels(dataset: &Dataset) -> Vec<usize> {
    dataset.iter().map(|r| r.level.class_index()).collect()
}

/// Split, fit the scaler on training vitals, scale both partitions.
pub fn fit_pipeline(dataset: &Dataset, split: &SplitConfig) -> Result<PreparedData, DataError> {
    dataset.ensure_not_empty()?;
    let labels = reindex_labels(dataset);
    let indices = stratified_split(&labels, split)?;

    let features = FeatureMatrix::from_records(dataset.records());
    let pick = |idx: &[usize]| -> Vec<Vec<f64>> {
        idx.iter().map(|&i| features.rows()[i].clone()).collect()
    };
    let train_raw = FeatureMatrix::new(&FEATURE_COLUMNS, pick(&indices.train))?;
    let test_raw = FeatureMatrix::new(&FEATURE_COLUMNS, pick(&indices.test))?;

    let numeric = train_raw.select(&NUMERIC_FEATURES)?;
    let scaler = FeatureScaler::fitted(&NUMERIC_FEATURES, numeric.rows())?;

    let train_features = scale_features(&scaler, &train_raw)?;
    let test_features = scale_features(&scaler, &test_raw)?;
    let train_labels = indices.train.iter().map(|&i| labels[i]).collect();
    let test_labels = indices.test.iter().map(|&i| labels[i]).collect();

    log::info!(
        "prepared {} training and {} test rows ({} features)",
        train_features.len(),
        test_features.len(),
        FEATURE_COLUMNS.len()
    );
    Ok(PreparedData {
        train_features,
        train_labels,
        test_features,
        test_labels,
        scaler,
        schema: FeatureSchema::standard(),
    })
}

/// Applies a fitted scaler to the scaled subset of a full-schema matrix.
pub fn scale_features(
    scaler: &FeatureScaler,
    matrix: &FeatureMatrix,
) -> Result<Vec<Vec<f64>>, DataError> {
    let stats = scaler.stats()?;
    FeatureSchema::standard().verify(matrix.columns())?;
    let schema = FeatureSchema::from_columns(matrix.columns());
    let mut positions = Vec::with_capacity(scaler.columns().len());
    for name in scaler.columns() {
        match schema.position(name) {
            Some(p) => positions.push(p),
            None => {
                return Err(DataError::InvalidArtifact(format!(
                    "scaler column `{name}` is not a feature column"
                )))
            }
        }
    }
    Ok(matrix
        .rows()
        .iter()
        .map(|row| {
            let mut out = row.clone();
            for (&p, s) in positions.iter().zip(stats) {
                out[p] = s.transform(row[p]);
            }
            out
        })
        .collect())
}

/// Full-schema feature vector for one record, vitals scaled
pub fn preprocess_record(
    scaler: &FeatureScaler,
    record: &PatientRecord,
) -> Result<Vec<f64>, DataError> {
    let matrix = FeatureMatrix::from_records([record]);
    let mut rows = scale_features(scaler, &matrix)?;
    rows.pop().ok_or(DataError::EmptyDataset)
}
