use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use triage_schema::{FeatureSchema, NUMERIC_FEATURES};

use crate::error::DataError;

/// Per-column mean and population standard deviation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColumnStats {
    pub mean: f64,
    pub std: f64,
}

impl ColumnStats {
    pub fn fit(xs: &[f64]) -> Self {
        if xs.is_empty() {
            return Self {
                mean: 0.0,
                std: 0.0,
            };
        }
        let mean = xs.iter().sum::<f64>() / xs.len() as f64;
        let mut var = 0.0;
        for &x in xs {
            let d = x - mean;
            var += d * d;
        }
        var /= xs.len() as f64;
        Self {
            mean,
            std: var.sqrt(),
        }
    }

    /// A constant column has unit scale, so it is only centered.
    pub fn scale(&self) -> f64 {
        if self.std == 0.0 {
            1.0
        } else {
            self.std
        }
    }

    pub fn transform(&self, x: f64) -> f64 {
        (x - self.mean) / self.scale()
    }
}

/// Standardizes a fixed, named set of columns.
///
/// The scaler is fitted once, on training rows only, and then persisted next
/// to the model so inference applies the identical transform. Refitting a
/// fitted scaler is an error; build a new one instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureScaler {
    columns: Vec<String>,
    stats: Option<Vec<ColumnStats>>,
}

impl Default for FeatureScaler {
    fn default() -> Self {
        Self::new(&NUMERIC_FEATURES)
    }
}

impl FeatureScaler {
    pub fn new<S: AsRef<str>>(columns: &[S]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.as_ref().to_string()).collect(),
            stats: None,
        }
    }

    /// Unfitted scaler over the five numeric vitals
    pub fn numeric() -> Self {
        Self::default()
    }

    /// Convenience for `new(columns)` followed by `fit(rows)`.
    pub fn fitted<S: AsRef<str>>(columns: &[S], rows: &[Vec<f64>]) -> Result<Self, DataError> {
        let mut scaler = Self::new(columns);
        scaler.fit(rows)?;
        Ok(scaler)
    }

    /// Learns column statistics from rows laid out in `columns()` order.
    pub fn fit(&mut self, rows: &[Vec<f64>]) -> Result<(), DataError> {
        if self.stats.is_some() {
            return Err(DataError::ScalerAlreadyFitted);
        }
        if rows.is_empty() {
            return Err(DataError::EmptyDataset);
        }
        let width = self.columns.len();
        if let Some(bad) = rows.iter().find(|r| r.len() != width) {
            return Err(DataError::ShapeMismatch {
                expected: width,
                found: bad.len(),
            });
        }
        let stats: Vec<ColumnStats> = (0..width)
            .map(|j| {
                let column: Vec<f64> = rows.iter().map(|r| r[j]).collect();
                ColumnStats::fit(&column)
            })
            .collect();
        for (name, s) in self.columns.iter().zip(&stats) {
            log::debug!("scaler {name}: mean {:.4} std {:.4}", s.mean, s.std);
        }
        self.stats = Some(stats);
        Ok(())
    }

    pub fn is_fitted(&self) -> bool {
        self.stats.is_some()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn schema(&self) -> FeatureSchema {
        FeatureSchema::from_columns(&self.columns)
    }

    pub fn stats(&self) -> Result<&[ColumnStats], DataError> {
        self.stats.as_deref().ok_or(DataError::ScalerNotFitted)
    }

    /// Scales one row whose columns are named by `columns`.
    ///
    /// The names must match the fitted columns exactly, in order.
    pub fn transform<S: AsRef<str>>(
        &self,
        columns: &[S],
        values: &[f64],
    ) -> Result<Vec<f64>, DataError> {
        let stats = self.stats()?;
        self.schema().verify(columns)?;
        self.transform_row(stats, values)
    }

    /// Scales rows already known to be in `columns()` order.
    pub fn transform_rows(&self, rows: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, DataError> {
        let stats = self.stats()?;
        rows.iter().map(|r| self.transform_row(stats, r)).collect()
    }

    fn transform_row(&self, stats: &[ColumnStats], values: &[f64]) -> Result<Vec<f64>, DataError> {
        check_width(stats.len(), values.len())?;
        Ok(stats
            .iter()
            .zip(values)
            .map(|(s, &x)| s.transform(x))
            .collect())
    }

    pub fn to_json(&self) -> Result<String, DataError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(s: &str) -> Result<Self, DataError> {
        let scaler: Self = serde_json::from_str(s)?;
        if let Some(stats) = &scaler.stats {
            if stats.len() != scaler.columns.len() {
                return Err(DataError::InvalidArtifact(format!(
                    "scaler names {} columns but carries {} statistics",
                    scaler.columns.len(),
                    stats.len()
                )));
            }
        }
        Ok(scaler)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), DataError> {
        let path = path.as_ref();
        fs::write(path, self.to_json()?)
            .map_err(|e| DataError::io(format!("writing {}", path.display()), e))?;
        log::info!("saved scaler to {}", path.display());
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, DataError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| DataError::io(format!("reading {}", path.display()), e))?;
        Self::from_json(&text)
    }
}

fn check_width(expected: usize, found: usize) -> Result<(), DataError> {
    if expected == found {
        Ok(())
    } else {
        Err(DataError::ShapeMismatch { expected, found })
    }
}
