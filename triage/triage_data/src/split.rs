use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::error::DataError;

pub const DEFAULT_TEST_FRACTION: f64 = 0.2;
pub const DEFAULT_SPLIT_SEED: u64 = 42;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    pub test_fraction: f64,
    pub seed: u64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            test_fraction: DEFAULT_TEST_FRACTION,
            seed: DEFAULT_SPLIT_SEED,
        }
    }
}

impl SplitConfig {
    pub fn validate(&self) -> Result<(), DataError> {
        if self.test_fraction > 0.0 && self.test_fraction < 1.0 {
            Ok(())
        } else {
            Err(DataError::InvalidSplit(format!(
                "test fraction {} must lie strictly between 0 and 1",
                self.test_fraction
            )))
        }
    }
}

/// Row indices of each partition; disjoint and together covering every row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Partitions row indices so every class keeps its proportion in both halves.
///
/// Each class contributes `round(n * test_fraction)` rows to the test side,
/// clamped so a class with at least two rows appears on both sides. A class
/// with a single row stays in training. The same labels and seed always give
/// the same partition.
pub fn stratified_split(labels: &[usize], config: &SplitConfig) -> Result<SplitIndices, DataError> {
    if labels.is_empty() {
        return Err(DataError::EmptyDataset);
    }
    config.validate()?;

    let mut by_class: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (i, &label) in labels.iter().enumerate() {
        by_class.entry(label).or_default().push(i);
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut train = Vec::with_capacity(labels.len());
    let mut test = Vec::new();
    for (class, mut rows) in by_class {
        rows.shuffle(&mut rng);
        let n = rows.len();
        let mut n_test = (n as f64 * config.test_fraction).round() as usize;
        if n >= 2 {
            n_test = n_test.clamp(1, n - 1);
        } else {
            n_test = 0;
        }
        log::trace!("class {class}: {} train / {n_test} test", n - n_test);
        test.extend_from_slice(&rows[..n_test]);
        train.extend_from_slice(&rows[n_test..]);
    }
    train.shuffle(&mut rng);
    test.shuffle(&mut rng);
    Ok(SplitIndices { train, test })
}
